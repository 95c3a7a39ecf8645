//! # MQTT Endpoint
//!
//! Declarative MQTT subscriptions for Rust applications: a state type lists
//! its topic patterns and handlers once, and the endpoint subscribes,
//! routes inbound messages and unpacks wildcard levels into handler
//! arguments.
//!
//! ## Features
//!
//! - **Topic pattern codec**: `pack`/`unpack` between `+`/`#` patterns and
//!   concrete topics, so one pattern is both subscription filter and publish
//!   template
//! - **Declarative subscriptions**: literal patterns or patterns computed
//!   from instance state, registered exactly once per endpoint
//! - **Session aware**: subscriptions are reissued on a fresh broker session
//!   and left alone when the session is resumed
//! - **Async network loop**: built on `rumqttc` (MQTT v5) and `tokio` with
//!   automatic reconnect and graceful shutdown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mqtt_endpoint::prelude::*;
//!
//! struct Thermostat {
//!     room: String,
//! }
//!
//! impl Thermostat {
//!     fn on_setpoint(
//!         &self,
//!         _: &TopicArgs,
//!         delivery: &Delivery<'_>,
//!     ) -> HandlerResult {
//!         let value = std::str::from_utf8(delivery.payload())?;
//!         println!("{}: new setpoint {value}", self.room);
//!         Ok(())
//!     }
//!
//!     fn on_sensor(
//!         &self,
//!         args: &TopicArgs,
//!         _: &Delivery<'_>,
//!     ) -> HandlerResult {
//!         let (sensor, path) = (args.level(0), args.remainder());
//!         println!("sensor {sensor:?} reported {path:?}");
//!         Ok(())
//!     }
//! }
//!
//! impl EndpointState for Thermostat {
//!     fn subscriptions() -> Vec<Subscription<Self>> {
//!         vec![
//!             Subscription::computed(
//!                 |t: &Thermostat| format!("rooms/{}/setpoint", t.room),
//!                 Thermostat::on_setpoint,
//!             ),
//!             Subscription::new("sensors/+/#", Thermostat::on_sensor)
//!                 .with_qos(QoS::AtLeastOnce),
//!         ]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EndpointError> {
//!     let state = Thermostat { room: "kitchen".into() };
//!     let config = EndpointConfig::localhost("thermostat");
//!     let endpoint = Arc::new(Endpoint::new(state, config)?);
//!     let connection = endpoint.connect()?;
//!     endpoint.wait_connected().await;
//!
//!     endpoint.publish(
//!         "rooms/+/temperature",
//!         &["kitchen".into()],
//!         "21.5",
//!         &PublishOptions::default(),
//!     )?;
//!
//!     connection.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Pattern Matching
//!
//! - `+` matches exactly one topic level (e.g., `sensors/+/temperature`)
//! - `#` matches zero or more trailing levels and must be last (e.g.,
//!   `sensors/#` also receives `sensors`)

#![warn(missing_docs)]

pub mod client;
pub mod connection;
pub mod routing;
pub mod topic;

// === Core Public API ===
pub use client::{
	ConnectionStatus, Endpoint, EndpointConfig, EndpointError, MessagingClient,
	PublishOptions, RetainHandling, RumqttTransport, SessionStart,
	SubscribeOptions, TransportError,
};
pub use connection::MqttConnection;
pub use routing::{
	Delivery, EndpointState, HandlerError, HandlerResult, InboundMessage,
	PatternSpec, SessionSignal, Subscription, SubscriptionRegistry,
};
pub use topic::{TopicArg, TopicArgs, TopicPattern, pack, unpack};

// Essential external types
pub use rumqttc::v5::mqttbytes::QoS;
pub use rumqttc::v5::mqttbytes::v5::PublishProperties;

/// Prelude module for convenient imports
///
/// ```rust
/// use mqtt_endpoint::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most endpoints

	pub use crate::{
		Delivery, Endpoint, EndpointConfig, EndpointError, EndpointState,
		HandlerResult, MqttConnection, PublishOptions, QoS, SubscribeOptions,
		Subscription, TopicArg, TopicArgs,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use mqtt_endpoint::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::client::{EndpointError, TransportError};
	pub use crate::routing::{RegistryError, SessionError};
	pub use crate::topic::{
		PatternFormatError, TopicError, TopicPackError, TopicUnpackError,
	};
}
