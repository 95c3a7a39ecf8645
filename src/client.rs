//! Endpoint, its configuration and the MQTT transport binding

pub mod config;
/// Endpoint and transport error types
pub mod error;
pub mod endpoint;
mod event_loop;
pub mod options;
pub mod transport;

#[cfg(test)]
mod event_loop_tests;

pub use config::{
	ClientOptions, EndpointConfig, PasswordCredentials, ServerOptions,
	SessionStart,
};
pub use endpoint::{ConnectionStatus, Endpoint};
pub use error::{EndpointError, TransportError};
pub use options::{PublishOptions, RetainHandling, SubscribeOptions};
pub use transport::{MessagingClient, RumqttTransport};
