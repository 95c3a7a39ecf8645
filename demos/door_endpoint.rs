//! # Door Endpoint
//!
//! A door controller that listens for commands on a topic computed from its
//! own id and reports its state back through the same pattern codec.
//!
//! Subscriptions:
//! - `door/{id}/+`: commands such as `door/front/open`
//! - `building/#`: broadcast announcements, any depth
//!
//! Run a broker on localhost:1883 and try:
//! ```bash
//! RUST_LOG=info cargo run --example door_endpoint
//! mosquitto_pub -t door/front/open -m now
//! mosquitto_sub -t 'door/+/state'
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mqtt_endpoint::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Door {
	id: String,
	open: AtomicBool,
}

impl Door {
	fn on_command(
		&self,
		args: &TopicArgs,
		delivery: &Delivery<'_>,
	) -> HandlerResult {
		let open = match args.level(0) {
			| Some("open") => true,
			| Some("close") => false,
			| other => return Err(format!("unknown command {other:?}").into()),
		};
		self.open.store(open, Ordering::SeqCst);
		info!(door = %self.id, open, "Door command applied");

		let state = if open { "open" } else { "closed" };
		delivery.publish(
			"door/+/state",
			&[self.id.as_str().into()],
			state,
			&PublishOptions::default().retain(true),
		)?;
		Ok(())
	}

	fn on_announcement(
		&self,
		args: &TopicArgs,
		delivery: &Delivery<'_>,
	) -> HandlerResult {
		let path = args.remainder().map(|levels| levels.join("/"));
		let text = String::from_utf8_lossy(delivery.payload());
		info!(
			door = %self.id,
			path = ?path,
			text = %text,
			"Building announcement"
		);
		Ok(())
	}
}

impl EndpointState for Door {
	fn subscriptions() -> Vec<Subscription<Self>> {
		vec![
			Subscription::computed(
				|door: &Door| format!("door/{}/+", door.id),
				Door::on_command,
			)
			.with_qos(QoS::AtLeastOnce),
			Subscription::new("building/#", Door::on_announcement),
		]
	}
}

fn setup_tracing() {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| "info".into());
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(true).compact())
		.init();
}

#[tokio::main]
async fn main() -> Result<(), EndpointError> {
	setup_tracing();

	let door = Door {
		id: "front".to_string(),
		open: AtomicBool::new(false),
	};
	let config = EndpointConfig::localhost("door-front")
		.with_keep_alive(Duration::from_secs(30));
	let endpoint = Arc::new(Endpoint::new(door, config)?);
	let connection = endpoint.connect()?;

	endpoint.wait_connected().await;
	let patterns: Vec<_> = endpoint.registry().patterns().collect();
	info!(patterns = ?patterns, "Door ready");

	tokio::signal::ctrl_c().await.ok();
	connection.shutdown().await;
	Ok(())
}
