//! Transport seam between the endpoint and an MQTT client

use std::sync::Mutex;

use bytes::Bytes;
use rumqttc::v5::mqttbytes::v5::Publish;
use rumqttc::v5::{AsyncClient, EventLoop, MqttOptions};
use tracing::warn;

use super::config::{EndpointConfig, SessionStart};
use super::error::TransportError;
use super::options::{PublishOptions, SubscribeOptions};
use crate::routing::InboundMessage;

/// Requests an endpoint sends to its MQTT client.
///
/// All methods only enqueue the request and return immediately; delivery
/// happens on the network loop.
pub trait MessagingClient: Send + Sync {
	/// Publishes `payload` to a concrete topic.
	fn publish(
		&self,
		topic: String,
		payload: Bytes,
		options: &PublishOptions,
	) -> Result<(), TransportError>;

	/// Subscribes to a topic filter.
	fn subscribe(
		&self,
		filter: &str,
		options: &SubscribeOptions,
	) -> Result<(), TransportError>;

	/// Asks the broker to close the connection.
	fn disconnect(&self) -> Result<(), TransportError>;
}

impl MessagingClient for AsyncClient {
	fn publish(
		&self,
		topic: String,
		payload: Bytes,
		options: &PublishOptions,
	) -> Result<(), TransportError> {
		match &options.properties {
			| Some(properties) => self.try_publish_with_properties(
				topic,
				options.qos,
				options.retain,
				payload,
				properties.clone(),
			)?,
			| None => {
				self.try_publish(topic, options.qos, options.retain, payload)?
			}
		}
		Ok(())
	}

	fn subscribe(
		&self,
		filter: &str,
		options: &SubscribeOptions,
	) -> Result<(), TransportError> {
		self.try_subscribe_many(std::iter::once(options.to_filter(filter)))?;
		Ok(())
	}

	fn disconnect(&self) -> Result<(), TransportError> {
		self.try_disconnect()?;
		Ok(())
	}
}

/// rumqttc v5 client together with its not yet polled event loop
pub struct RumqttTransport {
	client: AsyncClient,
	event_loop: Mutex<Option<EventLoop>>,
	session_start: SessionStart,
}

impl RumqttTransport {
	/// Creates the client and event loop without connecting.
	pub fn new(config: &EndpointConfig) -> Self {
		Self::from_options(
			config.to_mqtt_options(),
			config.client.request_channel_capacity,
			config.server.session_start,
		)
	}

	/// Creates the client and event loop from raw rumqttc options.
	///
	/// `session_start` decides whether clean start is switched off after the
	/// first acknowledged connection.
	pub fn from_options(
		options: MqttOptions,
		capacity: usize,
		session_start: SessionStart,
	) -> Self {
		let (client, event_loop) = AsyncClient::new(options, capacity);
		Self {
			client,
			event_loop: Mutex::new(Some(event_loop)),
			session_start,
		}
	}

	/// Underlying rumqttc client handle
	pub fn client(&self) -> &AsyncClient {
		&self.client
	}

	/// Session start policy applied by the network loop
	pub fn session_start(&self) -> SessionStart {
		self.session_start
	}

	/// Takes the event loop out; `None` once it was handed to a task.
	pub(crate) fn take_event_loop(&self) -> Option<EventLoop> {
		match self.event_loop.lock() {
			| Ok(mut guard) => guard.take(),
			| Err(poisoned) => poisoned.into_inner().take(),
		}
	}
}

impl MessagingClient for RumqttTransport {
	fn publish(
		&self,
		topic: String,
		payload: Bytes,
		options: &PublishOptions,
	) -> Result<(), TransportError> {
		MessagingClient::publish(&self.client, topic, payload, options)
	}

	fn subscribe(
		&self,
		filter: &str,
		options: &SubscribeOptions,
	) -> Result<(), TransportError> {
		MessagingClient::subscribe(&self.client, filter, options)
	}

	fn disconnect(&self) -> Result<(), TransportError> {
		MessagingClient::disconnect(&self.client)
	}
}

impl std::fmt::Debug for RumqttTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RumqttTransport").finish_non_exhaustive()
	}
}

/// Converts a received v5 publish packet; `None` if the topic is not UTF-8.
pub(crate) fn inbound_from_publish(publish: Publish) -> Option<InboundMessage> {
	let topic = match std::str::from_utf8(&publish.topic) {
		| Ok(topic) => topic,
		| Err(err) => {
			warn!(error = %err, "Dropping message with non UTF-8 topic");
			return None;
		}
	};
	Some(InboundMessage {
		topic: topic.into(),
		payload: publish.payload,
		qos: publish.qos,
		retain: publish.retain,
		dup: publish.dup,
		properties: publish.properties,
	})
}
