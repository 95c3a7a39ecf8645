//! Inbound message and per-delivery metadata handed to handlers

use arcstr::ArcStr;
use bytes::Bytes;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::PublishProperties;

use crate::client::error::EndpointError;
use crate::client::options::PublishOptions;
use crate::client::transport::MessagingClient;
use crate::topic::{TopicArg, pack};

/// Raw MQTT message as received from the broker.
///
/// Payload and MQTT v5 properties are passed through undecoded.
#[derive(Debug, Clone)]
pub struct InboundMessage {
	/// Concrete topic the message was published to
	pub topic: ArcStr,
	/// Raw payload bytes
	pub payload: Bytes,
	/// Delivery QoS
	pub qos: QoS,
	/// Retained message flag
	pub retain: bool,
	/// Redelivery flag
	pub dup: bool,
	/// MQTT v5 publish properties, if any were sent
	pub properties: Option<PublishProperties>,
}

impl InboundMessage {
	/// Creates a message with QoS 0 and no flags or properties.
	pub fn new(topic: impl Into<ArcStr>, payload: impl Into<Bytes>) -> Self {
		Self {
			topic: topic.into(),
			payload: payload.into(),
			qos: QoS::AtMostOnce,
			retain: false,
			dup: false,
			properties: None,
		}
	}

	/// Sets delivery QoS.
	pub fn with_qos(mut self, qos: QoS) -> Self {
		self.qos = qos;
		self
	}

	/// Sets retain flag.
	pub fn with_retain(mut self, retain: bool) -> Self {
		self.retain = retain;
		self
	}

	/// Sets publish properties.
	pub fn with_properties(mut self, properties: PublishProperties) -> Self {
		self.properties = Some(properties);
		self
	}
}

/// Metadata passed to a handler next to the unpacked topic arguments.
///
/// Gives access to the transport client and the raw message. The endpoint
/// state the handler receives as first argument plays the role of user data.
#[derive(Clone, Copy)]
pub struct Delivery<'a> {
	client: &'a dyn MessagingClient,
	message: &'a InboundMessage,
}

impl<'a> Delivery<'a> {
	/// Creates delivery metadata for one message.
	pub fn new(
		client: &'a dyn MessagingClient,
		message: &'a InboundMessage,
	) -> Self {
		Self { client, message }
	}

	/// Transport client the message arrived on.
	pub fn client(&self) -> &'a dyn MessagingClient {
		self.client
	}

	/// The raw message.
	pub fn message(&self) -> &'a InboundMessage {
		self.message
	}

	/// Concrete topic of the message.
	pub fn topic(&self) -> &'a str {
		&self.message.topic
	}

	/// Raw payload of the message.
	pub fn payload(&self) -> &'a Bytes {
		&self.message.payload
	}

	/// Packs `pattern` with `args` and publishes through the same client.
	pub fn publish(
		&self,
		pattern: &str,
		args: &[TopicArg],
		payload: impl Into<Bytes>,
		options: &PublishOptions,
	) -> Result<(), EndpointError> {
		let topic = pack(pattern, args)?;
		self.client.publish(topic, payload.into(), options)?;
		Ok(())
	}
}

impl std::fmt::Debug for Delivery<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Delivery")
			.field("message", self.message)
			.finish_non_exhaustive()
	}
}
