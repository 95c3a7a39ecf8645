//! Per-request publish and subscribe options

use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::{Filter, PublishProperties, RetainForwardRule};

/// Options for one publish request
#[derive(Debug, Clone)]
pub struct PublishOptions {
	/// Delivery QoS, MQTT default `AtMostOnce`
	pub qos: QoS,
	/// Ask the broker to retain the message
	pub retain: bool,
	/// MQTT v5 publish properties sent with the message
	pub properties: Option<PublishProperties>,
}

impl Default for PublishOptions {
	fn default() -> Self {
		Self {
			qos: QoS::AtMostOnce,
			retain: false,
			properties: None,
		}
	}
}

impl PublishOptions {
	/// Sets the delivery QoS.
	pub fn qos(mut self, qos: QoS) -> Self {
		self.qos = qos;
		self
	}

	/// Sets the retain flag.
	pub fn retain(mut self, retain: bool) -> Self {
		self.retain = retain;
		self
	}

	/// Attaches MQTT v5 publish properties.
	pub fn properties(mut self, properties: PublishProperties) -> Self {
		self.properties = Some(properties);
		self
	}
}

/// When the broker sends retained messages for a new subscription
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetainHandling {
	/// Send retained messages on every subscribe
	#[default]
	OnEverySubscribe,
	/// Send retained messages only if the subscription did not exist
	OnNewSubscribe,
	/// Never send retained messages
	Never,
}

impl From<RetainHandling> for RetainForwardRule {
	fn from(value: RetainHandling) -> Self {
		match value {
			| RetainHandling::OnEverySubscribe => {
				RetainForwardRule::OnEverySubscribe
			}
			| RetainHandling::OnNewSubscribe => {
				RetainForwardRule::OnNewSubscribe
			}
			| RetainHandling::Never => RetainForwardRule::Never,
		}
	}
}

/// Options for subscribing to one topic filter.
///
/// Defaults follow MQTT: QoS 0, local publications echoed back, retain flag
/// cleared on forwarding, retained messages sent on every subscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
	/// Maximum QoS the broker may use when forwarding
	pub qos: QoS,
	/// Do not receive messages published by this client
	pub no_local: bool,
	/// Keep the retain flag as set by the publisher
	pub retain_as_published: bool,
	/// Retained message delivery on subscribe
	pub retain_handling: RetainHandling,
}

impl Default for SubscribeOptions {
	fn default() -> Self {
		Self {
			qos: QoS::AtMostOnce,
			no_local: false,
			retain_as_published: false,
			retain_handling: RetainHandling::default(),
		}
	}
}

impl SubscribeOptions {
	/// Sets the maximum QoS.
	pub fn qos(mut self, qos: QoS) -> Self {
		self.qos = qos;
		self
	}

	/// Sets the no-local flag.
	pub fn no_local(mut self, no_local: bool) -> Self {
		self.no_local = no_local;
		self
	}

	/// Sets the retain-as-published flag.
	pub fn retain_as_published(mut self, retain_as_published: bool) -> Self {
		self.retain_as_published = retain_as_published;
		self
	}

	/// Sets retained message handling.
	pub fn retain_handling(mut self, retain_handling: RetainHandling) -> Self {
		self.retain_handling = retain_handling;
		self
	}

	/// Builds the rumqttc subscription filter for `path`.
	pub fn to_filter(&self, path: impl Into<String>) -> Filter {
		let mut filter = Filter::new(path, self.qos);
		filter.nolocal = self.no_local;
		filter.preserve_retain = self.retain_as_published;
		filter.retain_forward_rule = self.retain_handling.into();
		filter
	}
}
