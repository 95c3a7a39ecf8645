use rumqttc::v5::ClientError;
use thiserror::Error;

use crate::routing::{RegistryError, SessionError};
use crate::topic::{TopicPackError, TopicUnpackError};

/// Errors returned by a transport when a request cannot be queued
#[derive(Debug, Error)]
pub enum TransportError {
	/// rumqttc could not accept the request
	#[error("MQTT client request failed: {0}")]
	Client(#[from] ClientError),

	/// Request refused by a non-rumqttc transport
	#[error("Transport rejected request: {0}")]
	Rejected(String),
}

impl TransportError {
	/// Creates a new Rejected error
	pub fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected(reason.into())
	}
}

/// Errors that can occur in endpoint operations
#[derive(Debug, Error)]
pub enum EndpointError {
	/// Subscription table could not be registered
	#[error("Subscription registry error: {0}")]
	Registry(#[from] RegistryError),

	/// Publish topic could not be built
	#[error("Topic pack error: {0}")]
	Pack(#[from] TopicPackError),

	/// Inbound topic did not fit the pattern
	#[error("Topic unpack error: {0}")]
	Unpack(#[from] TopicUnpackError),

	/// Connection state handling failed
	#[error("Session error: {0}")]
	Session(#[from] SessionError),

	/// Transport refused the request
	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),

	/// `connect` was already called on this endpoint
	#[error("Endpoint is already connected")]
	AlreadyConnected,

	/// `connect` was called outside a tokio runtime
	#[error("No tokio runtime available to run the network loop")]
	NoRuntime,

	/// Invalid configuration value
	#[error("Invalid configuration: {0}")]
	Configuration(String),
}

impl EndpointError {
	/// Creates a new Configuration error
	pub fn configuration(details: impl Into<String>) -> Self {
		Self::Configuration(details.into())
	}
}

impl From<ClientError> for EndpointError {
	fn from(err: ClientError) -> Self {
		EndpointError::Transport(TransportError::Client(err))
	}
}
