//! Endpoint: application state bound to its subscriptions and a transport

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use rumqttc::v5::mqttbytes::v5::DisconnectReasonCode;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::config::EndpointConfig;
use super::error::EndpointError;
use super::event_loop;
use super::options::PublishOptions;
use super::transport::{MessagingClient, RumqttTransport};
use crate::connection::MqttConnection;
use crate::routing::{
	EndpointState, InboundMessage, SessionError, SessionSignal, Subscription,
	SubscriptionRegistry,
};
use crate::topic::{TopicArg, pack};

/// Connection state as seen by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
	/// No acknowledged connection
	Disconnected,
	/// Broker acknowledged the connection
	Connected,
}

/// Application state with its declared subscriptions and a transport.
///
/// The registry is built once in the constructor; reconnects only reissue
/// subscribe requests for the same entries. Handlers receive `&T`, so any
/// state they mutate needs interior mutability.
pub struct Endpoint<T, C = RumqttTransport> {
	state: T,
	registry: SubscriptionRegistry<T>,
	client: C,
	status: watch::Sender<ConnectionStatus>,
	/// Registry positions whose subscribe request was rejected
	pending: Mutex<Vec<usize>>,
}

impl<T, C> Endpoint<T, C>
where C: MessagingClient
{
	/// Builds an endpoint from the subscription table of `T`.
	pub fn with_client(state: T, client: C) -> Result<Self, EndpointError>
	where T: EndpointState {
		Self::with_subscriptions(state, client, T::subscriptions())
	}

	/// Builds an endpoint from an explicit subscription list.
	pub fn with_subscriptions(
		state: T,
		client: C,
		subscriptions: impl IntoIterator<Item = Subscription<T>>,
	) -> Result<Self, EndpointError> {
		let registry = SubscriptionRegistry::build(&state, subscriptions)?;
		debug!(subscriptions = registry.len(), "Endpoint created");
		Ok(Self {
			state,
			registry,
			client,
			status: watch::Sender::new(ConnectionStatus::Disconnected),
			pending: Mutex::new(Vec::new()),
		})
	}

	/// Application state
	pub fn state(&self) -> &T {
		&self.state
	}

	/// Transport client
	pub fn client(&self) -> &C {
		&self.client
	}

	/// Resolved subscriptions
	pub fn registry(&self) -> &SubscriptionRegistry<T> {
		&self.registry
	}

	/// Packs `pattern` with `args` and publishes `payload` to the result.
	pub fn publish(
		&self,
		pattern: &str,
		args: &[TopicArg],
		payload: impl Into<Bytes>,
		options: &PublishOptions,
	) -> Result<(), EndpointError> {
		let topic = pack(pattern, args)?;
		debug!(
			topic = %topic,
			qos = ?options.qos,
			"Publishing message"
		);
		self.client.publish(topic, payload.into(), options)?;
		Ok(())
	}

	/// Reacts to an acknowledged connection.
	///
	/// A fresh session gets one subscribe request per registered entry, a
	/// resumed session keeps its subscriptions on the broker. Returns the
	/// number of subscribe requests accepted by the transport; rejected ones
	/// stay pending for [`Self::retry_pending_subscriptions`].
	pub fn handle_connected(
		&self,
		signal: SessionSignal,
	) -> Result<usize, SessionError> {
		let signal = signal.check()?;
		self.status.send_replace(ConnectionStatus::Connected);
		match signal {
			| SessionSignal::Fresh => {
				info!("Connected with fresh session, subscribing");
				let rejected = self.registry.subscribe_all(&self.client);
				let accepted = self.registry.len() - rejected.len();
				*self.pending() = rejected;
				Ok(accepted)
			}
			| _ => {
				info!("Connected with resumed session");
				Ok(0)
			}
		}
	}

	/// Records a lost connection. Never fails.
	pub fn handle_disconnected(&self, reason: Option<DisconnectReasonCode>) {
		let previous = self.status.send_replace(ConnectionStatus::Disconnected);
		if previous == ConnectionStatus::Connected {
			match reason {
				| Some(reason) => {
					warn!(reason = ?reason, "Disconnected by broker");
				}
				| None => info!("Disconnected"),
			}
		}
	}

	/// Routes an inbound message to the matching handlers.
	pub fn dispatch(&self, message: &InboundMessage) -> usize {
		self.registry.dispatch(&self.state, &self.client, message)
	}

	/// Reissues subscribe requests the transport rejected earlier.
	///
	/// Does nothing while disconnected. Returns the number of requests
	/// accepted by this attempt.
	pub fn retry_pending_subscriptions(&self) -> usize {
		let mut pending = self.pending();
		if pending.is_empty() || !self.is_connected() {
			return 0;
		}
		let retry = std::mem::take(&mut *pending);
		let attempted = retry.len();
		*pending = self.registry.subscribe_entries(&self.client, retry);
		let accepted = attempted - pending.len();
		if accepted > 0 {
			info!(
				accepted,
				remaining = pending.len(),
				"Retried subscribe requests"
			);
		}
		accepted
	}

	/// Number of subscribe requests waiting for a retry
	pub fn pending_subscriptions(&self) -> usize {
		self.pending().len()
	}

	fn pending(&self) -> MutexGuard<'_, Vec<usize>> {
		self.pending.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Current connection status
	pub fn status(&self) -> ConnectionStatus {
		*self.status.borrow()
	}

	/// True while the broker connection is acknowledged
	pub fn is_connected(&self) -> bool {
		self.status() == ConnectionStatus::Connected
	}

	/// Receiver notified on every status change
	pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
		self.status.subscribe()
	}

	/// Waits until the broker acknowledges a connection.
	pub async fn wait_connected(&self) {
		let mut status = self.status.subscribe();
		if status
			.wait_for(|status| *status == ConnectionStatus::Connected)
			.await
			.is_err()
		{
			error!("Connection status channel closed");
		}
	}
}

impl<T> Endpoint<T, RumqttTransport>
where T: Send + Sync + 'static
{
	/// Creates an endpoint backed by rumqttc. Does not connect.
	///
	/// ```rust
	/// use mqtt_endpoint::{
	///	 Endpoint, EndpointConfig, EndpointState, Subscription,
	/// };
	///
	/// struct Idle;
	///
	/// impl EndpointState for Idle {
	///     fn subscriptions() -> Vec<Subscription<Self>> {
	///         vec![Subscription::new("status/#", |_, _, _| Ok(()))]
	///     }
	/// }
	///
	/// let endpoint = Endpoint::new(Idle, EndpointConfig::localhost("idle"))?;
	/// assert_eq!(endpoint.registry().len(), 1);
	/// # Ok::<(), mqtt_endpoint::EndpointError>(())
	/// ```
	pub fn new(state: T, config: EndpointConfig) -> Result<Self, EndpointError>
	where T: EndpointState {
		Self::from_config(state, config, T::subscriptions())
	}

	/// Creates a rumqttc endpoint from an explicit subscription list.
	pub fn from_config(
		state: T,
		config: EndpointConfig,
		subscriptions: impl IntoIterator<Item = Subscription<T>>,
	) -> Result<Self, EndpointError> {
		let capacity = config.client.request_channel_capacity;
		if capacity == 0 {
			return Err(EndpointError::configuration(
				"request_channel_capacity must be > 0",
			));
		}
		let registry = SubscriptionRegistry::build(&state, subscriptions)?;
		// All subscribe requests of a fresh session are queued at once
		if registry.len() > capacity {
			return Err(EndpointError::configuration(format!(
				"{} subscriptions exceed request_channel_capacity {capacity}",
				registry.len()
			)));
		}
		Ok(Self {
			state,
			registry,
			client: RumqttTransport::new(&config),
			status: watch::Sender::new(ConnectionStatus::Disconnected),
			pending: Mutex::new(Vec::new()),
		})
	}

	/// Starts the network loop on the current tokio runtime.
	///
	/// Returns immediately; the connection is established in the
	/// background. Can be called once per endpoint.
	pub fn connect(self: &Arc<Self>) -> Result<MqttConnection, EndpointError> {
		let runtime = tokio::runtime::Handle::try_current()
			.map_err(|_| EndpointError::NoRuntime)?;
		let event_loop = self
			.client
			.take_event_loop()
			.ok_or(EndpointError::AlreadyConnected)?;

		let handle = runtime.spawn(event_loop::run(
			Arc::clone(self),
			event_loop,
			self.client.session_start(),
		));
		info!("Endpoint network loop started");
		Ok(MqttConnection::new(self.client.client().clone(), handle))
	}
}

impl<T, C> std::fmt::Debug for Endpoint<T, C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Endpoint")
			.field("registry", &self.registry)
			.field("status", &*self.status.borrow())
			.finish_non_exhaustive()
	}
}
