//! Connection handle owning the background network loop

use std::time::Duration;

use rumqttc::v5::AsyncClient;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

/// Upper bound on `shutdown`, disconnect request included
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// MQTT connection handle for lifecycle management
///
/// Returned by `Endpoint::connect`. It should be kept alive for the
/// duration of the MQTT session and closed with [`MqttConnection::shutdown`].
pub struct MqttConnection {
	client: AsyncClient,
	event_loop_handle: Option<JoinHandle<()>>,
}

impl MqttConnection {
	/// Create a new connection handle
	pub(crate) fn new(
		client: AsyncClient,
		event_loop_handle: JoinHandle<()>,
	) -> Self {
		Self {
			client,
			event_loop_handle: Some(event_loop_handle),
		}
	}

	/// True once the network loop task has ended
	pub fn is_finished(&self) -> bool {
		self.event_loop_handle
			.as_ref()
			.is_none_or(JoinHandle::is_finished)
	}

	/// Gracefully shutdown the MQTT connection by:
	/// 1. Sending MQTT Disconnect packet (triggers event loop termination)
	/// 2. Waiting for event loop to finish processing, aborting it if it
	///    does not stop in time
	///
	/// Both steps share [`SHUTDOWN_TIMEOUT`]; a request queue that is not
	/// drained while the broker is unreachable cannot block it.
	pub async fn shutdown(mut self) {
		let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
		match timeout_at(deadline, self.client.disconnect()).await {
			| Ok(Ok(())) => {}
			| Ok(Err(e)) => {
				warn!(error = %e, "Failed to disconnect MQTT client");
			}
			| Err(_) => warn!("Disconnect request not accepted in time"),
		}

		if let Some(mut handle) = self.event_loop_handle.take() {
			match timeout_at(deadline, &mut handle).await {
				| Ok(Ok(())) => info!("MQTT connection closed"),
				| Ok(Err(e)) => warn!(error = %e, "Event loop task failed"),
				| Err(_) => {
					warn!(
						timeout = ?SHUTDOWN_TIMEOUT,
						"Event loop did not stop, aborting"
					);
					handle.abort();
				}
			}
		}
	}
}

impl Drop for MqttConnection {
	fn drop(&mut self) {
		if self.event_loop_handle.is_some() {
			error!(
				"MqttConnection dropped without calling shutdown(). Please \
				 call shutdown() and await its completion before dropping."
			);
		}
	}
}

impl std::fmt::Debug for MqttConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MqttConnection")
			.field("finished", &self.is_finished())
			.finish_non_exhaustive()
	}
}
