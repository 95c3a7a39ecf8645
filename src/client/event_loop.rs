//! Background task polling the rumqttc event loop

use std::sync::Arc;
use std::time::Duration;

use rumqttc::Outgoing;
use rumqttc::v5::mqttbytes::v5::{ConnAck, ConnectReturnCode, Packet, Publish};
use rumqttc::v5::{Event, EventLoop, MqttOptions};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::config::SessionStart;
use super::endpoint::Endpoint;
use super::transport::{MessagingClient, RumqttTransport, inbound_from_publish};
use crate::routing::{SessionError, SessionSignal};

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);
pub(crate) const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before the next poll after `error_count` consecutive failures
pub(crate) fn retry_delay(error_count: u32) -> Duration {
	let exponent = error_count.saturating_sub(1).min(10);
	(INITIAL_RETRY_DELAY * 2_u32.pow(exponent)).min(MAX_RETRY_DELAY)
}

/// Applies a ConnAck to the endpoint and to the options used on reconnect.
///
/// A refused connection changes nothing. `Err` means the loop must stop.
pub(crate) fn handle_connack<T, C>(
	endpoint: &Endpoint<T, C>,
	options: &mut MqttOptions,
	ack: &ConnAck,
	session_start: SessionStart,
) -> Result<(), SessionError>
where C: MessagingClient {
	if !matches!(ack.code, ConnectReturnCode::Success) {
		warn!(code = ?ack.code, "Connection refused by broker");
		return Ok(());
	}
	let signal = SessionSignal::from(ack.session_present);
	let subscribed = endpoint.handle_connected(signal)?;
	debug!(session = %signal, subscribed, "Connection acknowledged");
	if session_start == SessionStart::FirstOnly {
		options.set_clean_start(false);
	}
	Ok(())
}

/// Routes a received publish packet; returns the number of handlers run.
pub(crate) fn handle_publish<T, C>(
	endpoint: &Endpoint<T, C>,
	publish: Publish,
) -> usize
where C: MessagingClient {
	debug!(
		payload_size = publish.payload.len(),
		"Received MQTT message"
	);
	inbound_from_publish(publish)
		.map_or(0, |message| endpoint.dispatch(&message))
}

/// Polls the event loop until the client disconnects.
///
/// Connection errors are retried forever with exponential backoff; rumqttc
/// reconnects on the next poll. Subscribe requests rejected by a full
/// request queue are retried after every event. The loop ends on a
/// client-initiated Disconnect or on an unknown session signal.
pub(crate) async fn run<T>(
	endpoint: Arc<Endpoint<T, RumqttTransport>>,
	mut event_loop: EventLoop,
	session_start: SessionStart,
) where
	T: Send + Sync + 'static,
{
	let mut error_count: u32 = 0;

	loop {
		match event_loop.poll().await {
			| Ok(Event::Incoming(Packet::ConnAck(ack))) => {
				error_count = 0;
				let options = &mut event_loop.options;
				if let Err(err) =
					handle_connack(&*endpoint, options, &ack, session_start)
				{
					error!(error = %err, "Terminating network loop");
					break;
				}
			}
			| Ok(Event::Incoming(Packet::Publish(publish))) => {
				error_count = 0;
				handle_publish(&*endpoint, publish);
			}
			| Ok(Event::Incoming(Packet::Disconnect(disconnect))) => {
				info!("Received MQTT Disconnect packet from server");
				endpoint.handle_disconnected(Some(disconnect.reason_code));
			}
			| Ok(Event::Outgoing(Outgoing::Disconnect)) => {
				info!("Sent MQTT Disconnect packet to server");
				endpoint.handle_disconnected(None);
				break;
			}
			| Ok(notification) => {
				debug!(
					notification = ?notification,
					"Received MQTT notification"
				);
			}
			| Err(err) => {
				error_count = error_count.saturating_add(1);
				endpoint.handle_disconnected(None);
				let delay = retry_delay(error_count);
				warn!(
					error = %err,
					error_count,
					delay = ?delay,
					"MQTT event loop error, retrying"
				);
				time::sleep(delay).await;
				continue;
			}
		}
		endpoint.retry_pending_subscriptions();
	}
	info!("MQTT event loop terminated");
}
