//! Tests for ConnAck and Publish handling of the network loop

use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use rumqttc::v5::MqttOptions;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::{ConnAck, ConnectReturnCode, Publish};

use super::config::SessionStart;
use super::endpoint::{ConnectionStatus, Endpoint};
use super::error::TransportError;
use super::event_loop::{
	MAX_RETRY_DELAY, handle_connack, handle_publish, retry_delay,
};
use super::options::{PublishOptions, SubscribeOptions};
use super::transport::MessagingClient;
use crate::routing::{Delivery, HandlerResult, Subscription};
use crate::topic::TopicArgs;

#[derive(Default)]
struct RecordingClient {
	subscribed: Mutex<Vec<String>>,
}

impl MessagingClient for RecordingClient {
	fn publish(
		&self,
		_topic: String,
		_payload: Bytes,
		_options: &PublishOptions,
	) -> Result<(), TransportError> {
		Ok(())
	}

	fn subscribe(
		&self,
		filter: &str,
		_options: &SubscribeOptions,
	) -> Result<(), TransportError> {
		self.subscribed.lock().unwrap().push(filter.to_string());
		Ok(())
	}

	fn disconnect(&self) -> Result<(), TransportError> {
		Ok(())
	}
}

/// Topics seen by the handlers
#[derive(Default)]
struct Inbox {
	topics: Mutex<Vec<String>>,
}

fn store(
	inbox: &Inbox,
	_: &TopicArgs,
	delivery: &Delivery<'_>,
) -> HandlerResult {
	inbox.topics.lock().unwrap().push(delivery.topic().to_string());
	Ok(())
}

fn inbox_endpoint() -> Endpoint<Inbox, RecordingClient> {
	Endpoint::with_subscriptions(
		Inbox::default(),
		RecordingClient::default(),
		[
			Subscription::new("sensors/+/temp", store),
			Subscription::new("alerts/#", store),
		],
	)
	.unwrap()
}

fn clean_options() -> MqttOptions {
	let mut options = MqttOptions::new("inbox", "localhost", 1883);
	options.set_clean_start(true);
	options
}

fn connack(session_present: bool) -> ConnAck {
	ConnAck {
		session_present,
		code: ConnectReturnCode::Success,
		properties: None,
	}
}

fn publish(topic: &'static [u8], payload: &'static str) -> Publish {
	Publish {
		dup: false,
		qos: QoS::AtMostOnce,
		retain: false,
		topic: Bytes::from_static(topic),
		pkid: 0,
		payload: Bytes::from_static(payload.as_bytes()),
		properties: None,
	}
}

#[test]
fn test_retry_delay_doubles_until_capped() {
	assert_eq!(retry_delay(1), Duration::from_millis(100));
	assert_eq!(retry_delay(2), Duration::from_millis(200));
	assert_eq!(retry_delay(4), Duration::from_millis(800));
	assert_eq!(retry_delay(9), Duration::from_millis(25_600));
	assert_eq!(retry_delay(10), MAX_RETRY_DELAY);
	assert_eq!(retry_delay(u32::MAX), MAX_RETRY_DELAY);
}

#[test]
fn test_first_connack_turns_clean_start_off() {
	let endpoint = inbox_endpoint();
	let mut options = clean_options();

	handle_connack(
		&endpoint,
		&mut options,
		&connack(false),
		SessionStart::FirstOnly,
	)
	.unwrap();

	assert!(!options.clean_start());
	assert!(endpoint.is_connected());
}

#[test]
fn test_clean_session_start_keeps_clean_start() {
	let endpoint = inbox_endpoint();
	let mut options = clean_options();

	handle_connack(
		&endpoint,
		&mut options,
		&connack(false),
		SessionStart::Clean,
	)
	.unwrap();

	assert!(options.clean_start());
}

#[test]
fn test_fresh_connack_subscribes_every_pattern() {
	let endpoint = inbox_endpoint();
	let mut options = clean_options();

	handle_connack(
		&endpoint,
		&mut options,
		&connack(false),
		SessionStart::FirstOnly,
	)
	.unwrap();

	assert_eq!(endpoint.client().subscribed.lock().unwrap().clone(), vec![
		"sensors/+/temp".to_string(),
		"alerts/#".to_string()
	]);
}

#[test]
fn test_resumed_connack_does_not_subscribe() {
	let endpoint = inbox_endpoint();
	let mut options = clean_options();

	handle_connack(
		&endpoint,
		&mut options,
		&connack(true),
		SessionStart::Resume,
	)
	.unwrap();

	assert!(endpoint.client().subscribed.lock().unwrap().is_empty());
	assert!(endpoint.is_connected());
}

#[test]
fn test_refused_connack_changes_nothing() {
	let endpoint = inbox_endpoint();
	let mut options = clean_options();
	let ack = ConnAck {
		code: ConnectReturnCode::NotAuthorized,
		..connack(false)
	};

	handle_connack(&endpoint, &mut options, &ack, SessionStart::FirstOnly)
		.unwrap();

	assert!(options.clean_start());
	assert_eq!(endpoint.status(), ConnectionStatus::Disconnected);
	assert!(endpoint.client().subscribed.lock().unwrap().is_empty());
}

#[test]
fn test_publish_is_dispatched() {
	let endpoint = inbox_endpoint();

	let reading = publish(b"sensors/hall/temp", "20");
	assert_eq!(handle_publish(&endpoint, reading), 1);
	assert_eq!(handle_publish(&endpoint, publish(b"alerts", "")), 1);
	assert_eq!(handle_publish(&endpoint, publish(b"other/topic", "")), 0);

	assert_eq!(endpoint.state().topics.lock().unwrap().clone(), vec![
		"sensors/hall/temp".to_string(),
		"alerts".to_string()
	]);
}

#[test]
fn test_publish_with_invalid_topic_is_dropped() {
	let endpoint = inbox_endpoint();

	assert_eq!(handle_publish(&endpoint, publish(&[0xff, 0xfe], "x")), 0);
	assert!(endpoint.state().topics.lock().unwrap().is_empty());
}
