//! Tests for subscription resolution and dispatch

use std::sync::Mutex;

use bytes::Bytes;
use rumqttc::v5::mqttbytes::v5::PublishProperties;

use super::{
	Delivery, InboundMessage, PatternSpec, RegistryError, Subscription,
	SubscriptionRegistry,
};
use crate::client::error::TransportError;
use crate::client::options::{PublishOptions, SubscribeOptions};
use crate::client::transport::MessagingClient;
use crate::topic::{PatternFormatError, TopicArg, TopicArgs};

#[derive(Default)]
struct RecordingClient {
	published: Mutex<Vec<(String, Bytes)>>,
	subscribed: Mutex<Vec<String>>,
	/// Subscribe requests still to be refused
	rejections: Mutex<usize>,
}

impl RecordingClient {
	fn rejecting(rejections: usize) -> Self {
		Self {
			rejections: Mutex::new(rejections),
			..Self::default()
		}
	}
}

impl MessagingClient for RecordingClient {
	fn publish(
		&self,
		topic: String,
		payload: Bytes,
		_options: &PublishOptions,
	) -> Result<(), TransportError> {
		self.published.lock().unwrap().push((topic, payload));
		Ok(())
	}

	fn subscribe(
		&self,
		filter: &str,
		_options: &SubscribeOptions,
	) -> Result<(), TransportError> {
		let mut rejections = self.rejections.lock().unwrap();
		if *rejections > 0 {
			*rejections -= 1;
			return Err(TransportError::rejected("queue full"));
		}
		self.subscribed.lock().unwrap().push(filter.to_string());
		Ok(())
	}

	fn disconnect(&self) -> Result<(), TransportError> {
		Ok(())
	}
}

/// State recording every handler call as (handler name, topic args)
#[derive(Default)]
struct Recorder {
	name: String,
	calls: Mutex<Vec<(&'static str, Vec<TopicArg>)>>,
}

impl Recorder {
	fn named(name: &str) -> Self {
		Self {
			name: name.to_string(),
			..Self::default()
		}
	}

	fn record(&self, handler: &'static str, args: &TopicArgs) {
		self.calls
			.lock()
			.unwrap()
			.push((handler, args.iter().cloned().collect()));
	}

	fn calls(&self) -> Vec<(&'static str, Vec<TopicArg>)> {
		self.calls.lock().unwrap().clone()
	}
}

fn recording(
	pattern: impl Into<PatternSpec<Recorder>>,
	handler: &'static str,
) -> Subscription<Recorder> {
	Subscription::new(pattern, move |state: &Recorder, args, _| {
		state.record(handler, args);
		Ok(())
	})
}

#[test]
fn test_build_registers_in_order() {
	let state = Recorder::default();
	let registry = SubscriptionRegistry::build(&state, [
		recording("a/b/c", "exact"),
		recording("a/+/c", "plus"),
		recording("a/#", "hash"),
	])
	.unwrap();

	assert_eq!(registry.len(), 3);
	assert!(!registry.is_empty());
	assert_eq!(registry.patterns().collect::<Vec<_>>(), vec![
		"a/b/c", "a/+/c", "a/#"
	]);
	assert!(registry.get("a/+/c").is_some());
	assert!(registry.get("a/+").is_none());
}

#[test]
fn test_duplicate_subscription() {
	let state = Recorder::default();
	let result = SubscriptionRegistry::build(&state, [
		recording("a/+/c", "first"),
		recording("a/+/c", "second"),
	]);

	assert_eq!(
		result.err(),
		Some(RegistryError::duplicate_subscription("a/+/c"))
	);
}

#[test]
fn test_computed_duplicates_literal() {
	let state = Recorder::named("x");
	let result = SubscriptionRegistry::build(&state, [
		recording("door/x/state", "literal"),
		recording(
			PatternSpec::computed(|r: &Recorder| {
				format!("door/{}/state", r.name)
			}),
			"computed",
		),
	]);

	assert!(matches!(
		result,
		Err(RegistryError::DuplicateSubscription { .. })
	));
}

#[test]
fn test_computed_pattern_per_instance() {
	let subscriptions = || {
		vec![recording(
			PatternSpec::computed(|r: &Recorder| format!("door/{}/+", r.name)),
			"command",
		)]
	};
	let front = Recorder::named("front");
	let back = Recorder::named("back");

	let front_registry =
		SubscriptionRegistry::build(&front, subscriptions()).unwrap();
	let back_registry =
		SubscriptionRegistry::build(&back, subscriptions()).unwrap();

	assert_eq!(front_registry.patterns().collect::<Vec<_>>(), vec![
		"door/front/+"
	]);
	assert_eq!(back_registry.patterns().collect::<Vec<_>>(), vec![
		"door/back/+"
	]);
}

#[test]
fn test_invalid_computed_pattern() {
	let state = Recorder::named("a+b");
	let result = SubscriptionRegistry::build(&state, [recording(
		PatternSpec::computed(|r: &Recorder| format!("door/{}", r.name)),
		"bad",
	)]);

	assert_eq!(
		result.err(),
		Some(RegistryError::InvalidPatternSpecifier {
			resolved: "door/a+b".to_string(),
			source: PatternFormatError::mixed_wildcard("door/a+b", "a+b"),
		})
	);
}

#[test]
fn test_invalid_literal_pattern() {
	let state = Recorder::default();
	let result =
		SubscriptionRegistry::build(&state, [recording("a/#/b", "bad")]);

	assert!(matches!(
		result,
		Err(RegistryError::InvalidPatternSpecifier {
			source: PatternFormatError::HashNotLast { .. },
			..
		})
	));
}

#[test]
fn test_dispatch_unpacks_arguments() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [recording(
		"sensors/+/data/#",
		"sensor",
	)])
	.unwrap();

	let message = InboundMessage::new("sensors/kitchen/data/temp/raw", "21");
	assert_eq!(registry.dispatch(&state, &client, &message), 1);

	assert_eq!(state.calls(), vec![(
		"sensor",
		vec![
			TopicArg::from("kitchen"),
			TopicArg::from(vec!["temp", "raw"])
		]
	)]);
}

#[test]
fn test_dispatch_all_matching_in_registration_order() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [
		recording("a/#", "hash"),
		recording("a/+/c", "plus"),
		recording("a/b/c", "exact"),
		recording("x/y", "other"),
	])
	.unwrap();

	let handled =
		registry.dispatch(&state, &client, &InboundMessage::new("a/b/c", ""));

	assert_eq!(handled, 3);
	let names: Vec<_> =
		state.calls().into_iter().map(|(name, _)| name).collect();
	assert_eq!(names, vec!["hash", "plus", "exact"]);
}

#[test]
fn test_dispatch_hash_receives_parent_level() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry =
		SubscriptionRegistry::build(&state, [recording("a/b/#", "hash")])
			.unwrap();

	registry.dispatch(&state, &client, &InboundMessage::new("a/b", ""));

	assert_eq!(state.calls(), vec![("hash", vec![TopicArg::Levels(vec![])])]);
}

#[test]
fn test_dispatch_ignores_unmatched_topic() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry =
		SubscriptionRegistry::build(&state, [recording("a/+/c", "plus")])
			.unwrap();

	let handled =
		registry.dispatch(&state, &client, &InboundMessage::new("a/b/c/d", ""));

	assert_eq!(handled, 0);
	assert!(state.calls().is_empty());
}

#[test]
fn test_dispatch_skips_wildcard_for_dollar_topics() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [
		recording("#", "all"),
		recording("$SYS/#", "sys"),
	])
	.unwrap();

	registry.dispatch(&state, &client, &InboundMessage::new("$SYS/uptime", ""));

	let names: Vec<_> =
		state.calls().into_iter().map(|(name, _)| name).collect();
	assert_eq!(names, vec!["sys"]);
}

#[test]
fn test_dispatch_survives_handler_error() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [
		Subscription::new(
			"a/+",
			|_: &Recorder, _: &TopicArgs, _: &Delivery<'_>| Err("boom".into()),
		),
		recording("a/#", "hash"),
	])
	.unwrap();

	let handled =
		registry.dispatch(&state, &client, &InboundMessage::new("a/b", ""));

	assert_eq!(handled, 1);
	assert_eq!(state.calls().len(), 1);

	// the next message is still routed
	registry.dispatch(&state, &client, &InboundMessage::new("a/c", ""));
	assert_eq!(state.calls().len(), 2);
}

#[test]
fn test_handler_publishes_through_delivery() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [Subscription::new(
		"door/+/command",
		|_: &Recorder, args: &TopicArgs, delivery: &Delivery<'_>| {
			assert_eq!(delivery.topic(), "door/front/command");
			assert_eq!(&delivery.payload()[..], b"open");
			delivery.publish(
				"door/+/state",
				args.as_slice(),
				"opening",
				&PublishOptions::default(),
			)?;
			Ok(())
		},
	)])
	.unwrap();

	registry.dispatch(
		&state,
		&client,
		&InboundMessage::new("door/front/command", "open"),
	);

	assert_eq!(client.published.lock().unwrap().clone(), vec![(
		"door/front/state".to_string(),
		Bytes::from("opening")
	)]);
}

#[test]
fn test_subscribe_all_once_per_pattern() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [
		recording("a/+/c", "plus"),
		recording("a/#", "hash"),
	])
	.unwrap();

	assert!(registry.subscribe_all(&client).is_empty());
	assert_eq!(client.subscribed.lock().unwrap().clone(), vec![
		"a/+/c".to_string(),
		"a/#".to_string()
	]);
}

#[test]
fn test_subscribe_all_returns_rejected_positions() {
	let state = Recorder::default();
	let client = RecordingClient::rejecting(2);
	let registry = SubscriptionRegistry::build(&state, [
		recording("a/+/c", "plus"),
		recording("a/#", "hash"),
		recording("x/y", "exact"),
	])
	.unwrap();

	let rejected = registry.subscribe_all(&client);
	assert_eq!(rejected, vec![0, 1]);
	assert_eq!(client.subscribed.lock().unwrap().clone(), vec![
		"x/y".to_string()
	]);

	assert!(registry.subscribe_entries(&client, rejected).is_empty());
	assert_eq!(client.subscribed.lock().unwrap().clone(), vec![
		"x/y".to_string(),
		"a/+/c".to_string(),
		"a/#".to_string()
	]);
}

#[test]
fn test_subscribe_entries_skips_unknown_positions() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry =
		SubscriptionRegistry::build(&state, [recording("a/+/c", "plus")])
			.unwrap();

	assert!(registry.subscribe_entries(&client, [0, 7]).is_empty());
	assert_eq!(client.subscribed.lock().unwrap().len(), 1);
}

#[test]
fn test_handler_sees_message_flags() {
	let state = Recorder::default();
	let client = RecordingClient::default();
	let registry = SubscriptionRegistry::build(&state, [Subscription::new(
		"config/#",
		|_: &Recorder, _: &TopicArgs, delivery: &Delivery<'_>| {
			let message = delivery.message();
			assert!(message.retain);
			assert_eq!(
				message
					.properties
					.as_ref()
					.and_then(|p| p.content_type.as_deref()),
				Some("text/plain")
			);
			Ok(())
		},
	)])
	.unwrap();

	let properties = PublishProperties {
		content_type: Some("text/plain".to_string()),
		..PublishProperties::default()
	};
	let message = InboundMessage::new("config/mode", "eco")
		.with_retain(true)
		.with_properties(properties);

	assert_eq!(registry.dispatch(&state, &client, &message), 1);
}

#[test]
fn test_entry_keeps_options() {
	let state = Recorder::default();
	let subscription = recording("a/+", "plus")
		.with_options(SubscribeOptions::default().no_local(true));
	let registry = SubscriptionRegistry::build(&state, [subscription]).unwrap();

	let entry = registry.get("a/+").unwrap();
	assert_eq!(entry.pattern().as_str(), "a/+");
	assert!(entry.options().no_local);
}
