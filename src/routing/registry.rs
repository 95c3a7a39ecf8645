//! Registry of resolved subscriptions and inbound message dispatch

use std::collections::HashMap;
use std::fmt;

use arcstr::ArcStr;
use tracing::{debug, error, info, warn};

use super::error::RegistryError;
use super::message::{Delivery, InboundMessage};
use super::subscription::{Handler, HandlerResult, Subscription};
use crate::client::options::SubscribeOptions;
use crate::client::transport::MessagingClient;
use crate::topic::{TopicArgs, TopicMatcherNode, TopicPattern};

/// Resolved subscription owned by the registry
pub struct SubscriptionEntry<T> {
	pattern: TopicPattern,
	options: SubscribeOptions,
	handler: Handler<T>,
}

impl<T> SubscriptionEntry<T> {
	/// Resolved topic filter
	pub fn pattern(&self) -> &TopicPattern {
		&self.pattern
	}

	/// Options used when subscribing to the filter
	pub fn options(&self) -> &SubscribeOptions {
		&self.options
	}

	/// Runs the handler for already unpacked arguments.
	pub fn invoke(
		&self,
		state: &T,
		args: &TopicArgs,
		delivery: &Delivery<'_>,
	) -> HandlerResult {
		(self.handler)(state, args, delivery)
	}
}

impl<T> fmt::Debug for SubscriptionEntry<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionEntry")
			.field("pattern", &self.pattern.as_str())
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

/// Subscriptions of one endpoint, indexed for wildcard lookup.
///
/// Built once when the endpoint is constructed and only read afterwards,
/// so reconnects reuse the same entries.
pub struct SubscriptionRegistry<T> {
	entries: Vec<SubscriptionEntry<T>>,
	/// Resolved filter string to entry position
	index: HashMap<ArcStr, usize>,
	/// Wildcard-aware lookup of entry positions by topic
	matcher: TopicMatcherNode<Vec<usize>>,
}

impl<T> Default for SubscriptionRegistry<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> SubscriptionRegistry<T> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			index: HashMap::new(),
			matcher: TopicMatcherNode::new(),
		}
	}

	/// Resolves every subscription against `state` and registers it.
	///
	/// Fails on the first specifier that does not resolve to a valid filter
	/// or that resolves to a filter already registered.
	pub fn build(
		state: &T,
		subscriptions: impl IntoIterator<Item = Subscription<T>>,
	) -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		for subscription in subscriptions {
			registry.register(state, subscription)?;
		}
		Ok(registry)
	}

	/// Resolves one subscription against `state` and adds it.
	pub fn register(
		&mut self,
		state: &T,
		subscription: Subscription<T>,
	) -> Result<&SubscriptionEntry<T>, RegistryError> {
		let (spec, options, handler) = subscription.into_parts();
		let pattern = spec.resolve(state)?;

		if self.index.contains_key(pattern.as_str()) {
			return Err(RegistryError::duplicate_subscription(pattern.as_str()));
		}

		let position = self.entries.len();
		self.index.insert(pattern.as_arcstr(), position);
		self.matcher.get_or_create(&pattern).push(position);
		debug!(
			pattern = %pattern,
			qos = ?options.qos,
			"Registered subscription"
		);

		self.entries.push(SubscriptionEntry {
			pattern,
			options,
			handler,
		});
		Ok(&self.entries[position])
	}

	/// Entry registered for exactly this filter string
	pub fn get(&self, pattern: &str) -> Option<&SubscriptionEntry<T>> {
		self.index.get(pattern).map(|&position| &self.entries[position])
	}

	/// Entries whose filter matches `topic`, in registration order
	pub fn matching(&self, topic: &str) -> Vec<&SubscriptionEntry<T>> {
		let mut positions: Vec<usize> = self
			.matcher
			.find_by_topic(topic)
			.into_iter()
			.flatten()
			.copied()
			.collect();
		positions.sort_unstable();
		positions
			.into_iter()
			.map(|position| &self.entries[position])
			.collect()
	}

	/// Resolved filter strings in registration order
	pub fn patterns(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.pattern.as_str())
	}

	/// Number of registered subscriptions
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when nothing is registered
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Routes an inbound message to every matching handler.
	///
	/// Handler and unpack failures are logged and never returned, so one bad
	/// message cannot stop the network loop. Returns the number of handlers
	/// that completed successfully.
	pub fn dispatch(
		&self,
		state: &T,
		client: &dyn MessagingClient,
		message: &InboundMessage,
	) -> usize {
		let topic = message.topic.as_str();
		let matching = self.matching(topic);
		if matching.is_empty() {
			debug!(topic = %topic, "No subscription matches inbound message");
			return 0;
		}

		let delivery = Delivery::new(client, message);
		let mut handled = 0;
		for entry in matching {
			let args = match entry.pattern.unpack(topic) {
				| Ok(args) => args,
				| Err(err) => {
					warn!(
						topic = %topic,
						pattern = %entry.pattern,
						error = %err,
						"Failed to unpack topic arguments"
					);
					continue;
				}
			};
			match entry.invoke(state, &args, &delivery) {
				| Ok(()) => handled += 1,
				| Err(err) => {
					error!(
						topic = %topic,
						pattern = %entry.pattern,
						error = %err,
						"Message handler failed"
					);
				}
			}
		}
		handled
	}

	/// Issues one subscribe request per entry with its stored options.
	///
	/// Returns the positions of entries whose request the transport
	/// rejected, to be retried with [`Self::subscribe_entries`].
	pub fn subscribe_all(&self, client: &dyn MessagingClient) -> Vec<usize> {
		let rejected = self.subscribe_entries(client, 0..self.entries.len());
		if rejected.is_empty() {
			info!(total = self.entries.len(), "Sent subscribe requests");
		} else {
			warn!(
				rejected = rejected.len(),
				total = self.entries.len(),
				"Transport rejected subscribe requests, will retry"
			);
		}
		rejected
	}

	/// Issues subscribe requests for the entries at `positions`.
	///
	/// Returns the positions the transport rejected.
	pub fn subscribe_entries(
		&self,
		client: &dyn MessagingClient,
		positions: impl IntoIterator<Item = usize>,
	) -> Vec<usize> {
		let mut rejected = Vec::new();
		for position in positions {
			let Some(entry) = self.entries.get(position) else {
				continue;
			};
			if let Err(err) =
				client.subscribe(entry.pattern.as_str(), &entry.options)
			{
				debug!(
					pattern = %entry.pattern,
					error = %err,
					"Subscribe request rejected"
				);
				rejected.push(position);
			}
		}
		rejected
	}
}

impl<T> fmt::Debug for SubscriptionRegistry<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubscriptionRegistry")
			.field("entries", &self.entries)
			.finish_non_exhaustive()
	}
}
