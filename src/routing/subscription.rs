//! Declarative subscriptions: pattern specifier, options and handler

use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;

use super::error::RegistryError;
use super::message::Delivery;
use crate::client::options::SubscribeOptions;
use crate::topic::{TopicArgs, TopicPattern};

/// Error returned by a message handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by a message handler
pub type HandlerResult = Result<(), HandlerError>;

/// Message handler bound to a subscription.
///
/// Called with the endpoint state, one argument per wildcard of the pattern,
/// and the delivery metadata.
pub type Handler<T> =
	Arc<dyn Fn(&T, &TopicArgs, &Delivery<'_>) -> HandlerResult + Send + Sync>;

type PatternFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Source of a subscription's topic filter
pub enum PatternSpec<T> {
	/// Fixed pattern string
	Literal(ArcStr),
	/// Pattern computed from the endpoint state at construction
	Computed(PatternFn<T>),
}

impl<T> PatternSpec<T> {
	/// Computes the pattern from endpoint state.
	pub fn computed<F>(f: F) -> Self
	where F: Fn(&T) -> String + Send + Sync + 'static {
		PatternSpec::Computed(Arc::new(f))
	}

	/// Resolves the specifier against `state` and validates the result.
	pub fn resolve(&self, state: &T) -> Result<TopicPattern, RegistryError> {
		let resolved = match self {
			| PatternSpec::Literal(pattern) => pattern.clone(),
			| PatternSpec::Computed(f) => ArcStr::from(f(state)),
		};
		TopicPattern::parse(resolved.clone()).map_err(|source| {
			RegistryError::InvalidPatternSpecifier {
				resolved: resolved.to_string(),
				source,
			}
		})
	}
}

impl<T> Clone for PatternSpec<T> {
	fn clone(&self) -> Self {
		match self {
			| PatternSpec::Literal(pattern) => {
				PatternSpec::Literal(pattern.clone())
			}
			| PatternSpec::Computed(f) => PatternSpec::Computed(Arc::clone(f)),
		}
	}
}

impl<T> fmt::Debug for PatternSpec<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| PatternSpec::Literal(pattern) => {
				f.debug_tuple("Literal").field(pattern).finish()
			}
			| PatternSpec::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

impl<T> From<&str> for PatternSpec<T> {
	fn from(pattern: &str) -> Self {
		PatternSpec::Literal(ArcStr::from(pattern))
	}
}

impl<T> From<String> for PatternSpec<T> {
	fn from(pattern: String) -> Self {
		PatternSpec::Literal(ArcStr::from(pattern))
	}
}

impl<T> From<ArcStr> for PatternSpec<T> {
	fn from(pattern: ArcStr) -> Self {
		PatternSpec::Literal(pattern)
	}
}

/// Declared subscription: pattern specifier, subscribe options and handler.
///
/// ```rust
/// use mqtt_endpoint::{Delivery, HandlerResult, QoS, Subscription, TopicArgs};
///
/// struct Door {
///     id: String,
/// }
///
/// impl Door {
///     fn on_command(
///         &self,
///         args: &TopicArgs,
///         _: &Delivery<'_>,
///     ) -> HandlerResult {
///         println!("door {} got {:?}", self.id, args.level(0));
///         Ok(())
///     }
/// }
///
/// let subscription = Subscription::computed(
///     |door: &Door| format!("door/{}/+", door.id),
///     Door::on_command,
/// )
/// .with_qos(QoS::ExactlyOnce);
/// ```
pub struct Subscription<T> {
	pattern: PatternSpec<T>,
	options: SubscribeOptions,
	handler: Handler<T>,
}

impl<T> Subscription<T> {
	/// Declares a subscription with default subscribe options.
	pub fn new<F>(pattern: impl Into<PatternSpec<T>>, handler: F) -> Self
	where F: Fn(&T, &TopicArgs, &Delivery<'_>) -> HandlerResult
			+ Send
			+ Sync
			+ 'static {
		Self {
			pattern: pattern.into(),
			options: SubscribeOptions::default(),
			handler: Arc::new(handler),
		}
	}

	/// Declares a subscription whose pattern is computed from the state.
	pub fn computed<P, F>(pattern: P, handler: F) -> Self
	where
		P: Fn(&T) -> String + Send + Sync + 'static,
		F: Fn(&T, &TopicArgs, &Delivery<'_>) -> HandlerResult
			+ Send
			+ Sync
			+ 'static,
	{
		Self::new(PatternSpec::computed(pattern), handler)
	}

	/// Replaces subscribe options.
	pub fn with_options(mut self, options: SubscribeOptions) -> Self {
		self.options = options;
		self
	}

	/// Sets the QoS requested from the broker.
	pub fn with_qos(mut self, qos: rumqttc::v5::mqttbytes::QoS) -> Self {
		self.options.qos = qos;
		self
	}

	/// Pattern specifier of this subscription.
	pub fn pattern(&self) -> &PatternSpec<T> {
		&self.pattern
	}

	/// Subscribe options of this subscription.
	pub fn options(&self) -> &SubscribeOptions {
		&self.options
	}

	pub(crate) fn into_parts(
		self,
	) -> (PatternSpec<T>, SubscribeOptions, Handler<T>) {
		(self.pattern, self.options, self.handler)
	}
}

impl<T> fmt::Debug for Subscription<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("pattern", &self.pattern)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

/// Endpoint state with a declarative table of subscriptions.
///
/// The table is read once when the endpoint is constructed; each entry is
/// resolved against the state instance, registered, and kept for the
/// lifetime of the endpoint.
pub trait EndpointState: Send + Sync + Sized + 'static {
	/// Subscriptions handled by this endpoint type.
	fn subscriptions() -> Vec<Subscription<Self>>;
}
