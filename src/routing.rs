//! Declarative subscriptions, the per-endpoint registry and dispatch
//!
//! An endpoint state type lists its subscriptions once through
//! [`EndpointState`]. At construction each pattern specifier is resolved
//! against the state, checked for duplicates and indexed in a wildcard
//! matcher. Inbound messages are then routed to every matching handler
//! with the topic arguments already unpacked.

/// Registry and session error types
pub mod error;
pub mod message;
pub mod registry;
pub mod session;
pub mod subscription;

#[cfg(test)]
mod registry_tests;

pub use error::{RegistryError, SessionError};
pub use message::{Delivery, InboundMessage};
pub use registry::{SubscriptionEntry, SubscriptionRegistry};
pub use session::SessionSignal;
pub use subscription::{
	EndpointState, Handler, HandlerError, HandlerResult, PatternSpec,
	Subscription,
};
