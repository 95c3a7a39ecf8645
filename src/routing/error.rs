use thiserror::Error;

use crate::topic::PatternFormatError;

/// Errors while building the subscription registry of an endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// Two handlers resolved to the same topic filter
	#[error(
		"A client cannot subscribe to an identical topic filter multiple \
		 times: '{pattern}'"
	)]
	DuplicateSubscription {
		/// The resolved topic filter
		pattern: String,
	},

	/// Pattern specifier did not resolve to a valid topic filter
	#[error(
		"Pattern specifier resolved to invalid topic filter '{resolved}': \
		 {source}"
	)]
	InvalidPatternSpecifier {
		/// String produced by the specifier
		resolved: String,
		/// Why it is not a valid filter
		#[source]
		source: PatternFormatError,
	},
}

impl RegistryError {
	/// Creates a new DuplicateSubscription error
	pub fn duplicate_subscription(pattern: impl Into<String>) -> Self {
		Self::DuplicateSubscription {
			pattern: pattern.into(),
		}
	}
}

/// Errors raised by connection state handling
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
	/// Session-present signal outside the recognised set
	#[error("Unknown session present flag: {flag}")]
	UnknownSessionState {
		/// The raw flag received from the transport
		flag: u8,
	},
}
