//! Error types and utilities for the topic module
//!
//! This module contains the composite error type and shared constants
//! for the entire topic module, while individual error types remain
//! in their respective modules.

use thiserror::Error;

use super::topic_codec::{TopicPackError, TopicUnpackError};
use super::topic_pattern_item::PatternFormatError;

/// Comprehensive error type for all topic-related operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// Topic pattern parsing or validation error
	#[error("Topic pattern error: {0}")]
	Pattern(#[from] PatternFormatError),

	/// Error when substituting arguments into a pattern
	#[error("Topic pack error: {0}")]
	Pack(#[from] TopicPackError),

	/// Error when extracting arguments from a topic
	#[error("Topic unpack error: {0}")]
	Unpack(#[from] TopicUnpackError),
}

/// Convenient Result type for topic operations
pub type TopicResult<T> = Result<T, TopicError>;

/// Validation utilities for topic operations
pub mod validation {
	/// Characters with structural meaning in MQTT topics.
	pub const FORBIDDEN_CHARS: [char; 3] = ['/', '+', '#'];

	/// Returns the first structural character contained in a topic level.
	pub fn forbidden_character(level: &str) -> Option<char> {
		level.chars().find(|c| FORBIDDEN_CHARS.contains(c))
	}
}
