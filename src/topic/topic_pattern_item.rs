//! Single segment of an MQTT topic pattern

use std::convert::TryFrom;

use arcstr::Substr;
use thiserror::Error;

/// Error types for topic pattern parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternFormatError {
	/// Wildcard character shares a segment with literal characters
	#[error(
		"Invalid segment '{segment}' in pattern '{pattern}': wildcards must \
		 occupy an entire level"
	)]
	MixedWildcard {
		/// The invalid pattern
		pattern: String,
		/// The offending segment
		segment: String,
	},

	/// Hash wildcard (#) used not at the end of the pattern
	#[error(
		"Invalid topic pattern '{pattern}': # wildcard can only be the last \
		 segment"
	)]
	HashNotLast {
		/// The invalid pattern
		pattern: String,
	},

	/// Empty pattern is not a valid topic filter
	#[error("Topic pattern cannot be empty")]
	Empty,
}

impl PatternFormatError {
	/// Creates a new MixedWildcard error
	pub fn mixed_wildcard(
		pattern: impl Into<String>,
		segment: impl Into<String>,
	) -> Self {
		Self::MixedWildcard {
			pattern: pattern.into(),
			segment: segment.into(),
		}
	}

	/// Creates a new HashNotLast error
	pub fn hash_not_last(pattern: impl Into<String>) -> Self {
		Self::HashNotLast {
			pattern: pattern.into(),
		}
	}
}

/// MQTT topic pattern segment: literal string or wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPatternItem {
	/// Literal string segment
	Str(Substr),
	/// Single-level wildcard `+`
	Plus,
	/// Multi-level wildcard `#`
	Hash,
}

impl TopicPatternItem {
	/// Returns string representation of the pattern item.
	pub fn as_str(&self) -> &str {
		match self {
			| TopicPatternItem::Str(s) => s,
			| TopicPatternItem::Plus => "+",
			| TopicPatternItem::Hash => "#",
		}
	}

	/// Returns true if this item is a wildcard (+ or #).
	pub fn is_wildcard(&self) -> bool {
		matches!(self, TopicPatternItem::Plus | TopicPatternItem::Hash)
	}
}

impl std::fmt::Display for TopicPatternItem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Parses one segment; the segment must be a substring of the full pattern.
impl TryFrom<Substr> for TopicPatternItem {
	type Error = PatternFormatError;

	fn try_from(item: Substr) -> Result<Self, Self::Error> {
		let res = match item.as_str() {
			| "+" => TopicPatternItem::Plus,
			| "#" => TopicPatternItem::Hash,
			| _ if item.contains(['+', '#']) => {
				return Err(PatternFormatError::mixed_wildcard(
					item.parent().as_str(),
					item.as_str(),
				));
			}
			| _ => TopicPatternItem::Str(item),
		};
		Ok(res)
	}
}
