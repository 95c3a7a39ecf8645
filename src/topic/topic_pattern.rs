//! Parsed topic pattern shared by subscriptions and publishing

use std::convert::TryFrom;
use std::fmt;
use std::slice::Iter;
use std::str::FromStr;

use arcstr::ArcStr;

use super::topic_args::{TopicArg, TopicArgs};
use super::topic_codec::{self, TopicPackError, TopicUnpackError};
use super::topic_pattern_item::{PatternFormatError, TopicPatternItem};

/// Parsed MQTT topic pattern with wildcard support
///
/// The same pattern serves as subscription filter (`sensors/+/data`) and as
/// publish template, see [`TopicPattern::pack`] and [`TopicPattern::unpack`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPattern {
	pattern: ArcStr,
	segments: Vec<TopicPatternItem>,
}

impl TopicPattern {
	/// Parses and validates a topic pattern.
	pub fn parse(
		topic_pattern: impl Into<ArcStr>,
	) -> Result<Self, PatternFormatError> {
		let topic_pattern = topic_pattern.into();
		if topic_pattern.is_empty() {
			return Err(PatternFormatError::Empty);
		}

		let segments = topic_pattern
			.split('/')
			.map(|s| topic_pattern.substr_from(s))
			.map(TopicPatternItem::try_from)
			.collect::<Result<Vec<_>, _>>()?;

		if let Some(hash_pos) = segments
			.iter()
			.position(|s| matches!(s, TopicPatternItem::Hash))
		{
			if hash_pos != segments.len() - 1 {
				return Err(PatternFormatError::hash_not_last(
					topic_pattern.as_str(),
				));
			}
		}

		Ok(Self {
			pattern: topic_pattern,
			segments,
		})
	}

	/// Returns the pattern string used as MQTT subscription filter.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the pattern string as shared string.
	pub fn as_arcstr(&self) -> ArcStr {
		self.pattern.clone()
	}

	/// Returns iterator over pattern segments.
	pub fn iter(&self) -> Iter<'_, TopicPatternItem> {
		self.segments.iter()
	}

	/// Returns pattern segments as slice.
	pub fn segments(&self) -> &[TopicPatternItem] {
		&self.segments
	}

	/// Returns number of segments in pattern.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Always false for a parsed pattern.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Number of wildcards, i.e. number of topic arguments.
	pub fn wildcard_count(&self) -> usize {
		self.segments.iter().filter(|s| s.is_wildcard()).count()
	}

	/// Returns true if pattern ends with multi-level wildcard (#).
	pub fn has_multi_level(&self) -> bool {
		self.segments
			.last()
			.is_some_and(|s| matches!(s, TopicPatternItem::Hash))
	}

	/// Substitutes wildcards with `args` to build a concrete topic.
	pub fn pack(&self, args: &[TopicArg]) -> Result<String, TopicPackError> {
		topic_codec::pack_segments(self, args)
	}

	/// Extracts wildcard values from a concrete topic.
	pub fn unpack(&self, topic: &str) -> Result<TopicArgs, TopicUnpackError> {
		topic_codec::unpack_segments(self, topic)
	}

	/// Returns true if `topic` conforms to this pattern.
	pub fn matches(&self, topic: &str) -> bool {
		self.unpack(topic).is_ok()
	}
}

impl fmt::Display for TopicPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

impl FromStr for TopicPattern {
	type Err = PatternFormatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<&str> for TopicPattern {
	type Error = PatternFormatError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}

impl TryFrom<String> for TopicPattern {
	type Error = PatternFormatError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}

impl TryFrom<ArcStr> for TopicPattern {
	type Error = PatternFormatError;

	fn try_from(value: ArcStr) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
