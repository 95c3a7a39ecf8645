//! Conversion between topic patterns with arguments and concrete topics
//!
//! `pack` fills the wildcards of a pattern with [`TopicArg`] values,
//! `unpack` recovers those values from a topic received from the broker:
//!
//! ```rust
//! use mqtt_endpoint::topic::{pack, unpack, TopicArg};
//!
//! let topic = pack("a/+/c/#", &["b".into(), ["d", "e"].into()]).unwrap();
//! assert_eq!(topic, "a/b/c/d/e");
//!
//! let args = unpack("a/+/c/#", &topic).unwrap();
//! assert_eq!(args.level(0), Some("b"));
//! assert_eq!(args.remainder(), Some(&["d".to_string(), "e".to_string()][..]));
//! ```

use thiserror::Error;

use super::error::validation;
use super::topic_args::{TopicArg, TopicArgs};
use super::topic_pattern::TopicPattern;
use super::topic_pattern_item::{PatternFormatError, TopicPatternItem};

/// Errors when substituting arguments into a pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPackError {
	/// Pattern itself is malformed
	#[error(transparent)]
	Pattern(#[from] PatternFormatError),

	/// A wildcard has no corresponding argument
	#[error(
		"Placeholder {position} of pattern '{pattern}' has no value to fill \
		 in ({provided} arguments provided)"
	)]
	ArgumentMismatch {
		/// The pattern being packed
		pattern: String,
		/// Index of the first unfilled wildcard
		position: usize,
		/// Number of arguments actually provided
		provided: usize,
	},

	/// More arguments than wildcards
	#[error(
		"Unused arguments for pattern '{pattern}': expected {expected}, \
		 provided {provided}"
	)]
	UnusedArguments {
		/// The pattern being packed
		pattern: String,
		/// Number of wildcards in the pattern
		expected: usize,
		/// Number of arguments actually provided
		provided: usize,
	},

	/// Argument contains a topic separator or wildcard character
	#[error("Cannot fill in data '{value}' containing a '{character}'")]
	InvalidCharacter {
		/// The rejected value
		value: String,
		/// The forbidden character found in it
		character: char,
	},

	/// Argument shape does not fit the wildcard it fills
	#[error("Argument {position} cannot fill '{wildcard}': {reason}")]
	TypeMismatch {
		/// Index of the argument
		position: usize,
		/// The wildcard being filled
		wildcard: &'static str,
		/// What was wrong with the argument
		reason: &'static str,
	},
}

impl TopicPackError {
	fn type_mismatch(
		position: usize,
		wildcard: &'static str,
		reason: &'static str,
	) -> Self {
		Self::TypeMismatch {
			position,
			wildcard,
			reason,
		}
	}
}

/// Errors when a topic does not conform to a pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicUnpackError {
	/// Pattern itself is malformed
	#[error(transparent)]
	Pattern(#[from] PatternFormatError),

	/// Literal pattern segment missing or different in topic
	#[error(
		"Pattern segment '{expected}' at level {position} does not match \
		 topic segment {found:?}"
	)]
	TopicMismatch {
		/// Literal segment of the pattern
		expected: String,
		/// Topic segment found at that level, if any
		found: Option<String>,
		/// Level index
		position: usize,
	},

	/// Topic ended before a `+` could be matched
	#[error("Topic lacks level {position} to match a '+' in the pattern")]
	TopicTooShort {
		/// Level index of the unmatched `+`
		position: usize,
	},

	/// Topic has more levels than a pattern without `#`
	#[error(
		"Topic is longer than the pattern without a # suffix, first \
		 unmatched level is '{unmatched}'"
	)]
	TopicTooLong {
		/// First topic level beyond the pattern
		unmatched: String,
	},
}

impl TopicUnpackError {
	fn topic_mismatch(
		expected: &str,
		found: Option<&str>,
		position: usize,
	) -> Self {
		Self::TopicMismatch {
			expected: expected.to_string(),
			found: found.map(str::to_string),
			position,
		}
	}
}

/// Substitutes wildcards of `pattern` with `args`.
///
/// Each `+` takes a [`TopicArg::Level`], a trailing `#` takes a non-empty
/// [`TopicArg::Levels`] joined with `/`. Values may be empty strings but
/// must not contain `/`, `+` or `#`.
pub fn pack(
	pattern: &str,
	args: &[TopicArg],
) -> Result<String, TopicPackError> {
	TopicPattern::parse(pattern)?.pack(args)
}

/// Extracts wildcard values of `pattern` from `topic`.
///
/// Returns one [`TopicArg::Level`] per `+` followed by one
/// [`TopicArg::Levels`] (possibly empty) if the pattern ends with `#`.
pub fn unpack(
	pattern: &str,
	topic: &str,
) -> Result<TopicArgs, TopicUnpackError> {
	TopicPattern::parse(pattern)?.unpack(topic)
}

pub(crate) fn pack_segments(
	pattern: &TopicPattern,
	args: &[TopicArg],
) -> Result<String, TopicPackError> {
	let mut result = String::with_capacity(pattern.as_str().len() + 16);
	let mut position = 0;
	let mut next_arg = || {
		let arg = args.get(position).ok_or_else(|| {
			TopicPackError::ArgumentMismatch {
				pattern: pattern.to_string(),
				position,
				provided: args.len(),
			}
		});
		position += 1;
		arg.map(|arg| (position - 1, arg))
	};

	for (i, segment) in pattern.iter().enumerate() {
		if i > 0 {
			result.push('/');
		}
		match segment {
			| TopicPatternItem::Str(s) => result.push_str(s),
			| TopicPatternItem::Plus => match next_arg()? {
				| (_, TopicArg::Level(level)) => {
					check_value(level)?;
					result.push_str(level);
				}
				| (index, TopicArg::Levels(_)) => {
					return Err(TopicPackError::type_mismatch(
						index,
						"+",
						"a single level is required, not a list",
					));
				}
			},
			| TopicPatternItem::Hash => match next_arg()? {
				| (index, TopicArg::Level(_)) => {
					return Err(TopicPackError::type_mismatch(
						index,
						"#",
						"a list of levels is required, not a single string",
					));
				}
				| (index, TopicArg::Levels(levels)) => {
					for level in levels {
						check_value(level)?;
					}
					if levels.is_empty() {
						return Err(TopicPackError::type_mismatch(
							index,
							"#",
							"the list of levels must not be empty",
						));
					}
					result.push_str(&levels.join("/"));
				}
			},
		}
	}

	let expected = pattern.wildcard_count();
	if args.len() > expected {
		return Err(TopicPackError::UnusedArguments {
			pattern: pattern.to_string(),
			expected,
			provided: args.len(),
		});
	}

	Ok(result)
}

fn check_value(value: &str) -> Result<(), TopicPackError> {
	validation::forbidden_character(value).map_or(Ok(()), |character| {
		Err(TopicPackError::InvalidCharacter {
			value: value.to_string(),
			character,
		})
	})
}

pub(crate) fn unpack_segments(
	pattern: &TopicPattern,
	topic: &str,
) -> Result<TopicArgs, TopicUnpackError> {
	let mut topic_levels = topic.split('/');
	let mut args = TopicArgs::new();

	for (position, segment) in pattern.iter().enumerate() {
		match segment {
			| TopicPatternItem::Hash => {
				// parse() guarantees # is last
				args.push(TopicArg::Levels(
					topic_levels.map(str::to_string).collect(),
				));
				return Ok(args);
			}
			| TopicPatternItem::Plus => {
				let level = topic_levels
					.next()
					.ok_or(TopicUnpackError::TopicTooShort { position })?;
				args.push(TopicArg::Level(level.to_string()));
			}
			| TopicPatternItem::Str(expected) => match topic_levels.next() {
				| Some(found) if found == expected.as_str() => {}
				| found => {
					return Err(TopicUnpackError::topic_mismatch(
						expected, found, position,
					));
				}
			},
		}
	}

	match topic_levels.next() {
		| Some(unmatched) => Err(TopicUnpackError::TopicTooLong {
			unmatched: unmatched.to_string(),
		}),
		| None => Ok(args),
	}
}
