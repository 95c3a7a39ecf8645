//! Positional topic arguments extracted from or substituted into wildcards

use std::fmt;
use std::ops::Index;

use smallvec::SmallVec;

/// Value bound to one wildcard of a topic pattern.
///
/// `+` binds exactly one topic level, a trailing `#` binds the ordered list
/// of all remaining levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicArg {
	/// Value for a single-level wildcard `+`
	Level(String),
	/// Values for a multi-level wildcard `#`
	Levels(Vec<String>),
}

impl TopicArg {
	/// Returns the level if this argument fills a `+`.
	pub fn as_level(&self) -> Option<&str> {
		match self {
			| TopicArg::Level(level) => Some(level),
			| TopicArg::Levels(_) => None,
		}
	}

	/// Returns the levels if this argument fills a `#`.
	pub fn as_levels(&self) -> Option<&[String]> {
		match self {
			| TopicArg::Level(_) => None,
			| TopicArg::Levels(levels) => Some(levels),
		}
	}
}

impl From<&str> for TopicArg {
	fn from(level: &str) -> Self {
		TopicArg::Level(level.to_string())
	}
}

impl From<String> for TopicArg {
	fn from(level: String) -> Self {
		TopicArg::Level(level)
	}
}

impl From<&String> for TopicArg {
	fn from(level: &String) -> Self {
		TopicArg::Level(level.clone())
	}
}

impl<S: Into<String>> From<Vec<S>> for TopicArg {
	fn from(levels: Vec<S>) -> Self {
		TopicArg::Levels(levels.into_iter().map(Into::into).collect())
	}
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TopicArg {
	fn from(levels: [S; N]) -> Self {
		TopicArg::Levels(levels.into_iter().map(Into::into).collect())
	}
}

impl fmt::Display for TopicArg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			| TopicArg::Level(level) => write!(f, "{level}"),
			| TopicArg::Levels(levels) => write!(f, "{}", levels.join("/")),
		}
	}
}

/// Ordered arguments of a topic: one per `+`, then one for a trailing `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicArgs(SmallVec<[TopicArg; 4]>);

impl TopicArgs {
	/// Creates an empty argument list.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push(&mut self, arg: TopicArg) {
		self.0.push(arg);
	}

	/// Number of arguments, equal to the wildcard count of the pattern.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if the pattern had no wildcards.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns argument at `index`.
	pub fn get(&self, index: usize) -> Option<&TopicArg> {
		self.0.get(index)
	}

	/// Returns the `+` value at `index`.
	pub fn level(&self, index: usize) -> Option<&str> {
		self.0.get(index).and_then(TopicArg::as_level)
	}

	/// Returns the `#` values at `index`.
	pub fn levels(&self, index: usize) -> Option<&[String]> {
		self.0.get(index).and_then(TopicArg::as_levels)
	}

	/// Returns the trailing `#` values, if the last argument is one.
	pub fn remainder(&self) -> Option<&[String]> {
		self.0.last().and_then(TopicArg::as_levels)
	}

	/// Iterates over arguments in pattern order.
	pub fn iter(&self) -> std::slice::Iter<'_, TopicArg> {
		self.0.iter()
	}

	/// Returns arguments as slice, ready to be passed back to `pack`.
	pub fn as_slice(&self) -> &[TopicArg] {
		&self.0
	}

	/// Converts into a plain vector.
	pub fn into_vec(self) -> Vec<TopicArg> {
		self.0.into_vec()
	}
}

impl Index<usize> for TopicArgs {
	type Output = TopicArg;

	fn index(&self, index: usize) -> &Self::Output {
		&self.0[index]
	}
}

impl<'a> IntoIterator for &'a TopicArgs {
	type Item = &'a TopicArg;
	type IntoIter = std::slice::Iter<'a, TopicArg>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl IntoIterator for TopicArgs {
	type Item = TopicArg;
	type IntoIter = smallvec::IntoIter<[TopicArg; 4]>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl FromIterator<TopicArg> for TopicArgs {
	fn from_iter<I: IntoIterator<Item = TopicArg>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl PartialEq<[TopicArg]> for TopicArgs {
	fn eq(&self, other: &[TopicArg]) -> bool {
		self.0.as_slice() == other
	}
}

impl PartialEq<Vec<TopicArg>> for TopicArgs {
	fn eq(&self, other: &Vec<TopicArg>) -> bool {
		self.0.as_slice() == other.as_slice()
	}
}
