//! Wildcard-aware lookup table from topic filters to registered data

use std::collections::HashMap;

use super::topic_pattern::TopicPattern;
use super::topic_pattern_item::TopicPatternItem;

/// Node in the topic matching tree that represents a part of the topic path.
#[derive(Debug)]
pub struct TopicMatcherNode<T> {
	/// Data for exact topic segment match
	exact_match_data: Option<T>,

	/// Children nodes for exact matches of next segment
	exact_children: HashMap<String, TopicMatcherNode<T>>,

	/// Node for '+' pattern wildcard match (single segment)
	single_level_wildcard_node: Option<Box<TopicMatcherNode<T>>>,

	/// Data for '#' pattern wildcard match (multiple segments)
	multi_level_wildcard_data: Option<T>,
}

impl<T: Default> Default for TopicMatcherNode<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Default> TopicMatcherNode<T> {
	/// Creates a new empty topic matcher node
	pub fn new() -> Self {
		Self {
			exact_match_data: None,
			exact_children: HashMap::new(),
			single_level_wildcard_node: None,
			multi_level_wildcard_data: None,
		}
	}

	/// Returns true if no data is stored anywhere below this node.
	pub fn is_empty(&self) -> bool {
		self.exact_match_data.is_none()
			&& self.exact_children.values().all(TopicMatcherNode::is_empty)
			&& self
				.single_level_wildcard_node
				.as_ref()
				.is_none_or(|node| node.is_empty())
			&& self.multi_level_wildcard_data.is_none()
	}

	/// Finds or creates the data slot for the given topic filter
	pub fn get_or_create(&mut self, pattern: &TopicPattern) -> &mut T {
		let mut current_node = self;

		for segment in pattern.iter() {
			match segment {
				| TopicPatternItem::Str(s) => {
					current_node = current_node
						.exact_children
						.entry(s.to_string())
						.or_default()
				}
				| TopicPatternItem::Plus => {
					current_node = current_node
						.single_level_wildcard_node
						.get_or_insert_with(Default::default)
				}
				| TopicPatternItem::Hash => {
					// `#` is always the last segment
					return current_node
						.multi_level_wildcard_data
						.get_or_insert_with(T::default);
				}
			}
		}
		current_node.exact_match_data.get_or_insert_with(T::default)
	}

	/// Recursively collects all data whose filter matches the topic levels
	fn collect_matching<'a>(
		&'a self,
		levels: &[&str],
		matching_data: &mut Vec<&'a T>,
	) {
		match levels {
			| [] => {
				// `a/#` also matches the parent level `a`
				self.exact_match_data
					.iter()
					.for_each(|data| matching_data.push(data));
				self.multi_level_wildcard_data
					.iter()
					.for_each(|data| matching_data.push(data))
			}
			| [level, remaining_levels @ ..] => {
				if let Some(child) = self.exact_children.get(*level) {
					child.collect_matching(remaining_levels, matching_data);
				}
				self.single_level_wildcard_node
					.iter()
					.for_each(|plus| {
						plus.collect_matching(remaining_levels, matching_data)
					});
				self.multi_level_wildcard_data
					.iter()
					.for_each(|hash_data| matching_data.push(hash_data));
			}
		}
	}

	/// Finds all data entries whose filter matches the given topic.
	///
	/// Topics starting with `$` are not matched by a wildcard in the first
	/// level, as required by MQTT for broker-internal topics.
	pub fn find_by_topic<'a>(&'a self, topic: &str) -> Vec<&'a T> {
		let levels: Vec<&str> = topic.split('/').collect();
		let mut matching = Vec::new();
		if topic.starts_with('$') {
			if let Some(child) = self.exact_children.get(levels[0]) {
				child.collect_matching(&levels[1 ..], &mut matching);
			}
		} else {
			self.collect_matching(&levels, &mut matching);
		}
		matching
	}
}
