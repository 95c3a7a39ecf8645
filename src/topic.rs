//! Topic handling module
//!
//! This module provides the topic pattern algebra: parsing wildcard
//! patterns, packing arguments into concrete topics, unpacking topics back
//! into arguments, and matching topics against registered filters.

// Submodules
pub mod error;
pub mod topic_args;
pub mod topic_codec;
pub mod topic_matcher;
pub mod topic_pattern;
pub mod topic_pattern_item;


// Re-export commonly used types for convenience
pub use error::{TopicError, TopicResult, validation};
pub use topic_args::{TopicArg, TopicArgs};
pub use topic_codec::{TopicPackError, TopicUnpackError, pack, unpack};
pub use topic_matcher::TopicMatcherNode;
pub use topic_pattern::TopicPattern;
pub use topic_pattern_item::{PatternFormatError, TopicPatternItem};
