//! Interest context used for dissemination
//!
//! A node's context is the set of topics it is interested in; a message's
//! tags use the same representation. Each topic carries the tick from which
//! it becomes active, so interests can appear over the course of a trace.

use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::types::Tick;

/// A dissemination topic
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("t{_0}")]
pub struct Topic(pub u32);

/// Set of topics, each with its activation tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    topics: BTreeMap<Topic, Tick>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context whose topics are all active from tick 0
    pub fn with_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self {
            topics: topics.into_iter().map(|t| (t, 0)).collect(),
        }
    }

    /// Add a topic that becomes active at `since`
    ///
    /// Re-adding a known topic keeps the earlier activation time.
    pub fn add_topic(&mut self, topic: Topic, since: Tick) {
        self.topics
            .entry(topic)
            .and_modify(|t| *t = (*t).min(since))
            .or_insert(since);
    }

    /// Check whether `topic` is known and active at `tick`
    pub fn is_active(&self, topic: Topic, tick: Tick) -> bool {
        self.topics.get(&topic).is_some_and(|since| *since <= tick)
    }

    /// Topics active at `tick` that both contexts share
    pub fn common_topics(&self, other: &Context, tick: Tick) -> Vec<Topic> {
        self.topics
            .iter()
            .filter(|(topic, since)| **since <= tick && other.is_active(**topic, tick))
            .map(|(topic, _)| *topic)
            .collect()
    }

    /// Check whether at least one active topic is shared at `tick`
    pub fn has_common_topics(&self, other: &Context, tick: Tick) -> bool {
        self.topics
            .iter()
            .any(|(topic, since)| *since <= tick && other.is_active(*topic, tick))
    }

    /// Iterate over all topics regardless of activation
    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.topics.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
