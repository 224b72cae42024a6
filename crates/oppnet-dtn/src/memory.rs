//! Bounded message memory
//!
//! Messages are kept in insertion order. When the memory is full the oldest
//! entry is evicted to make room, and the overflow is counted. An id index
//! kept next to the queue makes membership checks constant time.

use std::collections::{HashSet, VecDeque};

use oppnet_core::{MessageId, MessageRef};

/// FIFO-evicting message store
#[derive(Debug, Clone)]
pub struct DataMemory {
    capacity: usize,
    messages: VecDeque<MessageRef>,
    index: HashSet<MessageId>,
    overflow: u64,
}

impl DataMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::new(),
            index: HashSet::new(),
            overflow: 0,
        }
    }

    /// Append a message, evicting the oldest one if full
    ///
    /// Returns the evicted message, if any.
    pub fn push(&mut self, message: MessageRef) -> Option<MessageRef> {
        let evicted = if self.is_full() {
            self.overflow += 1;
            self.messages.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            self.index.remove(&old.id());
        }
        self.index.insert(message.id());
        self.messages.push_back(message);
        evicted
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.index.contains(&id)
    }

    pub fn get(&self, id: MessageId) -> Option<&MessageRef> {
        if !self.contains(id) {
            return None;
        }
        self.messages.iter().find(|m| m.id() == id)
    }

    /// Remove a message by id, keeping the order of the rest
    pub fn remove(&mut self, id: MessageId) -> Option<MessageRef> {
        if !self.index.remove(&id) {
            return None;
        }
        let pos = self.messages.iter().position(|m| m.id() == id)?;
        self.messages.remove(pos)
    }

    /// Keep only the messages matching `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&MessageRef) -> bool) {
        let index = &mut self.index;
        self.messages.retain(|m| {
            let kept = keep(m);
            if !kept {
                index.remove(&m.id());
            }
            kept
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRef> {
        self.messages.iter()
    }

    /// Messages oldest first
    pub fn to_vec(&self) -> Vec<MessageRef> {
        self.messages.iter().cloned().collect()
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of evictions so far
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
