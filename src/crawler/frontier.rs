//! Frontier of discovered-but-not-yet-visited URLs
//!
//! This module handles:
//! - Two FIFO queues: item pages first, everything else second
//! - Companion sets for O(1) "already queued" and "already visited" checks
//! - The visited set itself, so dedup at offer time sees every URL ever taken

use crate::url::PageRole;
use std::collections::{HashSet, VecDeque};

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: String,
    pub role: PageRole,
}

/// Dedup-aware, priority-ordered work queue
///
/// Invariants:
/// - a URL sits in at most one queue, at most once
/// - a queued URL is never in the visited set
/// - `next` never returns a general URL while an item URL is waiting
#[derive(Debug, Default)]
pub struct Frontier {
    item_queue: VecDeque<QueuedUrl>,
    general_queue: VecDeque<QueuedUrl>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a discovered URL
    ///
    /// No-op if the URL was already visited or is already queued. Returns
    /// true if the URL was enqueued.
    pub fn offer(&mut self, url: &str, role: PageRole) -> bool {
        if self.visited.contains(url) || self.queued.contains(url) {
            tracing::trace!("Frontier already knows {}", url);
            return false;
        }

        self.queued.insert(url.to_string());
        let queued = QueuedUrl {
            url: url.to_string(),
            role,
        };
        if role.is_priority() {
            self.item_queue.push_back(queued);
        } else {
            self.general_queue.push_back(queued);
        }
        true
    }

    /// Takes the next URL, draining the item queue before the general queue
    pub fn next(&mut self) -> Option<QueuedUrl> {
        let next = self
            .item_queue
            .pop_front()
            .or_else(|| self.general_queue.pop_front())?;

        self.queued.remove(&next.url);
        Some(next)
    }

    /// Records a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Number of URLs waiting in both queues
    pub fn len(&self) -> usize {
        self.item_queue.len() + self.general_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_queue.is_empty() && self.general_queue.is_empty()
    }

    pub fn pending_items(&self) -> usize {
        self.item_queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
