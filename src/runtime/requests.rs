//! Per-key request sequencing.
//!
//! Each suggestion request takes the next sequence number for its store key.
//! A response is applied only if it carries the latest number issued for that
//! key, so a slow response can never overwrite fresher state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Rc<RefCell<HashMap<String, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number for `key`. Numbers start at 1.
    pub fn issue(&self, key: &str) -> u64 {
        let mut latest = self.latest.borrow_mut();
        let next = latest.get(key).copied().unwrap_or(0) + 1;
        latest.insert(key.to_string(), next);
        next
    }

    /// Make every outstanding request for `key` stale.
    pub fn invalidate(&self, key: &str) {
        let mut latest = self.latest.borrow_mut();
        if let Some(current) = latest.get_mut(key) {
            *current += 1;
        }
    }

    pub fn is_latest(&self, key: &str, seq: u64) -> bool {
        self.latest.borrow().get(key).copied() == Some(seq)
    }

    pub fn current(&self, key: &str) -> Option<u64> {
        self.latest.borrow().get(key).copied()
    }
}
