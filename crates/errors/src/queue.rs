//! The bounded instrument error queue.

use crate::{ErrorEntry, codes, message};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Default maximum number of queued errors, per common instrument practice.
pub const DEFAULT_ERROR_QUEUE_CAPACITY: usize = 20;

/// Bounded FIFO error queue with IEEE 488.2 overflow semantics.
///
/// When the queue is full, the newest entry is discarded and the tail entry
/// is replaced by `-350, "Queue overflow"` until the queue is drained.
///
/// All operations lock an internal mutex so an instrument's background
/// thread (e.g. a hardware ISR bridge) may push errors concurrently with
/// the foreground parser. This is the only thread-safe surface of the
/// library; share it via `Arc` if multiple threads need access.
#[derive(Debug)]
pub struct ErrorQueue {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    queue: VecDeque<ErrorEntry>,
    capacity: usize,
    overflow_count: u64,
    has_overflowed: bool,
}

impl Default for ErrorQueue {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_QUEUE_CAPACITY)
    }
}

impl ErrorQueue {
    /// Create a queue holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                capacity: capacity.max(1),
                overflow_count: 0,
                has_overflowed: false,
            }),
        }
    }

    // ── Push ────────────────────────────────────────────────────────────

    /// Queue an error entry. Entries with code `0` are ignored.
    pub fn push_entry(&self, entry: ErrorEntry) {
        if entry.code == codes::NO_ERROR {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.queue.len() >= inner.capacity {
            inner.has_overflowed = true;
            inner.overflow_count += 1;
            // Overwrite the tail with the overflow sentinel; the new entry
            // is dropped.
            if let Some(last) = inner.queue.back_mut()
                && last.code != codes::QUEUE_OVERFLOW
            {
                *last = ErrorEntry::standard(codes::QUEUE_OVERFLOW);
            }
            return;
        }
        inner.queue.push_back(entry);
    }

    /// Queue an error with an explicit message.
    pub fn push(&self, code: i32, message: impl Into<String>) {
        self.push_entry(ErrorEntry::new(code, message));
    }

    /// Queue an error with an explicit message and context string.
    pub fn push_with_context(
        &self,
        code: i32,
        message: impl Into<String>,
        context: impl Into<String>,
    ) {
        self.push_entry(ErrorEntry::with_context(code, message, context));
    }

    /// Queue a standard error using the default message for `code`.
    pub fn push_standard(&self, code: i32) {
        self.push_entry(ErrorEntry::standard(code));
    }

    /// Queue a standard error with extra detail appended to the default
    /// message as `"<standard>; <info>"`.
    pub fn push_standard_with_info(&self, code: i32, info: &str) {
        let mut msg = message(code).to_string();
        if !info.is_empty() {
            msg.push_str("; ");
            msg.push_str(info);
        }
        self.push_entry(ErrorEntry::new(code, msg));
    }

    // ── Pop / peek ──────────────────────────────────────────────────────

    /// Remove and return the oldest entry, or the "No error" sentinel when
    /// the queue is empty.
    pub fn pop(&self) -> ErrorEntry {
        let mut inner = self.inner.lock().unwrap();
        inner.queue.pop_front().unwrap_or_else(ErrorEntry::no_error)
    }

    /// Return a copy of the oldest entry without removing it.
    pub fn peek(&self) -> ErrorEntry {
        let inner = self.inner.lock().unwrap();
        inner
            .queue
            .front()
            .cloned()
            .unwrap_or_else(ErrorEntry::no_error)
    }

    /// Drain the queue, returning every entry in FIFO order.
    pub fn pop_all(&self) -> Vec<ErrorEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.queue.drain(..).collect()
    }

    // ── State ───────────────────────────────────────────────────────────

    /// Returns `true` when no errors are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().queue.is_empty()
    }

    /// Number of queued errors.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Maximum number of entries the queue holds.
    pub fn capacity(&self) -> usize {
        self.inner.lock().unwrap().capacity
    }

    /// Returns `true` if any entry has ever been dropped due to overflow.
    ///
    /// Cleared only by [`ErrorQueue::reset_overflow_count`]; draining the
    /// queue does not reset the history.
    pub fn has_overflowed(&self) -> bool {
        self.inner.lock().unwrap().has_overflowed
    }

    /// Number of entries dropped due to overflow.
    pub fn overflow_count(&self) -> u64 {
        self.inner.lock().unwrap().overflow_count
    }

    /// Code of the newest entry, or `0` when empty.
    pub fn last_code(&self) -> i32 {
        let inner = self.inner.lock().unwrap();
        inner.queue.back().map_or(codes::NO_ERROR, |e| e.code)
    }

    // ── Management ──────────────────────────────────────────────────────

    /// Remove all entries. Overflow history is preserved.
    pub fn clear(&self) {
        self.inner.lock().unwrap().queue.clear();
    }

    /// Change the capacity (minimum 1). If the queue currently holds more
    /// entries than the new capacity, the newest entries are dropped and
    /// counted as overflow.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.capacity = capacity.max(1);
        while inner.queue.len() > inner.capacity {
            inner.queue.pop_back();
            inner.overflow_count += 1;
            inner.has_overflowed = true;
        }
    }

    /// Reset the overflow history.
    pub fn reset_overflow_count(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.overflow_count = 0;
        inner.has_overflowed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let q = ErrorQueue::new(5);
        q.push(-100, "first");
        q.push(-200, "second");
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().code, -100);
        assert_eq!(q.pop().code, -200);
        assert!(q.is_empty());
    }

    #[test]
    fn pop_empty_returns_no_error() {
        let q = ErrorQueue::new(5);
        let e = q.pop();
        assert_eq!(e.code, 0);
        assert_eq!(e.message, "No error");
    }

    #[test]
    fn no_error_push_is_ignored() {
        let q = ErrorQueue::new(5);
        q.push(0, "nothing");
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_replaces_tail_with_sentinel() {
        let q = ErrorQueue::new(3);
        q.push(-101, "a");
        q.push(-102, "b");
        q.push(-103, "c");
        q.push(-104, "dropped");
        assert_eq!(q.len(), 3);
        assert!(q.has_overflowed());
        assert_eq!(q.overflow_count(), 1);
        assert_eq!(q.pop().code, -101);
        assert_eq!(q.pop().code, -102);
        let last = q.pop();
        assert_eq!(last.code, codes::QUEUE_OVERFLOW);
        assert_eq!(last.message, "Queue overflow");
    }

    #[test]
    fn overflow_sentinel_not_duplicated() {
        let q = ErrorQueue::new(2);
        q.push(-101, "a");
        q.push(-102, "b");
        q.push(-103, "x");
        q.push(-104, "y");
        assert_eq!(q.overflow_count(), 2);
        assert_eq!(q.pop().code, -101);
        assert_eq!(q.pop().code, codes::QUEUE_OVERFLOW);
        assert!(q.is_empty());
    }

    #[test]
    fn capacity_minimum_is_one() {
        let q = ErrorQueue::new(0);
        assert_eq!(q.capacity(), 1);
        q.push(-101, "a");
        q.push(-102, "b");
        assert_eq!(q.len(), 1);
        // The single slot now holds the overflow sentinel.
        assert_eq!(q.pop().code, codes::QUEUE_OVERFLOW);
    }

    #[test]
    fn pop_all_drains_in_order() {
        let q = ErrorQueue::new(5);
        q.push(-101, "a");
        q.push(-102, "b");
        let all = q.pop_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].code, -101);
        assert_eq!(all[1].code, -102);
        assert!(q.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let q = ErrorQueue::new(5);
        q.push(-101, "a");
        assert_eq!(q.peek().code, -101);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn last_code_tracks_tail() {
        let q = ErrorQueue::new(5);
        assert_eq!(q.last_code(), 0);
        q.push(-101, "a");
        q.push(-222, "b");
        assert_eq!(q.last_code(), -222);
    }

    #[test]
    fn clear_preserves_overflow_history() {
        let q = ErrorQueue::new(1);
        q.push(-101, "a");
        q.push(-102, "b");
        assert!(q.has_overflowed());
        q.clear();
        assert!(q.is_empty());
        assert!(q.has_overflowed());
        q.reset_overflow_count();
        assert!(!q.has_overflowed());
        assert_eq!(q.overflow_count(), 0);
    }

    #[test]
    fn shrink_capacity_truncates_newest() {
        let q = ErrorQueue::new(4);
        q.push(-101, "a");
        q.push(-102, "b");
        q.push(-103, "c");
        q.set_capacity(2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.overflow_count(), 1);
        assert_eq!(q.pop().code, -101);
        assert_eq!(q.pop().code, -102);
    }

    #[test]
    fn standard_with_info_appends() {
        let q = ErrorQueue::new(5);
        q.push_standard_with_info(codes::OUT_OF_MEMORY, "Command string too long");
        let e = q.pop();
        assert_eq!(e.code, -225);
        assert_eq!(e.message, "Out of memory; Command string too long");
    }

    #[test]
    fn push_from_second_thread() {
        use std::sync::Arc;
        let q = Arc::new(ErrorQueue::new(10));
        let q2 = Arc::clone(&q);
        let t = std::thread::spawn(move || {
            for _ in 0..5 {
                q2.push_standard(codes::DEVICE_SPECIFIC_ERROR);
            }
        });
        for _ in 0..5 {
            q.push_standard(codes::EXECUTION_ERROR);
        }
        t.join().unwrap();
        assert_eq!(q.len(), 10);
    }
}
