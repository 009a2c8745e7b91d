//! Bounded in-memory notification log.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::model::Notification;

/// Default number of notifications retained.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default page size for [`NotificationStore::list`] callers.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Fixed-capacity log of notifications, newest first.
///
/// When full, appending evicts the oldest entry. Eviction follows insertion
/// order only; reads never affect what gets evicted.
#[derive(Debug)]
pub struct NotificationStore {
    capacity: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationStore {
    /// Create an empty store. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the head, evicting the oldest entry if the store is full.
    pub fn append(&self, notification: Notification) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_back();
        }
        entries.push_front(notification);
    }

    /// The `limit` most recent notifications, newest first.
    pub fn list(&self, limit: usize) -> Vec<Notification> {
        self.entries.lock().iter().take(limit).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::model::NotificationKind;
    use std::sync::Arc;

    fn numbered(n: usize) -> Notification {
        Notification::new(NotificationKind::Info, "📢", format!("n{n}"), "body")
    }

    fn titles(items: &[Notification]) -> Vec<String> {
        items.iter().map(|n| n.title.clone()).collect()
    }

    #[test]
    fn test_count_never_exceeds_capacity() {
        let store = NotificationStore::new(5);
        for i in 1..=12 {
            store.append(numbered(i));
            assert!(store.count() <= store.capacity());
        }
        assert_eq!(store.count(), 5);
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = NotificationStore::default();
        for i in 1..=4 {
            store.append(numbered(i));
        }
        assert_eq!(titles(&store.list(4)), vec!["n4", "n3", "n2", "n1"]);
        assert_eq!(titles(&store.list(2)), vec!["n4", "n3"]);
        assert_eq!(store.list(50).len(), 4);
        assert!(store.list(0).is_empty());
    }

    #[test]
    fn test_overflow_evicts_exactly_the_oldest() {
        let store = NotificationStore::new(DEFAULT_CAPACITY);
        for i in 1..=DEFAULT_CAPACITY + 1 {
            store.append(numbered(i));
        }

        let all = store.list(DEFAULT_CAPACITY + 10);
        assert_eq!(all.len(), DEFAULT_CAPACITY);
        assert_eq!(all.first().unwrap().title, format!("n{}", DEFAULT_CAPACITY + 1));
        assert_eq!(all.last().unwrap().title, "n2");
        assert!(all.iter().all(|n| n.title != "n1"));

        store.append(numbered(DEFAULT_CAPACITY + 2));
        assert_eq!(store.count(), DEFAULT_CAPACITY);
        assert_eq!(store.list(DEFAULT_CAPACITY).last().unwrap().title, "n3");
    }

    #[test]
    fn test_clear_then_append() {
        let store = NotificationStore::new(3);
        store.append(numbered(1));
        store.append(numbered(2));
        store.clear();

        assert_eq!(store.count(), 0);
        assert!(store.list(DEFAULT_LIST_LIMIT).is_empty());

        store.append(numbered(3));
        assert_eq!(titles(&store.list(DEFAULT_LIST_LIMIT)), vec!["n3"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let store = NotificationStore::new(0);
        store.append(numbered(1));
        store.append(numbered(2));
        assert_eq!(store.capacity(), 1);
        assert_eq!(titles(&store.list(5)), vec!["n2"]);
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let store = Arc::new(NotificationStore::new(10));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.append(numbered(t * 100 + i));
                        assert!(store.list(20).len() <= 10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.count(), 10);
    }
}
