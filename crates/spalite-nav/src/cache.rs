//! LRU page cache.
//!
//! Bounds memory by entry count: once more than `capacity` pages are held,
//! the least-recently-used ones are evicted.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::document::PagePayload;

/// LRU map from fetch URL to a parsed page.
pub struct PageCache {
    entries: HashMap<String, Rc<PagePayload>>,
    /// Front = most recently used, back = least recently used.
    order: VecDeque<String>,
    capacity: usize,
}

impl PageCache {
    /// Create an empty cache holding at most `capacity` pages (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Look up a page, promoting it to the most-recently-used position.
    pub fn get(&mut self, url: &str) -> Option<Rc<PagePayload>> {
        let payload = self.entries.get(url)?;
        let payload = Rc::clone(payload);
        self.touch(url);
        Some(payload)
    }

    /// Insert or replace a page as most recently used, evicting
    /// least-recently-used pages beyond capacity.
    pub fn insert(&mut self, url: String, payload: Rc<PagePayload>) {
        if self.entries.contains_key(&url) {
            self.order.retain(|u| u != &url);
        }
        self.order.push_front(url.clone());
        self.entries.insert(url, payload);

        while self.entries.len() > self.capacity {
            let Some(evicted) = self.order.pop_back() else {
                break;
            };
            self.entries.remove(&evicted);
            log::debug!("Page cache evicted {evicted}");
        }
    }

    /// Check whether `url` is cached without promoting it.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Drop every cached page.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn touch(&mut self, url: &str) {
        if self.order.front().is_some_and(|u| u == url) {
            return;
        }
        self.order.retain(|u| u != url);
        self.order.push_front(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str) -> Rc<PagePayload> {
        Rc::new(PagePayload {
            html: String::new(),
            title: Some(title.to_string()),
            content: Some(format!("<h1>{title}</h1>")),
        })
    }

    fn key(i: usize) -> String {
        format!("https://np.example/p{i}.html")
    }

    #[test]
    fn insert_and_retrieve() {
        let mut cache = PageCache::new(15);
        cache.insert(key(1), page("One"));
        assert!(cache.contains(&key(1)));
        let got = cache.get(&key(1)).unwrap();
        assert_eq!(got.title.as_deref(), Some("One"));
    }

    #[test]
    fn get_missing_returns_none_without_side_effect() {
        let mut cache = PageCache::new(15);
        cache.insert(key(1), page("One"));
        assert!(cache.get(&key(2)).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys_by_recency().collect::<Vec<_>>(), vec![key(1)]);
    }

    #[test]
    fn sixteenth_insert_evicts_the_oldest() {
        let mut cache = PageCache::new(15);
        for i in 0..16 {
            cache.insert(key(i), page(&format!("P{i}")));
        }
        assert_eq!(cache.len(), 15);
        assert!(!cache.contains(&key(0)));
        for i in 1..16 {
            assert!(cache.contains(&key(i)), "missing p{i}");
        }
    }

    #[test]
    fn get_promotes_entry_past_capacity_minus_one_inserts() {
        let mut cache = PageCache::new(15);
        for i in 0..15 {
            cache.insert(key(i), page("x"));
        }
        // p0 is the eviction candidate until read.
        assert!(cache.get(&key(0)).is_some());

        for i in 100..114 {
            cache.insert(key(i), page("x"));
        }
        assert_eq!(cache.len(), 15);
        assert!(cache.contains(&key(0)));
        for i in 1..15 {
            assert!(!cache.contains(&key(i)), "p{i} should be evicted");
        }
    }

    #[test]
    fn reinsert_replaces_and_promotes() {
        let mut cache = PageCache::new(2);
        cache.insert(key(1), page("old"));
        cache.insert(key(2), page("two"));
        cache.insert(key(1), page("new"));
        assert_eq!(cache.len(), 2);

        cache.insert(key(3), page("three"));
        assert!(!cache.contains(&key(2)));
        assert_eq!(cache.get(&key(1)).unwrap().title.as_deref(), Some("new"));
    }

    #[test]
    fn contains_does_not_promote() {
        let mut cache = PageCache::new(2);
        cache.insert(key(1), page("a"));
        cache.insert(key(2), page("b"));
        assert!(cache.contains(&key(1)));
        cache.insert(key(3), page("c"));
        assert!(!cache.contains(&key(1)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut cache = PageCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key(1), page("a"));
        cache.insert(key(2), page("b"));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&key(2)));
    }

    #[test]
    fn clear_cache() {
        let mut cache = PageCache::new(4);
        cache.insert(key(1), page("a"));
        cache.insert(key(2), page("b"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.keys_by_recency().count(), 0);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn len_never_exceeds_capacity(
                capacity in 1usize..20,
                ops in proptest::collection::vec((any::<bool>(), 0usize..40), 0..200),
            ) {
                let mut cache = PageCache::new(capacity);
                for (is_get, k) in ops {
                    if is_get {
                        let _ = cache.get(&key(k));
                    } else {
                        cache.insert(key(k), page("x"));
                    }
                    prop_assert!(cache.len() <= capacity);
                    prop_assert_eq!(cache.len(), cache.keys_by_recency().count());
                }
            }

            #[test]
            fn most_recent_insert_is_always_present(
                keys in proptest::collection::vec(0usize..40, 1..100),
            ) {
                let mut cache = PageCache::new(15);
                for k in &keys {
                    cache.insert(key(*k), page("x"));
                }
                let last = key(*keys.last().unwrap());
                prop_assert!(cache.contains(&last));
                prop_assert_eq!(cache.keys_by_recency().next(), Some(last.as_str()));
            }
        }
    }
}
