use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;

use crate::index::filter::FilterEntry;

/// filter key → FilterEntry 的有界缓存（moka，TinyLFU 淘汰）
///
/// 淘汰任何时刻都是安全的：丢掉 entry 只意味着下次从 high-water = 0 重建。
pub struct FilterCache<F> {
    inner: Cache<F, Arc<FilterEntry>>,
    capacity: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl<F> FilterCache<F>
where
    F: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// `capacity == 0` 表示不限容量
    pub fn with_capacity(capacity: u64) -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let listener_evictions = evictions.clone();

        let mut builder = Cache::builder().eviction_listener(
            move |_key: Arc<F>, _entry: Arc<FilterEntry>, cause: moka::notification::RemovalCause| {
                if cause.was_evicted() {
                    listener_evictions.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!("filter entry evicted ({:?})", cause);
                }
            },
        );
        if capacity > 0 {
            builder = builder.max_capacity(capacity);
        }

        Self {
            inner: builder.build(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions,
        }
    }

    /// 原子 get-or-insert：未见过的 key 得到空 entry（high-water = 0）
    pub fn get_or_create(&self, key: &F) -> Arc<FilterEntry> {
        let entry = self
            .inner
            .entry_by_ref(key)
            .or_insert_with(|| Arc::new(FilterEntry::new()));
        if entry.is_fresh() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("filter cache miss, created empty entry");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry.into_value()
    }

    pub fn get(&self, key: &F) -> Option<Arc<FilterEntry>> {
        self.inner.get(key)
    }

    pub fn invalidate(&self, key: &F) {
        self.inner.invalidate(key);
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// 触发挂起的维护任务（淘汰等），使 entry_count 准确
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn entries(&self) -> Vec<Arc<FilterEntry>> {
        self.inner.iter().map(|(_, e)| e).collect()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}
