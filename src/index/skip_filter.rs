use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::ThreadPool;

use crate::config::SkipFilterConfig;
use crate::core::{AdaptiveScheduler, ElementId, IdAllocator, Task};
use crate::error::Result;
use crate::index::filter::FilterEntry;
use crate::index::filter_cache::FilterCache;
use crate::index::ordered::OrderedIndex;
use crate::query::matcher::FilterPredicate;
use crate::query::resolve::{resolve_ids, Resolved};
use crate::query::union::union_matches;
use crate::stats::{CacheStats, IndexStats, QueryCounters, SkipFilterReport};

/// 动态 value 集合 + 按 filter key 惰性构建的 bitmap 缓存
///
/// ## 锁
/// - 结构锁（RwLock）保护有序索引与 value 反查：add/remove 独占，
///   len/match_any/walk/contains 共享。
/// - 每个 FilterEntry 自带锁：两个不同 key 可以在都只持有结构读锁的情况下
///   并发补扫/回收；同一个 key 的补扫串行。
/// - 加锁顺序固定：结构锁 → entry 锁；entry 锁不会跨越另一把 entry 锁或结构写锁。
///
/// ## 删除
/// remove 不触碰任何 FilterEntry；被删元素的 id 留在命中集合里（stale），
/// 由之后的 match_any 在解析时发现并回收。
pub struct SkipFilter<V, F> {
    alloc: IdAllocator,
    state: RwLock<OrderedIndex<V>>,
    cache: FilterCache<F>,
    predicate: Arc<dyn FilterPredicate<V, F>>,
    scheduler: AdaptiveScheduler,
    pool: Option<ThreadPool>,
    resolve_batch: usize,
    counters: QueryCounters,
}

impl<V, F> SkipFilter<V, F>
where
    V: Clone + Eq + Hash + Send + Sync,
    F: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// - `predicate`: value 通过 filter 时返回 true，必须是纯函数（见 [`FilterPredicate`]）。
    /// - `maximum_size`: filter cache 容量，0 表示不限；应不小于预期的 filter 基数。
    pub fn new<P>(predicate: P, maximum_size: u64) -> Self
    where
        P: FilterPredicate<V, F> + 'static,
    {
        let cfg = SkipFilterConfig::with_max_cache_size(maximum_size);
        Self::build(Arc::new(predicate), &cfg, None)
    }

    /// 按配置构造；`union_parallelism > 0` 时为并集创建独立线程池
    pub fn with_config<P>(predicate: P, cfg: SkipFilterConfig) -> Result<Self>
    where
        P: FilterPredicate<V, F> + 'static,
    {
        cfg.validate()?;
        let pool = if cfg.union_parallelism > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(cfg.union_parallelism)
                    .thread_name(|i| format!("skipfilter-union-{}", i))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self::build(Arc::new(predicate), &cfg, pool))
    }

    fn build(
        predicate: Arc<dyn FilterPredicate<V, F>>,
        cfg: &SkipFilterConfig,
        pool: Option<ThreadPool>,
    ) -> Self {
        Self {
            alloc: IdAllocator::new(),
            state: RwLock::new(OrderedIndex::new()),
            cache: FilterCache::with_capacity(cfg.max_cache_size),
            predicate,
            scheduler: AdaptiveScheduler::new(cfg.union_parallelism, cfg.serial_union_threshold),
            pool,
            resolve_batch: cfg.resolve_batch.max(1),
            counters: QueryCounters::default(),
        }
    }

    /// 加入 value，返回分配的 id。
    ///
    /// 不做去重：再次加入相等的 value 会得到新元素与新 id，反查表改指向新 id；
    /// 旧元素仍存活（len/walk/match_any 可见），但无法再按 value 删除。
    pub fn add(&self, value: V) -> ElementId {
        let mut index = self.state.write();
        let id = self.alloc.allocate();
        if let Some(prev) = index.insert(id, value) {
            tracing::debug!(
                "Re-added equal value: id {} supersedes {} for value-based removal",
                id,
                prev
            );
        }
        id
    }

    /// 删除 value；未知 value 为 no-op（返回 false）
    pub fn remove(&self, value: &V) -> bool {
        self.state.write().remove(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.state.read().locate(value).is_some()
    }

    /// 返回匹配任一 filter key 的存活 value（无重复，顺序不保证）
    pub fn match_any(&self, filter_keys: &[F]) -> Vec<V> {
        self.counters.record_query();
        if filter_keys.is_empty() {
            return Vec::new();
        }

        let index = self.state.read();
        let head = self.alloc.head();

        let mut seen: HashSet<&F> = HashSet::with_capacity(filter_keys.len());
        let entries: Vec<Arc<FilterEntry>> = filter_keys
            .iter()
            .filter(|k| seen.insert(*k))
            .map(|k| self.get_filter(&*index, head, k))
            .collect();

        let total_ids = entries.iter().map(|e| e.cardinality()).sum();
        let strategy = self.scheduler.select_strategy(&Task::Union {
            sets: entries.len(),
            total_ids,
        });
        let set = union_matches(&entries, strategy, self.pool.as_ref());

        let Resolved { values, stale } = resolve_ids(&set, &*index, self.resolve_batch);
        if !stale.is_empty() {
            // 结构读锁仍持有：回收期间不会有新的 remove，stale 集合不会变化
            let removed: u64 = entries.iter().map(|e| e.reconcile(&stale)).sum();
            self.counters.record_reconcile(removed);
            tracing::debug!(
                "Reconciled {} stale ids across {} filter entries ({} removed)",
                stale.len(),
                entries.len(),
                removed
            );
        }
        values
    }

    /// 从 `start` 开始按 id 升序遍历所有存活 value。
    ///
    /// `visitor` 返回 true 继续、false 停止。返回值作为下一次的 `start`：
    /// 停止时为当前 id + 1，遍历完为最后一个 id + 1，无元素时原样返回 `start`。
    pub fn walk<W>(&self, start: ElementId, mut visitor: W) -> ElementId
    where
        W: FnMut(&V) -> bool,
    {
        let index = self.state.read();
        let mut next = start;
        for (id, value) in index.range_from(start) {
            next = id + 1;
            if !visitor(value) {
                break;
            }
        }
        next
    }

    /// 主动淘汰某个 key 的缓存；下次查询从头重建
    pub fn evict(&self, filter_key: &F) {
        self.cache.invalidate(filter_key);
        self.cache.run_pending_tasks();
    }

    /// 调整并集并行度（上限，仍受线程池大小约束）
    pub fn set_union_parallelism(&self, parallelism: usize) -> usize {
        self.scheduler.set_parallelism(parallelism)
    }

    pub fn report(&self) -> SkipFilterReport {
        let index = {
            let index = self.state.read();
            IndexStats {
                elements: index.len(),
                locator_entries: index.locator_len(),
                next_id: self.alloc.head(),
            }
        };

        self.cache.run_pending_tasks();
        let (match_ids_total, estimated_bytes) = self
            .cache
            .entries()
            .iter()
            .fold((0u64, 0u64), |(ids, bytes), e| {
                (ids + e.cardinality(), bytes + e.serialized_size() as u64)
            });

        SkipFilterReport {
            index,
            cache: CacheStats {
                capacity: self.cache.capacity(),
                entries: self.cache.entry_count(),
                hits: self.cache.hits(),
                misses: self.cache.misses(),
                evictions: self.cache.evictions(),
                match_ids_total,
                estimated_bytes,
            },
            query: self.counters.snapshot(),
        }
    }

    /// 取得（必要时创建并补扫）filter entry。调用方持有结构读锁。
    fn get_filter(&self, index: &OrderedIndex<V>, head: ElementId, key: &F) -> Arc<FilterEntry> {
        let entry = self.cache.get_or_create(key);
        if let Some(r) = entry.catch_up(index, head, key, self.predicate.as_ref()) {
            self.counters.record_build(r.scanned);
            tracing::debug!(
                "Filter entry caught up {} -> {}: scanned={} matched={}",
                r.from,
                r.to,
                r.scanned,
                r.matched
            );
        }
        entry
    }

    #[cfg(test)]
    fn entry_for(&self, key: &F) -> Option<Arc<FilterEntry>> {
        self.cache.get(key)
    }
}
