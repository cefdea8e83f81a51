use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use roaring::RoaringTreemap;

use crate::core::ElementId;
use crate::index::ordered::OrderedIndex;
use crate::query::matcher::FilterPredicate;

/// 单个 filter key 的缓存状态：扫描游标（high-water mark）+ 命中 id 集合
///
/// ## 契约
/// - `high_water` 只增不减；`< head` 表示落后，需要增量补扫。
/// - `matches` 可能包含已删除元素的 id（stale），由查询路径回收。
/// - 自带锁，与结构锁相互独立：不同 key 的补扫/回收互不阻塞。
#[derive(Debug, Default)]
pub struct FilterEntry {
    high_water: AtomicU64,
    matches: Mutex<RoaringTreemap>,
}

/// 一次补扫的结果（用于日志与统计）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatchUp {
    pub from: ElementId,
    pub to: ElementId,
    pub scanned: u64,
    pub matched: u64,
}

impl FilterEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn high_water(&self) -> ElementId {
        self.high_water.load(Ordering::Acquire)
    }

    pub fn is_current(&self, head: ElementId) -> bool {
        self.high_water() >= head
    }

    pub fn lock(&self) -> MutexGuard<'_, RoaringTreemap> {
        self.matches.lock()
    }

    /// 增量补扫：从第一个 id >= high_water 的元素开始测试谓词，推进到 `head`。
    ///
    /// 调用方需持有结构读锁（索引与 `head` 在调用期间稳定）。
    /// 已是最新时走快路径，只做一次原子读、不加锁。
    pub fn catch_up<V, F>(
        &self,
        index: &OrderedIndex<V>,
        head: ElementId,
        key: &F,
        predicate: &dyn FilterPredicate<V, F>,
    ) -> Option<CatchUp>
    where
        V: Clone + Eq + std::hash::Hash,
    {
        if self.is_current(head) {
            return None;
        }

        let mut set = self.matches.lock();
        // 持锁复查：同 key 的并发补扫可能已经完成
        let from = self.high_water();
        if from >= head {
            return None;
        }

        let mut scanned = 0u64;
        let mut matched = 0u64;
        for (id, value) in index.range_from(from) {
            if id >= head {
                break;
            }
            scanned += 1;
            if predicate.test(value, key) {
                set.insert(id);
                matched += 1;
            }
        }
        self.high_water.fetch_max(head, Ordering::AcqRel);

        Some(CatchUp {
            from,
            to: head,
            scanned,
            matched,
        })
    }

    /// 回收 stale id，返回实际移除数量
    pub fn reconcile(&self, stale: &RoaringTreemap) -> u64 {
        let mut set = self.matches.lock();
        let before = set.len();
        *set -= stale;
        before - set.len()
    }

    pub fn cardinality(&self) -> u64 {
        self.matches.lock().len()
    }

    pub fn serialized_size(&self) -> usize {
        self.matches.lock().serialized_size()
    }
}
