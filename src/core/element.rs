use std::sync::atomic::{AtomicU64, Ordering};

/// 元素 id：单调递增、永不复用
pub type ElementId = u64;

/// 有序索引中的元素（id 不可变）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element<V> {
    pub id: ElementId,
    pub value: V,
}

/// id 分配器（全局计数器）
///
/// ## 契约
/// - `allocate` 只在结构写锁内调用，因此不存在两个并发的分配者。
/// - `head` 可在读锁下无锁读取：filter entry 用它判断自己是否落后。
/// - 已分配的 id 即使元素被删除也不会再次发放，filter entry 跨时间缓存的 id
///   永远不会“换人”。
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一个将被分配的 id（= 已分配数量）
    pub fn head(&self) -> ElementId {
        self.next.load(Ordering::Acquire)
    }

    pub fn allocate(&self) -> ElementId {
        self.next.fetch_add(1, Ordering::AcqRel)
    }
}
