use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::ops::Bound;

use crate::core::ElementId;

/// 有序索引：id → value（权威数据）+ value → id 反查（Value Locator）
///
/// ## 契约
/// - 任一时刻只包含当前存活的元素。
/// - 遍历严格按 id 升序；BTreeMap 的迭代天然终止，不会回绕到首元素。
/// - 本结构自身不加锁，由上层结构锁保护（写路径独占，读路径共享）。
#[derive(Debug)]
pub struct OrderedIndex<V> {
    elements: BTreeMap<ElementId, V>,
    locator: HashMap<V, ElementId>,
}

impl<V> Default for OrderedIndex<V> {
    fn default() -> Self {
        Self {
            elements: BTreeMap::new(),
            locator: HashMap::new(),
        }
    }
}

impl<V: Clone + Eq + Hash> OrderedIndex<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入新元素并覆盖 value → id 映射。
    ///
    /// 若相等的 value 已存在，旧元素仍留在索引中（可按 id 查到、可被遍历），
    /// 但无法再按 value 删除。
    pub fn insert(&mut self, id: ElementId, value: V) -> Option<ElementId> {
        self.elements.insert(id, value.clone());
        self.locator.insert(value, id)
    }

    /// 按 value 删除，返回被删除元素的 id
    pub fn remove(&mut self, value: &V) -> Option<ElementId> {
        let id = self.locator.remove(value)?;
        self.elements.remove(&id);
        Some(id)
    }

    pub fn locate(&self, value: &V) -> Option<ElementId> {
        self.locator.get(value).copied()
    }

    pub fn get(&self, id: ElementId) -> Option<&V> {
        self.elements.get(&id)
    }

    /// 第一个 id >= `start` 的元素
    pub fn first_from(&self, start: ElementId) -> Option<(ElementId, &V)> {
        self.range_from(start).next()
    }

    /// 从第一个 id >= `start` 的元素开始的升序遍历
    pub fn range_from(&self, start: ElementId) -> Ascending<'_, V> {
        Ascending {
            inner: self.elements.range((Bound::Included(start), Bound::Unbounded)),
            prev: None,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn locator_len(&self) -> usize {
        self.locator.len()
    }
}

/// 升序遍历器：后继 id 不再严格递增即视为结构末尾
pub struct Ascending<'a, V> {
    inner: std::collections::btree_map::Range<'a, ElementId, V>,
    prev: Option<ElementId>,
}

impl<'a, V> Iterator for Ascending<'a, V> {
    type Item = (ElementId, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (&id, value) = self.inner.next()?;
        if self.prev.is_some_and(|prev| id <= prev) {
            // 回绕：到达末尾而不是新 id
            return None;
        }
        self.prev = Some(id);
        Some((id, value))
    }
}
