use std::hash::Hash;

use roaring::RoaringTreemap;

use crate::core::ElementId;
use crate::index::ordered::OrderedIndex;

/// 默认每批解析的 id 数
pub const DEFAULT_RESOLVE_BATCH: usize = 512;

/// id → value 解析结果
#[derive(Debug)]
pub struct Resolved<V> {
    pub values: Vec<V>,
    /// 集合中有、索引中已不存在的 id（元素在 entry 上次构建后被删除）
    pub stale: RoaringTreemap,
}

/// 按批把 id 解析回存活 value；批内按 id 升序
pub fn resolve_ids<V>(set: &RoaringTreemap, index: &OrderedIndex<V>, batch: usize) -> Resolved<V>
where
    V: Clone + Eq + Hash,
{
    let batch = batch.max(1);
    let mut values = Vec::with_capacity(set.len().min(index.len() as u64) as usize);
    let mut stale = RoaringTreemap::new();
    let mut buf: Vec<ElementId> = Vec::with_capacity(batch);

    let mut ids = set.iter();
    loop {
        buf.clear();
        buf.extend(ids.by_ref().take(batch));
        if buf.is_empty() {
            break;
        }
        for &id in &buf {
            match index.get(id) {
                Some(v) => values.push(v.clone()),
                None => {
                    stale.insert(id);
                }
            }
        }
    }

    Resolved { values, stale }
}
