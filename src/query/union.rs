use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use roaring::RoaringTreemap;

use crate::core::ExecutionStrategy;
use crate::index::filter::FilterEntry;

/// 多个 filter entry 的命中集合求并（类 ParOr）
///
/// 每个 entry 只在 OR 进累加器期间持有自己的锁，不会同时持有两把 entry 锁。
pub fn union_matches(
    entries: &[Arc<FilterEntry>],
    strategy: ExecutionStrategy,
    pool: Option<&ThreadPool>,
) -> RoaringTreemap {
    match strategy {
        ExecutionStrategy::Serial => entries.iter().fold(RoaringTreemap::new(), |mut acc, e| {
            acc |= &*e.lock();
            acc
        }),
        ExecutionStrategy::Parallel { shards } => {
            let min_len = entries.len().div_ceil(shards.max(1)).max(1);
            let run = || {
                entries
                    .par_iter()
                    .with_min_len(min_len)
                    .fold(RoaringTreemap::new, |mut acc, e| {
                        acc |= &*e.lock();
                        acc
                    })
                    .reduce(RoaringTreemap::new, |a, b| a | b)
            };
            match pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        }
    }
}
