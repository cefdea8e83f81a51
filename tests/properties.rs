//! Property tests: SkipFilter vs. a brute-force model
//!
//! 模型直接保存 id → value 与 value → id，按同样的语义（重复 add 覆盖反查）演进，
//! 查询时对所有存活元素逐个测试谓词。

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;
use skipfilter::SkipFilter;

fn divisible(value: &u32, filter: &u32) -> bool {
    value % filter == 0
}

#[derive(Clone, Debug)]
enum Op {
    Add(u32),
    Remove(u32),
    Query(Vec<u32>),
    Evict(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0u32..64).prop_map(Op::Add),
        2 => (0u32..64).prop_map(Op::Remove),
        2 => prop::collection::vec(1u32..9, 1..4).prop_map(Op::Query),
        1 => (1u32..9).prop_map(Op::Evict),
    ]
}

#[derive(Default)]
struct Model {
    next: u64,
    elements: BTreeMap<u64, u32>,
    locator: HashMap<u32, u64>,
}

impl Model {
    fn add(&mut self, v: u32) -> u64 {
        let id = self.next;
        self.next += 1;
        self.elements.insert(id, v);
        self.locator.insert(v, id);
        id
    }

    fn remove(&mut self, v: u32) -> bool {
        match self.locator.remove(&v) {
            Some(id) => {
                self.elements.remove(&id);
                true
            }
            None => false,
        }
    }

    fn match_any(&self, keys: &[u32]) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .elements
            .values()
            .filter(|v| keys.iter().any(|k| divisible(*v, k)))
            .copied()
            .collect();
        out.sort_unstable();
        out
    }

    fn live(&self) -> Vec<u32> {
        self.elements.values().copied().collect()
    }
}

fn sorted(mut v: Vec<u32>) -> Vec<u32> {
    v.sort_unstable();
    v
}

fn collect_walk(sf: &SkipFilter<u32, u32>, chunk: usize) -> Vec<u32> {
    let mut out = Vec::new();
    let mut cursor = 0;
    loop {
        let mut taken = Vec::new();
        cursor = sf.walk(cursor, |v| {
            taken.push(*v);
            taken.len() < chunk
        });
        if taken.is_empty() {
            break;
        }
        out.extend(taken);
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn matches_brute_force_model(ops in prop::collection::vec(op(), 0..200), capacity in 0u64..4) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, capacity);
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Add(v) => {
                    prop_assert_eq!(sf.add(v), model.add(v));
                }
                Op::Remove(v) => {
                    prop_assert_eq!(sf.remove(&v), model.remove(v));
                }
                Op::Query(keys) => {
                    prop_assert_eq!(sorted(sf.match_any(&keys)), model.match_any(&keys));
                }
                Op::Evict(k) => sf.evict(&k),
            }
            prop_assert_eq!(sf.len(), model.elements.len());
        }

        for k in 1u32..9 {
            prop_assert_eq!(sorted(sf.match_any(&[k])), model.match_any(&[k]));
        }
    }

    #[test]
    fn union_equals_union_of_single_queries(
        values in prop::collection::hash_set(0u32..500, 0..150),
        removed in prop::collection::vec(0u32..500, 0..50),
        k1 in 1u32..12,
        k2 in 1u32..12,
    ) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, 0);
        for v in &values {
            sf.add(*v);
        }
        // 先建好缓存，再删除，使联合查询经过 stale 回收路径
        sf.match_any(&[k1]);
        sf.match_any(&[k2]);
        for v in &removed {
            sf.remove(v);
        }

        let both = sorted(sf.match_any(&[k1, k2]));
        let mut expected = sf.match_any(&[k1]);
        expected.extend(sf.match_any(&[k2]));
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(both, expected);
    }

    #[test]
    fn walk_visits_everything_once_in_order(
        ops in prop::collection::vec(op(), 0..150),
        chunk in 1usize..7,
    ) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, 0);
        let mut model = Model::default();
        for op in ops {
            match op {
                Op::Add(v) => { sf.add(v); model.add(v); }
                Op::Remove(v) => { sf.remove(&v); model.remove(v); }
                _ => {}
            }
        }

        let mut whole = Vec::new();
        sf.walk(0, |v| { whole.push(*v); true });
        prop_assert_eq!(&whole, &model.live());
        prop_assert_eq!(collect_walk(&sf, chunk), model.live());
    }

    #[test]
    fn ids_strictly_increase(ops in prop::collection::vec(op(), 0..200)) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, 0);
        let mut last: Option<u64> = None;
        for op in ops {
            match op {
                Op::Add(v) => {
                    let id = sf.add(v);
                    if let Some(prev) = last {
                        prop_assert!(id > prev);
                    }
                    last = Some(id);
                }
                Op::Remove(v) => { sf.remove(&v); }
                _ => {}
            }
        }
    }

    #[test]
    fn stale_reconciliation_settles(
        values in prop::collection::hash_set(0u32..300, 1..100),
        k in 1u32..6,
    ) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, 0);
        for v in &values {
            sf.add(*v);
        }
        let before = sf.match_any(&[k]);
        for v in before.iter().step_by(2) {
            sf.remove(v);
        }

        let first = sorted(sf.match_any(&[k]));
        let passes = sf.report().query.reconcile_passes;
        let second = sorted(sf.match_any(&[k]));
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(sf.report().query.reconcile_passes, passes);
        prop_assert_eq!(sf.report().cache.match_ids_total, first.len() as u64);
    }

    #[test]
    fn rebuild_after_eviction_is_identical(
        ops in prop::collection::vec(op(), 0..150),
        k in 1u32..9,
    ) {
        let sf: SkipFilter<u32, u32> = SkipFilter::new(divisible, 0);
        for op in ops {
            match op {
                Op::Add(v) => { sf.add(v); }
                Op::Remove(v) => { sf.remove(&v); }
                Op::Query(keys) => { sf.match_any(&keys); }
                Op::Evict(_) => {}
            }
        }
        let before = sorted(sf.match_any(&[k]));
        sf.evict(&k);
        prop_assert_eq!(sorted(sf.match_any(&[k])), before);
    }
}
