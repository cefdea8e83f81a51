use std::sync::atomic::{AtomicUsize, Ordering};

/// 自适应调度器：为 match_any 的并集选择执行策略
pub struct AdaptiveScheduler {
    target_parallelism: AtomicUsize,
    serial_threshold: u64,
}

impl AdaptiveScheduler {
    /// `parallelism == 0` 表示匹配核心数
    pub fn new(parallelism: usize, serial_threshold: u64) -> Self {
        let parallelism = if parallelism == 0 {
            num_cpus::get()
        } else {
            parallelism
        };
        Self {
            target_parallelism: AtomicUsize::new(parallelism.max(1)),
            serial_threshold,
        }
    }

    pub fn parallelism(&self) -> usize {
        self.target_parallelism.load(Ordering::Relaxed)
    }

    /// 动态调整并行度（例如嵌入方根据负载降级）
    pub fn set_parallelism(&self, parallelism: usize) -> usize {
        let new_parallelism = parallelism.max(1);
        let old = self
            .target_parallelism
            .swap(new_parallelism, Ordering::Relaxed);
        if old != new_parallelism {
            tracing::info!("Union parallelism: {} -> {}", old, new_parallelism);
        }
        new_parallelism
    }

    /// 根据任务特性选择执行策略
    pub fn select_strategy(&self, task: &Task) -> ExecutionStrategy {
        match task {
            Task::Union { sets, .. } if *sets <= 1 => ExecutionStrategy::Serial,
            Task::Union { total_ids, .. } if *total_ids < self.serial_threshold => {
                // 小集合：串行避免调度开销
                ExecutionStrategy::Serial
            }
            Task::Union { sets, .. } => ExecutionStrategy::Parallel {
                shards: (*sets).min(self.parallelism()),
            },
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Task {
    /// `sets` 个 bitmap 求并，合计 `total_ids` 个 id（含重复）
    Union { sets: usize, total_ids: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Serial,
    Parallel { shards: usize },
}
