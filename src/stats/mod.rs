use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// SkipFilter 运行状态快照
#[derive(Clone, Debug, Default)]
pub struct SkipFilterReport {
    /// 有序索引 + value 反查
    pub index: IndexStats,
    /// filter cache
    pub cache: CacheStats,
    /// 查询 / 补扫 / 回收计数
    pub query: QueryStats,
}

#[derive(Clone, Debug, Default)]
pub struct IndexStats {
    /// 存活元素数
    pub elements: usize,
    /// value → id 条目数（重复 add 同一 value 时小于 elements）
    pub locator_entries: usize,
    /// 下一个将分配的 id
    pub next_id: u64,
}

#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    /// 容量上限（0 = 不限）
    pub capacity: u64,
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// 所有 entry 命中集合的 id 总数（含 stale）
    pub match_ids_total: u64,
    /// 命中集合序列化尺寸之和（估算内存，字节）
    pub estimated_bytes: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub queries: u64,
    /// 实际发生的增量补扫次数（快路径不计）
    pub builds: u64,
    /// 补扫过程中测试过谓词的元素数
    pub scanned: u64,
    /// 发现 stale id 并执行回收的查询次数
    pub reconcile_passes: u64,
    /// 从各 entry 实际移除的 stale id 总数
    pub stale_removed: u64,
}

/// 无锁计数器
#[derive(Debug, Default)]
pub struct QueryCounters {
    queries: AtomicU64,
    builds: AtomicU64,
    scanned: AtomicU64,
    reconcile_passes: AtomicU64,
    stale_removed: AtomicU64,
}

impl QueryCounters {
    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_build(&self, scanned: u64) {
        self.builds.fetch_add(1, Ordering::Relaxed);
        self.scanned.fetch_add(scanned, Ordering::Relaxed);
    }

    pub fn record_reconcile(&self, removed: u64) {
        self.reconcile_passes.fetch_add(1, Ordering::Relaxed);
        self.stale_removed.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueryStats {
        QueryStats {
            queries: self.queries.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            scanned: self.scanned.load(Ordering::Relaxed),
            reconcile_passes: self.reconcile_passes.load(Ordering::Relaxed),
            stale_removed: self.stale_removed.load(Ordering::Relaxed),
        }
    }
}

fn human_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn capacity_label(capacity: u64) -> String {
    if capacity == 0 {
        "unbounded".to_string()
    } else {
        capacity.to_string()
    }
}

impl fmt::Display for SkipFilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           skipfilter Report                      ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║ Index:                                           ║")?;
        writeln!(f, "║   elements:     {:>10}                       ║", self.index.elements)?;
        writeln!(
            f,
            "║   locator:      {:>10}                       ║",
            self.index.locator_entries
        )?;
        writeln!(f, "║   next id:      {:>10}                       ║", self.index.next_id)?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(f, "║ Filter Cache:                                    ║")?;
        writeln!(
            f,
            "║   entries:      {:>10}  (cap {:>10})      ║",
            self.cache.entries,
            capacity_label(self.cache.capacity)
        )?;
        writeln!(f, "║   hits:         {:>10}                       ║", self.cache.hits)?;
        writeln!(f, "║   misses:       {:>10}                       ║", self.cache.misses)?;
        writeln!(f, "║   evictions:    {:>10}                       ║", self.cache.evictions)?;
        writeln!(
            f,
            "║   match ids:    {:>10}  ({:>10})          ║",
            self.cache.match_ids_total,
            human_bytes(self.cache.estimated_bytes)
        )?;
        writeln!(f, "╠──────────────────────────────────────────────────╣")?;
        writeln!(f, "║ Queries:                                         ║")?;
        writeln!(f, "║   match_any:    {:>10}                       ║", self.query.queries)?;
        writeln!(f, "║   builds:       {:>10}                       ║", self.query.builds)?;
        writeln!(f, "║   scanned:      {:>10}                       ║", self.query.scanned)?;
        writeln!(
            f,
            "║   reconciles:   {:>10}                       ║",
            self.query.reconcile_passes
        )?;
        writeln!(
            f,
            "║   stale freed:  {:>10}                       ║",
            self.query.stale_removed
        )?;
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
