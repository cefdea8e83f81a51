use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkipFilterError};
use crate::query::DEFAULT_RESOLVE_BATCH;

/// SkipFilter 配置（TOML 可加载，所有字段都有默认值）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipFilterConfig {
    /// filter cache 最大 entry 数；0 表示不限。
    /// 应不小于预期的 filter key 基数，否则会反复从头重建。
    pub max_cache_size: u64,
    /// 并集并行度；0 表示匹配核心数（使用 rayon 全局线程池）
    pub union_parallelism: usize,
    /// 合计 id 数低于该值时串行求并
    pub serial_union_threshold: u64,
    /// 每批解析的 id 数
    pub resolve_batch: usize,
}

impl Default for SkipFilterConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 0,
            union_parallelism: 0,
            serial_union_threshold: 4096,
            resolve_batch: DEFAULT_RESOLVE_BATCH,
        }
    }
}

impl SkipFilterConfig {
    pub fn with_max_cache_size(max_cache_size: u64) -> Self {
        Self {
            max_cache_size,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&s)?;
        tracing::info!("Loaded skipfilter config from {:?}: {:?}", path, cfg);
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolve_batch == 0 {
            return Err(SkipFilterError::InvalidConfig("resolve_batch must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SkipFilterConfig::from_toml_str("max_cache_size = 10\n").unwrap();
        assert_eq!(cfg.max_cache_size, 10);
        assert_eq!(cfg.resolve_batch, DEFAULT_RESOLVE_BATCH);
        assert_eq!(cfg.serial_union_threshold, 4096);
    }

    #[test]
    fn zero_batch_is_rejected() {
        let err = SkipFilterConfig::from_toml_str("resolve_batch = 0").unwrap_err();
        assert!(matches!(err, SkipFilterError::InvalidConfig(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = SkipFilterConfig::from_toml_str("max_cache_size = \"many\"").unwrap_err();
        assert!(matches!(err, SkipFilterError::Toml(_)));
    }

    #[test]
    fn load_from_file() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("skipfilter-config-{}.toml", nanos));
        std::fs::write(&path, "union_parallelism = 2\nresolve_batch = 64\n").unwrap();

        let cfg = SkipFilterConfig::load(&path).unwrap();
        assert_eq!(cfg.union_parallelism, 2);
        assert_eq!(cfg.resolve_batch, 64);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            SkipFilterConfig::load(&path),
            Err(SkipFilterError::Io(_))
        ));
    }
}
