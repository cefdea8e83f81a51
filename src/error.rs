use thiserror::Error;

/// 构造期错误。核心操作（add/remove/match_any/walk）从不失败：
/// 查找未命中是预期情况，走 no-op 或 stale 回收路径。
#[derive(Error, Debug)]
pub enum SkipFilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SkipFilterError>;
