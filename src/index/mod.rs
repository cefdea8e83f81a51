pub mod filter;
pub mod filter_cache;
pub mod ordered;
pub mod skip_filter;

pub use filter::{CatchUp, FilterEntry};
pub use filter_cache::FilterCache;
pub use ordered::OrderedIndex;
pub use skip_filter::SkipFilter;
