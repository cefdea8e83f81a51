pub mod matcher;
pub mod resolve;
pub mod union;

pub use matcher::*;
pub use resolve::*;
pub use union::*;
