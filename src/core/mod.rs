pub mod adaptive;
pub mod element;

pub use adaptive::*;
pub use element::*;
