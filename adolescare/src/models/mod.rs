mod chunk;
mod insight;
mod tip;

pub use chunk::*;
pub use insight::*;
pub use tip::*;
