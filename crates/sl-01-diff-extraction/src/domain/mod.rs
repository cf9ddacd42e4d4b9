pub mod entities;
pub mod extractor;

pub use entities::*;
pub use extractor::*;
