pub mod distribution;
pub mod entities;
pub mod errors;
pub mod units;

pub use distribution::*;
pub use entities::*;
pub use errors::*;
pub use units::*;
