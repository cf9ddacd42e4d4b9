pub mod entities;
pub mod errors;
pub mod ledger;
pub mod snapshot;
pub mod state;

pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use snapshot::*;
pub use state::*;
