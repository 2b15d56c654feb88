// Application layer - the ledger store and its error surface.
// Clients (CLI, tests) go through `LedgerStore`; the domain stays pure.

pub mod error;
mod store;

pub use error::*;
pub use store::*;
