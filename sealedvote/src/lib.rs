//! Commit-reveal elections on a replicated key-value ledger.
//!
//! Voters store a secret ballot in their organization's confidential
//! partition and publish only its hash on the election. Once the organizer
//! closes the election, voters reveal their ballots, each reveal is checked
//! against its earlier commitment, and the organizer tallies the result.

#[macro_use]
extern crate serde;

mod authz;
mod context;
mod contract;
mod election;
mod error;
mod handler;
mod identity;
mod store;
mod tally;
mod transaction;
mod vote;

pub use authz::*;
pub use context::*;
pub use contract::*;
pub use election::*;
pub use error::*;
pub use handler::*;
pub use identity::*;
pub use store::*;
pub use tally::*;
pub use transaction::*;
pub use vote::*;
