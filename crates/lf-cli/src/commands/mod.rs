//! Command implementations

pub(crate) mod common;
pub mod ledger;
pub mod run;
pub mod status;
