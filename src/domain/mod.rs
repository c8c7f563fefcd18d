pub mod error;
pub mod ledger;
pub mod transaction;
pub mod withdrawal;
