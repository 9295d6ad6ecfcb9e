//! Accounts domain module.
//!
//! This crate contains the account entity and its input validation, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod account;
pub mod email;

pub use account::{Account, CreateAccount, NewAccount};
pub use email::Email;
