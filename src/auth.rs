//! Auth-domain types: the bearer credential and the account payloads exchanged with the API.

pub mod account;
pub mod credential;

pub use account::*;
pub use credential::*;
