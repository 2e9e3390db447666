//! Subcommand implementations.

pub mod health;
pub mod info;
pub mod receipts;
pub mod serve;
pub mod user;
