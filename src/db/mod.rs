//! Database module: models and schema for the account and token ledger.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows plus the insert payloads
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: the `Store` handle and its accessors

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{
    NewPayment, NewTokenUsage, NewUser, PaymentTransaction, TokenAccount, TokenUsageLog, User,
};
pub use schema::{SQLITE_INIT, STARTING_TOKENS};
pub use sqlite::{SqlitePool, Store};
