//! SQL DDL for the account and token ledger tables.
//! Column names, types and defaults are part of the on-disk contract.

/// Starting balance seeded into every new token account.
pub const STARTING_TOKENS: i64 = 50;

/// Status written for payments recorded without one; mirrors the column default.
pub const DEFAULT_PAYMENT_STATUS: &str = "completed";

/// SQLite schema with:
/// - `users` keyed by an opaque caller-supplied id, `email` UNIQUE
/// - `user_tokens` sharing the user's id, one row per user
/// - `token_usage_logs` and `payment_transactions`, append-only
/// - every child table cascades on user delete (needs `PRAGMA foreign_keys = ON`)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    name TEXT,
    verified INTEGER DEFAULT 0,
    exam_data TEXT,
    onboarding_completed INTEGER DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS user_tokens (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    tokens_available INTEGER DEFAULT 50,
    tokens_used INTEGER DEFAULT 0,
    total_purchased INTEGER DEFAULT 50,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS token_usage_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    tokens_used INTEGER NOT NULL,
    description TEXT,
    exam_type TEXT,
    subject TEXT,
    topic TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS payment_transactions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    amount REAL NOT NULL,
    tokens_purchased INTEGER NOT NULL,
    payment_method TEXT,
    status TEXT DEFAULT 'completed',
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
)
"#;
