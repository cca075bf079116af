use crate::config::StoreConfig;
use crate::db::models::{
    NewPayment, NewTokenUsage, NewUser, PaymentTransaction, TokenAccount, TokenUsageLog, User,
};
use crate::db::schema::{DEFAULT_PAYMENT_STATUS, SQLITE_INIT, STARTING_TOKENS};
use crate::error::StoreError;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

pub type SqlitePool = Pool<Sqlite>;

/// Owns the single shared connection to the ledger database.
///
/// Cloning is cheap; clones share the same handle.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database file and make sure every table exists.
    pub async fn initialize(config: &StoreConfig) -> Result<Self, StoreError> {
        let connect_opts = SqliteConnectOptions::from_str(config.database_url.as_str())?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;
        info!(database_url = %config.database_url, "sqlite database connection established");

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Execute the bundled DDL. Safe to run repeatedly.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let pool = self.connection()?;
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(pool).await?;
        }
        info!("database tables initialized");
        Ok(())
    }

    /// The open handle, or `NotInitialized` once the store has been closed.
    pub fn connection(&self) -> Result<&SqlitePool, StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::NotInitialized);
        }
        Ok(&self.pool)
    }

    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        info!("database connections closed");
    }

    /// Create a user together with its token account, seeded with the starting balance.
    ///
    /// The email check and both inserts share one transaction, so a failure at any
    /// step leaves no rows behind. Returns the input on success.
    pub async fn create_user(&self, user: NewUser) -> Result<NewUser, StoreError> {
        let mut tx = self.connection()?.begin().await?;

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&user.email)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            debug!(email = %user.email, "signup rejected: email already registered");
            return Err(StoreError::AlreadyExists);
        }

        let verified_i = if user.verified { 1 } else { 0 };
        sqlx::query(
            "INSERT INTO users (id, email, password, name, verified) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.name)
        .bind(verified_i)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO user_tokens (id, user_id, tokens_available, tokens_used, total_purchased)
               VALUES (?, ?, ?, 0, ?)"#,
        )
        .bind(&user.id)
        .bind(&user.id)
        .bind(STARTING_TOKENS)
        .bind(STARTING_TOKENS)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.connection()?)
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.connection()?)
            .await?;
        Ok(user)
    }

    /// Store the onboarding answers and mark onboarding complete.
    ///
    /// `None` and falsy JSON (`null`, `false`, `0`, `""`) are stored as `{}`.
    /// Returns the refreshed row, `None` if no user has this id.
    pub async fn update_user_onboarding(
        &self,
        user_id: &str,
        exam_data: Option<&Value>,
    ) -> Result<Option<User>, StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::RequiredFieldMissing("User ID"));
        }

        let exam_data = match exam_data {
            Some(v) if !is_falsy(v) => serde_json::to_string(v)?,
            _ => "{}".to_string(),
        };

        let updated = sqlx::query(
            r#"UPDATE users SET exam_data = ?, onboarding_completed = 1, updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(&exam_data)
        .bind(user_id)
        .execute(self.connection()?)
        .await?;
        if updated.rows_affected() == 0 {
            debug!(user_id = %user_id, "onboarding update skipped: no such user");
            return Ok(None);
        }
        info!(user_id = %user_id, "onboarding completed");

        self.find_user_by_id(user_id).await
    }

    pub async fn token_account(&self, user_id: &str) -> Result<Option<TokenAccount>, StoreError> {
        let account =
            sqlx::query_as::<_, TokenAccount>("SELECT * FROM user_tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.connection()?)
                .await?;
        Ok(account)
    }

    /// Debit the user's balance and append the matching audit log entry.
    pub async fn record_token_usage(
        &self,
        usage: NewTokenUsage,
    ) -> Result<TokenUsageLog, StoreError> {
        if usage.tokens_used <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "tokens_used must be positive, got {}",
                usage.tokens_used
            )));
        }

        let mut tx = self.connection()?.begin().await?;

        let available: Option<(i64,)> =
            sqlx::query_as("SELECT tokens_available FROM user_tokens WHERE user_id = ?")
                .bind(&usage.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((available,)) = available else {
            return Err(StoreError::TokenAccountMissing(usage.user_id));
        };
        if available < usage.tokens_used {
            return Err(StoreError::InsufficientTokens {
                available,
                requested: usage.tokens_used,
            });
        }

        sqlx::query(
            r#"UPDATE user_tokens SET
                tokens_available = tokens_available - ?,
                tokens_used = tokens_used + ?,
                updated_at = CURRENT_TIMESTAMP
              WHERE user_id = ?"#,
        )
        .bind(usage.tokens_used)
        .bind(usage.tokens_used)
        .bind(&usage.user_id)
        .execute(&mut *tx)
        .await?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"INSERT INTO token_usage_logs (
                id, user_id, action_type, tokens_used, description, exam_type, subject, topic
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&usage.user_id)
        .bind(&usage.action_type)
        .bind(usage.tokens_used)
        .bind(&usage.description)
        .bind(&usage.exam_type)
        .bind(&usage.subject)
        .bind(&usage.topic)
        .execute(&mut *tx)
        .await?;

        let log = sqlx::query_as::<_, TokenUsageLog>("SELECT * FROM token_usage_logs WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(
            user_id = %log.user_id,
            action_type = %log.action_type,
            tokens_used = log.tokens_used,
            "token usage recorded"
        );
        Ok(log)
    }

    /// Usage history for one user, newest first.
    pub async fn usage_logs(&self, user_id: &str) -> Result<Vec<TokenUsageLog>, StoreError> {
        let logs = sqlx::query_as::<_, TokenUsageLog>(
            "SELECT * FROM token_usage_logs WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.connection()?)
        .await?;
        Ok(logs)
    }

    /// Append a payment and credit the purchased tokens to the user's account.
    pub async fn record_payment(
        &self,
        payment: NewPayment,
    ) -> Result<PaymentTransaction, StoreError> {
        if payment.tokens_purchased <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "tokens_purchased must be positive, got {}",
                payment.tokens_purchased
            )));
        }
        if !payment.amount.is_finite() || payment.amount < 0.0 {
            return Err(StoreError::InvalidAmount(format!(
                "amount must be a non-negative number, got {}",
                payment.amount
            )));
        }

        let mut tx = self.connection()?.begin().await?;

        let credited = sqlx::query(
            r#"UPDATE user_tokens SET
                tokens_available = tokens_available + ?,
                total_purchased = total_purchased + ?,
                updated_at = CURRENT_TIMESTAMP
              WHERE user_id = ?"#,
        )
        .bind(payment.tokens_purchased)
        .bind(payment.tokens_purchased)
        .bind(&payment.user_id)
        .execute(&mut *tx)
        .await?;
        if credited.rows_affected() == 0 {
            return Err(StoreError::TokenAccountMissing(payment.user_id));
        }

        let id = Uuid::new_v4().to_string();
        let status = payment
            .status
            .as_deref()
            .unwrap_or(DEFAULT_PAYMENT_STATUS);
        sqlx::query(
            r#"INSERT INTO payment_transactions (
                id, user_id, amount, tokens_purchased, payment_method, status
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&payment.user_id)
        .bind(payment.amount)
        .bind(payment.tokens_purchased)
        .bind(&payment.payment_method)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE id = ?",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            user_id = %row.user_id,
            tokens_purchased = row.tokens_purchased,
            amount = row.amount,
            "payment recorded"
        );
        Ok(row)
    }

    /// Payment history for one user, newest first.
    pub async fn payments(&self, user_id: &str) -> Result<Vec<PaymentTransaction>, StoreError> {
        let rows = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.connection()?)
        .await?;
        Ok(rows)
    }
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
