use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Signup payload. `password` arrives already hashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub verified: bool,
    pub exam_data: Option<String>,
    pub onboarding_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Decode the stored onboarding blob, if any.
    pub fn exam_data_json(&self) -> Result<Option<Value>, serde_json::Error> {
        self.exam_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct TokenAccount {
    pub id: String,
    pub user_id: String,
    pub tokens_available: i64,
    pub tokens_used: i64,
    pub total_purchased: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewTokenUsage {
    pub user_id: String,
    pub action_type: String,
    pub tokens_used: i64,
    pub description: Option<String>,
    pub exam_type: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct TokenUsageLog {
    pub id: String,
    pub user_id: String,
    pub action_type: String,
    pub tokens_used: i64,
    pub description: Option<String>,
    pub exam_type: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub user_id: String,
    pub amount: f64,
    pub tokens_purchased: i64,
    pub payment_method: Option<String>,
    /// `None` stores the column default, `completed`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PaymentTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub tokens_purchased: i64,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub created_at: NaiveDateTime,
}
