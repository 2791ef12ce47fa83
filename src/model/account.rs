use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub company_id: String,
    pub company_name: String,
    pub login_id: String,
    pub password_hash: String,
    pub created_at: Option<NaiveDateTime>,
}

/// Public view of an account, without the credential hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = "demo-company")]
    pub company_id: String,
    #[schema(example = "デモ会社")]
    pub company_name: String,
    #[schema(example = "admin")]
    pub login_id: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            company_id: account.company_id,
            company_name: account.company_name,
            login_id: account.login_id,
        }
    }
}
