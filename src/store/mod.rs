//! Account-scoped persistence for entries and company accounts.
//!
//! Every entry operation takes the caller's `company_id`; an entry owned by
//! another account behaves exactly like one that does not exist.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::auth::password::{PasswordError, hash_password};
use crate::model::account::Account;
use crate::model::entry::{AttendanceEntry, EntryPatch, NewEntry, ValidationError};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

pub const DEMO_COMPANY_ID: &str = "demo-company";
pub const DEMO_COMPANY_NAME: &str = "デモ会社";
pub const DEMO_LOGIN_ID: &str = "admin";
pub const DEMO_PASSWORD: &str = "password";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("password hashing failed: {0}")]
    Hash(#[from] PasswordError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(AttendanceEntry),
    NotFound,
    Empty,
    /// The patched row would break an entry invariant; nothing was written.
    Rejected(ValidationError),
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of the account, by date then start time.
    async fn list(&self, company_id: &str) -> Result<Vec<AttendanceEntry>, StoreError>;

    /// The entry with `id` if the account owns it.
    async fn find(
        &self,
        company_id: &str,
        id: &str,
    ) -> Result<Option<AttendanceEntry>, StoreError>;

    async fn insert(
        &self,
        company_id: &str,
        entry: NewEntry,
    ) -> Result<AttendanceEntry, StoreError>;

    /// Existence is checked before emptiness, so an empty patch against a
    /// foreign id still reports `NotFound`. The patched row must keep
    /// end later than start.
    async fn update(
        &self,
        company_id: &str,
        id: &str,
        patch: &EntryPatch,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Returns false when nothing owned by the account had that id.
    async fn delete(&self, company_id: &str, id: &str) -> Result<bool, StoreError>;

    /// Distinct names in no particular order.
    async fn distinct_names(&self, company_id: &str) -> Result<Vec<String>, StoreError>;

    fn backend(&self) -> &'static str;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_company_id(&self, company_id: &str) -> Result<Option<Account>, StoreError>;

    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;
}

/// Creates the demo account unless it already exists.
pub async fn seed_demo_account(accounts: &dyn AccountStore) -> Result<(), StoreError> {
    if let Some(existing) = accounts.find_by_company_id(DEMO_COMPANY_ID).await? {
        info!(login_id = %existing.login_id, "Demo account already present");
        return Ok(());
    }

    accounts
        .insert_account(Account {
            company_id: DEMO_COMPANY_ID.to_string(),
            company_name: DEMO_COMPANY_NAME.to_string(),
            login_id: DEMO_LOGIN_ID.to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            created_at: None,
        })
        .await?;

    info!(login_id = DEMO_LOGIN_ID, "Demo account created");
    Ok(())
}
