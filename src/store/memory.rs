use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{AccountStore, EntryStore, StoreError, UpdateOutcome};
use crate::model::account::Account;
use crate::model::entry::{AttendanceEntry, EntryPatch, NewEntry};

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<AttendanceEntry>>,
    accounts: RwLock<Vec<Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn list(&self, company_id: &str) -> Result<Vec<AttendanceEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut owned: Vec<AttendanceEntry> = entries
            .iter()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect();
        // stable: insertion order breaks remaining ties
        owned.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(owned)
    }

    async fn find(
        &self,
        company_id: &str,
        id: &str,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries
            .iter()
            .find(|e| e.id == id && e.company_id == company_id)
            .cloned())
    }

    async fn insert(
        &self,
        company_id: &str,
        entry: NewEntry,
    ) -> Result<AttendanceEntry, StoreError> {
        let entry = entry.into_entry(
            Uuid::new_v4().to_string(),
            company_id,
            Utc::now().naive_utc(),
        );
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        company_id: &str,
        id: &str,
        patch: &EntryPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.id == id && e.company_id == company_id)
        else {
            return Ok(UpdateOutcome::NotFound);
        };
        if patch.is_empty() {
            return Ok(UpdateOutcome::Empty);
        }
        let mut next = match entry.patched(patch) {
            Ok(next) => next,
            Err(e) => return Ok(UpdateOutcome::Rejected(e)),
        };
        next.updated_at = Some(Utc::now().naive_utc());
        *entry = next.clone();
        Ok(UpdateOutcome::Updated(next))
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|e| !(e.id == id && e.company_id == company_id));
        Ok(entries.len() != before)
    }

    async fn distinct_names(&self, company_id: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = entries
            .iter()
            .filter(|e| e.company_id == company_id)
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.iter().find(|a| a.login_id == login_id).cloned())
    }

    async fn find_by_company_id(&self, company_id: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(accounts.iter().find(|a| a.company_id == company_id).cloned())
    }

    async fn insert_account(&self, mut account: Account) -> Result<(), StoreError> {
        account.created_at.get_or_insert_with(|| Utc::now().naive_utc());
        self.accounts
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(account);
        Ok(())
    }
}
