use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use tracing::debug;
use uuid::Uuid;

use super::{AccountStore, EntryStore, StoreError, UpdateOutcome};
use crate::model::account::Account;
use crate::model::entry::{AttendanceEntry, EntryPatch, NewEntry};
use crate::utils::db_utils::{build_update_sql, execute_update};

const ENTRY_COLUMNS: &str = "id, company_id, name, date, day_of_week, site_name, \
    work_description, start_time, end_time, total_hours, created_at, updated_at";

const ACCOUNT_COLUMNS: &str = "company_id, company_name, login_id, password_hash, created_at";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_owned(
        &self,
        company_id: &str,
        id: &str,
    ) -> Result<Option<AttendanceEntry>, sqlx::Error> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM attendance_entries WHERE id = ? AND company_id = ?"
        );
        sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl EntryStore for MySqlStore {
    async fn list(&self, company_id: &str) -> Result<Vec<AttendanceEntry>, StoreError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM attendance_entries WHERE company_id = ? \
             ORDER BY date ASC, start_time ASC, created_at ASC, id ASC"
        );
        let entries = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn find(
        &self,
        company_id: &str,
        id: &str,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        Ok(self.fetch_owned(company_id, id).await?)
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

        sqlx::query(
            r#"
            INSERT INTO attendance_entries
            (id, company_id, name, date, day_of_week, site_name, work_description,
             start_time, end_time, total_hours, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.company_id)
        .bind(&entry.name)
        .bind(entry.date)
        .bind(&entry.day_of_week)
        .bind(&entry.site_name)
        .bind(&entry.work_description)
        .bind(&entry.start_time)
        .bind(&entry.end_time)
        .bind(&entry.total_hours)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(entry_id = %entry.id, company_id, "Entry inserted");
        Ok(entry)
    }

    async fn update(
        &self,
        company_id: &str,
        id: &str,
        patch: &EntryPatch,
    ) -> Result<UpdateOutcome, StoreError> {
        let Some(current) = self.fetch_owned(company_id, id).await? else {
            return Ok(UpdateOutcome::NotFound);
        };

        let Some(update) = build_update_sql("attendance_entries", patch, id, company_id) else {
            return Ok(UpdateOutcome::Empty);
        };
        if let Err(e) = current.patched(patch) {
            return Ok(UpdateOutcome::Rejected(e));
        }
        debug!(sql = %update.sql, fields = patch.len(), "Updating entry");
        execute_update(&self.pool, update).await?;

        Ok(match self.fetch_owned(company_id, id).await? {
            Some(entry) => UpdateOutcome::Updated(entry),
            None => UpdateOutcome::NotFound,
        })
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance_entries WHERE id = ? AND company_id = ?")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn distinct_names(&self, company_id: &str) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT name FROM attendance_entries WHERE company_id = ?",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    fn backend(&self) -> &'static str {
        "mysql"
    }
}

#[async_trait]
impl AccountStore for MySqlStore {
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM company_accounts WHERE login_id = ?");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(login_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_company_id(&self, company_id: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM company_accounts WHERE company_id = ?");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO company_accounts (company_id, company_name, login_id, password_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&account.company_id)
        .bind(&account.company_name)
        .bind(&account.login_id)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
