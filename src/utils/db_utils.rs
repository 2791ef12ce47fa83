use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::entry::{EntryPatch, FieldValue};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    String(String),
    Date(NaiveDate),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug, PartialEq, Eq)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build account-scoped UPDATE SQL
/// ===============================
///
/// Column names come from the patch's allow-listed fields, never from the
/// request payload, and every value is bound.
pub fn build_update_sql(
    table: &str,
    patch: &EntryPatch,
    id: &str,
    company_id: &str,
) -> Option<SqlUpdate> {
    if patch.is_empty() {
        return None;
    }

    let mut set_clause: Vec<String> = patch
        .iter()
        .map(|(field, _)| format!("{} = ?", field.as_ref()))
        .collect();
    set_clause.push("updated_at = CURRENT_TIMESTAMP".to_string());

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ? AND company_id = ?",
        table,
        set_clause.join(", ")
    );

    let mut values: Vec<SqlValue> = patch
        .iter()
        .map(|(_, value)| match value {
            FieldValue::Text(s) => SqlValue::String(s.clone()),
            FieldValue::Date(d) => SqlValue::Date(*d),
        })
        .collect();

    // WHERE id = ? AND company_id = ?
    values.push(SqlValue::String(id.to_string()));
    values.push(SqlValue::String(company_id.to_string()));

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
