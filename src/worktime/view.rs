//! Name filtering, suggestion lists and export set selection over an
//! account's entries.
//!
//! Display order and export order differ on purpose: the list view is
//! sorted by date only, exports are grouped by worker name first.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use crate::model::entry::AttendanceEntry;
use crate::worktime::collation::NameOrder;

pub const EXPORT_SHEET_NAME: &str = "出勤記録";
const EXPORT_FILE_STEM: &str = "出勤記録";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportScope {
    /// The name-filtered list as currently displayed.
    #[default]
    Current,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    #[serde(default)]
    pub scope: ExportScope,
    /// `YYYY-MM`, required for the monthly scope.
    #[param(example = "2024-06")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// `YYYY`, required for the yearly scope.
    #[param(example = "2024")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Exact worker name to narrow the set to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ExportQuery {
    fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("select a month to export")]
    MonthRequired,
    #[error("select a year to export")]
    YearRequired,
    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidMonth(String),
    #[error("invalid year {0:?}, expected YYYY")]
    InvalidYear(String),
    #[error("no entries to export")]
    Empty,
}

/// Distinct names in collation order. Names the collator treats as equal
/// fall back to code point order so the result stays deterministic.
pub fn sorted_distinct_names<I>(names: I, order: &impl NameOrder) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = names
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    names.sort_by(|a, b| order.compare(a, b).then_with(|| a.cmp(b)));
    names
}

pub fn name_suggestions(entries: &[AttendanceEntry], order: &impl NameOrder) -> Vec<String> {
    sorted_distinct_names(entries.iter().map(|e| e.name.clone()), order)
}

/// Entries whose name equals `name` exactly (all entries when `None` or
/// empty), sorted by date for display.
pub fn filter_by_name<'a>(
    entries: &'a [AttendanceEntry],
    name: Option<&str>,
) -> Vec<&'a AttendanceEntry> {
    let name = name.filter(|n| !n.is_empty());
    let mut shown: Vec<&AttendanceEntry> = entries
        .iter()
        .filter(|e| name.is_none_or(|n| e.name == n))
        .collect();
    shown.sort_by_key(|e| e.date);
    shown
}

/// Distinct `YYYY-MM` values, newest first.
pub fn available_months(entries: &[AttendanceEntry]) -> Vec<String> {
    entries
        .iter()
        .map(AttendanceEntry::month_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

/// Distinct `YYYY` values, newest first.
pub fn available_years(entries: &[AttendanceEntry]) -> Vec<String> {
    entries
        .iter()
        .map(AttendanceEntry::year_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

fn required_month(query: &ExportQuery) -> Result<&str, ExportError> {
    let month = query
        .month
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(ExportError::MonthRequired)?;
    if month.len() != 7 || NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").is_err() {
        return Err(ExportError::InvalidMonth(month.to_string()));
    }
    Ok(month)
}

fn required_year(query: &ExportQuery) -> Result<&str, ExportError> {
    let year = query
        .year
        .as_deref()
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .ok_or(ExportError::YearRequired)?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExportError::InvalidYear(year.to_string()));
    }
    Ok(year)
}

/// Picks the entries an export covers and puts them in export order:
/// name (collated) first, then date.
pub fn select_export(
    entries: &[AttendanceEntry],
    query: &ExportQuery,
    order: &impl NameOrder,
) -> Result<Vec<AttendanceEntry>, ExportError> {
    let name = query.name_filter();

    let mut selected: Vec<AttendanceEntry> = match query.scope {
        ExportScope::Current => filter_by_name(entries, name).into_iter().cloned().collect(),
        ExportScope::Monthly => {
            let month = required_month(query)?;
            filter_by_name(entries, name)
                .into_iter()
                .filter(|e| e.month_key() == month)
                .cloned()
                .collect()
        }
        ExportScope::Yearly => {
            let year = required_year(query)?;
            filter_by_name(entries, name)
                .into_iter()
                .filter(|e| e.year_key() == year)
                .cloned()
                .collect()
        }
    };

    if selected.is_empty() {
        return Err(ExportError::Empty);
    }

    selected.sort_by(|a, b| order.compare(&a.name, &b.name).then_with(|| a.date.cmp(&b.date)));
    Ok(selected)
}

/// Whether an export for `query` would produce anything.
pub fn export_enabled(
    entries: &[AttendanceEntry],
    query: &ExportQuery,
    order: &impl NameOrder,
) -> bool {
    select_export(entries, query, order).is_ok()
}

pub fn export_filename(query: &ExportQuery, today: NaiveDate) -> String {
    let mut filename = EXPORT_FILE_STEM.to_string();
    match query.scope {
        ExportScope::Monthly => {
            filename.push_str("_月別_");
            filename.push_str(query.month.as_deref().unwrap_or_default().trim());
        }
        ExportScope::Yearly => {
            filename.push_str("_年別_");
            filename.push_str(query.year.as_deref().unwrap_or_default().trim());
        }
        ExportScope::Current => {
            filename.push('_');
            filename.push_str(&today.format("%Y%m%d").to_string());
        }
    }
    if let Some(name) = query.name_filter() {
        filename.push('_');
        filename.push_str(&name.split_whitespace().collect::<Vec<_>>().join("_"));
    }
    filename.push_str(".xlsx");
    filename
}

/// One spreadsheet row, keyed by the column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportRow {
    #[serde(rename = "日付")]
    pub date: String,
    #[serde(rename = "曜日")]
    pub day_of_week: String,
    #[serde(rename = "名前")]
    pub name: String,
    #[serde(rename = "現場名")]
    pub site_name: String,
    #[serde(rename = "作業内容")]
    pub work_description: String,
    #[serde(rename = "開始時間")]
    pub start_time: String,
    #[serde(rename = "終了時間")]
    pub end_time: String,
    #[serde(rename = "総時間")]
    pub total_hours: String,
}

impl From<&AttendanceEntry> for ExportRow {
    fn from(entry: &AttendanceEntry) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            day_of_week: entry.day_of_week.clone(),
            name: entry.name.clone(),
            site_name: entry.site_name.clone(),
            work_description: entry.work_description.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            total_hours: entry.total_hours.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportSheet {
    #[schema(example = "出勤記録_月別_2024-06.xlsx")]
    pub filename: String,
    #[schema(example = "出勤記録")]
    pub sheet_name: String,
    pub rows: Vec<ExportRow>,
}

pub fn build_export(
    entries: &[AttendanceEntry],
    query: &ExportQuery,
    today: NaiveDate,
    order: &impl NameOrder,
) -> Result<ExportSheet, ExportError> {
    let selected = select_export(entries, query, order)?;
    Ok(ExportSheet {
        filename: export_filename(query, today),
        sheet_name: EXPORT_SHEET_NAME.to_string(),
        rows: selected.iter().map(ExportRow::from).collect(),
    })
}
