use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, EnumString, IntoStaticStr};
use thiserror::Error;
use utoipa::ToSchema;

use crate::worktime::duration::{self, TimeOfDay, TimeParseError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "6f1c0f0e-6a43-4a53-9d43-2b5c0bb1f6c1",
        "company_id": "demo-company",
        "name": "サトウ",
        "date": "2024-06-05",
        "day_of_week": "水",
        "site_name": "品川現場",
        "work_description": "内装工事",
        "start_time": "09:00",
        "end_time": "18:00",
        "total_hours": "7時間00分"
    })
)]
pub struct AttendanceEntry {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub day_of_week: String,
    pub site_name: String,
    pub work_description: String,
    pub start_time: String,
    pub end_time: String,
    pub total_hours: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<NaiveDateTime>,
}

impl AttendanceEntry {
    /// `YYYY-MM` key used by monthly exports.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// `YYYY` key used by yearly exports.
    pub fn year_key(&self) -> String {
        self.date.format("%Y").to_string()
    }

    /// The entry with `patch` applied, provided the resulting time range is
    /// still valid. Derived labels are not recomputed.
    pub fn patched(&self, patch: &EntryPatch) -> Result<AttendanceEntry, ValidationError> {
        let mut next = self.clone();
        next.apply(patch);
        if !duration::is_valid_range(&next.start_time, &next.end_time) {
            return Err(ValidationError::InvalidTimeRange);
        }
        Ok(next)
    }

    /// Overwrites the patched columns. Derived labels are left alone.
    pub fn apply(&mut self, patch: &EntryPatch) {
        for (field, value) in patch.iter() {
            match (field, value) {
                (EntryField::Date, FieldValue::Date(d)) => self.date = *d,
                (EntryField::Name, FieldValue::Text(v)) => self.name = v.clone(),
                (EntryField::DayOfWeek, FieldValue::Text(v)) => self.day_of_week = v.clone(),
                (EntryField::SiteName, FieldValue::Text(v)) => self.site_name = v.clone(),
                (EntryField::WorkDescription, FieldValue::Text(v)) => {
                    self.work_description = v.clone()
                }
                (EntryField::StartTime, FieldValue::Text(v)) => self.start_time = v.clone(),
                (EntryField::EndTime, FieldValue::Text(v)) => self.end_time = v.clone(),
                (EntryField::TotalHours, FieldValue::Text(v)) => self.total_hours = v.clone(),
                _ => {}
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid {field}: {source}")]
    InvalidTime {
        field: &'static str,
        source: TimeParseError,
    },
    #[error("end time must be later than start time")]
    InvalidTimeRange,
    #[error("field {0:?} cannot be updated")]
    UnknownField(String),
    #[error("field {0:?} must be a string")]
    NotAString(String),
    #[error("payload must be a JSON object")]
    NotAnObject,
}

/// Creation payload as it travels on the wire.
///
/// `day_of_week` and `total_hours` are accepted for compatibility with
/// clients that compute them, but the server always derives its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EntryInput {
    #[schema(example = "サトウ")]
    pub name: String,
    #[schema(example = "2024-06-05", format = "date")]
    pub date: String,
    #[schema(example = "水")]
    pub day_of_week: String,
    #[schema(example = "品川現場")]
    pub site_name: String,
    #[schema(example = "内装工事")]
    pub work_description: String,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "18:00")]
    pub end_time: String,
    #[schema(example = "7時間00分")]
    pub total_hours: String,
}

/// A validated entry ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub date: NaiveDate,
    pub day_of_week: String,
    pub site_name: String,
    pub work_description: String,
    pub start_time: String,
    pub end_time: String,
    pub total_hours: String,
}

impl NewEntry {
    pub fn into_entry(self, id: String, company_id: &str, now: NaiveDateTime) -> AttendanceEntry {
        AttendanceEntry {
            id,
            company_id: company_id.to_string(),
            name: self.name,
            date: self.date,
            day_of_week: self.day_of_week,
            site_name: self.site_name,
            work_description: self.work_description,
            start_time: self.start_time,
            end_time: self.end_time,
            total_hours: self.total_hours,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

impl EntryInput {
    /// Trims free text, checks required fields and the time range, and
    /// derives the weekday and duration labels.
    pub fn validate(&self) -> Result<NewEntry, ValidationError> {
        let name = self.name.trim();
        let date = self.date.trim();
        let site_name = self.site_name.trim();
        let work_description = self.work_description.trim();
        let start_time = self.start_time.trim();
        let end_time = self.end_time.trim();

        let missing: Vec<&'static str> = [
            ("name", name),
            ("date", date),
            ("site_name", site_name),
            ("work_description", work_description),
            ("start_time", start_time),
            ("end_time", end_time),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        let start = parse_time("start_time", start_time)?;
        let end = parse_time("end_time", end_time)?;

        if !duration::is_valid_range(start_time, end_time) {
            return Err(ValidationError::InvalidTimeRange);
        }

        let start_time = start.to_string();
        let end_time = end.to_string();
        let total_hours = duration::work_duration(&start_time, &end_time);

        Ok(NewEntry {
            name: name.to_string(),
            date,
            day_of_week: duration::day_of_week(date).to_string(),
            site_name: site_name.to_string(),
            work_description: work_description.to_string(),
            start_time,
            end_time,
            total_hours,
        })
    }
}

impl From<&AttendanceEntry> for EntryInput {
    fn from(entry: &AttendanceEntry) -> Self {
        Self {
            name: entry.name.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            day_of_week: entry.day_of_week.clone(),
            site_name: entry.site_name.clone(),
            work_description: entry.work_description.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            total_hours: entry.total_hours.clone(),
        }
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<TimeOfDay, ValidationError> {
    value
        .parse()
        .map_err(|source| ValidationError::InvalidTime { field, source })
}

/// Columns a partial update may touch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum EntryField {
    Name,
    Date,
    DayOfWeek,
    SiteName,
    WorkDescription,
    StartTime,
    EndTime,
    TotalHours,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

/// Field name to new value, restricted to [`EntryField`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    fields: BTreeMap<EntryField, FieldValue>,
}

impl EntryPatch {
    /// Builds a patch from a JSON object. `null` members count as not supplied.
    pub fn from_json(payload: &Value) -> Result<Self, ValidationError> {
        let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;

        let mut fields = BTreeMap::new();
        for (key, value) in obj {
            if value.is_null() {
                continue;
            }
            let field: EntryField = key
                .parse()
                .map_err(|_| ValidationError::UnknownField(key.clone()))?;
            let text = value
                .as_str()
                .ok_or_else(|| ValidationError::NotAString(key.clone()))?;

            let value = match field {
                EntryField::Date => FieldValue::Date(
                    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                        .map_err(|_| ValidationError::InvalidDate(text.to_string()))?,
                ),
                EntryField::StartTime => {
                    FieldValue::Text(parse_time("start_time", text)?.to_string())
                }
                EntryField::EndTime => FieldValue::Text(parse_time("end_time", text)?.to_string()),
                EntryField::Name | EntryField::SiteName | EntryField::WorkDescription => {
                    let text = text.trim();
                    if text.is_empty() {
                        return Err(ValidationError::MissingFields(vec![field.into()]));
                    }
                    FieldValue::Text(text.to_string())
                }
                _ => FieldValue::Text(text.to_string()),
            };
            fields.insert(field, value);
        }

        Ok(Self { fields })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryField, &FieldValue)> {
        self.fields.iter()
    }

    /// Touches a field whose name is used in the suggestion list.
    pub fn touches_name(&self) -> bool {
        self.fields.contains_key(&EntryField::Name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> EntryInput {
        EntryInput {
            name: "  サトウ ".into(),
            date: "2024-06-05".into(),
            day_of_week: String::new(),
            site_name: " 品川現場".into(),
            work_description: "内装工事 ".into(),
            start_time: "9:00".into(),
            end_time: "18:00".into(),
            total_hours: String::new(),
        }
    }

    #[test]
    fn validate_trims_and_derives_labels() {
        let entry = input().validate().unwrap();
        assert_eq!(entry.name, "サトウ");
        assert_eq!(entry.site_name, "品川現場");
        assert_eq!(entry.work_description, "内装工事");
        assert_eq!(entry.day_of_week, "水");
        assert_eq!(entry.start_time, "09:00");
        assert_eq!(entry.total_hours, "7時間00分");
    }

    #[test]
    fn validate_ignores_client_supplied_labels() {
        let mut raw = input();
        raw.day_of_week = "月".into();
        raw.total_hours = "99時間00分".into();
        let entry = raw.validate().unwrap();
        assert_eq!(entry.day_of_week, "水");
        assert_eq!(entry.total_hours, "7時間00分");
    }

    #[test]
    fn validate_lists_every_missing_field() {
        let mut raw = input();
        raw.name = "   ".into();
        raw.work_description = String::new();
        assert_eq!(
            raw.validate(),
            Err(ValidationError::MissingFields(vec!["name", "work_description"]))
        );
    }

    #[test]
    fn validate_rejects_backwards_or_equal_range() {
        let mut raw = input();
        raw.end_time = "09:00".into();
        assert_eq!(raw.validate(), Err(ValidationError::InvalidTimeRange));
        raw.end_time = "08:00".into();
        assert_eq!(raw.validate(), Err(ValidationError::InvalidTimeRange));
    }

    #[test]
    fn validate_rejects_bad_date() {
        let mut raw = input();
        raw.date = "2024-13-01".into();
        assert!(matches!(raw.validate(), Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn patch_accepts_allow_listed_fields() {
        let patch = EntryPatch::from_json(&json!({
            "site_name": "渋谷現場",
            "date": "2024-07-01",
            "start_time": "8:30",
            "total_hours": null
        }))
        .unwrap();

        assert_eq!(patch.len(), 3);
        let fields: Vec<_> = patch.iter().collect();
        assert_eq!(
            fields[0],
            (
                &EntryField::Date,
                &FieldValue::Date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
            )
        );
        assert_eq!(
            fields[1],
            (&EntryField::SiteName, &FieldValue::Text("渋谷現場".into()))
        );
        assert_eq!(
            fields[2],
            (&EntryField::StartTime, &FieldValue::Text("08:30".into()))
        );
    }

    #[test]
    fn patch_rejects_columns_outside_allow_list() {
        let err = EntryPatch::from_json(&json!({"company_id": "other"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownField("company_id".into()));

        let err = EntryPatch::from_json(&json!({"name; DROP TABLE x": "a"})).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField(_)));
    }

    #[test]
    fn patch_rejects_non_objects_and_non_strings() {
        assert_eq!(
            EntryPatch::from_json(&json!(["name"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            EntryPatch::from_json(&json!({"name": 3})),
            Err(ValidationError::NotAString("name".into()))
        );
    }

    #[test]
    fn empty_object_is_an_empty_patch() {
        assert!(EntryPatch::from_json(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn apply_does_not_rederive_labels() {
        let now = chrono::Utc::now().naive_utc();
        let mut entry = input()
            .validate()
            .unwrap()
            .into_entry("e1".into(), "demo-company", now);
        let patch = EntryPatch::from_json(&json!({"end_time": "20:00"})).unwrap();
        entry.apply(&patch);
        assert_eq!(entry.end_time, "20:00");
        assert_eq!(entry.total_hours, "7時間00分");
    }

    #[test]
    fn patch_trims_free_text_and_rejects_blanks() {
        let patch = EntryPatch::from_json(&json!({"name": " スズキ "})).unwrap();
        let fields: Vec<_> = patch.iter().collect();
        assert_eq!(fields[0], (&EntryField::Name, &FieldValue::Text("スズキ".into())));

        for key in ["name", "site_name", "work_description"] {
            let mut body = serde_json::Map::new();
            body.insert(key.to_string(), json!("   "));
            let err = EntryPatch::from_json(&Value::Object(body)).unwrap_err();
            assert_eq!(err, ValidationError::MissingFields(vec![key]));
        }
    }

    #[test]
    fn patched_keeps_the_range_valid() {
        let now = chrono::Utc::now().naive_utc();
        let entry = input()
            .validate()
            .unwrap()
            .into_entry("e1".into(), "demo-company", now);

        // only one side moves, the other comes from the stored row
        let patch = EntryPatch::from_json(&json!({"start_time": "19:00"})).unwrap();
        assert_eq!(entry.patched(&patch), Err(ValidationError::InvalidTimeRange));

        let patch = EntryPatch::from_json(&json!({"end_time": "17:00"})).unwrap();
        let next = entry.patched(&patch).unwrap();
        assert_eq!(next.end_time, "17:00");
        assert_eq!(next.total_hours, "7時間00分");
    }
}
