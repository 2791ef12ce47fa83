//! Form-side (camelCase) shape of an entry and its mapping to the wire.

use serde::{Deserialize, Serialize};

use crate::model::entry::{AttendanceEntry, EntryInput};
use crate::worktime::duration;

/// Entry as edited in a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryForm {
    pub name: String,
    pub date: String,
    pub day_of_week: String,
    pub site_name: String,
    pub work_description: String,
    pub start_time: String,
    pub end_time: String,
    pub total_hours: String,
}

impl EntryForm {
    /// Recomputes the weekday and hours labels from date and times, the way
    /// the form shows them while typing.
    pub fn refresh_derived(&mut self) {
        self.day_of_week = duration::day_of_week_label(&self.date).to_string();
        self.total_hours = duration::work_duration(&self.start_time, &self.end_time);
    }

    pub fn has_valid_range(&self) -> bool {
        duration::is_valid_range(&self.start_time, &self.end_time)
    }
}

impl From<EntryForm> for EntryInput {
    fn from(form: EntryForm) -> Self {
        Self {
            name: form.name,
            date: form.date,
            day_of_week: form.day_of_week,
            site_name: form.site_name,
            work_description: form.work_description,
            start_time: form.start_time,
            end_time: form.end_time,
            total_hours: form.total_hours,
        }
    }
}

impl From<EntryInput> for EntryForm {
    fn from(input: EntryInput) -> Self {
        Self {
            name: input.name,
            date: input.date,
            day_of_week: input.day_of_week,
            site_name: input.site_name,
            work_description: input.work_description,
            start_time: input.start_time,
            end_time: input.end_time,
            total_hours: input.total_hours,
        }
    }
}

impl From<&AttendanceEntry> for EntryForm {
    fn from(entry: &AttendanceEntry) -> Self {
        EntryInput::from(entry).into()
    }
}

/// Fields the user actually changed; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryFormPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<String>,
}

/// Snake-case body of `PUT /entries/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<String>,
}

impl EntryFormPatch {
    /// Only the fields that differ between `before` and `after`.
    pub fn changes(before: &EntryForm, after: &EntryForm) -> Self {
        fn changed(old: &str, new: &str) -> Option<String> {
            (old != new).then(|| new.to_string())
        }

        Self {
            name: changed(&before.name, &after.name),
            date: changed(&before.date, &after.date),
            day_of_week: changed(&before.day_of_week, &after.day_of_week),
            site_name: changed(&before.site_name, &after.site_name),
            work_description: changed(&before.work_description, &after.work_description),
            start_time: changed(&before.start_time, &after.start_time),
            end_time: changed(&before.end_time, &after.end_time),
            total_hours: changed(&before.total_hours, &after.total_hours),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<EntryFormPatch> for PatchBody {
    fn from(patch: EntryFormPatch) -> Self {
        Self {
            name: patch.name,
            date: patch.date,
            day_of_week: patch.day_of_week,
            site_name: patch.site_name,
            work_description: patch.work_description,
            start_time: patch.start_time,
            end_time: patch.end_time,
            total_hours: patch.total_hours,
        }
    }
}
