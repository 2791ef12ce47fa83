use super::api::{ClientError, WorklogClient};
use super::wire::{EntryForm, EntryFormPatch};
use crate::model::entry::AttendanceEntry;
use crate::worktime::collation::JapaneseCollator;
use crate::worktime::view::{self, ExportQuery};

/// Client-side copy of the account's entries.
///
/// Every mutation, successful or not, is followed by a full re-fetch; the
/// local list is never patched optimistically.
pub struct EntryLog<'a> {
    client: &'a WorklogClient,
    entries: Vec<AttendanceEntry>,
    name_filter: Option<String>,
}

impl<'a> EntryLog<'a> {
    pub fn new(client: &'a WorklogClient) -> Self {
        Self {
            client,
            entries: Vec::new(),
            name_filter: None,
        }
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.entries = self.client.list().await?;
        Ok(())
    }

    async fn reconcile<T>(&mut self, outcome: Result<T, ClientError>) -> Result<T, ClientError> {
        let refreshed = self.refresh().await;
        let value = outcome?;
        refreshed?;
        Ok(value)
    }

    pub async fn add(&mut self, form: &EntryForm) -> Result<AttendanceEntry, ClientError> {
        let outcome = self.client.add(form).await;
        self.reconcile(outcome).await
    }

    pub async fn update(
        &mut self,
        id: &str,
        patch: &EntryFormPatch,
    ) -> Result<AttendanceEntry, ClientError> {
        let outcome = self.client.update(id, patch).await;
        self.reconcile(outcome).await
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        let outcome = self.client.delete(id).await;
        self.reconcile(outcome).await
    }

    pub fn entries(&self) -> &[AttendanceEntry] {
        &self.entries
    }

    /// `None` or an empty name shows everyone.
    pub fn set_name_filter(&mut self, name: Option<String>) {
        self.name_filter = name.filter(|n| !n.is_empty());
    }

    /// Filtered entries in date order.
    pub fn visible(&self) -> Vec<&AttendanceEntry> {
        view::filter_by_name(&self.entries, self.name_filter.as_deref())
    }

    /// Distinct names of the loaded entries for the name picker.
    pub fn name_suggestions(&self) -> Vec<String> {
        view::name_suggestions(&self.entries, &JapaneseCollator::new())
    }

    /// Whether `query` would export anything from the loaded entries.
    pub fn can_export(&self, query: &ExportQuery) -> bool {
        view::export_enabled(&self.entries, query, &JapaneseCollator::new())
    }
}
