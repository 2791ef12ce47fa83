use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::{ApiError, ErrorBody},
    model::entry::{AttendanceEntry, EntryInput, EntryPatch},
    models::MessageResponse,
    store::{EntryStore, StoreError, UpdateOutcome},
    utils::name_cache::NameCache,
    worktime::{
        collation::JapaneseCollator,
        view::{self, ExportQuery, ExportSheet},
    },
};

const ENTRY: &str = "Attendance entry";

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PeriodsResponse {
    #[schema(example = json!(["2024-06", "2024-05"]))]
    pub months: Vec<String>,
    #[schema(example = json!(["2024", "2023"]))]
    pub years: Vec<String>,
}

fn store_failure<'a>(
    action: &'a str,
    company_id: &'a str,
) -> impl FnOnce(StoreError) -> ApiError + 'a {
    move |e| {
        error!(error = %e, company_id, "{} failed", action);
        ApiError::from(e)
    }
}

/// List entries
#[utoipa::path(
    get,
    path = "/entries",
    responses(
        (status = 200, description = "Entries ordered by date then start time", body = [AttendanceEntry]),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn list_entries(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
) -> Result<HttpResponse, ApiError> {
    let entries = store
        .list(&auth.company_id)
        .await
        .map_err(store_failure("List entries", &auth.company_id))?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Create entry
#[utoipa::path(
    post,
    path = "/entries",
    request_body = EntryInput,
    responses(
        (status = 201, description = "Entry created", body = AttendanceEntry),
        (status = 400, description = "Missing fields or invalid time range", body = ErrorBody, example = json!({
            "error": "missing required fields: name, site_name",
            "code": "validation"
        })),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn create_entry(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
    names: web::Data<NameCache>,
    payload: web::Json<EntryInput>,
) -> Result<HttpResponse, ApiError> {
    let new_entry = payload.validate()?;

    let entry = store
        .insert(&auth.company_id, new_entry)
        .await
        .map_err(store_failure("Create entry", &auth.company_id))?;
    names.invalidate(&auth.company_id).await;

    info!(entry_id = %entry.id, company_id = %auth.company_id, "Entry created");
    Ok(HttpResponse::Created().json(entry))
}

/// Update entry
///
/// Only the supplied fields change. `day_of_week` and `total_hours` are
/// not recomputed when `date` or the times change, but the resulting time
/// range must still be valid. A missing entry is reported before any
/// payload error.
#[utoipa::path(
    put,
    path = "/entries/{id}",
    params(
        ("id", Path, description = "Entry ID")
    ),
    request_body(content = Object, description = "Subset of name, date, day_of_week, site_name, work_description, start_time, end_time, total_hours"),
    responses(
        (status = 200, description = "Entry updated", body = AttendanceEntry),
        (status = 400, description = "Unknown field, blank text, end not after start, or nothing to update", body = ErrorBody),
        (status = 404, description = "Entry not found", body = ErrorBody, example = json!({
            "error": "Attendance entry not found",
            "code": "not_found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn update_entry(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
    names: web::Data<NameCache>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let entry_id = path.into_inner();
    let patch = match EntryPatch::from_json(&body) {
        Ok(patch) => patch,
        Err(e) => {
            // a missing entry outranks a bad payload
            let owned = store
                .find(&auth.company_id, &entry_id)
                .await
                .map_err(store_failure("Update entry", &auth.company_id))?;
            return Err(match owned {
                Some(_) => e.into(),
                None => ApiError::NotFound(ENTRY),
            });
        }
    };

    let outcome = store
        .update(&auth.company_id, &entry_id, &patch)
        .await
        .map_err(store_failure("Update entry", &auth.company_id))?;

    match outcome {
        UpdateOutcome::Updated(entry) => {
            if patch.touches_name() {
                names.invalidate(&auth.company_id).await;
            }
            info!(entry_id = %entry.id, fields = patch.len(), "Entry updated");
            Ok(HttpResponse::Ok().json(entry))
        }
        UpdateOutcome::NotFound => Err(ApiError::NotFound(ENTRY)),
        UpdateOutcome::Empty => Err(ApiError::EmptyUpdate),
        UpdateOutcome::Rejected(e) => Err(e.into()),
    }
}

/// Delete entry
#[utoipa::path(
    delete,
    path = "/entries/{id}",
    params(
        ("id", Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 404, description = "Entry not found", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn delete_entry(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
    names: web::Data<NameCache>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let entry_id = path.into_inner();

    let removed = store
        .delete(&auth.company_id, &entry_id)
        .await
        .map_err(store_failure("Delete entry", &auth.company_id))?;

    if !removed {
        return Err(ApiError::NotFound(ENTRY));
    }
    names.invalidate(&auth.company_id).await;

    info!(entry_id = %entry_id, company_id = %auth.company_id, "Entry deleted");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Successfully deleted".to_string(),
    }))
}

/// Distinct worker names
#[utoipa::path(
    get,
    path = "/entries/names",
    responses(
        (status = 200, description = "Distinct names in Japanese collation order", body = [String], example = json!(["アオキ", "サトウ"])),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn list_names(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
    names: web::Data<NameCache>,
) -> Result<HttpResponse, ApiError> {
    if let Some(cached) = names.get(&auth.company_id).await {
        return Ok(HttpResponse::Ok().json(cached.as_ref()));
    }

    let generation = names.generation();
    let distinct = store
        .distinct_names(&auth.company_id)
        .await
        .map_err(store_failure("List names", &auth.company_id))?;
    let sorted = view::sorted_distinct_names(distinct, &JapaneseCollator::new());
    let sorted = names.put(&auth.company_id, sorted, generation).await;

    Ok(HttpResponse::Ok().json(sorted.as_ref()))
}

/// Months and years with entries
#[utoipa::path(
    get,
    path = "/entries/periods",
    responses(
        (status = 200, description = "Distinct months and years, newest first", body = PeriodsResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn entry_periods(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
) -> Result<HttpResponse, ApiError> {
    let entries = store
        .list(&auth.company_id)
        .await
        .map_err(store_failure("List periods", &auth.company_id))?;

    Ok(HttpResponse::Ok().json(PeriodsResponse {
        months: view::available_months(&entries),
        years: view::available_years(&entries),
    }))
}

/// Export set
///
/// Rows are ordered by name, then date, regardless of the list order.
#[utoipa::path(
    get,
    path = "/entries/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Spreadsheet rows and file name", body = ExportSheet),
        (status = 400, description = "No period selected or nothing to export", body = ErrorBody, example = json!({
            "error": "no entries to export",
            "code": "validation"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Entries"
)]
pub async fn export_entries(
    auth: AuthUser,
    store: web::Data<dyn EntryStore>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    let entries = store
        .list(&auth.company_id)
        .await
        .map_err(store_failure("Export entries", &auth.company_id))?;

    let today = Local::now().date_naive();
    let sheet = view::build_export(&entries, &query, today, &JapaneseCollator::new())?;

    info!(
        company_id = %auth.company_id,
        scope = %query.scope,
        rows = sheet.rows.len(),
        "Export prepared"
    );
    Ok(HttpResponse::Ok().json(sheet))
}
