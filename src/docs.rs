use crate::api::entries::PeriodsResponse;
use crate::api::health::HealthResponse;
use crate::api::worktime::DurationPreview;
use crate::error::ErrorBody;
use crate::model::account::AccountResponse;
use crate::model::entry::{AttendanceEntry, EntryInput};
use crate::models::{LoginReqDto, LoginResponse, MessageResponse};
use crate::worktime::duration::TimeOption;
use crate::worktime::view::{ExportRow, ExportScope, ExportSheet};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkLog API",
        version = "1.0.0",
        description = r#"
## WorkLog attendance records

Company accounts record daily attendance entries (worker, site, task, time
range) and export them as spreadsheets.

### 🔹 Key Features
- **Entries**
  - Create, update, list and delete entries; net hours are derived with a fixed 2h break
- **Views**
  - Distinct worker names, available months/years, export sets by current filter, month or year
- **Form helpers**
  - Selectable time options and duration preview

### 🔐 Security
`/entries` and `/auth/account` require a **JWT Bearer** token from `/auth/login`.
401 responses carry a `code` of `token_missing`, `token_not_bearer`,
`token_expired` or `token_invalid`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::account,

        crate::api::entries::list_entries,
        crate::api::entries::create_entry,
        crate::api::entries::update_entry,
        crate::api::entries::delete_entry,
        crate::api::entries::list_names,
        crate::api::entries::entry_periods,
        crate::api::entries::export_entries,

        crate::api::worktime::time_options,
        crate::api::worktime::duration_preview,

        crate::api::health::health
    ),
    components(
        schemas(
            AttendanceEntry,
            EntryInput,
            ErrorBody,
            MessageResponse,
            LoginReqDto,
            LoginResponse,
            AccountResponse,
            PeriodsResponse,
            ExportScope,
            ExportRow,
            ExportSheet,
            TimeOption,
            DurationPreview,
            HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and session check"),
        (name = "Entries", description = "Attendance entry APIs"),
        (name = "Worktime", description = "Time options and duration rules"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/auth/account",
            "/entries",
            "/entries/{id}",
            "/entries/names",
            "/entries/export",
            "/worktime/options",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
