use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    config::Config,
    error::{ApiError, ErrorBody},
    worktime::duration::{self, TimeOption},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptionsQuery {
    /// Step in minutes; must divide 60. Defaults to the configured interval.
    #[param(example = 15)]
    pub interval: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DurationQuery {
    #[serde(default)]
    #[param(example = "09:00")]
    pub start_time: String,
    #[serde(default)]
    #[param(example = "18:00")]
    pub end_time: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DurationPreview {
    #[schema(example = true)]
    pub valid: bool,
    #[schema(example = "7時間00分")]
    pub total_hours: String,
}

/// Selectable start/end times
#[utoipa::path(
    get,
    path = "/worktime/options",
    params(OptionsQuery),
    responses(
        (status = 200, description = "Times from 00:00 to 23:xx", body = [TimeOption]),
        (status = 400, description = "Interval does not divide 60", body = ErrorBody)
    ),
    tag = "Worktime"
)]
pub async fn time_options(
    config: web::Data<Config>,
    query: web::Query<OptionsQuery>,
) -> Result<HttpResponse, ApiError> {
    let interval = query.interval.unwrap_or(config.time_option_interval);
    let options = duration::time_options(interval)?;
    Ok(HttpResponse::Ok().json(options))
}

/// Net duration preview
#[utoipa::path(
    get,
    path = "/worktime/duration",
    params(DurationQuery),
    responses(
        (status = 200, description = "Net worked time after the 2h break", body = DurationPreview)
    ),
    tag = "Worktime"
)]
pub async fn duration_preview(query: web::Query<DurationQuery>) -> HttpResponse {
    let valid = duration::is_valid_range(&query.start_time, &query.end_time);
    HttpResponse::Ok().json(DurationPreview {
        valid,
        total_hours: duration::work_duration(&query.start_time, &query.end_time),
    })
}
