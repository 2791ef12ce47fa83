use crate::{
    auth::{auth::AuthUser, jwt::generate_access_token, password::verify_password},
    config::Config,
    error::{ApiError, ErrorBody},
    model::account::AccountResponse,
    models::{LoginReqDto, LoginResponse, MessageResponse},
    store::AccountStore,
};
use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument};

/// Log in with a company login ID and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Bearer token for the account", body = LoginResponse),
        (status = 400, description = "ID or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody, example = json!({
            "error": "Invalid login ID or password",
            "code": "invalid_credentials"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(accounts, config, user),
    fields(login_id = %user.id)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    accounts: web::Data<dyn AccountStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if user.id.trim().is_empty() || user.pass.is_empty() {
        info!("Validation failed: empty login ID or password");
        return Err(ApiError::Validation(
            "Login ID and password are required".to_string(),
        ));
    }

    debug!("Fetching account");

    let account = match accounts.find_by_login_id(user.id.trim()).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            info!("Invalid credentials: account not found");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching account");
            return Err(e.into());
        }
    };

    if let Err(e) = verify_password(&user.pass, &account.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    debug!(company_id = %account.company_id, "Generating access token");

    let token = generate_access_token(
        &account.company_id,
        &account.company_name,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign token");
        ApiError::Internal(e.to_string())
    })?;

    info!(company_id = %account.company_id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Log out
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "Auth"
)]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

/// Current account (session check)
#[utoipa::path(
    get,
    path = "/auth/account",
    responses(
        (status = 200, description = "Account behind the token", body = AccountResponse),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn account(
    auth: AuthUser,
    accounts: web::Data<dyn AccountStore>,
) -> Result<HttpResponse, ApiError> {
    let account = accounts
        .find_by_company_id(&auth.company_id)
        .await
        .map_err(|e| {
            error!(error = %e, company_id = %auth.company_id, "Failed to fetch account");
            ApiError::from(e)
        })?
        .ok_or(ApiError::NotFound("Account"))?;

    Ok(HttpResponse::Ok().json(AccountResponse::from(account)))
}
