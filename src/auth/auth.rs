use crate::{auth::jwt::verify_token, config::Config, error::{ApiError, AuthError}};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header::HeaderMap, web::Data,
};
use futures::future::{Ready, ready};

/// The company account a request acts for.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub company_id: String,
    pub company_name: String,
}

/// Resolves the bearer token in `headers` to an account, naming the exact
/// reason on failure.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, AuthError> {
    let header_value = headers
        .get("Authorization")
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::NotBearer)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::Missing);
    }

    let claims = verify_token(token, secret)?;

    Ok(AuthUser {
        company_id: claims.sub,
        company_name: claims.company_name,
    })
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already verified by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ApiError::Internal("Config missing".into()))),
        };

        ready(authenticate(req.headers(), &config.jwt_secret).map_err(ApiError::from))
    }
}
