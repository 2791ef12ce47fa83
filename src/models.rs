use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin")]
    pub id: String,
    #[schema(example = "password")]
    pub pass: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Successfully deleted")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Company id of the account
    pub sub: String,
    pub company_name: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}
