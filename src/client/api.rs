//! HTTP client for the worklog REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::session::SessionContext;
use super::wire::{EntryForm, EntryFormPatch, PatchBody};
use crate::api::entries::PeriodsResponse;
use crate::error::ErrorBody;
use crate::model::account::AccountResponse;
use crate::model::entry::{AttendanceEntry, EntryInput};
use crate::models::{LoginReqDto, LoginResponse, MessageResponse};
use crate::worktime::view::{ExportQuery, ExportSheet};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in")]
    NotLoggedIn,
    /// The token was rejected; the session has been cleared.
    #[error("unauthorized ({code}): {message}")]
    Unauthorized { code: String, message: String },
    #[error("request failed with {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Status the server answered with, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { code, .. } | ClientError::Api { code, .. } => {
                Some(code.as_str())
            }
            _ => None,
        }
    }
}

pub struct WorklogClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl WorklogClient {
    pub fn new(base_url: &str, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(builder.bearer_auth(token))
    }

    async fn read<T: DeserializeOwned>(&self, resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
            error: status.canonical_reason().unwrap_or("error").to_string(),
            code: "unknown".to_string(),
        });
        debug!(status = status.as_u16(), code = %body.code, "Request rejected");

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            return Err(ClientError::Unauthorized {
                code: body.code,
                message: body.error,
            });
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.error,
        })
    }

    /// Stores the issued token in the session.
    pub async fn login(&self, id: &str, pass: &str) -> Result<(), ClientError> {
        let body = LoginReqDto {
            id: id.to_string(),
            pass: pass.to_string(),
        };
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        let LoginResponse { token } = self.read(resp).await?;
        self.session.set(token);
        Ok(())
    }

    /// Clears the session even if the server cannot be reached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.client.post(self.url("/auth/logout")).send().await;
        self.session.clear();
        let _: MessageResponse = self.read(result?).await?;
        Ok(())
    }

    /// Session check.
    pub async fn check_auth(&self) -> Result<AccountResponse, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("/auth/account")))?
            .send()
            .await?;
        self.read(resp).await
    }

    pub async fn list(&self) -> Result<Vec<AttendanceEntry>, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("/entries")))?
            .send()
            .await?;
        self.read(resp).await
    }

    pub async fn add(&self, form: &EntryForm) -> Result<AttendanceEntry, ClientError> {
        let body = EntryInput::from(form.clone());
        let resp = self
            .authorized(self.client.post(self.url("/entries")))?
            .json(&body)
            .send()
            .await?;
        self.read(resp).await
    }

    /// Sends only the fields present in `patch`.
    pub async fn update(
        &self,
        id: &str,
        patch: &EntryFormPatch,
    ) -> Result<AttendanceEntry, ClientError> {
        let body = PatchBody::from(patch.clone());
        let resp = self
            .authorized(self.client.put(self.url(&format!("/entries/{id}"))))?
            .json(&body)
            .send()
            .await?;
        self.read(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .authorized(self.client.delete(self.url(&format!("/entries/{id}"))))?
            .send()
            .await?;
        let _: MessageResponse = self.read(resp).await?;
        Ok(())
    }

    pub async fn names(&self) -> Result<Vec<String>, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("/entries/names")))?
            .send()
            .await?;
        self.read(resp).await
    }

    pub async fn periods(&self) -> Result<PeriodsResponse, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("/entries/periods")))?
            .send()
            .await?;
        self.read(resp).await
    }

    pub async fn export(&self, query: &ExportQuery) -> Result<ExportSheet, ClientError> {
        let resp = self
            .authorized(self.client.get(self.url("/entries/export")))?
            .query(query)
            .send()
            .await?;
        self.read(resp).await
    }
}
