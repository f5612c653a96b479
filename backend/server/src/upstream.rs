//! # Upstream
//!
//! HTTP client for the system-of-record backend.
//!
//! The backend owns every loan, signature and user. We fetch point-in-time
//! snapshots from it and forward writes to it, nothing is stored here.
//!
//! ## Errors
//! - connection failures and undecodable bodies: `502`
//! - `401` from the backend: passed through as `Unauthorized`
//! - any other non-2xx: relayed with the backend's `error` message
use std::time::Duration;

use axum::http::StatusCode;
use query::{History, Loan, lenient::snapshot};
use reqwest::{Client, Method, RequestBuilder, Response, header::AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{error::AppError, session::Session};

#[derive(Clone)]
pub struct Upstream {
    client: Client,
    base_url: String,
}

impl Upstream {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));

        match session {
            Some(session) => builder.header(AUTHORIZATION, session.bearer()),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, AppError> {
        let response = check(builder.send().await?).await?;
        let bytes = response.bytes().await?;

        #[cfg(feature = "verbose")]
        tracing::info!("Upstream body: {}", String::from_utf8_lossy(&bytes));

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get(&self, path: &str, session: Option<&Session>) -> Result<Value, AppError> {
        debug!("GET {path}");

        self.execute(self.request(Method::GET, path, session)).await
    }

    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
        body: Option<&B>,
    ) -> Result<Value, AppError> {
        debug!("{method} {path}");

        let builder = self.request(method, path, session);
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };

        self.execute(builder).await
    }

    pub async fn loans(&self, session: &Session) -> Result<Vec<Loan>, AppError> {
        let loans = snapshot(self.get("/cautelas", Some(session)).await?);
        debug!("Fetched {} loans", loans.len());

        Ok(loans)
    }

    pub async fn history(&self, id: &str, session: &Session) -> Result<History, AppError> {
        let value = self
            .get(&format!("/cautelas/{id}/historico"), Some(session))
            .await?;

        Ok(serde_json::from_value(value)?)
    }
}

async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();

    Err(AppError::Upstream {
        status,
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Upstream error")
                .to_string()
        }),
    })
}

/// The backend reports failures as `{"error": "..."}`.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::error_message;

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"error": "Cautela não encontrada"}"#).as_deref(),
            Some("Cautela não encontrada")
        );
        assert_eq!(error_message(r#"{"message": "x"}"#), None);
        assert_eq!(error_message("<html>"), None);
    }
}
