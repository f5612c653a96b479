//! # Session
//!
//! The caller's bearer token, extracted per request and handed to whatever
//! needs to talk to the backend on their behalf.
//!
//! Tokens are JWTs issued by the backend. We never verify the signature,
//! that is the backend's job. We only refuse to forward tokens that are
//! unreadable or already past their `exp` claim.
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        if is_expired(token, Utc::now().timestamp()) {
            return Err(AppError::Unauthorized);
        }

        Ok(Session::new(token))
    }
}

/// Unreadable tokens count as expired. Tokens without a numeric `exp`
/// (a number or a numeric string) never expire.
pub fn is_expired(token: &str, now_secs: i64) -> bool {
    let Some(claims) = claims(token) else {
        return true;
    };

    match claims.get("exp") {
        None | Some(Value::Null) => false,
        Some(exp) => match exp
            .as_f64()
            .or_else(|| exp.as_str()?.trim().parse::<f64>().ok())
        {
            Some(exp) if exp.is_finite() => now_secs as f64 >= exp,
            _ => false,
        },
    }
}

fn claims(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;

    serde_json::from_slice::<Value>(&bytes)
        .ok()
        .filter(Value::is_object)
}
