use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::{
    error::AppError,
    payloads::{NewLoanRequest, PasswordChange, SignatureRequest, UserRequest, decode, path_id},
    search::{HistoryView, LoanList, SearchParams},
    session::Session,
    state::AppState,
};

type Shared = State<Arc<AppState>>;

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn login_handler(State(state): Shared, body: Bytes) -> Result<Json<Value>, AppError> {
    let credentials: Value = decode(&body)?;

    let response = state
        .upstream
        .send(Method::POST, "/auth/login", None, Some(&credentials))
        .await?;

    Ok(Json(response))
}

pub async fn logout_handler(State(state): Shared, session: Session) -> Result<Json<Value>, AppError> {
    let response = state
        .upstream
        .send::<Value>(Method::POST, "/auth/logout", Some(&session), None)
        .await?;

    Ok(Json(response))
}

pub async fn list_loans_handler(
    State(state): Shared,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let loans = state.upstream.loans(&session).await?;
    let list = LoanList::build(&loans, &params)?;

    info!("Listing {} of {} loans", list.exibidas, list.total);

    Ok(Json(list).into_response())
}

pub async fn create_loan_handler(
    State(state): Shared,
    session: Session,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let loan = decode::<NewLoanRequest>(&body)?.validate()?;

    info!("Creating loan for {}", loan.material);

    let response = state
        .upstream
        .send(Method::POST, "/cautelas", Some(&session), Some(&loan))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_loan_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id)?;

    Ok(Json(state.upstream.get(&format!("/cautelas/{id}"), None).await?))
}

pub async fn check_in_handler(
    State(state): Shared,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id)?;

    info!("Requesting check-in link for loan {id}");

    let response = state
        .upstream
        .send::<Value>(
            Method::POST,
            &format!("/cautelas/{id}/descautelar"),
            Some(&session),
            None,
        )
        .await?;

    Ok(Json(response))
}

pub async fn history_handler(
    State(state): Shared,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let id = path_id(&id)?;
    let history = state.upstream.history(id, &session).await?;
    let view = HistoryView::build(&history, &params)?;

    Ok(Json(view).into_response())
}

pub async fn sign_handler(
    State(state): Shared,
    Path(uuid): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let uuid = path_id(&uuid)?;
    let signature = decode::<SignatureRequest>(&body)?.validate()?;

    info!("Forwarding signature for {uuid}");

    let response = state
        .upstream
        .send(
            Method::POST,
            &format!("/assinaturas/{uuid}"),
            None,
            Some(&signature),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_users_handler(
    State(state): Shared,
    session: Session,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.upstream.get("/users", Some(&session)).await?))
}

pub async fn create_user_handler(
    State(state): Shared,
    session: Session,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = decode::<UserRequest>(&body)?.validate_new()?;

    info!("Creating user {}", user.username);

    let response = state
        .upstream
        .send(Method::POST, "/users", Some(&session), Some(&user))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_user_handler(
    State(state): Shared,
    session: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id)?;
    let user = decode::<UserRequest>(&body)?.validate_update()?;

    let response = state
        .upstream
        .send(Method::PUT, &format!("/users/{id}"), Some(&session), Some(&user))
        .await?;

    Ok(Json(response))
}

pub async fn change_password_handler(
    State(state): Shared,
    session: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id)?;
    let change = decode::<PasswordChange>(&body)?.validate()?;

    let response = state
        .upstream
        .send(
            Method::PUT,
            &format!("/users/{id}/password"),
            Some(&session),
            Some(&change),
        )
        .await?;

    Ok(Json(response))
}

pub async fn delete_user_handler(
    State(state): Shared,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id)?;

    info!("Deleting user {id}");

    let response = state
        .upstream
        .send::<Value>(Method::DELETE, &format!("/users/{id}"), Some(&session), None)
        .await?;

    Ok(Json(response))
}
