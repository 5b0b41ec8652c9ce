//! `POST /uppercase` and `POST /count`.
//!
//! Decode the JSON body into the operation's request type, invoke its
//! endpoint, and encode the response verbatim. A body that fails to decode
//! never reaches the endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use stringsvc_core::{
    method_names, CountRequest, CountResponse, UppercaseRequest, UppercaseResponse,
};
use tower::ServiceExt;

use super::AppState;
use crate::endpoint::Call;
use crate::network::TransportError;

pub async fn uppercase_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UppercaseResponse>, TransportError> {
    let _in_flight = state.lifecycle.in_flight_guard();
    let request: UppercaseRequest = decode(&body)?;
    let ctx = state.call_context(method_names::UPPERCASE, &headers);
    let response = state
        .endpoints
        .uppercase
        .clone()
        .oneshot(Call::new(ctx, request))
        .await?;
    Ok(Json(response))
}

pub async fn count_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CountResponse>, TransportError> {
    let _in_flight = state.lifecycle.in_flight_guard();
    let request: CountRequest = decode(&body)?;
    let ctx = state.call_context(method_names::COUNT, &headers);
    let response = state
        .endpoints
        .count
        .clone()
        .oneshot(Call::new(ctx, request))
        .await?;
    Ok(Json(response))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(body).map_err(TransportError::Decode)
}
