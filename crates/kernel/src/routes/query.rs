//! Country weather query endpoint.
//!
//! `POST /` with `{"country": "..."}`. The pipeline runs strictly in order:
//! validate, rate limit, fetch the weather key, geolocate, resolve country,
//! resolve weather, compose, record trace.

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::Method;
use axum::routing::any;
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::middleware::get_client_id;
use crate::models::{QueryRequest, QueryResponse};
use crate::state::AppState;

/// Upper bound on buffered request bodies (axum's default body limit).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const INVALID_BODY: &str = "Invalid body. Expected JSON.";
const MISSING_COUNTRY: &str = "The 'country' field is required in the body.";

/// Parse and validate a request body, returning the trimmed country name.
pub fn parse_country(body: &[u8]) -> AppResult<String> {
    // An absent body reads as an empty object.
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    let request: QueryRequest =
        serde_json::from_slice(body).map_err(|_| AppError::BadRequest(INVALID_BODY.into()))?;

    request
        .country()
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(MISSING_COUNTRY.into()))
}

/// `/` handler for every method; only POST proceeds.
async fn query(State(state): State<AppState>, request: Request) -> AppResult<Json<QueryResponse>> {
    let (parts, body) = request.into_parts();

    if parts.method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = get_client_id(peer, &parts.headers, state.config().trust_proxy_headers);

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::BadRequest(INVALID_BODY.into()))?;
    let country = parse_country(&bytes)?;

    let now = Utc::now();
    state
        .rate_limiter()
        .check(&ip, now.timestamp())
        .await
        .map_err(|retry_after| AppError::RateLimited { retry_after })?;

    let api_key = state
        .secrets()
        .get(&state.config().weather_key_param)
        .await
        .context("failed to fetch weather API key")?;

    let origin = state.geolocation().locate(&ip).await;

    let country_info = state
        .countries()
        .resolve(&country)
        .await
        .ok_or(AppError::Upstream)?;

    let weather = state
        .weather()
        .current(&country_info.capital, &api_key)
        .await
        .ok_or(AppError::Upstream)?;

    let response = QueryResponse::compose(country_info, weather, origin);
    debug!(ip = %ip, country = %country, "query resolved");

    state.traces().record(&ip, &country, &response, now).await;

    info!(ip = %ip, country = %response.country, capital = %response.capital, "query answered");
    Ok(Json(response))
}

/// Create the query router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", any(query))
}
