// POST /analyze — score a URL for scam likelihood.
//
// Returns 200 with the verdict.
// Returns 429 when the client has used up its window; the body is a fixed
// message and Retry-After says when to come back.
// Returns 422 when the body is not `{ "url": string }`.
//
// The rate limit is consulted before the body is looked at, so malformed
// requests count against the client too.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rate_limit::Admission;
use crate::scoring::{analyze_url, Status, Verdict};
use crate::web::client::ClientId;
use crate::web::{api_error, AppState};

pub const RATE_LIMITED_DETAIL: &str = "Too many requests. Try again later.";

/// Shown in place of an empty red-flag list.
pub const NO_RED_FLAGS: &str = "No red flags found";

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Wire shape of a verdict.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub score: u32,
    pub status: Status,
    pub red_flags: Vec<String>,
    pub category: String,
    pub description: String,
}

impl From<Verdict> for AnalyzeResponse {
    fn from(verdict: Verdict) -> Self {
        let red_flags = if verdict.red_flags.is_empty() {
            vec![NO_RED_FLAGS.to_string()]
        } else {
            verdict.red_flags
        };
        Self {
            score: verdict.score,
            status: verdict.status,
            red_flags,
            category: verdict.category,
            description: verdict.description,
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    if let Admission::Rejected { retry_after } = state.limiter.check(&client) {
        let mut response = api_error(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_DETAIL);
        response.headers_mut().insert(
            header::RETRY_AFTER,
            header::HeaderValue::from(retry_after_secs(retry_after)),
        );
        return response;
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(client = %client, error = %rejection, "Rejected analyze body");
            return api_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text());
        }
    };

    let verdict = analyze_url(&request.url, &state.rules);
    debug!(client = %client, score = verdict.score, "Analyzed URL");

    Json(AnalyzeResponse::from(verdict)).into_response()
}

/// Whole seconds until a retry can succeed, rounded up, never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}
