use axum::{Json, extract::State, extract::rejection::JsonRejection, http::HeaderMap};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use crate::error::ApiError;
use crate::identity::resolve_identity;
use crate::metrics::{RATE_LIMITED, REQUEST_ERRORS, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{CallableRequest, CallableResponse, EndpointResult};
use crate::normalizer::normalize;
use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;
use crate::templates::{self, PromptTemplate};
use crate::upstream::GenerationRequest;

type CallableBody = Result<Json<CallableRequest>, JsonRejection>;

pub async fn solve_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: CallableBody,
) -> Result<Json<CallableResponse>, ApiError> {
    invoke(&state, &templates::SOLVE, &headers, body).await
}

pub async fn practice_variant_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: CallableBody,
) -> Result<Json<CallableResponse>, ApiError> {
    invoke(&state, &templates::PRACTICE_VARIANT, &headers, body).await
}

pub async fn harder_variant_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: CallableBody,
) -> Result<Json<CallableResponse>, ApiError> {
    invoke(&state, &templates::HARDER_VARIANT, &headers, body).await
}

// Wraps one invocation with the timeout and per-endpoint metrics
async fn invoke(
    state: &AppState,
    template: &PromptTemplate,
    headers: &HeaderMap,
    body: CallableBody,
) -> Result<Json<CallableResponse>, ApiError> {
    REQUEST_TOTAL.with_label_values(&[template.endpoint]).inc();
    let start_time = Instant::now();

    let outcome = match tokio::time::timeout(
        state.invocation_timeout,
        orchestrate(state, template, headers, body),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                endpoint = template.endpoint,
                timeout_secs = state.invocation_timeout.as_secs_f64(),
                "invocation timed out"
            );
            Err(ApiError::deadline_exceeded())
        }
    };

    REQUEST_LATENCY
        .with_label_values(&[template.endpoint])
        .observe(start_time.elapsed().as_secs_f64());
    if let Err(e) = &outcome {
        REQUEST_ERRORS
            .with_label_values(&[template.endpoint, e.code()])
            .inc();
    }

    outcome.map(Json)
}

async fn orchestrate(
    state: &AppState,
    template: &PromptTemplate,
    headers: &HeaderMap,
    body: CallableBody,
) -> Result<CallableResponse, ApiError> {
    let identity =
        resolve_identity(headers, &state.identity_header).ok_or_else(ApiError::unauthenticated)?;
    let caller = identity.fingerprint();

    match state.rate_limiter.check(identity.uid()) {
        RateLimitDecision::Allowed { remaining } => {
            debug!(endpoint = template.endpoint, caller = %caller, remaining, "rate limit ok");
        }
        RateLimitDecision::Rejected { retry_after } => {
            RATE_LIMITED.inc();
            info!(
                endpoint = template.endpoint,
                caller = %caller,
                retry_after_secs = retry_after.as_secs(),
                "rate limit exceeded"
            );
            return Err(ApiError::rate_limited());
        }
    }

    let Json(request) = body.map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        ApiError::invalid_argument("Request body must be a JSON object of the form {\"data\": {...}}")
    })?;
    let prompt = request.prompt_text()?;

    let generation = GenerationRequest {
        system: template.system.to_string(),
        user: template.user_message(prompt),
        temperature: template.temperature,
        max_tokens: template.max_tokens,
    };

    let content = state.generator.generate(generation).await.map_err(|e| {
        // full detail stays in the server log
        error!(endpoint = template.endpoint, caller = %caller, error = %e, "upstream generation failed");
        ApiError::internal()
    })?;

    let content = match content {
        Some(content) if !content.is_empty() => content,
        _ => {
            error!(endpoint = template.endpoint, caller = %caller, "upstream returned no content");
            return Err(ApiError::Internal("No response received from the AI service".to_string()));
        }
    };

    let payload = normalize(&content).into_value();
    info!(endpoint = template.endpoint, caller = %caller, "request completed");

    Ok(CallableResponse {
        result: EndpointResult {
            field: template.result_field,
            payload,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    })
}
