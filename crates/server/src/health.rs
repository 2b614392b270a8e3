use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::api::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub rfq_store: HealthCheck,
    pub quote_ledger: HealthCheck,
    pub llm: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let rfq_store = match state.rfqs.count().await {
        Ok(count) => ready(format!("{count} rfq(s) stored")),
        Err(error) => degraded(format!("rfq store unavailable: {error}")),
    };
    let quote_ledger = match state.ledger.total_quotes().await {
        Ok(total) => ready(format!("{total} quote(s) recorded")),
        Err(error) => degraded(format!("quote ledger unavailable: {error}")),
    };
    let llm = ready(format!("{} model `{}`", state.llm.provider, state.llm.model));

    let healthy = [&rfq_store, &quote_ledger].iter().all(|check| check.status == "ready");
    let payload = HealthResponse {
        status: if healthy { "ready" } else { "degraded" },
        service: ready("rfqdesk-server runtime initialized".to_string()),
        rfq_store,
        quote_ledger,
        llm,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn ready(detail: String) -> HealthCheck {
    HealthCheck { status: "ready", detail }
}

fn degraded(detail: String) -> HealthCheck {
    HealthCheck { status: "degraded", detail }
}
