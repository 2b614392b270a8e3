//! JSON API.
//!
//! - `POST /api/parse-request`          typed text -> RFQ
//! - `POST /api/clarify`                next assistant turn for an RFQ chat
//! - `POST /api/upload-specs`           multipart files -> RFQ (see `upload`)
//! - `POST /api/negotiate`              guidance for one supplier quote
//! - `GET  /api/rfqs/{id}`              stored RFQ
//! - `PUT  /api/rfqs/{id}/commercial`   replace buyer commercial terms
//! - `POST /api/rfqs/{id}/quotes`       append a supplier quote
//! - `GET  /api/rfqs/{id}/quotes`       quotes in submission order

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use rfqdesk_agent::AgentRuntime;
use rfqdesk_core::compat::rfq_from_client;
use rfqdesk_core::config::{LlmProvider, UploadConfig};
use rfqdesk_core::domain::conversation::ChatTurn;
use rfqdesk_core::domain::quote::SupplierQuote;
use rfqdesk_core::domain::rfq::{Rfq, RfqId};
use rfqdesk_core::errors::ApplicationError;
use rfqdesk_db::{QuoteLedger, QuoteLedgerRepository, RepositoryError, RfqRepository};

use crate::error::{correlation_id, ApiError};
use crate::{health, spa, upload};

/// Multipart framing allowance on top of the per-file limits.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
    pub rfqs: Arc<dyn RfqRepository>,
    pub ledger: QuoteLedger,
    pub uploads: UploadConfig,
    pub llm: LlmSummary,
}

#[derive(Clone, Debug, Serialize)]
pub struct LlmSummary {
    pub provider: LlmProvider,
    pub model: String,
}

impl AppState {
    pub fn new(
        runtime: Arc<AgentRuntime>,
        rfqs: Arc<dyn RfqRepository>,
        quotes: Arc<dyn QuoteLedgerRepository>,
        uploads: UploadConfig,
        llm: LlmSummary,
    ) -> Self {
        let ledger = QuoteLedger::new(rfqs.clone(), quotes);
        Self { runtime, rfqs, ledger, uploads, llm }
    }
}

pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    let upload_limit = state
        .uploads
        .max_files
        .saturating_mul(usize::try_from(state.uploads.max_file_bytes).unwrap_or(usize::MAX))
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/parse-request", post(parse_request))
        .route("/api/clarify", post(clarify))
        .route(
            "/api/upload-specs",
            post(upload::upload_specs).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/negotiate", post(negotiate))
        .route("/api/rfqs/{id}", get(get_rfq))
        .route("/api/rfqs/{id}/commercial", put(update_commercial))
        .route("/api/rfqs/{id}/quotes", post(submit_quote).get(list_quotes))
        .route("/api/{*rest}", axum::routing::any(unknown_api_route))
        .with_state(state)
        .fallback_service(spa::service(static_dir))
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClarifyRequest {
    #[serde(default)]
    pub rfq: Value,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default, alias = "message")]
    pub user_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClarifyResponse {
    pub assistant_message: String,
}

#[derive(Debug, Deserialize)]
pub struct NegotiateRequest {
    #[serde(default)]
    pub rfq: Value,
    #[serde(default)]
    pub quote: Value,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NegotiateResponse {
    pub advice: String,
}

#[derive(Debug, Deserialize)]
pub struct CommercialRequest {
    #[serde(default)]
    pub commercial: Value,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSubmission {
    #[serde(default)]
    pub quote: Value,
}

#[derive(Debug, Serialize)]
pub struct QuoteAccepted {
    pub ok: bool,
    pub quote_count: usize,
}

#[derive(Debug, Serialize)]
pub struct QuoteList {
    pub quotes: Vec<SupplierQuote>,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>, correlation_id: &str) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text(), correlation_id))
}

fn persistence(error: RepositoryError, correlation_id: &str) -> ApiError {
    ApiError::from_application(ApplicationError::Persistence(error.to_string()), correlation_id)
}

pub async fn parse_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<Rfq>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let request = json_body(payload, &correlation_id)?;
    if request.text.trim().is_empty() {
        return Err(ApiError::validation("`text` must not be empty", &correlation_id));
    }

    let rfq = state
        .runtime
        .normalize_text(&request.text, request.project_name.as_deref())
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.parse_request.completed",
        correlation_id = %correlation_id,
        rfq_id = %rfq.id,
        line_items = rfq.line_items.len(),
        "rfq created from text"
    );
    Ok(Json(rfq))
}

pub async fn clarify(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ClarifyRequest>, JsonRejection>,
) -> Result<Json<ClarifyResponse>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let request = json_body(payload, &correlation_id)?;
    let rfq = rfq_from_client(request.rfq)
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    let assistant_message = state
        .runtime
        .clarify(&rfq, &request.history, request.user_message.as_deref())
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.clarify.completed",
        correlation_id = %correlation_id,
        rfq_id = %rfq.id,
        "clarification turn returned"
    );
    Ok(Json(ClarifyResponse { assistant_message }))
}

pub async fn negotiate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NegotiateRequest>, JsonRejection>,
) -> Result<Json<NegotiateResponse>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let request = json_body(payload, &correlation_id)?;
    let rfq = rfq_from_client(request.rfq)
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;
    let quote = SupplierQuote::from_value(request.quote)
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    let advice = state
        .runtime
        .advise(&rfq, &quote, request.goal.as_deref())
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.negotiate.completed",
        correlation_id = %correlation_id,
        rfq_id = %rfq.id,
        "negotiation advice returned"
    );
    Ok(Json(NegotiateResponse { advice }))
}

pub async fn get_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Rfq>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let rfq = find_rfq(&state, &RfqId(id), &correlation_id).await?;
    Ok(Json(rfq))
}

pub async fn update_commercial(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<CommercialRequest>, JsonRejection>,
) -> Result<Json<Rfq>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let request = json_body(payload, &correlation_id)?;
    let Value::Object(commercial) = request.commercial else {
        return Err(ApiError::validation("`commercial` must be a JSON object", &correlation_id));
    };

    let rfq = find_rfq(&state, &RfqId(id), &correlation_id).await?.with_commercial(commercial);
    state.rfqs.save(rfq.clone()).await.map_err(|error| persistence(error, &correlation_id))?;

    info!(
        event_name = "api.commercial.updated",
        correlation_id = %correlation_id,
        rfq_id = %rfq.id,
        "commercial terms replaced"
    );
    Ok(Json(rfq))
}

pub async fn submit_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<QuoteSubmission>, JsonRejection>,
) -> Result<Json<QuoteAccepted>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let request = json_body(payload, &correlation_id)?;
    let quote = SupplierQuote::from_value(request.quote)
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    let rfq_id = RfqId(id);
    let quote_count = state
        .ledger
        .submit(&rfq_id, quote)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    info!(
        event_name = "api.quote.submitted",
        correlation_id = %correlation_id,
        rfq_id = %rfq_id,
        quote_count,
        "supplier quote recorded"
    );
    Ok(Json(QuoteAccepted { ok: true, quote_count }))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<QuoteList>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let quotes = state
        .ledger
        .list_quotes(&RfqId(id))
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;
    Ok(Json(QuoteList { quotes }))
}

async fn unknown_api_route(headers: HeaderMap, Path(rest): Path<String>) -> ApiError {
    let correlation_id = correlation_id(&headers);
    ApiError::from_application(ApplicationError::not_found("route", format!("/api/{rest}")), &correlation_id)
}

async fn find_rfq(state: &AppState, id: &RfqId, correlation_id: &str) -> Result<Rfq, ApiError> {
    match state.rfqs.find_by_id(id).await {
        Ok(Some(rfq)) => Ok(rfq),
        Ok(None) => Err(ApiError::from_application(
            ApplicationError::not_found("rfq", id.as_str()),
            correlation_id,
        )),
        Err(error) => Err(persistence(error, correlation_id)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::Path;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use rfqdesk_core::domain::rfq::{LineItem, Rfq};
    use rfqdesk_ingest::FILE_MARKER_PREFIX;

    use crate::test_support::{test_router, ScriptedLlm};

    const PIPE_REPLY: &str = r#"{
  "project_name": null,
  "line_items": [{
    "raw_description": "20 pcs 2-inch SS316 seamless pipe",
    "product_category": "pipe",
    "material_grade": "SS316",
    "size": {"outer_diameter": {"value": 2, "unit": "in"}, "length": {"value": 12, "unit": "m"}},
    "quantity": 20,
    "unit": "pcs",
    "delivery_location": "Houston",
    "payment_terms": "NET30"
  }]
}"#;

    const EMPTY_REPLY: &str = r#"{"project_name": null, "line_items": []}"#;
    const BOM_REPLY: &str = r#"{"project_name": null, "line_items": [
        {"raw_description": "2in SS316 seamless pipe", "quantity": 20},
        {"raw_description": "4in WN flange", "quantity": "8"}
    ]}"#;

    const BOUNDARY: &str = "rfqdesk-test-boundary";

    fn no_static() -> &'static Path {
        Path::new("/nonexistent/rfqdesk/public")
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        read_json(router.clone().oneshot(request).await.expect("response")).await
    }

    async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn multipart(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file, contents) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((filename, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn upload(router: &Router, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload-specs")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("request");
        read_json(router.clone().oneshot(request).await.expect("response")).await
    }

    fn two_sheet_workbook() -> Vec<u8> {
        let entries = [
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>
<sheet name="Pipes" sheetId="1" r:id="rId1"/><sheet name="Flanges" sheetId="2" r:id="rId2"/>
</sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships>
<Relationship Id="rId1" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Target="worksheets/sheet2.xml"/>
</Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1">
<c r="A1" t="inlineStr"><is><t>2in SS316 seamless pipe</t></is></c><c r="B1"><v>20</v></c>
</row></sheetData></worksheet>"#,
            ),
            (
                "xl/worksheets/sheet2.xml",
                r#"<worksheet><sheetData><row r="1">
<c r="A1" t="inlineStr"><is><t>4in WN flange</t></is></c><c r="B1"><v>8</v></c>
</row></sheetData></worksheet>"#,
            ),
        ];

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer.start_file(name, SimpleFileOptions::default()).expect("start entry");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    #[tokio::test]
    async fn parse_request_returns_verified_rfq_and_stores_it() {
        let (router, state, _) = test_router(ScriptedLlm::replying([PIPE_REPLY]), no_static());

        let (status, rfq) = send(
            &router,
            Method::POST,
            "/api/parse-request",
            Some(json!({"text": "Need 20 pcs 2-inch SS316 seamless pipe to Houston, NET30"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let item = &rfq["line_items"][0];
        assert_eq!(item["material_grade"], "SS316");
        assert_eq!(item["quantity"], json!(20.0));
        assert_eq!(item["size"]["outer_diameter"]["value"], json!(2.0));
        assert_eq!(item["size"]["length"], Value::Null);
        assert_eq!(item["size"]["wall_thickness"], Value::Null);

        let id = rfq["id"].as_str().expect("id").to_string();
        let (status, stored) = send(&router, Method::GET, &format!("/api/rfqs/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored["id"], json!(id));
        assert_eq!(state.rfqs.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn parse_request_rejects_blank_text() {
        let (router, _, llm) = test_router(ScriptedLlm::default(), no_static());

        let (status, body) =
            send(&router, Method::POST, "/api/parse-request", Some(json!({"text": "   "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["correlation_id"].is_string());
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (router, _, _) = test_router(ScriptedLlm::default(), no_static());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/parse-request")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request");

        let (status, _) = read_json(router.oneshot(request).await.expect("response")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clarify_accepts_legacy_shape_and_never_touches_the_store() {
        let (router, state, llm) = test_router(
            ScriptedLlm::replying(["Which pressure class do the flanges need?", ""]),
            no_static(),
        );
        let payload = json!({
            "rfq": {"id": "RFQ-chat", "project": "Tie-in", "items": [{"description": "4in WN flange", "grade": "A105", "qty": 8}]},
            "history": [{"role": "assistant", "content": "What else?"}],
            "message": "Add gaskets"
        });

        let (status, body) = send(&router, Method::POST, "/api/clarify", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assistant_message"], "Which pressure class do the flanges need?");

        let (status, body) = send(&router, Method::POST, "/api/clarify", Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["assistant_message"].as_str().is_some_and(|message| !message.is_empty()));

        assert_eq!(state.rfqs.count().await.expect("count"), 0);
        let requests = llm.requests();
        assert!(requests[0].messages[0].content.contains("A105"));
    }

    #[tokio::test]
    async fn negotiate_rejects_non_object_quote() {
        let (router, _, llm) = test_router(ScriptedLlm::default(), no_static());

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/negotiate",
            Some(json!({"rfq": {"items": []}, "quote": "cheap"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn negotiate_returns_advice() {
        let (router, _, _) =
            test_router(ScriptedLlm::replying(["Ask for 30-day payment terms."]), no_static());

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/negotiate",
            Some(json!({
                "rfq": {"line_items": [{"raw_description": "2in SS316 pipe"}]},
                "quote": {"supplier": "Acme", "unit_price": 41.5},
                "goal": "lower price"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["advice"], "Ask for 30-day payment terms.");
    }

    #[tokio::test]
    async fn quote_ledger_routes_follow_rfq_existence() {
        let (router, state, _) = test_router(ScriptedLlm::default(), no_static());
        let rfq = Rfq::new("Spur", vec![LineItem::new("item-1", "pipe")], "pipe", Vec::new());
        let id = rfq.id.to_string();
        state.rfqs.save(rfq).await.expect("save");

        let (status, body) = send(&router, Method::GET, &format!("/api/rfqs/{id}/quotes"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"quotes": []}));

        let (status, _) = send(&router, Method::GET, "/api/rfqs/RFQ-missing/quotes", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&router, Method::POST, "/api/rfqs/RFQ-missing/quotes", Some(json!({"quote": {"supplier": "A"}})))
                .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&router, Method::POST, &format!("/api/rfqs/{id}/quotes"), Some(json!({"quote": [1, 2]}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for supplier in ["Acme", "Birch"] {
            let (status, body) = send(
                &router,
                Method::POST,
                &format!("/api/rfqs/{id}/quotes"),
                Some(json!({"quote": {"supplier": supplier}})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["ok"], json!(true));
        }

        let (_, body) = send(&router, Method::GET, &format!("/api/rfqs/{id}/quotes"), None).await;
        assert_eq!(body["quotes"], json!([{"supplier": "Acme"}, {"supplier": "Birch"}]));
    }

    #[tokio::test]
    async fn commercial_update_keeps_provenance_and_items() {
        let (router, state, _) = test_router(ScriptedLlm::default(), no_static());
        let rfq = Rfq::new("Spur", vec![LineItem::new("item-1", "pipe")], "20 pcs pipe", Vec::new());
        let id = rfq.id.to_string();
        state.rfqs.save(rfq).await.expect("save");

        let (status, body) = send(
            &router,
            Method::PUT,
            &format!("/api/rfqs/{id}/commercial"),
            Some(json!({"commercial": {"destination": "Houston", "incoterm": "DAP"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["commercial"]["incoterm"], "DAP");
        assert_eq!(body["original_text"], "20 pcs pipe");
        assert_eq!(body["line_items"][0]["raw_description"], "pipe");

        let (status, _) = send(
            &router,
            Method::PUT,
            &format!("/api/rfqs/{id}/commercial"),
            Some(json!({"commercial": "Houston"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &router,
            Method::PUT,
            "/api/rfqs/RFQ-missing/commercial",
            Some(json!({"commercial": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_feeds_every_sheet_to_the_normalizer() {
        let (router, _, llm) = test_router(ScriptedLlm::replying([BOM_REPLY]), no_static());
        let workbook = two_sheet_workbook();
        let body = multipart(&[
            (
                "files",
                Some(("bom.xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
                workbook.as_slice(),
            ),
            ("project_name", None, b"Refinery revamp".as_slice()),
        ]);

        let (status, rfq) = upload(&router, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rfq["project_name"], "Refinery revamp");
        assert_eq!(rfq["sources"], json!([{"filename": "bom.xlsx", "origin": "spreadsheet"}]));
        let prompt = &llm.requests()[0].messages[0].content;
        assert!(prompt.contains(&format!("{FILE_MARKER_PREFIX} bom.xlsx (spreadsheet)")));
        assert!(prompt.contains("### Sheet: Pipes"));
        assert!(prompt.contains("### Sheet: Flanges"));
        assert!(prompt.contains("4in WN flange,8"));

        let items = rfq["line_items"].as_array().expect("line items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["raw_description"], "2in SS316 seamless pipe");
        assert_eq!(items[0]["quantity"], json!(20.0));
        assert_eq!(items[1]["raw_description"], "4in WN flange");
        assert_eq!(items[1]["quantity"], json!(8.0));
        assert_eq!(items[1]["other_requirements"], json!([]));
    }

    #[tokio::test]
    async fn unreadable_uploads_still_produce_an_rfq() {
        let (router, _, llm) = test_router(ScriptedLlm::replying([EMPTY_REPLY]), no_static());
        let body = multipart(&[
            ("files", Some(("legacy.xls", "application/vnd.ms-excel")), b"\xd0\xcf\x11\xe0".as_slice()),
            ("files", Some(("notes.txt", "text/plain")), b"".as_slice()),
        ]);

        let (status, rfq) = upload(&router, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rfq["line_items"], json!([]));
        let prompt = &llm.requests()[0].messages[0].content;
        assert!(prompt.contains("No readable text could be extracted"));
        assert!(prompt.contains("legacy.xls"));
        assert!(prompt.contains("notes.txt"));
    }

    #[tokio::test]
    async fn upload_without_files_is_rejected() {
        let (router, _, llm) = test_router(ScriptedLlm::default(), no_static());

        let (status, _) = upload(&router, multipart(&[("project_name", None, b"Empty".as_slice())])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn upload_over_file_count_is_rejected() {
        let (router, _, _) = test_router(ScriptedLlm::default(), no_static());
        let parts = (0..6)
            .map(|_| ("files", Some(("a.txt", "text/plain")), b"pipe".as_slice()))
            .collect::<Vec<_>>();

        let (status, _) = upload(&router, multipart(&parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_api_paths_are_json_not_found_and_others_get_the_shell() {
        let (router, _, _) = test_router(ScriptedLlm::default(), no_static());

        let (status, body) = send(&router, Method::GET, "/api/rfq-list", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().is_some_and(|detail| detail.contains("/api/rfq-list")));

        let response = router
            .oneshot(Request::builder().uri("/rfqs/RFQ-1").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
