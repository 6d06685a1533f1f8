//! Development stand-in for the external verification services. Serves
//! the documented scoring, report-dispatch, and token-consumption
//! contracts with deterministic answers so the wizard can run
//! end-to-end against localhost.

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use rp_api_types::{
    ProbabilityScore, ReportDispatchRequest, ReportDispatchResponse, ScoringRequest,
    ScoringResponse, TokenConsumeRequest, TokenConsumeResponse, VerificationData,
    VerificationRecord,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

/// An ID payload embedding this marker fails verification, so local
/// runs can exercise both terminals.
const FAIL_MARKER: &str = "fail";

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = router();

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    info!("score-stub listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/verify/score", post(verify_score))
        .route("/report/dispatch", post(report_dispatch))
        .route("/token/consume", post(token_consume))
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "score-stub",
        status: "ok",
    })
}

async fn verify_score(Json(req): Json<ScoringRequest>) -> ApiResult<ScoringResponse> {
    if req.id_image.trim().is_empty() {
        return Err(bad_request("idImage is required"));
    }
    if req.selfie_image.trim().is_empty() {
        return Err(bad_request("selfieImage is required"));
    }

    let verified = !req.id_image.contains(FAIL_MARKER);
    info!("scored submission: verified={}", verified);

    Ok(Json(ScoringResponse {
        is_verified: verified,
        verification_data: VerificationData {
            aditional_data: fake_records(verified),
        },
    }))
}

fn fake_records(verified: bool) -> Vec<VerificationRecord> {
    let face_score = if verified { 0.97 } else { 0.21 };
    vec![
        VerificationRecord {
            name: "document-face".to_owned(),
            probability: vec![ProbabilityScore {
                kind: "match".to_owned(),
                score: face_score,
            }],
            passed: verified,
        },
        VerificationRecord {
            name: "document-integrity".to_owned(),
            probability: vec![ProbabilityScore {
                kind: "tamper".to_owned(),
                score: 0.02,
            }],
            passed: true,
        },
    ]
}

async fn report_dispatch(
    Json(req): Json<ReportDispatchRequest>,
) -> ApiResult<ReportDispatchResponse> {
    if req.recipients.is_empty() {
        return Err(bad_request("at least one recipient is required"));
    }
    let report = rp_report::decode_report(&req.report)
        .map_err(|err| bad_request(format!("invalid report: {err}")))?;

    let dispatch_id = Uuid::new_v4().to_string();
    info!(
        "dispatching {}-byte report for {} {} to {:?} (dispatch {})",
        report.len(),
        req.first_name,
        req.last_name,
        req.recipients,
        dispatch_id
    );

    Ok(Json(ReportDispatchResponse {
        dispatch_id,
        accepted: true,
    }))
}

async fn token_consume(Json(req): Json<TokenConsumeRequest>) -> ApiResult<TokenConsumeResponse> {
    let updated = !req.token.trim().is_empty();
    info!("token consume: updated={}", updated);
    Ok(Json(TokenConsumeResponse { updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn post_json(path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn clean_submission_verifies_with_contract_shape() {
        let (status, body) = post_json(
            "/verify/score",
            serde_json::json!({
                "idImage": "data:image/jpeg;base64,AAAA",
                "selfieImage": "data:image/jpeg;base64,BBBB",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isVerified"], true);
        assert!(body["verificationData"]["aditionalData"].is_array());
    }

    #[tokio::test]
    async fn marked_submission_fails_verification() {
        let (status, body) = post_json(
            "/verify/score",
            serde_json::json!({
                "idImage": "data:image/jpeg;base64,failfail",
                "selfieImage": "data:image/jpeg;base64,BBBB",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isVerified"], false);
    }

    #[tokio::test]
    async fn missing_image_is_rejected_with_message_body() {
        let (status, body) = post_json(
            "/verify/score",
            serde_json::json!({"idImage": "", "selfieImage": "x"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("idImage"));
    }

    #[tokio::test]
    async fn report_dispatch_accepts_a_real_report() {
        let records = fake_records(true);
        let pdf = rp_report::render_report(&rp_report::ReportInput {
            verified: true,
            first_name: "Jane",
            last_name: "Tenant",
            contact_email: "jane@example.com",
            records: &records,
            id_photo: None,
        })
        .unwrap();

        let (status, body) = post_json(
            "/report/dispatch",
            serde_json::json!({
                "firstName": "Jane",
                "lastName": "Tenant",
                "report": rp_report::encode_report(&pdf),
                "recipients": ["jane@example.com", "verifications@rentproof.io"],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);
        assert!(!body["dispatchId"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_dispatch_rejects_non_pdf_bodies() {
        let (status, _) = post_json(
            "/report/dispatch",
            serde_json::json!({
                "firstName": "Jane",
                "lastName": "Tenant",
                "report": "bm90IGEgcGRm",
                "recipients": ["jane@example.com"],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn token_consume_reports_whether_it_updated() {
        let (status, body) =
            post_json("/token/consume", serde_json::json!({"token": "abc123"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], true);

        let (_, body) = post_json("/token/consume", serde_json::json!({"token": "  "})).await;
        assert_eq!(body["updated"], false);
    }
}
