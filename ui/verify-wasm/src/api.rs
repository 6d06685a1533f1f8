//! HTTP client for the external verification services.
//!
//! Wraps `fetch` for JSON requests. The scoring call is the only one the
//! wizard waits on; report dispatch and token consumption are detached.

use crate::dom;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rp_api_types::{
    ReportDispatchRequest, ScoringErrorBody, ScoringRequest, ScoringResponse,
    TokenConsumeRequest, TokenConsumeResponse,
};
use rp_verify_core::ScoreClient;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

/// Determine the API base URL.
///
/// Priority: `<meta name="rp-api-base">` override → same-origin `:8080`.
pub fn base_url() -> String {
    if let Some(meta) = dom::query("meta[name='rp-api-base']") {
        if let Some(content) = meta.get_attribute("content") {
            let v = content.trim();
            if !v.is_empty() {
                return v.trim_end_matches('/').to_string();
            }
        }
    }

    let loc = dom::window().location();
    let host = loc.hostname().unwrap_or_default();
    let protocol = loc.protocol().unwrap_or_else(|_| "http:".into());
    format!("{}//{}:8080", protocol, host)
}

/// Perform a fetch request, returning the raw body text of a 2xx
/// response. Non-2xx bodies are read as `{"message": ...}` best-effort
/// and folded into the error.
pub async fn request(path: &str, method: &str, body: Option<String>) -> Result<String, String> {
    let url = format!("{}{}", base_url(), path);

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);

    let headers = Headers::new().map_err(|e| format!("{:?}", e))?;
    if let Some(ref b) = body {
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| format!("{:?}", e))?;
        opts.set_body(&JsValue::from_str(b));
    }
    opts.set_headers(&headers);

    let request = Request::new_with_str_and_init(&url, &opts).map_err(|e| format!("{:?}", e))?;

    let window = dom::window();
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch error: {:?}", e))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "response is not a Response".to_string())?;

    let text = JsFuture::from(resp.text().map_err(|e| format!("{:?}", e))?)
        .await
        .map_err(|e| format!("text error: {:?}", e))?;
    let text_str = text.as_string().unwrap_or_default();

    if !resp.ok() {
        let detail = serde_json::from_str::<ScoringErrorBody>(&text_str)
            .map(|b| b.message)
            .unwrap_or_default();
        let detail = if detail.is_empty() { text_str } else { detail };
        return Err(format!("{} {}: {}", resp.status(), resp.status_text(), detail));
    }

    Ok(text_str)
}

/// Browser implementation of the scoring port.
pub struct FetchScoreClient;

#[async_trait(?Send)]
impl ScoreClient for FetchScoreClient {
    async fn score(&self, id_image: &str, selfie_image: &str) -> Result<ScoringResponse> {
        let body = serde_json::to_string(&ScoringRequest {
            id_image: id_image.to_owned(),
            selfie_image: selfie_image.to_owned(),
        })
        .context("encode scoring request")?;

        let text = request("/verify/score", "POST", Some(body))
            .await
            .map_err(|e| anyhow!(e))?;
        serde_json::from_str(&text).context("malformed scoring response")
    }
}

/// Send the generated report to the given recipients. Detached side
/// effect; the caller only logs or toasts on failure.
pub async fn dispatch_report(
    first_name: &str,
    last_name: &str,
    report_base64: String,
    recipients: Vec<String>,
) -> Result<(), String> {
    let body = serde_json::to_string(&ReportDispatchRequest {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        report: report_base64,
        recipients,
    })
    .map_err(|e| e.to_string())?;

    request("/report/dispatch", "POST", Some(body)).await?;
    Ok(())
}

/// Mark the originating authorization token as consumed. The returned
/// flag is logged by the caller but not acted on.
pub async fn consume_token(token: &str) -> Result<bool, String> {
    let body = serde_json::to_string(&TokenConsumeRequest {
        token: token.to_owned(),
    })
    .map_err(|e| e.to_string())?;

    let text = request("/token/consume", "POST", Some(body)).await?;
    let parsed: TokenConsumeResponse =
        serde_json::from_str(&text).map_err(|e| e.to_string())?;
    Ok(parsed.updated)
}
