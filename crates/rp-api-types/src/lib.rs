use serde::{Deserialize, Serialize};

pub const ID_PHOTO_SLOT: &str = "idPhoto";
pub const SELFIE_PHOTO_SLOT: &str = "selfiePhoto";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRequest {
    #[serde(rename = "idImage")]
    pub id_image: String,
    #[serde(rename = "selfieImage")]
    pub selfie_image: String,
}

// Field spellings are pinned to the wire, `aditionalData` included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResponse {
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "verificationData", default)]
    pub verification_data: VerificationData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationData {
    #[serde(rename = "aditionalData", default)]
    pub aditional_data: Vec<VerificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub name: String,
    #[serde(default)]
    pub probability: Vec<ProbabilityScore>,
    #[serde(default)]
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityScore {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringErrorBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDispatchRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    /// Base64-encoded PDF bytes.
    pub report: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDispatchResponse {
    #[serde(rename = "dispatchId")]
    pub dispatch_id: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConsumeRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConsumeResponse {
    pub updated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_response_uses_wire_spellings() {
        let raw = r#"{
            "isVerified": true,
            "verificationData": {
                "aditionalData": [
                    {"name": "document-face", "probability": [{"type": "match", "score": 0.97}], "passed": true}
                ]
            }
        }"#;
        let parsed: ScoringResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.is_verified);
        assert_eq!(parsed.verification_data.aditional_data.len(), 1);
        let record = &parsed.verification_data.aditional_data[0];
        assert_eq!(record.name, "document-face");
        assert_eq!(record.probability[0].kind, "match");
        assert!(record.passed);
    }

    #[test]
    fn scoring_response_tolerates_missing_detail_payload() {
        let parsed: ScoringResponse = serde_json::from_str(r#"{"isVerified": false}"#).unwrap();
        assert!(!parsed.is_verified);
        assert!(parsed.verification_data.aditional_data.is_empty());
    }

    #[test]
    fn scoring_request_serializes_camel_case() {
        let req = ScoringRequest {
            id_image: "data:image/jpeg;base64,AAAA".into(),
            selfie_image: "data:image/jpeg;base64,BBBB".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("idImage").is_some());
        assert!(json.get("selfieImage").is_some());
    }

    #[test]
    fn error_body_defaults_message() {
        let parsed: ScoringErrorBody = serde_json::from_str("{}").unwrap();
        assert!(parsed.message.is_empty());
    }
}
