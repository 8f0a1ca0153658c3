//! Sentence enhancement — validates the request, drives the model call, and
//! decodes the structured response.
//!
//! Flow: validate input + band → build prompt → generate (schema-constrained) →
//!       strip fences → decode → completeness checks → EnhancementResult.
//!
//! The returned `targetBand` is always the request's band. The model's own echo
//! is never trusted for it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::enhancement::band::Band;
use crate::enhancement::prompts::{build_enhance_prompt, response_schema, ENHANCE_SYSTEM};
use crate::llm_client::{strip_json_fences, GenerativeModel, LlmError};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One alternative phrasing illustrating a distinct structural pattern.
/// Produced only by the model; read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingVariant {
    pub category: String,
    pub sentence: String,
    pub explanation: String,
}

/// A completed enhancement. Owned by the caller for display and replaced
/// wholesale on the next request; nothing here is persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    pub original: String,
    pub target_version: String,
    pub explanation: String,
    pub variants: Vec<WritingVariant>,
    pub target_band: Band,
}

/// The wire shape the model must return. Missing or wrong-typed fields fail
/// deserialization outright; there is no partial decode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnhancement {
    original: String,
    target_version: String,
    explanation: String,
    variants: Vec<WritingVariant>,
}

// ────────────────────────────────────────────────────────────────────────────
// Error taxonomy
// ────────────────────────────────────────────────────────────────────────────

/// Failure kinds callers can distinguish: caller errors (`InvalidInput`,
/// `Busy`, `Superseded`) never reach the network; the rest happen after the
/// call went out.
#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("an enhancement is already in progress for this session")]
    Busy,

    #[error("request superseded by a newer one")]
    Superseded,

    #[error("model call timed out")]
    Timeout,

    #[error("model unavailable: {0}")]
    Unavailable(#[source] LlmError),

    #[error("model returned no content")]
    EmptyResponse,

    #[error("model response failed validation: {0}")]
    Malformed(String),
}

impl From<LlmError> for EnhanceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => EnhanceError::Timeout,
            LlmError::EmptyContent | LlmError::Blocked { .. } => EnhanceError::EmptyResponse,
            other => EnhanceError::Unavailable(other),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core operation
// ────────────────────────────────────────────────────────────────────────────

/// Enhances one sentence toward `target_band`.
///
/// Preconditions are checked here and short-circuit before any model call:
/// the trimmed sentence must be non-empty and the band must be on the
/// supported scale.
pub async fn enhance_sentence(
    model: &dyn GenerativeModel,
    source_text: &str,
    target_band: f64,
) -> Result<EnhancementResult, EnhanceError> {
    let sentence = source_text.trim();
    if sentence.is_empty() {
        return Err(EnhanceError::InvalidInput(
            "sentence cannot be empty".to_string(),
        ));
    }
    let band =
        Band::new(target_band).map_err(|e| EnhanceError::InvalidInput(e.to_string()))?;

    let prompt = build_enhance_prompt(sentence, band);
    let schema = response_schema();

    let raw_text = model.generate(&prompt, ENHANCE_SYSTEM, &schema).await?;

    let body = strip_json_fences(&raw_text);
    if body.is_empty() {
        return Err(EnhanceError::EmptyResponse);
    }

    let decoded: RawEnhancement =
        serde_json::from_str(body).map_err(|e| EnhanceError::Malformed(e.to_string()))?;
    ensure_complete(&decoded)?;

    debug!(
        band = %band,
        variants = decoded.variants.len(),
        "sentence enhanced"
    );

    Ok(EnhancementResult {
        original: decoded.original,
        target_version: decoded.target_version,
        explanation: decoded.explanation,
        variants: decoded.variants,
        target_band: band,
    })
}

/// Shape deviations beyond what serde can see: required strings must not be
/// blank. A violation fails the whole call, never a partially valid result.
fn ensure_complete(decoded: &RawEnhancement) -> Result<(), EnhanceError> {
    if decoded.target_version.trim().is_empty() {
        return Err(EnhanceError::Malformed(
            "targetVersion is empty".to_string(),
        ));
    }
    for (i, variant) in decoded.variants.iter().enumerate() {
        if variant.category.trim().is_empty()
            || variant.sentence.trim().is_empty()
            || variant.explanation.trim().is_empty()
        {
            return Err(EnhanceError::Malformed(format!(
                "variant {i} is missing category, sentence, or explanation"
            )));
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;

    /// Deterministic stand-in for the Gemini client: returns a canned payload
    /// (or error) and counts invocations.
    struct StubModel {
        output: Result<String, fn() -> LlmError>,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn returning(payload: &str) -> Self {
            Self {
                output: Ok(payload.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(make_error: fn() -> LlmError) -> Self {
            Self {
                output: Err(make_error),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeModel for StubModel {
        async fn generate(
            &self,
            _prompt: &str,
            _system: &str,
            _schema: &Value,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.output {
                Ok(payload) => Ok(payload.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    const COMPLETE_PAYLOAD: &str = r#"{
        "original": "I go to school every day.",
        "targetVersion": "I attend school on a daily basis.",
        "explanation": "Formal register suitable for Band 7.0.",
        "variants": [{
            "category": "Passive Voice",
            "sentence": "School is attended by me on a daily basis.",
            "explanation": "Passive construction for structural range."
        }]
    }"#;

    #[tokio::test]
    async fn test_successful_enhancement_echoes_request_band() {
        let stub = StubModel::returning(COMPLETE_PAYLOAD);
        let result = enhance_sentence(&stub, "I go to school every day.", 7.0)
            .await
            .unwrap();

        assert_eq!(result.target_band, Band::new(7.0).unwrap());
        assert_eq!(result.target_version, "I attend school on a daily basis.");
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].category, "Passive Voice");
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_band_in_result_ignores_model_echo() {
        // The payload claims Band 9.0; the request asked for 6.5.
        let payload = r#"{
            "original": "x",
            "targetVersion": "y",
            "explanation": "z",
            "variants": [],
            "targetBand": 9.0
        }"#;
        let stub = StubModel::returning(payload);
        let result = enhance_sentence(&stub, "x", 6.5).await.unwrap();
        assert_eq!(result.target_band, Band::new(6.5).unwrap());
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_any_model_call() {
        let stub = StubModel::returning(COMPLETE_PAYLOAD);
        let result = enhance_sentence(&stub, "", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::InvalidInput(_))));
        assert_eq!(stub.calls(), 0, "no network call may be attempted");
    }

    #[tokio::test]
    async fn test_whitespace_input_rejected_before_any_model_call() {
        let stub = StubModel::returning(COMPLETE_PAYLOAD);
        let result = enhance_sentence(&stub, "   ", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::InvalidInput(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_band_rejected_before_any_model_call() {
        let stub = StubModel::returning(COMPLETE_PAYLOAD);
        let result = enhance_sentence(&stub, "A sentence.", 4.0).await;
        assert!(matches!(result, Err(EnhanceError::InvalidInput(_))));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_variants_field_is_malformed_not_partial() {
        let payload = r#"{
            "original": "x",
            "targetVersion": "y",
            "explanation": "z"
        }"#;
        let stub = StubModel::returning(payload);
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_variant_with_blank_field_is_malformed() {
        let payload = r#"{
            "original": "x",
            "targetVersion": "y",
            "explanation": "z",
            "variants": [{"category": "Passive Voice", "sentence": "  ", "explanation": "e"}]
        }"#;
        let stub = StubModel::returning(payload);
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_blank_target_version_is_malformed() {
        let payload = r#"{
            "original": "x",
            "targetVersion": " ",
            "explanation": "z",
            "variants": []
        }"#;
        let stub = StubModel::returning(payload);
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_empty_body_fails_with_empty_response() {
        let stub = StubModel::returning("");
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_empty_content_error_maps_to_empty_response() {
        let stub = StubModel::failing(|| LlmError::EmptyContent);
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_timeout_is_its_own_failure_kind() {
        let stub = StubModel::failing(|| LlmError::Timeout);
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::Timeout)));
    }

    #[tokio::test]
    async fn test_api_failure_maps_to_unavailable() {
        let stub = StubModel::failing(|| LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        let result = enhance_sentence(&stub, "A sentence.", 7.0).await;
        assert!(matches!(result, Err(EnhanceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_fenced_json_is_still_accepted() {
        let fenced = format!("```json\n{COMPLETE_PAYLOAD}\n```");
        let stub = StubModel::returning(&fenced);
        let result = enhance_sentence(&stub, "I go to school every day.", 7.0)
            .await
            .unwrap();
        assert_eq!(result.variants.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_against_a_deterministic_stub_agree() {
        let stub = StubModel::returning(COMPLETE_PAYLOAD);
        let first = enhance_sentence(&stub, "I go to school every day.", 7.0)
            .await
            .unwrap();
        let second = enhance_sentence(&stub, "I go to school every day.", 7.0)
            .await
            .unwrap();

        assert_eq!(first.target_band, second.target_band);
        assert!(!first.target_version.trim().is_empty());
        assert!(!second.target_version.trim().is_empty());
        assert_eq!(stub.calls(), 2);
    }
}
