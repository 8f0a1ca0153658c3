// All model prompt constants for the Enhancement module, plus the output
// schema sent alongside them.

use serde_json::{json, Value};

use crate::enhancement::band::Band;

/// The structural rewrite categories requested from the model.
/// Labels double as the `category` values shown on the variant cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Active,
    Passive,
    Complex,
    Compound,
    Paraphrased,
    Conditional,
    PastPerfect,
}

impl VariantKind {
    pub const ALL: [VariantKind; 7] = [
        VariantKind::Active,
        VariantKind::Passive,
        VariantKind::Complex,
        VariantKind::Compound,
        VariantKind::Paraphrased,
        VariantKind::Conditional,
        VariantKind::PastPerfect,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Active => "Active Voice",
            VariantKind::Passive => "Passive Voice",
            VariantKind::Complex => "Complex Structure",
            VariantKind::Compound => "Compound Structure",
            VariantKind::Paraphrased => "Paraphrased (Academic)",
            VariantKind::Conditional => "Conditional Structure",
            VariantKind::PastPerfect => "Past Perfect Tense",
        }
    }
}

/// System prompt for sentence enhancement — enforces JSON-only output.
pub const ENHANCE_SYSTEM: &str = "You are an expert IELTS examiner and writing coach. \
    You MUST respond with valid JSON only, matching the response schema exactly. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies outside the schema fields.";

/// Enhancement prompt template.
/// Replace: {target_band}, {variant_kinds}, {sentence}
const ENHANCE_PROMPT_TEMPLATE: &str = r#"The user is aiming for IELTS Band {target_band}.
Transform the following sentence into a version that perfectly matches the criteria for IELTS Band {target_band}.
Ensure the vocabulary and grammar are realistic and achievable for this specific band level.
Avoid making it overly complex if the band is lower (5.0 to 6.0), but ensure it is sophisticated for higher bands (8.0 to 9.0).

Provide one primary rewrite, plus multiple structural variations ({variant_kinds}) suitable for this level.
For each variation, name the structural pattern it illustrates and explain briefly why it fits this band.

Sentence: "{sentence}""#;

/// Builds the enhancement prompt for a sentence and target band.
/// The band is stated explicitly so the model calibrates complexity to it.
pub fn build_enhance_prompt(sentence: &str, band: Band) -> String {
    let kinds = VariantKind::ALL
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ");

    ENHANCE_PROMPT_TEMPLATE
        .replace("{target_band}", &band.to_string())
        .replace("{variant_kinds}", &kinds)
        .replace("{sentence}", sentence)
}

/// The output schema attached to every enhancement call.
/// Field names and required lists are the contract the decoder enforces.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "original": { "type": "STRING" },
            "targetVersion": { "type": "STRING" },
            "explanation": { "type": "STRING" },
            "variants": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "sentence": { "type": "STRING" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["category", "sentence", "explanation"]
                }
            }
        },
        "required": ["original", "targetVersion", "explanation", "variants"]
    })
}
