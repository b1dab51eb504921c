use crate::queue::AnalysisKind;

/// Shared instruction block: deterministic JSON with a fixed shape so the
/// validator can be strict.
const OUTPUT_CONTRACT: &str = r#"Respond with a single JSON object and nothing else, using exactly these fields:
{
  "sentiment": "bullish" | "bearish" | "neutral",
  "sentiment_score": number between -1 and 1,
  "confidence": number between 0 and 1,
  "themes": array of short strings,
  "summary": one-paragraph plain-text summary,
  "narrative": full narrative analysis in plain text
}"#;

pub const SYSTEM_PROMPT: &str = "You are a buy-side research analyst. You write \
factual, measured narratives about institutional holdings activity. You never \
give investment advice and you never invent data not present in the context.";

/// Builds the user prompt for one queue entry from its assembled context.
pub fn build_prompt(kind: AnalysisKind, entity_key: &str, context_text: &str) -> String {
    let task = match kind {
        AnalysisKind::Instrument => format!(
            "Analyze the instrument {} based solely on the context below. \
             Focus on what the institutional flows, disclosed trades and \
             signals suggest about positioning.",
            entity_key
        ),
        AnalysisKind::BasketGroup => format!(
            "Analyze the day's trading pattern for the basket {}. Describe \
             the overall direction of the changes, notable adds and exits, \
             and what the pattern suggests about the manager's positioning.",
            entity_key
        ),
    };

    format!(
        "{}\n\n{}\n\n--- CONTEXT ---\n{}\n--- END CONTEXT ---",
        task, OUTPUT_CONTRACT, context_text
    )
}
