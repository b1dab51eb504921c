use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::queue::AnalysisKind;
use crate::snapshots::snapshots_model::DATE_FORMAT;

/// Sentiment classification returned by the inference collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "bullish" => Some(Sentiment::Bullish),
            "bearish" => Some(Sentiment::Bearish),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

/// Strictly validated inference output. Produced only by the payload
/// validator; a partial object never exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAnalysis {
    pub sentiment: Sentiment,
    /// In [-1, 1].
    pub sentiment_score: f64,
    /// In [0, 1].
    pub confidence: f64,
    pub themes: Vec<String>,
    pub summary: String,
    pub narrative: String,
}

/// Row counts per context source, persisted alongside the result for
/// auditability of what the model saw.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounts {
    pub price_points: usize,
    pub basket_mentions: usize,
    pub legislator_trades: usize,
    pub prior_narratives: usize,
    pub technical_signals: usize,
    pub fundamentals: usize,
    pub sentiment_points: usize,
}

/// One persisted analysis. Identity (entity_key, kind, as_of) is unique;
/// a rerun on the same day replaces the earlier row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: String,
    pub entity_key: String,
    pub kind: AnalysisKind,
    pub as_of: NaiveDate,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub confidence: f64,
    pub themes: Vec<String>,
    pub summary: String,
    pub narrative: String,
    /// Exact serialized context sent to inference.
    pub context_text: String,
    pub embedding: Option<Vec<f32>>,
    pub source_counts: SourceCounts,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn from_parsed(
        entity_key: &str,
        kind: AnalysisKind,
        as_of: NaiveDate,
        parsed: ParsedAnalysis,
        context_text: String,
        embedding: Option<Vec<f32>>,
        source_counts: SourceCounts,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_key: entity_key.to_string(),
            kind,
            as_of,
            sentiment: parsed.sentiment,
            sentiment_score: parsed.sentiment_score,
            confidence: parsed.confidence,
            themes: parsed.themes,
            summary: parsed.summary,
            narrative: parsed.narrative,
            context_text,
            embedding,
            source_counts,
            created_at: Utc::now(),
        }
    }
}

/// Whether a successful analysis at `last_success_at` is still fresh at
/// `now`. Time is an explicit parameter so callers can test deterministically.
pub fn is_fresh(
    last_success_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    match last_success_at {
        Some(at) => now - at < window,
        None => false,
    }
}

/// Database model for analysis results
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::analysis_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisResultDB {
    pub id: String,
    pub entity_key: String,
    pub kind: String,
    pub as_of: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub confidence: f64,
    pub themes: String,
    pub summary: String,
    pub narrative: String,
    pub context_text: String,
    pub embedding: Option<String>,
    pub source_counts: String,
    pub created_at: String,
}

impl From<AnalysisResultDB> for AnalysisResult {
    fn from(db: AnalysisResultDB) -> Self {
        Self {
            kind: AnalysisKind::parse(&db.kind).unwrap_or(AnalysisKind::Instrument),
            as_of: NaiveDate::parse_from_str(&db.as_of, DATE_FORMAT)
                .unwrap_or_else(|_| Utc::now().date_naive()),
            sentiment: Sentiment::parse(&db.sentiment).unwrap_or(Sentiment::Neutral),
            themes: serde_json::from_str(&db.themes).unwrap_or_default(),
            embedding: db.embedding.and_then(|s| serde_json::from_str(&s).ok()),
            source_counts: serde_json::from_str(&db.source_counts).unwrap_or_default(),
            created_at: DateTime::parse_from_rfc3339(&db.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            id: db.id,
            entity_key: db.entity_key,
            sentiment_score: db.sentiment_score,
            confidence: db.confidence,
            summary: db.summary,
            narrative: db.narrative,
            context_text: db.context_text,
        }
    }
}

impl From<AnalysisResult> for AnalysisResultDB {
    fn from(domain: AnalysisResult) -> Self {
        Self {
            id: domain.id,
            entity_key: domain.entity_key,
            kind: domain.kind.as_str().to_string(),
            as_of: domain.as_of.format(DATE_FORMAT).to_string(),
            sentiment: domain.sentiment.as_str().to_string(),
            sentiment_score: domain.sentiment_score,
            confidence: domain.confidence,
            themes: serde_json::to_string(&domain.themes).unwrap_or_else(|_| "[]".to_string()),
            summary: domain.summary,
            narrative: domain.narrative,
            context_text: domain.context_text,
            embedding: domain
                .embedding
                .map(|v| serde_json::to_string(&v).unwrap_or_else(|_| "[]".to_string())),
            source_counts: serde_json::to_string(&domain.source_counts)
                .unwrap_or_else(|_| "{}".to_string()),
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}
