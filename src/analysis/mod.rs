pub mod analysis_errors;
pub mod analysis_model;
pub mod context_aggregator;
pub mod context_model;
pub mod inference;
pub mod orchestrator;
pub mod prompts;
pub mod results_repository;
pub mod validator;

// Re-export the main public entry points and types
pub use analysis_errors::{AnalysisError, Result};
pub use analysis_model::{is_fresh, AnalysisResult, ParsedAnalysis, Sentiment, SourceCounts};
pub use context_aggregator::{
    BasketMentionSourceTrait, ContextAggregator, ContextConfig, FundamentalsSourceTrait,
    LegislatorTradeSourceTrait, PriceHistorySourceTrait, SentimentSourceTrait,
    TechnicalSignalSourceTrait,
};
pub use context_model::AssembledContext;
pub use inference::{
    EmbeddingProviderTrait, InferenceOptions, InferenceProviderTrait, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider,
};
pub use orchestrator::{AnalysisOrchestrator, OrchestratorConfig, OrchestratorSummary};
pub use results_repository::{AnalysisResultRepository, AnalysisResultRepositoryTrait};
pub use validator::{validate_payload, PayloadValidationError};

#[cfg(test)]
pub(crate) mod tests;
