use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::warn;
use std::fmt::Write as _;
use std::sync::Arc;

use super::analysis_errors::Result;
use super::analysis_model::SourceCounts;
use super::context_model::{
    AssembledContext, BasketMention, FundamentalsSummary, LegislatorTrade, PricePoint,
    SentimentAggregate, TechnicalSnapshot,
};
use super::results_repository::AnalysisResultRepositoryTrait;
use crate::constants::{
    CONTEXT_LOOKBACK_DAYS, MAX_BASKET_MENTIONS, MAX_LEGISLATOR_TRADES, MAX_PRICE_POINTS,
    MAX_PRIOR_NARRATIVES,
};
use crate::queue::AnalysisKind;

// ============================================================================
// Source traits (read-only external collaborators)
// ============================================================================

#[async_trait]
pub trait PriceHistorySourceTrait: Send + Sync {
    async fn daily_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
}

#[async_trait]
pub trait BasketMentionSourceTrait: Send + Sync {
    async fn mentions(
        &self,
        entity_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<BasketMention>>;
}

#[async_trait]
pub trait LegislatorTradeSourceTrait: Send + Sync {
    async fn trades(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> Result<Vec<LegislatorTrade>>;
}

#[async_trait]
pub trait TechnicalSignalSourceTrait: Send + Sync {
    async fn latest(&self, symbol: &str) -> Result<Option<TechnicalSnapshot>>;
}

#[async_trait]
pub trait FundamentalsSourceTrait: Send + Sync {
    async fn profile(&self, symbol: &str) -> Result<Option<FundamentalsSummary>>;
}

#[async_trait]
pub trait SentimentSourceTrait: Send + Sync {
    async fn aggregate(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<SentimentAggregate>>;
}

// ============================================================================
// Aggregator
// ============================================================================

#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub lookback_days: i64,
    pub max_price_points: usize,
    pub max_basket_mentions: usize,
    pub max_legislator_trades: usize,
    pub max_prior_narratives: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            lookback_days: CONTEXT_LOOKBACK_DAYS,
            max_price_points: MAX_PRICE_POINTS,
            max_basket_mentions: MAX_BASKET_MENTIONS,
            max_legislator_trades: MAX_LEGISLATOR_TRADES,
            max_prior_narratives: MAX_PRIOR_NARRATIVES,
        }
    }
}

/// Assembles a bounded multi-source context for one entity. Every source is
/// optional; a missing or failing source is omitted from the text rather
/// than failing the whole assembly, so the size envelope stays predictable
/// and degraded runs still produce something useful.
pub struct ContextAggregator {
    results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>,
    prices: Option<Arc<dyn PriceHistorySourceTrait + Send + Sync>>,
    basket_mentions: Option<Arc<dyn BasketMentionSourceTrait + Send + Sync>>,
    legislator_trades: Option<Arc<dyn LegislatorTradeSourceTrait + Send + Sync>>,
    technicals: Option<Arc<dyn TechnicalSignalSourceTrait + Send + Sync>>,
    fundamentals: Option<Arc<dyn FundamentalsSourceTrait + Send + Sync>>,
    sentiment: Option<Arc<dyn SentimentSourceTrait + Send + Sync>>,
    config: ContextConfig,
}

impl ContextAggregator {
    pub fn new(results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>) -> Self {
        Self {
            results,
            prices: None,
            basket_mentions: None,
            legislator_trades: None,
            technicals: None,
            fundamentals: None,
            sentiment: None,
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_price_history(
        mut self,
        source: Arc<dyn PriceHistorySourceTrait + Send + Sync>,
    ) -> Self {
        self.prices = Some(source);
        self
    }

    pub fn with_basket_mentions(
        mut self,
        source: Arc<dyn BasketMentionSourceTrait + Send + Sync>,
    ) -> Self {
        self.basket_mentions = Some(source);
        self
    }

    pub fn with_legislator_trades(
        mut self,
        source: Arc<dyn LegislatorTradeSourceTrait + Send + Sync>,
    ) -> Self {
        self.legislator_trades = Some(source);
        self
    }

    pub fn with_technicals(
        mut self,
        source: Arc<dyn TechnicalSignalSourceTrait + Send + Sync>,
    ) -> Self {
        self.technicals = Some(source);
        self
    }

    pub fn with_fundamentals(
        mut self,
        source: Arc<dyn FundamentalsSourceTrait + Send + Sync>,
    ) -> Self {
        self.fundamentals = Some(source);
        self
    }

    pub fn with_sentiment(mut self, source: Arc<dyn SentimentSourceTrait + Send + Sync>) -> Self {
        self.sentiment = Some(source);
        self
    }

    pub async fn build_context(
        &self,
        kind: AnalysisKind,
        entity_key: &str,
        as_of: NaiveDate,
    ) -> Result<AssembledContext> {
        let from = as_of - Duration::days(self.config.lookback_days);
        let mut text = String::new();
        let mut counts = SourceCounts::default();

        let _ = writeln!(
            text,
            "# Entity: {} ({})\n# Window: {} to {}\n",
            entity_key,
            kind.as_str(),
            from,
            as_of
        );

        self.append_fundamentals(entity_key, &mut text, &mut counts)
            .await;
        self.append_prices(entity_key, from, as_of, &mut text, &mut counts)
            .await;
        self.append_basket_mentions(entity_key, from, as_of, &mut text, &mut counts)
            .await;
        self.append_legislator_trades(entity_key, from, as_of, &mut text, &mut counts)
            .await;
        self.append_technicals(entity_key, &mut text, &mut counts)
            .await;
        self.append_sentiment(entity_key, from, as_of, &mut text, &mut counts)
            .await;
        self.append_prior_narratives(entity_key, kind, &mut text, &mut counts);

        Ok(AssembledContext {
            entity_key: entity_key.to_string(),
            as_of,
            text,
            source_counts: counts,
        })
    }

    async fn append_fundamentals(
        &self,
        entity_key: &str,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.fundamentals else {
            return;
        };
        match source.profile(entity_key).await {
            Ok(Some(profile)) => {
                counts.fundamentals = 1;
                let _ = writeln!(text, "## Fundamentals");
                let _ = writeln!(text, "Name: {}", profile.name);
                if let Some(sector) = &profile.sector {
                    let _ = writeln!(text, "Sector: {}", sector);
                }
                if let Some(cap) = profile.market_cap {
                    let _ = writeln!(text, "Market cap: {}", cap);
                }
                if let Some(pe) = profile.pe_ratio {
                    let _ = writeln!(text, "P/E: {}", pe);
                }
                text.push('\n');
            }
            Ok(None) => {}
            Err(e) => warn!("Fundamentals source failed for {}: {}", entity_key, e),
        }
    }

    async fn append_prices(
        &self,
        entity_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.prices else {
            return;
        };
        match source.daily_closes(entity_key, from, to).await {
            Ok(points) if !points.is_empty() => {
                let capped: Vec<&PricePoint> = points
                    .iter()
                    .rev()
                    .take(self.config.max_price_points)
                    .collect();
                counts.price_points = capped.len();
                let _ = writeln!(text, "## Price history (most recent first)");
                for point in capped {
                    let _ = writeln!(text, "{}: {}", point.date, point.close);
                }
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => warn!("Price source failed for {}: {}", entity_key, e),
        }
    }

    async fn append_basket_mentions(
        &self,
        entity_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.basket_mentions else {
            return;
        };
        match source
            .mentions(entity_key, from, to, self.config.max_basket_mentions)
            .await
        {
            Ok(mentions) if !mentions.is_empty() => {
                let capped: Vec<&BasketMention> = mentions
                    .iter()
                    .take(self.config.max_basket_mentions)
                    .collect();
                counts.basket_mentions = capped.len();
                let _ = writeln!(text, "## Basket activity");
                for m in capped {
                    let _ = writeln!(
                        text,
                        "{}: {} {} ({} shares, {}%)",
                        m.as_of, m.basket_id, m.action, m.share_delta, m.percent_delta
                    );
                }
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => warn!("Basket mention source failed for {}: {}", entity_key, e),
        }
    }

    async fn append_legislator_trades(
        &self,
        entity_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.legislator_trades else {
            return;
        };
        match source
            .trades(entity_key, from, to, self.config.max_legislator_trades)
            .await
        {
            Ok(trades) if !trades.is_empty() => {
                let capped: Vec<&LegislatorTrade> = trades
                    .iter()
                    .take(self.config.max_legislator_trades)
                    .collect();
                counts.legislator_trades = capped.len();
                let _ = writeln!(text, "## Legislator trades");
                for t in capped {
                    let _ = writeln!(
                        text,
                        "{}: {} ({}) {} {}",
                        t.as_of,
                        t.legislator,
                        t.chamber.as_deref().unwrap_or("-"),
                        t.action,
                        t.amount_range.as_deref().unwrap_or("")
                    );
                }
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => warn!("Legislator trade source failed for {}: {}", entity_key, e),
        }
    }

    async fn append_technicals(
        &self,
        entity_key: &str,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.technicals else {
            return;
        };
        match source.latest(entity_key).await {
            Ok(Some(snapshot)) => {
                counts.technical_signals = 1;
                let _ = writeln!(text, "## Technical signals ({})", snapshot.as_of);
                if let Some(rsi) = snapshot.rsi_14 {
                    let _ = writeln!(text, "RSI(14): {}", rsi);
                }
                if let Some(sma) = snapshot.sma_50 {
                    let _ = writeln!(text, "SMA(50): {}", sma);
                }
                if let Some(sma) = snapshot.sma_200 {
                    let _ = writeln!(text, "SMA(200): {}", sma);
                }
                if let Some(macd) = snapshot.macd {
                    let _ = writeln!(text, "MACD: {}", macd);
                }
                text.push('\n');
            }
            Ok(None) => {}
            Err(e) => warn!("Technical source failed for {}: {}", entity_key, e),
        }
    }

    async fn append_sentiment(
        &self,
        entity_key: &str,
        from: NaiveDate,
        to: NaiveDate,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        let Some(source) = &self.sentiment else {
            return;
        };
        match source.aggregate(entity_key, from, to).await {
            Ok(Some(aggregate)) => {
                counts.sentiment_points = aggregate.article_count.max(0) as usize;
                let _ = writeln!(text, "## Aggregated sentiment");
                let _ = writeln!(
                    text,
                    "Average score {} across {} articles",
                    aggregate.average_score, aggregate.article_count
                );
                text.push('\n');
            }
            Ok(None) => {}
            Err(e) => warn!("Sentiment source failed for {}: {}", entity_key, e),
        }
    }

    fn append_prior_narratives(
        &self,
        entity_key: &str,
        kind: AnalysisKind,
        text: &mut String,
        counts: &mut SourceCounts,
    ) {
        match self.results.recent_for_entity(
            entity_key,
            kind,
            self.config.max_prior_narratives as i64,
        ) {
            Ok(results) if !results.is_empty() => {
                counts.prior_narratives = results.len();
                let _ = writeln!(text, "## Prior analysis excerpts");
                for result in results {
                    let _ = writeln!(
                        text,
                        "{} [{}]: {}",
                        result.as_of,
                        result.sentiment.as_str(),
                        result.summary
                    );
                }
                text.push('\n');
            }
            Ok(_) => {}
            Err(e) => warn!("Prior narrative lookup failed for {}: {}", entity_key, e),
        }
    }
}
