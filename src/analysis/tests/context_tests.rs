#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    use crate::analysis::analysis_model::{AnalysisResult, ParsedAnalysis, Sentiment, SourceCounts};
    use crate::analysis::context_aggregator::{
        ContextAggregator, ContextConfig, FundamentalsSourceTrait, PriceHistorySourceTrait,
    };
    use crate::analysis::context_model::{FundamentalsSummary, PricePoint};
    use crate::analysis::results_repository::{
        AnalysisResultRepository, AnalysisResultRepositoryTrait,
    };
    use crate::analysis::{AnalysisError, Result};
    use crate::db::create_test_pool;
    use crate::queue::AnalysisKind;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn results_repo() -> Arc<AnalysisResultRepository> {
        Arc::new(AnalysisResultRepository::new(create_test_pool()))
    }

    struct StubPrices {
        days: usize,
        fail: bool,
    }

    #[async_trait]
    impl PriceHistorySourceTrait for StubPrices {
        async fn daily_closes(
            &self,
            _symbol: &str,
            _from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<PricePoint>> {
            if self.fail {
                return Err(AnalysisError::ContextError(
                    "price backend unavailable".to_string(),
                ));
            }
            Ok((0..self.days)
                .map(|i| PricePoint {
                    date: to - chrono::Duration::days((self.days - 1 - i) as i64),
                    close: dec!(100) + rust_decimal::Decimal::from(i as i64),
                })
                .collect())
        }
    }

    struct StubFundamentals;

    #[async_trait]
    impl FundamentalsSourceTrait for StubFundamentals {
        async fn profile(&self, _symbol: &str) -> Result<Option<FundamentalsSummary>> {
            Ok(Some(FundamentalsSummary {
                name: "Nvidia Corp".to_string(),
                sector: Some("Semiconductors".to_string()),
                market_cap: Some(dec!(3000000000000)),
                pe_ratio: Some(dec!(55.2)),
            }))
        }
    }

    #[tokio::test]
    async fn bare_aggregator_produces_header_only() {
        let aggregator = ContextAggregator::new(results_repo());

        let context = aggregator
            .build_context(AnalysisKind::Instrument, "NVDA", as_of())
            .await
            .unwrap();

        assert!(context.text.contains("# Entity: NVDA (INSTRUMENT)"));
        assert!(!context.text.contains("##"));
        assert_eq!(context.source_counts, SourceCounts::default());
    }

    #[tokio::test]
    async fn price_points_are_capped_to_the_configured_maximum() {
        let aggregator = ContextAggregator::new(results_repo())
            .with_config(ContextConfig {
                max_price_points: 5,
                ..ContextConfig::default()
            })
            .with_price_history(Arc::new(StubPrices {
                days: 200,
                fail: false,
            }));

        let context = aggregator
            .build_context(AnalysisKind::Instrument, "NVDA", as_of())
            .await
            .unwrap();

        assert_eq!(context.source_counts.price_points, 5);
        // Most recent day first.
        assert!(context.text.contains("2026-08-24: 299"));
        assert!(!context.text.contains("2026-08-19"));
    }

    #[tokio::test]
    async fn failing_source_is_omitted_without_failing_assembly() {
        let aggregator = ContextAggregator::new(results_repo())
            .with_price_history(Arc::new(StubPrices {
                days: 0,
                fail: true,
            }))
            .with_fundamentals(Arc::new(StubFundamentals));

        let context = aggregator
            .build_context(AnalysisKind::Instrument, "NVDA", as_of())
            .await
            .unwrap();

        assert_eq!(context.source_counts.price_points, 0);
        assert!(!context.text.contains("## Price history"));
        assert!(context.text.contains("## Fundamentals"));
        assert!(context.text.contains("Sector: Semiconductors"));
    }

    #[tokio::test]
    async fn prior_narratives_come_from_the_results_store() {
        let repo = results_repo();
        for (offset, summary) in [(2, "Earlier read."), (1, "Later read.")] {
            repo.upsert(AnalysisResult::from_parsed(
                "NVDA",
                AnalysisKind::Instrument,
                as_of() - chrono::Duration::days(offset),
                ParsedAnalysis {
                    sentiment: Sentiment::Neutral,
                    sentiment_score: 0.0,
                    confidence: 0.7,
                    themes: vec![],
                    summary: summary.to_string(),
                    narrative: "n".to_string(),
                },
                "ctx".to_string(),
                None,
                SourceCounts::default(),
            ))
            .unwrap();
        }

        let aggregator = ContextAggregator::new(repo);
        let context = aggregator
            .build_context(AnalysisKind::Instrument, "NVDA", as_of())
            .await
            .unwrap();

        assert_eq!(context.source_counts.prior_narratives, 2);
        assert!(context.text.contains("## Prior analysis excerpts"));
        let later = context.text.find("Later read.").unwrap();
        let earlier = context.text.find("Earlier read.").unwrap();
        assert!(later < earlier, "newest narrative listed first");
    }
}
