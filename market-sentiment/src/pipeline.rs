//! End-to-end sentiment run.
//!
//! Loads every input through the cache, scores the four indicators, builds the
//! composite, analyzes the option chain and computes the appendix studies.
//! Scoring itself is pure: `score` turns `MarketInputs` into a
//! `SentimentReport` without touching the data source.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::appendix::{CorrelationStudy, ForwardReturnStudy, RecoveryStudy};
use crate::config::{ConfigError, SentimentConfig};
use crate::data::{
    CacheKey, LoaderError, MarketDataCache, MarketDataSource, OptionsSnapshot, TimeSeries,
};
use crate::options::{PutCallAnalyzer, PutCallSummary, SkewAnalyzer, SkewCurve, SkewSummary};
use crate::sentiment::{
    CompositeAggregator, CompositeScore, Indicator, IndicatorScore, IndicatorScorer,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load {ticker}: {source}")]
    Load {
        ticker: String,
        #[source]
        source: LoaderError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Raw inputs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInputs {
    pub spy: TimeSeries,
    pub vix: TimeSeries,
    pub treasury: TimeSeries,
    pub growth: TimeSeries,
    pub value: TimeSeries,
    /// Missing when the snapshot could not be loaded.
    pub options: Option<OptionsSnapshot>,
}

/// Appendix datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendixReport {
    pub correlation: CorrelationStudy,
    pub recovery: RecoveryStudy,
    pub forward_returns: ForwardReturnStudy,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    /// Last date with a composite score.
    pub as_of: Option<NaiveDate>,
    pub indicators: Vec<IndicatorScore>,
    pub composite: CompositeScore,
    pub put_call: Option<PutCallSummary>,
    pub skew: Option<SkewSummary>,
    pub skew_curves: Vec<SkewCurve>,
    pub appendix: AppendixReport,
}

impl SentimentReport {
    pub fn indicator(&self, indicator: Indicator) -> Option<&IndicatorScore> {
        self.indicators.iter().find(|s| s.indicator == indicator)
    }
}

/// Runs the full scoring pipeline.
#[derive(Debug, Clone)]
pub struct SentimentPipeline {
    config: SentimentConfig,
}

impl SentimentPipeline {
    pub fn new(config: SentimentConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    /// First date of the history window ending at `end`.
    pub fn history_start(&self, end: NaiveDate) -> NaiveDate {
        let months = Months::new(self.config.tickers.history_years.saturating_mul(12));
        end.checked_sub_months(months).unwrap_or(NaiveDate::MIN)
    }

    /// Load inputs through the cache and score them.
    ///
    /// `as_of` truncates every series; it defaults to `now`'s date.
    pub fn run(
        &self,
        source: &dyn MarketDataSource,
        cache: &mut MarketDataCache<MarketInputs>,
        now: DateTime<Utc>,
        as_of: Option<NaiveDate>,
    ) -> Result<SentimentReport, PipelineError> {
        let end = as_of.unwrap_or_else(|| now.date_naive());
        let start = self.history_start(end);

        let tickers = &self.config.tickers;
        let mut key_tickers = tickers.price_tickers();
        let options_key = format!("options:{}", tickers.options);
        key_tickers.push(&options_key);
        let key = CacheKey::new(&key_tickers, format!("start={};end={}", start, end));

        let inputs = cache.get_or_try_fetch(key, now, || self.load_inputs(source, start, end))?;
        Ok(self.score(&inputs))
    }

    /// Fetch every input from the source.
    ///
    /// Price failures abort the run; an options failure only empties the
    /// options sections.
    pub fn load_inputs(
        &self,
        source: &dyn MarketDataSource,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketInputs, PipelineError> {
        let tickers = &self.config.tickers;
        let load = |ticker: &str| -> Result<TimeSeries, PipelineError> {
            let series = source
                .price_series(ticker, Some(start))
                .map_err(|source| PipelineError::Load {
                    ticker: ticker.to_string(),
                    source,
                })?
                .until(end);
            debug!("{}: {} closes in {}..={}", ticker, series.len(), start, end);
            Ok(series)
        };

        let spy = load(&tickers.spy)?;
        let vix = load(&tickers.vix)?;
        let treasury = load(&tickers.treasury)?;
        let growth = load(&tickers.growth)?;
        let value = load(&tickers.value)?;

        let options = match source.options_snapshot(&tickers.options) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Options snapshot for {} unavailable: {}", tickers.options, e);
                None
            }
        };

        info!(
            "Loaded inputs: {} SPY closes, options {}",
            spy.len(),
            if options.is_some() { "present" } else { "missing" }
        );

        Ok(MarketInputs {
            spy,
            vix,
            treasury,
            growth,
            value,
            options,
        })
    }

    /// Score loaded inputs.
    pub fn score(&self, inputs: &MarketInputs) -> SentimentReport {
        let scorer = IndicatorScorer::new(self.config.indicators.clone());
        let indicators = vec![
            scorer.score_spy_trend(&inputs.spy),
            scorer.score_volatility(&inputs.vix),
            scorer.score_safe_haven(&inputs.spy, &inputs.treasury),
            scorer.score_growth_value(&inputs.spy, &inputs.growth, &inputs.value),
        ];

        for score in &indicators {
            match &score.latest {
                Some(latest) => debug!(
                    "{}: {:.1} ({}) on {}",
                    score.indicator.name(),
                    latest.score,
                    latest.label,
                    latest.date
                ),
                None => warn!("{}: not enough history to score", score.indicator.name()),
            }
        }

        let refs: Vec<&IndicatorScore> = indicators.iter().collect();
        let composite = CompositeAggregator::new().aggregate(&refs);
        if let Some(latest) = &composite.latest {
            info!(
                "Composite sentiment {:.1} ({}) on {}",
                latest.score, latest.label, latest.date
            );
        }

        let options_config = &self.config.options;
        let put_call_analyzer = PutCallAnalyzer::new(options_config.put_call.clone());
        let skew_analyzer = SkewAnalyzer::new(options_config.skew.clone());
        let (put_call, skew, skew_curves) = match &inputs.options {
            Some(snapshot) => (
                put_call_analyzer.analyze(snapshot),
                skew_analyzer.analyze(snapshot),
                skew_analyzer.curves(snapshot),
            ),
            None => (None, None, Vec::new()),
        };

        let appendix = self.appendix(&composite, &inputs.spy);

        SentimentReport {
            as_of: composite.latest.map(|l| l.date),
            indicators,
            composite,
            put_call,
            skew,
            skew_curves,
            appendix,
        }
    }

    fn appendix(&self, composite: &CompositeScore, spy: &TimeSeries) -> AppendixReport {
        let config = &self.config.appendix;
        let recovery = RecoveryStudy::compute(
            &composite.scores,
            config.extreme_fear_threshold,
            config.neutral_threshold,
        );
        debug!(
            "Recovery study: {} entries, {} unrecovered",
            recovery.entries(),
            recovery.unrecovered
        );

        AppendixReport {
            correlation: CorrelationStudy::compute(
                &composite.scores,
                spy,
                config.correlation_window,
            ),
            recovery,
            forward_returns: ForwardReturnStudy::compute(spy, &composite.labels, &config.horizons),
        }
    }
}
