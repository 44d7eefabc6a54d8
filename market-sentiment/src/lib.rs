pub mod appendix;
pub mod config;
pub mod data;
pub mod options;
pub mod pipeline;
pub mod sentiment;
pub mod stats;

// Re-export commonly used types
pub use appendix::{AppendixConfig, CorrelationStudy, ForwardReturnStudy, RecoveryStudy};
pub use config::{ConfigError, OptionsConfig, SentimentConfig, TickerConfig};
pub use data::{
    CacheConfig, FileDataSource, LoaderError, MarketDataCache, MarketDataSource, MemoryDataSource,
    OptionsSnapshot, TimeSeries,
};
pub use options::{OptionsQuadrant, PutCallAnalyzer, SkewAnalyzer, SkewDiagnostic};
pub use pipeline::{MarketInputs, PipelineError, SentimentPipeline, SentimentReport};
pub use sentiment::{
    CompositeAggregator, CompositeScore, Indicator, IndicatorConfig, IndicatorScorer,
    SentimentLabel, ThresholdTable,
};
