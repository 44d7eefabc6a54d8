pub mod cache;
pub mod loader;
pub mod types;

pub use cache::{CacheConfig, CacheEntry, CacheKey, MarketDataCache};
pub use loader::{
    sanitize_ticker, FileDataSource, LoaderError, MarketDataSource, MemoryDataSource,
    EXPECTED_PRICE_COLUMNS,
};
pub use types::{Observation, OptionContract, OptionType, OptionsChain, OptionsSnapshot, TimeSeries};
