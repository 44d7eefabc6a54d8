use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use market_sentiment::data::{FileDataSource, MarketDataCache, MemoryDataSource, TimeSeries};
use market_sentiment::{
    Indicator, IndicatorScorer, SentimentConfig, SentimentLabel, SentimentPipeline,
};

const DAYS: usize = 600;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
}

/// Geometric path from `from` to `to` over DAYS observations.
fn geometric(from: f64, to: f64) -> Vec<(NaiveDate, f64)> {
    let growth = (to / from).powf(1.0 / (DAYS - 1) as f64);
    (0..DAYS)
        .map(|i| (start() + Duration::days(i as i64), from * growth.powi(i as i32)))
        .collect()
}

fn wavy(level: f64, amplitude: f64) -> Vec<(NaiveDate, f64)> {
    (0..DAYS)
        .map(|i| {
            let x = i as f64;
            (
                start() + Duration::days(i as i64),
                level + amplitude * (x * 0.11).sin() + 0.01 * x,
            )
        })
        .collect()
}

#[test]
fn rising_spy_scores_extreme_greed() {
    let spy = TimeSeries::new("SPY", geometric(100.0, 200.0));
    let score = IndicatorScorer::default().score_spy_trend(&spy);

    // 125-day average plus a 365-day rank window
    assert_eq!(score.scores.len(), DAYS - 124 - 364);

    let latest = score.latest.unwrap();
    assert_eq!(latest.date, spy.latest().unwrap().date);
    assert!((latest.score - 100.0).abs() < 1e-9);
    assert_eq!(latest.label, SentimentLabel::ExtremeGreed);
}

#[test]
fn pipeline_over_memory_source() {
    let source = MemoryDataSource::new()
        .with_prices("SPY", TimeSeries::new("SPY", geometric(100.0, 200.0)))
        .with_prices("^VIX", TimeSeries::new("^VIX", wavy(20.0, 4.0)))
        .with_prices("IEF", TimeSeries::new("IEF", wavy(95.0, 1.5)))
        .with_prices("IVW", TimeSeries::new("IVW", geometric(60.0, 150.0)))
        .with_prices("IVE", TimeSeries::new("IVE", geometric(140.0, 160.0)));

    let pipeline = SentimentPipeline::new(SentimentConfig::default()).unwrap();
    let mut cache = MarketDataCache::default();
    let now = Utc.with_ymd_and_hms(2023, 9, 1, 16, 0, 0).unwrap();
    let report = pipeline.run(&source, &mut cache, now, None).unwrap();

    let trend = report.indicator(Indicator::SpyTrend).unwrap().latest.unwrap();
    assert_eq!(trend.label, SentimentLabel::ExtremeGreed);

    for score in &report.indicators {
        assert!(score.latest.is_some(), "{} unscored", score.indicator.name());
    }
    for point in report.composite.scores.points() {
        assert!((0.0..=100.0).contains(&point.value));
    }
    assert!(report.composite.latest.is_some());
    assert!(report.put_call.is_none());
}

#[test]
fn pipeline_over_csv_files() {
    let dir: PathBuf =
        std::env::temp_dir().join(format!("market-sentiment-e2e-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("options")).unwrap();

    let write_csv = |stem: &str, rows: Vec<(NaiveDate, f64)>| {
        let mut text = String::from("date,close\n");
        for (date, close) in rows {
            text.push_str(&format!("{},{}\n", date, close));
        }
        fs::write(dir.join(format!("{}.csv", stem)), text).unwrap();
    };
    write_csv("SPY", geometric(100.0, 200.0));
    write_csv("VIX", wavy(20.0, 4.0));
    write_csv("IEF", wavy(95.0, 1.5));
    write_csv("IVW", geometric(60.0, 150.0));
    write_csv("IVE", geometric(140.0, 160.0));

    fs::write(
        dir.join("options").join("SPY.json"),
        r#"{
            "date": "2023-08-25",
            "ticker": "SPY",
            "underlying_price": 200,
            "chains": [
                {
                    "expiration": "2023-09-01",
                    "calls": [
                        {"strike": 200, "volume": 900, "open_interest": 4000, "implied_volatility": 0.15},
                        {"strike": 225, "volume": 300, "open_interest": 2000, "implied_volatility": 0.13}
                    ],
                    "puts": [
                        {"strike": 200, "volume": 1300, "open_interest": 3000, "implied_volatility": 0.16},
                        {"strike": 170, "volume": 500, "open_interest": 2500, "implied_volatility": 0.24}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    let pipeline = SentimentPipeline::new(SentimentConfig::default()).unwrap();
    let mut cache = MarketDataCache::default();
    let now = Utc.with_ymd_and_hms(2023, 9, 1, 16, 0, 0).unwrap();
    let report = pipeline
        .run(&FileDataSource::new(&dir), &mut cache, now, None)
        .unwrap();

    let trend = report.indicator(Indicator::SpyTrend).unwrap().latest.unwrap();
    assert!((trend.score - 100.0).abs() < 1e-9);

    let put_call = report.put_call.as_ref().unwrap();
    assert!(put_call.avg_volume_ratio > 1.0);
    assert!(put_call.avg_oi_ratio < 1.0);

    let skew = report.skew.as_ref().unwrap();
    assert_eq!(skew.expirations.len(), 1);
    assert!((skew.avg_tail_skew - 0.24 / 0.13).abs() < 1e-9);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"composite\""));

    fs::remove_dir_all(&dir).unwrap();
}
