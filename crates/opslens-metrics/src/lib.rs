//! Metric-series analytics for OpsLens
//!
//! Converts raw row-major metric payloads into per-datapoint columnar series
//! and runs the series-level analyses: z-score anomaly scanning, threshold
//! breach forecasting, CUSUM changepoint mapping, trend classification, and
//! seasonality detection.

pub mod anomaly;
pub mod error;
pub mod forecast;
pub mod series;
pub mod trend;

pub use anomaly::{detect_anomalies, AnomalyReport, AnomalyScanner, MetricAnomaly};
pub use error::{MetricsError, MetricsResult};
pub use forecast::{
    forecast_datapoint, timed_change_points, BreachForecastReport, ChangePointReport,
    DatapointForecast, ForecastEngine, Trend,
};
pub use series::{columnar_series, SeriesFetcher};
pub use trend::{
    classify_datapoint, seasonality_of, DatapointSeasonality, DatapointTrend, SeasonalityReport,
    TrendAnalyzer, TrendClass, TrendReport,
};
