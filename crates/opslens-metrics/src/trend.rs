//! Trend classification and seasonality detection

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use opslens_core::{MetricQuery, MetricSeries, ResourceSelector};
use opslens_stats::{autocorrelation, coefficient_of_variation, linear_regression};

use crate::error::MetricsResult;
use crate::series::SeriesFetcher;

/// Standard period lags probed for seasonality, in hours
const SEASONAL_PERIOD_HOURS: [i64; 5] = [1, 4, 12, 24, 168];

/// Fallback sample interval when it cannot be estimated, in seconds
const DEFAULT_SAMPLE_INTERVAL: f64 = 300.0;

/// Behavior category for a metric series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    Volatile,
    Cyclic,
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Trend classification for one datapoint with supporting metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointTrend {
    pub classification: TrendClass,
    pub confidence: f64,
    pub slope_per_hour: f64,
    pub volatility_index: f64,
    pub autocorrelation_24h: f64,
    pub r_squared: f64,
    pub sample_count: usize,
}

/// Trend classification across a resource's datapoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub resource: ResourceSelector,
    pub hours_back: i64,
    pub classifications: BTreeMap<String, DatapointTrend>,
}

/// Seasonality analysis for one datapoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointSeasonality {
    pub is_seasonal: bool,
    /// Period label such as `"24h"` with the strongest autocorrelation
    pub dominant_period: Option<String>,
    pub max_autocorrelation: f64,
    pub correlations: BTreeMap<String, f64>,
    /// Hours of day (0-23) whose mean exceeds the overall mean
    pub peak_hours: Vec<i64>,
    pub sample_count: usize,
}

/// Seasonality analysis across a resource's datapoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityReport {
    pub resource: ResourceSelector,
    pub hours_back: i64,
    pub seasonality: BTreeMap<String, DatapointSeasonality>,
}

fn insufficient(sample_count: usize) -> DatapointTrend {
    DatapointTrend {
        classification: TrendClass::InsufficientData,
        confidence: 0.0,
        slope_per_hour: 0.0,
        volatility_index: 0.0,
        autocorrelation_24h: 0.0,
        r_squared: 0.0,
        sample_count,
    }
}

/// Average spacing between samples in seconds; 0.0 for short series
fn average_interval(series: &MetricSeries) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let span = series.timestamps[series.len() - 1] - series.timestamps[0];
    span as f64 / (series.len() - 1) as f64
}

/// Classify a series as stable, increasing, decreasing, cyclic, or volatile
///
/// Combines the coefficient of variation, the fitted slope against hours,
/// and the autocorrelation at a lag approximating 24 hours.
pub fn classify_datapoint(series: &MetricSeries) -> DatapointTrend {
    if series.len() < 2 {
        return insufficient(series.len());
    }

    let cv = coefficient_of_variation(&series.values);

    let t0 = series.timestamps[0];
    let x_hours: Vec<f64> = series
        .timestamps
        .iter()
        .map(|t| (t - t0) as f64 / 3600.0)
        .collect();
    let Ok(fit) = linear_regression(&x_hours, &series.values) else {
        return insufficient(series.len());
    };

    let avg_interval = average_interval(series);
    let lag_24h = if avg_interval > 0.0 {
        ((86_400.0 / avg_interval) as usize).max(1)
    } else {
        1
    };
    let autocorr = autocorrelation(&series.values, lag_24h);

    let (classification, confidence) = if cv > 0.5 {
        (TrendClass::Volatile, cv.min(1.0))
    } else if autocorr.abs() > 0.7 {
        (TrendClass::Cyclic, autocorr.abs())
    } else if fit.r_squared > 0.5 && fit.slope > 0.0 {
        (TrendClass::Increasing, fit.r_squared)
    } else if fit.r_squared > 0.5 && fit.slope < 0.0 {
        (TrendClass::Decreasing, fit.r_squared)
    } else {
        (TrendClass::Stable, (1.0 - cv).max(0.0))
    };

    DatapointTrend {
        classification,
        confidence,
        slope_per_hour: fit.slope,
        volatility_index: cv,
        autocorrelation_24h: autocorr,
        r_squared: fit.r_squared,
        sample_count: series.len(),
    }
}

/// Probe a series for periodic behavior at standard lags
///
/// Lags that would need more data than half the series are skipped. A series
/// is seasonal when its strongest autocorrelation exceeds 0.5.
pub fn seasonality_of(series: &MetricSeries) -> DatapointSeasonality {
    if series.len() < 4 {
        return DatapointSeasonality {
            is_seasonal: false,
            dominant_period: None,
            max_autocorrelation: 0.0,
            correlations: BTreeMap::new(),
            peak_hours: Vec::new(),
            sample_count: series.len(),
        };
    }

    let avg_interval = {
        let estimated = average_interval(series);
        if estimated > 0.0 {
            estimated
        } else {
            DEFAULT_SAMPLE_INTERVAL
        }
    };

    let mut correlations = BTreeMap::new();
    let mut dominant: Option<(String, f64)> = None;
    for ph in SEASONAL_PERIOD_HOURS {
        let lag = (ph as f64 * 3600.0 / avg_interval) as usize;
        if lag < 1 || lag >= series.len() / 2 {
            continue;
        }
        let ac = autocorrelation(&series.values, lag);
        let label = format!("{ph}h");
        correlations.insert(label.clone(), ac);
        match &dominant {
            Some((_, best)) if *best >= ac => {}
            _ => dominant = Some((label, ac)),
        }
    }

    let (dominant_period, max_autocorrelation, is_seasonal) = match dominant {
        Some((label, ac)) => (Some(label), ac, ac > 0.5),
        None => (None, 0.0, false),
    };

    // Bin samples by hour of day to find hours running above the overall mean
    let mut hourly_bins: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (value, ts) in series.values.iter().zip(&series.timestamps) {
        let hour = (ts.rem_euclid(86_400)) / 3600;
        hourly_bins.entry(hour).or_default().push(*value);
    }
    let overall_mean = series.values.iter().sum::<f64>() / series.len() as f64;
    let peak_hours: Vec<i64> = hourly_bins
        .iter()
        .filter(|(_, values)| values.iter().sum::<f64>() / values.len() as f64 > overall_mean)
        .map(|(hour, _)| *hour)
        .collect();

    DatapointSeasonality {
        is_seasonal,
        dominant_period,
        max_autocorrelation,
        correlations,
        peak_hours,
        sample_count: series.len(),
    }
}

/// Fetches series and classifies trends and seasonality
pub struct TrendAnalyzer {
    fetcher: SeriesFetcher,
}

impl TrendAnalyzer {
    pub fn new(metrics: Arc<dyn MetricQuery>) -> Self {
        Self {
            fetcher: SeriesFetcher::new(metrics),
        }
    }

    /// Classify each datapoint's behavior over the trailing window
    pub async fn classify_trends(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
    ) -> MetricsResult<TrendReport> {
        let series_map = self
            .fetcher
            .fetch_window(resource, datapoints, hours_back)
            .await?;

        let classifications: BTreeMap<String, DatapointTrend> = series_map
            .iter()
            .map(|(name, series)| (name.clone(), classify_datapoint(series)))
            .collect();

        debug!(
            device_id = resource.device_id,
            datapoints = classifications.len(),
            "trend classification complete"
        );

        Ok(TrendReport {
            resource: *resource,
            hours_back,
            classifications,
        })
    }

    /// Probe each datapoint for periodic behavior over the trailing window
    pub async fn detect_seasonality(
        &self,
        resource: &ResourceSelector,
        datapoints: Option<&str>,
        hours_back: i64,
    ) -> MetricsResult<SeasonalityReport> {
        let series_map = self
            .fetcher
            .fetch_window(resource, datapoints, hours_back)
            .await?;

        let seasonality = series_map
            .iter()
            .map(|(name, series)| (name.clone(), seasonality_of(series)))
            .collect();

        Ok(SeasonalityReport {
            resource: *resource,
            hours_back,
            seasonality,
        })
    }
}
