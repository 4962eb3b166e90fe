//! Configuration types for the interaction-analysis agent.

use serde::{Deserialize, Serialize};

/// Main configuration for the interaction-analysis agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionAnalysisConfig {
    /// Collection session settings
    pub session: SessionConfig,

    /// Per-detector enable flags
    pub detection: DetectionToggles,

    /// Central-click detector thresholds
    pub central_click: CentralClickConfig,

    /// No-movement-before-click detector thresholds
    pub no_movement: NoMovementConfig,

    /// Non-human scroll detector thresholds
    pub scroll: ScrollConfig,

    /// Artificial-timing detector thresholds
    pub timing: TimingConfig,

    /// Missing-trail detector thresholds
    pub missing_trail: MissingTrailConfig,

    /// Indicator store settings
    pub indicator: IndicatorConfig,

    /// Clickability cache settings
    pub cache: CacheConfig,

    /// Stamp indicator detail payloads with the producing detector and
    /// its emit threshold
    pub debug_detail: bool,
}

impl Default for InteractionAnalysisConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            detection: DetectionToggles::default(),
            central_click: CentralClickConfig::default(),
            no_movement: NoMovementConfig::default(),
            scroll: ScrollConfig::default(),
            timing: TimingConfig::default(),
            missing_trail: MissingTrailConfig::default(),
            indicator: IndicatorConfig::default(),
            cache: CacheConfig::default(),
            debug_detail: false,
        }
    }
}

/// Collection session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Default capture window when the host does not pass one, in ms
    pub default_duration_ms: u64,

    /// Granularity of the duration-bounded wait, in ms
    pub poll_interval_ms: u64,

    /// Element id (or selector fragment) of the control that starts
    /// tracking; the first click on it is exempt from analysis
    pub start_control_id: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 10_000,
            poll_interval_ms: 100,
            start_control_id: Some("start-tracking".to_string()),
        }
    }
}

/// Per-detector enable flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionToggles {
    pub central_click: bool,
    pub no_movement: bool,
    pub scroll: bool,
    pub timing: bool,
    pub missing_trail: bool,
}

impl Default for DetectionToggles {
    fn default() -> Self {
        Self {
            central_click: true,
            no_movement: true,
            scroll: true,
            timing: true,
            missing_trail: true,
        }
    }
}

/// Central-click detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralClickConfig {
    /// Max distance from element center to count as central, in px
    pub center_threshold_px: f64,

    /// Central clicks needed for full confidence
    pub min_samples: u32,

    /// Minimum confidence to emit the indicator
    pub confidence_threshold: f64,

    /// How many recent clicks the pattern is computed over
    pub pattern_window: usize,

    /// Additional id/class patterns treated as clickable
    pub extra_clickable_patterns: Vec<String>,
}

impl Default for CentralClickConfig {
    fn default() -> Self {
        Self {
            center_threshold_px: 2.0,
            min_samples: 3,
            confidence_threshold: 0.8,
            pattern_window: 10,
            extra_clickable_patterns: vec![],
        }
    }
}

/// No-movement-before-click detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoMovementConfig {
    /// Lookback window before each click, in ms
    pub time_threshold_ms: u64,

    /// Max cumulative path length still considered "minimal", in px
    pub minimal_path_px: f64,
}

impl Default for NoMovementConfig {
    fn default() -> Self {
        Self {
            time_threshold_ms: 1000,
            minimal_path_px: 5.0,
        }
    }
}

/// Non-human scroll detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Inter-event timing regularity above which scrolling is flagged
    pub timing_regularity_threshold: f64,

    /// Velocity regularity above which scrolling is flagged.
    /// Far lower than the timing threshold: human scroll velocity is
    /// inherently more uniform than human timing, so any above-baseline
    /// uniformity is already suspicious. The two are separately tunable.
    pub velocity_variance_threshold: f64,

    /// Minimum confidence to emit the indicator
    pub confidence_threshold: f64,

    /// Samples required before the detector runs
    pub min_samples: usize,

    /// How many recent samples the analysis is computed over
    pub window: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            timing_regularity_threshold: 0.9,
            velocity_variance_threshold: 0.1,
            confidence_threshold: 0.75,
            min_samples: 10,
            window: 20,
        }
    }
}

/// Artificial-timing detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Inter-click regularity above which timing is flagged
    pub regularity_threshold: f64,

    /// Variance floor below which timing is flagged, in ms^2.
    /// Genuine human timing carries natural jitter above this.
    pub human_variance_min: f64,

    /// Minimum confidence to emit the indicator
    pub confidence_threshold: f64,

    /// Click timestamps required before the detector runs
    pub min_samples: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            regularity_threshold: 0.85,
            human_variance_min: 50.0,
            confidence_threshold: 0.8,
            min_samples: 5,
        }
    }
}

/// Missing-trail detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingTrailConfig {
    /// Suppression window after tracking starts, in ms
    pub warmup_ms: u64,

    /// Clicks that must be observed before the detector runs
    pub min_clicks: u64,

    /// Minimum composed confidence to emit the indicator
    pub confidence_threshold: f64,

    /// Pointer samples expected in the 3s window during normal use
    pub expected_min_activity: usize,
}

impl Default for MissingTrailConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 2000,
            min_clicks: 2,
            confidence_threshold: 0.7,
            expected_min_activity: 3,
        }
    }
}

/// Indicator store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Detail samples retained per indicator, most recent first
    pub max_details: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { max_details: 10 }
    }
}

/// Clickability cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Selector -> clickability cache size
    pub clickability_cache_size: u64,

    /// Selector -> clickability cache TTL in seconds
    pub clickability_cache_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            clickability_cache_size: 1_000,
            clickability_cache_ttl_seconds: 300,
        }
    }
}
