//! Central-click detector.
//!
//! Pixel-perfect clicks on the geometric center of a control are cheap for
//! a driver that computes the target rect and expensive for a hand on a
//! mouse. One central click means nothing; a run of them does.

use super::{Detection, Detector, Trigger, CENTRAL_BUTTON_CLICKS};
use crate::cache::DetectionCache;
use crate::config::{CacheConfig, CentralClickConfig};
use crate::error::DetectionError;
use crate::events::ClickEvent;
use crate::history::SampleHistory;
use regex::Regex;
use serde_json::json;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

/// Tags that are interactive by nature.
static CLICKABLE_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "a", "button", "input", "select", "option", "textarea", "label", "summary",
    ])
});

/// Roles that make any element interactive.
static CLICKABLE_ROLES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from(["button", "link", "tab", "menuitem", "option", "checkbox", "switch"])
});

/// id/class fragments that conventionally mark interactive elements.
static CLICKABLE_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bbtn\b",
        r"(?i)button",
        r"(?i)submit",
        r"(?i)\blink\b",
        r"(?i)\bnav\b",
        r"(?i)menu",
        r"(?i)\btab\b",
        r"(?i)click",
        r"(?i)action",
        r"(?i)\bcta\b",
        r"(?i)toggle",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Central-click detector.
pub struct CentralClickDetector {
    config: CentralClickConfig,
    /// Config-supplied additions to the lexical ladder step.
    extra_patterns: Vec<Regex>,
    /// Selector -> clickability verdict, so the ladder runs once per target.
    clickability_cache: DetectionCache<String, bool>,
}

impl CentralClickDetector {
    /// Create a new central-click detector, compiling any extra patterns.
    pub fn new(config: CentralClickConfig, cache: &CacheConfig) -> Result<Self, DetectionError> {
        let extra_patterns = config
            .extra_clickable_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            extra_patterns,
            clickability_cache: DetectionCache::new(
                "clickability",
                cache.clickability_cache_size,
                Duration::from_secs(cache.clickability_cache_ttl_seconds),
            ),
        })
    }

    /// Layered clickability heuristic.
    ///
    /// Explicit flag, then tag allow-list, then attribute/role hints, then
    /// lexical id/class match, then a tag parsed out of the selector. Each
    /// rung only runs when the previous ones were inconclusive.
    pub fn is_clickable_target(&self, click: &ClickEvent) -> bool {
        if let Some(explicit) = click.element.is_clickable {
            return explicit;
        }

        if let Some(selector) = &click.target_selector {
            if let Some(cached) = self.clickability_cache.get(selector) {
                return cached;
            }
        }

        let verdict = self.run_ladder(click);

        if let Some(selector) = &click.target_selector {
            self.clickability_cache.insert(selector.clone(), verdict);
        }
        verdict
    }

    fn run_ladder(&self, click: &ClickEvent) -> bool {
        let element = &click.element;

        if let Some(tag) = &element.tag {
            if CLICKABLE_TAGS.contains(tag.to_lowercase().as_str()) {
                return true;
            }
        }

        if element.attributes.contains_key("onclick")
            || element.attributes.contains_key("tabindex")
            || element.attributes.contains_key("href")
        {
            return true;
        }
        if let Some(role) = element.attributes.get("role") {
            if CLICKABLE_ROLES.contains(role.to_lowercase().as_str()) {
                return true;
            }
        }

        let name = format!(
            "{} {}",
            element.id.as_deref().unwrap_or(""),
            element.class.as_deref().unwrap_or("")
        );
        if !name.trim().is_empty() {
            if CLICKABLE_NAME_PATTERNS.iter().any(|p| p.is_match(&name))
                || self.extra_patterns.iter().any(|p| p.is_match(&name))
            {
                return true;
            }
        }

        if let Some(selector) = &click.target_selector {
            if let Some(tag) = leading_tag(selector) {
                return CLICKABLE_TAGS.contains(tag.as_str());
            }
        }

        false
    }

    /// Distance from the element's geometric center to the click point,
    /// when the capture carried enough geometry to compute it.
    fn center_distance(click: &ClickEvent) -> Option<f64> {
        let bounds = click.bounds?;
        let pos = click.position_in_element?;
        let dx = pos.x - bounds.width / 2.0;
        let dy = pos.y - bounds.height / 2.0;
        Some((dx * dx + dy * dy).sqrt())
    }

    fn is_central(&self, click: &ClickEvent) -> bool {
        Self::center_distance(click)
            .is_some_and(|d| d <= self.config.center_threshold_px)
    }
}

/// Parse a leading tag name out of a selector string
/// (`"button.primary"` -> `"button"`, `"#go"` -> none).
fn leading_tag(selector: &str) -> Option<String> {
    let tag: String = selector
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

impl Detector for CentralClickDetector {
    fn name(&self) -> &'static str {
        "central_click"
    }

    fn indicator(&self) -> &'static str {
        CENTRAL_BUTTON_CLICKS
    }

    fn trigger(&self) -> Trigger {
        Trigger::Click
    }

    fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    fn evaluate(&self, history: &SampleHistory) -> Result<Option<Detection>, DetectionError> {
        let recent = history.recent_clicks(self.config.pattern_window);
        let Some(current) = recent.last() else {
            return Ok(None);
        };

        // Non-clickable targets are ignored outright.
        if !self.is_clickable_target(current) {
            return Ok(None);
        }
        if !self.is_central(current) {
            return Ok(None);
        }

        // Central-ness alone is weak evidence; confidence comes from how
        // many of the recent clicks repeated the pattern.
        let matching = recent
            .iter()
            .filter(|c| self.is_clickable_target(c) && self.is_central(c))
            .count();

        let confidence =
            (matching as f64 / self.config.min_samples as f64).min(1.0);
        if confidence < self.config.confidence_threshold {
            return Ok(None);
        }

        let distance = Self::center_distance(current).unwrap_or(0.0);
        let detail = json!({
            "element_type": current.element.tag,
            "element_id": current.element.id,
            "distance": distance,
            "element_size": current.bounds.map(|b| json!({
                "width": b.width,
                "height": b.height,
            })),
            "pattern_strength": matching,
            "window": self.config.pattern_window,
        });

        Ok(Some(Detection::new(CENTRAL_BUTTON_CLICKS, confidence).with_detail(detail)))
    }
}
