//! Interaction event model.
//!
//! Raw events as captured by a page-side bridge: pointer movement, clicks
//! with element context, and wheel scrolls. Wheel is used rather than the
//! generic scroll event because it carries delta magnitude and direction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single pointer position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Milliseconds on the capturing page's timebase.
    pub timestamp_ms: u64,
}

impl PointerSample {
    /// Euclidean distance to another sample.
    pub fn distance_to(&self, other: &PointerSample) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Movement derived from two consecutive pointer samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerMovement {
    /// Distance covered, in px.
    pub distance: f64,
    /// Time between the two samples, in ms.
    pub time_delta_ms: u64,
    /// Speed in px/s (0 when the time delta is 0).
    pub velocity: f64,
    /// Timestamp of the later sample.
    pub timestamp_ms: u64,
}

impl PointerMovement {
    /// Derive the movement between two consecutive samples.
    pub fn between(prev: &PointerSample, next: &PointerSample) -> Self {
        let distance = prev.distance_to(next);
        let time_delta_ms = next.timestamp_ms.saturating_sub(prev.timestamp_ms);
        let velocity = if time_delta_ms == 0 {
            0.0
        } else {
            distance / (time_delta_ms as f64 / 1000.0)
        };
        Self {
            distance,
            time_delta_ms,
            velocity,
            timestamp_ms: next.timestamp_ms,
        }
    }
}

/// Element context captured with a click.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementInfo {
    /// Lowercase tag name, if known.
    pub tag: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    /// Explicit clickability verdict from the capturing bridge, if it made one.
    pub is_clickable: Option<bool>,
    /// Captured attribute subset (onclick, role, tabindex, href, ...).
    pub attributes: BTreeMap<String, String>,
}

/// Bounding-box size of the click target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub width: f64,
    pub height: f64,
}

/// Click position relative to the target element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

/// A click with its element context and the pointer path that preceded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp_ms: u64,
    /// Page coordinates of the click point.
    pub x: f64,
    pub y: f64,
    /// CSS-like selector of the target, if the bridge resolved one.
    #[serde(default)]
    pub target_selector: Option<String>,
    #[serde(default)]
    pub element: ElementInfo,
    #[serde(default)]
    pub bounds: Option<ElementBounds>,
    /// Click point relative to the element, when bounds are known.
    #[serde(default)]
    pub position_in_element: Option<PointerOffset>,
    /// Browser isTrusted flag; false means a synthetic dispatch.
    #[serde(default = "default_trusted")]
    pub trusted: bool,
    /// Pointer samples captured over the 200ms preceding the click.
    #[serde(default)]
    pub trail: Vec<PointerSample>,
}

fn default_trusted() -> bool {
    true
}

/// A wheel scroll report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    pub timestamp_ms: u64,
    pub delta_x: f64,
    pub delta_y: f64,
    #[serde(default)]
    pub scroll_top: f64,
}

impl ScrollSample {
    /// Scroll speed proxy: the vertical delta magnitude.
    pub fn velocity(&self) -> f64 {
        self.delta_y.abs()
    }
}

/// Any interaction event, as serialized by a capture bridge (one JSON
/// object per line for replay files).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    PointerMove(PointerSample),
    Click(ClickEvent),
    Scroll(ScrollSample),
}

impl InteractionEvent {
    /// Timestamp of the underlying event.
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            InteractionEvent::PointerMove(s) => s.timestamp_ms,
            InteractionEvent::Click(c) => c.timestamp_ms,
            InteractionEvent::Scroll(s) => s.timestamp_ms,
        }
    }
}
