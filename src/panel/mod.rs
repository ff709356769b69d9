//! Ticker panel placement and fetch gating.
//!
//! The panel opens just below the hovered element, flips above it when it
//! would run off the bottom of the viewport, and slides left when it would
//! run off the right. Analysis fetches are rate limited per ticker.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::hover::debounce::Debouncer;
use crate::hover::HoverSnapshot;
use crate::types::{Rect, Size};

pub const PANEL_WIDTH: f64 = 480.0;
pub const PANEL_HEIGHT: f64 = 460.0;

/// Minimum distance kept from the top/left viewport edges.
const EDGE_MARGIN: f64 = 10.0;

/// Repeated fetches for the same ticker inside this window are dropped.
const FETCH_DEBOUNCE_MS: u64 = 300;

/// Top-left corner of the panel in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelPosition {
    pub left: f64,
    pub top: f64,
}

/// Place a `panel`-sized box next to `anchor` inside `viewport`.
pub fn place_panel(anchor: Rect, viewport: Size, panel: Size) -> PanelPosition {
    let mut left = anchor.left;
    let mut top = anchor.bottom;

    if left + panel.width > viewport.width {
        left = (viewport.width - panel.width).max(EDGE_MARGIN);
    }
    if top + panel.height > viewport.height {
        top = (anchor.top - panel.height).max(EDGE_MARGIN);
    }

    PanelPosition { left, top }
}

/// What the renderer should do after a snapshot update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelUpdate {
    pub position: Option<PanelPosition>,
    /// Ticker to fetch analysis for, if a fetch should start now.
    pub fetch: Option<String>,
}

/// Panel-side state: current position and the fetch gate.
#[derive(Debug)]
pub struct TickerPanel {
    size: Size,
    position: Option<PanelPosition>,
    last_anchor: Option<Rect>,
    last_viewport: Option<Size>,
    /// Ticker and visibility from the previous snapshot.
    last_ticker: String,
    was_visible: bool,
    last_fetched: Option<String>,
    fetch_gate: Debouncer<String>,
}

impl Default for TickerPanel {
    fn default() -> Self {
        Self::new(Size::new(PANEL_WIDTH, PANEL_HEIGHT))
    }
}

impl TickerPanel {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            position: None,
            last_anchor: None,
            last_viewport: None,
            last_ticker: String::new(),
            was_visible: false,
            last_fetched: None,
            fetch_gate: Debouncer::leading(Duration::from_millis(FETCH_DEBOUNCE_MS)),
        }
    }

    pub fn position(&self) -> Option<PanelPosition> {
        self.position
    }

    /// Feed the latest detector snapshot. The position is recomputed when the
    /// anchor or viewport changed. A new anchor, a new ticker, or the panel
    /// reopening requests a fetch.
    pub fn update(&mut self, snapshot: &HoverSnapshot, viewport: Size, now: Instant) -> PanelUpdate {
        let anchor_moved = snapshot.anchor_rect != self.last_anchor;
        if anchor_moved || self.last_viewport != Some(viewport) {
            self.last_anchor = snapshot.anchor_rect;
            self.last_viewport = Some(viewport);
            self.position = snapshot
                .anchor_rect
                .map(|anchor| place_panel(anchor, viewport, self.size));
        }

        let ticker_changed = snapshot.ticker != self.last_ticker;
        let reopened = snapshot.visible && !self.was_visible;
        self.last_ticker.clone_from(&snapshot.ticker);
        self.was_visible = snapshot.visible;

        let fetch = if (anchor_moved || ticker_changed || reopened) && !snapshot.ticker.is_empty() {
            self.gate_fetch(&snapshot.ticker, now)
        } else {
            None
        };

        PanelUpdate {
            position: self.position,
            fetch,
        }
    }

    /// The panel is drawn only with a visible ticker and a known position.
    pub fn is_rendered(&self, snapshot: &HoverSnapshot) -> bool {
        snapshot.visible && self.position.is_some() && !snapshot.ticker.is_empty()
    }

    fn gate_fetch(&mut self, ticker: &str, now: Instant) -> Option<String> {
        if self.last_fetched.as_deref() != Some(ticker) {
            // A different ticker is never rate limited by the previous one.
            self.fetch_gate.cancel();
        }
        let fired = self.fetch_gate.push(ticker.to_string(), now);
        if let Some(t) = &fired {
            debug!(ticker = %t, "Requesting ticker analysis");
            self.last_fetched = Some(t.clone());
        }
        fired
    }
}
