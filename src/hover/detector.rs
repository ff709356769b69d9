//! Hover ticker detection state machine.
//!
//! Turns raw pointer/scroll/resize events into a low-frequency "the user is
//! hovering a cashtag" signal:
//!
//! ```text
//!   pointer move ──► pointer debounce (delay, max-wait) ──► resolve element
//!                                                               │
//!   scroll/resize ──► re-measure tracked element ──┐            ▼
//!                                                  └──► settle debounce
//!                                                               │
//!                                          extract cashtag ◄────┘
//!                                                 │
//!        Idle ◄──► Detecting ──► Visible ◄──► PendingHide ──► Idle
//! ```
//!
//! The detector never reads the clock; every call takes `now` and
//! [`HoverTickerDetector::next_deadline`] says when to call
//! [`HoverTickerDetector::advance`] next. All timers belong to the instance.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::debounce::Debouncer;
use super::surface::HoverSurface;
use super::ticker::extract_ticker;
use crate::types::{ElementId, Point, PointerSample, Rect};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const DEFAULT_DELAY_MS: u64 = 800;
const DEFAULT_MAX_WAIT_MS: u64 = 1000;
const DEFAULT_SETTLE_MS: u64 = 100;
const DEFAULT_SAMPLE_HIDE_DELAY_MS: u64 = 0;
const DEFAULT_PANEL_LEAVE_GRACE_MS: u64 = 1000;

/// Timing knobs. The constants are tunable, not load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTiming {
    /// Quiet period before a pointer position is resolved.
    pub delay: Duration,
    /// Resolution is forced at least this often under continuous movement.
    pub max_wait: Duration,
    /// Stabilisation window for the resolved (element, text, rect) sample.
    pub settle: Duration,
    /// Hide delay after a fresh page sample carried no ticker.
    pub sample_hide_delay: Duration,
    /// Hide delay after the pointer leaves the panel with nothing hovered.
    pub panel_leave_grace: Duration,
}

impl Default for HoverTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_wait: Duration::from_millis(DEFAULT_MAX_WAIT_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            sample_hide_delay: Duration::from_millis(DEFAULT_SAMPLE_HIDE_DELAY_MS),
            panel_leave_grace: Duration::from_millis(DEFAULT_PANEL_LEAVE_GRACE_MS),
        }
    }
}

impl HoverTiming {
    /// Default timing with a custom pointer debounce window.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// States and triggers
// ---------------------------------------------------------------------------

/// Where the detector is in its show/hide cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    /// Nothing shown, nothing pending.
    Idle,
    /// Nothing shown, a pointer or layout sample is being debounced.
    Detecting,
    /// A ticker is shown.
    Visible,
    /// A ticker is shown but will hide at `at` unless something intervenes.
    PendingHide { at: Instant },
}

impl HoverPhase {
    pub fn is_visible(&self) -> bool {
        matches!(self, HoverPhase::Visible | HoverPhase::PendingHide { .. })
    }
}

/// Inputs that move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTrigger {
    /// A stabilised sample carried a cashtag.
    TickerFound,
    /// A stabilised sample carried no cashtag.
    TickerLost { hide_after: Duration },
    PanelEnter,
    /// Pointer left the panel while no ticker is hovered.
    PanelLeave,
    GraceTimeout,
    /// The consumer closed the panel.
    Dismiss,
}

/// Everything a panel renderer needs, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSnapshot {
    pub phase: HoverPhase,
    pub visible: bool,
    /// Currently hovered cashtag; empty when none.
    pub ticker: String,
    /// Last cashtag the panel was opened for; cleared when the grace
    /// period expires.
    pub active_ticker: String,
    /// Last known anchor. Sticky: never reverts to `None` once set.
    pub anchor_rect: Option<Rect>,
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Tracked {
    element: ElementId,
    text: String,
}

/// Debounced cashtag hover detector.
#[derive(Debug, Clone)]
pub struct HoverTickerDetector {
    timing: HoverTiming,
    pointer: Debouncer<Point>,
    settle: Debouncer<PointerSample>,
    /// Element from the latest resolution, re-measured on scroll/resize.
    tracked: Option<Tracked>,
    phase: HoverPhase,
    hovering: String,
    active: String,
    anchor: Option<Rect>,
    pointer_over_panel: bool,
}

impl Default for HoverTickerDetector {
    fn default() -> Self {
        Self::new(HoverTiming::default())
    }
}

impl HoverTickerDetector {
    pub fn new(timing: HoverTiming) -> Self {
        Self {
            timing,
            pointer: Debouncer::trailing(timing.delay).with_max_wait(timing.max_wait),
            settle: Debouncer::trailing(timing.settle),
            tracked: None,
            phase: HoverPhase::Idle,
            hovering: String::new(),
            active: String::new(),
            anchor: None,
            pointer_over_panel: false,
        }
    }

    // -- Accessors -------------------------------------------------------

    pub fn timing(&self) -> &HoverTiming {
        &self.timing
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn visible(&self) -> bool {
        self.phase.is_visible()
    }

    pub fn ticker(&self) -> &str {
        &self.hovering
    }

    pub fn active_ticker(&self) -> &str {
        &self.active
    }

    pub fn anchor_rect(&self) -> Option<Rect> {
        self.anchor
    }

    pub fn is_pointer_over_panel(&self) -> bool {
        self.pointer_over_panel
    }

    pub fn snapshot(&self) -> HoverSnapshot {
        HoverSnapshot {
            phase: self.phase,
            visible: self.phase.is_visible(),
            ticker: self.hovering.clone(),
            active_ticker: self.active.clone(),
            anchor_rect: self.anchor,
        }
    }

    // -- Event inputs ----------------------------------------------------

    /// Pointer moved to `point`. Ignored while the pointer is over the panel.
    pub fn pointer_moved(&mut self, point: Point, now: Instant) {
        if self.pointer_over_panel {
            trace!(x = point.x, y = point.y, "Pointer over panel, move ignored");
            return;
        }
        self.pointer.push(point, now);
        self.refresh_detecting();
    }

    /// Scroll or resize: re-measure the tracked element without re-reading
    /// its text or re-resolving what is under the pointer.
    pub fn layout_changed<S: HoverSurface + ?Sized>(&mut self, surface: &S, now: Instant) {
        let Some(tracked) = &self.tracked else {
            return;
        };
        let sample = PointerSample {
            element: Some(tracked.element),
            text: tracked.text.clone(),
            rect: surface.bounding_rect(tracked.element),
        };
        self.settle.push(sample, now);
        self.refresh_detecting();
    }

    /// The panel renderer reports pointer enter (`true`) / leave (`false`).
    pub fn set_pointer_over_panel(&mut self, over: bool, now: Instant) {
        self.pointer_over_panel = over;
        if over {
            // Anything sampled on the way into the panel is stale now.
            self.pointer.cancel();
            self.settle.cancel();
            self.transition(HoverTrigger::PanelEnter, now);
        } else if self.hovering.is_empty() {
            self.transition(HoverTrigger::PanelLeave, now);
        }
        self.refresh_detecting();
    }

    /// Force the panel closed.
    pub fn dismiss(&mut self, now: Instant) {
        self.transition(HoverTrigger::Dismiss, now);
        self.refresh_detecting();
    }

    // -- Timers ----------------------------------------------------------

    /// Earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.pointer.deadline(), self.settle.deadline(), self.hide_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Fire every timer due at or before `now`, each at its scheduled
    /// instant and in chronological order.
    pub fn advance<S: HoverSurface + ?Sized>(&mut self, surface: &S, now: Instant) {
        while let Some(due) = self.next_deadline().filter(|due| *due <= now) {
            if self.hide_deadline() == Some(due) {
                self.transition(HoverTrigger::GraceTimeout, due);
            } else if let Some((at, point)) = self.pointer.poll(due) {
                self.resolve(surface, point, at);
            } else if let Some((at, sample)) = self.settle.poll(due) {
                self.evaluate(sample, at);
            } else {
                break;
            }
        }
        self.refresh_detecting();
    }

    /// Teardown: cancel every timer so nothing fires after the host is gone.
    pub fn reset(&mut self) {
        self.pointer.cancel();
        self.settle.cancel();
        self.tracked = None;
        self.hovering.clear();
        self.active.clear();
        self.pointer_over_panel = false;
        self.phase = HoverPhase::Idle;
    }

    // -- Internals -------------------------------------------------------

    fn hide_deadline(&self) -> Option<Instant> {
        match self.phase {
            HoverPhase::PendingHide { at } => Some(at),
            _ => None,
        }
    }

    /// Pointer debounce fired: look at what is under the pointer now.
    fn resolve<S: HoverSurface + ?Sized>(&mut self, surface: &S, point: Point, at: Instant) {
        if self.pointer_over_panel {
            return;
        }
        let sample = match surface.element_at(point) {
            Some(element) => {
                let text = surface.direct_text(element).trim().to_string();
                let rect = surface.bounding_rect(element);
                self.tracked = Some(Tracked {
                    element,
                    text: text.clone(),
                });
                PointerSample {
                    element: Some(element),
                    text,
                    rect,
                }
            }
            None => {
                self.tracked = None;
                PointerSample::empty()
            }
        };
        trace!(element = ?sample.element, text = %sample.text, "Pointer resolved");
        self.settle.push(sample, at);
    }

    /// Settle debounce fired: decide whether a cashtag is hovered.
    fn evaluate(&mut self, sample: PointerSample, at: Instant) {
        if self.pointer_over_panel {
            return;
        }
        self.hovering = extract_ticker(&sample.text).unwrap_or_default().to_string();

        if self.hovering.is_empty() {
            self.transition(
                HoverTrigger::TickerLost {
                    hide_after: self.timing.sample_hide_delay,
                },
                at,
            );
        } else {
            if let Some(rect) = sample.rect {
                self.anchor = Some(rect);
            }
            self.active = self.hovering.clone();
            self.transition(HoverTrigger::TickerFound, at);
        }
    }

    fn transition(&mut self, trigger: HoverTrigger, now: Instant) {
        use HoverPhase::*;
        use HoverTrigger::*;

        let next = match (self.phase, trigger) {
            (_, TickerFound) => Visible,
            (Visible | PendingHide { .. }, TickerLost { hide_after }) => PendingHide {
                at: now + hide_after,
            },
            (PendingHide { .. }, PanelEnter) => Visible,
            (Visible | PendingHide { .. }, PanelLeave) => PendingHide {
                at: now + self.timing.panel_leave_grace,
            },
            (PendingHide { .. }, GraceTimeout) => {
                if !self.pointer_over_panel && self.hovering.is_empty() {
                    self.active.clear();
                    self.hide()
                } else {
                    Visible
                }
            }
            (Visible | PendingHide { .. }, Dismiss) => self.hide(),
            (phase, _) => phase,
        };

        if next != self.phase {
            debug!(
                from = ?self.phase,
                to = ?next,
                trigger = ?trigger,
                ticker = %self.hovering,
                "Hover phase transition"
            );
            self.phase = next;
        }
    }

    /// Leaving the visible phases clears the hovered ticker; the anchor stays.
    fn hide(&mut self) -> HoverPhase {
        self.hovering.clear();
        HoverPhase::Idle
    }

    fn refresh_detecting(&mut self) {
        if self.phase.is_visible() {
            return;
        }
        self.phase = if self.pointer.is_pending() || self.settle.is_pending() {
            HoverPhase::Detecting
        } else {
            HoverPhase::Idle
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
