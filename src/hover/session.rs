//! Async driver for the hover detector.
//!
//! One tokio task owns one detector. Host events arrive over an unbounded
//! channel; the task sleeps until the detector's next deadline and publishes
//! snapshots on a `watch` channel whenever they change. Dropping the handle
//! (or calling [`HoverHandle::shutdown`]) stops the task and cancels every
//! pending timer.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::detector::{HoverSnapshot, HoverTickerDetector, HoverTiming};
use super::surface::HoverSurface;
use crate::types::Point;

/// Host events fed into a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverInput {
    PointerMove(Point),
    Scroll,
    Resize,
    /// Pointer entered (`true`) or left (`false`) the panel.
    PanelPointer(bool),
    Dismiss,
}

/// Handle to a running hover session.
pub struct HoverHandle {
    input: mpsc::UnboundedSender<HoverInput>,
    state: watch::Receiver<HoverSnapshot>,
    task: JoinHandle<()>,
}

/// Spawn a detector task reading from `surface`.
pub fn spawn_hover_session<S>(surface: S, timing: HoverTiming) -> HoverHandle
where
    S: HoverSurface + Send + Sync + 'static,
{
    let detector = HoverTickerDetector::new(timing);
    let (input, rx) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(detector.snapshot());
    let task = tokio::spawn(run_session(surface, detector, rx, state_tx));
    HoverHandle { input, state, task }
}

impl HoverHandle {
    /// Queue an event. Returns `false` once the session has stopped.
    pub fn send(&self, input: HoverInput) -> bool {
        self.input.send(input).is_ok()
    }

    pub fn pointer_moved(&self, point: Point) -> bool {
        self.send(HoverInput::PointerMove(point))
    }

    pub fn scrolled(&self) -> bool {
        self.send(HoverInput::Scroll)
    }

    pub fn resized(&self) -> bool {
        self.send(HoverInput::Resize)
    }

    pub fn set_pointer_over_panel(&self, over: bool) -> bool {
        self.send(HoverInput::PanelPointer(over))
    }

    pub fn dismiss(&self) -> bool {
        self.send(HoverInput::Dismiss)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> HoverSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<HoverSnapshot> {
        self.state.clone()
    }

    /// Stop the session and wait for the task to finish.
    pub async fn shutdown(self) {
        let HoverHandle { input, task, .. } = self;
        drop(input);
        if let Err(e) = task.await {
            warn!(error = %e, "Hover session task failed");
        }
    }
}

async fn run_session<S: HoverSurface>(
    surface: S,
    mut detector: HoverTickerDetector,
    mut rx: mpsc::UnboundedReceiver<HoverInput>,
    state_tx: watch::Sender<HoverSnapshot>,
) {
    debug!(timing = ?detector.timing(), "Hover session started");

    loop {
        let deadline = detector.next_deadline();
        tokio::select! {
            input = rx.recv() => {
                let Some(input) = input else { break };
                let now = Instant::now();
                // Timers that were already due fire before the new event.
                detector.advance(&surface, now);
                apply(&mut detector, &surface, input, now);
            }
            _ = sleep_until(deadline.unwrap_or_else(far_future)), if deadline.is_some() => {}
        }

        detector.advance(&surface, Instant::now());
        let snapshot = detector.snapshot();
        state_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    detector.reset();
    debug!("Hover session stopped");
}

fn apply<S: HoverSurface>(
    detector: &mut HoverTickerDetector,
    surface: &S,
    input: HoverInput,
    now: Instant,
) {
    match input {
        HoverInput::PointerMove(point) => detector.pointer_moved(point, now),
        HoverInput::Scroll | HoverInput::Resize => detector.layout_changed(surface, now),
        HoverInput::PanelPointer(over) => detector.set_pointer_over_panel(over, now),
        HoverInput::Dismiss => detector.dismiss(now),
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::surface::Scene;
    use crate::types::{ElementId, Rect};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scene() -> Arc<Scene> {
        let scene = Arc::new(Scene::new());
        scene.insert(ElementId(1), Rect::new(0.0, 0.0, 1000.0, 1000.0), vec![]);
        scene.insert_text(ElementId(2), Rect::new(100.0, 100.0, 300.0, 20.0), "Big news for $ETH today");
        scene
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_publishes_detection() {
        let handle = spawn_hover_session(scene(), HoverTiming::default());
        let mut rx = handle.subscribe();
        assert!(!rx.borrow().visible);

        handle.pointer_moved(Point::new(150.0, 110.0));
        let snap = rx.wait_for(|s| s.visible).await.unwrap().clone();
        assert_eq!(snap.ticker, "$ETH");

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_hides_after_pointer_leaves() {
        let handle = spawn_hover_session(scene(), HoverTiming::default());
        handle.pointer_moved(Point::new(150.0, 110.0));
        sleep(ms(1000)).await;
        assert_eq!(handle.snapshot().ticker, "$ETH");

        handle.pointer_moved(Point::new(900.0, 900.0));
        sleep(ms(2000)).await;
        let snap = handle.snapshot();
        assert!(!snap.visible);
        assert_eq!(snap.ticker, "");
        assert_eq!(snap.anchor_rect, Some(Rect::new(100.0, 100.0, 300.0, 20.0)));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_reanchors_panel() {
        let scene = scene();
        let handle = spawn_hover_session(Arc::clone(&scene), HoverTiming::default());
        handle.pointer_moved(Point::new(150.0, 110.0));
        sleep(ms(1000)).await;

        scene.scroll_by(0.0, -30.0);
        handle.scrolled();
        sleep(ms(200)).await;
        assert_eq!(
            handle.snapshot().anchor_rect,
            Some(Rect::new(100.0, 70.0, 300.0, 20.0))
        );
        assert_eq!(scene.resolutions(), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_pending_detection() {
        let handle = spawn_hover_session(scene(), HoverTiming::default());
        let rx = handle.subscribe();
        handle.pointer_moved(Point::new(150.0, 110.0));
        handle.shutdown().await;

        sleep(ms(5000)).await;
        assert!(!rx.borrow().visible);
    }
}
