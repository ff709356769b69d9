//! Hover cashtag detection.
//!
//! Watches what the pointer rests on, pulls a `$TICKER` out of the element's
//! own text, and drives an informational panel's visibility and anchor.

pub mod debounce;
pub mod detector;
pub mod session;
pub mod surface;
pub mod ticker;

pub use detector::{HoverPhase, HoverSnapshot, HoverTickerDetector, HoverTiming, HoverTrigger};
pub use session::{spawn_hover_session, HoverHandle, HoverInput};
pub use surface::{HoverSurface, Node, NullSurface, Scene};
pub use ticker::extract_ticker;
