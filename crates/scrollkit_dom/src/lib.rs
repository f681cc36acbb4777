//! scrollkit Environment Collaborator
//!
//! The scene controller never touches a real layout engine directly.
//! Everything it needs from the host document goes through the [`DomEnv`]
//! trait: element resolution, computed/natural style reads, inline style
//! writes, class toggling, spacer insertion for pinning, scroll and
//! viewport queries, and per-container change signals.
//!
//! The crate also ships:
//!
//! - **Frame pacing**: one capability-detection step at startup yields a
//!   single canonical pacer (see [`frame`])
//! - **[`MockDom`]**: a complete in-memory environment for headless tests
//!   and examples
//!
//! # Example
//!
//! ```rust
//! use scrollkit_core::Size;
//! use scrollkit_dom::{DomEnv, MockDom};
//!
//! let mut dom = MockDom::new(Size::new(800.0, 600.0));
//! let trigger = dom.create_element("trigger");
//! dom.set_position(trigger, scrollkit_core::Point::new(0.0, 400.0));
//! assert_eq!(dom.offset(trigger, false).y, 400.0);
//! ```

pub mod env;
pub mod frame;
pub mod mock;

pub use env::{
    BoxSizing, Capabilities, ContainerSignal, Dimension, Display, DomEnv, Edges, NaturalMetrics,
    PositionMode, SharedDom, StylePatch,
};
pub use frame::{detect_pacer, FramePacer, ManualPacer, TimerPacer};
pub use mock::MockDom;

use std::sync::{Arc, Mutex};

/// Wrap an environment for shared access between a controller and its
/// scenes.
pub fn shared<E: DomEnv + Send + 'static>(env: E) -> SharedDom {
    Arc::new(Mutex::new(env))
}
