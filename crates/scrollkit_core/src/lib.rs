//! scrollkit Core Runtime
//!
//! This crate provides the foundational primitives for the scrollkit
//! scroll-interaction library:
//!
//! - **Typed Scene Events**: a publish/subscribe bus with compile-time
//!   checked event kinds and payloads
//! - **Scroll State Primitives**: scene state and scroll direction tags
//! - **Leveled Logging**: a per-instance gate in front of `tracing`
//! - **Geometry**: points, sizes and rects in document coordinates
//!
//! # Example
//!
//! ```rust
//! use scrollkit_core::events::{EventBus, SceneEvent, SceneEventKind};
//! use scrollkit_core::state::{SceneState, ScrollDirection};
//!
//! let mut bus = EventBus::new();
//! let sub = bus.on(&[SceneEventKind::Enter], |event| {
//!     println!("entered with progress {:?}", event.progress_value());
//! });
//!
//! bus.emit(&SceneEvent::progress(
//!     SceneEventKind::Enter,
//!     0.0,
//!     SceneState::During,
//!     ScrollDirection::Forward,
//! ));
//! bus.off(sub);
//! ```

pub mod events;
pub mod geometry;
pub mod log;
pub mod state;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to an element owned by the DOM-like environment collaborator.
    pub struct ElementId;
}

pub use events::{EventBus, SceneEvent, SceneEventData, SceneEventKind, SubscriptionId};
pub use geometry::{Point, Rect, Size};
pub use log::LogLevel;
pub use state::{SceneState, ScrollDirection};

// Re-exported for the leveled logging macros.
#[doc(hidden)]
pub use tracing;
