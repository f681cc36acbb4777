//! scrollkit Animation Collaborator
//!
//! Scenes map scroll progress onto animation progress without knowing what
//! produces the animation. This crate defines that boundary:
//!
//! - [`TweenLike`]: the contract any animation engine can implement
//! - [`TweenHandle`]: the scroll-control wrapper a scene drives
//! - [`Timeline`]: a self-contained engine for hosts without one
//!
//! # Example
//!
//! ```rust
//! use scrollkit_tween::{Easing, Timeline, TweenHandle, TweenLike};
//!
//! let mut timeline = Timeline::new();
//! let fade = timeline.add(0.0, 1000.0, 0.0, 1.0, Easing::Linear);
//!
//! let mut handle = TweenHandle::new(Box::new(timeline));
//! handle.update_progress(0.5, true, false, false);
//! assert_eq!(handle.progress(), 0.5);
//! # let _ = fade;
//! ```

pub mod easing;
pub mod handle;
pub mod timeline;

pub use easing::Easing;
pub use handle::{TweenHandle, TweenLike};
pub use timeline::{Property, Timeline, TimelineEntryId};
