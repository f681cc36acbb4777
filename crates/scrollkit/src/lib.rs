//! scrollkit — scroll-driven scene orchestration
//!
//! A [`Controller`] watches one scroll container and owns any number of
//! [`Scene`]s. Each scene maps a window of scroll offsets onto a progress
//! value and a state (`Before` / `During` / `After`) and drives its side
//! effects from the transitions:
//!
//! - **Events**: a typed bus per scene (`enter`, `leave`, `start`, `end`,
//!   `progress`, `change`, `shift`, `update`, `destroy`)
//! - **Tweens**: any [`TweenLike`](scrollkit_tween::TweenLike)
//!   implementation is positioned by scene progress
//! - **Pinning**: elements are fixed in the viewport for the scene
//!   duration, with a spacer holding their place in the layout
//! - **Class toggles**: classes applied while the scene is active
//!
//! Runtime errors never panic and never return `Err`: invalid values are
//! replaced by defaults and reported through leveled `tracing` logs. Only
//! [`Controller::new`] can fail, when the scroll container does not exist.
//!
//! # Example
//!
//! ```rust
//! use scrollkit::{Controller, ControllerOptions, Scene, SceneOptions, Duration};
//! use scrollkit::dom::{shared, MockDom};
//! use scrollkit_core::Size;
//!
//! let mut mock = MockDom::new(Size::new(800.0, 600.0));
//! let trigger = mock.create_element("trigger");
//! mock.set_position(trigger, scrollkit_core::Point::new(0.0, 400.0));
//! let dom = shared(mock);
//!
//! let mut controller = Controller::new(dom, ControllerOptions::default()).unwrap();
//! let scene = Scene::new(
//!     controller.dom(),
//!     SceneOptions {
//!         duration: Duration::Fixed(200.0),
//!         trigger_element: Some(trigger),
//!         ..SceneOptions::default()
//!     },
//! );
//! let id = controller.add_scene(scene);
//! controller.update(true);
//! assert_eq!(controller.scene(id).unwrap().progress(), 0.0);
//! ```

pub mod controller;
pub mod error;
pub mod options;
pub mod scene;

pub use controller::{Controller, ControllerInfo, Driver, SceneId, ScrollTarget};
pub use error::ControllerError;
pub use options::{
    ControllerOptions, Duration, GlobalSceneOptions, PinOptions, SceneOptions, TriggerHook,
};
pub use scene::Scene;

// The collaborator crates, re-exported for one-import consumers.
pub use scrollkit_dom as dom;
pub use scrollkit_tween as tween;

pub use scrollkit_core::{
    LogLevel, SceneEvent, SceneEventKind, SceneState, ScrollDirection, SubscriptionId,
};
