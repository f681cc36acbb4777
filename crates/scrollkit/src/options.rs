//! Controller and scene configuration
//!
//! Options are plain structs with defaults; setters validate on assignment
//! and substitute the default (with an error log) when a value is outside
//! its domain, so configuration mistakes never escalate past a log line.

use scrollkit_core::{ElementId, LogLevel};

/// Scene duration: a fixed scroll distance or a function re-resolved on
/// every refresh (for layouts whose heights settle late).
pub enum Duration {
    Fixed(f64),
    Dynamic(Box<dyn FnMut() -> f64 + Send>),
}

impl Duration {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Duration::Dynamic(_))
    }

    /// Resolve the current value. Dynamic durations are re-invoked.
    pub fn resolve(&mut self) -> f64 {
        match self {
            Duration::Fixed(value) => *value,
            Duration::Dynamic(f) => f(),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::Fixed(0.0)
    }
}

impl std::fmt::Debug for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Duration::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Duration::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Where in the viewport the trigger sits when the scene starts.
///
/// `OnEnter` fires when the trigger enters at the far edge of the viewport,
/// `OnLeave` when it reaches the near edge, `OnCenter` halfway.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TriggerHook {
    OnEnter,
    #[default]
    OnCenter,
    OnLeave,
    Fraction(f64),
}

impl TriggerHook {
    /// The viewport fraction this hook resolves to, clamped to `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        match self {
            TriggerHook::OnEnter => 1.0,
            TriggerHook::OnCenter => 0.5,
            TriggerHook::OnLeave => 0.0,
            TriggerHook::Fraction(value) => value.clamp(0.0, 1.0),
        }
    }
}

/// Per-scene configuration.
#[derive(Debug)]
pub struct SceneOptions {
    pub duration: Duration,
    /// Offset from the trigger position, in scroll pixels.
    pub offset: f64,
    /// Element whose position defines the scene start. `None` anchors the
    /// scene at the start of the page (plus `offset`).
    pub trigger_element: Option<ElementId>,
    pub trigger_hook: TriggerHook,
    /// Whether the scene plays backward when scrolling up.
    pub reverse: bool,
    /// Animate tween seeks instead of hard-setting progress.
    pub tween_changes: bool,
    pub loglevel: LogLevel,
}

impl SceneOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            duration: Duration::default(),
            offset: 0.0,
            trigger_element: None,
            trigger_hook: TriggerHook::default(),
            reverse: true,
            tween_changes: false,
            loglevel: LogLevel::default(),
        }
    }
}

/// Pin behavior settings.
#[derive(Clone, Debug)]
pub struct PinOptions {
    /// Push following elements down for the pin duration instead of letting
    /// the pinned element scroll past them.
    pub push_followers: bool,
    /// Class applied to the spacer element.
    pub spacer_class: String,
    /// Class applied to the pinned element while fixed.
    pub pinned_class: String,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            push_followers: true,
            spacer_class: "scrollkit-pin-spacer".to_string(),
            pinned_class: String::new(),
        }
    }
}

/// Defaults applied to every scene added to a controller, where the scene
/// has not set its own value.
#[derive(Clone, Debug, Default)]
pub struct GlobalSceneOptions {
    pub duration: Option<f64>,
    pub offset: Option<f64>,
    pub trigger_element: Option<Option<ElementId>>,
    pub trigger_hook: Option<TriggerHook>,
    pub reverse: Option<bool>,
    pub tween_changes: Option<bool>,
    pub loglevel: Option<LogLevel>,
}

/// Controller configuration.
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Scroll container element; `None` uses the document root.
    pub container: Option<ElementId>,
    /// Vertical (default) or horizontal scroll axis.
    pub vertical: bool,
    pub global_scene_options: GlobalSceneOptions,
    pub loglevel: LogLevel,
    /// Poll interval in milliseconds for the refresh timer; `0` disables
    /// polling.
    pub refresh_interval_ms: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            container: None,
            vertical: true,
            global_scene_options: GlobalSceneOptions::default(),
            loglevel: LogLevel::default(),
            refresh_interval_ms: 100,
        }
    }
}
