//! Scene: a trackable region of scroll space
//!
//! A scene maps a window of container scroll offsets onto a progress value
//! in `[0, 1]` and a state tag (`Before` / `During` / `After`), and drives
//! its side effects from the transitions: tween seeking, pin positioning
//! and class toggling. The event order around a transition is fixed and
//! load-bearing: `Enter` and the entering boundary event fire before the
//! progress update is published, the exiting boundary event and `Leave`
//! fire after it, so a `Leave` handler always observes final progress.

mod pin;

pub use pin::PinBinding;

use crate::controller::ControllerInfo;
use crate::options::{Duration, SceneOptions, TriggerHook};
use scrollkit_core::events::{OptionValue, SceneOptionName, ShiftReason};
use scrollkit_core::{
    log_debug, log_error, log_warn, ElementId, EventBus, LogLevel, SceneEvent, SceneEventKind,
    SceneState, ScrollDirection, SubscriptionId,
};
use scrollkit_dom::SharedDom;
use scrollkit_tween::{TweenHandle, TweenLike};

struct ClassToggle {
    element: ElementId,
    classes: String,
}

/// A single scroll-driven scene.
///
/// Scenes are constructed standalone (no side effects) and become active
/// once added to a [`Controller`](crate::Controller), which takes
/// ownership. All setters chain and only fire `Change`/`Shift` events when
/// the value actually differs.
pub struct Scene {
    dom: SharedDom,
    options: SceneOptions,
    /// Resolved duration in scroll pixels; re-resolved on refresh for
    /// dynamic durations.
    duration_value: f64,
    progress: f64,
    state: SceneState,
    /// Cached scroll offset window.
    start: f64,
    end: f64,
    /// Cached trigger element position along the scroll axis.
    trigger_pos: f64,
    tween: Option<TweenHandle>,
    pin: Option<PinBinding>,
    class_toggle: Option<ClassToggle>,
    bus: EventBus,
    enabled: bool,
    /// Snapshot of the owning controller, updated on every update pass.
    info: Option<ControllerInfo>,
    controller_enabled: bool,
    /// Set when the offset window moved; the controller re-sorts on it.
    offset_dirty: bool,
}

impl Scene {
    pub fn new(dom: SharedDom, mut options: SceneOptions) -> Self {
        let duration_value = {
            let raw = options.duration.resolve();
            if raw.is_finite() && raw >= 0.0 {
                raw
            } else {
                log_error!(options.loglevel, raw, "invalid value for option \"duration\"");
                options.duration = Duration::default();
                0.0
            }
        };
        if !options.offset.is_finite() {
            log_error!(
                options.loglevel,
                offset = options.offset,
                "invalid value for option \"offset\""
            );
            options.offset = 0.0;
        }
        if let Some(el) = options.trigger_element {
            if !dom.lock().unwrap().element_exists(el) {
                log_error!(
                    options.loglevel,
                    "element defined in option \"trigger_element\" was not found"
                );
                options.trigger_element = None;
            }
        }
        Self {
            dom,
            duration_value,
            options,
            progress: 0.0,
            state: SceneState::Before,
            start: 0.0,
            end: 0.0,
            trigger_pos: 0.0,
            tween: None,
            pin: None,
            class_toggle: None,
            bus: EventBus::new(),
            enabled: true,
            info: None,
            controller_enabled: true,
            offset_dirty: false,
        }
    }

    // ====================================================================
    // Option getters/setters
    // ====================================================================

    /// Current resolved duration in scroll pixels.
    pub fn duration(&self) -> f64 {
        self.duration_value
    }

    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.options.duration = duration;
        let raw = self.options.duration.resolve();
        let new = if raw.is_finite() && raw >= 0.0 {
            raw
        } else {
            log_error!(self.options.loglevel, raw, "invalid value for option \"duration\"");
            self.options.duration = Duration::default();
            0.0
        };
        if new != self.duration_value {
            self.duration_value = new;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::Duration,
                OptionValue::Number(new),
            ));
            self.handle_shift(ShiftReason::Duration);
        }
        self
    }

    pub fn offset(&self) -> f64 {
        self.options.offset
    }

    pub fn set_offset(&mut self, offset: f64) -> &mut Self {
        let value = if offset.is_finite() {
            offset
        } else {
            log_error!(self.options.loglevel, offset, "invalid value for option \"offset\"");
            0.0
        };
        if value != self.options.offset {
            self.options.offset = value;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::Offset,
                OptionValue::Number(value),
            ));
            self.handle_shift(ShiftReason::Offset);
        }
        self
    }

    pub fn trigger_element(&self) -> Option<ElementId> {
        self.options.trigger_element
    }

    pub fn set_trigger_element(&mut self, element: Option<ElementId>) -> &mut Self {
        let value = match element {
            Some(el) if !self.dom.lock().unwrap().element_exists(el) => {
                log_error!(
                    self.options.loglevel,
                    "element defined in option \"trigger_element\" was not found"
                );
                None
            }
            other => other,
        };
        if value != self.options.trigger_element {
            self.options.trigger_element = value;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::TriggerElement,
                OptionValue::Element(value),
            ));
            self.update_trigger_element_position(false);
        }
        self
    }

    pub fn trigger_hook(&self) -> TriggerHook {
        self.options.trigger_hook
    }

    pub fn set_trigger_hook(&mut self, hook: TriggerHook) -> &mut Self {
        if hook.fraction() != self.options.trigger_hook.fraction() {
            self.options.trigger_hook = hook;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::TriggerHook,
                OptionValue::Number(hook.fraction()),
            ));
            self.handle_shift(ShiftReason::TriggerHook);
        } else {
            self.options.trigger_hook = hook;
        }
        self
    }

    pub fn reverse(&self) -> bool {
        self.options.reverse
    }

    pub fn set_reverse(&mut self, reverse: bool) -> &mut Self {
        if reverse != self.options.reverse {
            self.options.reverse = reverse;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::Reverse,
                OptionValue::Bool(reverse),
            ));
            // The only option that can affect the current state without
            // moving the offset window.
            self.update_immediate();
        }
        self
    }

    pub fn tween_changes(&self) -> bool {
        self.options.tween_changes
    }

    pub fn set_tween_changes(&mut self, tween_changes: bool) -> &mut Self {
        if tween_changes != self.options.tween_changes {
            self.options.tween_changes = tween_changes;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::TweenChanges,
                OptionValue::Bool(tween_changes),
            ));
        }
        self
    }

    pub fn loglevel(&self) -> LogLevel {
        self.options.loglevel
    }

    pub fn set_loglevel(&mut self, loglevel: LogLevel) -> &mut Self {
        if loglevel != self.options.loglevel {
            self.options.loglevel = loglevel;
            self.bus.emit(&SceneEvent::change(
                SceneOptionName::LogLevel,
                OptionValue::Level(loglevel),
            ));
        }
        self
    }

    // ====================================================================
    // Derived state
    // ====================================================================

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    /// The scroll position at which the scene's progress leaves 0.
    pub fn scroll_offset(&self) -> f64 {
        self.start
    }

    /// The trigger's position within the scroll content: the offset option
    /// plus the trigger element's cached position, or the trigger hook's
    /// share of the viewport when no trigger element is set.
    pub fn trigger_position(&self) -> f64 {
        let mut pos = self.options.offset;
        if let Some(info) = &self.info {
            if self.options.trigger_element.is_some() {
                pos += self.trigger_pos;
            } else {
                pos += info.size * self.options.trigger_hook.fraction();
            }
        }
        pos
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling suppresses updates without destroying state; a pinned
    /// scene that is mid-pin unpins in place.
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        if enabled != self.enabled {
            self.enabled = enabled;
            self.update_immediate();
        }
        self
    }

    // ====================================================================
    // Events
    // ====================================================================

    /// Subscribe a handler to one or more event kinds.
    pub fn on<F>(&mut self, kinds: &[SceneEventKind], handler: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent) + Send + 'static,
    {
        self.bus.on(kinds, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    /// Drop every handler registered for `kind`.
    pub fn off_kind(&mut self, kind: SceneEventKind) {
        self.bus.off_kind(kind);
    }

    /// Publish an event to this scene's subscribers.
    pub fn trigger(&mut self, event: &SceneEvent) {
        self.bus.emit(event);
    }

    // ====================================================================
    // Update / refresh / progress
    // ====================================================================

    /// Recompute progress from the cached controller scroll position.
    ///
    /// When the scene or its controller is disabled this degrades to an
    /// unpin-in-place for scenes that are pinned mid-scene. Attached scenes
    /// are normally updated through the controller's frame batch; calling
    /// this directly forces a synchronous pass.
    pub fn update_immediate(&mut self) {
        let Some(info) = self.info else { return };
        if self.controller_enabled && self.enabled {
            let scroll_pos = info.scroll_pos;
            let new_progress = if self.duration_value > 0.0 {
                (scroll_pos - self.start) / (self.end - self.start)
            } else if scroll_pos > self.start {
                1.0
            } else {
                0.0
            };
            self.bus
                .emit(&SceneEvent::update(self.start, self.end, scroll_pos));
            self.set_progress(new_progress);
        } else if self.pin.is_some() && self.state.is_active() {
            self.update_pin_state(true);
        }
    }

    /// Re-resolve dynamic duration and the trigger element position,
    /// firing `Shift` (and `Change` for duration) when either moved.
    pub fn refresh(&mut self) {
        self.update_duration(false);
        self.update_trigger_element_position(false);
    }

    /// Drive the progress state machine.
    ///
    /// Zero-duration scenes toggle between `Before` and `During`; they
    /// never reach `After`. Positive-duration scenes honor the `reverse`
    /// option: with reverse disabled, backward motion does not move
    /// progress, but a pin mid-scene gets its frozen position re-asserted
    /// so it does not drift.
    pub fn set_progress(&mut self, requested: f64) {
        let old_state = self.state;
        let direction = self
            .info
            .map(|i| i.scroll_direction)
            .unwrap_or(ScrollDirection::Paused);
        let reverse_or_forward = self.options.reverse || requested >= self.progress;
        let mut do_update = false;

        if self.duration_value == 0.0 {
            let resolved = if requested < 1.0 && reverse_or_forward {
                0.0
            } else {
                1.0
            };
            do_update = resolved != self.progress;
            self.progress = resolved;
            self.state = if resolved == 0.0 {
                SceneState::Before
            } else {
                SceneState::During
            };
        } else if requested <= 0.0 && old_state != SceneState::Before && reverse_or_forward {
            self.progress = 0.0;
            self.state = SceneState::Before;
            do_update = true;
        } else if requested > 0.0 && requested < 1.0 && reverse_or_forward {
            do_update = requested != self.progress;
            self.progress = requested;
            self.state = SceneState::During;
        } else if requested >= 1.0 && old_state != SceneState::After {
            self.progress = 1.0;
            self.state = SceneState::After;
            do_update = true;
        } else if old_state == SceneState::During && !reverse_or_forward {
            // Scrolled backward mid-scene with reverse disabled: progress
            // stays frozen, but the pin position must be re-asserted so the
            // pinned element does not move back with the page.
            self.update_pin_state(false);
        }

        if do_update {
            let state_changed = self.state != old_state;
            let (progress, state) = (self.progress, self.state);
            let event = move |kind: SceneEventKind| SceneEvent::progress(kind, progress, state, direction);

            if state_changed && old_state != SceneState::During {
                self.apply_class_toggle(true);
                self.bus.emit(&event(SceneEventKind::Enter));
                self.bus.emit(&event(if old_state == SceneState::Before {
                    SceneEventKind::Start
                } else {
                    SceneEventKind::End
                }));
            }
            self.update_tween_progress();
            self.update_pin_state(false);
            self.bus.emit(&event(SceneEventKind::Progress));
            if state_changed && self.state != SceneState::During {
                self.bus.emit(&event(if self.state == SceneState::Before {
                    SceneEventKind::Start
                } else {
                    SceneEventKind::End
                }));
                self.apply_class_toggle(false);
                self.bus.emit(&event(SceneEventKind::Leave));
            }
        }
    }

    // ====================================================================
    // Tween binding
    // ====================================================================

    /// Bind an externally constructed tween. The tween is paused, rewound
    /// and from then on positioned by scene progress.
    pub fn set_tween(&mut self, tween: Box<dyn TweenLike>) -> &mut Self {
        if self.tween.is_some() {
            self.remove_tween(false);
        }
        let mut handle = TweenHandle::new(tween);

        // A tween that moves the trigger element destabilizes the scene's
        // own timing.
        if let (Some(info), Some(trigger)) = (self.info, self.options.trigger_element) {
            if handle.animates_position_of(trigger, info.vertical) {
                log_warn!(
                    self.options.loglevel,
                    "tweening the position of the trigger element affects the scene timing and should be avoided"
                );
            }
        }
        let level = self.options.loglevel;
        handle.set_overwrite_hook(Box::new(move || {
            if level.allows(LogLevel::Warning) {
                tracing::warn!("tween was overwritten by another");
            }
        }));

        self.tween = Some(handle);
        log_debug!(self.options.loglevel, "added tween");
        self.update_tween_progress();
        self
    }

    /// Unbind the tween, optionally rewinding it, and hand it back.
    pub fn remove_tween(&mut self, reset: bool) -> Option<Box<dyn TweenLike>> {
        let handle = self.tween.take()?;
        log_debug!(self.options.loglevel, reset, "removed tween");
        Some(handle.into_inner(reset))
    }

    fn update_tween_progress(&mut self) {
        let active = self.state.is_active();
        let zero_duration = self.duration_value == 0.0;
        let tween_changes = self.options.tween_changes;
        if let Some(tween) = &mut self.tween {
            tween.update_progress(self.progress, active, zero_duration, tween_changes);
        }
    }

    // ====================================================================
    // Class toggle
    // ====================================================================

    /// Add `classes` to `element` while the scene is active and remove
    /// them when it is left.
    pub fn set_class_toggle(&mut self, element: ElementId, classes: &str) -> &mut Self {
        let valid_element = self.dom.lock().unwrap().element_exists(element);
        if !valid_element || classes.trim().is_empty() {
            log_error!(
                self.options.loglevel,
                "invalid {} supplied for class toggle",
                if valid_element { "classes" } else { "element" }
            );
            return self;
        }
        self.class_toggle = Some(ClassToggle {
            element,
            classes: classes.to_string(),
        });
        self
    }

    pub fn remove_class_toggle(&mut self, reset: bool) -> &mut Self {
        if let Some(toggle) = self.class_toggle.take() {
            if reset {
                self.dom
                    .lock()
                    .unwrap()
                    .remove_class(toggle.element, &toggle.classes);
            }
        }
        self
    }

    fn apply_class_toggle(&mut self, add: bool) {
        if let Some(toggle) = &self.class_toggle {
            let mut dom = self.dom.lock().unwrap();
            if add {
                dom.add_class(toggle.element, &toggle.classes);
            } else {
                dom.remove_class(toggle.element, &toggle.classes);
            }
        }
    }

    // ====================================================================
    // Teardown
    // ====================================================================

    /// Tear down tween, pin and class bindings (in that order), publish
    /// `Destroy` and drop all subscriptions.
    pub fn destroy(mut self, reset: bool) {
        self.remove_tween(reset);
        self.remove_pin(reset);
        self.remove_class_toggle(reset);
        self.bus.emit(&SceneEvent::destroy(reset));
        self.bus.clear();
        log_debug!(self.options.loglevel, reset, "destroyed scene");
    }

    // ====================================================================
    // Controller integration
    // ====================================================================

    /// Fill in controller-wide scene defaults, but only where this scene
    /// still carries the built-in default. Runs before attachment, so no
    /// change events fire.
    pub(crate) fn apply_global_options(&mut self, global: &crate::options::GlobalSceneOptions) {
        let defaults = SceneOptions::default();
        if let Some(duration) = global.duration {
            let untouched = !self.options.duration.is_dynamic() && self.duration_value == 0.0;
            if untouched && duration.is_finite() && duration >= 0.0 {
                self.options.duration = Duration::Fixed(duration);
                self.duration_value = duration;
            }
        }
        if let Some(offset) = global.offset {
            if self.options.offset == defaults.offset && offset.is_finite() {
                self.options.offset = offset;
            }
        }
        if let Some(trigger_element) = global.trigger_element {
            if self.options.trigger_element == defaults.trigger_element {
                self.options.trigger_element = trigger_element;
            }
        }
        if let Some(trigger_hook) = global.trigger_hook {
            if self.options.trigger_hook == defaults.trigger_hook {
                self.options.trigger_hook = trigger_hook;
            }
        }
        if let Some(reverse) = global.reverse {
            if self.options.reverse == defaults.reverse {
                self.options.reverse = reverse;
            }
        }
        if let Some(tween_changes) = global.tween_changes {
            if self.options.tween_changes == defaults.tween_changes {
                self.options.tween_changes = tween_changes;
            }
        }
        if let Some(loglevel) = global.loglevel {
            if self.options.loglevel == defaults.loglevel {
                self.options.loglevel = loglevel;
            }
        }
    }

    pub(crate) fn attach(&mut self, info: ControllerInfo, controller_enabled: bool) {
        self.info = Some(info);
        self.controller_enabled = controller_enabled;
        self.update_duration(true);
        self.update_trigger_element_position(true);
        self.update_scroll_offset();
        self.update_pin_spacer_size();
        self.offset_dirty = true;
        log_debug!(self.options.loglevel, "added to controller");
    }

    pub(crate) fn detach(&mut self) {
        self.info = None;
        log_debug!(self.options.loglevel, "removed from controller");
    }

    pub(crate) fn controller_update(&mut self, info: ControllerInfo, controller_enabled: bool) {
        self.info = Some(info);
        self.controller_enabled = controller_enabled;
        self.update_immediate();
    }

    pub(crate) fn controller_refresh(&mut self, info: ControllerInfo, controller_enabled: bool) {
        self.info = Some(info);
        self.controller_enabled = controller_enabled;
        self.refresh();
    }

    /// The container's inner size changed. Scenes whose trigger hook is
    /// measured against the viewport shift with it.
    pub(crate) fn container_resized(&mut self, info: ControllerInfo) {
        self.info = Some(info);
        if self.options.trigger_hook.fraction() > 0.0 {
            self.handle_shift(ShiftReason::ContainerSize);
        } else {
            self.update_scroll_offset();
        }
        self.refresh_relative_pin_size();
    }

    pub(crate) fn take_offset_dirty(&mut self) -> bool {
        std::mem::take(&mut self.offset_dirty)
    }

    // ====================================================================
    // Internal recomputation
    // ====================================================================

    /// The offset window moved: recompute it, notify, adjust the pin where
    /// the shift affects it, and reflect the new window in the state.
    fn handle_shift(&mut self, reason: ShiftReason) {
        self.update_scroll_offset();
        self.offset_dirty = true;
        self.bus.emit(&SceneEvent::shift(reason));
        let duration_changed = reason == ShiftReason::Duration;
        if (self.state == SceneState::After && duration_changed)
            || (self.state.is_active() && self.duration_value == 0.0)
        {
            // Duration changes move the end boundary under a finished pin;
            // zero-duration pins track every shift while active.
            self.update_pin_state(false);
        }
        if duration_changed {
            self.update_pin_spacer_size();
        }
        self.update_immediate();
    }

    fn update_scroll_offset(&mut self) {
        let mut start = self.trigger_pos + self.options.offset;
        if let Some(info) = &self.info {
            if self.options.trigger_element.is_some() {
                start -= info.size * self.options.trigger_hook.fraction();
            }
        }
        self.start = start;
        self.end = start + self.duration_value;
    }

    fn update_duration(&mut self, suppress_events: bool) {
        if !self.options.duration.is_dynamic() {
            return;
        }
        let raw = self.options.duration.resolve();
        let new = if raw.is_finite() && raw >= 0.0 {
            raw
        } else {
            log_error!(
                self.options.loglevel,
                raw,
                "dynamic duration returned an invalid value"
            );
            0.0
        };
        if new != self.duration_value {
            self.duration_value = new;
            if suppress_events {
                self.update_scroll_offset();
                self.offset_dirty = true;
            } else {
                self.bus.emit(&SceneEvent::change(
                    SceneOptionName::Duration,
                    OptionValue::Number(new),
                ));
                self.handle_shift(ShiftReason::Duration);
            }
        }
    }

    fn update_trigger_element_position(&mut self, suppress_events: bool) {
        let mut pos = 0.0;
        if let (Some(info), Some(element)) = (self.info, self.options.trigger_element) {
            let dom = self.dom.lock().unwrap();
            let vertical = info.vertical;
            // A pinned trigger sits inside a spacer; the spacer holds the
            // position the trigger would have in flow.
            let mut element = element;
            while let Some(parent) = dom.parent(element) {
                if dom.is_pin_spacer(parent) {
                    element = parent;
                } else {
                    break;
                }
            }
            let mut container_offset = dom.offset(info.container, false).axis(vertical);
            if !info.is_document {
                container_offset -= dom.scroll_offset(info.container, vertical);
            }
            pos = dom.offset(element, false).axis(vertical) - container_offset;
        }
        let changed = pos != self.trigger_pos;
        self.trigger_pos = pos;
        if changed && !suppress_events {
            self.handle_shift(ShiftReason::TriggerElementPosition);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PinOptions;
    use scrollkit_core::Size;
    use scrollkit_dom::{shared, DomEnv, MockDom, NaturalMetrics, PositionMode};
    use std::sync::{Arc, Mutex};

    fn test_dom() -> (SharedDom, ElementId) {
        let mock = MockDom::new(Size::new(800.0, 600.0));
        let root = mock.document_root();
        (shared(mock), root)
    }

    fn info_at(container: ElementId, scroll_pos: f64, delta: f64) -> ControllerInfo {
        ControllerInfo {
            size: 600.0,
            vertical: true,
            scroll_pos,
            scroll_direction: ScrollDirection::from_delta(delta),
            container,
            is_document: true,
        }
    }

    fn recorder(
        scene: &mut Scene,
        kinds: &[SceneEventKind],
    ) -> Arc<Mutex<Vec<&'static str>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        scene.on(kinds, move |event| {
            sink.lock().unwrap().push(match event.kind() {
                SceneEventKind::Change => "change",
                SceneEventKind::Shift => "shift",
                SceneEventKind::Progress => "progress",
                SceneEventKind::Enter => "enter",
                SceneEventKind::Leave => "leave",
                SceneEventKind::Start => "start",
                SceneEventKind::End => "end",
                SceneEventKind::Update => "update",
                SceneEventKind::Destroy => "destroy",
            });
        });
        log
    }

    const PROGRESS_KINDS: &[SceneEventKind] = &[
        SceneEventKind::Enter,
        SceneEventKind::Leave,
        SceneEventKind::Start,
        SceneEventKind::End,
        SceneEventKind::Progress,
    ];

    fn scene_with_window(dom: SharedDom, offset: f64, duration: f64) -> Scene {
        Scene::new(
            dom,
            SceneOptions {
                duration: Duration::Fixed(duration),
                offset,
                trigger_hook: TriggerHook::OnLeave,
                ..SceneOptions::default()
            },
        )
    }

    #[test]
    fn progress_follows_scroll_through_the_window() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 100.0, 100.0);
        scene.attach(info_at(root, 0.0, 0.0), true);

        assert_eq!(scene.scroll_offset(), 100.0);
        assert_eq!(scene.state(), SceneState::Before);

        scene.controller_update(info_at(root, 150.0, 150.0), true);
        assert_eq!(scene.progress(), 0.5);
        assert_eq!(scene.state(), SceneState::During);

        scene.controller_update(info_at(root, 250.0, 100.0), true);
        assert_eq!(scene.progress(), 1.0);
        assert_eq!(scene.state(), SceneState::After);
    }

    #[test]
    fn boundary_event_order_is_fixed() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 100.0, 100.0);
        let log = recorder(&mut scene, PROGRESS_KINDS);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 150.0, 150.0), true);
        assert_eq!(*log.lock().unwrap(), vec!["enter", "start", "progress"]);

        log.lock().unwrap().clear();
        scene.controller_update(info_at(root, 250.0, 100.0), true);
        assert_eq!(*log.lock().unwrap(), vec!["progress", "end", "leave"]);
    }

    #[test]
    fn zero_duration_scene_toggles_and_never_reaches_after() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 0.0, 0.0);
        let log = recorder(&mut scene, PROGRESS_KINDS);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 50.0, 50.0), true);
        assert_eq!(scene.state(), SceneState::During);
        assert_eq!(scene.progress(), 1.0);
        assert_eq!(*log.lock().unwrap(), vec!["enter", "start", "progress"]);

        log.lock().unwrap().clear();
        scene.controller_update(info_at(root, 0.0, -50.0), true);
        assert_eq!(scene.state(), SceneState::Before);
        assert_eq!(*log.lock().unwrap(), vec!["progress", "start", "leave"]);
    }

    #[test]
    fn repeated_updates_at_the_same_position_fire_once() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 0.0, 0.0);
        let log = recorder(&mut scene, PROGRESS_KINDS);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 50.0, 50.0), true);
        let after_first = log.lock().unwrap().len();
        scene.controller_update(info_at(root, 50.0, 0.0), true);
        assert_eq!(log.lock().unwrap().len(), after_first);

        // Same check mid-window with a positive duration: an unchanged
        // progress value must not re-fire Progress.
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 0.0, 100.0);
        let log = recorder(&mut scene, PROGRESS_KINDS);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 50.0, 50.0), true);
        assert_eq!(scene.progress(), 0.5);
        let after_first = log.lock().unwrap().len();
        scene.controller_update(info_at(root, 50.0, 0.0), true);
        assert_eq!(scene.progress(), 0.5);
        assert_eq!(log.lock().unwrap().len(), after_first);
    }

    #[test]
    fn reverse_disabled_freezes_progress_on_backward_scroll() {
        let (dom, root) = test_dom();
        let mut scene = Scene::new(
            dom,
            SceneOptions {
                duration: Duration::Fixed(100.0),
                offset: 100.0,
                trigger_hook: TriggerHook::OnLeave,
                reverse: false,
                ..SceneOptions::default()
            },
        );
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 250.0, 250.0), true);
        assert_eq!(scene.state(), SceneState::After);

        scene.controller_update(info_at(root, 0.0, -250.0), true);
        assert_eq!(scene.state(), SceneState::After);
        assert_eq!(scene.progress(), 1.0);
    }

    #[test]
    fn setters_only_notify_on_real_changes() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 100.0, 100.0);
        let log = recorder(&mut scene, &[SceneEventKind::Change, SceneEventKind::Shift]);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.set_offset(100.0);
        assert!(log.lock().unwrap().is_empty());

        scene.set_offset(200.0);
        assert_eq!(*log.lock().unwrap(), vec!["change", "shift"]);
        assert_eq!(scene.scroll_offset(), 200.0);

        log.lock().unwrap().clear();
        scene.set_trigger_hook(TriggerHook::Fraction(0.0));
        assert!(log.lock().unwrap().is_empty(), "same fraction is not a change");
    }

    #[test]
    fn invalid_duration_falls_back_to_default() {
        let (dom, _root) = test_dom();
        let mut scene = scene_with_window(dom, 0.0, 100.0);
        scene.set_duration(Duration::Fixed(-5.0));
        assert_eq!(scene.duration(), 0.0);
    }

    #[test]
    fn pin_refuses_missing_and_fixed_elements() {
        let mut mock = MockDom::new(Size::new(800.0, 600.0));
        let stale = mock.create_element("stale");
        let overlay = mock.create_element("overlay");
        mock.set_natural_metrics(
            overlay,
            NaturalMetrics {
                position: PositionMode::Fixed,
                ..Default::default()
            },
        );
        mock.remove_element(stale);
        let mut scene = scene_with_window(shared(mock), 0.0, 100.0);

        scene.set_pin(stale, PinOptions::default());
        assert_eq!(scene.pinned_element(), None);

        scene.set_pin(overlay, PinOptions::default());
        assert_eq!(scene.pinned_element(), None);
    }

    #[test]
    fn class_toggle_follows_active_state() {
        let mut mock = MockDom::new(Size::new(800.0, 600.0));
        let target = mock.create_element("banner");
        let root = mock.document_root();
        let dom = shared(mock);

        let mut scene = scene_with_window(dom.clone(), 100.0, 100.0);
        scene.set_class_toggle(target, "active highlighted");
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.controller_update(info_at(root, 150.0, 150.0), true);
        {
            let env = dom.lock().unwrap();
            assert!(env.has_class(target, "active"));
            assert!(env.has_class(target, "highlighted"));
        }

        scene.controller_update(info_at(root, 250.0, 100.0), true);
        assert!(!dom.lock().unwrap().has_class(target, "active"));
    }

    #[test]
    fn trigger_element_anchors_the_window() {
        let mut mock = MockDom::new(Size::new(800.0, 600.0));
        let trigger = mock.create_element("trigger");
        mock.set_position(trigger, scrollkit_core::Point::new(0.0, 900.0));
        let root = mock.document_root();
        let dom = shared(mock);

        let mut scene = Scene::new(
            dom,
            SceneOptions {
                duration: Duration::Fixed(100.0),
                trigger_element: Some(trigger),
                trigger_hook: TriggerHook::OnCenter,
                ..SceneOptions::default()
            },
        );
        scene.attach(info_at(root, 0.0, 0.0), true);
        // trigger at 900, hook takes half the 600px viewport away
        assert_eq!(scene.scroll_offset(), 600.0);
        assert_eq!(scene.trigger_position(), 900.0);
    }

    #[test]
    fn destroy_notifies_and_releases_subscribers() {
        let (dom, root) = test_dom();
        let mut scene = scene_with_window(dom, 0.0, 100.0);
        let log = recorder(&mut scene, &[SceneEventKind::Destroy]);
        scene.attach(info_at(root, 0.0, 0.0), true);

        scene.destroy(true);
        assert_eq!(*log.lock().unwrap(), vec!["destroy"]);
    }

    #[test]
    fn global_defaults_fill_only_untouched_options() {
        let (dom, _root) = test_dom();
        let global = crate::options::GlobalSceneOptions {
            duration: Some(300.0),
            reverse: Some(false),
            ..Default::default()
        };

        let mut untouched = Scene::new(dom.clone(), SceneOptions::default());
        untouched.apply_global_options(&global);
        assert_eq!(untouched.duration(), 300.0);
        assert!(!untouched.reverse());

        let mut explicit = Scene::new(
            dom,
            SceneOptions {
                duration: Duration::Fixed(50.0),
                ..SceneOptions::default()
            },
        );
        explicit.apply_global_options(&global);
        assert_eq!(explicit.duration(), 50.0);
    }
}
