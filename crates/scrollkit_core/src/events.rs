//! Typed scene event bus
//!
//! Scenes and controllers communicate state changes through a
//! publish/subscribe bus. Event kinds and payloads are paired at compile
//! time: constructors only build valid combinations, so a `Progress` event
//! always carries progress data and a `Shift` always carries its reason.

use crate::log::LogLevel;
use crate::state::{SceneState, ScrollDirection};
use crate::ElementId;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle returned by [`EventBus::on`]; pass to [`EventBus::off`] to
    /// unsubscribe.
    pub struct SubscriptionId;
}

/// The notification kinds a scene emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEventKind {
    /// An option value actually changed.
    Change,
    /// The scene's start/end scroll-offset window moved.
    Shift,
    /// The progress value changed.
    Progress,
    /// The scene entered its active scroll timeframe.
    Enter,
    /// The scene left its active scroll timeframe.
    Leave,
    /// The scroll position crossed the scene's start boundary.
    Start,
    /// The scroll position crossed the scene's end boundary.
    End,
    /// The scene was recomputed (not necessarily with a progress change).
    Update,
    /// The scene is being torn down.
    Destroy,
}

/// Why a scene's offset window shifted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftReason {
    Duration,
    Offset,
    TriggerHook,
    TriggerElementPosition,
    ContainerSize,
}

/// Identifies a scene option in `Change` payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneOptionName {
    Duration,
    Offset,
    TriggerElement,
    TriggerHook,
    Reverse,
    TweenChanges,
    LogLevel,
}

impl SceneOptionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneOptionName::Duration => "duration",
            SceneOptionName::Offset => "offset",
            SceneOptionName::TriggerElement => "trigger_element",
            SceneOptionName::TriggerHook => "trigger_hook",
            SceneOptionName::Reverse => "reverse",
            SceneOptionName::TweenChanges => "tween_changes",
            SceneOptionName::LogLevel => "loglevel",
        }
    }
}

/// The new value carried by a `Change` event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OptionValue {
    Number(f64),
    Bool(bool),
    Level(LogLevel),
    Element(Option<ElementId>),
}

/// Payload variants, paired with their kinds by the [`SceneEvent`]
/// constructors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEventData {
    /// For `Progress`, `Enter`, `Leave`, `Start` and `End`.
    Progress {
        progress: f64,
        state: SceneState,
        scroll_direction: ScrollDirection,
    },
    /// For `Change`.
    Change {
        option: SceneOptionName,
        value: OptionValue,
    },
    /// For `Shift`.
    Shift { reason: ShiftReason },
    /// For `Update`.
    Update {
        start: f64,
        end: f64,
        scroll_pos: f64,
    },
    /// For `Destroy`.
    Destroy { reset: bool },
}

/// A single notification emitted by a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEvent {
    kind: SceneEventKind,
    data: SceneEventData,
}

impl SceneEvent {
    /// Build a progress-family event (`Progress`, `Enter`, `Leave`,
    /// `Start`, `End`).
    pub fn progress(
        kind: SceneEventKind,
        progress: f64,
        state: SceneState,
        scroll_direction: ScrollDirection,
    ) -> Self {
        debug_assert!(matches!(
            kind,
            SceneEventKind::Progress
                | SceneEventKind::Enter
                | SceneEventKind::Leave
                | SceneEventKind::Start
                | SceneEventKind::End
        ));
        Self {
            kind,
            data: SceneEventData::Progress {
                progress,
                state,
                scroll_direction,
            },
        }
    }

    pub fn change(option: SceneOptionName, value: OptionValue) -> Self {
        Self {
            kind: SceneEventKind::Change,
            data: SceneEventData::Change { option, value },
        }
    }

    pub fn shift(reason: ShiftReason) -> Self {
        Self {
            kind: SceneEventKind::Shift,
            data: SceneEventData::Shift { reason },
        }
    }

    pub fn update(start: f64, end: f64, scroll_pos: f64) -> Self {
        Self {
            kind: SceneEventKind::Update,
            data: SceneEventData::Update {
                start,
                end,
                scroll_pos,
            },
        }
    }

    pub fn destroy(reset: bool) -> Self {
        Self {
            kind: SceneEventKind::Destroy,
            data: SceneEventData::Destroy { reset },
        }
    }

    pub fn kind(&self) -> SceneEventKind {
        self.kind
    }

    pub fn data(&self) -> &SceneEventData {
        &self.data
    }

    /// Progress value, for progress-family events.
    pub fn progress_value(&self) -> Option<f64> {
        match self.data {
            SceneEventData::Progress { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// Scene state, for progress-family events.
    pub fn state(&self) -> Option<SceneState> {
        match self.data {
            SceneEventData::Progress { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Scroll direction, for progress-family events.
    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        match self.data {
            SceneEventData::Progress {
                scroll_direction, ..
            } => Some(scroll_direction),
            _ => None,
        }
    }

    /// Shift reason, for `Shift` events.
    pub fn shift_reason(&self) -> Option<ShiftReason> {
        match self.data {
            SceneEventData::Shift { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Handler invoked for each matching event.
pub type EventHandler = Box<dyn FnMut(&SceneEvent) + Send>;

struct Subscription {
    kinds: SmallVec<[SceneEventKind; 4]>,
    handler: EventHandler,
}

/// Publish/subscribe dispatch for scene notifications.
///
/// Handlers fire in subscription order, which keeps side-effect ordering
/// deterministic within a single emit.
pub struct EventBus {
    subs: SlotMap<SubscriptionId, Subscription>,
    order: Vec<SubscriptionId>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subs: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Subscribe a handler to one or more event kinds.
    pub fn on<F>(&mut self, kinds: &[SceneEventKind], handler: F) -> SubscriptionId
    where
        F: FnMut(&SceneEvent) + Send + 'static,
    {
        let id = self.subs.insert(Subscription {
            kinds: SmallVec::from_slice(kinds),
            handler: Box::new(handler),
        });
        self.order.push(id);
        id
    }

    /// Remove a subscription. Returns `false` if the handle was stale.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subs.remove(id).is_some();
        if removed {
            self.order.retain(|s| *s != id);
        }
        removed
    }

    /// Remove a kind from every subscription, dropping subscriptions that
    /// are left without any kind.
    pub fn off_kind(&mut self, kind: SceneEventKind) {
        let mut empty: SmallVec<[SubscriptionId; 4]> = SmallVec::new();
        for (id, sub) in self.subs.iter_mut() {
            sub.kinds.retain(|k| *k != kind);
            if sub.kinds.is_empty() {
                empty.push(id);
            }
        }
        for id in empty {
            self.off(id);
        }
    }

    /// Remove all subscriptions.
    pub fn clear(&mut self) {
        self.subs.clear();
        self.order.clear();
    }

    /// Dispatch an event to every subscription registered for its kind.
    pub fn emit(&mut self, event: &SceneEvent) {
        // Snapshot the order so handler bookkeeping stays stable even if a
        // subscription was created between emits.
        for i in 0..self.order.len() {
            let id = self.order[i];
            if let Some(sub) = self.subs.get_mut(id) {
                if sub.kinds.contains(&event.kind) {
                    (sub.handler)(event);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn enter_event() -> SceneEvent {
        SceneEvent::progress(
            SceneEventKind::Enter,
            0.0,
            SceneState::During,
            ScrollDirection::Forward,
        )
    }

    #[test]
    fn handler_fires_for_matching_kind_only() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();

        bus.on(&[SceneEventKind::Enter], move |_| {
            *hits_clone.lock().unwrap() += 1;
        });

        bus.emit(&enter_event());
        bus.emit(&SceneEvent::shift(ShiftReason::Offset));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn off_stops_delivery() {
        let mut bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();

        let sub = bus.on(&[SceneEventKind::Enter], move |_| {
            *hits_clone.lock().unwrap() += 1;
        });

        bus.emit(&enter_event());
        assert!(bus.off(sub));
        assert!(!bus.off(sub));
        bus.emit(&enter_event());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn handlers_fire_in_subscription_order() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.on(&[SceneEventKind::Progress], move |_| {
                seen.lock().unwrap().push(tag);
            });
        }

        bus.emit(&SceneEvent::progress(
            SceneEventKind::Progress,
            0.5,
            SceneState::During,
            ScrollDirection::Forward,
        ));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn off_kind_drops_emptied_subscriptions() {
        let mut bus = EventBus::new();
        bus.on(&[SceneEventKind::Enter, SceneEventKind::Leave], |_| {});
        bus.on(&[SceneEventKind::Enter], |_| {});

        bus.off_kind(SceneEventKind::Enter);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn payload_accessors() {
        let event = SceneEvent::progress(
            SceneEventKind::Progress,
            0.25,
            SceneState::During,
            ScrollDirection::Reverse,
        );
        assert_eq!(event.progress_value(), Some(0.25));
        assert_eq!(event.state(), Some(SceneState::During));
        assert_eq!(event.scroll_direction(), Some(ScrollDirection::Reverse));
        assert_eq!(event.shift_reason(), None);

        let shift = SceneEvent::shift(ShiftReason::Duration);
        assert_eq!(shift.shift_reason(), Some(ShiftReason::Duration));
        assert_eq!(shift.progress_value(), None);
    }
}
