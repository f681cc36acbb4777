//! Timeline orchestration for multiple animations
//!
//! A concrete [`TweenLike`] for hosts without their own animation engine.
//! Entries interpolate plain values or element properties over a shared
//! playhead; the playhead itself is positioned by a scene or advanced by
//! [`Timeline::tick`].

use crate::easing::Easing;
use crate::handle::TweenLike;
use scrollkit_core::ElementId;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct TimelineEntryId;
}

/// Element property an entry writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Property {
    X,
    Y,
    Opacity,
    Scale,
}

impl Property {
    fn moves_axis(&self, vertical: bool) -> bool {
        matches!(
            (self, vertical),
            (Property::Y, true) | (Property::X, false)
        )
    }
}

/// An entry in a timeline
struct TimelineEntry {
    /// Offset in milliseconds from timeline start
    offset_ms: f64,
    /// Duration of the animation
    duration_ms: f64,
    start_value: f64,
    end_value: f64,
    easing: Easing,
    /// Element property driven by this entry, if any
    binding: Option<(ElementId, Property)>,
}

/// A timeline that orchestrates multiple animations
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    position_ms: f64,
    duration_ms: f64,
    paused: bool,
    reversed: bool,
    /// Position the playhead is animating toward, as milliseconds.
    seek_target_ms: Option<f64>,
    repeat: i32, // -1 for infinite
    current_loop: i32,
    yoyo: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            position_ms: 0.0,
            duration_ms: 0.0,
            paused: true,
            reversed: false,
            seek_target_ms: None,
            repeat: 0,
            current_loop: 0,
            yoyo: false,
        }
    }

    /// Add a value animation at a given offset
    pub fn add(
        &mut self,
        offset_ms: f64,
        duration_ms: f64,
        start_value: f64,
        end_value: f64,
        easing: Easing,
    ) -> TimelineEntryId {
        self.insert_entry(offset_ms, duration_ms, start_value, end_value, easing, None)
    }

    /// Add an animation bound to an element property
    pub fn add_element(
        &mut self,
        element: ElementId,
        property: Property,
        offset_ms: f64,
        duration_ms: f64,
        start_value: f64,
        end_value: f64,
        easing: Easing,
    ) -> TimelineEntryId {
        self.insert_entry(
            offset_ms,
            duration_ms,
            start_value,
            end_value,
            easing,
            Some((element, property)),
        )
    }

    fn insert_entry(
        &mut self,
        offset_ms: f64,
        duration_ms: f64,
        start_value: f64,
        end_value: f64,
        easing: Easing,
        binding: Option<(ElementId, Property)>,
    ) -> TimelineEntryId {
        let id = self.entries.insert(TimelineEntry {
            offset_ms,
            duration_ms,
            start_value,
            end_value,
            easing,
            binding,
        });

        // Update total duration
        self.duration_ms = self.duration_ms.max(offset_ms.max(0.0) + duration_ms);

        id
    }

    /// Advance the playhead
    pub fn tick(&mut self, dt_ms: f64) {
        if self.paused || self.duration_ms == 0.0 {
            return;
        }

        let step = if self.reversed { -dt_ms } else { dt_ms };
        self.position_ms += step;

        if let Some(target) = self.seek_target_ms {
            let arrived = if step >= 0.0 {
                self.position_ms >= target
            } else {
                self.position_ms <= target
            };
            if arrived {
                self.position_ms = target;
                self.seek_target_ms = None;
                self.paused = true;
            }
            return;
        }

        if self.position_ms >= self.duration_ms {
            if self.repeat == -1 || self.current_loop < self.repeat {
                self.current_loop += 1;
                if self.yoyo {
                    self.position_ms = self.duration_ms;
                    self.reversed = true;
                } else {
                    self.position_ms -= self.duration_ms;
                }
            } else {
                self.position_ms = self.duration_ms;
                self.paused = true;
            }
        } else if self.position_ms <= 0.0 && self.reversed {
            if self.yoyo && (self.repeat == -1 || self.current_loop < self.repeat) {
                self.current_loop += 1;
                self.position_ms = 0.0;
                self.reversed = false;
            } else {
                self.position_ms = 0.0;
                self.paused = true;
            }
        }
    }

    /// Get the current value for an animation entry
    pub fn value(&self, id: TimelineEntryId) -> Option<f64> {
        let entry = self.entries.get(id)?;

        let local_time = self.position_ms - entry.offset_ms;

        if local_time <= 0.0 {
            return Some(entry.start_value);
        }
        if local_time >= entry.duration_ms {
            return Some(entry.end_value);
        }

        let progress = entry.easing.apply(local_time / entry.duration_ms);
        Some(entry.start_value + (entry.end_value - entry.start_value) * progress)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TweenLike for Timeline {
    fn play(&mut self) {
        self.paused = false;
        self.reversed = false;
        self.seek_target_ms = None;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn reverse(&mut self) {
        self.paused = false;
        self.reversed = true;
        self.seek_target_ms = None;
    }

    fn progress(&self) -> f64 {
        if self.duration_ms == 0.0 {
            0.0
        } else {
            self.position_ms / self.duration_ms
        }
    }

    fn set_progress(&mut self, progress: f64) {
        self.position_ms = progress.clamp(0.0, 1.0) * self.duration_ms;
        self.seek_target_ms = None;
    }

    fn tween_to(&mut self, progress: f64) {
        let target = progress.clamp(0.0, 1.0) * self.duration_ms;
        self.reversed = target < self.position_ms;
        self.seek_target_ms = Some(target);
        self.paused = false;
    }

    fn duration(&self) -> f64 {
        self.duration_ms
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn repeat(&self) -> i32 {
        self.repeat
    }

    fn set_repeat(&mut self, count: i32) {
        self.repeat = count;
    }

    fn yoyo(&self) -> bool {
        self.yoyo
    }

    fn set_yoyo(&mut self, yoyo: bool) {
        self.yoyo = yoyo;
    }

    fn animates_position_of(&self, el: ElementId, vertical: bool) -> bool {
        self.entries.values().any(|entry| {
            entry
                .binding
                .map(|(element, property)| element == el && property.moves_axis(vertical))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::Key;

    #[test]
    fn values_interpolate_with_easing() {
        let mut timeline = Timeline::new();
        let linear = timeline.add(0.0, 1000.0, 0.0, 100.0, Easing::Linear);
        let delayed = timeline.add(500.0, 500.0, 10.0, 20.0, Easing::Linear);

        timeline.set_progress(0.5);
        assert_eq!(timeline.value(linear), Some(50.0));
        assert_eq!(timeline.value(delayed), Some(10.0));

        timeline.set_progress(1.0);
        assert_eq!(timeline.value(linear), Some(100.0));
        assert_eq!(timeline.value(delayed), Some(20.0));
    }

    #[test]
    fn tick_runs_to_completion_and_pauses() {
        let mut timeline = Timeline::new();
        timeline.add(0.0, 100.0, 0.0, 1.0, Easing::Linear);
        timeline.play();
        for _ in 0..20 {
            timeline.tick(16.0);
        }
        assert!(timeline.paused());
        assert_eq!(timeline.progress(), 1.0);
    }

    #[test]
    fn tween_to_stops_at_target() {
        let mut timeline = Timeline::new();
        timeline.add(0.0, 1000.0, 0.0, 1.0, Easing::Linear);
        timeline.tween_to(0.5);
        assert!(!timeline.paused());
        for _ in 0..100 {
            timeline.tick(16.0);
        }
        assert!(timeline.paused());
        assert_eq!(timeline.progress(), 0.5);
    }

    #[test]
    fn yoyo_reverses_at_the_end() {
        let mut timeline = Timeline::new();
        timeline.add(0.0, 100.0, 0.0, 1.0, Easing::Linear);
        timeline.set_repeat(-1);
        timeline.set_yoyo(true);
        timeline.play();
        for _ in 0..8 {
            timeline.tick(16.0);
        }
        // Past the first boundary the playhead must be heading back down.
        assert!(!timeline.paused());
        assert!(timeline.progress() < 1.0);
    }

    #[test]
    fn position_binding_is_reported_per_axis() {
        let mut timeline = Timeline::new();
        let el = ElementId::null();
        timeline.add_element(el, Property::Y, 0.0, 100.0, 0.0, 50.0, Easing::Linear);
        assert!(timeline.animates_position_of(el, true));
        assert!(!timeline.animates_position_of(el, false));

        let mut horizontal = Timeline::new();
        horizontal.add_element(el, Property::Opacity, 0.0, 100.0, 0.0, 1.0, Easing::Linear);
        assert!(!horizontal.animates_position_of(el, true));
    }
}
