//! Scroll-driven tween control
//!
//! A scene does not care what animation engine sits behind it. It drives
//! anything implementing [`TweenLike`] through a [`TweenHandle`], which owns
//! the scroll-to-animation mapping: direct seeking for bound scenes, play or
//! reverse for zero-duration triggers, and play/pause gating for infinitely
//! repeating tweens.

use scrollkit_core::ElementId;

const PROGRESS_EPSILON: f64 = 1e-9;

/// Contract between a scene and the animation it controls.
///
/// Progress values are normalized to `0.0..=1.0` of the tween's own
/// duration.
pub trait TweenLike: Send {
    /// Resume playback in the forward direction.
    fn play(&mut self);

    /// Halt playback at the current position.
    fn pause(&mut self);

    /// Resume playback toward the start.
    fn reverse(&mut self);

    /// Current playhead position as a fraction of the duration.
    fn progress(&self) -> f64;

    /// Seek to a position without playing.
    fn set_progress(&mut self, progress: f64);

    /// Animate the playhead toward a position at natural speed.
    fn tween_to(&mut self, progress: f64);

    /// Total duration in milliseconds.
    fn duration(&self) -> f64;

    fn paused(&self) -> bool;

    /// Repeat count, `-1` for infinite.
    fn repeat(&self) -> i32;

    fn set_repeat(&mut self, count: i32);

    /// Whether repeats alternate direction.
    fn yoyo(&self) -> bool;

    fn set_yoyo(&mut self, yoyo: bool);

    /// Whether the tween animates the position of `el` along the given
    /// axis. Used to warn when an animation moves its own trigger.
    fn animates_position_of(&self, el: ElementId, vertical: bool) -> bool;

    /// Install a callback invoked when another tween overwrites one of this
    /// tween's targets. Engines without overwrite detection ignore it.
    fn set_overwrite_hook(&mut self, _hook: Box<dyn Fn() + Send + Sync>) {}
}

/// Owning wrapper that keeps a tween under scroll control.
///
/// Wrapping pauses the tween and rewinds it; from then on the playhead only
/// moves through [`TweenHandle::update_progress`].
pub struct TweenHandle {
    inner: Box<dyn TweenLike>,
}

impl TweenHandle {
    pub fn new(mut tween: Box<dyn TweenLike>) -> Self {
        tween.pause();
        tween.set_progress(0.0);
        Self { inner: tween }
    }

    /// Push the scene progress into the tween.
    ///
    /// `active` means the scene is between its start and end positions (or
    /// past the start of a zero-duration scene). `tween_changes` selects
    /// animated seeking over a hard jump for scenes with a scroll distance.
    /// Returns whether the tween was touched.
    pub fn update_progress(
        &mut self,
        to: f64,
        active: bool,
        zero_duration: bool,
        tween_changes: bool,
    ) -> bool {
        let target = to.clamp(0.0, 1.0);
        if self.inner.repeat() == -1 {
            // Infinitely repeating tweens cannot be positioned by progress;
            // they run while the scene is active and halt otherwise.
            if active && self.inner.paused() {
                self.inner.play();
                return true;
            }
            if !active && !self.inner.paused() {
                self.inner.pause();
                return true;
            }
            return false;
        }
        if (target - self.inner.progress()).abs() <= PROGRESS_EPSILON {
            return false;
        }
        if zero_duration {
            // No scroll distance to map onto, so the crossing direction
            // decides playback direction.
            if target > 0.0 {
                self.inner.play();
            } else {
                self.inner.reverse();
            }
        } else if tween_changes {
            self.inner.tween_to(target);
        } else {
            self.inner.set_progress(target);
            self.inner.pause();
        }
        true
    }

    pub fn progress(&self) -> f64 {
        self.inner.progress()
    }

    pub fn animates_position_of(&self, el: ElementId, vertical: bool) -> bool {
        self.inner.animates_position_of(el, vertical)
    }

    pub fn set_overwrite_hook(&mut self, hook: Box<dyn Fn() + Send + Sync>) {
        self.inner.set_overwrite_hook(hook);
    }

    /// Release the tween, leaving it wherever `reset` says.
    pub fn into_inner(mut self, reset: bool) -> Box<dyn TweenLike> {
        if reset {
            self.inner.pause();
            self.inner.set_progress(0.0);
        }
        self.inner
    }
}
