//! The DOM-like environment contract
//!
//! Structural mutation here is deliberately narrow: the controller core only
//! ever wraps elements in pin spacers, reparents across them, and removes
//! them again. Everything else is reads, style writes and class toggles.

use scrollkit_core::{ElementId, Point, Size};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

/// Shared handle to the environment, used by controllers and scenes alike.
pub type SharedDom = Arc<Mutex<dyn DomEnv + Send>>;

/// Positioning mode of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionMode {
    #[default]
    Static,
    Relative,
    Absolute,
    /// Fixed-position elements cannot be pinned; the offset math is
    /// meaningless for them.
    Fixed,
}

/// Outer display type of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    ListItem,
    Table,
}

impl Display {
    /// Whether vertical margins of children collapse through this display
    /// type. Decides how a pin spacer inherits margins.
    pub fn collapses_margins(&self) -> bool {
        matches!(
            self,
            Display::Block | Display::Flex | Display::ListItem | Display::Table
        )
    }
}

/// Box sizing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

/// A length-valued style property.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    /// Not set / determined by layout.
    #[default]
    Auto,
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the containing block.
    Percent(f64),
    /// Inherit from the parent (used when a pinned element hands size
    /// authority to its spacer).
    Inherit,
}

impl Dimension {
    pub fn is_relative(&self) -> bool {
        matches!(self, Dimension::Percent(_))
    }

    /// Resolved pixel value, treating everything non-absolute as zero.
    pub fn px_or_zero(&self) -> f64 {
        match self {
            Dimension::Px(v) => *v,
            _ => 0.0,
        }
    }
}

/// Resolved pixel values for the four sides of a box property.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    /// Leading edge along the scroll axis.
    pub fn leading(&self, vertical: bool) -> f64 {
        if vertical {
            self.top
        } else {
            self.left
        }
    }

    /// Trailing edge along the scroll axis.
    pub fn trailing(&self, vertical: bool) -> f64 {
        if vertical {
            self.bottom
        } else {
            self.right
        }
    }
}

/// A partial inline-style write. `None` fields are left untouched.
///
/// A full snapshot of an element's inline style is also expressed as a
/// patch, which makes restoring the original style a plain
/// [`DomEnv::set_inline_style`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePatch {
    pub position: Option<PositionMode>,
    pub display: Option<Display>,
    pub box_sizing: Option<BoxSizing>,
    pub top: Option<Dimension>,
    pub left: Option<Dimension>,
    pub bottom: Option<Dimension>,
    pub right: Option<Dimension>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub margin_top: Option<Dimension>,
    pub margin_bottom: Option<Dimension>,
    pub margin_left: Option<Dimension>,
    pub margin_right: Option<Dimension>,
    pub padding_top: Option<Dimension>,
    pub padding_bottom: Option<Dimension>,
    pub padding_left: Option<Dimension>,
    pub padding_right: Option<Dimension>,
}

impl StylePatch {
    /// Merge another patch on top of this one.
    pub fn merge(&mut self, other: &StylePatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(
            position, display, box_sizing, top, left, bottom, right, width, height, min_width,
            min_height, margin_top, margin_bottom, margin_left, margin_right, padding_top,
            padding_bottom, padding_left, padding_right
        );
    }

    /// Set the leading-axis inset (`top` for vertical, `left` otherwise).
    pub fn set_leading_inset(&mut self, vertical: bool, value: Dimension) {
        if vertical {
            self.top = Some(value);
        } else {
            self.left = Some(value);
        }
    }

    /// Set the axis padding pair (`top`/`bottom` for vertical,
    /// `left`/`right` otherwise).
    pub fn set_axis_padding(&mut self, vertical: bool, leading: Dimension, trailing: Dimension) {
        if vertical {
            self.padding_top = Some(leading);
            self.padding_bottom = Some(trailing);
        } else {
            self.padding_left = Some(leading);
            self.padding_right = Some(trailing);
        }
    }
}

/// Natural ("stylesheet") layout metrics of an element, read without the
/// influence of inline overrides the pin machinery itself applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NaturalMetrics {
    pub position: PositionMode,
    pub display: Display,
    pub top: Dimension,
    pub left: Dimension,
    pub bottom: Dimension,
    pub right: Dimension,
    pub width: Dimension,
    pub height: Dimension,
}

/// Change signal observed on a scroll container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerSignal {
    Scroll,
    Resize,
}

/// Device/environment capabilities, probed once at startup.
#[derive(Clone, Copy, Debug)]
pub struct Capabilities {
    /// A high-resolution monotonic timer is available for frame pacing.
    pub high_res_timer: bool,
    /// 3D transforms are hardware-backed.
    pub transforms_3d: bool,
    /// Primary input is touch.
    pub touch: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            high_res_timer: true,
            transforms_3d: true,
            touch: false,
        }
    }
}

/// Everything the scroll core needs from the host document.
///
/// Implementations are expected to be tolerant: queries on stale element
/// handles return zero/default values rather than failing, matching the
/// graceful-degradation error policy of the library.
pub trait DomEnv {
    // ------------------------------------------------------------------
    // Resolution and structure
    // ------------------------------------------------------------------

    /// Resolve a registered element by name, if the environment supports
    /// name lookup.
    fn resolve(&self, name: &str) -> Option<ElementId>;

    fn element_exists(&self, el: ElementId) -> bool;

    /// The top-level scrollable area.
    fn document_root(&self) -> ElementId;

    /// Whether `el` is the top-level scrollable area.
    fn is_document(&self, el: ElementId) -> bool;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    fn first_child(&self, el: ElementId) -> Option<ElementId>;

    /// Whether `el` is a pin spacer created by this library.
    fn is_pin_spacer(&self, el: ElementId) -> bool;

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Document offset of an element; when `relative_to_viewport` the
    /// top-level scroll offset is subtracted.
    fn offset(&self, el: ElementId, relative_to_viewport: bool) -> Point;

    /// Content-box size.
    fn content_size(&self, el: ElementId) -> Size;

    /// Border-box size, optionally including margins.
    fn outer_size(&self, el: ElementId, include_margin: bool) -> Size;

    /// Inner size of a scroll container (or the window size for the
    /// document root).
    fn viewport_size(&self, el: ElementId) -> Size;

    fn scroll_offset(&self, el: ElementId, vertical: bool) -> f64;

    fn set_scroll_offset(&mut self, el: ElementId, vertical: bool, pos: f64);

    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    /// Queue a synthetic signal on a container (used to simulate resize for
    /// containers that do not produce their own).
    fn emit_signal(&mut self, el: ElementId, signal: ContainerSignal);

    /// Drain pending signals for a container, in arrival order.
    fn drain_signals(&mut self, el: ElementId) -> SmallVec<[ContainerSignal; 4]>;

    // ------------------------------------------------------------------
    // Styles and classes
    // ------------------------------------------------------------------

    fn computed_position(&self, el: ElementId) -> PositionMode;

    fn computed_display(&self, el: ElementId) -> Display;

    fn resolved_margins(&self, el: ElementId) -> Edges;

    fn resolved_padding(&self, el: ElementId) -> Edges;

    /// Read the natural layout metrics an element would have without the
    /// inline overrides applied by pinning. Replaces synchronous
    /// hide/measure/show reflow probing; may force a layout pass.
    fn natural_metrics(&mut self, el: ElementId) -> NaturalMetrics;

    /// Snapshot of the current inline style.
    fn inline_style(&self, el: ElementId) -> StylePatch;

    /// Apply a partial inline-style write.
    fn apply_style(&mut self, el: ElementId, patch: &StylePatch);

    /// Replace the inline style wholesale (used for restoration).
    fn set_inline_style(&mut self, el: ElementId, style: StylePatch);

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    // ------------------------------------------------------------------
    // Structural mutation (pin lifecycle)
    // ------------------------------------------------------------------

    /// Create a spacer element directly before `before`, carrying `style`
    /// and `class`, marked as a pin spacer. Returns `None` when `before`
    /// has no parent to attach to.
    fn create_spacer(
        &mut self,
        before: ElementId,
        style: StylePatch,
        class: &str,
    ) -> Option<ElementId>;

    /// Move `child` to the end of `new_parent`'s children.
    fn reparent(&mut self, child: ElementId, new_parent: ElementId);

    /// Move `el` directly before `reference` in its parent.
    fn insert_before(&mut self, el: ElementId, reference: ElementId);

    /// Detach and drop an element.
    fn remove_element(&mut self, el: ElementId);

    // ------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------

    /// Capability probe. Implementations should compute this once.
    fn capabilities(&self) -> Capabilities;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_collapse_displays() {
        assert!(Display::Block.collapses_margins());
        assert!(Display::Flex.collapses_margins());
        assert!(!Display::Inline.collapses_margins());
        assert!(!Display::InlineBlock.collapses_margins());
    }

    #[test]
    fn style_patch_merge_keeps_unset_fields() {
        let mut base = StylePatch {
            position: Some(PositionMode::Relative),
            top: Some(Dimension::Px(10.0)),
            ..Default::default()
        };
        let patch = StylePatch {
            top: Some(Dimension::Auto),
            width: Some(Dimension::Percent(50.0)),
            ..Default::default()
        };
        base.merge(&patch);
        assert_eq!(base.position, Some(PositionMode::Relative));
        assert_eq!(base.top, Some(Dimension::Auto));
        assert_eq!(base.width, Some(Dimension::Percent(50.0)));
    }

    #[test]
    fn axis_padding_targets_correct_sides() {
        let mut patch = StylePatch::default();
        patch.set_axis_padding(false, Dimension::Px(5.0), Dimension::Px(7.0));
        assert_eq!(patch.padding_left, Some(Dimension::Px(5.0)));
        assert_eq!(patch.padding_right, Some(Dimension::Px(7.0)));
        assert_eq!(patch.padding_top, None);
    }
}
