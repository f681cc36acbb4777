//! Pin lifecycle: spacer wrapping, fixed positioning and spacer sizing
//!
//! Pinning wraps the target element in a spacer that holds its place in
//! document flow, then switches the target to fixed positioning while the
//! scene is active. Size authority depends on how the target is sized:
//! absolute and pixel sizes flow from the pin to the spacer, relative
//! sizes flow from the spacer to the pin.

use super::Scene;
use crate::options::PinOptions;
use scrollkit_core::{log_debug, log_error, log_warn, ElementId, SceneState};
use scrollkit_dom::{BoxSizing, Dimension, PositionMode, StylePatch};

/// State carried for an active pin.
pub struct PinBinding {
    pub(crate) target: ElementId,
    pub(crate) spacer: ElementId,
    /// Width/height are percentage-sized, so the spacer owns the size and
    /// the pin inherits from it.
    pub(crate) rel_width: bool,
    pub(crate) rel_height: bool,
    /// Unsized block element: treat like a relative width of 100%.
    pub(crate) auto_full_width: bool,
    pub(crate) push_followers: bool,
    /// The target takes up space in document flow (not absolutely
    /// positioned).
    pub(crate) in_flow: bool,
    /// Inline style snapshot taken before pinning, for restoration.
    pub(crate) origin: StylePatch,
    pub(crate) pinned_class: String,
}

impl Scene {
    /// Pin `element` for the duration of the scene.
    ///
    /// The element is wrapped in a spacer that preserves its place in the
    /// layout. While the scene is active the element is fixed to the
    /// viewport; with `push_followers` the spacer grows so following
    /// content is pushed ahead of the pin.
    pub fn set_pin(&mut self, element: ElementId, options: PinOptions) -> &mut Self {
        let mut push_followers = options.push_followers;

        let refused = {
            let dom = self.dom.lock().unwrap();
            if !dom.element_exists(element) {
                log_error!(self.options.loglevel, "invalid pin element supplied");
                true
            } else if dom.computed_position(element) == PositionMode::Fixed {
                log_error!(
                    self.options.loglevel,
                    "pinning is not possible for elements that are positioned \"fixed\""
                );
                true
            } else {
                false
            }
        };
        if refused {
            return self;
        }

        if let Some(binding) = &self.pin {
            if binding.target == element {
                return self;
            }
            self.remove_pin(false);
        }

        let binding = {
            let mut dom = self.dom.lock().unwrap();
            let natural = dom.natural_metrics(element);
            let in_flow = natural.position != PositionMode::Absolute;
            let margin_collapse = natural.display.collapses_margins();

            if !in_flow && push_followers {
                log_warn!(
                    self.options.loglevel,
                    "because the pinned element is positioned absolutely push_followers is disabled"
                );
                push_followers = false;
            }

            let rel_width = natural.width.is_relative();
            let rel_height = natural.height.is_relative();
            let auto_full_width =
                natural.width == Dimension::Auto && in_flow && margin_collapse;

            // The spacer takes over the target's place in the layout.
            let mut spacer_style = StylePatch {
                display: Some(natural.display),
                top: Some(natural.top),
                left: Some(natural.left),
                bottom: Some(natural.bottom),
                right: Some(natural.right),
                position: Some(if in_flow {
                    PositionMode::Relative
                } else {
                    PositionMode::Absolute
                }),
                margin_left: Some(Dimension::Auto),
                margin_right: Some(Dimension::Auto),
                box_sizing: Some(BoxSizing::ContentBox),
                ..Default::default()
            };
            // Relative sizes transfer to the spacer; the pin recalculates
            // from it while pinned.
            if rel_width {
                spacer_style.width = Some(natural.width);
            }
            if rel_height {
                spacer_style.height = Some(natural.height);
            }

            let origin = dom.inline_style(element);
            match dom.create_spacer(element, spacer_style, &options.spacer_class) {
                None => {
                    log_error!(
                        self.options.loglevel,
                        "pin element must be attached to the document"
                    );
                    None
                }
                Some(spacer) => {
                    dom.reparent(element, spacer);

                    let mut pin_style = StylePatch {
                        position: Some(if in_flow {
                            PositionMode::Relative
                        } else {
                            PositionMode::Absolute
                        }),
                        top: Some(Dimension::Auto),
                        left: Some(Dimension::Auto),
                        bottom: Some(Dimension::Auto),
                        right: Some(Dimension::Auto),
                        ..Default::default()
                    };
                    if rel_width || auto_full_width {
                        pin_style.box_sizing = Some(BoxSizing::BorderBox);
                    }
                    dom.apply_style(element, &pin_style);

                    Some(PinBinding {
                        target: element,
                        spacer,
                        rel_width,
                        rel_height,
                        auto_full_width,
                        push_followers,
                        in_flow,
                        origin,
                        pinned_class: options.pinned_class,
                    })
                }
            }
        };
        let Some(binding) = binding else {
            return self;
        };
        self.pin = Some(binding);

        log_debug!(self.options.loglevel, "added pin");
        self.update_pin_state(false);
        self
    }

    /// Remove the pin. With `reset` the element is moved back out of the
    /// spacer and its original inline style restored; without it the
    /// spacer stays and a mid-scene pin is merely unpinned in place.
    pub fn remove_pin(&mut self, reset: bool) -> &mut Self {
        let Some(binding) = self.pin.take() else {
            return self;
        };
        if reset || self.info.is_none() {
            let mut dom = self.dom.lock().unwrap();
            dom.insert_before(binding.target, binding.spacer);
            dom.set_inline_style(binding.target, binding.origin.clone());
            dom.remove_element(binding.spacer);
        } else if self.state == SceneState::During {
            // Unpin at the current position.
            self.pin = Some(binding);
            self.update_pin_state(true);
            self.pin = None;
        }
        log_debug!(self.options.loglevel, reset, "removed pin");
        self
    }

    /// Element currently pinned by this scene, if any.
    pub fn pinned_element(&self) -> Option<ElementId> {
        self.pin.as_ref().map(|b| b.target)
    }

    /// Move the pin target between its fixed (pinned) and in-flow
    /// (unpinned) positioning, following the scene state.
    pub(crate) fn update_pin_state(&mut self, force_unpin: bool) {
        let Some(info) = self.info else { return };
        let Some(binding) = &self.pin else { return };
        let (target, spacer) = (binding.target, binding.spacer);
        let in_flow = binding.in_flow;
        let push_followers = binding.push_followers;
        let pinned_class = binding.pinned_class.clone();

        if !force_unpin && self.state == SceneState::During {
            let newly_pinned = {
                let dom = self.dom.lock().unwrap();
                dom.computed_position(target) != PositionMode::Fixed
            };
            if newly_pinned {
                // Switch positioning before resizing the spacer: the
                // collapse out of flow changes what the spacer must hold.
                let patch = StylePatch {
                    position: Some(PositionMode::Fixed),
                    ..Default::default()
                };
                self.dom.lock().unwrap().apply_style(target, &patch);
                self.update_pin_spacer_size();
                if !pinned_class.is_empty() {
                    self.dom.lock().unwrap().add_class(target, &pinned_class);
                }
            }

            let mut dom = self.dom.lock().unwrap();
            let mut fixed_pos = dom.offset(spacer, true);
            let scroll_distance = if self.options.reverse || self.duration_value == 0.0 {
                info.scroll_pos - self.start
            } else {
                // Reverse is disabled, so the position has to be derived
                // from the frozen progress.
                (self.progress * self.duration_value * 10.0).round() / 10.0
            };
            // Remove the spacer margin to get the real position (margin
            // collapse mode moves the pin margin onto the spacer).
            fixed_pos.y -= dom.resolved_margins(spacer).top;
            if info.vertical {
                fixed_pos.y += scroll_distance;
            } else {
                fixed_pos.x += scroll_distance;
            }
            let patch = StylePatch {
                top: Some(Dimension::Px(fixed_pos.y)),
                left: Some(Dimension::Px(fixed_pos.x)),
                ..Default::default()
            };
            dom.apply_style(target, &patch);
        } else {
            let new_position = if in_flow {
                PositionMode::Relative
            } else {
                PositionMode::Absolute
            };
            let mut patch = StylePatch {
                position: Some(new_position),
                top: Some(Dimension::Px(0.0)),
                left: Some(Dimension::Px(0.0)),
                ..Default::default()
            };
            let change = {
                let dom = self.dom.lock().unwrap();
                let mut change = dom.computed_position(target) != new_position;

                if !push_followers {
                    patch.set_leading_inset(
                        info.vertical,
                        Dimension::Px(self.duration_value * self.progress),
                    );
                } else if self.duration_value > 0.0 {
                    // Detect a jump straight past the pinned phase in
                    // either direction: the spacer padding was never
                    // brought up to date.
                    let padding = dom.resolved_padding(spacer);
                    if (self.state == SceneState::After
                        && padding.leading(info.vertical) == 0.0)
                        || (self.state == SceneState::Before
                            && padding.trailing(info.vertical) == 0.0)
                    {
                        change = true;
                    }
                }
                change
            };
            self.dom.lock().unwrap().apply_style(target, &patch);
            if change {
                if !pinned_class.is_empty() {
                    self.dom
                        .lock()
                        .unwrap()
                        .remove_class(target, &pinned_class);
                }
                self.update_pin_spacer_size();
            }
        }
    }

    /// Size the spacer so it keeps holding the pin's place, and hand size
    /// authority to whichever side currently owns it.
    pub(crate) fn update_pin_spacer_size(&mut self) {
        let Some(info) = self.info else { return };
        let Some(binding) = &self.pin else { return };
        if !binding.in_flow {
            return;
        }
        let (target, spacer) = (binding.target, binding.spacer);
        let rel_width = binding.rel_width;
        let rel_height = binding.rel_height;
        let auto_full_width = binding.auto_full_width;
        let push_followers = binding.push_followers;

        let before = self.state == SceneState::Before;
        let during = self.state == SceneState::During;
        let after = self.state == SceneState::After;
        let vertical = info.vertical;

        let mut dom = self.dom.lock().unwrap();
        let pinned = dom.computed_position(target) == PositionMode::Fixed;
        // Usually the pin itself, but another spacer for cascaded pins.
        let content = dom.first_child(spacer).unwrap_or(target);
        let margin_collapse = dom.computed_display(spacer).collapses_margins();
        let window_size = dom.viewport_size(dom.document_root());
        let parent_size = dom
            .parent(spacer)
            .map(|p| dom.content_size(p))
            .unwrap_or(window_size);

        let mut spacer_patch = StylePatch::default();
        let mut pin_patch = StylePatch::default();

        if margin_collapse {
            // While pinned (or about to be) the pin margin leaves the
            // flow, so the spacer takes it over.
            let pin_margins = dom.resolved_margins(target);
            spacer_patch.margin_top = Some(if before || (during && pinned) {
                Dimension::Px(pin_margins.top)
            } else {
                Dimension::Auto
            });
            spacer_patch.margin_bottom = Some(if after || (during && pinned) {
                Dimension::Px(pin_margins.bottom)
            } else {
                Dimension::Auto
            });
        } else {
            spacer_patch.margin_top = Some(Dimension::Auto);
            spacer_patch.margin_bottom = Some(Dimension::Auto);
        }

        // Width: relative sizes flow spacer -> pin, others pin -> spacer.
        if rel_width || auto_full_width {
            pin_patch.width = Some(if pinned {
                if window_size.width == parent_size.width {
                    // Sized relative to the body, which a fixed element
                    // still sees.
                    if auto_full_width {
                        Dimension::Percent(100.0)
                    } else {
                        Dimension::Inherit
                    }
                } else {
                    Dimension::Px(dom.content_size(spacer).width)
                }
            } else {
                Dimension::Percent(100.0)
            });
        } else {
            // min-width keeps cascaded pins from collapsing.
            let w = dom.outer_size(content, content != target).width;
            spacer_patch.min_width = Some(Dimension::Px(w));
            spacer_patch.width = Some(if pinned {
                Dimension::Px(w)
            } else {
                Dimension::Auto
            });
        }

        if rel_height {
            pin_patch.height = Some(if pinned {
                if window_size.height == parent_size.height {
                    Dimension::Inherit
                } else {
                    Dimension::Px(dom.content_size(spacer).height)
                }
            } else {
                Dimension::Percent(100.0)
            });
        } else {
            let h = dom.outer_size(content, !margin_collapse).height;
            spacer_patch.min_height = Some(Dimension::Px(h));
            spacer_patch.height = Some(if pinned {
                Dimension::Px(h)
            } else {
                Dimension::Auto
            });
        }

        // Make room along the scroll axis so followers are pushed ahead
        // of the pin and released behind it.
        if push_followers {
            spacer_patch.set_axis_padding(
                vertical,
                Dimension::Px(self.duration_value * self.progress),
                Dimension::Px(self.duration_value * (1.0 - self.progress)),
            );
        }

        if pin_patch != StylePatch::default() {
            dom.apply_style(target, &pin_patch);
        }
        dom.apply_style(spacer, &spacer_patch);
    }

    /// A relatively sized pin inside a non-body container needs its size
    /// recalculated when the container is resized mid-pin.
    pub(crate) fn refresh_relative_pin_size(&mut self) {
        let Some(binding) = &self.pin else { return };
        if self.state != SceneState::During {
            return;
        }
        let spacer = binding.spacer;
        let (rel_width, rel_height, auto_full_width) = (
            binding.rel_width,
            binding.rel_height,
            binding.auto_full_width,
        );
        let needs_recalc = {
            let dom = self.dom.lock().unwrap();
            let window_size = dom.viewport_size(dom.document_root());
            let parent_size = dom
                .parent(spacer)
                .map(|p| dom.content_size(p))
                .unwrap_or(window_size);
            ((rel_width || auto_full_width) && window_size.width != parent_size.width)
                || (rel_height && window_size.height != parent_size.height)
        };
        if needs_recalc {
            self.update_pin_spacer_size();
        }
    }
}
