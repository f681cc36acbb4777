//! Controller: scroll container tracking and scene dispatch
//!
//! A controller owns its scenes, keeps them sorted by start offset and
//! updates them in frame-sized batches: container signals and programmatic
//! requests only mark scenes pending, and the next frame tick performs one
//! shared scroll read and walks the batch. Scenes are updated in scroll
//! order, reversed when scrolling backward, so chained animations always
//! play out in travel order.

use crate::error::ControllerError;
use crate::options::{ControllerOptions, GlobalSceneOptions};
use crate::scene::Scene;
use scrollkit_core::{log_debug, log_error, log_warn, ElementId, LogLevel, ScrollDirection};
use scrollkit_dom::{detect_pacer, ContainerSignal, FramePacer, SharedDom};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a scene owned by a controller.
    pub struct SceneId;
}

/// Snapshot of the controller handed to scenes on every update pass.
#[derive(Clone, Copy, Debug)]
pub struct ControllerInfo {
    /// Viewport extent of the container along the scroll axis.
    pub size: f64,
    pub vertical: bool,
    pub scroll_pos: f64,
    pub scroll_direction: ScrollDirection,
    pub container: ElementId,
    pub is_document: bool,
}

/// Destination of a programmatic scroll.
pub enum ScrollTarget {
    /// Absolute scroll offset.
    Offset(f64),
    /// Scroll until the element reaches the top (or left) of the container.
    Element(ElementId),
    /// Scroll to a scene's start offset.
    Scene(SceneId),
    /// Install a custom scroll setter used for all subsequent scrolls
    /// (e.g. to animate instead of jumping).
    Custom(Box<dyn FnMut(f64) + Send>),
}

/// Scenes marked for the next update cycle.
enum UpdateBatch {
    None,
    All,
    Scenes(Vec<SceneId>),
}

/// Scroll controller for one container.
pub struct Controller {
    dom: SharedDom,
    container: ElementId,
    vertical: bool,
    is_document: bool,
    scenes: SlotMap<SceneId, Scene>,
    /// Scene ids sorted by start offset.
    order: Vec<SceneId>,
    scroll_pos: f64,
    scroll_direction: ScrollDirection,
    viewport_size: f64,
    enabled: bool,
    pending: UpdateBatch,
    loglevel: LogLevel,
    refresh_interval_ms: u64,
    global_scene_options: GlobalSceneOptions,
    scroll_pos_source: Option<Box<dyn FnMut() -> f64 + Send>>,
    scroll_pos_sink: Option<Box<dyn FnMut(f64) + Send>>,
}

impl Controller {
    /// Create a controller for the container in `options` (the document
    /// root when unset).
    pub fn new(dom: SharedDom, options: ControllerOptions) -> Result<Self, ControllerError> {
        let (container, is_document, viewport_size, scroll_pos) = {
            let env = dom.lock().unwrap();
            let container = options.container.unwrap_or_else(|| env.document_root());
            if !env.element_exists(container) {
                log_error!(options.loglevel, "no valid scroll container supplied");
                return Err(ControllerError::NoScrollContainer);
            }
            let is_document = env.is_document(container);
            let size = env.viewport_size(container).axis(options.vertical);
            let pos = env.scroll_offset(container, options.vertical);
            (container, is_document, size, pos)
        };
        log_debug!(options.loglevel, "added new controller");
        Ok(Self {
            dom,
            container,
            vertical: options.vertical,
            is_document,
            scenes: SlotMap::with_key(),
            order: Vec::new(),
            scroll_pos,
            scroll_direction: ScrollDirection::Paused,
            viewport_size,
            enabled: true,
            pending: UpdateBatch::None,
            loglevel: options.loglevel,
            refresh_interval_ms: options.refresh_interval_ms,
            global_scene_options: options.global_scene_options,
            scroll_pos_source: None,
            scroll_pos_sink: None,
        })
    }

    // ====================================================================
    // Scene management
    // ====================================================================

    /// Take ownership of a scene. Global scene options fill in values the
    /// scene has not set itself; the scene is scheduled for the next
    /// update cycle.
    pub fn add_scene(&mut self, mut scene: Scene) -> SceneId {
        scene.apply_global_options(&self.global_scene_options);
        scene.attach(self.info(), self.enabled);
        let id = self.scenes.insert(scene);
        self.order.push(id);
        self.resort();
        self.mark_pending(id);
        log_debug!(self.loglevel, "added scene");
        id
    }

    pub fn add_scenes(&mut self, scenes: impl IntoIterator<Item = Scene>) -> Vec<SceneId> {
        scenes.into_iter().map(|s| self.add_scene(s)).collect()
    }

    /// Release a scene without tearing it down. The scene keeps its
    /// progress and bindings and can be added to another controller.
    pub fn remove_scene(&mut self, id: SceneId) -> Option<Scene> {
        let mut scene = self.scenes.remove(id)?;
        self.order.retain(|s| *s != id);
        if let UpdateBatch::Scenes(batch) = &mut self.pending {
            batch.retain(|s| *s != id);
        }
        scene.detach();
        log_debug!(self.loglevel, "removed scene");
        Some(scene)
    }

    /// Remove and tear down a scene.
    pub fn destroy_scene(&mut self, id: SceneId, reset: bool) {
        if let Some(scene) = self.remove_scene(id) {
            scene.destroy(reset);
        }
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Scene ids in start-offset order.
    pub fn scene_ids(&self) -> &[SceneId] {
        &self.order
    }

    // ====================================================================
    // Updates
    // ====================================================================

    /// Request an update for one scene. Immediate updates run now;
    /// otherwise the scene joins the next frame's batch.
    pub fn update_scene(&mut self, id: SceneId, immediately: bool) {
        if immediately {
            let info = self.info();
            let enabled = self.enabled;
            if let Some(scene) = self.scenes.get_mut(id) {
                scene.controller_update(info, enabled);
            }
            self.resort_if_dirty();
        } else {
            self.mark_pending(id);
        }
    }

    /// Re-read the viewport size and schedule an update for every scene.
    pub fn update(&mut self, immediately: bool) {
        self.viewport_size = {
            let dom = self.dom.lock().unwrap();
            dom.viewport_size(self.container).axis(self.vertical)
        };
        self.pending = UpdateBatch::All;
        if immediately {
            self.run_update_cycle();
        }
    }

    /// One frame tick: drain container signals, then run the pending
    /// update batch.
    pub fn tick_frame(&mut self) {
        let signals = {
            let mut dom = self.dom.lock().unwrap();
            dom.drain_signals(self.container)
        };
        if !signals.is_empty() {
            if signals.contains(&ContainerSignal::Resize) {
                self.viewport_size = {
                    let dom = self.dom.lock().unwrap();
                    dom.viewport_size(self.container).axis(self.vertical)
                };
                let info = self.info();
                for id in self.order.clone() {
                    if let Some(scene) = self.scenes.get_mut(id) {
                        scene.container_resized(info);
                    }
                }
                self.resort_if_dirty();
            }
            self.pending = UpdateBatch::All;
        }
        self.run_update_cycle();
    }

    /// Periodic refresh: detect silent container resizes (divs don't
    /// signal them) and re-resolve every scene's dynamic values.
    pub fn tick_refresh(&mut self) {
        if !self.is_document {
            let size = {
                let dom = self.dom.lock().unwrap();
                dom.viewport_size(self.container).axis(self.vertical)
            };
            if size != self.viewport_size {
                let mut dom = self.dom.lock().unwrap();
                dom.emit_signal(self.container, ContainerSignal::Resize);
            }
        }
        let info = self.info();
        let enabled = self.enabled;
        for id in self.order.clone() {
            if let Some(scene) = self.scenes.get_mut(id) {
                scene.controller_refresh(info, enabled);
            }
        }
        self.resort_if_dirty();
    }

    fn run_update_cycle(&mut self) {
        if !self.enabled || matches!(self.pending, UpdateBatch::None) {
            return;
        }
        let batch = std::mem::replace(&mut self.pending, UpdateBatch::None);

        let old_pos = self.scroll_pos;
        self.scroll_pos = self.read_scroll_pos();
        let delta = self.scroll_pos - old_pos;
        self.scroll_direction = ScrollDirection::from_delta(delta);

        let mut ids = match batch {
            UpdateBatch::All => {
                self.resort();
                self.order.clone()
            }
            UpdateBatch::Scenes(mut ids) => {
                let order = &self.order;
                ids.sort_by_key(|id| order.iter().position(|o| o == id));
                ids
            }
            UpdateBatch::None => unreachable!(),
        };
        // Scenes react in travel order.
        if self.scroll_direction == ScrollDirection::Reverse {
            ids.reverse();
        }
        log_debug!(
            self.loglevel,
            scenes = ids.len(),
            scroll_pos = self.scroll_pos,
            "updating scenes"
        );

        let info = self.info();
        let enabled = self.enabled;
        for id in ids {
            if let Some(scene) = self.scenes.get_mut(id) {
                scene.controller_update(info, enabled);
            }
        }
        self.resort_if_dirty();
    }

    fn mark_pending(&mut self, id: SceneId) {
        match &mut self.pending {
            UpdateBatch::All => {}
            UpdateBatch::None => self.pending = UpdateBatch::Scenes(vec![id]),
            UpdateBatch::Scenes(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    fn resort(&mut self) {
        let scenes = &self.scenes;
        self.order.sort_by(|a, b| {
            let sa = scenes.get(*a).map(|s| s.scroll_offset()).unwrap_or(0.0);
            let sb = scenes.get(*b).map(|s| s.scroll_offset()).unwrap_or(0.0);
            sa.partial_cmp(&sb).unwrap_or(Ordering::Equal)
        });
    }

    /// Scenes flag themselves when their offset window moved; one resort
    /// covers however many moved this pass.
    fn resort_if_dirty(&mut self) {
        let mut dirty = false;
        for (_, scene) in self.scenes.iter_mut() {
            dirty |= scene.take_offset_dirty();
        }
        if dirty {
            self.resort();
        }
    }

    // ====================================================================
    // Scroll position
    // ====================================================================

    /// Scroll the container.
    pub fn scroll_to(&mut self, target: ScrollTarget) {
        match target {
            ScrollTarget::Offset(pos) => self.apply_scroll(pos),
            ScrollTarget::Scene(id) => {
                let pos = self.scenes.get(id).map(|scene| scene.scroll_offset());
                match pos {
                    Some(pos) => self.apply_scroll(pos),
                    None => {
                        log_warn!(
                            self.loglevel,
                            "scene does not belong to this controller, scroll cancelled"
                        );
                    }
                }
            }
            ScrollTarget::Element(el) => {
                let pos = {
                    let dom = self.dom.lock().unwrap();
                    if !dom.element_exists(el) {
                        log_warn!(self.loglevel, "scroll target element was not found");
                        return;
                    }
                    let mut container_offset =
                        dom.offset(self.container, false).axis(self.vertical);
                    if !self.is_document {
                        container_offset -= dom.scroll_offset(self.container, self.vertical);
                    }
                    dom.offset(el, false).axis(self.vertical) - container_offset
                };
                self.apply_scroll(pos);
            }
            ScrollTarget::Custom(setter) => {
                self.scroll_pos_sink = Some(setter);
            }
        }
    }

    fn apply_scroll(&mut self, pos: f64) {
        if let Some(sink) = &mut self.scroll_pos_sink {
            sink(pos);
        } else {
            let mut dom = self.dom.lock().unwrap();
            dom.set_scroll_offset(self.container, self.vertical, pos);
        }
    }

    /// Current scroll position of the container (through the custom
    /// source, if one is installed).
    pub fn scroll_pos(&mut self) -> f64 {
        self.read_scroll_pos()
    }

    /// Replace how the scroll position is read, e.g. to add an offset or
    /// read from a different property.
    pub fn set_scroll_pos_source(&mut self, source: Box<dyn FnMut() -> f64 + Send>) {
        self.scroll_pos_source = Some(source);
    }

    fn read_scroll_pos(&mut self) -> f64 {
        if let Some(source) = &mut self.scroll_pos_source {
            source()
        } else {
            let dom = self.dom.lock().unwrap();
            dom.scroll_offset(self.container, self.vertical)
        }
    }

    // ====================================================================
    // Introspection
    // ====================================================================

    /// Snapshot of the container state as of the last update cycle.
    pub fn info(&self) -> ControllerInfo {
        ControllerInfo {
            size: self.viewport_size,
            vertical: self.vertical,
            scroll_pos: self.scroll_pos,
            scroll_direction: self.scroll_direction,
            container: self.container,
            is_document: self.is_document,
        }
    }

    /// Look up a single info value by name; unknown names log an error.
    pub fn info_value(&self, name: &str) -> Option<String> {
        let info = self.info();
        match name {
            "size" => Some(info.size.to_string()),
            "vertical" => Some(info.vertical.to_string()),
            "scroll_pos" => Some(info.scroll_pos.to_string()),
            "scroll_direction" => Some(format!("{:?}", info.scroll_direction)),
            "container" => Some(format!("{:?}", info.container)),
            "is_document" => Some(info.is_document.to_string()),
            _ => {
                log_error!(self.loglevel, name, "unknown info name");
                None
            }
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling freezes all scenes in their current state; re-enabling
    /// updates them all immediately.
    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        if enabled != self.enabled {
            self.enabled = enabled;
            let info = self.info();
            for id in self.order.clone() {
                if let Some(scene) = self.scenes.get_mut(id) {
                    scene.controller_update(info, enabled);
                }
            }
            self.resort_if_dirty();
        }
        self
    }

    pub fn loglevel(&self) -> LogLevel {
        self.loglevel
    }

    pub fn set_loglevel(&mut self, loglevel: LogLevel) -> &mut Self {
        self.loglevel = loglevel;
        self
    }

    pub fn dom(&self) -> SharedDom {
        self.dom.clone()
    }

    /// Poll interval for [`tick_refresh`](Self::tick_refresh); `None` when
    /// polling is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_ms > 0).then(|| Duration::from_millis(self.refresh_interval_ms))
    }

    /// Tear down the controller and every scene it owns (newest first).
    pub fn destroy(mut self, reset_scenes: bool) {
        while let Some(id) = self.order.pop() {
            if let Some(scene) = self.scenes.remove(id) {
                scene.destroy(reset_scenes);
            }
        }
        log_debug!(self.loglevel, reset_scenes, "destroyed controller");
    }
}

/// Run loop around a controller: paces frames, feeds the frame and
/// refresh ticks, and leaves the controller accessible in between.
pub struct Driver {
    controller: Controller,
    pacer: Box<dyn FramePacer>,
    last_refresh: Instant,
}

impl Driver {
    /// Wrap a controller with the canonical pacer for the environment.
    pub fn new(controller: Controller) -> Self {
        let caps = {
            let dom = controller.dom.lock().unwrap();
            dom.capabilities()
        };
        Self::with_pacer(controller, detect_pacer(&caps))
    }

    pub fn with_pacer(controller: Controller, pacer: Box<dyn FramePacer>) -> Self {
        Self {
            controller,
            pacer,
            last_refresh: Instant::now(),
        }
    }

    /// Block until the next frame boundary and run one tick.
    pub fn step(&mut self) {
        let now = self.pacer.next_frame();
        self.controller.tick_frame();
        if let Some(interval) = self.controller.refresh_interval() {
            if now.duration_since(self.last_refresh) >= interval {
                self.controller.tick_refresh();
                self.last_refresh = now;
            }
        }
    }

    /// Step frames for at least `duration`.
    pub fn run_for(&mut self, duration: Duration) {
        let until = Instant::now() + duration;
        while Instant::now() < until {
            self.step();
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn into_controller(self) -> Controller {
        self.controller
    }
}
