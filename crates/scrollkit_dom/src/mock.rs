//! In-memory environment for headless testing
//!
//! `MockDom` implements the full [`DomEnv`] contract over a simple element
//! tree with typed styles. Tests assign document positions and sizes
//! directly instead of running a layout engine; scrolling a container moves
//! its descendants' viewport-relative offsets the way a real scroller
//! would.

use crate::env::{
    Capabilities, ContainerSignal, Dimension, Display, DomEnv, Edges, NaturalMetrics,
    PositionMode, StylePatch,
};
use rustc_hash::FxHashMap;
use scrollkit_core::{ElementId, Point, Size};
use slotmap::SlotMap;
use smallvec::SmallVec;

struct ElementNode {
    name: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    natural: NaturalMetrics,
    natural_margins: Edges,
    natural_padding: Edges,
    inline: StylePatch,
    /// Document coordinates (ignoring ancestor scrolling).
    position: Point,
    /// Layout-assigned content size.
    size: Size,
    /// Scroll state, meaningful for containers.
    scroll: Point,
    /// Inner size, meaningful for containers.
    viewport: Size,
    pin_spacer: bool,
    signals: Vec<ContainerSignal>,
}

impl ElementNode {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            natural: NaturalMetrics::default(),
            natural_margins: Edges::default(),
            natural_padding: Edges::default(),
            inline: StylePatch::default(),
            position: Point::ZERO,
            size: Size::ZERO,
            scroll: Point::ZERO,
            viewport: Size::ZERO,
            pin_spacer: false,
            signals: Vec::new(),
        }
    }
}

/// Headless element tree implementing [`DomEnv`].
pub struct MockDom {
    elements: SlotMap<ElementId, ElementNode>,
    names: FxHashMap<String, ElementId>,
    root: ElementId,
    capabilities: Capabilities,
}

impl MockDom {
    /// Create an environment whose document root has `viewport` as its
    /// window size.
    pub fn new(viewport: Size) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(ElementNode::new(Some("document".into())));
        let mut names = FxHashMap::default();
        names.insert("document".to_string(), root);
        let mut dom = Self {
            elements,
            names,
            root,
            capabilities: Capabilities::default(),
        };
        dom.elements[root].viewport = viewport;
        dom
    }

    /// Register a named element as a child of the document root.
    pub fn create_element(&mut self, name: &str) -> ElementId {
        self.create_child(self.root, name)
    }

    /// Register a named element under an explicit parent.
    pub fn create_child(&mut self, parent: ElementId, name: &str) -> ElementId {
        let id = self.elements.insert(ElementNode::new(Some(name.to_string())));
        self.elements[id].parent = Some(parent);
        self.elements[parent].children.push(id);
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn set_position(&mut self, el: ElementId, position: Point) {
        if let Some(node) = self.elements.get_mut(el) {
            node.position = position;
        }
    }

    pub fn set_size(&mut self, el: ElementId, size: Size) {
        if let Some(node) = self.elements.get_mut(el) {
            node.size = size;
        }
    }

    pub fn set_natural_metrics(&mut self, el: ElementId, natural: NaturalMetrics) {
        if let Some(node) = self.elements.get_mut(el) {
            node.natural = natural;
        }
    }

    pub fn set_natural_margins(&mut self, el: ElementId, margins: Edges) {
        if let Some(node) = self.elements.get_mut(el) {
            node.natural_margins = margins;
        }
    }

    pub fn set_natural_padding(&mut self, el: ElementId, padding: Edges) {
        if let Some(node) = self.elements.get_mut(el) {
            node.natural_padding = padding;
        }
    }

    /// Change a container's inner size without producing a signal. Embedded
    /// containers don't reliably announce their own resizes; the controller
    /// poll is what detects this.
    pub fn set_viewport(&mut self, el: ElementId, viewport: Size) {
        if let Some(node) = self.elements.get_mut(el) {
            node.viewport = viewport;
        }
    }

    /// Resize the window. The document root does announce itself.
    pub fn resize_root(&mut self, viewport: Size) {
        let root = self.root;
        self.elements[root].viewport = viewport;
        self.emit_signal(root, ContainerSignal::Resize);
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }
}

impl DomEnv for MockDom {
    fn resolve(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    fn element_exists(&self, el: ElementId) -> bool {
        self.elements.contains_key(el)
    }

    fn document_root(&self) -> ElementId {
        self.root
    }

    fn is_document(&self, el: ElementId) -> bool {
        el == self.root
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.elements.get(el).and_then(|n| n.parent)
    }

    fn first_child(&self, el: ElementId) -> Option<ElementId> {
        self.elements.get(el).and_then(|n| n.children.first().copied())
    }

    fn is_pin_spacer(&self, el: ElementId) -> bool {
        self.elements.get(el).map(|n| n.pin_spacer).unwrap_or(false)
    }

    fn offset(&self, el: ElementId, relative_to_viewport: bool) -> Point {
        let Some(node) = self.elements.get(el) else {
            return Point::ZERO;
        };
        let mut pos = node.position;
        // Scrolled ancestors shift descendants; document offsets stay
        // invariant to the root scroll unless viewport-relative.
        let mut cursor = node.parent;
        while let Some(ancestor) = cursor {
            let anc = &self.elements[ancestor];
            if ancestor != self.root {
                pos.x -= anc.scroll.x;
                pos.y -= anc.scroll.y;
            }
            cursor = anc.parent;
        }
        if relative_to_viewport {
            let root = &self.elements[self.root];
            pos.x -= root.scroll.x;
            pos.y -= root.scroll.y;
        }
        pos
    }

    fn content_size(&self, el: ElementId) -> Size {
        let Some(node) = self.elements.get(el) else {
            return Size::ZERO;
        };
        let parent_size = node
            .parent
            .map(|p| self.content_size(p))
            .unwrap_or(node.viewport);
        let resolve = |dim: Option<Dimension>, layout: f64, parent: f64| match dim {
            Some(Dimension::Px(v)) => v,
            Some(Dimension::Percent(p)) => parent * p / 100.0,
            _ => layout,
        };
        Size::new(
            resolve(node.inline.width, node.size.width, parent_size.width),
            resolve(node.inline.height, node.size.height, parent_size.height),
        )
    }

    fn outer_size(&self, el: ElementId, include_margin: bool) -> Size {
        let content = self.content_size(el);
        let padding = self.resolved_padding(el);
        let mut size = Size::new(
            content.width + padding.left + padding.right,
            content.height + padding.top + padding.bottom,
        );
        if include_margin {
            let margins = self.resolved_margins(el);
            size.width += margins.left + margins.right;
            size.height += margins.top + margins.bottom;
        }
        size
    }

    fn viewport_size(&self, el: ElementId) -> Size {
        self.elements.get(el).map(|n| n.viewport).unwrap_or(Size::ZERO)
    }

    fn scroll_offset(&self, el: ElementId, vertical: bool) -> f64 {
        self.elements
            .get(el)
            .map(|n| n.scroll.axis(vertical))
            .unwrap_or(0.0)
    }

    fn set_scroll_offset(&mut self, el: ElementId, vertical: bool, pos: f64) {
        if let Some(node) = self.elements.get_mut(el) {
            if vertical {
                node.scroll.y = pos;
            } else {
                node.scroll.x = pos;
            }
            node.signals.push(ContainerSignal::Scroll);
        }
    }

    fn emit_signal(&mut self, el: ElementId, signal: ContainerSignal) {
        if let Some(node) = self.elements.get_mut(el) {
            node.signals.push(signal);
        }
    }

    fn drain_signals(&mut self, el: ElementId) -> SmallVec<[ContainerSignal; 4]> {
        match self.elements.get_mut(el) {
            Some(node) => node.signals.drain(..).collect(),
            None => SmallVec::new(),
        }
    }

    fn computed_position(&self, el: ElementId) -> PositionMode {
        match self.elements.get(el) {
            Some(node) => node.inline.position.unwrap_or(node.natural.position),
            None => PositionMode::Static,
        }
    }

    fn computed_display(&self, el: ElementId) -> Display {
        match self.elements.get(el) {
            Some(node) => node.inline.display.unwrap_or(node.natural.display),
            None => Display::Block,
        }
    }

    fn resolved_margins(&self, el: ElementId) -> Edges {
        let Some(node) = self.elements.get(el) else {
            return Edges::default();
        };
        let side = |inline: Option<Dimension>, natural: f64| match inline {
            Some(dim) => dim.px_or_zero(),
            None => natural,
        };
        Edges {
            top: side(node.inline.margin_top, node.natural_margins.top),
            right: side(node.inline.margin_right, node.natural_margins.right),
            bottom: side(node.inline.margin_bottom, node.natural_margins.bottom),
            left: side(node.inline.margin_left, node.natural_margins.left),
        }
    }

    fn resolved_padding(&self, el: ElementId) -> Edges {
        let Some(node) = self.elements.get(el) else {
            return Edges::default();
        };
        let side = |inline: Option<Dimension>, natural: f64| match inline {
            Some(dim) => dim.px_or_zero(),
            None => natural,
        };
        Edges {
            top: side(node.inline.padding_top, node.natural_padding.top),
            right: side(node.inline.padding_right, node.natural_padding.right),
            bottom: side(node.inline.padding_bottom, node.natural_padding.bottom),
            left: side(node.inline.padding_left, node.natural_padding.left),
        }
    }

    fn natural_metrics(&mut self, el: ElementId) -> NaturalMetrics {
        self.elements
            .get(el)
            .map(|n| n.natural.clone())
            .unwrap_or_default()
    }

    fn inline_style(&self, el: ElementId) -> StylePatch {
        self.elements
            .get(el)
            .map(|n| n.inline.clone())
            .unwrap_or_default()
    }

    fn apply_style(&mut self, el: ElementId, patch: &StylePatch) {
        if let Some(node) = self.elements.get_mut(el) {
            node.inline.merge(patch);
        }
    }

    fn set_inline_style(&mut self, el: ElementId, style: StylePatch) {
        if let Some(node) = self.elements.get_mut(el) {
            node.inline = style;
        }
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if class.is_empty() {
            return;
        }
        if let Some(node) = self.elements.get_mut(el) {
            for name in class.split_whitespace() {
                if !node.classes.iter().any(|c| c == name) {
                    node.classes.push(name.to_string());
                }
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.elements.get_mut(el) {
            for name in class.split_whitespace() {
                node.classes.retain(|c| c != name);
            }
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.elements
            .get(el)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn create_spacer(
        &mut self,
        before: ElementId,
        style: StylePatch,
        class: &str,
    ) -> Option<ElementId> {
        let (parent, position, size) = {
            let node = self.elements.get(before)?;
            (node.parent?, node.position, node.size)
        };
        let spacer = self.elements.insert(ElementNode::new(None));
        {
            let node = &mut self.elements[spacer];
            node.parent = Some(parent);
            node.inline = style;
            node.position = position;
            node.size = size;
            node.pin_spacer = true;
        }
        self.add_class(spacer, class);
        let siblings = &mut self.elements[parent].children;
        let index = siblings.iter().position(|c| *c == before).unwrap_or(siblings.len());
        siblings.insert(index, spacer);
        Some(spacer)
    }

    fn reparent(&mut self, child: ElementId, new_parent: ElementId) {
        if !self.elements.contains_key(child) || !self.elements.contains_key(new_parent) {
            return;
        }
        if let Some(old_parent) = self.elements[child].parent {
            self.elements[old_parent].children.retain(|c| *c != child);
        }
        self.elements[child].parent = Some(new_parent);
        self.elements[new_parent].children.push(child);
    }

    fn insert_before(&mut self, el: ElementId, reference: ElementId) {
        let Some(parent) = self.elements.get(reference).and_then(|n| n.parent) else {
            return;
        };
        if !self.elements.contains_key(el) {
            return;
        }
        if let Some(old_parent) = self.elements[el].parent {
            self.elements[old_parent].children.retain(|c| *c != el);
        }
        self.elements[el].parent = Some(parent);
        let siblings = &mut self.elements[parent].children;
        let index = siblings
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(index, el);
    }

    fn remove_element(&mut self, el: ElementId) {
        if let Some(node) = self.elements.remove(el) {
            if let Some(parent) = node.parent {
                if let Some(parent_node) = self.elements.get_mut(parent) {
                    parent_node.children.retain(|c| *c != el);
                }
            }
            if let Some(name) = node.name {
                self.names.remove(&name);
            }
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom() -> MockDom {
        MockDom::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn resolve_and_structure() {
        let mut dom = dom();
        let a = dom.create_element("a");
        let b = dom.create_child(a, "b");
        assert_eq!(dom.resolve("a"), Some(a));
        assert_eq!(dom.parent(b), Some(a));
        assert_eq!(dom.first_child(a), Some(b));
        assert!(dom.is_document(dom.document_root()));
        assert!(!dom.is_document(a));
    }

    #[test]
    fn offsets_follow_ancestor_scroll() {
        let mut dom = dom();
        let container = dom.create_element("container");
        let inner = dom.create_child(container, "inner");
        dom.set_position(inner, Point::new(0.0, 500.0));

        assert_eq!(dom.offset(inner, false).y, 500.0);

        // Scrolling the inner container moves the element up in document
        // terms; scrolling the root only affects viewport-relative reads.
        dom.set_scroll_offset(container, true, 100.0);
        assert_eq!(dom.offset(inner, false).y, 400.0);

        let root = dom.document_root();
        dom.set_scroll_offset(root, true, 50.0);
        assert_eq!(dom.offset(inner, false).y, 400.0);
        assert_eq!(dom.offset(inner, true).y, 350.0);
    }

    #[test]
    fn scroll_queues_signal() {
        let mut dom = dom();
        let root = dom.document_root();
        dom.set_scroll_offset(root, true, 10.0);
        dom.set_scroll_offset(root, true, 20.0);
        let signals = dom.drain_signals(root);
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| *s == ContainerSignal::Scroll));
        assert!(dom.drain_signals(root).is_empty());
    }

    #[test]
    fn inline_style_wins_over_natural() {
        let mut dom = dom();
        let el = dom.create_element("el");
        dom.set_natural_metrics(
            el,
            NaturalMetrics {
                position: PositionMode::Relative,
                ..Default::default()
            },
        );
        assert_eq!(dom.computed_position(el), PositionMode::Relative);

        dom.apply_style(
            el,
            &StylePatch {
                position: Some(PositionMode::Fixed),
                ..Default::default()
            },
        );
        assert_eq!(dom.computed_position(el), PositionMode::Fixed);
    }

    #[test]
    fn spacer_insertion_and_restore() {
        let mut dom = dom();
        let before = dom.create_element("before");
        let target = dom.create_element("target");
        let after = dom.create_element("after");
        let _ = (before, after);

        let spacer = dom
            .create_spacer(target, StylePatch::default(), "pin-spacer")
            .unwrap();
        assert!(dom.is_pin_spacer(spacer));
        assert!(dom.has_class(spacer, "pin-spacer"));

        dom.reparent(target, spacer);
        assert_eq!(dom.parent(target), Some(spacer));
        assert_eq!(dom.first_child(spacer), Some(target));

        dom.insert_before(target, spacer);
        dom.remove_element(spacer);
        assert_eq!(dom.parent(target), Some(dom.document_root()));
        assert!(!dom.element_exists(spacer));
    }

    #[test]
    fn class_list_handling() {
        let mut dom = dom();
        let el = dom.create_element("el");
        dom.add_class(el, "one two");
        assert!(dom.has_class(el, "one"));
        assert!(dom.has_class(el, "two"));
        dom.remove_class(el, "one");
        assert!(!dom.has_class(el, "one"));
        assert!(dom.has_class(el, "two"));
    }

    #[test]
    fn percent_size_resolves_against_parent() {
        let mut dom = dom();
        let parent = dom.create_element("parent");
        dom.set_size(parent, Size::new(400.0, 200.0));
        let child = dom.create_child(parent, "child");
        dom.apply_style(
            child,
            &StylePatch {
                width: Some(Dimension::Percent(50.0)),
                ..Default::default()
            },
        );
        assert_eq!(dom.content_size(child).width, 200.0);
    }
}
