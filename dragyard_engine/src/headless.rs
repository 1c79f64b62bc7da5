// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`DomHost`] for tests, examples, and embedding the engine
//! without a document.
//!
//! The host performs no layout: every element's rectangle is whatever the
//! caller configured, and transforms are recorded rather than applied to the
//! rectangles. Hit-testing resolves the topmost element by `z`, then depth,
//! then recency, and floating previews are transparent to it like a real
//! preview with `pointer-events: none`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};

use crate::adapter::{DomHost, ElementId, VisualState};
use crate::config::PreviewSpec;
use dragyard_geometry::Direction;

#[derive(Clone, Debug)]
struct Node {
    rect: Rect,
    parent: Option<usize>,
    children: Vec<usize>,
    z: i32,
    scrollable: bool,
    scroll: Vec2,
    scroll_extent: Vec2,
    transition_ms: u64,
    base_transform: String,
    translation: Option<Vec2>,
    direction: Direction,
    native_draggable: bool,
    state: VisualState,
    classes: Vec<String>,
    floating: bool,
    alive: bool,
}

impl Node {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            parent: None,
            children: Vec::new(),
            z: 0,
            scrollable: false,
            scroll: Vec2::ZERO,
            scroll_extent: Vec2::ZERO,
            transition_ms: 0,
            base_transform: String::new(),
            translation: None,
            direction: Direction::Ltr,
            native_draggable: false,
            state: VisualState::empty(),
            classes: Vec::new(),
            floating: false,
            alive: true,
        }
    }
}

/// Headless document model implementing [`DomHost`].
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    nodes: Vec<Node>,
    viewport: Rect,
    viewport_scroll: Vec2,
    viewport_extent: Vec2,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Creates an empty host with a 1024x768 viewport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            viewport: Rect::new(0.0, 0.0, 1024.0, 768.0),
            viewport_scroll: Vec2::ZERO,
            viewport_extent: Vec2::ZERO,
        }
    }

    /// Adds a root-level element with the given rectangle.
    pub fn add_element(&mut self, rect: Rect) -> ElementId {
        self.nodes.push(Node::new(rect));
        ElementId::from_raw(self.nodes.len() as u64 - 1)
    }

    /// Adds an element as the last child of `parent`.
    pub fn add_child(&mut self, parent: ElementId, rect: Rect) -> ElementId {
        let el = self.add_element(rect);
        let index = self
            .node(parent)
            .map(|n| n.children.len())
            .unwrap_or_default();
        self.insert_child(parent, index, el);
        el
    }

    /// Sets the viewport rectangle.
    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    /// Makes the viewport scrollable up to `extent`.
    pub fn set_viewport_scroll_extent(&mut self, extent: Vec2) {
        self.viewport_extent = extent;
    }

    /// Replaces an element's rectangle, as a relayout would.
    pub fn set_rect(&mut self, el: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(el) {
            node.rect = rect;
        }
    }

    /// Sets an element's stacking order.
    pub fn set_z(&mut self, el: ElementId, z: i32) {
        if let Some(node) = self.node_mut(el) {
            node.z = z;
        }
    }

    /// Makes an element scrollable up to `extent`.
    pub fn set_scrollable(&mut self, el: ElementId, extent: Vec2) {
        if let Some(node) = self.node_mut(el) {
            node.scrollable = true;
            node.scroll_extent = extent;
        }
    }

    /// Declares a CSS `transform` transition duration on an element.
    pub fn set_transition_ms(&mut self, el: ElementId, ms: u64) {
        if let Some(node) = self.node_mut(el) {
            node.transition_ms = ms;
        }
    }

    /// Sets an element's pre-existing transform.
    pub fn set_base_transform(&mut self, el: ElementId, transform: &str) {
        if let Some(node) = self.node_mut(el) {
            node.base_transform = String::from(transform);
        }
    }

    /// Sets an element's text direction.
    pub fn set_direction(&mut self, el: ElementId, direction: Direction) {
        if let Some(node) = self.node_mut(el) {
            node.direction = direction;
        }
    }

    /// Marks an element as participating in HTML5 native drag.
    pub fn set_native_draggable(&mut self, el: ElementId, draggable: bool) {
        if let Some(node) = self.node_mut(el) {
            node.native_draggable = draggable;
        }
    }

    /// The full transform string currently in effect on an element: the drag
    /// translation composed in front of the pre-existing transform.
    #[must_use]
    pub fn transform_css(&self, el: ElementId) -> String {
        let Some(node) = self.node(el) else {
            return String::new();
        };
        match node.translation {
            Some(v) => {
                let translate = format!("translate3d({}px, {}px, 0)", v.x, v.y);
                if node.base_transform.is_empty() {
                    translate
                } else {
                    format!("{translate} {}", node.base_transform)
                }
            }
            None => node.base_transform.clone(),
        }
    }

    /// The drag translation currently applied to an element.
    #[must_use]
    pub fn translation(&self, el: ElementId) -> Option<Vec2> {
        self.node(el).and_then(|n| n.translation)
    }

    /// Visual state flags on an element.
    #[must_use]
    pub fn visual_state(&self, el: ElementId) -> VisualState {
        self.node(el).map(|n| n.state).unwrap_or_default()
    }

    /// Class names applied to a preview element.
    #[must_use]
    pub fn classes(&self, el: ElementId) -> &[String] {
        self.node(el).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    /// Whether the element has not been removed.
    #[must_use]
    pub fn is_alive(&self, el: ElementId) -> bool {
        self.node(el).is_some()
    }

    /// Children of an element, in insertion order.
    #[must_use]
    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.node(el)
            .map(|n| {
                n.children
                    .iter()
                    .map(|i| ElementId::from_raw(*i as u64))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent of an element.
    #[must_use]
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el)?
            .parent
            .map(|i| ElementId::from_raw(i as u64))
    }

    /// Current scroll offset of an element.
    #[must_use]
    pub fn scroll(&self, el: ElementId) -> Vec2 {
        self.node(el).map(|n| n.scroll).unwrap_or_default()
    }

    /// Current viewport scroll offset.
    #[must_use]
    pub fn viewport_scroll_offset(&self) -> Vec2 {
        self.viewport_scroll
    }

    fn index(el: ElementId) -> usize {
        el.to_raw() as usize
    }

    fn node(&self, el: ElementId) -> Option<&Node> {
        self.nodes.get(Self::index(el)).filter(|n| n.alive)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(Self::index(el)).filter(|n| n.alive)
    }

    fn depth(&self, mut index: usize) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.nodes.get(index).and_then(|n| n.parent) {
            depth += 1;
            index = parent;
        }
        depth
    }

    fn detach(&mut self, el: ElementId) {
        let index = Self::index(el);
        let Some(parent) = self.nodes.get(index).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|c| *c != index);
        }
        if let Some(node) = self.nodes.get_mut(index) {
            node.parent = None;
        }
    }
}

impl DomHost for HeadlessHost {
    fn is_element(&self, el: ElementId) -> bool {
        self.node(el).is_some()
    }

    fn element_rect(&self, el: ElementId) -> Option<Rect> {
        self.node(el).map(|n| n.rect)
    }

    fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    fn viewport_scroll(&self) -> Vec2 {
        self.viewport_scroll
    }

    fn scroll_offset(&self, el: ElementId) -> Vec2 {
        self.scroll(el)
    }

    fn scroll_extent(&self, el: Option<ElementId>) -> Vec2 {
        match el {
            Some(el) => self.node(el).map(|n| n.scroll_extent).unwrap_or_default(),
            None => self.viewport_extent,
        }
    }

    fn scroll_by(&mut self, el: Option<ElementId>, delta: Vec2) {
        match el {
            Some(el) => {
                if let Some(node) = self.node_mut(el) {
                    let extent = node.scroll_extent;
                    node.scroll = Vec2::new(
                        (node.scroll.x + delta.x).clamp(0.0, extent.x),
                        (node.scroll.y + delta.y).clamp(0.0, extent.y),
                    );
                }
            }
            None => {
                self.viewport_scroll = Vec2::new(
                    (self.viewport_scroll.x + delta.x).clamp(0.0, self.viewport_extent.x),
                    (self.viewport_scroll.y + delta.y).clamp(0.0, self.viewport_extent.y),
                );
            }
        }
    }

    fn scrollable_ancestors(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut index = Self::index(el);
        while let Some(node) = self.nodes.get(index) {
            if node.scrollable {
                out.push(ElementId::from_raw(index as u64));
            }
            match node.parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        out
    }

    fn topmost_at(&self, point: Point) -> Option<ElementId> {
        let mut best: Option<(i32, usize, usize)> = None;
        for (index, node) in self.nodes.iter().enumerate() {
            if !node.alive || node.floating || !node.rect.contains(point) {
                continue;
            }
            let key = (node.z, self.depth(index), index);
            if best.is_none_or(|b| key > b) {
                best = Some(key);
            }
        }
        best.map(|(_, _, index)| ElementId::from_raw(index as u64))
    }

    fn is_descendant(&self, el: ElementId, ancestor: ElementId) -> bool {
        if self.node(el).is_none() || self.node(ancestor).is_none() {
            return false;
        }
        let target = Self::index(ancestor);
        let mut index = Self::index(el);
        loop {
            if index == target {
                return true;
            }
            match self.nodes.get(index).and_then(|n| n.parent) {
                Some(parent) => index = parent,
                None => return false,
            }
        }
    }

    fn direction(&self, el: ElementId) -> Direction {
        self.node(el).map(|n| n.direction).unwrap_or_default()
    }

    fn is_native_draggable(&self, el: ElementId) -> bool {
        self.node(el).is_some_and(|n| n.native_draggable)
    }

    fn set_translation(&mut self, el: ElementId, offset: Vec2) {
        if let Some(node) = self.node_mut(el) {
            node.translation = Some(offset);
        }
    }

    fn clear_translation(&mut self, el: ElementId) {
        if let Some(node) = self.node_mut(el) {
            node.translation = None;
        }
    }

    fn set_visual_flag(&mut self, el: ElementId, flag: VisualState, on: bool) {
        if let Some(node) = self.node_mut(el) {
            node.state.set(flag, on);
        }
    }

    fn create_preview(
        &mut self,
        source: ElementId,
        spec: &PreviewSpec,
        parent: Option<ElementId>,
    ) -> ElementId {
        // A dead custom template falls back to the plain clone silently.
        let template_rect = spec.template.and_then(|t| self.element_rect(t));
        let rect = template_rect
            .or_else(|| self.element_rect(source))
            .unwrap_or(Rect::ZERO);
        let preview = self.add_element(rect);
        if let Some(node) = self.node_mut(preview) {
            node.floating = true;
            node.z = spec.z_index.unwrap_or(1000);
            node.classes = spec.class_names.clone();
        }
        if let Some(parent) = parent {
            let index = self
                .node(parent)
                .map(|n| n.children.len())
                .unwrap_or_default();
            self.insert_child(parent, index, preview);
        }
        preview
    }

    fn create_placeholder(&mut self, source: ElementId, template: Option<ElementId>) -> ElementId {
        let rect = template
            .and_then(|t| self.element_rect(t))
            .or_else(|| self.element_rect(source))
            .unwrap_or(Rect::ZERO);
        self.add_element(rect)
    }

    fn insert_child(&mut self, parent: ElementId, index: usize, el: ElementId) {
        if self.node(parent).is_none() || self.node(el).is_none() || parent == el {
            return;
        }
        self.detach(el);
        let child = Self::index(el);
        let parent_index = Self::index(parent);
        if let Some(parent_node) = self.nodes.get_mut(parent_index) {
            let index = index.min(parent_node.children.len());
            parent_node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent_index);
        }
    }

    fn remove_node(&mut self, el: ElementId) {
        self.detach(el);
        if let Some(node) = self.nodes.get_mut(Self::index(el)) {
            node.alive = false;
        }
    }

    fn transform_transition_ms(&self, el: ElementId) -> u64 {
        self.node(el).map(|n| n.transition_ms).unwrap_or_default()
    }
}
