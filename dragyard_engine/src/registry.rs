// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine itself: item/container registration, the single-session
//! arbiter, and the pointer/frame entry points that drive a drag from press
//! to drop.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::adapter::{DomHost, ElementId, SetupError, VisualState};
use crate::autoscroll::resolve_scroll_target;
use crate::config::{ContainerConfig, DragConfig, DragId, PreviewContainer};
use crate::drag::{self, PendingDrop, Phase, Session};
use crate::drop_list::Container;
use crate::events::DragDropEvent;
use crate::sort::{DirectionTracker, SortEntry, SortState};
use dragyard_gesture::{GateTransition, PointerDevice, PressGate};
use dragyard_geometry::{RectCache, ScrollTracker};
use dragyard_graph::{ConnectTarget, ConnectionGraph, ContainerId, GroupId};

/// Mouse button carried by a press. Only [`PointerButton::Primary`] presses
/// can start a drag; touch input always reports `Primary`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button, or any touch contact.
    Primary,
    /// Middle button.
    Auxiliary,
    /// Right button.
    Secondary,
}

#[derive(Debug)]
struct Item {
    element: ElementId,
    handles: SmallVec<[ElementId; 2]>,
    config: DragConfig,
    container: Option<ContainerId>,
}

/// The drag-and-drop engine.
///
/// Owns the host boundary, every registered item and container, the
/// container connectivity graph, and at most one active drag session. All
/// entry points take explicit millisecond timestamps; the engine holds no
/// clock and schedules no timers — the host calls [`DragDrop::on_frame`]
/// once per animation frame while a drag is active.
///
/// A second pointer press while a session exists is a no-op, rejected here
/// at the arbiter rather than through shared flags.
#[derive(Debug)]
pub struct DragDrop<H: DomHost> {
    host: H,
    items: Vec<Option<Item>>,
    containers: Vec<Option<Container>>,
    graph: ConnectionGraph,
    next_group: u64,
    session: Option<Session>,
    events: Vec<DragDropEvent>,
}

impl<H: DomHost> DragDrop<H> {
    /// Creates an engine over a host.
    pub fn new(host: H) -> Self {
        Self {
            host,
            items: Vec::new(),
            containers: Vec::new(),
            graph: ConnectionGraph::new(),
            next_group: 0,
            session: None,
            events: Vec::new(),
        }
    }

    /// The host boundary.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host boundary.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Registers a draggable element.
    pub fn register_item(
        &mut self,
        element: ElementId,
        config: DragConfig,
    ) -> Result<DragId, SetupError> {
        if !self.host.is_element(element) {
            return Err(SetupError::NotAnElement(element));
        }
        if config.disabled {
            self.host
                .set_visual_flag(element, VisualState::DISABLED, true);
        }
        self.items.push(Some(Item {
            element,
            handles: SmallVec::new(),
            config,
            container: None,
        }));
        Ok(DragId::from_raw(self.items.len() as u64 - 1))
    }

    /// Declares drag handles for an item. Once any handle is declared, only
    /// presses on (or inside) a handle start a drag.
    pub fn set_handles(&mut self, item: DragId, handles: &[ElementId]) -> Result<(), SetupError> {
        for h in handles {
            if !self.host.is_element(*h) {
                return Err(SetupError::NotAnElement(*h));
            }
        }
        let slot = self
            .item_mut(item)
            .ok_or(SetupError::UnknownItem(item.to_raw()))?;
        slot.handles = SmallVec::from_slice(handles);
        Ok(())
    }

    /// Registers a drop container.
    pub fn register_container(
        &mut self,
        element: ElementId,
        config: ContainerConfig,
    ) -> Result<ContainerId, SetupError> {
        if !self.host.is_element(element) {
            return Err(SetupError::NotAnElement(element));
        }
        if config.disabled {
            self.host
                .set_visual_flag(element, VisualState::DISABLED, true);
        }
        self.containers.push(Some(Container::new(element, config)));
        let id = ContainerId::from_raw(self.containers.len() as u64 - 1);
        self.graph.add_node(id);
        Ok(id)
    }

    /// Attaches an item to a container, appending it to the member list.
    /// An item attached elsewhere is moved.
    pub fn attach(&mut self, item: DragId, container: ContainerId) -> Result<(), SetupError> {
        if self.container(container).is_none() {
            return Err(SetupError::UnknownContainer(container.to_raw()));
        }
        let previous = {
            let slot = self
                .item_mut(item)
                .ok_or(SetupError::UnknownItem(item.to_raw()))?;
            slot.container.replace(container)
        };
        if let Some(previous) = previous
            && let Some(c) = self.container_mut(previous)
        {
            c.remove_item(item);
        }
        if let Some(c) = self.container_mut(container) {
            c.push_item(item);
        }
        Ok(())
    }

    /// Claims a name for a container, so connections can reference it by
    /// string before it exists.
    pub fn set_container_name(
        &mut self,
        container: ContainerId,
        name: &str,
    ) -> Result<(), SetupError> {
        if self.container(container).is_none() {
            return Err(SetupError::UnknownContainer(container.to_raw()));
        }
        self.graph.set_name(container, name);
        Ok(())
    }

    /// Declares a one-directional connection from a container.
    pub fn connect(
        &mut self,
        from: ContainerId,
        target: ConnectTarget,
    ) -> Result<(), SetupError> {
        if self.container(from).is_none() {
            return Err(SetupError::UnknownContainer(from.to_raw()));
        }
        self.graph.connect(from, target);
        Ok(())
    }

    /// Drops every connection declared by a container.
    pub fn clear_connections(&mut self, from: ContainerId) {
        self.graph.clear_connections(from);
    }

    /// Allocates a container group. Members of a group are mutually
    /// connected.
    pub fn create_group(&mut self) -> GroupId {
        let id = GroupId::from_raw(self.next_group);
        self.next_group += 1;
        id
    }

    /// Adds a container to a group.
    pub fn join_group(
        &mut self,
        container: ContainerId,
        group: GroupId,
    ) -> Result<(), SetupError> {
        if self.container(container).is_none() {
            return Err(SetupError::UnknownContainer(container.to_raw()));
        }
        self.graph.join_group(container, group);
        Ok(())
    }

    /// Current member order of a container: the ordering model.
    pub fn items_in(&self, container: ContainerId) -> &[DragId] {
        self.container(container)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    /// Root element of an item.
    pub fn element_of(&self, item: DragId) -> Option<ElementId> {
        self.item(item).map(|i| i.element)
    }

    /// Whether a drag is actively underway (gates passed, not yet ended).
    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_dragging)
    }

    /// Takes all events emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<DragDropEvent> {
        core::mem::take(&mut self.events)
    }

    /// Destroys an item. If it is mid-drag, the session is force-terminated
    /// first.
    pub fn destroy_item(&mut self, item: DragId, now_ms: u64) {
        if self.session.as_ref().is_some_and(|s| s.item == item) {
            self.interrupt(now_ms);
        }
        let container = self.item(item).and_then(|i| i.container);
        if let Some(container) = container
            && let Some(c) = self.container_mut(container)
        {
            c.remove_item(item);
        }
        if let Some(slot) = self.items.get_mut(item.to_raw() as usize) {
            *slot = None;
        }
    }

    /// Destroys a container. A session that started in it or is over it is
    /// force-terminated.
    pub fn destroy_container(&mut self, container: ContainerId, now_ms: u64) {
        let involved = self.session.as_ref().is_some_and(|s| {
            s.origin == Some(container) || s.current == Some(container)
        });
        if involved {
            self.interrupt(now_ms);
        }
        self.graph.remove_node(container);
        if let Some(slot) = self.containers.get_mut(container.to_raw() as usize) {
            if let Some(c) = slot {
                for item in c.items.clone() {
                    if let Some(i) = self.items.get_mut(item.to_raw() as usize).and_then(Option::as_mut) {
                        i.container = None;
                    }
                }
            }
            *slot = None;
        }
    }

    /// A pointer press on an item (or one of its handles). Ignored while a
    /// session is active, for non-primary mouse buttons, for disabled items
    /// or containers, for native-draggable elements, and for presses off the
    /// declared handles.
    pub fn pointer_down(
        &mut self,
        item: DragId,
        pressed: ElementId,
        device: PointerDevice,
        button: PointerButton,
        position: Point,
        now_ms: u64,
    ) {
        // A drop still waiting out its transition must not block the next
        // drag; finish it on the spot.
        if let Some(old) = self
            .session
            .take_if(|s| matches!(s.phase, Phase::Releasing { .. }))
        {
            self.finalize_drop(old);
        }
        if self.session.is_some() {
            return;
        }
        if device == PointerDevice::Mouse && button != PointerButton::Primary {
            return;
        }
        let Some(slot) = self.item(item) else {
            return;
        };
        if slot.config.disabled {
            return;
        }
        if self.host.is_native_draggable(pressed) || self.host.is_native_draggable(slot.element) {
            return;
        }
        if !slot.handles.is_empty()
            && !slot
                .handles
                .iter()
                .any(|h| self.host.is_descendant(pressed, *h))
        {
            return;
        }
        if let Some(container) = slot.container
            && self
                .container(container)
                .is_some_and(|c| c.config.disabled)
        {
            return;
        }

        let source = slot.element;
        let config = slot.config.clone();
        let origin = slot.container;
        let mut gate = PressGate::new(config.drag_start_threshold, config.drag_start_delay);
        gate.on_down(device, position, now_ms);
        let pointer_direction =
            DirectionTracker::new(config.pointer_direction_change_threshold, position);
        self.session = Some(Session {
            item,
            source,
            config,
            origin,
            origin_index: 0,
            current: origin,
            gate,
            phase: Phase::Pending,
            pickup: position,
            last_pointer: position,
            applied: Vec2::ZERO,
            initial_rect: Rect::ZERO,
            scroll: ScrollTracker::new(),
            container_rects: RectCache::new(),
            sort: SortState::new(Default::default(), Default::default()),
            pointer_direction,
            preview: None,
            placeholder: None,
            scroll_target: None,
            receiving: Vec::new(),
            pending_drop: None,
        });
    }

    /// A pointer move. Gate-checks a pending press; drives an active drag.
    pub fn pointer_move(&mut self, position: Point, now_ms: u64) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match session.phase {
            Phase::Pending => match session.gate.on_move(position, now_ms) {
                GateTransition::Pending => self.session = Some(session),
                // A move inside the delay window abandons the whole gesture.
                GateTransition::Abandoned => {}
                GateTransition::Armed => {
                    self.start_drag(&mut session);
                    self.drag_move(&mut session, position);
                    self.session = Some(session);
                }
            },
            Phase::Dragging => {
                self.drag_move(&mut session, position);
                self.session = Some(session);
            }
            Phase::Releasing { .. } => self.session = Some(session),
        }
    }

    /// A pointer release. A pending press resolves as a plain click with no
    /// events; an active drag begins its drop sequence.
    pub fn pointer_up(&mut self, position: Point, now_ms: u64) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match session.phase {
            Phase::Pending => {
                // Plain click; leave no trace.
            }
            Phase::Dragging => {
                session.last_pointer = position;
                session.scroll_target = None;
                self.events.push(DragDropEvent::Released { item: session.item });
                if session.current.is_none() {
                    // Free drag: the element keeps its translation.
                    self.host
                        .set_visual_flag(session.source, VisualState::DRAGGING, false);
                    self.events.push(DragDropEvent::Ended {
                        item: session.item,
                        distance: position - session.pickup,
                        drop_point: position,
                    });
                } else {
                    let is_over = self.pointer_over_current(&session, position);
                    session.pending_drop = Some(PendingDrop {
                        pointer: position,
                        distance: position - session.pickup,
                        is_pointer_over_container: is_over,
                    });
                    let transition_ms = session
                        .preview
                        .map(|p| self.host.transform_transition_ms(p))
                        .unwrap_or(0);
                    if transition_ms == 0 {
                        self.finalize_drop(session);
                    } else {
                        // Wait for the transform transition, but never past
                        // its declared duration.
                        session.phase = Phase::Releasing {
                            deadline: now_ms + transition_ms,
                        };
                        self.session = Some(session);
                    }
                }
            }
            Phase::Releasing { .. } => self.session = Some(session),
        }
    }

    /// The host reports that the preview's `transform` transition ended.
    pub fn transition_ended(&mut self, _now_ms: u64) {
        if let Some(session) = self.session.take_if(|s| matches!(s.phase, Phase::Releasing { .. })) {
            self.finalize_drop(session);
        }
    }

    /// One animation frame: applies an auto-scroll step and finalizes a drop
    /// whose transition deadline has passed.
    pub fn on_frame(&mut self, now_ms: u64) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match session.phase {
            Phase::Pending => self.session = Some(session),
            Phase::Dragging => {
                if let Some((target, step)) = session.scroll_target {
                    self.host.scroll_by(target, step);
                    match target {
                        Some(el) => self.element_scrolled(&mut session, el),
                        None => self.viewport_scrolled(&mut session),
                    }
                }
                self.session = Some(session);
            }
            Phase::Releasing { deadline } => {
                if now_ms >= deadline {
                    self.finalize_drop(session);
                } else {
                    self.session = Some(session);
                }
            }
        }
    }

    /// Force-terminates the active session (Escape, element destruction).
    /// Visuals are torn down; the ordering model stays as it was at the
    /// moment of interruption.
    pub fn interrupt(&mut self, _now_ms: u64) {
        let Some(session) = self.session.take() else {
            return;
        };
        if matches!(session.phase, Phase::Pending) {
            return;
        }
        let distance = session.last_pointer - session.pickup;
        let drop_point = session.last_pointer;
        let item = session.item;
        self.teardown(&session);
        self.events.push(DragDropEvent::Ended {
            item,
            distance,
            drop_point,
        });
    }

    /// The viewport scrolled (by the user or anything outside the engine).
    pub fn notify_viewport_scrolled(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.is_dragging() {
            self.viewport_scrolled(&mut session);
        }
        self.session = Some(session);
    }

    /// A scrollable element scrolled outside the engine's own auto-scroll.
    pub fn notify_element_scrolled(&mut self, el: ElementId) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if session.is_dragging() {
            self.element_scrolled(&mut session, el);
        }
        self.session = Some(session);
    }

    /// Geometry changed (resize, relayout). Re-measures every cached
    /// rectangle and re-applies the boundary constraint; a boundary now
    /// smaller than the element resets the offset on that axis to zero.
    pub fn notify_resize(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if !session.is_dragging() {
            self.session = Some(session);
            return;
        }
        let measured: Vec<(ContainerId, Rect)> = self
            .live_containers()
            .filter_map(|(id, c)| self.host.element_rect(c.element).map(|r| (id, r)))
            .collect();
        session.container_rects.rebuild(measured);
        let placeholder = session.placeholder;
        let dragged = session.item;
        session.sort.remeasure(|item| {
            let el = if item == dragged {
                placeholder?
            } else {
                self.items
                    .get(item.to_raw() as usize)?
                    .as_ref()?
                    .element
            };
            self.host.element_rect(el)
        });
        if let Some(boundary) = session.config.boundary
            && let Some(rect) = self.host.element_rect(boundary)
        {
            if rect.width() < session.initial_rect.width() {
                session.applied.x = 0.0;
            }
            if rect.height() < session.initial_rect.height() {
                session.applied.y = 0.0;
            }
            let moving = session.moving_element();
            self.host
                .set_translation(moving, drag::round_translation(session.applied));
        }
        self.session = Some(session);
    }

    fn item(&self, id: DragId) -> Option<&Item> {
        self.items.get(id.to_raw() as usize)?.as_ref()
    }

    fn item_mut(&mut self, id: DragId) -> Option<&mut Item> {
        self.items.get_mut(id.to_raw() as usize)?.as_mut()
    }

    fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.to_raw() as usize)?.as_ref()
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(id.to_raw() as usize)?.as_mut()
    }

    fn live_containers(&self) -> impl Iterator<Item = (ContainerId, &Container)> {
        self.containers
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ContainerId::from_raw(i as u64), c)))
    }

    /// Transition from `Pending` to `Dragging`: measure, build caches,
    /// create the preview and placeholder, flag visuals, emit `Started`.
    fn start_drag(&mut self, session: &mut Session) {
        session.phase = Phase::Dragging;
        session.initial_rect = self
            .host
            .element_rect(session.source)
            .unwrap_or(Rect::ZERO);

        // Scroll snapshot: the compensation set is the source's own
        // scrollable chain; refreshed atomically here, adjusted on every
        // notification.
        let ancestors = self.host.scrollable_ancestors(session.source);
        let offsets: Vec<(ElementId, Vec2)> = ancestors
            .iter()
            .map(|el| (*el, self.host.scroll_offset(*el)))
            .collect();
        session
            .scroll
            .snapshot(self.host.viewport_scroll(), offsets);

        let measured: Vec<(ContainerId, Rect)> = self
            .live_containers()
            .filter_map(|(id, c)| self.host.element_rect(c.element).map(|r| (id, r)))
            .collect();
        session.container_rects.rebuild(measured);

        self.host
            .set_visual_flag(session.source, VisualState::DRAGGING, true);

        if let Some(origin) = session.current
            && let Some(c) = self.container(origin)
        {
            let container_el = c.element;
            let preview_parent = match session.config.preview_container {
                PreviewContainer::Global => None,
                PreviewContainer::Parent => Some(c.element),
                PreviewContainer::Element(el) => Some(el),
            };
            let origin_index = c.index_of(session.item).unwrap_or(0);
            session.origin_index = origin_index;

            let placeholder = self
                .host
                .create_placeholder(session.source, session.config.placeholder_template);
            self.host
                .insert_child(container_el, origin_index, placeholder);
            session.placeholder = Some(placeholder);

            let preview =
                self.host
                    .create_preview(session.source, &session.config.preview, preview_parent);
            self.host.set_translation(preview, Vec2::ZERO);
            session.preview = Some(preview);

            self.rebuild_sort_state(session, origin, false);
            self.update_receiving(session);
            self.graph.log_unresolved(origin);
        }

        log::trace!(
            "drag started: item={:?} origin={:?}",
            session.item,
            session.origin
        );
        self.events.push(DragDropEvent::Started { item: session.item });
    }

    /// Builds the sort state for `container` from its current members.
    /// `without_item` leaves the dragged item out, for a container it is
    /// about to enter.
    fn rebuild_sort_state(
        &mut self,
        session: &mut Session,
        container: ContainerId,
        without_item: bool,
    ) {
        let Some(c) = self.container(container) else {
            return;
        };
        let direction = self.host.direction(c.element);
        let mut sort = SortState::new(c.config.orientation, direction);
        let mut entries = Vec::new();
        for member in &c.items {
            if *member == session.item && without_item {
                continue;
            }
            let Some(slot) = self.items.get(member.to_raw() as usize).and_then(Option::as_ref)
            else {
                continue;
            };
            // The dragged item's slot is represented by its placeholder.
            let (element, rect) = if *member == session.item {
                let el = session.placeholder.unwrap_or(slot.element);
                (el, self.host.element_rect(el))
            } else {
                (slot.element, self.host.element_rect(slot.element))
            };
            // A sibling that no longer measures is skipped, not fatal.
            let Some(rect) = rect else {
                continue;
            };
            entries.push(SortEntry::new(*member, element, rect));
        }
        sort.rebuild(entries);
        session.sort = sort;
    }

    /// One pointer move while dragging: position pipeline, transfer check,
    /// sorting, auto-scroll target, `Moved` event.
    fn drag_move(&mut self, session: &mut Session, position: Point) {
        session.last_pointer = position;
        session.pointer_direction.update(position);

        let container_lock = session
            .current
            .and_then(|c| self.container(c))
            .and_then(|c| c.config.lock_axis);
        let boundary_rect = session
            .config
            .boundary
            .and_then(|b| self.host.element_rect(b));
        let delta = drag::resolve_position(
            &session.config,
            container_lock,
            session.item,
            session.pickup,
            position,
            session.scroll.total(),
            session.initial_rect,
            boundary_rect,
            session.applied,
        );
        session.applied = delta;
        self.host
            .set_translation(session.moving_element(), drag::round_translation(delta));

        if session.current.is_some() {
            self.update_container(session, position);
            self.sort_in_current(session, position);
            self.update_scroll_target(session, position);
        }

        self.events.push(DragDropEvent::Moved {
            item: session.item,
            pointer_position: position,
            distance: position - session.pickup,
        });
    }

    /// Tracks which container the pointer is over, transferring the
    /// placeholder on a permitted entry.
    fn update_container(&mut self, session: &mut Session, position: Point) {
        let (Some(origin), Some(current)) = (session.origin, session.current) else {
            return;
        };

        let hovered = self.hovered_container(session, position);
        let target = match hovered {
            Some(hit) if hit != current => {
                if self.may_enter(session, origin, hit) {
                    Some(hit)
                } else {
                    // Refused entry: the origin still advertises that it
                    // would take the item back.
                    self.set_receiving(session, origin, true);
                    None
                }
            }
            Some(_) => None,
            None => {
                // Off every candidate: fall back home when the pointer is
                // over the origin's box.
                if current != origin
                    && session
                        .container_rects
                        .get(origin)
                        .is_some_and(|r| r.contains(position))
                {
                    Some(origin)
                } else {
                    None
                }
            }
        };

        if let Some(next) = target
            && next != current
        {
            self.enter_container(session, current, next, position);
        }
    }

    /// Topmost registered container actually under the pointer: its cached
    /// box contains the point and the element stack at that point resolves
    /// into it, so an unrelated overlay hides the containers it covers.
    fn hovered_container(&self, session: &Session, position: Point) -> Option<ContainerId> {
        let top = self.host.topmost_at(position)?;
        let mut best: Option<(ContainerId, ElementId)> = None;
        for (id, c) in self.live_containers() {
            if c.config.disabled {
                continue;
            }
            let inside = session
                .container_rects
                .get(id)
                .is_some_and(|r| r.contains(position));
            if !inside || !self.host.is_descendant(top, c.element) {
                continue;
            }
            // Nested containers: prefer the innermost one under the cursor.
            best = match best {
                Some((_, best_el)) if !self.host.is_descendant(c.element, best_el) => best,
                _ => Some((id, c.element)),
            };
        }
        best.map(|(id, _)| id)
    }

    /// Connection walk plus the target's enter predicate. Returning to the
    /// origin is always connected.
    fn may_enter(&self, session: &Session, origin: ContainerId, target: ContainerId) -> bool {
        if !self.graph.reachable(origin, target) {
            return false;
        }
        let Some(c) = self.container(target) else {
            return false;
        };
        c.config
            .enter_predicate
            .is_none_or(|allow| allow(session.item, target))
    }

    /// Moves the placeholder into `next` and re-targets the session there.
    fn enter_container(
        &mut self,
        session: &mut Session,
        current: ContainerId,
        next: ContainerId,
        position: Point,
    ) {
        let Some(c) = self.container(next) else {
            return;
        };
        let (next_el, reverse, sorting_disabled) =
            (c.element, c.config.reverse_order, c.config.sorting_disabled);

        self.events.push(DragDropEvent::Exited {
            item: session.item,
            container: current,
        });

        // The outgoing container reflows once the placeholder leaves it; the
        // sort shifts applied to its siblings are obsolete now, not at drop.
        for entry in session.sort.entries() {
            self.host.clear_translation(entry.element);
        }

        // Index implied by the pointer, or the member index when sorting is
        // off (so a round trip home restores the exact original slot).
        self.rebuild_sort_state(session, next, true);
        let index = if sorting_disabled {
            self.container(next)
                .and_then(|c| c.index_of(session.item))
                .unwrap_or_else(|| session.sort.entry_index(position, reverse))
        } else {
            session.sort.entry_index(position, reverse)
        };
        // The entering slot's rectangle is derived from the neighbors it
        // lands between: the host cannot be asked where the placeholder ended
        // up, since the reflow caused by the re-parent has not been measured.
        let el = session.placeholder.unwrap_or(session.source);
        let anchor = self
            .host
            .element_rect(next_el)
            .unwrap_or(session.initial_rect);
        let index =
            session
                .sort
                .insert_slot(index, session.item, el, session.initial_rect.size(), anchor);

        if let Some(placeholder) = session.placeholder {
            self.host.insert_child(next_el, index, placeholder);
        }
        session.current = Some(next);

        // Rect caches are invalidated, never patched, on a transfer.
        let measured: Vec<(ContainerId, Rect)> = self
            .live_containers()
            .filter_map(|(id, c)| self.host.element_rect(c.element).map(|r| (id, r)))
            .collect();
        session.container_rects.rebuild(measured);

        self.update_receiving(session);

        self.events.push(DragDropEvent::Entered {
            item: session.item,
            container: next,
            current_index: index,
        });
    }

    /// Runs the sort engine for the container the pointer is over.
    fn sort_in_current(&mut self, session: &mut Session, position: Point) {
        let Some(current) = session.current else {
            return;
        };
        let Some(c) = self.container(current) else {
            return;
        };
        if c.config.sorting_disabled || session.sort.len() < 2 {
            return;
        }
        let predicate = c.config.sort_predicate;
        let item = session.item;
        let commit = session.sort.sort(
            item,
            position,
            session.pointer_direction.delta(),
            |index| predicate.is_none_or(|allow| allow(index, item, current)),
        );
        let Some(commit) = commit else {
            return;
        };
        let orientation = session.sort.orientation();
        for (el, offset) in &commit.moves {
            self.host
                .set_translation(*el, orientation.vec(offset.round()));
        }
        // The ordering model follows the visual order while the item is a
        // member; a foreign container's model changes only on drop.
        if let Some(c) = self.container_mut(current)
            && c.index_of(item).is_some()
        {
            c.move_item(item, commit.current_index);
        }
        self.events.push(DragDropEvent::Sorted {
            item,
            container: current,
            previous_index: commit.previous_index,
            current_index: commit.current_index,
        });
    }

    fn update_scroll_target(&mut self, session: &mut Session, position: Point) {
        session.scroll_target = None;
        let Some(current) = session.current else {
            return;
        };
        let Some(c) = self.container(current) else {
            return;
        };
        if c.config.auto_scroll_disabled {
            return;
        }
        let over = self.host.topmost_at(position).unwrap_or(c.element);
        session.scroll_target =
            resolve_scroll_target(&self.host, over, position, c.config.auto_scroll_step);
    }

    /// Recomputes which containers advertise the receiving state: everything
    /// that could take the item, except the one it is currently over.
    fn update_receiving(&mut self, session: &mut Session) {
        let Some(origin) = session.origin else {
            return;
        };
        let current = session.current;
        let wanted: Vec<ContainerId> = self
            .live_containers()
            .filter(|(id, c)| {
                Some(*id) != current
                    && !c.config.disabled
                    && (*id == origin
                        || (self.graph.reachable(origin, *id)
                            && c.config
                                .enter_predicate
                                .is_none_or(|allow| allow(session.item, *id))))
            })
            .map(|(id, _)| id)
            .collect();
        let old = core::mem::take(&mut session.receiving);
        for id in &old {
            if !wanted.contains(id) {
                let el = self.container(*id).map(|c| c.element);
                if let Some(el) = el {
                    self.host.set_visual_flag(el, VisualState::RECEIVING, false);
                }
            }
        }
        for id in &wanted {
            if !old.contains(id) {
                let el = self.container(*id).map(|c| c.element);
                if let Some(el) = el {
                    self.host.set_visual_flag(el, VisualState::RECEIVING, true);
                }
            }
        }
        session.receiving = wanted;
    }

    fn set_receiving(&mut self, session: &mut Session, container: ContainerId, on: bool) {
        let Some(el) = self.container(container).map(|c| c.element) else {
            return;
        };
        self.host.set_visual_flag(el, VisualState::RECEIVING, on);
        if on {
            if !session.receiving.contains(&container) {
                session.receiving.push(container);
            }
        } else {
            session.receiving.retain(|c| *c != container);
        }
    }

    fn pointer_over_current(&self, session: &Session, position: Point) -> bool {
        session
            .current
            .and_then(|c| session.container_rects.get(c))
            .is_some_and(|r| r.contains(position))
    }

    /// A scroll of the viewport happened; fold it into the session.
    fn viewport_scrolled(&mut self, session: &mut Session) {
        let delta = session
            .scroll
            .viewport_scrolled(self.host.viewport_scroll());
        if delta == Vec2::ZERO {
            return;
        }
        // Client-space rectangles move opposite to the scroll.
        session.container_rects.shift_all(-delta);
        session.sort.shift_all(-delta);
    }

    /// A scroll of an element happened; fold it into the session.
    fn element_scrolled(&mut self, session: &mut Session, el: ElementId) {
        let new_offset = self.host.scroll_offset(el);
        if let Some(delta) = session.scroll.element_scrolled(el, new_offset) {
            if delta == Vec2::ZERO {
                return;
            }
            // Tracked scrollable (an ancestor of the source): the delta
            // feeds the pickup compensation; shift the caches it covers.
            let covered: Vec<ContainerId> = self
                .live_containers()
                .filter(|(_, c)| self.host.is_descendant(c.element, el))
                .map(|(id, _)| id)
                .collect();
            for id in covered {
                session.container_rects.shift(id, -delta);
            }
            if session
                .current
                .and_then(|c| self.container(c))
                .is_some_and(|c| self.host.is_descendant(c.element, el))
            {
                session.sort.shift_all(-delta);
            }
        } else {
            // Untracked scrollable: not part of the compensation set, so
            // just re-measure what it covers.
            let refreshed: Vec<(ContainerId, Rect)> = self
                .live_containers()
                .filter(|(_, c)| self.host.is_descendant(c.element, el))
                .filter_map(|(id, c)| self.host.element_rect(c.element).map(|r| (id, r)))
                .collect();
            for (id, rect) in refreshed {
                session.container_rects.put(id, rect);
            }
            let placeholder = session.placeholder;
            let dragged = session.item;
            session.sort.remeasure(|item| {
                let el = if item == dragged {
                    placeholder?
                } else {
                    self.items.get(item.to_raw() as usize)?.as_ref()?.element
                };
                self.host.element_rect(el)
            });
        }
    }

    /// Completes a contained drop: clears sibling transforms, commits the
    /// membership change, tears down the preview and placeholder, and emits
    /// `Ended` then `Dropped`.
    fn finalize_drop(&mut self, mut session: Session) {
        let (Some(origin), Some(dropped_in)) = (session.origin, session.current) else {
            self.teardown(&session);
            return;
        };
        let pending = session.pending_drop.take().unwrap_or(PendingDrop {
            pointer: session.last_pointer,
            distance: session.last_pointer - session.pickup,
            is_pointer_over_container: false,
        });

        let mut current = dropped_in;
        let mut is_over = pending.is_pointer_over_container;
        if current != origin {
            if !self.graph.reachable(origin, current) {
                // Connections were removed mid-drag; the destination no
                // longer qualifies.
                log::warn!(
                    "drop target {current:?} no longer reachable from {origin:?}; returning item home"
                );
                current = origin;
                is_over = false;
            } else if !is_over {
                // Released off the destination entirely: the transfer does
                // not commit. A drop inside the origin keeps its sorted
                // index instead.
                current = origin;
            }
        }

        let current_index = if current == dropped_in {
            session
                .sort
                .index_of(session.item)
                .unwrap_or(session.origin_index)
        } else {
            session.origin_index
        };

        if current != origin {
            if let Some(c) = self.container_mut(origin) {
                c.remove_item(session.item);
            }
            if let Some(c) = self.container_mut(current) {
                c.insert_item(current_index, session.item);
            }
            if let Some(item) = self.item_mut(session.item) {
                item.container = Some(current);
            }
        } else if let Some(c) = self.container_mut(origin) {
            // Settling back in the origin: the member list may have drifted
            // from the placeholder (round trip home, voided transfer).
            c.move_item(session.item, current_index);
        }

        self.teardown(&session);

        self.events.push(DragDropEvent::Ended {
            item: session.item,
            distance: pending.distance,
            drop_point: pending.pointer,
        });
        self.events.push(DragDropEvent::Dropped {
            item: session.item,
            container: current,
            previous_container: origin,
            previous_index: session.origin_index,
            current_index,
            is_pointer_over_container: is_over,
            distance: pending.distance,
            drop_point: pending.pointer,
        });
    }

    /// Removes every visual trace of the session: sibling transforms,
    /// preview, placeholder, state flags. Cancelling the scroll target here
    /// stops auto-scroll synchronously with the session.
    fn teardown(&mut self, session: &Session) {
        for entry in session.sort.entries() {
            self.host.clear_translation(entry.element);
        }
        if let Some(preview) = session.preview {
            self.host.remove_node(preview);
        }
        if let Some(placeholder) = session.placeholder {
            self.host.remove_node(placeholder);
        }
        self.host
            .set_visual_flag(session.source, VisualState::DRAGGING, false);
        if session.current.is_some() {
            self.host.clear_translation(session.source);
        }
        for id in &session.receiving {
            if let Some(el) = self.container(*id).map(|c| c.element) {
                self.host.set_visual_flag(el, VisualState::RECEIVING, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;

    fn item_rect(index: usize) -> Rect {
        let top = index as f64 * 50.0;
        Rect::new(0.0, top, 100.0, top + 50.0)
    }

    fn engine_with_list(count: usize) -> (DragDrop<HeadlessHost>, ContainerId, Vec<DragId>) {
        let mut host = HeadlessHost::new();
        let list_el = host.add_element(Rect::new(0.0, 0.0, 100.0, count as f64 * 50.0));
        let mut dd = DragDrop::new(host);
        let container = dd
            .register_container(list_el, ContainerConfig::default())
            .unwrap();
        let mut items = Vec::new();
        for i in 0..count {
            let el = dd.host_mut().add_child(list_el, item_rect(i));
            let item = dd.register_item(el, DragConfig::default()).unwrap();
            dd.attach(item, container).unwrap();
            items.push(item);
        }
        (dd, container, items)
    }

    fn press_and_arm(dd: &mut DragDrop<HeadlessHost>, item: DragId, at: Point) {
        let el = dd.element_of(item).unwrap();
        dd.pointer_down(
            item,
            el,
            PointerDevice::Mouse,
            PointerButton::Primary,
            at,
            0,
        );
        dd.pointer_move(at + Vec2::new(0.0, 6.0), 1);
    }

    #[test]
    fn register_item_rejects_unknown_element() {
        let dd = &mut DragDrop::new(HeadlessHost::new());
        let err = dd
            .register_item(ElementId::from_raw(99), DragConfig::default())
            .unwrap_err();
        assert_eq!(err, SetupError::NotAnElement(ElementId::from_raw(99)));
    }

    #[test]
    fn attach_moves_between_containers() {
        let mut host = HeadlessHost::new();
        let a_el = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let b_el = host.add_element(Rect::new(200.0, 0.0, 300.0, 100.0));
        let item_el = host.add_child(a_el, Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut dd = DragDrop::new(host);
        let a = dd.register_container(a_el, ContainerConfig::default()).unwrap();
        let b = dd.register_container(b_el, ContainerConfig::default()).unwrap();
        let item = dd.register_item(item_el, DragConfig::default()).unwrap();
        dd.attach(item, a).unwrap();
        assert_eq!(dd.items_in(a), &[item]);
        dd.attach(item, b).unwrap();
        assert!(dd.items_in(a).is_empty());
        assert_eq!(dd.items_in(b), &[item]);
    }

    #[test]
    fn secondary_button_does_not_start() {
        let (mut dd, _, items) = engine_with_list(2);
        let el = dd.element_of(items[0]).unwrap();
        dd.pointer_down(
            items[0],
            el,
            PointerDevice::Mouse,
            PointerButton::Secondary,
            Point::new(50.0, 25.0),
            0,
        );
        dd.pointer_move(Point::new(50.0, 80.0), 1);
        assert!(!dd.is_dragging());
        assert!(dd.drain_events().is_empty());
    }

    #[test]
    fn press_off_declared_handle_is_ignored() {
        let (mut dd, _, items) = engine_with_list(2);
        let root = dd.element_of(items[0]).unwrap();
        let handle = dd.host_mut().add_child(root, Rect::new(0.0, 0.0, 20.0, 20.0));
        dd.set_handles(items[0], &[handle]).unwrap();

        dd.pointer_down(
            items[0],
            root,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(50.0, 25.0),
            0,
        );
        dd.pointer_move(Point::new(50.0, 80.0), 1);
        assert!(!dd.is_dragging());

        dd.pointer_down(
            items[0],
            handle,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(10.0, 10.0),
            2,
        );
        dd.pointer_move(Point::new(10.0, 40.0), 3);
        assert!(dd.is_dragging());
    }

    #[test]
    fn second_press_during_session_is_ignored() {
        let (mut dd, _, items) = engine_with_list(2);
        press_and_arm(&mut dd, items[0], Point::new(50.0, 25.0));
        assert!(dd.is_dragging());

        let other = dd.element_of(items[1]).unwrap();
        dd.pointer_down(
            items[1],
            other,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(50.0, 75.0),
            5,
        );
        dd.pointer_move(Point::new(50.0, 120.0), 6);
        let flagged = items
            .iter()
            .filter(|i| {
                let el = dd.element_of(**i).unwrap();
                dd.host().visual_state(el).contains(VisualState::DRAGGING)
            })
            .count();
        assert_eq!(flagged, 1);
    }

    #[test]
    fn native_draggable_press_is_ignored() {
        let (mut dd, _, items) = engine_with_list(2);
        let el = dd.element_of(items[0]).unwrap();
        dd.host_mut().set_native_draggable(el, true);
        dd.pointer_down(
            items[0],
            el,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(50.0, 25.0),
            0,
        );
        dd.pointer_move(Point::new(50.0, 80.0), 1);
        assert!(!dd.is_dragging());
    }

    #[test]
    fn plain_click_emits_nothing() {
        let (mut dd, _, items) = engine_with_list(2);
        let el = dd.element_of(items[0]).unwrap();
        dd.pointer_down(
            items[0],
            el,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(50.0, 25.0),
            0,
        );
        dd.pointer_up(Point::new(50.0, 25.0), 10);
        assert!(dd.drain_events().is_empty());
        assert!(!dd.is_dragging());
    }

    #[test]
    fn interrupt_tears_down_and_keeps_order() {
        let (mut dd, container, items) = engine_with_list(3);
        press_and_arm(&mut dd, items[0], Point::new(50.0, 25.0));
        let source = dd.element_of(items[0]).unwrap();
        assert!(dd.host().visual_state(source).contains(VisualState::DRAGGING));

        dd.interrupt(20);
        assert!(!dd.is_dragging());
        assert!(!dd.host().visual_state(source).contains(VisualState::DRAGGING));
        assert_eq!(dd.items_in(container), items.as_slice());
        let events = dd.drain_events();
        assert!(matches!(events.last(), Some(DragDropEvent::Ended { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DragDropEvent::Dropped { .. })));
    }

    #[test]
    fn destroy_item_mid_drag_interrupts() {
        let (mut dd, container, items) = engine_with_list(3);
        press_and_arm(&mut dd, items[1], Point::new(50.0, 75.0));
        assert!(dd.is_dragging());

        dd.destroy_item(items[1], 30);
        assert!(!dd.is_dragging());
        assert_eq!(dd.items_in(container), &[items[0], items[2]]);
        assert!(dd.element_of(items[1]).is_none());
    }

    #[test]
    fn destroy_container_detaches_members() {
        let (mut dd, container, items) = engine_with_list(2);
        dd.destroy_container(container, 0);
        assert!(dd.items_in(container).is_empty());
        // The items survive and can be attached elsewhere.
        let other_el = dd.host_mut().add_element(Rect::new(200.0, 0.0, 300.0, 100.0));
        let other = dd
            .register_container(other_el, ContainerConfig::default())
            .unwrap();
        dd.attach(items[0], other).unwrap();
        assert_eq!(dd.items_in(other), &[items[0]]);
    }

    #[test]
    fn group_members_receive_each_other() {
        let mut host = HeadlessHost::new();
        let a_el = host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let b_el = host.add_element(Rect::new(200.0, 0.0, 300.0, 100.0));
        let item_el = host.add_child(a_el, Rect::new(0.0, 0.0, 100.0, 50.0));
        let mut dd = DragDrop::new(host);
        let a = dd.register_container(a_el, ContainerConfig::default()).unwrap();
        let b = dd.register_container(b_el, ContainerConfig::default()).unwrap();
        let group = dd.create_group();
        dd.join_group(a, group).unwrap();
        dd.join_group(b, group).unwrap();
        let item = dd.register_item(item_el, DragConfig::default()).unwrap();
        dd.attach(item, a).unwrap();

        press_and_arm(&mut dd, item, Point::new(50.0, 25.0));
        assert!(dd.host().visual_state(b_el).contains(VisualState::RECEIVING));
        assert!(!dd.host().visual_state(a_el).contains(VisualState::RECEIVING));
        dd.interrupt(10);
        assert!(!dd.host().visual_state(b_el).contains(VisualState::RECEIVING));
    }

    #[test]
    fn free_drag_keeps_translation_on_release() {
        let mut host = HeadlessHost::new();
        let el = host.add_element(Rect::new(0.0, 0.0, 50.0, 50.0));
        let mut dd = DragDrop::new(host);
        let item = dd.register_item(el, DragConfig::default()).unwrap();

        dd.pointer_down(
            item,
            el,
            PointerDevice::Mouse,
            PointerButton::Primary,
            Point::new(25.0, 25.0),
            0,
        );
        dd.pointer_move(Point::new(45.0, 55.0), 1);
        assert!(dd.is_dragging());
        dd.pointer_up(Point::new(45.0, 55.0), 2);
        assert!(!dd.is_dragging());
        assert_eq!(dd.host().translation(el), Some(Vec2::new(20.0, 30.0)));
        let events = dd.drain_events();
        assert!(matches!(events.last(), Some(DragDropEvent::Ended { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, DragDropEvent::Dropped { .. })));
    }
}
