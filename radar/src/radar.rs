use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::boundary::{Boundary, Side};
use crate::host::{Dom, insert_range_before};
use crate::math::{self, round_to};
use crate::policy::buffer_items;
use crate::pool::SlotPool;
use crate::scheduler::{JobId, Phase, Scheduler, Token};
use crate::{
    Action, EdgeLatch, EstimateSize, Geometry, IndexPolicy, ItemSource, Lifecycle, Measurements,
    RadarError, RadarOptions, Slot, SlotId, StaticPolicy, Window,
};

type SendAction = Rc<dyn Fn(Action)>;

/// The windowing and recycling engine.
///
/// `Radar` is a cheap-clone handle: clones share one engine. Scheduled jobs and DOM listeners
/// only hold weak references, so dropping every handle (or calling [`Radar::destroy`]) stops all
/// further work.
///
/// Lifecycle:
/// 1. construct (lays out `initial_render_count` slots logically);
/// 2. insert the two boundary markers into the item container ([`Radar::attach`] does it);
/// 3. [`Radar::start`]: discovers containers, measures, renders and subscribes;
/// 4. drive frames through the [`Scheduler`];
/// 5. [`Radar::destroy`].
///
/// Callbacks registered with [`Radar::set_send_action`] run with no internal borrow held, so they
/// may call back into the radar.
pub struct Radar<S, D, P = StaticPolicy>
where
    S: ItemSource,
    D: Dom,
    P: IndexPolicy,
{
    inner: Rc<RefCell<RadarState<S, D, P>>>,
}

impl<S, D, P> Clone for Radar<S, D, P>
where
    S: ItemSource,
    D: Dom,
    P: IndexPolicy,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct RadarState<S, D, P>
where
    S: ItemSource,
    D: Dom,
{
    self_ref: Weak<RefCell<RadarState<S, D, P>>>,
    token: Token,
    scheduler: Rc<dyn Scheduler>,
    dom: D,
    policy: P,
    items: S,
    options: RadarOptions,
    send_action: SendAction,

    item_container: Option<D::Node>,
    scroll_container: Option<D::Node>,
    geometry: Geometry,
    prepend_offset: f64,

    next_update: Option<JobId>,
    next_layout: Option<JobId>,
    lifecycle: Lifecycle,
    did_reset: bool,

    scroll_position: f64,
    window: Window,
    prev_window: Option<Window>,
    prev_first_visible: usize,
    prev_last_visible: usize,
    first_reached: EdgeLatch,
    last_reached: EdgeLatch,

    pool: SlotPool<S::Item, D::Node>,
    prepend_queue: VecDeque<SlotId>,
    before: Boundary<D::Node>,
    after: Boundary<D::Node>,
    dom_pool: D::Node,
    listeners: Vec<D::Listener>,
}

impl<S, D> Radar<S, D, StaticPolicy>
where
    S: ItemSource + 'static,
    D: Dom + 'static,
{
    /// A fixed-size radar.
    pub fn new(items: S, dom: D, scheduler: Rc<dyn Scheduler>, options: RadarOptions) -> Self {
        Self::with_policy(items, dom, scheduler, options, StaticPolicy::new())
    }
}

impl<S, D, P> Radar<S, D, P>
where
    S: ItemSource + 'static,
    D: Dom + 'static,
    P: IndexPolicy + 'static,
{
    pub fn with_policy(
        items: S,
        dom: D,
        scheduler: Rc<dyn Scheduler>,
        options: RadarOptions,
        policy: P,
    ) -> Self {
        Self::build(Token::new(), items, dom, scheduler, options, policy)
    }

    /// Like [`Radar::with_policy`], with jobs cancelled when `parent` is.
    pub fn with_parent_token(
        parent: &Token,
        items: S,
        dom: D,
        scheduler: Rc<dyn Scheduler>,
        options: RadarOptions,
        policy: P,
    ) -> Self {
        Self::build(parent.child(), items, dom, scheduler, options, policy)
    }

    fn build(
        token: Token,
        items: S,
        dom: D,
        scheduler: Rc<dyn Scheduler>,
        options: RadarOptions,
        policy: P,
    ) -> Self {
        rdebug!(
            total_items = items.len(),
            buffer_size = options.buffer_size,
            render_all = options.render_all,
            should_recycle = options.should_recycle,
            starting_index = options.starting_index,
            "Radar::new"
        );

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<RadarState<S, D, P>>>| {
            let before = Boundary::new(dom.create_marker(), Side::Before);
            let after = Boundary::new(dom.create_marker(), Side::After);
            let dom_pool = dom.create_fragment();

            let mut listeners = Vec::new();
            for (marker, side) in [(before.node(), Side::Before), (after.node(), Side::After)] {
                let weak = weak.clone();
                let on_click: Rc<dyn Fn()> = Rc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        let radar = Radar { inner };
                        match side {
                            Side::Before => radar.page_left(),
                            Side::After => radar.page_right(),
                        }
                    }
                });
                listeners.push(dom.subscribe_click(marker, on_click));
            }

            let mut state = RadarState {
                self_ref: weak.clone(),
                token,
                scheduler,
                dom,
                policy,
                items,
                options,
                send_action: Rc::new(|_: Action| {}),
                item_container: None,
                scroll_container: None,
                geometry: Geometry::default(),
                prepend_offset: 0.0,
                next_update: None,
                next_layout: None,
                lifecycle: Lifecycle::NotStarted,
                did_reset: true,
                scroll_position: 0.0,
                window: Window::empty(),
                prev_window: None,
                prev_first_visible: 0,
                prev_last_visible: 0,
                first_reached: EdgeLatch::Unreached,
                last_reached: EdgeLatch::Unreached,
                pool: SlotPool::new(),
                prepend_queue: VecDeque::new(),
                before,
                after,
                dom_pool,
                listeners,
            };
            state.reconcile();
            RefCell::new(state)
        });

        Self { inner }
    }

    /// Appends both boundary markers to `item_container`. Call before [`Radar::start`].
    pub fn attach(&self, item_container: &D::Node) {
        let s = self.inner.borrow();
        s.dom.insert_before(item_container, s.before.node(), None);
        s.dom.insert_before(item_container, s.after.node(), None);
    }

    /// Discovers the containers from the attached markers, sets the initial scroll position,
    /// runs one synchronous update and subscribes to scroll and resize events.
    ///
    /// Calling `start` on a started radar does nothing.
    pub fn start(&self) -> Result<(), RadarError> {
        let mut s = self.inner.borrow_mut();
        match s.lifecycle {
            Lifecycle::Destroyed => return Err(RadarError::Destroyed),
            Lifecycle::Started => return Ok(()),
            Lifecycle::NotStarted => {}
        }
        if s.options.estimate_size.is_none() {
            return Err(RadarError::MissingEstimateSize);
        }

        let item_container = s
            .dom
            .parent(s.before.node())
            .ok_or(RadarError::ContainerNotAttached)?;
        let scroll_container = match s.options.container_selector.as_deref() {
            Some("body") => s.dom.document_scroller(),
            Some(selector) => s.dom.closest(&item_container, selector).ok_or_else(|| {
                RadarError::ScrollContainerNotFound {
                    selector: String::from(selector),
                }
            })?,
            None => s
                .dom
                .parent(&item_container)
                .ok_or(RadarError::ContainerNotAttached)?,
        };
        s.item_container = Some(item_container);
        s.scroll_container = Some(scroll_container.clone());

        if let Err(err) = s.update_constants() {
            s.item_container = None;
            s.scroll_container = None;
            return Err(err);
        }

        let starting_index = s.options.starting_index;
        if starting_index != 0 {
            let Geometry {
                estimate_size,
                container_size,
                collection_offset,
                ..
            } = s.geometry;
            let mut position = starting_index as f64 * estimate_size;
            if s.options.render_from_last {
                position -= container_size - estimate_size;
            }
            // Applied to the scroll container by the first `after_update`.
            s.scroll_position = position + collection_offset;
        }

        s.lifecycle = Lifecycle::Started;
        rdebug!(
            estimate_size = s.geometry.estimate_size,
            container_size = s.geometry.container_size,
            collection_offset = s.geometry.collection_offset,
            scroll_position = s.scroll_position,
            "Radar::start"
        );
        s.mount_initial_slots();
        s.update()?;

        let axis = s.options.axis;
        let weak = s.self_ref.clone();
        let on_scroll: Rc<dyn Fn(f64)> = Rc::new(move |offset| {
            if let Some(inner) = weak.upgrade() {
                Radar { inner }.on_scroll(offset);
            }
        });
        let weak = s.self_ref.clone();
        let on_resize: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                Radar { inner }.schedule_update();
            }
        });
        let scroll_listener = s.dom.subscribe_scroll(&scroll_container, axis, on_scroll);
        let resize_listener = s.dom.subscribe_resize(on_resize);
        s.listeners.push(scroll_listener);
        s.listeners.push(resize_listener);
        Ok(())
    }

    /// Cancels pending jobs, tears down every slot and removes all listeners.
    pub fn destroy(&self) {
        let mut s = self.inner.borrow_mut();
        if s.lifecycle == Lifecycle::Destroyed {
            return;
        }
        rdebug!(live_slots = s.pool.live(), "Radar::destroy");
        s.token.cancel();

        let ids: Vec<SlotId> = s.pool.ordered.iter().chain(s.pool.free.iter()).copied().collect();
        for id in ids {
            if let Some(bounds) = s.pool.slot(id).bounds() {
                s.dom.unmount(bounds);
            }
        }
        s.pool.clear();
        s.prepend_queue.clear();

        let listeners: Vec<D::Listener> = s.listeners.drain(..).collect();
        for listener in listeners {
            s.dom.unsubscribe(listener);
        }
        s.next_update = None;
        s.next_layout = None;
        s.lifecycle = Lifecycle::Destroyed;
    }

    /// Requests an update in the next frame's sync phase.
    ///
    /// No-op before `start`, after `destroy`, or while an update is already pending.
    pub fn schedule_update(&self) {
        let mut s = self.inner.borrow_mut();
        if s.next_update.is_some() || s.lifecycle != Lifecycle::Started {
            return;
        }
        let weak = s.self_ref.clone();
        let job = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Radar { inner }.run_scheduled_update();
            }
        });
        let id = s.scheduler.schedule(Phase::Sync, job, &s.token);
        s.next_update = Some(id);
    }

    /// Measures, recomputes the window and reconciles slots now. The post-update measurement
    /// is scheduled into the measure phase.
    pub fn update(&self) -> Result<(), RadarError> {
        self.inner.borrow_mut().update()
    }

    /// Scroll event entry point. Updates are only scheduled for moves past the policy's
    /// earthquake threshold.
    pub fn on_scroll(&self, offset: f64) {
        let quake = {
            let s = self.inner.borrow();
            s.lifecycle == Lifecycle::Started
                && s.policy.did_earthquake(
                    math::abs(s.scroll_position - offset),
                    s.geometry.estimate_size,
                )
        };
        if quake {
            self.schedule_update();
        }
    }

    /// Replaces the item source. Follow with [`Radar::prepend`], [`Radar::append`] or
    /// [`Radar::reset`] to describe the change.
    pub fn set_items(&self, items: S) {
        self.inner.borrow_mut().items = items;
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().items)
    }

    /// `count` items were inserted before index 0.
    ///
    /// Live slots keep their items and shift their indexes. The scroll compensation is applied
    /// by the next measure phase.
    pub fn prepend(&self, count: usize) {
        {
            let mut s = self.inner.borrow_mut();
            if s.lifecycle == Lifecycle::Destroyed {
                return;
            }
            let ids: Vec<SlotId> = s.pool.ordered.iter().copied().collect();
            for id in ids {
                s.pool.slot_mut(id).shift(count);
            }
            let estimate = s.geometry.estimate_size;
            let offset = s.policy.prepended(count, estimate);
            s.prepend_offset += offset;
            if !s.window.is_empty() {
                s.window = s.window.shifted(count, offset);
            }
            s.prev_window = s.prev_window.map(|w| w.shifted(count, offset));
            s.first_reached = EdgeLatch::Unreached;
            rdebug!(count, offset, prepend_offset = s.prepend_offset, "Radar::prepend");
        }
        self.schedule_update();
    }

    /// Items were added after the last index.
    pub fn append(&self) {
        {
            let mut s = self.inner.borrow_mut();
            s.last_reached = EdgeLatch::Unreached;
            rtrace!(total_items = s.items.len(), "Radar::append");
        }
        self.schedule_update();
    }

    /// Re-reads the item of every live slot from the current source. Slots, DOM and edge
    /// latches are left as they are; use it when items were edited in place.
    pub fn refresh(&self) {
        let mut s = self.inner.borrow_mut();
        s.refresh_items();
        rtrace!(live = s.pool.ordered.len(), "Radar::refresh");
    }

    /// The whole collection was replaced.
    pub fn reset(&self) {
        {
            let mut s = self.inner.borrow_mut();
            s.first_reached = EdgeLatch::Unreached;
            s.last_reached = EdgeLatch::Unreached;
            s.did_reset = true;
            s.policy.reset();
            rdebug!(total_items = s.items.len(), "Radar::reset");
        }
        self.schedule_update();
    }

    /// Scrolls back by about one window.
    pub fn page_left(&self) {
        {
            let mut s = self.inner.borrow_mut();
            if s.options.render_all || s.lifecycle != Lifecycle::Started {
                return;
            }
            if s.window.is_empty() || s.window.start_index == 0 {
                return;
            }
            let buffer = buffer_items(s.options.buffer_size) as i64;
            let first = s.window.start_index as i64;
            let target = (first - s.total_components() as i64 + buffer).max(0);
            rdebug!(from = first, to = target, "Radar::page_left");
            s.scroll_to_index(target as usize);
        }
        self.schedule_update();
    }

    /// Scrolls forward by about one window.
    pub fn page_right(&self) {
        {
            let mut s = self.inner.borrow_mut();
            if s.options.render_all || s.lifecycle != Lifecycle::Started {
                return;
            }
            let total = s.items.len();
            let Some(last) = s.window.last_index() else {
                return;
            };
            if last + 1 == total {
                return;
            }
            let buffer = buffer_items(s.options.buffer_size);
            let target = (last + buffer + 1).min(total - s.total_components());
            rdebug!(from = s.window.start_index, to = target, "Radar::page_right");
            s.scroll_to_index(target);
        }
        self.schedule_update();
    }

    /// Sets the notification callback. The default discards every action.
    pub fn set_send_action(&self, send_action: impl Fn(Action) + 'static) {
        self.inner.borrow_mut().send_action = Rc::new(send_action);
    }

    pub fn first_item_index(&self) -> usize {
        self.inner.borrow().window.start_index
    }

    /// `None` when the window is empty.
    pub fn last_item_index(&self) -> Option<usize> {
        self.inner.borrow().window.last_index()
    }

    pub fn window(&self) -> Window {
        self.inner.borrow().window
    }

    /// The window as of the last completed measure phase.
    pub fn previous_window(&self) -> Option<Window> {
        self.inner.borrow().prev_window
    }

    pub fn total_items(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn total_components(&self) -> usize {
        self.inner.borrow().total_components()
    }

    /// `None` while there are no items.
    pub fn first_visible_index(&self) -> Option<usize> {
        self.inner.borrow().visible_range().map(|(first, _)| first)
    }

    /// `None` while there are no items.
    pub fn last_visible_index(&self) -> Option<usize> {
        self.inner.borrow().visible_range().map(|(_, last)| last)
    }

    pub fn visible_left(&self) -> f64 {
        self.inner.borrow().visible_start()
    }

    pub fn visible_middle(&self) -> f64 {
        self.inner.borrow().visible_middle()
    }

    pub fn visible_right(&self) -> f64 {
        self.inner.borrow().visible_end()
    }

    pub fn visible_top(&self) -> f64 {
        self.visible_left()
    }

    pub fn visible_bottom(&self) -> f64 {
        self.visible_right()
    }

    pub fn total_before(&self) -> f64 {
        self.inner.borrow().window.total_before
    }

    pub fn total_after(&self) -> f64 {
        self.inner.borrow().window.total_after
    }

    /// The cached, canonical scroll offset of the scroll container.
    pub fn scroll_position(&self) -> f64 {
        self.inner.borrow().scroll_position
    }

    /// Scroll compensation waiting for the next measure phase.
    pub fn prepend_offset(&self) -> f64 {
        self.inner.borrow().prepend_offset
    }

    pub fn geometry(&self) -> Geometry {
        self.inner.borrow().geometry
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.borrow().lifecycle
    }

    pub fn first_reached(&self) -> EdgeLatch {
        self.inner.borrow().first_reached
    }

    pub fn last_reached(&self) -> EdgeLatch {
        self.inner.borrow().last_reached
    }

    pub fn options(&self) -> RadarOptions {
        self.inner.borrow().options.clone()
    }

    pub fn item_container(&self) -> Option<D::Node> {
        self.inner.borrow().item_container.clone()
    }

    pub fn scroll_container(&self) -> Option<D::Node> {
        self.inner.borrow().scroll_container.clone()
    }

    pub fn boundary(&self, side: Side) -> Boundary<D::Node> {
        let s = self.inner.borrow();
        match side {
            Side::Before => s.before.clone(),
            Side::After => s.after.clone(),
        }
    }

    /// Live slots, in window order.
    pub fn slots(&self) -> Vec<Slot<S::Item, D::Node>> {
        let s = self.inner.borrow();
        s.pool.ordered.iter().map(|&id| s.pool.slot(id).clone()).collect()
    }

    /// Visits live slots in window order. `f` must not call back into the radar.
    pub fn for_each_slot(&self, mut f: impl FnMut(SlotId, &Slot<S::Item, D::Node>)) {
        let s = self.inner.borrow();
        for &id in &s.pool.ordered {
            f(id, s.pool.slot(id));
        }
    }

    /// Slots parked in the free-list.
    pub fn pool_len(&self) -> usize {
        self.inner.borrow().pool.free.len()
    }

    /// Slots alive in the window or the free-list.
    pub fn live_slots(&self) -> usize {
        self.inner.borrow().pool.live()
    }

    /// Total slot allocations so far.
    pub fn created_slots(&self) -> usize {
        self.inner.borrow().pool.created()
    }

    pub fn with_policy_ref<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.borrow().policy)
    }

    /// Mutable access to the index policy (e.g. to feed measurements). Call
    /// [`Radar::schedule_update`] afterwards if the window may have moved.
    pub fn with_policy_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.borrow_mut().policy)
    }

    fn run_scheduled_update(&self) {
        let result = {
            let mut s = self.inner.borrow_mut();
            s.next_update = None;
            s.sync_scroll_position();
            s.update()
        };
        if let Err(err) = result {
            rwarn!(%err, "scheduled update failed");
            debug_assert!(false, "scheduled update failed: {err}");
        }
    }

    fn run_after_update(&self) {
        let (actions, send_action) = {
            let mut s = self.inner.borrow_mut();
            (s.after_update(), Rc::clone(&s.send_action))
        };
        for action in actions {
            rtrace!(action = action.name(), index = action.index(), "send_action");
            send_action(action);
        }
    }

    fn run_layout(&self) {
        self.inner.borrow_mut().flush_prepend_queue();
    }
}

impl<S, D, P> RadarState<S, D, P>
where
    S: ItemSource + 'static,
    D: Dom + 'static,
    P: IndexPolicy + 'static,
{
    fn sync_scroll_position(&mut self) {
        if let Some(scroller) = &self.scroll_container {
            self.scroll_position = self.dom.scroll_offset(scroller, self.options.axis);
        }
    }

    fn update(&mut self) -> Result<(), RadarError> {
        if self.lifecycle == Lifecycle::Destroyed {
            return Err(RadarError::Destroyed);
        }
        self.update_constants()?;
        let m = self.measurements();
        self.window = self.policy.compute_window(&m);
        rtrace!(
            start_index = self.window.start_index,
            end_index = self.window.end_index,
            total_before = self.window.total_before,
            total_after = self.window.total_after,
            "update"
        );
        self.reconcile();

        let weak = self.self_ref.clone();
        let job = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Radar { inner }.run_after_update();
            }
        });
        self.scheduler.schedule(Phase::Measure, job, &self.token);
        Ok(())
    }

    fn update_constants(&mut self) -> Result<(), RadarError> {
        let estimate = self
            .options
            .estimate_size
            .as_ref()
            .ok_or(RadarError::MissingEstimateSize)?;
        let (Some(item_container), Some(scroller)) = (&self.item_container, &self.scroll_container)
        else {
            return Err(RadarError::ContainerNotAttached);
        };
        let axis = self.options.axis;
        let dom = &self.dom;

        let offset_size = dom.layout_size(scroller, axis);
        let scroller_rect = dom.client_rect(scroller);
        let rendered_size = scroller_rect.extent(axis);
        let transform_scale = if offset_size == rendered_size || rendered_size == 0.0 {
            1.0
        } else {
            offset_size / rendered_size
        };

        let content_start = dom
            .client_rect(self.before.node())
            .scaled(transform_scale)
            .start(axis);
        let container_start = scroller_rect.scaled(transform_scale).start(axis);

        let max_size = match dom.max_size_style(scroller, axis) {
            Some(style) if style != "none" => dom
                .parent(scroller)
                .map_or(0.0, |parent| dom.estimate_length(&parent, &style, axis)),
            _ => 0.0,
        };

        let estimate_size = match estimate {
            EstimateSize::Pixels(px) => *px,
            EstimateSize::Css(css) => dom.estimate_length(item_container, css, axis),
        };
        if !(estimate_size > 0.0) {
            return Err(RadarError::NonPositiveEstimate {
                estimate: estimate_size,
            });
        }

        let container_size = if offset_size > max_size {
            offset_size
        } else {
            max_size
        };
        self.geometry = Geometry {
            estimate_size,
            container_size: round_to(container_size),
            collection_offset: round_to(
                dom.scroll_offset(scroller, axis) + content_start - container_start,
            ),
            transform_scale,
        };
        Ok(())
    }

    fn visible_start(&self) -> f64 {
        let left = self.scroll_position - self.geometry.collection_offset + self.prepend_offset;
        if left > 0.0 { left } else { 0.0 }
    }

    fn visible_middle(&self) -> f64 {
        self.visible_start() + self.geometry.container_size / 2.0
    }

    fn visible_end(&self) -> f64 {
        let end = self.visible_start() + self.geometry.container_size - 1.0;
        if end > 0.0 { end } else { 0.0 }
    }

    fn measurements(&self) -> Measurements {
        Measurements {
            total_items: self.items.len(),
            estimate_size: self.geometry.estimate_size,
            buffer_size: self.options.buffer_size,
            viewport_size: self.geometry.container_size,
            visible_start: self.visible_start(),
            visible_middle: self.visible_middle(),
            visible_end: self.visible_end(),
        }
    }

    fn visible_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() || self.geometry.estimate_size <= 0.0 {
            return None;
        }
        Some(self.policy.visible_range(&self.measurements()))
    }

    fn total_components(&self) -> usize {
        self.window.len().min(self.items.len())
    }

    fn scroll_to_index(&mut self, index: usize) {
        let Some(scroller) = &self.scroll_container else {
            return;
        };
        let offset = self
            .policy
            .offset_for_index(index, self.geometry.estimate_size);
        self.dom.set_scroll_offset(
            scroller,
            self.options.axis,
            offset + self.geometry.collection_offset,
        );
    }

    /// The desired closed range `[first, last]` (`last < first` when empty) and marker sizes.
    fn desired_range(&self) -> (i64, i64, f64, f64) {
        let total = self.items.len() as i64;
        let (first, last, before, after) = if self.options.render_all {
            (0, total - 1, 0.0, 0.0)
        } else if self.lifecycle != Lifecycle::Started {
            let first = self.options.starting_index as i64;
            (first, first + self.options.initial_render_count as i64 - 1, 0.0, 0.0)
        } else {
            let w = self.window;
            (
                w.start_index as i64,
                w.end_index as i64 - 1,
                w.total_before,
                w.total_after,
            )
        };
        (first, last.min(total - 1), before, after)
    }

    /// Brings the ordered window in line with the desired range, reusing slots and moving their
    /// DOM as little as possible.
    fn reconcile(&mut self) {
        let (first, last, total_before, total_after) = self.desired_range();
        let recycle = self.options.should_recycle;

        while let Some(&id) = self.pool.ordered.front() {
            if (self.pool.slot(id).index() as i64) >= first {
                break;
            }
            self.pool.ordered.pop_front();
            self.pool.free.push_back(id);
        }
        while let Some(&id) = self.pool.ordered.back() {
            if (self.pool.slot(id).index() as i64) <= last {
                break;
            }
            self.pool.ordered.pop_back();
            self.pool.free.push_front(id);
        }

        if self.did_reset {
            if recycle {
                // Same indexes, possibly different items.
                self.refresh_items();
            } else {
                while let Some(id) = self.pool.ordered.pop_front() {
                    self.pool.free.push_back(id);
                }
            }
        }

        let mut first_in_list = self.pool.first_index().map_or(first, |i| i as i64);
        let mut last_in_list = self.pool.last_index().map_or(first - 1, |i| i as i64);

        while last_in_list < last {
            let id = self.pool.take_or_create(recycle);
            last_in_list += 1;
            let index = last_in_list as usize;
            let item = self.items.get(index);
            self.pool.slot_mut(id).recycle(item, index);
            self.append_slot(id);
            self.pool.ordered.push_back(id);
        }

        while first_in_list > first {
            let id = self.pool.take_or_create(recycle);
            first_in_list -= 1;
            let index = first_in_list as usize;
            let item = self.items.get(index);
            self.pool.slot_mut(id).recycle(item, index);
            self.prepend_slot(id);
            self.pool.ordered.push_front(id);
        }

        if !self.pool.free.is_empty() {
            if recycle {
                // Park the DOM off-document until the slot is reused.
                for &id in &self.pool.free {
                    if let Some(bounds) = self.pool.slot(id).bounds() {
                        insert_range_before(
                            &self.dom,
                            &self.dom_pool,
                            None,
                            &bounds.first,
                            &bounds.last,
                        );
                    }
                }
            } else {
                while let Some(id) = self.pool.free.pop_front() {
                    if let Some(bounds) = self.pool.slot(id).bounds() {
                        self.dom.unmount(bounds);
                    }
                    self.pool.destroy(id);
                }
            }
        }

        let total = self.items.len() as i64;
        let hidden_before = first.clamp(0, total) as usize;
        let hidden_after = (total - last - 1).max(0) as usize;
        let axis = self.options.axis;
        self.before
            .update(&self.dom, axis, total_before, hidden_before);
        self.after.update(&self.dom, axis, total_after, hidden_after);
    }

    fn append_slot(&mut self, id: SlotId) {
        let Some(container) = &self.item_container else {
            return;
        };
        let reference = Some(self.after.node());
        let slot = self.pool.slot(id);
        match slot.bounds() {
            Some(bounds) if slot.is_rendered() => {
                insert_range_before(&self.dom, container, reference, &bounds.first, &bounds.last);
            }
            _ => {
                let bounds = self.dom.mount_slot(container, reference, id);
                self.pool.slot_mut(id).mark_rendered(bounds);
            }
        }
    }

    fn prepend_slot(&mut self, id: SlotId) {
        let Some(container) = self.item_container.clone() else {
            return;
        };
        let slot = self.pool.slot(id);
        if let (true, Some(bounds)) = (slot.is_rendered(), slot.bounds()) {
            let reference = self.dom.next_sibling(self.before.node());
            insert_range_before(
                &self.dom,
                &container,
                reference.as_ref(),
                &bounds.first,
                &bounds.last,
            );
            return;
        }

        // Fresh slots render where the host renders new content; they are moved into place in
        // the layout phase.
        let bounds = self
            .dom
            .mount_slot(&container, Some(self.after.node()), id);
        self.pool.slot_mut(id).mark_rendered(bounds);
        self.prepend_queue.push_front(id);

        if self.next_layout.is_none() {
            let weak = self.self_ref.clone();
            let job = Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Radar { inner }.run_layout();
                }
            });
            self.next_layout = Some(self.scheduler.schedule(Phase::Layout, job, &self.token));
        }
    }

    /// Moves queued head slots into place, highest index first, each right before its
    /// successor in the window. Later reconciles may already have placed other head slots.
    fn flush_prepend_queue(&mut self) {
        self.next_layout = None;
        let Some(container) = self.item_container.clone() else {
            self.prepend_queue.clear();
            return;
        };
        let mut queued: Vec<SlotId> = self
            .prepend_queue
            .drain(..)
            .filter(|&id| self.pool.ordered_position(id).is_some())
            .collect();
        queued.sort_by_key(|&id| core::cmp::Reverse(self.pool.slot(id).index()));
        queued.dedup();

        for id in queued {
            let (Some(pos), Some(bounds)) = (
                self.pool.ordered_position(id),
                self.pool.slot(id).bounds().cloned(),
            ) else {
                continue;
            };
            let reference = self
                .pool
                .ordered
                .get(pos + 1)
                .and_then(|&next| self.pool.slot(next).bounds())
                .map_or_else(|| self.after.node().clone(), |b| b.first.clone());
            insert_range_before(
                &self.dom,
                &container,
                Some(&reference),
                &bounds.first,
                &bounds.last,
            );
        }
    }

    fn refresh_items(&mut self) {
        let ids: Vec<SlotId> = self.pool.ordered.iter().copied().collect();
        for id in ids {
            let index = self.pool.slot(id).index();
            let item = self.items.get(index);
            self.pool.slot_mut(id).recycle(item, index);
        }
    }

    /// Slots laid out before `start` have no DOM yet.
    fn mount_initial_slots(&mut self) {
        let ids: Vec<SlotId> = self.pool.ordered.iter().copied().collect();
        for id in ids {
            if !self.pool.slot(id).is_rendered() {
                self.append_slot(id);
            }
        }
    }

    /// Reconciles the scroll offset, emits notifications and snapshots state for the next cycle.
    fn after_update(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(scroller) = self.scroll_container.clone() else {
            return actions;
        };
        let axis = self.options.axis;

        let actual = self.dom.scroll_offset(&scroller, axis);
        let diff = self.prepend_offset + self.scroll_position - actual;
        if diff != 0.0 {
            self.dom.set_scroll_offset(&scroller, axis, actual + diff);
        }
        // The host may have adjusted the offset again.
        self.scroll_position = self.dom.scroll_offset(&scroller, axis);
        self.prepend_offset = 0.0;

        let visible = self.visible_range();
        if let Some((first_visible, last_visible)) = visible {
            self.collect_actions(first_visible, last_visible, &mut actions);
        }

        self.prev_window = Some(self.window);
        if let Some((first_visible, last_visible)) = visible {
            self.prev_first_visible = first_visible;
            self.prev_last_visible = last_visible;
        }
        self.did_reset = false;
        actions
    }

    fn collect_actions(&mut self, first_visible: usize, last_visible: usize, out: &mut Vec<Action>) {
        if self.did_reset || first_visible != self.prev_first_visible {
            out.push(Action::FirstVisibleChanged(first_visible));
        }
        if self.did_reset || last_visible != self.prev_last_visible {
            out.push(Action::LastVisibleChanged(last_visible));
        }

        let Some(last_item) = self.window.last_index() else {
            return;
        };
        if !self.first_reached.is_reached() && self.window.start_index == 0 {
            out.push(Action::FirstReached(0));
            self.first_reached = EdgeLatch::Reached;
        }
        if !self.last_reached.is_reached() && last_item + 1 == self.items.len() {
            out.push(Action::LastReached(last_item));
            self.last_reached = EdgeLatch::Reached;
        }
    }
}

impl<S, D, P> fmt::Debug for Radar<S, D, P>
where
    S: ItemSource,
    D: Dom,
    P: IndexPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(s) = self.inner.try_borrow() else {
            return f.write_str("Radar { <borrowed> }");
        };
        f.debug_struct("Radar")
            .field("lifecycle", &s.lifecycle)
            .field("total_items", &s.items.len())
            .field("window", &s.window)
            .field("geometry", &s.geometry)
            .field("scroll_position", &s.scroll_position)
            .field("prepend_offset", &s.prepend_offset)
            .field("first_reached", &s.first_reached)
            .field("last_reached", &s.last_reached)
            .field("live_slots", &s.pool.live())
            .finish_non_exhaustive()
    }
}
