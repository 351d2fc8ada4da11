use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use virtual_radar::{
    Dom, FrameScheduler, IndexPolicy, MemoryDom, Radar, RadarError, RadarOptions, StaticPolicy,
};

use crate::{Change, Easing, ScrollTween, classify_change};

/// A host whose events are queued and delivered on demand.
pub trait EventPump {
    /// Delivers every queued event. Returns how many were delivered.
    fn pump_events(&self) -> usize;
}

impl EventPump for MemoryDom {
    fn pump_events(&self) -> usize {
        self.dispatch_events()
    }
}

/// Drives a [`Radar`] from a frame loop.
///
/// The controller owns the item list, the host and a [`FrameScheduler`]. A host loop calls
/// [`Controller::tick`] once per frame; data changes go through [`Controller::set_items`], which
/// works out whether the new list is a prepend, an append or a reset.
pub struct Controller<T, D = MemoryDom, P = StaticPolicy>
where
    T: Clone + 'static,
    D: Dom + EventPump + Clone + 'static,
    P: IndexPolicy + 'static,
{
    radar: Radar<Rc<[T]>, D, P>,
    dom: D,
    scheduler: FrameScheduler,
    items: Rc<[T]>,
    tween: Option<ScrollTween>,
}

impl<T, D> Controller<T, D, StaticPolicy>
where
    T: Clone + 'static,
    D: Dom + EventPump + Clone + 'static,
{
    pub fn new(items: Vec<T>, dom: D, options: RadarOptions) -> Self {
        Self::with_policy(items, dom, options, StaticPolicy::new())
    }
}

impl<T, D, P> Controller<T, D, P>
where
    T: Clone + 'static,
    D: Dom + EventPump + Clone + 'static,
    P: IndexPolicy + 'static,
{
    pub fn with_policy(items: Vec<T>, dom: D, options: RadarOptions, policy: P) -> Self {
        let items: Rc<[T]> = Rc::from(items);
        let scheduler = FrameScheduler::new();
        let radar = Radar::with_policy(
            Rc::clone(&items),
            dom.clone(),
            Rc::new(scheduler.clone()),
            options,
            policy,
        );
        Self {
            radar,
            dom,
            scheduler,
            items,
            tween: None,
        }
    }

    pub fn radar(&self) -> &Radar<Rc<[T]>, D, P> {
        &self.radar
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Inserts the boundary markers into `item_container` and starts the radar.
    pub fn mount(&self, item_container: &D::Node) -> Result<(), RadarError> {
        self.radar.attach(item_container);
        self.radar.start()
    }

    /// Advances one frame: steps an active smooth scroll, delivers host events and runs the
    /// scheduled phases. Returns how many jobs ran.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        if let Some(tween) = self.tween {
            self.apply_scroll(tween.offset_at(now_ms));
            if tween.is_finished(now_ms) {
                self.tween = None;
            }
        }
        self.dom.pump_events();
        self.scheduler.run_frame()
    }

    /// Runs frames until nothing is pending or `max_frames` have run. Returns the frame count.
    ///
    /// An active smooth scroll is not advanced.
    pub fn settle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            self.dom.pump_events();
            if !self.scheduler.has_pending() {
                break;
            }
            self.scheduler.run_frame();
            frames += 1;
        }
        frames
    }

    /// Replaces the items and tells the radar what kind of change happened.
    ///
    /// Unless the window is reset, live slots re-read their items in place, so edits to items
    /// whose keys did not change are picked up. An unchanged list schedules no update.
    pub fn set_items<K: PartialEq>(&mut self, items: Vec<T>, key: impl Fn(&T) -> K) -> Change {
        let items: Rc<[T]> = Rc::from(items);
        let change = classify_change(&self.items, &items, key);
        adebug!(?change, total_items = items.len(), "Controller::set_items");

        self.items = Rc::clone(&items);
        self.radar.set_items(items);
        match change {
            Change::Unchanged => self.radar.refresh(),
            Change::Prepend(count) => {
                self.radar.prepend(count);
                self.radar.refresh();
            }
            Change::Append(_) => {
                self.radar.append();
                self.radar.refresh();
            }
            Change::Reset => self.radar.reset(),
        }
        change
    }

    /// Starts a smooth scroll that brings `index` to the start of the viewport, continuing from
    /// the current position when one is already running.
    ///
    /// Returns the target offset, or `None` before the radar has a scroll container.
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Option<f64> {
        let scroller = self.radar.scroll_container()?;
        let axis = self.radar.options().axis;
        let geometry = self.radar.geometry();
        let offset = self
            .radar
            .with_policy_ref(|p| p.offset_for_index(index, geometry.estimate_size));
        let target = offset + geometry.collection_offset;
        atrace!(index, target, "Controller::scroll_to_index");

        let tween = match self.tween {
            Some(mut tween) => {
                tween.redirect(now_ms, target, duration_ms);
                tween
            }
            None => {
                let from = self.dom.scroll_offset(&scroller, axis);
                ScrollTween::new(from, target, now_ms, duration_ms, easing)
            }
        };
        self.tween = Some(tween);
        Some(target)
    }

    pub fn is_scrolling(&self) -> bool {
        self.tween.is_some()
    }

    /// Stops a smooth scroll where it is, e.g. when the user takes over.
    pub fn cancel_scroll(&mut self) {
        self.tween = None;
    }

    pub fn destroy(&mut self) {
        self.tween = None;
        self.radar.destroy();
    }

    fn apply_scroll(&self, offset: f64) {
        if let Some(scroller) = self.radar.scroll_container() {
            let axis = self.radar.options().axis;
            self.dom.set_scroll_offset(&scroller, axis, offset);
        }
    }
}

impl<T, D, P> fmt::Debug for Controller<T, D, P>
where
    T: Clone + 'static,
    D: Dom + EventPump + Clone + 'static,
    P: IndexPolicy + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("total_items", &self.items.len())
            .field("window", &self.radar.window())
            .field("scrolling", &self.tween.is_some())
            .finish_non_exhaustive()
    }
}
