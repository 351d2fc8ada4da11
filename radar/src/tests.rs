use crate::*;

use crate::memory::NodeId;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }
}

/// A 100px viewport over 10px items, driven by a frame scheduler.
struct Fixture<P: IndexPolicy + 'static = StaticPolicy> {
    dom: MemoryDom,
    scheduler: FrameScheduler,
    scroller: NodeId,
    list: NodeId,
    items: Vec<u32>,
    radar: Radar<Vec<u32>, MemoryDom, P>,
    actions: Rc<RefCell<Vec<Action>>>,
}

fn setup<P: IndexPolicy + 'static>(total: u32, options: RadarOptions, policy: P) -> Fixture<P> {
    let dom = MemoryDom::new();
    dom.set_item_extent(10.0);
    let scroller = dom.create_scroller(dom.document(), "div", 100.0);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);

    let scheduler = FrameScheduler::new();
    let items: Vec<u32> = (0..total).collect();
    let radar = Radar::with_policy(
        items.clone(),
        dom.clone(),
        Rc::new(scheduler.clone()),
        options,
        policy,
    );
    let actions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&actions);
    radar.set_send_action(move |action| sink.borrow_mut().push(action));
    radar.attach(&list);

    Fixture {
        dom,
        scheduler,
        scroller,
        list,
        items,
        radar,
        actions,
    }
}

fn started(total: u32, options: RadarOptions) -> Fixture {
    let f = setup(total, options, StaticPolicy::new());
    f.radar.start().unwrap();
    f.settle();
    f
}

fn options() -> RadarOptions {
    RadarOptions::new(10.0).with_buffer_size(0.0)
}

impl<P: IndexPolicy + 'static> Fixture<P> {
    /// Delivers host events and runs frames until nothing is left to do.
    fn settle(&self) {
        for _ in 0..16 {
            self.dom.dispatch_events();
            if !self.scheduler.has_pending() {
                return;
            }
            self.scheduler.run_frame();
        }
        panic!("radar did not settle");
    }

    fn scroll_to(&self, offset: f64) {
        self.dom.scroll_to(self.scroller, offset);
        self.settle();
    }

    fn take_actions(&self) -> Vec<Action> {
        core::mem::take(&mut *self.actions.borrow_mut())
    }

    fn set_items(&mut self, items: Vec<u32>) {
        self.items = items.clone();
        self.radar.set_items(items);
    }

    fn prepend_items(&mut self, count: u32) {
        let next = self.items.iter().copied().max().map_or(0, |m| m + 1);
        let mut items: Vec<u32> = (next..next + count).collect();
        items.extend_from_slice(&self.items);
        self.set_items(items);
        self.radar.prepend(count as usize);
    }

    fn append_items(&mut self, count: u32) {
        let next = self.items.iter().copied().max().map_or(0, |m| m + 1);
        let mut items = self.items.clone();
        items.extend(next..next + count);
        self.set_items(items);
        self.radar.append();
    }

    fn indexes(&self) -> Vec<usize> {
        self.radar.slots().iter().map(|s| s.index()).collect()
    }

    fn presented(&self) -> Vec<(usize, Option<u32>)> {
        self.radar
            .slots()
            .iter()
            .map(|s| (s.index(), s.item().copied()))
            .collect()
    }

    fn slot_ids(&self) -> Vec<SlotId> {
        let mut ids = Vec::new();
        self.radar.for_each_slot(|id, _| ids.push(id));
        ids
    }

    fn marker(&self, side: Side) -> (f64, std::string::String) {
        let node = *self.radar.boundary(side).node();
        (self.dom.marker_extent(node), self.dom.marker_text(node))
    }

    /// Invariants that hold after every settled frame.
    fn assert_consistent(&self) {
        let total = self.items.len();
        let window = self.radar.window();
        let indexes = self.indexes();

        if total == 0 {
            assert!(window.is_empty());
            assert!(indexes.is_empty());
        } else {
            let last = window.last_index().unwrap();
            assert!(window.start_index <= last && last < total, "{window:?} for {total}");
            let expected: Vec<usize> = (window.start_index..=last).collect();
            assert_eq!(indexes, expected);
        }

        for slot in self.radar.slots() {
            assert_eq!(slot.item().copied(), self.items.as_slice().get(slot.index()).copied());
            assert!(slot.is_rendered());
        }
        assert_eq!(self.dom.slot_order(self.list), self.slot_ids());

        let children = self.dom.children(self.list);
        assert_eq!(children.first(), Some(self.radar.boundary(Side::Before).node()));
        assert_eq!(children.last(), Some(self.radar.boundary(Side::After).node()));
        assert!(self.radar.total_before() >= 0.0);
        assert!(self.radar.total_after() >= 0.0);
    }
}

#[test]
fn start_renders_the_first_page_and_reports_edges() {
    let f = started(50, options());

    assert_eq!(f.radar.lifecycle(), Lifecycle::Started);
    assert_eq!(f.radar.first_item_index(), 0);
    assert_eq!(f.radar.last_item_index(), Some(9));
    assert_eq!(f.radar.total_components(), 10);
    assert_eq!(f.indexes(), (0..10).collect::<Vec<_>>());
    assert_eq!(
        f.take_actions(),
        [
            Action::FirstVisibleChanged(0),
            Action::LastVisibleChanged(9),
            Action::FirstReached(0),
        ]
    );

    assert_eq!(f.marker(Side::Before), (0.0, "".into()));
    assert_eq!(f.marker(Side::After), (400.0, "And 40 items after".into()));
    assert_eq!(f.dom.extent(f.list), 500.0);
    f.assert_consistent();
}

#[test]
fn scrolling_a_page_moves_the_window_without_overlap() {
    let f = started(50, options());
    f.take_actions();
    let before = f.indexes();

    f.scroll_to(200.0);

    assert_eq!(f.radar.first_item_index(), 20);
    assert_eq!(f.radar.last_item_index(), Some(29));
    assert!(f.indexes().iter().all(|i| !before.contains(i)));
    assert_eq!(
        f.take_actions(),
        [Action::FirstVisibleChanged(20), Action::LastVisibleChanged(29)]
    );
    assert_eq!(f.radar.total_before(), 200.0);
    assert_eq!(f.radar.total_after(), 200.0);
    assert_eq!(f.marker(Side::Before), (200.0, "And 20 items before".into()));
    // Every slot was reused.
    assert_eq!(f.radar.created_slots(), 10);
    f.assert_consistent();
}

#[test]
fn small_scrolls_are_debounced() {
    let f = started(50, options());

    f.dom.scroll_to(f.scroller, 4.0);
    f.dom.dispatch_events();
    assert!(!f.scheduler.has_pending());

    f.dom.scroll_to(f.scroller, 6.0);
    f.dom.dispatch_events();
    assert_eq!(f.scheduler.pending(Phase::Sync), 1);

    f.radar.schedule_update();
    f.radar.schedule_update();
    assert_eq!(f.scheduler.pending(Phase::Sync), 1);
    f.settle();
    assert_eq!(f.radar.scroll_position(), 6.0);
}

#[test]
fn prepend_shifts_indexes_immediately_and_keeps_content_in_place() {
    let mut f = started(50, options());
    f.take_actions();
    let items_before = f.presented();

    f.prepend_items(10);

    assert_eq!(f.radar.first_item_index(), 10);
    assert_eq!(f.radar.last_item_index(), Some(19));
    assert_eq!(f.indexes(), (10..20).collect::<Vec<_>>());
    assert_eq!(f.radar.prepend_offset(), 100.0);
    let visible_left = f.radar.visible_left();
    assert_eq!(visible_left, 100.0);

    f.settle();

    assert_eq!(f.radar.visible_left(), visible_left);
    assert_eq!(f.radar.prepend_offset(), 0.0);
    assert_eq!(f.dom.scroll_position(f.scroller), 100.0);
    assert_eq!(f.radar.first_item_index(), 10);
    let shifted: Vec<_> = items_before.iter().map(|&(i, item)| (i + 10, item)).collect();
    assert_eq!(f.presented(), shifted);
    assert_eq!(
        f.take_actions(),
        [Action::FirstVisibleChanged(10), Action::LastVisibleChanged(19)]
    );
    f.assert_consistent();
}

#[test]
fn prepends_within_one_frame_accumulate() {
    let mut f = started(50, options());
    f.scroll_to(100.0);

    f.prepend_items(3);
    f.prepend_items(4);
    assert_eq!(f.radar.prepend_offset(), 70.0);
    assert_eq!(f.radar.first_item_index(), 17);

    f.settle();
    assert_eq!(f.dom.scroll_position(f.scroller), 170.0);
    assert_eq!(f.radar.first_item_index(), 17);
    f.assert_consistent();
}

#[test]
fn head_slots_from_consecutive_reconciles_keep_dom_order() {
    let f = setup(
        50,
        options()
            .with_buffer_size(2.0)
            .with_starting_index(20)
            .with_initial_render_count(5),
        StaticPolicy::new(),
    );
    f.radar.start().unwrap();
    // Scrolled before the first frame: the fresh head slots of `start` are still queued when
    // the next reconcile grows the head again.
    f.dom.scroll_to(f.scroller, 150.0);
    f.settle();

    let window = f.radar.window();
    assert_eq!((window.start_index, window.end_index), (13, 27));
    assert_eq!(f.indexes(), (13..27).collect::<Vec<_>>());
    assert_eq!(f.dom.slot_order(f.list), f.slot_ids());
    f.assert_consistent();
}

#[test]
fn hidden_count_before_start_is_clamped_to_the_list() {
    let f = setup(
        50,
        options().with_starting_index(60).with_initial_render_count(3),
        StaticPolicy::new(),
    );
    assert!(f.indexes().is_empty());
    assert_eq!(f.radar.boundary(Side::Before).hidden(), 50);
    assert_eq!(f.marker(Side::Before), (0.0, "And 50 items before".into()));
    assert_eq!(f.marker(Side::After), (0.0, "".into()));
}

#[test]
fn emptying_the_list_clears_the_window_silently() {
    let mut f = started(50, options());
    f.scroll_to(200.0);
    f.take_actions();

    f.set_items(Vec::new());
    f.radar.reset();
    f.settle();

    assert!(f.radar.window().is_empty());
    assert_eq!(f.radar.last_item_index(), None);
    assert_eq!(f.radar.first_visible_index(), None);
    assert!(f.indexes().is_empty());
    assert_eq!(f.marker(Side::Before), (0.0, "".into()));
    assert_eq!(f.marker(Side::After), (0.0, "".into()));
    assert!(f.take_actions().is_empty());
    assert_eq!(f.radar.pool_len(), 10);
    f.assert_consistent();
}

#[test]
fn edge_latches_fire_once_per_episode() {
    let mut f = started(50, options());
    let reached = |actions: &[Action]| {
        actions
            .iter()
            .filter(|a| matches!(a, Action::FirstReached(_)))
            .count()
    };
    assert_eq!(reached(&f.take_actions()), 1);

    for _ in 0..3 {
        f.radar.schedule_update();
        f.settle();
    }
    assert_eq!(reached(&f.take_actions()), 0);
    assert!(f.radar.first_reached().is_reached());

    f.prepend_items(5);
    assert_eq!(f.radar.first_reached(), EdgeLatch::Unreached);
    f.settle();
    assert_eq!(f.radar.first_item_index(), 5);
    assert_eq!(reached(&f.take_actions()), 0);

    f.scroll_to(0.0);
    assert_eq!(f.radar.first_item_index(), 0);
    assert_eq!(reached(&f.take_actions()), 1);

    f.scroll_to(f64::MAX);
    assert_eq!(f.radar.last_item_index(), Some(54));
    assert!(f.take_actions().contains(&Action::LastReached(54)));

    f.append_items(5);
    f.settle();
    assert!(!f.take_actions().iter().any(|a| matches!(a, Action::LastReached(_))));

    f.scroll_to(f64::MAX);
    assert!(f.take_actions().contains(&Action::LastReached(59)));
    f.assert_consistent();
}

#[test]
fn reset_recycles_slots_in_place() {
    let mut f = started(50, options());
    f.scroll_to(200.0);
    let ids = f.slot_ids();

    f.set_items((1000..1050).collect());
    f.radar.reset();
    f.settle();

    assert_eq!(f.slot_ids(), ids);
    assert_eq!(f.presented()[0], (20, Some(1020)));
    let actions = f.take_actions();
    assert!(actions.contains(&Action::FirstVisibleChanged(20)));
    assert!(actions.contains(&Action::LastVisibleChanged(29)));
    f.assert_consistent();
}

#[test]
fn reset_without_recycling_rebuilds_every_slot() {
    let mut f = started(50, options().with_should_recycle(false));
    f.set_items((1000..1050).collect());
    f.radar.reset();
    f.settle();

    assert_eq!(f.radar.created_slots(), 20);
    assert_eq!(f.radar.live_slots(), 10);
    assert_eq!(f.radar.pool_len(), 0);
    f.assert_consistent();
}

#[test]
fn scrolling_back_places_fresh_slots_in_order() {
    let f = started(50, options().with_should_recycle(false));
    f.scroll_to(300.0);
    f.scroll_to(250.0);

    assert_eq!(f.indexes(), (25..35).collect::<Vec<_>>());
    f.assert_consistent();

    f.scroll_to(0.0);
    assert_eq!(f.indexes(), (0..10).collect::<Vec<_>>());
    f.assert_consistent();
}

#[test]
fn recycling_is_invisible_to_the_host() {
    let recycled = started(200, options().with_buffer_size(2.0));
    let fresh = started(200, options().with_buffer_size(2.0).with_should_recycle(false));

    let mut rng = Lcg::new(7);
    for _ in 0..40 {
        let offset = rng.gen_range_usize(0, 1900) as f64;
        recycled.scroll_to(offset);
        fresh.scroll_to(offset);
        assert_eq!(recycled.presented(), fresh.presented());
        recycled.assert_consistent();
        fresh.assert_consistent();
    }
    assert!(recycled.radar.created_slots() < fresh.radar.created_slots());
    assert_eq!(recycled.radar.live_slots(), recycled.radar.created_slots());
}

#[test]
fn marker_clicks_page_through_the_list() {
    let f = started(50, options());

    f.dom.click(*f.radar.boundary(Side::After).node());
    f.settle();
    assert_eq!(f.dom.scroll_position(f.scroller), 101.0);
    assert_eq!(f.radar.first_item_index(), 10);

    f.radar.page_right();
    f.settle();
    assert_eq!(f.radar.first_item_index(), 20);

    f.dom.click(*f.radar.boundary(Side::Before).node());
    f.settle();
    assert_eq!(f.radar.first_item_index(), 10);

    f.radar.page_left();
    f.settle();
    assert_eq!(f.radar.first_item_index(), 0);

    // Already at the start.
    f.radar.page_left();
    assert!(!f.scheduler.has_pending());
    f.assert_consistent();
}

#[test]
fn page_right_stops_at_the_end() {
    let f = started(25, options());
    f.radar.page_right();
    f.settle();
    f.radar.page_right();
    f.settle();
    assert_eq!(f.radar.last_item_index(), Some(24));

    f.radar.page_right();
    assert!(!f.scheduler.has_pending());
}

#[test]
fn render_all_renders_everything_and_ignores_paging() {
    let f = started(30, options().with_render_all(true));
    assert_eq!(f.indexes(), (0..30).collect::<Vec<_>>());
    assert_eq!(f.marker(Side::Before).0, 0.0);
    assert_eq!(f.marker(Side::After).0, 0.0);

    f.radar.page_right();
    assert!(!f.scheduler.has_pending());
}

#[test]
fn starting_index_sets_the_initial_scroll() {
    let f = started(50, options().with_starting_index(20));
    assert_eq!(f.dom.scroll_position(f.scroller), 200.0);
    assert_eq!(f.radar.first_item_index(), 20);
    assert_eq!(f.radar.first_visible_index(), Some(20));

    let f = started(50, options().with_starting_index(20).with_render_from_last(true));
    assert_eq!(f.dom.scroll_position(f.scroller), 110.0);
    assert_eq!(f.radar.last_visible_index(), Some(20));
}

#[test]
fn initial_render_count_is_laid_out_before_start_and_reused() {
    let f = setup(50, options().with_initial_render_count(3), StaticPolicy::new());
    assert_eq!(f.indexes(), [0, 1, 2]);
    assert!(f.radar.slots().iter().all(|s| !s.is_rendered()));
    assert!(f.dom.slot_order(f.list).is_empty());

    f.radar.start().unwrap();
    f.settle();
    assert_eq!(f.indexes(), (0..10).collect::<Vec<_>>());
    assert_eq!(f.radar.created_slots(), 10);
    f.assert_consistent();
}

#[test]
fn geometry_accounts_for_offsets_scale_and_max_size() {
    let dom = MemoryDom::new();
    dom.set_item_extent(10.0);
    dom.set_scale(0.5);
    let scroller = dom.create_scroller(dom.document(), "section", 100.0);
    dom.set_max_size_style(scroller, Some("150px"));
    let header = dom.create_element("header");
    dom.set_layout_size(header, Some(30.0));
    dom.append_child(scroller, header);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);

    let scheduler = FrameScheduler::new();
    let radar = Radar::new(
        (0..50).collect::<Vec<u32>>(),
        dom.clone(),
        Rc::new(scheduler.clone()),
        RadarOptions::new("2em").with_container_selector(Some("section")),
    );
    radar.attach(&list);
    radar.start().unwrap();

    assert_eq!(
        radar.geometry(),
        Geometry {
            estimate_size: 32.0,
            container_size: 150.0,
            collection_offset: 30.0,
            transform_scale: 2.0,
        }
    );
    assert_eq!(radar.scroll_container(), Some(scroller));
    assert_eq!(radar.item_container(), Some(list));
}

#[test]
fn body_selector_uses_the_document_scroller() {
    let dom = MemoryDom::new();
    dom.set_layout_size(dom.document(), Some(100.0));
    let list = dom.create_element("ul");
    dom.append_child(dom.document(), list);

    let radar = Radar::new(
        (0..50).collect::<Vec<u32>>(),
        dom.clone(),
        Rc::new(FrameScheduler::new()),
        RadarOptions::new(10.0).with_container_selector(Some("body")),
    );
    radar.attach(&list);
    radar.start().unwrap();
    assert_eq!(radar.scroll_container(), Some(dom.document()));
}

#[test]
fn configuration_errors_fail_fast() {
    let f = setup(50, RadarOptions::default(), StaticPolicy::new());
    assert_eq!(f.radar.start(), Err(RadarError::MissingEstimateSize));

    let dom = MemoryDom::new();
    let radar = Radar::new(
        Vec::<u32>::new(),
        dom.clone(),
        Rc::new(FrameScheduler::new()),
        RadarOptions::new(10.0),
    );
    assert_eq!(radar.start(), Err(RadarError::ContainerNotAttached));
    assert_eq!(radar.update(), Err(RadarError::ContainerNotAttached));

    let f = setup(50, options().with_container_selector(Some("table")), StaticPolicy::new());
    assert_eq!(
        f.radar.start(),
        Err(RadarError::ScrollContainerNotFound {
            selector: "table".into()
        })
    );

    let f = setup(50, RadarOptions::new("auto"), StaticPolicy::new());
    assert_eq!(
        f.radar.start(),
        Err(RadarError::NonPositiveEstimate { estimate: 0.0 })
    );
    assert_eq!(f.radar.lifecycle(), Lifecycle::NotStarted);
    assert_eq!(f.radar.scroll_container(), None);
}

#[test]
fn destroy_cancels_jobs_and_tears_down_dom() {
    let f = started(50, options());
    let radar = f.radar.clone();
    f.radar.schedule_update();
    assert!(f.scheduler.has_pending());

    radar.destroy();
    assert_eq!(f.radar.lifecycle(), Lifecycle::Destroyed);
    assert!(!f.scheduler.has_pending());
    assert_eq!(f.scheduler.run_frame(), 0);
    assert!(f.dom.slot_order(f.list).is_empty());
    assert_eq!(f.radar.live_slots(), 0);

    // Listeners are gone too.
    f.dom.scroll_to(f.scroller, 300.0);
    f.dom.dispatch_events();
    assert!(!f.scheduler.has_pending());
    assert_eq!(f.radar.start(), Err(RadarError::Destroyed));
    assert_eq!(f.radar.update(), Err(RadarError::Destroyed));
}

#[test]
fn parent_token_cancellation_stops_the_radar() {
    let dom = MemoryDom::new();
    let scroller = dom.create_scroller(dom.document(), "div", 100.0);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);
    let scheduler = FrameScheduler::new();
    let parent = Token::new();

    let radar = Radar::with_parent_token(
        &parent,
        (0..50).collect::<Vec<u32>>(),
        dom.clone(),
        Rc::new(scheduler.clone()),
        options(),
        StaticPolicy::new(),
    );
    radar.attach(&list);
    radar.start().unwrap();
    assert!(scheduler.has_pending());

    parent.cancel();
    assert!(!scheduler.has_pending());
    assert_eq!(scheduler.run_frame(), 0);
}

#[test]
fn actions_may_call_back_into_the_radar() {
    let mut f = started(20, options());
    let radar = f.radar.clone();
    let appended = Rc::new(RefCell::new(0));
    let count = Rc::clone(&appended);
    f.radar.set_send_action(move |action| {
        if let Action::LastReached(_) = action {
            *count.borrow_mut() += 1;
            radar.set_items((0..30).collect());
            radar.append();
        }
    });

    f.scroll_to(f64::MAX);
    assert_eq!(*appended.borrow(), 1);
    f.items = (0..30).collect();
    assert_eq!(f.radar.total_items(), 30);
    assert_eq!(f.radar.last_reached(), EdgeLatch::Unreached);
    f.assert_consistent();
}

#[test]
fn measured_policy_drives_the_window() {
    let f = setup(50, options(), MeasuredPolicy::new());
    f.radar.start().unwrap();
    f.settle();

    f.radar.with_policy_mut(|p| {
        for i in 0..5 {
            p.measure(i, 40.0);
        }
    });
    f.radar.schedule_update();
    f.settle();
    assert_eq!(f.radar.window().end_index, 3);

    f.scroll_to(200.0);
    assert_eq!(f.radar.first_item_index(), 5);
    assert_eq!(f.radar.total_before(), 200.0);
    assert_eq!(f.radar.with_policy_ref(|p| p.total_size(50, 10.0)), 650.0);
    f.assert_consistent();
}

#[test]
fn vertical_axis_uses_the_same_geometry() {
    let f = started(50, options().with_axis(Axis::Vertical));
    f.scroll_to(200.0);
    assert_eq!(f.radar.visible_top(), 200.0);
    assert_eq!(f.radar.visible_bottom(), 299.0);
    assert_eq!(f.radar.visible_middle(), 250.0);
    assert_eq!(f.radar.first_item_index(), 20);
}

#[cfg(feature = "serde")]
#[test]
fn options_deserialize_with_defaults() {
    let options: RadarOptions =
        serde_json::from_str(r#"{ "estimate_size": "3em", "buffer_size": 2, "axis": "Vertical" }"#)
            .unwrap();
    assert_eq!(options.estimate_size, Some(EstimateSize::Css("3em".into())));
    assert_eq!(options.buffer_size, 2.0);
    assert_eq!(options.axis, Axis::Vertical);
    assert!(options.should_recycle);

    let options: RadarOptions = serde_json::from_str(r#"{ "estimate_size": 20 }"#).unwrap();
    assert_eq!(options, RadarOptions::new(20.0));

    let json = serde_json::to_string(&RadarOptions::new(12.5)).unwrap();
    let back: RadarOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, RadarOptions::new(12.5));
}

#[derive(Clone, Debug)]
enum Op {
    Scroll(u32),
    Prepend(u32),
    Append(u32),
    Reset(u32),
    PageLeft,
    PageRight,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u32..2000).prop_map(Op::Scroll),
        1 => (1u32..15).prop_map(Op::Prepend),
        1 => (1u32..15).prop_map(Op::Append),
        1 => (0u32..120).prop_map(Op::Reset),
        1 => Just(Op::PageLeft),
        1 => Just(Op::PageRight),
    ]
}

fn apply(f: &mut Fixture, op: &Op) {
    match *op {
        Op::Scroll(offset) => f.dom.scroll_to(f.scroller, f64::from(offset)),
        Op::Prepend(n) => f.prepend_items(n),
        Op::Append(n) => f.append_items(n),
        Op::Reset(n) => {
            f.set_items((5000..5000 + n).collect());
            f.radar.reset();
        }
        Op::PageLeft => f.radar.page_left(),
        Op::PageRight => f.radar.page_right(),
    }
    f.settle();
}

proptest! {
    #[test]
    fn window_stays_valid_and_gap_free(
        total in 0u32..150,
        buffer in 0.0f64..3.0,
        recycle in any::<bool>(),
        ops in proptest::collection::vec(op(), 1..25),
    ) {
        let mut f = started(total, options().with_buffer_size(buffer).with_should_recycle(recycle));
        f.assert_consistent();
        for op in &ops {
            apply(&mut f, op);
            f.assert_consistent();
        }
    }

    #[test]
    fn recycled_pool_never_outgrows_the_largest_window(
        total in 1u32..150,
        buffer in 0.0f64..3.0,
        ops in proptest::collection::vec(op(), 1..25),
    ) {
        let mut f = started(total, options().with_buffer_size(buffer));
        let mut largest = f.radar.total_components();
        for op in &ops {
            apply(&mut f, op);
            largest = largest.max(f.radar.total_components());
            prop_assert!(f.radar.live_slots() <= largest);
            prop_assert!(f.radar.created_slots() <= largest);
        }
    }

    #[test]
    fn recycling_presents_the_same_items(
        total in 0u32..150,
        ops in proptest::collection::vec(op(), 1..20),
    ) {
        let mut recycled = started(total, options().with_buffer_size(1.0));
        let mut fresh = started(total, options().with_buffer_size(1.0).with_should_recycle(false));
        for op in &ops {
            apply(&mut recycled, op);
            apply(&mut fresh, op);
            prop_assert_eq!(recycled.presented(), fresh.presented());
        }
    }

    #[test]
    fn prepend_keeps_visible_content_still(
        total in 10u32..150,
        offset in 0u32..1500,
        count in 1u32..30,
    ) {
        let mut f = started(total, options());
        f.scroll_to(f64::from(offset));
        // Sub-threshold scrolls are not picked up by themselves.
        f.radar.schedule_update();
        f.settle();
        let first_visible = f.radar.first_visible_index().unwrap();

        f.prepend_items(count);
        let visible_left = f.radar.visible_left();
        f.settle();

        prop_assert!((f.radar.visible_left() - visible_left).abs() < 0.01);
        prop_assert_eq!(
            f.radar.first_visible_index(),
            Some(first_visible + count as usize)
        );
        f.assert_consistent();
    }
}
