use std::rc::Rc;

use virtual_radar::{Action, FrameScheduler, MemoryDom, Radar, RadarOptions, Side};

fn main() {
    // A 200px viewport over 10k items of 20px each, hosted by the in-memory DOM.
    let dom = MemoryDom::new();
    dom.set_item_extent(20.0);
    let scroller = dom.create_scroller(dom.document(), "div", 200.0);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);

    let scheduler = FrameScheduler::new();
    let items: Vec<u32> = (0..10_000).collect();
    let radar = Radar::new(
        items,
        dom.clone(),
        Rc::new(scheduler.clone()),
        RadarOptions::new(20.0).with_buffer_size(0.5),
    );
    radar.set_send_action(|action: Action| println!("  {}({})", action.name(), action.index()));
    radar.attach(&list);
    radar.start().expect("radar should start");

    let settle = || {
        dom.dispatch_events();
        while scheduler.has_pending() {
            scheduler.run_frame();
            dom.dispatch_events();
        }
    };
    settle();

    for offset in [0.0, 1_000.0, 1_010.0, 150_000.0, 199_800.0] {
        println!("scroll to {offset}");
        dom.scroll_to(scroller, offset);
        settle();

        let window = radar.window();
        println!(
            "  window={}..{} before={} after={} slots={} created={}",
            window.start_index,
            window.end_index,
            radar.total_before(),
            radar.total_after(),
            radar.live_slots(),
            radar.created_slots(),
        );
        println!(
            "  markers: {:?} / {:?}",
            dom.marker_text(*radar.boundary(Side::Before).node()),
            dom.marker_text(*radar.boundary(Side::After).node()),
        );
    }
}
