use std::rc::Rc;

use virtual_radar::{FrameScheduler, MeasuredPolicy, MemoryDom, Radar, RadarOptions};

fn main() {
    // Items start out estimated at 10px; measuring the first rows corrects the offsets.
    let dom = MemoryDom::new();
    dom.set_item_extent(10.0);
    let scroller = dom.create_scroller(dom.document(), "div", 100.0);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);

    let scheduler = FrameScheduler::new();
    let radar = Radar::with_policy(
        (0..1_000u32).collect::<Vec<_>>(),
        dom.clone(),
        Rc::new(scheduler.clone()),
        RadarOptions::new(10.0).with_buffer_size(0.0),
        MeasuredPolicy::new(),
    );
    radar.attach(&list);
    radar.start().expect("radar should start");
    scheduler.run_until_idle(16);

    for index in 0..5 {
        radar.with_policy_mut(|p| p.measure(index, 40.0));
    }
    radar.schedule_update();
    scheduler.run_until_idle(16);

    let window = radar.window();
    println!("window={}..{}", window.start_index, window.end_index);
    println!(
        "item 5 starts at {:?}, {}px hidden before the window",
        radar.with_policy_ref(|p| p.item_start(5)),
        radar.total_before(),
    );
}
