use virtual_radar::{MemoryDom, RadarOptions};
use virtual_radar_adapter::{Controller, Easing};

fn main() {
    let dom = MemoryDom::new();
    dom.set_item_extent(16.0);
    let scroller = dom.create_scroller(dom.document(), "div", 320.0);
    let list = dom.create_element("ul");
    dom.append_child(scroller, list);

    let mut c = Controller::new((0..50_000u32).collect(), dom, RadarOptions::new(16.0));
    c.mount(&list).expect("controller should mount");
    c.settle(16);

    let target = c.scroll_to_index(25_000, 0, 240, Easing::EaseInOutCubic);
    println!("target_offset={target:?}");

    let mut now_ms = 0u64;
    while c.is_scrolling() {
        now_ms += 16;
        let jobs = c.tick(now_ms);
        let window = c.radar().window();
        println!(
            "t={now_ms:>3}ms scroll={:>9.1} window={}..{} jobs={jobs}",
            c.dom().scroll_position(scroller),
            window.start_index,
            window.end_index,
        );
    }
    c.settle(16);
    println!("created {} slots for 50000 items", c.radar().created_slots());
}
