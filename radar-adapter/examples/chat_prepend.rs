use virtual_radar::{MemoryDom, RadarOptions};
use virtual_radar_adapter::{Change, Controller};

#[derive(Clone, Debug)]
struct Message {
    id: u64,
    text: String,
}

fn page(ids: std::ops::Range<u64>) -> Vec<Message> {
    ids.map(|id| Message {
        id,
        text: format!("message #{id}"),
    })
    .collect()
}

fn main() {
    // Loading older messages above the current view without the view jumping.
    let dom = MemoryDom::new();
    dom.set_item_extent(24.0);
    let scroller = dom.create_scroller(dom.document(), "div", 240.0);
    let list = dom.create_element("ol");
    dom.append_child(scroller, list);

    let mut c = Controller::new(
        page(1_000..1_100),
        dom.clone(),
        RadarOptions::new(24.0).with_render_from_last(true).with_starting_index(99),
    );
    c.mount(&list).expect("controller should mount");
    c.settle(32);

    let show = |c: &Controller<Message>| {
        let first = c.radar().slots().into_iter().next();
        println!(
            "scroll={} first slot={:?}",
            c.dom().scroll_position(scroller),
            first.and_then(|s| s.item().map(|m| m.text.clone())),
        );
    };
    show(&c);

    for older in [900..1_000u64, 800..900] {
        let mut items = page(older);
        items.extend_from_slice(c.items());
        let change = c.set_items(items, |m| m.id);
        assert!(matches!(change, Change::Prepend(100)));
        c.settle(32);
        show(&c);
    }
}
