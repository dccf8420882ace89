use std::time::Duration;

use asgallery::events::GalleryEvent;
use asgallery::gallery::Gallery;
use asgallery::items::{RawItem, Surface};
use tokio::sync::broadcast::Receiver;

fn three_items() -> Vec<RawItem> {
    vec![
        RawItem::Url("a.jpg".into()),
        RawItem::Url("b.jpg".into()),
        RawItem::Url("c.jpg".into()),
    ]
}

fn gallery_with_items(id: &str) -> Gallery {
    let gallery = Gallery::headless(id);
    gallery.set_items(Some(&three_items()));
    gallery
}

async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

fn drain(rx: &mut Receiver<GalleryEvent>) -> Vec<GalleryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn load_completes_both_surfaces() {
    let gallery = gallery_with_items("load1");
    let mut rx = gallery.subscribe();

    gallery.load_image(Some(0));
    settle().await;

    let events = drain(&mut rx);
    let loads: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GalleryEvent::LoadImage(payload) => Some(payload),
            _ => None,
        })
        .collect();
    assert_eq!(loads.len(), 2, "image and modal surfaces each complete once");
    assert!(loads.iter().any(|l| l.surface == Surface::Image));
    assert!(loads.iter().any(|l| l.surface == Surface::Modal));
    assert!(loads.iter().all(|l| l.index == 0));

    let item = &gallery.items()[0];
    assert!(item.loaded.modal);
    assert!(item.loaded.image);
    assert!(!item.loaded.panel);
}

#[tokio::test(start_paused = true)]
async fn modal_completion_enriches_metadata() {
    let gallery = Gallery::headless("load2");
    gallery.set_items(Some(&[RawItem::Url("photos/sunset.jpeg".into())]));

    gallery.load_image(Some(0));
    settle().await;

    let item = &gallery.items()[0];
    assert_eq!(item.name.as_deref(), Some("sunset.jpeg"));
    assert_eq!(item.extension.as_deref(), Some("jpeg"));
    assert_eq!(item.download.as_deref(), Some("photos/sunset.jpeg"));
    // InstantFetcher dimensions
    assert_eq!(item.width, Some(1920));
    assert_eq!(item.height, Some(1080));
}

#[tokio::test(start_paused = true)]
async fn first_image_fires_exactly_once() {
    let gallery = gallery_with_items("load3");
    let mut rx = gallery.subscribe();

    gallery.load_image(Some(1));
    settle().await;
    gallery.load_image(Some(2));
    settle().await;

    let events = drain(&mut rx);
    let firsts = events
        .iter()
        .filter(|e| matches!(e, GalleryEvent::FirstImage(_)))
        .count();
    assert_eq!(firsts, 1);

    // the first event precedes every load event
    let first_pos = events
        .iter()
        .position(|e| matches!(e, GalleryEvent::FirstImage(_)))
        .unwrap();
    let load_pos = events
        .iter()
        .position(|e| matches!(e, GalleryEvent::LoadImage(_)))
        .unwrap();
    assert!(first_pos < load_pos);
}

#[tokio::test(start_paused = true)]
async fn loaded_item_is_never_reloaded() {
    let gallery = gallery_with_items("load4");
    gallery.load_image(Some(0));
    settle().await;

    let mut rx = gallery.subscribe();
    gallery.load_image(Some(0));
    settle().await;

    assert!(
        drain(&mut rx).is_empty(),
        "no new fetch and no duplicate load-image event"
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_index_is_a_quiet_diagnostic() {
    let gallery = Gallery::headless("load5");
    gallery.set_items(Some(&[]));
    let mut rx = gallery.subscribe();

    gallery.load_image(Some(5));
    settle().await;

    assert!(drain(&mut rx).is_empty());
    assert!(gallery.is_empty());
}

#[tokio::test(start_paused = true)]
async fn load_images_fans_out() {
    let gallery = gallery_with_items("load6");

    gallery.load_images(&[0, 2]);
    settle().await;

    let items = gallery.items();
    assert!(items[0].loaded.modal);
    assert!(!items[1].loaded.modal);
    assert!(items[2].loaded.modal);

    // empty input is a no-op
    gallery.load_images(&[]);
}

#[tokio::test(start_paused = true)]
async fn preload_defers_the_next_item() {
    let gallery = gallery_with_items("load7");
    let mut rx = gallery.subscribe();

    // same-value write: preloads current immediately, next after the delay
    gallery.set_selected(0);
    settle().await;

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, GalleryEvent::LoadImage(p) if p.index == 0)
    ));
    assert!(
        !events.iter().any(
            |e| matches!(e, GalleryEvent::LoadImage(p) if p.index == 1)
        ),
        "next item not loaded before the preload delay"
    );

    // default preload delay is 770ms
    tokio::time::advance(Duration::from_millis(771)).await;
    settle().await;
    assert!(drain(&mut rx).iter().any(
        |e| matches!(e, GalleryEvent::LoadImage(p) if p.index == 1)
    ));
}

#[tokio::test(start_paused = true)]
async fn visible_gallery_preloads_almost_immediately() {
    let gallery = gallery_with_items("load8");
    let mut rx = gallery.subscribe();

    gallery.set_modal_visible(true);
    settle().await;
    drain(&mut rx);

    tokio::time::advance(Duration::from_millis(2)).await;
    settle().await;
    assert!(
        drain(&mut rx).iter().any(
            |e| matches!(e, GalleryEvent::LoadImage(p) if p.index == 1)
        ),
        "visibility overrides the configured preload delay"
    );
}

#[tokio::test(start_paused = true)]
async fn stale_preload_for_abandoned_index_is_harmless() {
    let gallery = gallery_with_items("load9");

    // schedules a deferred load of index 1
    gallery.set_selected(0);
    settle().await;

    // navigate away before the deferred load fires
    gallery.set_selected(2);
    settle().await;

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;

    // both deferred passes completed; selection is untouched by late loads
    assert_eq!(gallery.selected(), 2);
    let items = gallery.items();
    assert!(items[0].loaded.modal);
    assert!(items[2].loaded.modal);
}
