use std::time::Duration;

use asgallery::config::{AutoplayPatch, OptionsPatch};
use asgallery::events::GalleryEvent;
use asgallery::gallery::Gallery;
use asgallery::items::RawItem;
use tokio::sync::broadcast::Receiver;

const PERIOD: Duration = Duration::from_secs(1);

fn gallery_with_period(id: &str) -> Gallery {
    let gallery = Gallery::headless(id);
    gallery.set_options(Some(&OptionsPatch {
        autoplay: Some(AutoplayPatch {
            enabled: None,
            delay: Some(PERIOD),
        }),
        ..OptionsPatch::default()
    }));
    gallery.set_items(Some(&[
        RawItem::Url("a.jpg".into()),
        RawItem::Url("b.jpg".into()),
        RawItem::Url("c.jpg".into()),
    ]));
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

async fn tick(times: u32) {
    for _ in 0..times {
        tokio::time::advance(PERIOD).await;
        settle().await;
    }
}

#[tokio::test(start_paused = true)]
async fn autoplay_advances_at_the_configured_delay() {
    let gallery = gallery_with_period("ap1");
    let mut rx = gallery.subscribe();

    gallery.autoplay_start();
    settle().await;
    assert!(gallery.autoplay_running());
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, GalleryEvent::AutoplayStart(_))));
    assert_eq!(gallery.selected(), 0, "no step before the first period");

    tick(1).await;
    assert_eq!(gallery.selected(), 1);
    tick(1).await;
    assert_eq!(gallery.selected(), 2);
    // wraps around
    tick(1).await;
    assert_eq!(gallery.selected(), 0);
}

#[tokio::test(start_paused = true)]
async fn double_start_keeps_one_timer() {
    let gallery = gallery_with_period("ap2");

    gallery.autoplay_start();
    gallery.autoplay_start();
    settle().await;

    tick(3).await;
    assert_eq!(gallery.selected(), 0, "three periods advance three steps, wrapping to 0");
}

#[tokio::test(start_paused = true)]
async fn stop_when_not_running_is_a_no_op() {
    let gallery = gallery_with_period("ap3");
    let mut rx = gallery.subscribe();

    gallery.autoplay_stop();
    settle().await;

    assert!(drain(&mut rx).is_empty());
    assert!(!gallery.autoplay_running());
}

#[tokio::test(start_paused = true)]
async fn stopped_autoplay_never_fires_again() {
    let gallery = gallery_with_period("ap4");
    let mut rx = gallery.subscribe();

    gallery.autoplay_start();
    settle().await;
    tick(1).await;
    assert_eq!(gallery.selected(), 1);

    gallery.autoplay_stop();
    settle().await;
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, GalleryEvent::AutoplayStop(_))));

    tick(5).await;
    assert_eq!(gallery.selected(), 1);
    assert!(!gallery.autoplay_running());
}

#[tokio::test(start_paused = true)]
async fn toggle_alternates_state() {
    let gallery = gallery_with_period("ap5");

    gallery.autoplay_toggle();
    assert!(gallery.autoplay_running());
    gallery.autoplay_toggle();
    assert!(!gallery.autoplay_running());
    gallery.autoplay_toggle();
    assert!(gallery.autoplay_running());
}

#[tokio::test(start_paused = true)]
async fn manual_navigation_with_stop_halts_autoplay() {
    let gallery = gallery_with_period("ap6");

    gallery.autoplay_start();
    settle().await;

    gallery.to_forward(true);
    assert!(!gallery.autoplay_running());
    assert_eq!(gallery.selected(), 1);

    tick(3).await;
    assert_eq!(gallery.selected(), 1, "no further autoplay steps");
}

#[tokio::test(start_paused = true)]
async fn autoplay_keeps_running_without_stop_flag() {
    let gallery = gallery_with_period("ap7");

    gallery.autoplay_start();
    settle().await;

    gallery.to_forward(false);
    assert!(gallery.autoplay_running());
}
