use tokio::sync::broadcast;
use tracing::debug;

use crate::config::Options;
use crate::fetch::Asset;
use crate::items::{Item, Surface};

/// Slug prefixing every event channel name and URL fragment.
pub const SLUG: &str = "asg";

/// Selection reference carried by navigation and autoplay events.
#[derive(Debug, Clone)]
pub struct SelectionRef {
    pub index: usize,
    pub file: Option<Item>,
}

/// Load completion payload. `file` is the currently selected item at the time
/// of completion, `index`/`surface` identify what finished loading.
#[derive(Debug, Clone)]
pub struct LoadedRef {
    pub surface: Surface,
    pub index: usize,
    pub file: Option<Item>,
    pub asset: Asset,
}

/// Everything observable about an engine instance flows through these.
#[derive(Debug, Clone)]
pub enum GalleryEvent {
    ConfigLoad(Options),
    ParseImages(Vec<Item>),
    AutoplayStart(SelectionRef),
    AutoplayStop(SelectionRef),
    FirstImage(LoadedRef),
    LoadImage(LoadedRef),
    /// `index` is the new selection, `file` the previously selected item.
    ChangeImage(SelectionRef),
    ModalOpen { index: usize },
    ModalClose { index: usize },
}

impl GalleryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigLoad(_) => "config-load",
            Self::ParseImages(_) => "parse-images",
            Self::AutoplayStart(_) => "autoplay-start",
            Self::AutoplayStop(_) => "autoplay-stop",
            Self::FirstImage(_) => "first-image",
            Self::LoadImage(_) => "load-image",
            Self::ChangeImage(_) => "change-image",
            Self::ModalOpen { .. } => "modal-open",
            Self::ModalClose { .. } => "modal-close",
        }
    }

    /// Channel name suffixed with the instance identity, so instances sharing
    /// a diagnostic sink do not cross-talk.
    pub fn channel(&self, id: &str) -> String {
        format!("{SLUG}-{}-{id}", self.name())
    }
}

/// Per-instance broadcast bus. Collaborators subscribe; every emission also
/// routes through the debug logger.
#[derive(Debug, Clone)]
pub struct EventBus {
    id: String,
    tx: broadcast::Sender<GalleryEvent>,
}

impl EventBus {
    pub fn new(id: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { id: id.into(), tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }

    /// Broadcasts to all subscribers. A send with no subscribers is fine; the
    /// engine never depends on anyone listening.
    pub fn emit(&self, event: GalleryEvent, debug_enabled: bool) {
        if debug_enabled {
            debug!(channel = %event.channel(&self.id), payload = ?event, "gallery event");
        }
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_identity_suffixed() {
        let open = GalleryEvent::ModalOpen { index: 2 };
        assert_eq!(open.channel("7f3"), "asg-modal-open-7f3");
        let close = GalleryEvent::ModalClose { index: 2 };
        assert_eq!(close.channel("7f3"), "asg-modal-close-7f3");
    }

    #[test]
    fn emit_without_subscribers_is_harmless() {
        let bus = EventBus::new("x");
        bus.emit(GalleryEvent::ModalOpen { index: 0 }, false);
    }

    #[tokio::test]
    async fn subscribers_receive_emissions() {
        let bus = EventBus::new("x");
        let mut rx = bus.subscribe();
        bus.emit(GalleryEvent::ModalOpen { index: 3 }, false);
        match rx.recv().await.unwrap() {
            GalleryEvent::ModalOpen { index } => assert_eq!(index, 3),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
