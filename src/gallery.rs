//! The gallery engine instance: selection and navigation state, asset load
//! tracking, preload scheduling, autoplay, and event emission.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::config::{Options, OptionsPatch};
use crate::effects::{NoEffects, PresentationEffects};
use crate::events::{EventBus, GalleryEvent, LoadedRef, SelectionRef};
use crate::fetch::{Asset, AssetFetcher, InstantFetcher};
use crate::fragment::{self, FragmentStore, MemoryFragment};
use crate::items::{self, Item, RawItem, Surface};
use crate::schedule::{self, Recurring};

/// Preload delay override while the modal surface is visible; a visible
/// gallery should not show a blank next-slide gap.
const VISIBLE_PRELOAD_DELAY: Duration = Duration::from_millis(1);

/// Delay before the one-time modal wiring and focus grab.
const MODAL_INIT_DELAY: Duration = Duration::from_millis(100);

/// Delay before a URL-fragment selection is applied on init.
const FRAGMENT_APPLY_DELAY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct State {
    options: Options,
    options_loaded: bool,
    items: Vec<Item>,
    items_loaded: bool,
    selected: usize,
    direction: Direction,
    visible: bool,
    modal_available: bool,
    autoplay: Option<Recurring>,
    first: bool,
}

impl State {
    fn new() -> Self {
        Self {
            options: Options::default(),
            options_loaded: false,
            items: Vec::new(),
            items_loaded: false,
            selected: 0,
            direction: Direction::default(),
            visible: false,
            modal_available: false,
            autoplay: None,
            first: false,
        }
    }

    fn selection_ref(&self) -> SelectionRef {
        SelectionRef {
            index: self.selected,
            file: self.items.get(self.selected).cloned(),
        }
    }
}

struct Inner {
    id: String,
    bus: EventBus,
    fetcher: Arc<dyn AssetFetcher>,
    effects: Arc<dyn PresentationEffects>,
    fragment: Arc<dyn FragmentStore>,
    state: Mutex<State>,
}

/// One gallery engine instance. Cheap to clone; clones share state. All
/// operations are non-blocking: loads and timers run on the ambient tokio
/// runtime and report back through the event bus.
#[derive(Clone)]
pub struct Gallery {
    inner: Arc<Inner>,
}

impl Gallery {
    pub fn new(
        id: impl Into<String>,
        fetcher: Arc<dyn AssetFetcher>,
        effects: Arc<dyn PresentationEffects>,
        fragment: Arc<dyn FragmentStore>,
    ) -> Self {
        let id = id.into();
        Self {
            inner: Arc::new(Inner {
                bus: EventBus::new(id.clone()),
                id,
                fetcher,
                effects,
                fragment,
                state: Mutex::new(State::new()),
            }),
        }
    }

    /// An instance with instant loads, no presentation effects, and an
    /// in-memory fragment store.
    pub fn headless(id: impl Into<String>) -> Self {
        Self::new(
            id,
            Arc::new(InstantFetcher::default()),
            Arc::new(NoEffects),
            Arc::new(MemoryFragment::default()),
        )
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap()
    }

    fn emit(&self, event: GalleryEvent) {
        let debug_enabled = self.state().options.debug;
        self.inner.bus.emit(event, debug_enabled);
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GalleryEvent> {
        self.inner.bus.subscribe()
    }

    /// Writes the event name and payload to the diagnostic sink when
    /// `config.debug` is set; a no-op otherwise.
    pub fn log(&self, event: &str, data: Option<&dyn fmt::Debug>) {
        if self.state().options.debug {
            debug!(id = %self.inner.id, event, payload = ?data, "gallery log");
        }
    }

    // ---- configuration -----------------------------------------------------

    /// Merges a partial configuration over the defaults. First write wins:
    /// once a configuration has been resolved, later calls return it
    /// unchanged. Emits `ConfigLoad` with the resolved options.
    pub fn set_options(&self, patch: Option<&OptionsPatch>) -> Options {
        let resolved = {
            let mut st = self.state();
            if st.options_loaded {
                return st.options.clone();
            }
            if let Some(patch) = patch {
                patch.merge_into(&mut st.options);
                st.options_loaded = true;
            }
            st.options.clone()
        };
        self.emit(GalleryEvent::ConfigLoad(resolved.clone()));
        resolved
    }

    pub fn options(&self) -> Options {
        self.state().options.clone()
    }

    pub fn theme(&self) -> String {
        self.state().options.theme.clone()
    }

    /// Flips a surface's configured visibility. Only the panel surface
    /// carries one.
    pub fn toggle(&self, surface: Surface) {
        let mut st = self.state();
        match surface {
            Surface::Panel => st.options.panel.visible = !st.options.panel.visible,
            Surface::Modal | Surface::Image => {
                debug!(surface = %surface, "surface has no visibility option");
            }
        }
    }

    // ---- items -------------------------------------------------------------

    /// Normalizes the raw item list. First write wins, same as
    /// [`set_options`](Self::set_options). Emits `ParseImages` with the final
    /// list once complete.
    pub fn set_items(&self, raw: Option<&[RawItem]>) {
        let parsed = {
            let mut st = self.state();
            let Some(raw) = raw else { return };
            if st.items_loaded {
                return;
            }
            st.items = items::normalize_items(raw, &st.options);
            st.items_loaded = true;
            st.items.clone()
        };
        self.emit(GalleryEvent::ParseImages(parsed));
    }

    pub fn items(&self) -> Vec<Item> {
        self.state().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.state().items.len() <= 1
    }

    /// The currently selected item.
    pub fn file(&self) -> Option<Item> {
        let st = self.state();
        st.items.get(st.selected).cloned()
    }

    /// Download URL for the current selection (its modal source).
    pub fn download_link(&self) -> Option<String> {
        let st = self.state();
        st.items.get(st.selected).map(|f| f.source.modal.clone())
    }

    // ---- selection & navigation --------------------------------------------

    /// Wraps an arbitrary integer into `[0, len - 1]`. Total and idempotent:
    /// one past the end maps to 0, -1 maps to the last index, and arbitrary
    /// magnitudes wrap the same way.
    pub fn normalize(&self, index: i64) -> usize {
        normalize_index(index, self.state().items.len())
    }

    pub fn selected(&self) -> usize {
        self.state().selected
    }

    pub fn direction(&self) -> Direction {
        self.state().direction
    }

    /// Writes the normalized selection. Emits `ChangeImage` only when the
    /// value actually changes, with the previous item as the payload's file;
    /// always re-triggers the preload pass.
    pub fn set_selected(&self, index: i64) {
        let change = {
            let mut st = self.state();
            let v = normalize_index(index, st.items.len());
            let change = (v != st.selected).then(|| SelectionRef {
                index: v,
                file: st.items.get(st.selected).cloned(),
            });
            st.selected = v;
            change
        };
        if let Some(payload) = change {
            self.emit(GalleryEvent::ChangeImage(payload));
        }
        self.preload(None);
    }

    /// Selection from an explicit user action: stops autoplay and infers the
    /// direction from the index comparison before selecting.
    pub fn select(&self, index: i64) {
        self.autoplay_stop();
        {
            let mut st = self.state();
            st.direction = if index > st.selected as i64 {
                Direction::Forward
            } else {
                Direction::Backward
            };
        }
        self.set_selected(index);
    }

    pub fn to_forward(&self, stop: bool) {
        if stop {
            self.autoplay_stop();
        }
        self.state().direction = Direction::Forward;
        let next = self.selected() as i64 + 1;
        self.set_selected(next);
        // eagerly warm the slide beyond the new selection
        self.load_image(Some(self.selected() as i64 + 1));
        self.set_hash();
        self.set_focus();
    }

    pub fn to_backward(&self, stop: bool) {
        if stop {
            self.autoplay_stop();
        }
        self.state().direction = Direction::Backward;
        let prev = self.selected() as i64 - 1;
        self.set_selected(prev);
        self.load_image(Some(self.selected() as i64 - 1));
        self.set_hash();
        self.set_focus();
    }

    pub fn to_first(&self, stop: bool) {
        if stop {
            self.autoplay_stop();
        }
        self.state().direction = Direction::Backward;
        self.set_selected(0);
        self.set_hash();
    }

    pub fn to_last(&self, stop: bool) {
        if stop {
            self.autoplay_stop();
        }
        let last = {
            let mut st = self.state();
            st.direction = Direction::Forward;
            st.items.len() as i64 - 1
        };
        self.set_selected(last);
        self.set_hash();
    }

    // ---- modal surface -----------------------------------------------------

    pub fn modal_visible(&self) -> bool {
        self.state().visible
    }

    /// Externally-supplied readiness flag; `modal_open` is gated on it.
    pub fn set_modal_available(&self, available: bool) {
        self.state().modal_available = available;
    }

    pub fn modal_available(&self) -> bool {
        self.state().modal_available
    }

    /// Toggling to visible preloads with a minimal delay, schedules the
    /// one-time modal wiring, and applies the visibility effect; toggling to
    /// hidden only reverses the visibility effect.
    pub fn set_modal_visible(&self, visible: bool) {
        self.state().visible = visible;
        if visible {
            self.preload(Some(VISIBLE_PRELOAD_DELAY));
            self.modal_init();
            self.inner.effects.apply_visibility_effect(true);
        } else {
            self.inner.effects.apply_visibility_effect(false);
        }
    }

    fn modal_init(&self) {
        let gallery = self.clone();
        schedule::defer(MODAL_INIT_DELAY, move || {
            gallery.inner.effects.wire_modal();
            gallery.set_focus();
        });
    }

    /// Opens the modal surface at `index` (current selection when `None`).
    /// A no-op while the modal surface is unavailable.
    pub fn modal_open(&self, index: Option<usize>) {
        if !self.state().modal_available {
            return;
        }
        if let Some(index) = index {
            self.set_selected(index as i64);
        }
        self.set_modal_visible(true);
        self.set_hash();
        let index = self.selected();
        self.emit(GalleryEvent::ModalOpen { index });
    }

    pub fn modal_close(&self) {
        self.inner.fragment.clear();
        self.set_modal_visible(false);
        let index = self.selected();
        self.emit(GalleryEvent::ModalClose { index });
    }

    pub fn set_focus(&self) {
        self.inner.effects.request_focus();
    }

    // ---- URL fragment ------------------------------------------------------

    /// Writes the `"<slug>-<identity>-<oneBasedIndex>"` fragment, but only
    /// while the modal surface is visible.
    pub fn set_hash(&self) {
        let frag = {
            let st = self.state();
            if !st.visible {
                return;
            }
            fragment::encode(&self.inner.id, st.selected)
        };
        self.inner.fragment.set(frag);
    }

    /// Re-evaluates a selection encoded in the URL fragment. A fragment for
    /// this instance selects and opens the modal after a short deferred tick;
    /// anything else is silently ignored.
    pub fn apply_fragment(&self) {
        let Some(hash) = self.inner.fragment.get() else {
            return;
        };
        let Some(index) = fragment::parse(&hash, &self.inner.id) else {
            return;
        };
        let gallery = self.clone();
        schedule::defer(FRAGMENT_APPLY_DELAY, move || {
            gallery.set_selected(index as i64);
            gallery.modal_open(Some(index));
        });
    }

    // ---- asset loading -----------------------------------------------------

    /// Begins loading an item's image and modal variants. Missing indexes are
    /// a logged diagnostic, items whose modal variant already completed are
    /// never reloaded.
    pub fn load_image(&self, index: Option<i64>) {
        let (idx, image_url, modal_url) = {
            let st = self.state();
            let raw = index.unwrap_or(st.selected as i64);
            let idx = normalize_index(raw, st.items.len());
            let Some(item) = st.items.get(idx) else {
                if st.options.debug {
                    debug!(id = %self.inner.id, index = raw, "invalid file index");
                }
                return;
            };
            if item.loaded.modal {
                return;
            }
            (
                idx,
                item.source.image.clone(),
                item.source.modal.clone(),
            )
        };
        self.spawn_fetch(idx, Surface::Image, image_url);
        self.spawn_fetch(idx, Surface::Modal, modal_url);
    }

    /// Fires `load_image` for each index; no ordering between them.
    pub fn load_images(&self, indexes: &[usize]) {
        for &index in indexes {
            self.load_image(Some(index as i64));
        }
    }

    /// Panel hover warms an item ahead of a click.
    pub fn hover_preload(&self, index: i64) {
        self.load_image(Some(index));
    }

    fn spawn_fetch(&self, index: usize, surface: Surface, url: String) {
        let gallery = self.clone();
        let fut = self.inner.fetcher.fetch(&url);
        tokio::spawn(async move {
            let asset = fut.await;
            gallery.after_load(index, surface, asset);
        });
    }

    /// Completion handler, idempotent per `(index, surface)`. The modal
    /// variant's completion enriches the item with dimensions, file name,
    /// extension, and download URL. The very first completion across the
    /// instance's lifetime additionally emits `FirstImage`.
    fn after_load(&self, index: usize, surface: Surface, asset: Asset) {
        let (payload, first) = {
            let mut st = self.state();
            let selected = st.selected;
            let Some(item) = st.items.get_mut(index) else {
                return;
            };
            if item.loaded.surface(surface) {
                return;
            }
            item.loaded.mark(surface);
            if surface == Surface::Modal {
                item.width = Some(asset.width);
                item.height = Some(asset.height);
                item.name = Some(items::trailing_segment(&item.source.modal).to_owned());
                item.extension = Some(items::extension(&item.source.modal).to_owned());
                item.download = Some(item.source.modal.clone());
            }
            let payload = LoadedRef {
                surface,
                index,
                file: st.items.get(selected).cloned(),
                asset,
            };
            let first = !st.first;
            st.first = true;
            (payload, first)
        };
        if first {
            self.emit(GalleryEvent::FirstImage(payload.clone()));
        }
        self.emit(GalleryEvent::LoadImage(payload));
    }

    // ---- preload scheduling ------------------------------------------------

    /// Immediately loads the current item, then schedules a load of the next
    /// one after `wait` (the configured preload delay by default). Stale
    /// deferred loads are left to complete; the loader's load-state check
    /// makes them no-ops.
    pub fn preload(&self, wait: Option<Duration>) {
        self.load_image(None);
        let delay = wait.unwrap_or_else(|| self.state().options.preload_delay);
        let gallery = self.clone();
        schedule::defer(delay, move || {
            let next = gallery.selected() as i64 + 1;
            gallery.load_image(Some(next));
        });
    }

    // ---- autoplay ----------------------------------------------------------

    /// Starts the recurring forward tick. A no-op when already running.
    pub fn autoplay_start(&self) {
        {
            let mut st = self.state();
            if st.autoplay.is_some() {
                return;
            }
            st.options.autoplay.enabled = true;
            let gallery = self.clone();
            st.autoplay = Some(schedule::every(st.options.autoplay.delay, move || {
                gallery.to_forward(false);
            }));
        }
        let payload = self.state().selection_ref();
        self.emit(GalleryEvent::AutoplayStart(payload));
    }

    /// Cancels the recurring tick before clearing its handle, so a stopped
    /// autoplay never fires again. A no-op when not running.
    pub fn autoplay_stop(&self) {
        {
            let mut st = self.state();
            let Some(handle) = st.autoplay.take() else {
                return;
            };
            handle.cancel();
            st.options.autoplay.enabled = false;
        }
        let payload = self.state().selection_ref();
        self.emit(GalleryEvent::AutoplayStop(payload));
    }

    pub fn autoplay_toggle(&self) {
        if self.state().options.autoplay.enabled {
            self.autoplay_stop();
        } else {
            self.autoplay_start();
        }
    }

    pub fn autoplay_running(&self) -> bool {
        self.state().autoplay.is_some()
    }
}

fn normalize_index(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.rem_euclid(len as i64) as usize
}
