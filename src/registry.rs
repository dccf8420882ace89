//! Identity derivation and the identity→instance map. The registry is owned
//! by the hosting application and injected where needed; repeated
//! `get_instance` calls from re-renders are safe because options, items, and
//! selection application are all idempotent on the instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::OptionsPatch;
use crate::effects::{NoEffects, PresentationEffects};
use crate::fetch::{AssetFetcher, InstantFetcher};
use crate::fragment::{FragmentStore, MemoryFragment};
use crate::gallery::Gallery;
use crate::items::RawItem;

/// What a presentation collaborator hands over when it wants its engine.
#[derive(Debug, Clone, Default)]
pub struct InstanceRequest {
    /// Explicit identity, when the host assigns one.
    pub id: Option<String>,
    /// Identity inherited from a known ancestor context.
    pub parent_id: Option<String>,
    pub options: Option<OptionsPatch>,
    pub items: Option<Vec<RawItem>>,
    pub selected: Option<usize>,
}

pub struct Registry {
    fetcher: Arc<dyn AssetFetcher>,
    effects: Arc<dyn PresentationEffects>,
    fragment: Arc<dyn FragmentStore>,
    instances: Mutex<HashMap<String, Gallery>>,
}

impl Registry {
    pub fn new(
        fetcher: Arc<dyn AssetFetcher>,
        effects: Arc<dyn PresentationEffects>,
        fragment: Arc<dyn FragmentStore>,
    ) -> Self {
        Self {
            fetcher,
            effects,
            fragment,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with instant loads and no presentation wiring.
    pub fn headless() -> Self {
        Self::new(
            Arc::new(InstantFetcher::default()),
            Arc::new(NoEffects),
            Arc::new(MemoryFragment::default()),
        )
    }

    /// Identity for a request: explicit id, else inherited ancestor id, else
    /// a deterministic hash of the configuration.
    pub fn identity(&self, request: &InstanceRequest) -> String {
        request
            .id
            .clone()
            .or_else(|| request.parent_id.clone())
            .unwrap_or_else(|| object_hash_id(request.options.as_ref()))
    }

    /// Returns the one engine instance for the request's identity, creating
    /// it on first sight, then re-applies the request's configuration, items,
    /// and selection, re-evaluates the URL fragment, and kicks off configured
    /// preloads and autoplay.
    pub fn get_instance(&self, request: &InstanceRequest) -> Gallery {
        let id = self.identity(request);
        let gallery = {
            let mut instances = self.instances.lock().unwrap();
            instances
                .entry(id.clone())
                .or_insert_with(|| {
                    debug!(id = %id, "creating gallery instance");
                    Gallery::new(
                        id.clone(),
                        self.fetcher.clone(),
                        self.effects.clone(),
                        self.fragment.clone(),
                    )
                })
                .clone()
        };

        gallery.set_options(request.options.as_ref());
        gallery.set_items(request.items.as_deref());
        gallery.set_selected(request.selected.unwrap_or(0) as i64);
        gallery.apply_fragment();

        let options = gallery.options();
        gallery.load_images(&options.preload);
        if options.autoplay.enabled && !gallery.autoplay_running() {
            gallery.autoplay_start();
        }

        gallery
    }
}

/// Deterministic string hash of a configuration: position-weighted character
/// code sum over the alphanumeric bytes of the serialized form, rendered in
/// base 21. Matches nothing cryptographic; it only has to be stable and
/// collision-resistant enough to tell configurations apart.
pub fn object_hash_id(options: Option<&OptionsPatch>) -> String {
    let serialized = options
        .and_then(|o| serde_yaml::to_string(o).ok())
        .unwrap_or_default();
    let mut code: u64 = 0;
    for (i, byte) in serialized
        .bytes()
        .filter(u8::is_ascii_alphanumeric)
        .enumerate()
    {
        code = code.wrapping_add(byte as u64 * i as u64);
    }
    to_radix(code, 21)
}

fn to_radix(mut value: u64, radix: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijk";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % radix) as usize]);
        value /= radix;
    }
    out.reverse();
    String::from_utf8(out).expect("radix digits are ascii")
}
