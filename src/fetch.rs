use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::{debug, warn};

/// A successfully loaded asset: the URL it came from plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

pub type FetchFuture = Pin<Box<dyn Future<Output = Asset> + Send>>;

/// "Begin loading a URL and observe success." Failure signalling is outside
/// the engine's contract: an implementation that cannot produce the asset
/// simply never completes, and the item stays unloaded.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FetchFuture;
}

/// Completes immediately with fixed dimensions. Useful for hosts that only
/// need the state machine, and for tests.
#[derive(Debug, Clone, Copy)]
pub struct InstantFetcher {
    pub width: u32,
    pub height: u32,
}

impl Default for InstantFetcher {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl AssetFetcher for InstantFetcher {
    fn fetch(&self, url: &str) -> FetchFuture {
        let asset = Asset {
            url: url.to_owned(),
            width: self.width,
            height: self.height,
        };
        Box::pin(async move { asset })
    }
}

/// Treats URLs as filesystem paths relative to a base directory and reads the
/// image header for dimensions. Undecodable paths never complete.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base: PathBuf,
}

impl FileFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl AssetFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> FetchFuture {
        let path = self.base.join(url);
        let url = url.to_owned();
        Box::pin(async move {
            let probe = path.clone();
            let dims = tokio::task::spawn_blocking(move || image::image_dimensions(&probe))
                .await
                .ok()
                .and_then(Result::ok);
            match dims {
                Some((width, height)) => {
                    debug!(url = %url, width, height, "asset loaded");
                    Asset { url, width, height }
                }
                None => {
                    warn!(path = %path.display(), "unreadable asset, load never completes");
                    std::future::pending().await
                }
            }
        })
    }
}
