use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Options;

/// Rendering surface a URL variant belongs to. The modal surface carries the
/// original-size asset, the panel surface the thumbnail, the image surface the
/// inline medium size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Modal,
    Panel,
    Image,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modal => "modal",
            Self::Panel => "panel",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied source triple; at least one surface URL must be present.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawSource {
    #[serde(default)]
    pub modal: Option<String>,
    #[serde(default)]
    pub panel: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One element of the caller's item list: either a bare URL (treated as the
/// modal-surface source) or a structured record. Records without an explicit
/// `source` get one synthesized from the fields named by the configured
/// field mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawItem {
    Url(String),
    Record(RawRecord),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

impl RawRecord {
    fn field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    }
}

/// Resolved source triple; every surface has a URL after fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub modal: String,
    pub panel: String,
    pub image: String,
}

impl Source {
    pub fn surface(&self, surface: Surface) -> &str {
        match surface {
            Surface::Modal => &self.modal,
            Surface::Panel => &self.panel,
            Surface::Image => &self.image,
        }
    }
}

/// Per-surface load completion flags. Set permanently on first completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadedMap {
    pub modal: bool,
    pub panel: bool,
    pub image: bool,
}

impl LoadedMap {
    pub fn surface(&self, surface: Surface) -> bool {
        match surface {
            Surface::Modal => self.modal,
            Surface::Panel => self.panel,
            Surface::Image => self.image,
        }
    }

    pub(crate) fn mark(&mut self, surface: Surface) {
        match surface {
            Surface::Modal => self.modal = true,
            Surface::Panel => self.panel = true,
            Surface::Image => self.image = true,
        }
    }
}

/// A normalized gallery item. Created once during normalization and enriched
/// in place as loads complete; never removed for the instance's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub source: Source,
    pub title: String,
    pub description: Option<String>,
    /// File name, known once the modal variant has loaded.
    pub name: Option<String>,
    /// File extension, known once the modal variant has loaded.
    pub extension: Option<String>,
    pub download: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub loaded: LoadedMap,
}

pub(crate) fn normalize_items(raw: &[RawItem], options: &Options) -> Vec<Item> {
    let mut items = Vec::with_capacity(raw.len());

    for entry in raw {
        let (raw_source, record) = match entry {
            RawItem::Url(url) => (
                RawSource {
                    modal: Some(url.clone()),
                    ..RawSource::default()
                },
                None,
            ),
            RawItem::Record(record) => {
                let source = record.source.clone().unwrap_or_else(|| RawSource {
                    modal: record.field(&options.fields.source.modal),
                    panel: record.field(&options.fields.source.panel),
                    image: record.field(&options.fields.source.image),
                });
                (source, Some(record))
            }
        };

        let Some(source) = resolve_source(&raw_source, &options.base_url) else {
            warn!("item without any source url, skipped");
            continue;
        };

        let filename = trailing_segment(&source.modal).to_owned();
        let title = record
            .and_then(|r| r.field(&options.fields.title))
            .filter(|t| !t.is_empty())
            .unwrap_or(filename);
        let description = record.and_then(|r| r.field(&options.fields.description));

        items.push(Item {
            source,
            title,
            description,
            name: None,
            extension: None,
            download: None,
            width: None,
            height: None,
            loaded: LoadedMap::default(),
        });
    }

    items
}

/// Substitutes present surface URLs for missing ones: panel falls back to
/// image then modal, image to modal then panel, modal to image then panel.
/// Returns `None` when no surface has a URL at all.
fn resolve_source(src: &RawSource, base_url: &str) -> Option<Source> {
    let modal = src
        .modal
        .as_deref()
        .or(src.image.as_deref())
        .or(src.panel.as_deref())?;
    let panel = src.panel.as_deref().or(src.image.as_deref()).unwrap_or(modal);
    let image = src.image.as_deref().or(src.modal.as_deref()).unwrap_or(modal);

    Some(Source {
        modal: format!("{base_url}{modal}"),
        panel: format!("{base_url}{panel}"),
        image: format!("{base_url}{image}"),
    })
}

pub(crate) fn trailing_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

pub(crate) fn extension(url: &str) -> &str {
    url.rsplit('.').next().unwrap_or(url)
}
