use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::items::RawItem;

/// Theme names the presentation layers may style against.
pub const THEMES: &[&str] = &["default", "darkblue", "whitegold"];

/// Sizing modes for the modal and image surfaces.
pub const SIZES: &[&str] = &["contain", "cover", "auto", "stretch"];

/// Transition effect names. The engine only exposes which one is configured;
/// running the effect is the presentation layer's job.
pub const TRANSITIONS: &[&str] = &[
    "no",
    "fadeInOut",
    "zoomIn",
    "zoomOut",
    "zoomInOut",
    "rotateLR",
    "rotateTB",
    "rotateZY",
    "slideLR",
    "slideTB",
    "flipX",
    "flipY",
];

/// Complete engine configuration. `Default` supplies every engine default;
/// callers never build this directly but merge an [`OptionsPatch`] over it.
/// Session-stable once resolved for an instance, except for the fields engine
/// operations mutate at runtime (`autoplay.enabled`, `panel.visible`).
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub debug: bool,
    pub base_url: String,
    pub fields: FieldMap,
    pub autoplay: AutoplayOptions,
    pub theme: String,
    pub preload_delay: Duration,
    /// Item indexes to load eagerly when the instance is obtained.
    pub preload: Vec<usize>,
    pub modal: ModalOptions,
    pub panel: PanelOptions,
    pub image: ImageOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            base_url: String::new(),
            fields: FieldMap::default(),
            autoplay: AutoplayOptions::default(),
            theme: "default".into(),
            preload_delay: Duration::from_millis(770),
            preload: Vec::new(),
            modal: ModalOptions::default(),
            panel: PanelOptions::default(),
            image: ImageOptions::default(),
        }
    }
}

/// Field names consulted when a raw item record carries no `source` record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    pub source: SourceFields,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            source: SourceFields::default(),
            title: "title".into(),
            description: "description".into(),
            thumbnail: "thumbnail".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFields {
    pub modal: String,
    pub panel: String,
    pub image: String,
}

impl Default for SourceFields {
    fn default() -> Self {
        Self {
            modal: "url".into(),
            panel: "url".into(),
            image: "url".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoplayOptions {
    pub enabled: bool,
    pub delay: Duration,
}

impl Default for AutoplayOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            delay: Duration::from_millis(4100),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalOptions {
    pub title: String,
    pub subtitle: String,
    pub caption: bool,
    pub menu: bool,
    pub help: bool,
    pub transition: String,
    pub size: String,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            caption: true,
            menu: true,
            help: false,
            transition: "slideLR".into(),
            size: "cover".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelOptions {
    pub visible: bool,
    pub item: PanelItemOptions,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            visible: true,
            item: PanelItemOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelItemOptions {
    pub class: String,
    pub caption: bool,
}

impl Default for PanelItemOptions {
    fn default() -> Self {
        Self {
            class: "col-md-3".into(),
            caption: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub transition: String,
    pub size: String,
    pub height: u32,
    pub height_min: u32,
    pub height_auto: HeightAuto,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            transition: "slideLR".into(),
            size: "cover".into(),
            height: 0,
            height_min: 0,
            height_auto: HeightAuto::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightAuto {
    pub initial: bool,
    pub onresize: bool,
}

impl Default for HeightAuto {
    fn default() -> Self {
        Self {
            initial: true,
            onresize: false,
        }
    }
}

/// Caller-supplied partial configuration. Every leaf is optional; present
/// leaves win over the defaults during the merge, absent leaves fall back.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OptionsPatch {
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub fields: Option<FieldMapPatch>,
    #[serde(default)]
    pub autoplay: Option<AutoplayPatch>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub preload_delay: Option<Duration>,
    #[serde(default)]
    pub preload: Option<Vec<usize>>,
    #[serde(default)]
    pub modal: Option<ModalPatch>,
    #[serde(default)]
    pub panel: Option<PanelPatch>,
    #[serde(default)]
    pub image: Option<ImagePatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FieldMapPatch {
    #[serde(default)]
    pub source: Option<SourceFieldsPatch>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SourceFieldsPatch {
    #[serde(default)]
    pub modal: Option<String>,
    #[serde(default)]
    pub panel: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AutoplayPatch {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, with = "humantime_serde")]
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModalPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub caption: Option<bool>,
    #[serde(default)]
    pub menu: Option<bool>,
    #[serde(default)]
    pub help: Option<bool>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PanelPatch {
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub item: Option<PanelItemPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PanelItemPatch {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub caption: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ImagePatch {
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub height_min: Option<u32>,
    #[serde(default)]
    pub height_auto: Option<HeightAutoPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HeightAutoPatch {
    #[serde(default)]
    pub initial: Option<bool>,
    #[serde(default)]
    pub onresize: Option<bool>,
}

macro_rules! apply {
    ($target:expr, $patch:expr) => {
        if let Some(v) = $patch.clone() {
            $target = v;
        }
    };
}

impl OptionsPatch {
    /// Deep leaf-wins merge into `options`.
    pub fn merge_into(&self, options: &mut Options) {
        apply!(options.debug, self.debug);
        apply!(options.base_url, self.base_url);
        apply!(options.theme, self.theme);
        apply!(options.preload_delay, self.preload_delay);
        apply!(options.preload, self.preload);

        if let Some(fields) = &self.fields {
            if let Some(source) = &fields.source {
                apply!(options.fields.source.modal, source.modal);
                apply!(options.fields.source.panel, source.panel);
                apply!(options.fields.source.image, source.image);
            }
            apply!(options.fields.title, fields.title);
            apply!(options.fields.description, fields.description);
            apply!(options.fields.thumbnail, fields.thumbnail);
        }

        if let Some(autoplay) = &self.autoplay {
            apply!(options.autoplay.enabled, autoplay.enabled);
            apply!(options.autoplay.delay, autoplay.delay);
        }

        if let Some(modal) = &self.modal {
            apply!(options.modal.title, modal.title);
            apply!(options.modal.subtitle, modal.subtitle);
            apply!(options.modal.caption, modal.caption);
            apply!(options.modal.menu, modal.menu);
            apply!(options.modal.help, modal.help);
            apply!(options.modal.transition, modal.transition);
            apply!(options.modal.size, modal.size);
        }

        if let Some(panel) = &self.panel {
            apply!(options.panel.visible, panel.visible);
            if let Some(item) = &panel.item {
                apply!(options.panel.item.class, item.class);
                apply!(options.panel.item.caption, item.caption);
            }
        }

        if let Some(image) = &self.image {
            apply!(options.image.transition, image.transition);
            apply!(options.image.size, image.size);
            apply!(options.image.height, image.height);
            apply!(options.image.height_min, image.height_min);
            if let Some(auto) = &image.height_auto {
                apply!(options.image.height_auto.initial, auto.initial);
                apply!(options.image.height_auto.onresize, auto.onresize);
            }
        }
    }
}

/// Demo-host manifest: a partial configuration plus the item list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub options: Option<OptionsPatch>,
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub selected: Option<usize>,
}

pub fn from_yaml_file(path: &Path) -> Result<Manifest, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&raw)?)
}
