//! Embeddable media-gallery/carousel state engine. Tracks the selected item,
//! loads image assets around the current position, runs optional autoplay,
//! and emits lifecycle events that presentation layers subscribe to. Multiple
//! independent instances coexist, addressed through a [`registry::Registry`].

pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod fetch;
pub mod fragment;
pub mod gallery;
pub mod items;
pub mod registry;
pub mod schedule;

pub use config::{Manifest, Options, OptionsPatch};
pub use error::Error;
pub use events::GalleryEvent;
pub use gallery::{Direction, Gallery};
pub use items::{Item, RawItem, Surface};
pub use registry::{InstanceRequest, Registry};
