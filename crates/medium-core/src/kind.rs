//! Media kinds and the names derived from them.
//!
//! Every string that used to be assembled from a kind name (author keys,
//! state keys, dictionary keys) comes out of an exhaustive `match` here.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::{SmolStr, format_smolstr};

const MACHINE_PREFIX: &str = "H5P.";

/// Discriminator selecting which derivation rules apply.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    /// Any other content library. Its parameters pass through untouched.
    Other(SmolStr),
}

impl MediaKind {
    /// Parse from a library string such as `"H5P.Image 1.1"`.
    ///
    /// Returns `None` when the library string carries no machine name.
    pub fn from_library(library: &str) -> Option<Self> {
        let machine_name = library.split(' ').next().unwrap_or_default();
        Self::from_machine_name(machine_name)
    }

    /// Parse from a machine name such as `"H5P.Audio"`.
    pub fn from_machine_name(machine_name: &str) -> Option<Self> {
        let tag = machine_name
            .strip_prefix(MACHINE_PREFIX)
            .unwrap_or(machine_name);
        Self::from_tag(tag)
    }

    /// Parse from a bare tag such as `"Video"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "" => None,
            "Image" => Some(MediaKind::Image),
            "Audio" => Some(MediaKind::Audio),
            "Video" => Some(MediaKind::Video),
            other => Some(MediaKind::Other(SmolStr::new(other))),
        }
    }

    /// Tag used as the key of persisted view fields.
    pub fn tag(&self) -> &str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Audio => "Audio",
            MediaKind::Video => "Video",
            MediaKind::Other(tag) => tag,
        }
    }

    pub fn machine_name(&self) -> SmolStr {
        format_smolstr!("{MACHINE_PREFIX}{}", self.tag())
    }

    /// Key of this kind's view-field record in author parameters.
    ///
    /// Only the kinds with derivation rules have an author record.
    pub fn author_key(&self) -> Option<&'static str> {
        match self {
            MediaKind::Image => Some("viewFieldsImage"),
            MediaKind::Audio => Some("viewFieldsAudio"),
            MediaKind::Video => Some("viewFieldsVideo"),
            MediaKind::Other(_) => None,
        }
    }

    /// Dictionary key of the localized type name, e.g. `a11y.image`.
    pub fn a11y_key(&self) -> SmolStr {
        format_smolstr!("a11y.{}", self.tag().to_lowercase())
    }

    /// Kinds that own an author record, in declaration order.
    pub fn with_view_fields() -> [MediaKind; 3] {
        [MediaKind::Image, MediaKind::Audio, MediaKind::Video]
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for MediaKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for MediaKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = SmolStr::deserialize(deserializer)?;
        MediaKind::from_tag(&tag).ok_or_else(|| serde::de::Error::custom("empty media kind"))
    }
}
