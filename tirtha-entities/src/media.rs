use strum::{Display, EnumString};

use crate::{id::Id, PLACEHOLDER_IMAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id            : Id,
    pub kind          : MediaKind,
    pub url           : String,
    pub thumbnail_url : Option<String>,
    pub title         : Option<String>,
    pub description   : Option<String>,
}

impl MediaItem {
    /// An image that serves as its own thumbnail.
    pub fn image(id: impl Into<Id>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            kind: MediaKind::Image,
            thumbnail_url: Some(url.clone()),
            url,
            title: None,
            description: None,
        }
    }
}

/// Pick the thumbnail of a media list: the first item or the placeholder.
pub fn thumbnail_of(media: &[MediaItem]) -> String {
    media
        .first()
        .map(|item| item.thumbnail_url.as_ref().unwrap_or(&item.url).clone())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}
