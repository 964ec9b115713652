//! Background descriptors and the observable fetch status.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where a document's background image comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Background {
    /// No background image.
    #[default]
    Blank,
    /// An image fetched from a URL.
    RemoteUrl(Url),
    /// An encoded image stored inside the document.
    EmbeddedBytes(Vec<u8>),
}

impl Background {
    /// The URL, if this is a remote background.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::RemoteUrl(url) => Some(url),
            _ => None,
        }
    }

    /// The embedded bytes, if this is an embedded background.
    #[must_use]
    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Self::EmbeddedBytes(data) => Some(data),
            _ => None,
        }
    }

    /// Whether this is the blank background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank"),
            Self::RemoteUrl(url) => write!(f, "url {url}"),
            Self::EmbeddedBytes(data) => write!(f, "embedded image ({} bytes)", data.len()),
        }
    }
}

/// Progress of the background image fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "url", rename_all = "lowercase")]
pub enum FetchStatus {
    /// Nothing in flight; the current image (if any) is final.
    #[default]
    Idle,
    /// A remote image is being fetched.
    Fetching,
    /// The remote image at this URL could not be loaded.
    Failed(Url),
}

impl FetchStatus {
    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Fetching => f.write_str("fetching"),
            Self::Failed(url) => write!(f, "failed ({url})"),
        }
    }
}

/// Query parameter that search-result links use to wrap the real image URL.
const WRAPPED_IMAGE_PARAM: &str = "imgurl";

/// Unwrap the actual image URL from a dropped or pasted link.
///
/// Links copied from image search results point at a result page and carry
/// the image location in an `imgurl` query parameter. If that parameter holds
/// an absolute URL it is returned; otherwise the input is returned unchanged.
#[must_use]
pub fn normalize_image_url(url: &Url) -> Url {
    url.query_pairs()
        .find(|(key, _)| key == WRAPPED_IMAGE_PARAM)
        .and_then(|(_, value)| Url::parse(&value).ok())
        .unwrap_or_else(|| url.clone())
}
