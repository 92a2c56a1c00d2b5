use std::fmt;

use url::Url;

use crate::error::Error;

/// Position of a row in the feed.  Rows are addressed by index, controllers are
/// created and dropped as the row is mounted and unmounted.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoItem {
    pub url: Url,
    pub title: String,
    pub description: String,
}

impl VideoItem {
    pub fn new(url: Url, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Describes a stream by its locator alone: the title is the last path
    /// segment, the description is the full URL.
    pub fn from_stream(stream: &str) -> Result<Self, Error> {
        let url = Url::parse(stream)?;
        let title = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_owned();
        let description = url.to_string();
        Ok(Self {
            url,
            title,
            description,
        })
    }
}
