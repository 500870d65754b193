use serde::{Deserialize, Serialize};

/// Top-level body returned by the playlist endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkVideoContainer {
    pub videos: Vec<NetworkVideo>,
}

/// One video as described by the playlist endpoint.
///
/// Every field is required. Extra fields (such as `closedCaptions`) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkVideo {
    pub url: String,
    pub title: String,
    pub description: String,
    pub updated: String,
    pub thumbnail: String,
}
