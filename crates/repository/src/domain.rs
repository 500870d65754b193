use serde::Serialize;
use std::borrow::Cow;

/// Descriptions are shortened to roughly this many characters for list views.
pub const SHORT_DESCRIPTION_LENGTH: usize = 200;

/// A video as shown to the user.
///
/// Always derived from the cache, never stored. A fresh value is built for
/// every emission of [`VideosRepository::videos`](crate::VideosRepository::videos).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DevByteVideo {
    pub url: String,
    pub title: String,
    pub description: String,
    pub updated: String,
    pub thumbnail: String,
}

impl DevByteVideo {
    /// The description cut at a word boundary to at most
    /// [`SHORT_DESCRIPTION_LENGTH`] characters, followed by `...` when
    /// anything was cut.
    pub fn short_description(&self) -> Cow<'_, str> {
        truncate_words(&self.description, SHORT_DESCRIPTION_LENGTH)
    }
}

fn truncate_words(text: &str, limit: usize) -> Cow<'_, str> {
    let Some((cut, _)) = text.char_indices().nth(limit) else {
        return Cow::Borrowed(text);
    };
    fn trim(s: &str) -> &str {
        s.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
    }
    let hard = &text[..cut];
    // Cutting inside a word drops that partial word, unless nothing would be left.
    let soft = match text[cut..].starts_with(char::is_whitespace) {
        true => hard,
        false => hard.rfind(char::is_whitespace).map_or(hard, |i| &hard[..i]),
    };
    let head = match trim(soft) {
        "" => trim(hard),
        soft => soft,
    };
    Cow::Owned(format!("{head}..."))
}
