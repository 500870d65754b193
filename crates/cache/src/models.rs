/// One cached video, exactly as persisted in the `videos` table.
///
/// The `url` is the row identity: writing a record whose `url` already exists
/// overwrites that row in place. `updated` is kept as the verbatim timestamp
/// string the playlist endpoint sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct VideoRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub updated: String,
    pub thumbnail: String,
}
