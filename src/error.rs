use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fetch failed for {league}: {reason}")]
    Fetch { league: String, reason: String },
    #[error("invalid scoreboard json for {league}")]
    InvalidJson {
        league: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("event missing `{0}`")]
    MissingField(&'static str),
    #[error("event has {0} competitors, expected at least 2")]
    Competitors(usize),
    #[error("malformed event: {0}")]
    Shape(#[from] serde_json::Error),
}
