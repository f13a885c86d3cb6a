/// Posts are keyed by the CMS-assigned string identifier.
pub type PostId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
