/// Database row identifier.
pub type DbId = i64;

/// UTC timestamp as stored in and returned from the database.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
