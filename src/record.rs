/// A single commit read from a source repository.
///
/// - `id`: abbreviated commit hash, always 7 characters.
/// - `date`: ISO-8601 timestamp with offset, e.g. `"2023-01-05T10:00:00+01:00"`.
///
/// Records are compared and sorted by `date` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub date: String,
}

/// Length of the abbreviated hash stored in [`CommitRecord::id`].
pub const SHORT_ID_LEN: usize = 7;

impl CommitRecord {
    /// Build a record, truncating `id` to [`SHORT_ID_LEN`] characters.
    pub fn new(id: &str, date: impl Into<String>) -> Self {
        Self {
            id: id.chars().take(SHORT_ID_LEN).collect(),
            date: date.into(),
        }
    }
}
