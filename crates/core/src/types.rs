/// All entity identifiers are v4 UUIDs assigned by the engine at creation.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Due dates carry no time-of-day component.
pub type DueDate = chrono::NaiveDate;
