/// All primary keys are PostgreSQL UUIDs (`gen_random_uuid()`).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The two kinds of people the back office numbers and lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Member,
    Employee,
}

impl EntityKind {
    /// Single-letter prefix of the kind's sequential codes.
    pub fn code_prefix(self) -> char {
        match self {
            EntityKind::Member => 'M',
            EntityKind::Employee => 'E',
        }
    }

    /// Human-readable entity name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Member => "Member",
            EntityKind::Employee => "Employee",
        }
    }
}
