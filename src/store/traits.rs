use async_trait::async_trait;

use crate::domain::{Course, CourseId, Customer, CustomerId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Concurrent modification of {entity} {id}: expected version {expected}, found {found}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("Duplicate {entity} key: {key}")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Customer persistence, keyed by id with last/first name lookups
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;

    /// First match when several customers share the last name
    async fn find_by_last_name(&self, last_name: &str) -> Result<Option<Customer>, StoreError>;

    async fn find_by_first_name(&self, first_name: &str) -> Result<Option<Customer>, StoreError>;

    async fn save(&self, customer: Customer) -> Result<Customer, StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<Customer>, StoreError>;

    /// Put `previous` back as the row for `id` without a version check, or
    /// remove the row when `previous` is `None`. Used to undo a failed commit.
    async fn restore(&self, id: CustomerId, previous: Option<Customer>) -> Result<(), StoreError>;
}

/// Course persistence, keyed by id with name lookup
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>, StoreError>;

    async fn save(&self, course: Course) -> Result<Course, StoreError>;

    async fn delete(&self, course: &Course) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<Course>, StoreError>;

    /// Same contract as `CustomerStore::restore`
    async fn restore(&self, id: CourseId, previous: Option<Course>) -> Result<(), StoreError>;
}
