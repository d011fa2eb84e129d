// ============================================================================
// Persistence Collaborators
// ============================================================================
//
// Store contracts the enrollment core depends on, the in-memory
// implementations used by the binary and the tests, and the unit of work
// that stages writes until an operation commits.
//
// Every `save` is an optimistic write: the entity's `version` must match the
// stored row (0 for a row that does not exist yet) and the returned copy
// carries the bumped version. `restore` is the one unchecked write and only
// undoes a commit that failed part-way.
//
// ============================================================================

pub mod traits;
pub mod in_memory;
pub mod unit_of_work;

#[cfg(test)]
pub(crate) mod testing;

pub use traits::{CourseStore, CustomerStore, StoreError};
pub use in_memory::{InMemoryCourseStore, InMemoryCustomerStore};
pub use unit_of_work::{CommittedWork, Stores, UnitOfWork};
