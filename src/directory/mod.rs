// ============================================================================
// Directory Services - customer and course CRUD
// ============================================================================
//
// Plain lookups and writes with no membership logic. Writes still go
// through a unit of work so they serialize with the enrollment core.
//
// ============================================================================

pub mod customers;
pub mod courses;

pub use customers::CustomerDirectory;
pub use courses::CourseCatalog;
