// ============================================================================
// Course Domain
// ============================================================================
//
// - Value objects (CourseId)
// - Aggregate (Course with its cached participant count and back-references)
//
// ============================================================================

pub mod value_objects;
pub mod aggregate;

pub use value_objects::*;
pub use aggregate::*;
