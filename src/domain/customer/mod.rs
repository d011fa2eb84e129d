// ============================================================================
// Customer Domain
// ============================================================================
//
// - Value objects (CustomerId, Email, PhoneNumber, Gender)
// - Errors (CustomerError, field validation on registration)
// - Aggregate (Customer with its side of every membership)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
