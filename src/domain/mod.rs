// ============================================================================
// Domain Layer - Entities and Membership Rules
// ============================================================================
//
// Each aggregate has its own subdirectory. The membership primitives live
// beside them because they are the only code allowed to edit both sides of
// the customer/course link.
//
// ============================================================================

pub mod customer;
pub mod course;
pub(crate) mod membership;

pub use course::{Course, CourseId};
pub use customer::{Customer, CustomerError, CustomerId, Email, Gender, PhoneNumber};
