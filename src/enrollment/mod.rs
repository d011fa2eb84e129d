// ============================================================================
// Enrollment Core
// ============================================================================
//
// The three membership use cases (enroll, transfer, cancel) and the error
// taxonomy shared with the customer directory and course catalog.
//
// ============================================================================

pub mod errors;
pub mod service;

pub use errors::{CourseKey, CustomerKey, EnrollmentError, EnrollmentResult};
pub use service::{CancelOutcome, EnrollmentService, DEFAULT_NOTIFICATION_TIMEOUT};
