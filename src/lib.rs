// ============================================================================
// Course Enrollment
// ============================================================================
//
// Customers, courses and the memberships between them.
//
// - domain/       - Customer and Course aggregates, membership primitives
// - store/        - Store contracts, in-memory stores, unit of work
// - notification/ - Outbound notification gateway
// - enrollment/   - Enroll, transfer and cancel use cases
// - directory/    - Customer and course CRUD
// - metrics/      - Prometheus metrics and their HTTP endpoint
//
// ============================================================================

pub mod config;
pub mod directory;
pub mod domain;
pub mod enrollment;
pub mod metrics;
pub mod notification;
pub mod store;

pub use config::AppConfig;
pub use directory::{CourseCatalog, CustomerDirectory};
pub use domain::{Course, CourseId, Customer, CustomerId, Email, Gender, PhoneNumber};
pub use enrollment::{CancelOutcome, EnrollmentError, EnrollmentResult, EnrollmentService};
pub use metrics::Metrics;
pub use notification::{LoggingNotificationGateway, NotificationGateway};
pub use store::{Stores, UnitOfWork};
