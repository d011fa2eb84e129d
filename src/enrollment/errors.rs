use std::fmt;

use crate::domain::{CourseId, CustomerError, CustomerId};
use crate::store::StoreError;

// ============================================================================
// Enrollment Errors
// ============================================================================
//
// One variant per rejected precondition. Every variant aborts the unit of
// work before anything is written.
//
// ============================================================================

/// How a customer was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerKey {
    LastName(String),
    Id(CustomerId),
}

impl fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastName(name) => write!(f, "lastname {}", name),
            Self::Id(id) => write!(f, "number {}", id),
        }
    }
}

/// How a course was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseKey {
    Name(String),
    Id(CourseId),
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name {}", name),
            Self::Id(id) => write!(f, "number {}", id),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Could not find customer with {0}.")]
    CustomerNotFound(CustomerKey),

    #[error("Could not find course with {0}.")]
    CourseNotFound(CourseKey),

    #[error("Customer with name {0} does already exist.")]
    CustomerAlreadyExists(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Could not send membership mail to {0}.")]
    MembershipNotificationFailed(String),

    #[error("Invalid customer: {0}")]
    InvalidCustomer(#[from] CustomerError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl EnrollmentError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "customer_not_found",
            Self::CourseNotFound(_) => "course_not_found",
            Self::CustomerAlreadyExists(_) => "customer_already_exists",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::MembershipNotificationFailed(_) => "notification_failed",
            Self::InvalidCustomer(_) => "invalid_customer",
            Self::Persistence(_) => "persistence",
        }
    }

    /// True for lookups that found nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CustomerNotFound(_) | Self::CourseNotFound(_))
    }
}

pub type EnrollmentResult<T> = Result<T, EnrollmentError>;
