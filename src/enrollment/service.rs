use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::membership::{add_membership, remove_membership, transfer_memberships};
use crate::domain::{Course, CourseId, CustomerId};
use crate::metrics::Metrics;
use crate::notification::{send_with_timeout, NotificationGateway};
use crate::store::Stores;

use super::errors::{CourseKey, CustomerKey, EnrollmentError, EnrollmentResult};

pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

const CANCELLATION_SUBJECT: &str = "Your course membership has been cancelled";

/// What `cancel_membership` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Notification delivered, membership removed, count decremented
    Cancelled,
    /// Customer was not in the course; nothing written, nobody notified
    NotAMember,
}

// ============================================================================
// Enrollment Service
// ============================================================================
//
// Orchestrates: Lookup → Mutate in memory → (Notify) → Commit
//
// Every operation runs in its own unit of work. Errors return before
// `commit`, so a failed operation leaves every store untouched.
//
// ============================================================================

pub struct EnrollmentService {
    stores: Stores,
    gateway: Arc<dyn NotificationGateway>,
    metrics: Arc<Metrics>,
    notification_timeout: Duration,
}

impl EnrollmentService {
    pub fn new(stores: Stores, gateway: Arc<dyn NotificationGateway>, metrics: Arc<Metrics>) -> Self {
        Self {
            stores,
            gateway,
            metrics,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Enroll the customer with `last_name` in `course`.
    ///
    /// `course` may be new or already stored; a stored course is reloaded so
    /// that the increment applies to its current count. Enrolling twice in
    /// the same course is allowed and records the membership twice.
    ///
    /// Returns the course as committed.
    pub async fn enroll(&self, last_name: &str, course: Course) -> EnrollmentResult<Course> {
        let started = Instant::now();
        let result = self.try_enroll(last_name, course).await;
        self.finish("enroll", started, &result);
        if result.is_ok() {
            self.metrics.record_enrollment();
        }
        result
    }

    async fn try_enroll(&self, last_name: &str, course: Course) -> EnrollmentResult<Course> {
        let mut uow = self.stores.begin();

        let mut customer = uow
            .customer_by_last_name(last_name)
            .await?
            .ok_or_else(|| EnrollmentError::CustomerNotFound(CustomerKey::LastName(last_name.to_string())))?;

        let mut course = match uow.course_by_id(course.id).await? {
            Some(stored) => stored,
            None => course,
        };

        if customer.is_member_of(course.id) {
            tracing::warn!(
                customer_id = %customer.id,
                course_id = %course.id,
                "Customer is already enrolled, recording membership again"
            );
        }

        // course row is written before the customer row at commit
        course.increment_participants();
        add_membership(&mut customer, &mut course);

        let course_id = course.id;
        let customer_id = customer.id;
        uow.stage_course(course.clone());
        uow.stage_customer(customer);

        let mut committed = uow.commit().await?;
        let course = committed.take_course(course_id).unwrap_or(course);

        tracing::info!(
            customer_id = %customer_id,
            course_id = %course_id,
            participant_count = course.participant_count(),
            "✅ Enrolled customer in course"
        );

        Ok(course)
    }

    /// Move every membership of `from_last_name` onto `to_last_name`.
    ///
    /// Overlapping courses are not deduplicated and participant counts are
    /// left as they are. Returns the number of memberships moved.
    pub async fn transfer_courses(&self, from_last_name: &str, to_last_name: &str) -> EnrollmentResult<usize> {
        let started = Instant::now();
        let result = self.try_transfer_courses(from_last_name, to_last_name).await;
        self.finish("transfer_courses", started, &result);
        if let Ok(moved) = &result {
            self.metrics.record_transfer(*moved);
        }
        result
    }

    async fn try_transfer_courses(&self, from_last_name: &str, to_last_name: &str) -> EnrollmentResult<usize> {
        let mut uow = self.stores.begin();

        let mut from = uow
            .customer_by_last_name(from_last_name)
            .await?
            .ok_or_else(|| EnrollmentError::CustomerNotFound(CustomerKey::LastName(from_last_name.to_string())))?;
        let mut to = uow
            .customer_by_last_name(to_last_name)
            .await?
            .ok_or_else(|| EnrollmentError::CustomerNotFound(CustomerKey::LastName(to_last_name.to_string())))?;

        if from.id == to.id {
            return Err(EnrollmentError::InvalidArgument(
                "source and destination customer must differ",
            ));
        }

        let mut courses: HashMap<CourseId, Course> = HashMap::new();
        for course_id in from.courses() {
            if courses.contains_key(course_id) {
                continue;
            }
            match uow.course_by_id(*course_id).await? {
                Some(course) => {
                    courses.insert(*course_id, course);
                }
                None => tracing::warn!(
                    customer_id = %from.id,
                    course_id = %course_id,
                    "Membership points at a missing course, moving customer side only"
                ),
            }
        }

        let moved = transfer_memberships(&mut from, &mut to, &mut courses);

        let (from_id, to_id) = (from.id, to.id);
        for course in courses.into_values() {
            uow.stage_course(course);
        }
        uow.stage_customer(from);
        uow.stage_customer(to);
        uow.commit().await?;

        tracing::info!(
            from_customer_id = %from_id,
            to_customer_id = %to_id,
            moved,
            "✅ Transferred course memberships"
        );

        Ok(moved)
    }

    /// Cancel a membership by identifiers.
    ///
    /// The customer is notified before anything changes. If the notification
    /// fails or times out, nothing is written.
    pub async fn cancel_membership(
        &self,
        customer_id: Option<CustomerId>,
        course_id: Option<CourseId>,
    ) -> EnrollmentResult<CancelOutcome> {
        let started = Instant::now();
        let result = self.try_cancel_membership(customer_id, course_id).await;
        self.finish("cancel_membership", started, &result);
        match &result {
            Ok(CancelOutcome::Cancelled) => self.metrics.record_cancellation("cancelled"),
            Ok(CancelOutcome::NotAMember) => self.metrics.record_cancellation("not_member"),
            Err(EnrollmentError::MembershipNotificationFailed(_)) => self.metrics.record_notification_failure(),
            Err(_) => {}
        }
        result
    }

    async fn try_cancel_membership(
        &self,
        customer_id: Option<CustomerId>,
        course_id: Option<CourseId>,
    ) -> EnrollmentResult<CancelOutcome> {
        let (Some(customer_id), Some(course_id)) = (customer_id, course_id) else {
            return Err(EnrollmentError::InvalidArgument(
                "customer and course identifiers are required",
            ));
        };

        let mut uow = self.stores.begin();

        let mut customer = uow
            .customer_by_id(customer_id)
            .await?
            .ok_or(EnrollmentError::CustomerNotFound(CustomerKey::Id(customer_id)))?;
        let mut course = uow
            .course_by_id(course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(CourseKey::Id(course_id)))?;

        if !customer.is_member_of(course_id) {
            tracing::debug!(
                customer_id = %customer_id,
                course_id = %course_id,
                "Customer is not a member, nothing to cancel"
            );
            return Ok(CancelOutcome::NotAMember);
        }

        let Some(recipient) = customer.email.as_ref().map(|e| e.as_str().to_string()) else {
            tracing::warn!(customer_id = %customer_id, "Customer has no email address on file");
            return Err(EnrollmentError::MembershipNotificationFailed(format!(
                "customer {} (no email on file)",
                customer_id
            )));
        };

        let body = format!(
            "Hello {} {},\n\nyour membership in \"{}\" has been cancelled. We hope to see you again soon.",
            customer.first_name, customer.last_name, course.name
        );
        let delivered = send_with_timeout(
            self.gateway.as_ref(),
            self.notification_timeout,
            &recipient,
            CANCELLATION_SUBJECT,
            &body,
        )
        .await;

        if !delivered {
            tracing::warn!(
                customer_id = %customer_id,
                course_id = %course_id,
                recipient = %recipient,
                "Cancellation notice not delivered, membership kept"
            );
            return Err(EnrollmentError::MembershipNotificationFailed(recipient));
        }

        course.decrement_participants();
        remove_membership(&mut customer, &mut course);

        let participant_count = course.participant_count();
        uow.stage_customer(customer);
        uow.stage_course(course);
        uow.commit().await?;

        tracing::info!(
            customer_id = %customer_id,
            course_id = %course_id,
            participant_count,
            "✅ Cancelled course membership"
        );

        Ok(CancelOutcome::Cancelled)
    }

    fn finish<T>(&self, operation: &str, started: Instant, result: &EnrollmentResult<T>) {
        let failure = result.as_ref().err().map(|e| {
            tracing::warn!(operation, reason = e.kind(), error = %e, "Enrollment operation rejected");
            e.kind()
        });
        self.metrics.record_operation(operation, started.elapsed().as_secs_f64(), failure);
    }
}
