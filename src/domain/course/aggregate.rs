use serde::Serialize;

use super::value_objects::CourseId;
use crate::domain::customer::CustomerId;

// ============================================================================
// Course Aggregate
// ============================================================================
//
// `participant_count` is a materialized view over `customers`. Only the
// enrollment service adjusts it, and after every committed operation it equals
// `customers.len()`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub(crate) participant_count: u32,
    #[serde(skip)]
    pub(crate) customers: Vec<CustomerId>,
    pub(crate) version: u64,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CourseId::new(),
            name: name.into(),
            participant_count: 0,
            customers: Vec::new(),
            version: 0,
        }
    }

    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    /// Customers currently linked to this course. Duplicates are possible.
    pub fn customers(&self) -> &[CustomerId] {
        &self.customers
    }

    pub fn has_member(&self, customer_id: CustomerId) -> bool {
        self.customers.contains(&customer_id)
    }

    /// Number of successful saves; 0 for a course that was never persisted.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True when the cached count agrees with the back-references
    pub fn is_consistent(&self) -> bool {
        self.count_drift() == 0
    }

    /// Cached count minus the number of back-references
    pub fn count_drift(&self) -> i64 {
        i64::from(self.participant_count) - self.customers.len() as i64
    }

    pub(crate) fn increment_participants(&mut self) {
        self.participant_count += 1;
    }

    pub(crate) fn decrement_participants(&mut self) {
        let drift = self.count_drift();
        if drift != 0 {
            tracing::warn!(
                course_id = %self.id,
                participant_count = self.participant_count,
                members = self.customers.len(),
                drift,
                "Participant count out of step with memberships"
            );
        }
        match self.participant_count.checked_sub(1) {
            Some(count) => self.participant_count = count,
            None => tracing::warn!(course_id = %self.id, "Participant count already zero, left unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_course_is_empty_and_consistent() {
        let course = Course::new("Software Engineering 1");
        assert_eq!(course.participant_count(), 0);
        assert!(course.customers().is_empty());
        assert!(course.is_consistent());
    }

    #[test]
    fn test_participant_count_adjustment() {
        let mut course = Course::new("Software Engineering 1");
        course.increment_participants();
        course.increment_participants();
        assert_eq!(course.participant_count(), 2);
        // count alone moved, back-references did not
        assert!(!course.is_consistent());

        course.decrement_participants();
        course.decrement_participants();
        course.decrement_participants();
        assert_eq!(course.participant_count(), 0);
    }

    #[test]
    fn test_count_drift() {
        let mut course = Course::new("Software Engineering 1");
        course.customers.push(CustomerId::new());
        course.customers.push(CustomerId::new());
        course.participant_count = 1;
        assert_eq!(course.count_drift(), -1);

        course.decrement_participants();
        assert_eq!(course.participant_count(), 0);
        assert_eq!(course.count_drift(), -2);

        course.decrement_participants();
        assert_eq!(course.participant_count(), 0);
        assert!(!course.is_consistent());
    }

    #[test]
    fn test_back_references_are_not_serialized() {
        let mut course = Course::new("Informationssysteme 2");
        course.customers.push(CustomerId::new());

        let json = serde_json::to_value(&course).unwrap();
        assert!(json.get("customers").is_none());
        assert_eq!(json["name"], "Informationssysteme 2");
    }
}
