use serde::Serialize;

use super::errors::CustomerError;
use super::value_objects::{CustomerId, Email, Gender, PhoneNumber};
use crate::domain::course::CourseId;

// ============================================================================
// Customer Aggregate
// ============================================================================
//
// Holds the customer's side of every membership as a multiset of course ids.
// The list is only ever changed through the membership primitives in
// `domain::membership`, which keep the course's back-references in step.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub email: Option<Email>,
    pub phone_number: Option<PhoneNumber>,
    pub(crate) courses: Vec<CourseId>,
    pub(crate) version: u64,
}

impl Customer {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: CustomerId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender,
            email: None,
            phone_number: None,
            courses: Vec::new(),
            version: 0,
        }
    }

    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_phone_number(mut self, phone_number: PhoneNumber) -> Self {
        self.phone_number = Some(phone_number);
        self
    }

    /// Course ids this customer is enrolled in. Duplicates are possible.
    pub fn courses(&self) -> &[CourseId] {
        &self.courses
    }

    pub fn is_member_of(&self, course_id: CourseId) -> bool {
        self.courses.contains(&course_id)
    }

    /// Number of successful saves; 0 for a customer that was never persisted.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Field checks applied on registration
    pub fn validate(&self) -> Result<(), CustomerError> {
        if self.first_name.trim().is_empty() {
            return Err(CustomerError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(CustomerError::EmptyLastName);
        }
        if let Some(email) = &self.email {
            if email.as_str().is_empty() {
                return Err(CustomerError::EmptyEmail);
            }
            if !email.as_str().contains('@') {
                return Err(CustomerError::InvalidEmail(email.as_str().to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_customer() -> Customer {
        Customer::new("Jane", "Doe", Gender::Female).with_email(Email::new("jane.doe@mail.com"))
    }

    #[test]
    fn test_new_customer_has_no_courses() {
        let customer = create_test_customer();
        assert!(customer.courses().is_empty());
        assert_eq!(customer.version(), 0);
        assert!(customer.phone_number.is_none());
    }

    #[test]
    fn test_validate_accepts_complete_customer() {
        let customer = create_test_customer().with_phone_number(PhoneNumber::new("+49-40-428758434"));
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_missing_email() {
        let customer = Customer::new("John", "Smith", Gender::Male);
        assert!(customer.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        let customer = Customer::new("  ", "Doe", Gender::Female);
        assert_eq!(customer.validate(), Err(CustomerError::EmptyFirstName));

        let customer = Customer::new("Jane", "", Gender::Female);
        assert_eq!(customer.validate(), Err(CustomerError::EmptyLastName));
    }

    #[test]
    fn test_validate_rejects_malformed_email() {
        let customer = create_test_customer().with_email(Email::new("jane.doe"));
        assert!(matches!(customer.validate(), Err(CustomerError::InvalidEmail(_))));

        let customer = create_test_customer().with_email(Email::new(""));
        assert_eq!(customer.validate(), Err(CustomerError::EmptyEmail));
    }
}
