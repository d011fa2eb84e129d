use std::collections::HashMap;

use super::course::{Course, CourseId};
use super::customer::{Customer, CustomerId};

// ============================================================================
// Membership Primitives
// ============================================================================
//
// A membership is a customer id in `Course::customers` paired with the course
// id in `Customer::courses`. These functions are the only code that touches
// either list, and they always change both sides together.
//
// Participant counts are NOT adjusted here; that is the caller's job.
//
// ============================================================================

/// Link `customer` and `course`.
///
/// Not idempotent: calling twice records the membership twice. Check
/// `Customer::is_member_of` first when that is not wanted.
pub(crate) fn add_membership(customer: &mut Customer, course: &mut Course) {
    customer.courses.push(course.id);
    course.customers.push(customer.id);
}

/// Unlink one occurrence of the pair. No-op when they are not linked.
pub(crate) fn remove_membership(customer: &mut Customer, course: &mut Course) {
    if !customer.is_member_of(course.id) {
        return;
    }
    remove_first(&mut customer.courses, &course.id);
    remove_first(&mut course.customers, &customer.id);
}

/// Move every membership of `from` onto `to`, without deduplication.
///
/// Each moved edge re-points exactly one back-reference on the matching entry
/// of `courses`. Course ids absent from `courses` still move on the customer
/// side. Returns the number of edges moved.
pub(crate) fn transfer_memberships(
    from: &mut Customer,
    to: &mut Customer,
    courses: &mut HashMap<CourseId, Course>,
) -> usize {
    let moved: Vec<CourseId> = std::mem::take(&mut from.courses);

    for course_id in &moved {
        if let Some(course) = courses.get_mut(course_id) {
            repoint_first(&mut course.customers, from.id, to.id);
        }
        to.courses.push(*course_id);
    }

    moved.len()
}

fn remove_first<T: PartialEq>(items: &mut Vec<T>, item: &T) {
    if let Some(pos) = items.iter().position(|x| x == item) {
        items.remove(pos);
    }
}

fn repoint_first(customers: &mut [CustomerId], from: CustomerId, to: CustomerId) {
    if let Some(slot) = customers.iter_mut().find(|id| **id == from) {
        *slot = to;
    }
}
