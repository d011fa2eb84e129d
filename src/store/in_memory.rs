use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{CourseStore, CustomerStore, StoreError};
use crate::domain::{Course, CourseId, Customer, CustomerId};

// ============================================================================
// In-Memory Stores
// ============================================================================
//
// Rows are kept in insertion order so that `find_all` and the name lookups
// are deterministic.
//
// ============================================================================

fn check_version(entity: &'static str, id: String, stored: u64, incoming: u64) -> Result<(), StoreError> {
    if stored != incoming {
        return Err(StoreError::VersionConflict {
            entity,
            id,
            expected: incoming,
            found: stored,
        });
    }
    Ok(())
}

fn put_back<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool, previous: Option<T>) {
    let position = rows.iter().position(|row| matches(row));
    match (position, previous) {
        (Some(i), Some(row)) => rows[i] = row,
        (None, Some(row)) => rows.push(row),
        (Some(i), None) => {
            rows.remove(i);
        }
        (None, None) => {}
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    rows: RwLock<Vec<Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_last_name(&self, last_name: &str) -> Result<Option<Customer>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|c| c.last_name == last_name).cloned())
    }

    async fn find_by_first_name(&self, first_name: &str) -> Result<Option<Customer>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|c| c.first_name == first_name).cloned())
    }

    async fn save(&self, mut customer: Customer) -> Result<Customer, StoreError> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|c| c.id == customer.id);
        let stored_version = position.map(|i| rows[i].version).unwrap_or(0);
        check_version("customer", customer.id.to_string(), stored_version, customer.version)?;

        customer.version += 1;
        match position {
            Some(i) => rows[i] = customer.clone(),
            None => rows.push(customer.clone()),
        }

        tracing::debug!(customer_id = %customer.id, version = customer.version, "Saved customer");
        Ok(customer)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let removed = rows.len();
        rows.clear();
        tracing::debug!(removed, "Deleted all customers");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.rows.read().await.clone())
    }

    async fn restore(&self, id: CustomerId, previous: Option<Customer>) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        put_back(&mut *rows, |c| c.id == id, previous);
        tracing::debug!(customer_id = %id, "Restored customer row");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCourseStore {
    rows: RwLock<Vec<Course>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|c| c.name == name).cloned())
    }

    async fn save(&self, mut course: Course) -> Result<Course, StoreError> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|c| c.id == course.id);
        let stored_version = position.map(|i| rows[i].version).unwrap_or(0);
        check_version("course", course.id.to_string(), stored_version, course.version)?;

        course.version += 1;
        match position {
            Some(i) => rows[i] = course.clone(),
            None => rows.push(course.clone()),
        }

        tracing::debug!(course_id = %course.id, version = course.version, "Saved course");
        Ok(course)
    }

    async fn delete(&self, course: &Course) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        rows.retain(|c| c.id != course.id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.rows.read().await.clone())
    }

    async fn restore(&self, id: CourseId, previous: Option<Course>) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        put_back(&mut *rows, |c| c.id == id, previous);
        tracing::debug!(course_id = %id, "Restored course row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;

    #[tokio::test]
    async fn test_save_assigns_versions() {
        let store = InMemoryCustomerStore::new();
        let customer = Customer::new("Jane", "Doe", Gender::Female);

        let saved = store.save(customer).await.unwrap();
        assert_eq!(saved.version(), 1);

        let saved = store.save(saved).await.unwrap();
        assert_eq!(saved.version(), 2);
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected() {
        let store = InMemoryCourseStore::new();
        let first = store.save(Course::new("Software Engineering 1")).await.unwrap();
        let stale = first.clone();

        store.save(first).await.unwrap();
        let result = store.save(stale).await;

        assert!(matches!(
            result,
            Err(StoreError::VersionConflict { entity: "course", expected: 1, found: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_names() {
        let store = InMemoryCustomerStore::new();
        store.save(Customer::new("Jane", "Miller", Gender::Female)).await.unwrap();
        store.save(Customer::new("John", "Smith", Gender::Male)).await.unwrap();

        let smith = store.find_by_last_name("Smith").await.unwrap().unwrap();
        assert_eq!(smith.first_name, "John");
        let jane = store.find_by_first_name("Jane").await.unwrap().unwrap();
        assert_eq!(jane.last_name, "Miller");
        assert!(store.find_by_last_name("Doe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_and_delete() {
        let customers = InMemoryCustomerStore::new();
        customers.save(Customer::new("Jane", "Doe", Gender::Female)).await.unwrap();
        customers.delete_all().await.unwrap();
        assert!(customers.find_all().await.unwrap().is_empty());

        let courses = InMemoryCourseStore::new();
        let se1 = courses.save(Course::new("Software Engineering 1")).await.unwrap();
        courses.save(Course::new("Software Engineering 2")).await.unwrap();
        courses.delete(&se1).await.unwrap();

        assert!(courses.find_by_id(se1.id).await.unwrap().is_none());
        assert!(courses.find_by_name("Software Engineering 2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_restore_ignores_versions() {
        let store = InMemoryCourseStore::new();
        let original = store.save(Course::new("Software Engineering 1")).await.unwrap();
        let mut renamed = original.clone();
        renamed.name = "SE 1".into();
        let renamed = store.save(renamed).await.unwrap();
        assert_eq!(renamed.version(), 2);

        store.restore(original.id, Some(original.clone())).await.unwrap();
        assert_eq!(store.find_by_id(original.id).await.unwrap(), Some(original.clone()));

        store.restore(original.id, None).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
