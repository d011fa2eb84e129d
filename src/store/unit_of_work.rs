use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::in_memory::{InMemoryCourseStore, InMemoryCustomerStore};
use super::traits::{CourseStore, CustomerStore, StoreError};
use crate::domain::{Course, CourseId, Customer, CustomerId};

// ============================================================================
// Unit of Work
// ============================================================================
//
// Reads go to the stores (overlaid with anything already staged), writes are
// staged in memory. Nothing reaches a store until `commit`, and dropping the
// unit of work discards every staged change.
//
// Commit holds the shared commit lock for its whole duration:
// 1. Load the current row for everything staged (the pre-images)
// 2. Verify versions and customer last-name uniqueness against them
// 3. Write courses, then customers, then deletions, journalling each write
// 4. On a failed write, restore the journalled pre-images in reverse order
//
// Two units of work that loaded the same row can never both commit, and a
// commit either lands completely or not at all.
//
// ============================================================================

/// Store handles plus the commit lock shared by every unit of work
#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<dyn CustomerStore>,
    pub courses: Arc<dyn CourseStore>,
    commit_lock: Arc<Mutex<()>>,
}

impl Stores {
    pub fn new(customers: Arc<dyn CustomerStore>, courses: Arc<dyn CourseStore>) -> Self {
        Self {
            customers,
            courses,
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCustomerStore::new()),
            Arc::new(InMemoryCourseStore::new()),
        )
    }

    pub fn begin(&self) -> UnitOfWork {
        UnitOfWork {
            stores: self.clone(),
            staged_customers: Vec::new(),
            staged_courses: Vec::new(),
            deleted_courses: Vec::new(),
            purge_customers: false,
        }
    }
}

/// Rows written by a successful commit, with their new versions
#[derive(Debug, Default)]
pub struct CommittedWork {
    pub customers: Vec<Customer>,
    pub courses: Vec<Course>,
}

impl CommittedWork {
    pub fn take_customer(&mut self, id: CustomerId) -> Option<Customer> {
        let pos = self.customers.iter().position(|c| c.id == id)?;
        Some(self.customers.swap_remove(pos))
    }

    pub fn take_course(&mut self, id: CourseId) -> Option<Course> {
        let pos = self.courses.iter().position(|c| c.id == id)?;
        Some(self.courses.swap_remove(pos))
    }
}

/// Row state before a write, put back if the commit fails
enum PreImage {
    Customer(CustomerId, Option<Customer>),
    Course(CourseId, Option<Course>),
}

pub struct UnitOfWork {
    stores: Stores,
    staged_customers: Vec<Customer>,
    staged_courses: Vec<Course>,
    deleted_courses: Vec<Course>,
    purge_customers: bool,
}

impl UnitOfWork {
    pub async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        if let Some(staged) = self.staged_customers.iter().find(|c| c.id == id) {
            return Ok(Some(staged.clone()));
        }
        if self.purge_customers {
            return Ok(None);
        }
        self.stores.customers.find_by_id(id).await
    }

    pub async fn customer_by_last_name(&self, last_name: &str) -> Result<Option<Customer>, StoreError> {
        if let Some(staged) = self.staged_customers.iter().find(|c| c.last_name == last_name) {
            return Ok(Some(staged.clone()));
        }
        if self.purge_customers {
            return Ok(None);
        }
        self.stores.customers.find_by_last_name(last_name).await
    }

    pub async fn course_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        if self.deleted_courses.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        if let Some(staged) = self.staged_courses.iter().find(|c| c.id == id) {
            return Ok(Some(staged.clone()));
        }
        self.stores.courses.find_by_id(id).await
    }

    /// Stage a write, replacing any earlier staged copy of the same customer
    pub fn stage_customer(&mut self, customer: Customer) {
        match self.staged_customers.iter_mut().find(|c| c.id == customer.id) {
            Some(slot) => *slot = customer,
            None => self.staged_customers.push(customer),
        }
    }

    /// Stage a write, replacing any earlier staged copy of the same course
    pub fn stage_course(&mut self, course: Course) {
        match self.staged_courses.iter_mut().find(|c| c.id == course.id) {
            Some(slot) => *slot = course,
            None => self.staged_courses.push(course),
        }
    }

    pub fn stage_course_deletion(&mut self, course: Course) {
        self.staged_courses.retain(|c| c.id != course.id);
        self.deleted_courses.push(course);
    }

    /// Stage removal of every customer row. Customers staged earlier are dropped.
    pub fn stage_customer_purge(&mut self) {
        self.staged_customers.clear();
        self.purge_customers = true;
    }

    pub fn is_empty(&self) -> bool {
        self.staged_customers.is_empty()
            && self.staged_courses.is_empty()
            && self.deleted_courses.is_empty()
            && !self.purge_customers
    }

    pub async fn commit(self) -> Result<CommittedWork, StoreError> {
        let lock = self.stores.commit_lock.clone();
        let _guard = lock.lock().await;

        let mut customer_images = HashMap::new();
        for customer in &self.staged_customers {
            let stored = self.stores.customers.find_by_id(customer.id).await?;
            ensure_version("customer", customer.id.to_string(), stored.as_ref().map(|c| c.version), customer.version)?;
            customer_images.insert(customer.id, stored);
        }
        let mut course_images = HashMap::new();
        for course in self.staged_courses.iter().chain(&self.deleted_courses) {
            let stored = self.stores.courses.find_by_id(course.id).await?;
            ensure_version("course", course.id.to_string(), stored.as_ref().map(|c| c.version), course.version)?;
            course_images.insert(course.id, stored);
        }

        let purged = if self.purge_customers {
            self.stores.customers.find_all().await?
        } else {
            Vec::new()
        };
        self.ensure_unique_last_names(&customer_images).await?;

        let mut journal = Vec::new();
        match self.write(customer_images, course_images, purged, &mut journal).await {
            Ok(committed) => {
                tracing::debug!(
                    customers = committed.customers.len(),
                    courses = committed.courses.len(),
                    deleted_courses = self.deleted_courses.len(),
                    purged_customers = self.purge_customers,
                    "Committed unit of work"
                );
                Ok(committed)
            }
            Err(e) => {
                tracing::warn!(error = %e, writes = journal.len(), "Commit failed, restoring written rows");
                self.roll_back(journal).await;
                Err(e)
            }
        }
    }

    /// Last names must stay unique. Checked only for customers that are new or renamed.
    async fn ensure_unique_last_names(
        &self,
        customer_images: &HashMap<CustomerId, Option<Customer>>,
    ) -> Result<(), StoreError> {
        let claims: Vec<&Customer> = self
            .staged_customers
            .iter()
            .filter(|c| match customer_images.get(&c.id) {
                Some(Some(stored)) => stored.last_name != c.last_name,
                _ => true,
            })
            .collect();
        if claims.is_empty() {
            return Ok(());
        }

        let existing = if self.purge_customers {
            Vec::new()
        } else {
            self.stores.customers.find_all().await?
        };
        for claim in claims {
            let taken_by_row = existing
                .iter()
                .any(|row| row.id != claim.id && row.last_name == claim.last_name);
            let taken_by_staged = self
                .staged_customers
                .iter()
                .any(|other| other.id != claim.id && other.last_name == claim.last_name);
            if taken_by_row || taken_by_staged {
                return Err(StoreError::DuplicateKey {
                    entity: "customer",
                    key: claim.last_name.clone(),
                });
            }
        }
        Ok(())
    }

    async fn write(
        &self,
        mut customer_images: HashMap<CustomerId, Option<Customer>>,
        mut course_images: HashMap<CourseId, Option<Course>>,
        purged: Vec<Customer>,
        journal: &mut Vec<PreImage>,
    ) -> Result<CommittedWork, StoreError> {
        let mut committed = CommittedWork::default();

        // pre-image goes into the journal before the write is attempted
        for course in &self.staged_courses {
            journal.push(PreImage::Course(course.id, course_images.remove(&course.id).flatten()));
            committed.courses.push(self.stores.courses.save(course.clone()).await?);
        }
        if self.purge_customers {
            journal.extend(purged.into_iter().map(|row| PreImage::Customer(row.id, Some(row))));
            self.stores.customers.delete_all().await?;
        }
        for customer in &self.staged_customers {
            journal.push(PreImage::Customer(customer.id, customer_images.remove(&customer.id).flatten()));
            committed.customers.push(self.stores.customers.save(customer.clone()).await?);
        }
        for course in &self.deleted_courses {
            journal.push(PreImage::Course(course.id, course_images.remove(&course.id).flatten()));
            self.stores.courses.delete(course).await?;
        }

        Ok(committed)
    }

    async fn roll_back(&self, journal: Vec<PreImage>) {
        for image in journal.into_iter().rev() {
            let restored = match image {
                PreImage::Customer(id, previous) => self.stores.customers.restore(id, previous).await,
                PreImage::Course(id, previous) => self.stores.courses.restore(id, previous).await,
            };
            if let Err(e) = restored {
                tracing::error!(error = %e, "❌ Failed to restore row after aborted commit");
            }
        }
    }
}

fn ensure_version(entity: &'static str, id: String, stored: Option<u64>, loaded: u64) -> Result<(), StoreError> {
    let found = stored.unwrap_or(0);
    if found != loaded {
        return Err(StoreError::VersionConflict {
            entity,
            id,
            expected: loaded,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use crate::store::testing::FaultyCustomerStore;

    #[tokio::test]
    async fn test_nothing_written_before_commit() {
        let stores = Stores::in_memory();
        let mut uow = stores.begin();
        uow.stage_customer(Customer::new("Jane", "Doe", Gender::Female));
        uow.stage_course(Course::new("Software Engineering 1"));

        assert!(stores.customers.find_all().await.unwrap().is_empty());
        assert!(stores.courses.find_all().await.unwrap().is_empty());

        drop(uow);
        assert!(stores.customers.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_staged_rows_are_visible_to_reads() {
        let stores = Stores::in_memory();
        let mut uow = stores.begin();
        let customer = Customer::new("Jane", "Doe", Gender::Female);
        let id = customer.id;
        uow.stage_customer(customer);

        assert_eq!(uow.customer_by_last_name("Doe").await.unwrap().unwrap().id, id);
        assert!(uow.customer_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_commit_writes_everything() {
        let stores = Stores::in_memory();
        let mut uow = stores.begin();
        let course = Course::new("Software Engineering 1");
        let course_id = course.id;
        uow.stage_course(course);
        uow.stage_customer(Customer::new("Jane", "Doe", Gender::Female));

        let mut committed = uow.commit().await.unwrap();

        assert_eq!(committed.take_course(course_id).unwrap().version(), 1);
        assert_eq!(stores.customers.find_all().await.unwrap().len(), 1);
        assert_eq!(stores.courses.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_unit_of_work_writes_nothing() {
        let stores = Stores::in_memory();
        let course = stores.courses.save(Course::new("Software Engineering 1")).await.unwrap();

        let mut first = stores.begin();
        let mut second = stores.begin();
        let mut a = first.course_by_id(course.id).await.unwrap().unwrap();
        let mut b = second.course_by_id(course.id).await.unwrap().unwrap();
        a.name = "SE 1".into();
        b.name = "SE I".into();
        first.stage_course(a);
        second.stage_customer(Customer::new("Jane", "Doe", Gender::Female));
        second.stage_course(b);

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
        assert!(stores.customers.find_all().await.unwrap().is_empty());
        let stored = stores.courses.find_by_id(course.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "SE 1");
    }

    #[tokio::test]
    async fn test_staged_deletion() {
        let stores = Stores::in_memory();
        let course = stores.courses.save(Course::new("Software Engineering 1")).await.unwrap();

        let mut uow = stores.begin();
        uow.stage_course_deletion(course.clone());
        assert!(uow.course_by_id(course.id).await.unwrap().is_none());
        uow.commit().await.unwrap();

        assert!(stores.courses.find_by_id(course.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_customer_write_restores_courses() {
        let customers = Arc::new(FaultyCustomerStore::new());
        let stores = Stores::new(customers.clone(), Arc::new(InMemoryCourseStore::new()));
        let course = stores.courses.save(Course::new("Software Engineering 1")).await.unwrap();
        let customer = stores.customers.save(Customer::new("Jane", "Doe", Gender::Female)).await.unwrap();
        let fresh = Course::new("Software Engineering 2");
        let fresh_id = fresh.id;

        let mut uow = stores.begin();
        let mut renamed = uow.course_by_id(course.id).await.unwrap().unwrap();
        renamed.name = "SE 1".into();
        uow.stage_course(renamed);
        uow.stage_course(fresh);
        let mut jane = uow.customer_by_id(customer.id).await.unwrap().unwrap();
        jane.first_name = "Janet".into();
        uow.stage_customer(jane);

        customers.fail_saves(true);
        let result = uow.commit().await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(stores.courses.find_by_id(course.id).await.unwrap(), Some(course));
        assert!(stores.courses.find_by_id(fresh_id).await.unwrap().is_none());
        assert_eq!(stores.customers.find_by_id(customer.id).await.unwrap(), Some(customer));
    }

    #[tokio::test]
    async fn test_rolled_back_rows_can_be_written_again() {
        let customers = Arc::new(FaultyCustomerStore::new());
        let stores = Stores::new(customers.clone(), Arc::new(InMemoryCourseStore::new()));
        let course = stores.courses.save(Course::new("Software Engineering 1")).await.unwrap();

        let mut uow = stores.begin();
        uow.stage_course(course.clone());
        uow.stage_customer(Customer::new("Jane", "Doe", Gender::Female));
        customers.fail_saves(true);
        assert!(uow.commit().await.is_err());

        customers.fail_saves(false);
        let mut retry = stores.begin();
        retry.stage_course(course.clone());
        let mut committed = retry.commit().await.unwrap();
        assert_eq!(committed.take_course(course.id).unwrap().version(), 2);
    }

    #[tokio::test]
    async fn test_new_customer_cannot_take_a_used_last_name() {
        let stores = Stores::in_memory();
        let mut first = stores.begin();
        let mut second = stores.begin();
        first.stage_customer(Customer::new("Jane", "Doe", Gender::Female));
        second.stage_customer(Customer::new("John", "Doe", Gender::Male));

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(matches!(result, Err(StoreError::DuplicateKey { entity: "customer", ref key }) if key == "Doe"));
        assert_eq!(stores.customers.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_customer_keeps_its_last_name() {
        let stores = Stores::in_memory();
        let doe = stores.customers.save(Customer::new("Jane", "Doe", Gender::Female)).await.unwrap();

        let mut uow = stores.begin();
        let mut doe = uow.customer_by_id(doe.id).await.unwrap().unwrap();
        doe.first_name = "Janet".into();
        uow.stage_customer(doe);

        assert!(uow.commit().await.is_ok());
    }

    #[tokio::test]
    async fn test_customer_purge() {
        let stores = Stores::in_memory();
        let doe = stores.customers.save(Customer::new("Jane", "Doe", Gender::Female)).await.unwrap();

        let mut uow = stores.begin();
        uow.stage_customer_purge();
        assert!(uow.customer_by_id(doe.id).await.unwrap().is_none());
        uow.stage_customer(Customer::new("John", "Doe", Gender::Male));
        uow.commit().await.unwrap();

        let rows = stores.customers.find_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name, "John");
    }
}
