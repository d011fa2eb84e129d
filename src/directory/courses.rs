use crate::domain::{Course, CourseId};
use crate::enrollment::{CourseKey, EnrollmentError, EnrollmentResult};
use crate::store::Stores;

pub struct CourseCatalog {
    stores: Stores,
}

impl CourseCatalog {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create_course(&self, name: &str) -> EnrollmentResult<Course> {
        if name.trim().is_empty() {
            return Err(EnrollmentError::InvalidArgument("course name cannot be empty"));
        }

        let course = Course::new(name);
        let id = course.id;
        let mut uow = self.stores.begin();
        uow.stage_course(course.clone());
        let mut committed = uow.commit().await?;

        tracing::info!(course_id = %id, name, "✅ Created course");
        Ok(committed.take_course(id).unwrap_or(course))
    }

    pub async fn find_course(&self, id: CourseId) -> EnrollmentResult<Course> {
        self.stores
            .courses
            .find_by_id(id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(CourseKey::Id(id)))
    }

    pub async fn find_course_by_name(&self, name: &str) -> EnrollmentResult<Course> {
        self.stores
            .courses
            .find_by_name(name)
            .await?
            .ok_or_else(|| EnrollmentError::CourseNotFound(CourseKey::Name(name.to_string())))
    }

    pub async fn list_courses(&self) -> EnrollmentResult<Vec<Course>> {
        Ok(self.stores.courses.find_all().await?)
    }

    /// Change the name only; count and memberships are untouched
    pub async fn rename_course(&self, id: CourseId, name: &str) -> EnrollmentResult<Course> {
        if name.trim().is_empty() {
            return Err(EnrollmentError::InvalidArgument("course name cannot be empty"));
        }

        let mut uow = self.stores.begin();
        let mut course = uow
            .course_by_id(id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(CourseKey::Id(id)))?;
        course.name = name.to_string();
        uow.stage_course(course.clone());
        let mut committed = uow.commit().await?;

        tracing::info!(course_id = %id, name, "Renamed course");
        Ok(committed.take_course(id).unwrap_or(course))
    }

    /// Delete the course row. Customers keep any membership pointing at it.
    pub async fn delete_course(&self, id: CourseId) -> EnrollmentResult<()> {
        let mut uow = self.stores.begin();
        let course = uow
            .course_by_id(id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound(CourseKey::Id(id)))?;
        uow.stage_course_deletion(course);
        uow.commit().await?;

        tracing::info!(course_id = %id, "Deleted course");
        Ok(())
    }
}
