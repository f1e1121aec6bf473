use async_trait::async_trait;
use std::sync::Arc;

use super::{HandlerError, QueryHandler};
use crate::database::ClassRepository;
use crate::models::{Class, Exam};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone)]
pub struct GetClassByIdQuery {
    pub id: String,
}

/// Filtered, paginated class listing. Build with [`GetClassesQuery::new`] so
/// paging is normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct GetClassesQuery {
    pub year: Option<i32>,
    pub semester: Option<i32>,
    pub course_id: Option<String>,
    pub page: i64,
    pub size: i64,
}

impl GetClassesQuery {
    pub fn new(
        year: Option<i32>,
        semester: Option<i32>,
        course_id: Option<String>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Self {
        Self {
            year,
            semester,
            course_id: course_id
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    fn matches(&self, class: &Class) -> bool {
        if self.year.is_some_and(|year| class.year != year) {
            return false;
        }
        if self.semester.is_some_and(|semester| class.semester != semester) {
            return false;
        }
        match self.course_id.as_deref() {
            Some(course_id) => class.course_id() == Some(course_id),
            None => true,
        }
    }

    /// Filter then page `classes`, keeping their input order.
    pub fn apply(&self, classes: Vec<Class>) -> Vec<Class> {
        let skip = (self.page - 1).saturating_mul(self.size);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(self.size).unwrap_or(usize::MAX);

        classes
            .into_iter()
            .filter(|class| self.matches(class))
            .skip(skip)
            .take(take)
            .collect()
    }
}

/// Exams of one class; `None` from the handler means the class is missing.
#[derive(Debug, Clone)]
pub struct GetExamsQuery {
    pub class_id: String,
}

pub struct GetClassByIdHandler {
    repository: Arc<dyn ClassRepository>,
}

impl GetClassByIdHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl QueryHandler<GetClassByIdQuery> for GetClassByIdHandler {
    type Output = Option<Class>;

    async fn handle(&self, query: GetClassByIdQuery) -> Result<Option<Class>, HandlerError> {
        Ok(self.repository.get_by_id(&query.id).await?)
    }
}

pub struct GetClassesHandler {
    repository: Arc<dyn ClassRepository>,
}

impl GetClassesHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl QueryHandler<GetClassesQuery> for GetClassesHandler {
    type Output = Vec<Class>;

    async fn handle(&self, query: GetClassesQuery) -> Result<Vec<Class>, HandlerError> {
        let classes = self.repository.get_all().await?;
        Ok(query.apply(classes))
    }
}

pub struct GetExamsHandler {
    repository: Arc<dyn ClassRepository>,
}

impl GetExamsHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl QueryHandler<GetExamsQuery> for GetExamsHandler {
    type Output = Option<Vec<Exam>>;

    async fn handle(&self, query: GetExamsQuery) -> Result<Option<Vec<Exam>>, HandlerError> {
        let class = self.repository.get_by_id(&query.class_id).await?;
        Ok(class.map(|c| c.exams))
    }
}
