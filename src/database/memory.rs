use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{ClassRepository, RepositoryError};
use crate::models::Class;

/// Process-local store used by tests and `CLASSES_STORAGE=memory`.
#[derive(Default)]
pub struct InMemoryClassRepository {
    classes: RwLock<Vec<Class>>,
}

impl InMemoryClassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(classes: Vec<Class>) -> Self {
        Self {
            classes: RwLock::new(classes),
        }
    }
}

#[async_trait]
impl ClassRepository for InMemoryClassRepository {
    async fn get_all(&self) -> Result<Vec<Class>, RepositoryError> {
        Ok(self.classes.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Class>, RepositoryError> {
        Ok(self.classes.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, class: &Class) -> Result<(), RepositoryError> {
        let mut classes = self.classes.write().await;
        if classes.iter().any(|c| c.id == class.id) {
            return Err(RepositoryError::DuplicateKey(format!(
                "class '{}' already exists",
                class.id
            )));
        }
        classes.push(class.clone());
        Ok(())
    }

    async fn update(&self, class: &Class) -> Result<(), RepositoryError> {
        let mut classes = self.classes.write().await;
        if let Some(existing) = classes.iter_mut().find(|c| c.id == class.id) {
            *existing = class.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.classes.write().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn database_name(&self) -> &str {
        "memory"
    }
}
