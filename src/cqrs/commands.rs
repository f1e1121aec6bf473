use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{CommandHandler, HandlerError};
use crate::database::ClassRepository;
use crate::models::Class;

#[derive(Debug, Clone)]
pub struct CreateClassCommand {
    pub class: Class,
}

/// Replace the class stored under `id` with `class`.
#[derive(Debug, Clone)]
pub struct UpdateClassCommand {
    pub id: String,
    pub class: Class,
}

#[derive(Debug, Clone)]
pub struct DeleteClassCommand {
    pub id: String,
}

pub struct CreateClassHandler {
    repository: Arc<dyn ClassRepository>,
}

impl CreateClassHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<CreateClassCommand> for CreateClassHandler {
    type Output = Class;

    async fn handle(&self, command: CreateClassCommand) -> Result<Class, HandlerError> {
        let mut class = command.class;
        class.assign_missing_ids();

        if let Some(dup) = class.duplicate_exam_id() {
            return Err(HandlerError::Invalid(format!("Duplicate exam id '{}'", dup)));
        }

        self.repository.create(&class).await?;
        info!("Created class {}", class.id);
        Ok(class)
    }
}

pub struct UpdateClassHandler {
    repository: Arc<dyn ClassRepository>,
}

impl UpdateClassHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<UpdateClassCommand> for UpdateClassHandler {
    type Output = Class;

    async fn handle(&self, command: UpdateClassCommand) -> Result<Class, HandlerError> {
        if command.id.trim().is_empty() {
            return Err(HandlerError::Invalid("Class id is required".to_string()));
        }

        let mut class = command.class;
        // The route id always wins over whatever the body carried
        class.id = command.id;
        class.assign_missing_ids();

        if let Some(dup) = class.duplicate_exam_id() {
            return Err(HandlerError::Invalid(format!("Duplicate exam id '{}'", dup)));
        }

        self.repository.update(&class).await?;
        Ok(class)
    }
}

pub struct DeleteClassHandler {
    repository: Arc<dyn ClassRepository>,
}

impl DeleteClassHandler {
    pub fn new(repository: Arc<dyn ClassRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<DeleteClassCommand> for DeleteClassHandler {
    type Output = ();

    async fn handle(&self, command: DeleteClassCommand) -> Result<(), HandlerError> {
        self.repository.delete(&command.id).await?;
        info!("Deleted class {}", command.id);
        Ok(())
    }
}
