use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    Client, Collection, Database,
};

use super::repository::{ClassRepository, RepositoryError};
use crate::models::Class;

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed class store. One document per class; exams embedded.
pub struct MongoClassRepository {
    database: Database,
    collection: Collection<Class>,
}

impl MongoClassRepository {
    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        let database = client.database(database);
        let collection = database.collection::<Class>(collection);
        Self {
            database,
            collection,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Sort driver failures into the buckets the HTTP layer distinguishes.
pub(crate) fn classify(err: MongoError) -> RepositoryError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => RepositoryError::Unavailable(err.to_string()),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            RepositoryError::DuplicateKey(write.message.clone())
        }
        _ => RepositoryError::Query(err.to_string()),
    }
}

#[async_trait]
impl ClassRepository for MongoClassRepository {
    async fn get_all(&self) -> Result<Vec<Class>, RepositoryError> {
        let cursor = self.collection.find(doc! {}).await.map_err(classify)?;
        cursor.try_collect().await.map_err(classify)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Class>, RepositoryError> {
        self.collection
            .find_one(doc! { "id": id })
            .await
            .map_err(classify)
    }

    async fn create(&self, class: &Class) -> Result<(), RepositoryError> {
        self.collection.insert_one(class).await.map_err(classify)?;
        Ok(())
    }

    async fn update(&self, class: &Class) -> Result<(), RepositoryError> {
        self.collection
            .replace_one(doc! { "id": class.id.as_str() }, class)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.collection
            .delete_one(doc! { "id": id })
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(classify)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    fn database_name(&self) -> &str {
        self.database.name()
    }
}
