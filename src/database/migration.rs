use mongodb::{
    bson::doc,
    error::{Error as MongoError, ErrorKind},
    options::IndexOptions,
    Database, IndexModel,
};
use tracing::info;

use super::mongo::classify;
use super::repository::RepositoryError;

/// Server error code returned when a collection already exists.
const NAMESPACE_EXISTS_CODE: i32 = 48;

/// Collections owned by this service and whether their `id` index is unique.
const COLLECTIONS: &[(&str, bool)] = &[
    ("Classes", true),
    ("Exams", false),
    ("Students", false),
    ("Professors", false),
    ("Courses", false),
];

/// Create the service's collections and their ascending `id` indexes.
/// Safe to run on every startup.
pub async fn ensure_collections_and_indexes(database: &Database) -> Result<(), RepositoryError> {
    let existing = database.list_collection_names().await.map_err(classify)?;

    for (name, unique) in COLLECTIONS {
        if existing.iter().any(|c| c == name) {
            info!("Collection {} already present", name);
        } else {
            create_collection(database, name).await?;
            info!("Created collection {}", name);
        }

        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .name(format!("{}_id_asc", name.to_lowercase()))
                    .unique(*unique)
                    .build(),
            )
            .build();

        database
            .collection::<mongodb::bson::Document>(name)
            .create_index(index)
            .await
            .map_err(classify)?;
    }

    info!("Migrations applied to database {}", database.name());
    Ok(())
}

async fn create_collection(database: &Database, name: &str) -> Result<(), RepositoryError> {
    match database.create_collection(name).await {
        Ok(()) => Ok(()),
        // Lost a race with another instance
        Err(e) if is_namespace_exists(&e) => Ok(()),
        Err(e) => Err(classify(e)),
    }
}

fn is_namespace_exists(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if cmd.code == NAMESPACE_EXISTS_CODE)
}
