pub mod manager;
pub mod memory;
pub mod migration;
pub mod mongo;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryClassRepository;
pub use mongo::MongoClassRepository;
pub use repository::{ClassRepository, RepositoryError};
