pub mod models;
pub mod repository;
pub mod search;
pub mod memory;

pub use models::{City, Tour};
pub use repository::CatalogRepository;
pub use search::SearchPattern;
pub use memory::InMemoryCatalog;
