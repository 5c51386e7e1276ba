pub mod error;
pub mod local;
pub mod path;
pub mod traits;
pub mod watch;

// Re-export
pub use error::StoreError;
pub use local::LocalStore;
pub use path::{CollectionPath, DocumentPath};
pub use traits::{Document, DocumentStore, Fields};
pub use watch::Watch;
