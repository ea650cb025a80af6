//! Pieces shared by the batch job binaries: mount listing, object store access
//! and logging setup.

pub mod logging;
pub mod store;
pub mod tree;

pub use store::{LocalFsBackend, ObjectBackend, S3Backend, StoreError};
pub use tree::{TreeEntry, list_dir, walk_tree};
