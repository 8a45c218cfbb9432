mod error;
mod traits;

pub mod filesystem;
pub mod memory;

pub use error::StorageError;
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use traits::{FragmentBackend, FragmentListing};
