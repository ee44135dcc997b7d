pub mod error;
pub mod events;
pub mod manager;
pub mod modules;
pub mod naming;
pub mod record;
pub mod storage;

pub use error::{FileError, FileResult, StoreOp};
pub use events::{EventBus, FileEvent};
pub use manager::FileManager;
pub use modules::{ChartModule, Persistable, SharedModule, SourceModule};
pub use record::FileRecord;
pub use storage::{folder::FolderStore, memory::MemoryStore, KeyTooLong, KeyValueStore};
