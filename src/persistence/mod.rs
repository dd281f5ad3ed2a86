pub mod files;
pub mod store;

pub use files::{ensure_data_dir, init_local_dir};
#[cfg(test)]
pub use store::MemoryStore;
pub use store::{save_json, FileStore, KeyValueStore, COMPLETED_TASKS_KEY, SETTINGS_KEY, TASKS_KEY};
