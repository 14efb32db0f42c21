pub mod account;
pub mod kv;

pub use account::{AccountRecord, AccountStore, ACCOUNT_RECORD_KEY, RECORD_VERSION};
pub use kv::{FileKvStore, KvStore, MemoryKvStore};
