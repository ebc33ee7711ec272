// Utils compartidos

pub mod clock;
pub mod constants;
pub mod storage;
pub mod time_format;

pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use storage::{MemoryStorage, StoragePort};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use time_format::format_time_ago;
