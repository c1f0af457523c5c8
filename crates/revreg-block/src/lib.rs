pub mod group;
pub mod plugin;

pub use group::BlockGroup;
pub use plugin::{BlockPlugin, EvalResult, RevocationBlockPlugin};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as microseconds since the UNIX epoch, matching
/// `RevocationRecord::timestamp`'s unit.
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the UNIX epoch")
        .as_micros() as i64
}
