pub mod constants;
pub mod error;
pub mod record;
pub mod types;

pub use constants::*;
pub use error::RevRegError;
pub use record::RevocationRecord;
pub use types::*;
