mod recover;
mod zip;

pub use recover::{recover, recover_units, RecoverResult, RecoveryRecord, Unrecoverable};
pub use zip::normalize_zip;
