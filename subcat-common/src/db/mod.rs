//! Database schema and queries

pub mod init;
pub mod substances;
pub mod sync_runs;

pub use init::*;
pub use substances::*;
pub use sync_runs::*;
