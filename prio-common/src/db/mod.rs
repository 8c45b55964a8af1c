//! Database schema and queries

pub mod features;
pub mod init;
pub mod players;
pub mod sessions;
pub mod votes;

pub use features::*;
pub use init::*;
pub use players::*;
pub use sessions::*;
pub use votes::*;
