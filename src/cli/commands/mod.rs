//! CLI command implementations

pub mod diff;
pub mod init;
pub mod key;
pub mod link;
pub mod register;
pub mod status;

pub use diff::execute as diff;
pub use init::execute as init;
pub use key::execute as key;
pub use link::execute as link;
pub use link::unlink;
pub use register::{add, remove};
pub use status::execute as status;
