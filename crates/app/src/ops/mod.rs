pub mod cat;
pub mod elevate;
pub mod init;
pub mod ls;
pub mod stat;
pub mod status;
pub mod tree;
pub mod version;
pub mod write;

pub use cat::Cat;
pub use elevate::{Deelevate, Elevate};
pub use init::Init;
pub use ls::Ls;
pub use stat::Stat;
pub use status::Status;
pub use tree::Tree;
pub use version::Version;
pub use write::Write;
