mod args;
mod cmd;
mod config;
mod error;
pub mod git_protocol;
mod hash;
pub mod proxy;

pub use args::Args;
pub use cmd::{Command, ServeArgs};
pub use config::Config;
pub use error::Error;
pub use git_protocol::{PktLine, RefAdvertisement, SkippedLine};
pub use hash::{ObjectId, SHA1_HASH_SIZE, SHA1_HEX_SIZE};
pub type Result<T> = std::result::Result<T, Error>;
