mod resolve;
mod serve;

use super::{proxy, Config, Result};
use clap::Subcommand;

pub use serve::ServeArgs;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the go-import page and git pinning proxy
    Serve(ServeArgs),
    /// Fetch a repository's ref advertisement and resolve a commit-ish against it
    Resolve {
        /// Repository URL, e.g. https://github.com/coreos/etcd
        url: String,
        /// Branch, tag, object id prefix or full object id
        commitish: String,
        /// Write the master-pinned advertisement to stdout instead of the object id
        #[arg(long)]
        dump: bool,
    },
}

impl Command {
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Serve(args) => serve::run(args.into_config()).await,
            Self::Resolve {
                url,
                commitish,
                dump,
            } => resolve::run(url, commitish, dump).await,
        }
    }
}
