use super::{proxy, Config, Result};
use std::net::SocketAddr;

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Host (and port) clients use to reach this proxy
    #[arg(long, default_value = "127.0.0.1:8080")]
    public_host: String,

    /// Scheme clients use to reach this proxy
    #[arg(long, default_value = "http")]
    public_scheme: String,

    /// Scheme used to talk to upstream git hosts
    #[arg(long, default_value = "https")]
    upstream_scheme: String,

    /// Upstream host to proxy; repeat for several
    #[arg(long = "allow-host", default_value = "github.com")]
    allowed_hosts: Vec<String>,
}

impl ServeArgs {
    pub fn into_config(self) -> Config {
        Config {
            listen: self.listen,
            public_host: self.public_host,
            public_scheme: self.public_scheme,
            upstream_scheme: self.upstream_scheme,
            allowed_hosts: self.allowed_hosts,
        }
    }
}

pub(crate) async fn run(config: Config) -> Result<()> {
    proxy::serve(config).await
}
