use std::net::SocketAddr;

/// Settings for the pinning proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the proxy listens on.
    pub listen: SocketAddr,
    /// Host (and port) clients reach the proxy at, as written into go-import pages.
    pub public_host: String,
    pub public_scheme: String,
    /// Scheme used to reach upstream git hosts.
    pub upstream_scheme: String,
    /// Upstream hosts the proxy is willing to forward to.
    pub allowed_hosts: Vec<String>,
}

impl Config {
    pub fn is_allowed(&self, host: &str) -> bool {
        self.allowed_hosts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_host: "127.0.0.1:8080".into(),
            public_scheme: "http".into(),
            upstream_scheme: "https".into(),
            allowed_hosts: vec!["github.com".into()],
        }
    }
}
