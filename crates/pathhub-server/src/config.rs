use clap::Parser;

/// Configuration for the link-issuing service.
#[derive(Parser, Debug, Clone)]
#[command(name = "pathhub-server")]
#[command(about = "Issues shareable pathhub:// links for file paths")]
pub struct Config {
    /// TCP host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "PATHHUB_HOST")]
    pub host: String,

    /// TCP port to bind to
    #[arg(long, default_value = "3000", env = "PATHHUB_PORT")]
    pub port: u16,

    /// Base URL used in issued links (defaults to http://<Host header>)
    #[arg(long, env = "PATHHUB_PUBLIC_URL")]
    pub public_url: Option<String>,
}

impl Config {
    /// Public URL without a trailing slash.
    pub fn public_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }
}
