use clap::Args;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v21.0";

/// Credentials and endpoint for the Graph API.
///
/// Nothing here has a compiled-in credential; the token, page and ad account
/// come from flags or the environment. Only ad creation needs the ad account.
#[derive(Args, Clone)]
pub struct GraphConfig {
    /// Page (or system user) access token
    #[arg(long, env = "FB_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Page that receives feed posts
    #[arg(long, env = "FB_PAGE_ID")]
    pub page_id: String,

    /// Ad account, including the `act_` prefix
    #[arg(long, env = "FB_AD_ACCOUNT_ID")]
    pub ad_account_id: Option<String>,

    #[arg(long, env = "FB_GRAPH_URL", default_value = DEFAULT_GRAPH_URL)]
    pub graph_url: String,

    #[arg(long, env = "FB_GRAPH_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("access_token", &"<redacted>")
            .field("page_id", &self.page_id)
            .field("ad_account_id", &self.ad_account_id)
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Where the upload/post surface listens and stores files.
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    #[arg(long, env = "BOOST_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Base address prepended to returned photo URLs
    #[arg(long, env = "BOOST_PUBLIC_URL", default_value = "http://localhost:8000")]
    pub public_url: String,

    #[arg(long, env = "BOOST_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            public_url: "http://localhost:8000".to_string(),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = GraphConfig {
            access_token: "EAAsecret".to_string(),
            page_id: "541346659065405".to_string(),
            ad_account_id: Some("act_1".to_string()),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("EAAsecret"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("541346659065405"));
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert_eq!(config.public_url, "http://localhost:8000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }
}
