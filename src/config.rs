//! Client configuration from command-line flags and environment variables.

use clap::builder::TypedValueParser;
use clap::Args;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api2.openreview.net";
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub page_size: usize,
    pub max_concurrent: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// API connection flags shared by the subcommands that talk to OpenReview.
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// API base URL.
    #[arg(long, env = "OPENREVIEW_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Account username. Omit for anonymous access to public data.
    #[arg(long, env = "OPENREVIEW_USERNAME")]
    pub username: Option<String>,

    /// Account password.
    #[arg(long, env = "OPENREVIEW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Notes requested per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub page_size: usize,

    /// Pages fetched concurrently.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT, value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub max_concurrent: usize,
}

impl TryFrom<ApiArgs> for ClientConfig {
    type Error = Error;

    fn try_from(args: ApiArgs) -> Result<Self> {
        let credentials = match (args.username, args.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::Config("username given without password".into()))
            }
            (None, Some(_)) => {
                return Err(Error::Config("password given without username".into()))
            }
        };
        Ok(Self {
            base_url: args.base_url,
            credentials,
            page_size: args.page_size,
            max_concurrent: args.max_concurrent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(username: Option<&str>, password: Option<&str>) -> ApiArgs {
        ApiArgs {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.map(String::from),
            password: password.map(String::from),
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    #[test]
    fn test_anonymous_config() {
        let config = ClientConfig::try_from(args(None, None)).unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_credentials_must_come_in_pairs() {
        assert!(matches!(
            ClientConfig::try_from(args(Some("me"), None)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ClientConfig::try_from(args(None, Some("pw"))),
            Err(Error::Config(_))
        ));
        let config = ClientConfig::try_from(args(Some("me"), Some("pw"))).unwrap();
        assert_eq!(config.credentials.unwrap().username, "me");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "me".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("me"));
        assert!(!printed.contains("hunter2"));
    }
}
