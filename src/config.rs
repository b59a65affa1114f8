use crate::cli::OutputFormat;
use crate::research::Screen;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Environment prefix for layered settings, e.g. `LRC_SERVER__PORT=8000`.
const ENV_PREFIX: &str = "LRC";

/// Config file picked up from the working directory when none is named.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the research API
    #[arg(long, env = "RESEARCH_API_URL")]
    pub research_url: Option<String>,

    /// Ask a single question and print the answer instead of serving the UI
    #[arg(long)]
    pub ask: Option<String>,

    /// Screen whose endpoint and response shape `--ask` uses
    #[arg(long, value_enum, default_value_t = Screen::Research)]
    pub screen: Screen,

    /// Output format for `--ask`
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress the progress spinner
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub research: ResearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Idle seconds after which a conversation is dropped.
    pub session_timeout_secs: u64,
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

/// Where the research API lives and how its endpoints are laid out.
#[derive(Debug, Deserialize, Clone)]
pub struct ResearchConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,
    /// Base URL for document links built from search results.
    pub doc_base_url: String,
    /// Endpoint path of the document search (draft screen).
    pub search_path: String,
    /// Endpoint path of the research memo (research screen).
    pub memo_path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the configuration from already-parsed arguments.
    ///
    /// Priority: CLI flag > CLI env var > `LRC_` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.session_timeout_secs", 30 * 60)?
            .set_default("research.base_url", "http://127.0.0.1:8000/")?
            .set_default("research.doc_base_url", "https://indiankanoon.org")?
            .set_default("research.search_path", "api/legal/research/")?
            .set_default("research.memo_path", "legal/research/")?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(url) = &cli.research_url {
            builder = builder.set_override("research.base_url", url.as_str())?;
        }

        // Unprefixed override for the document link base.
        if let Ok(val) = env::var("DOC_BASE_URL") {
            if !val.trim().is_empty() {
                builder = builder.set_override("research.doc_base_url", val)?;
            }
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_joins_host_and_port() {
        let server = ServerConfig {
            port: 8080,
            host: "0.0.0.0".into(),
            session_timeout_secs: 90,
        };
        assert_eq!(server.address(), "0.0.0.0:8080");
        assert_eq!(server.session_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["legal-research-chat"]).unwrap();
        assert!(cli.ask.is_none());
        assert_eq!(cli.screen, Screen::Research);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_ask_mode() {
        let cli = Cli::try_parse_from([
            "legal-research-chat",
            "--ask",
            "what is consideration",
            "--screen",
            "draft",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.ask.as_deref(), Some("what is consideration"));
        assert_eq!(cli.screen, Screen::Draft);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
