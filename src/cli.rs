//! Command-line interface for chat-flow.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Host address to bind the ops API to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Durable backend connection string (overrides config file).
    pub redis_url: Option<String>,
    /// Session TTL in seconds (overrides config file).
    pub ttl_secs: Option<u64>,
    /// Key namespace prefix (overrides config file).
    pub key_prefix: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            config: None,
            redis_url: None,
            ttl_secs: None,
            key_prefix: None,
            log_level: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("host", value))?;
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("port", value))?;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('r') | Long("redis-url") => {
                result.redis_url = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("ttl") => {
                let value: String = parser.value()?.parse()?;
                result.ttl_secs = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("ttl", value))?,
                );
            }
            Long("key-prefix") => {
                result.key_prefix = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"chat-flow {version}
Finite-state conversation session manager for chat-bot services

USAGE:
    chat-flow [OPTIONS]

OPTIONS:
    -H, --host <ADDR>       Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>       Port to listen on [default: 3000]
    -c, --config <FILE>     Path to configuration file (JSON)
    -r, --redis-url <URL>   Durable backend connection string
    -t, --ttl <SECS>        Session TTL in seconds [default: 3600]
        --key-prefix <STR>  Key namespace prefix [default: chatflow:]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    CHAT_FLOW_HOST          Host address (overrides config)
    CHAT_FLOW_PORT          Port number (overrides config)
    CHAT_FLOW_REDIS_URL     Backend connection string (overrides config)
    CHAT_FLOW_TTL_SECS      Session TTL in seconds (overrides config)
    CHAT_FLOW_KEY_PREFIX    Key namespace prefix (overrides config)
    CHAT_FLOW_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, redis on the standard port)
    chat-flow

    # Point at a remote backend with a 10 minute TTL
    chat-flow -r redis://cache.internal:6379 -t 600

    # Start with config file
    chat-flow -c /etc/chat-flow/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("chat-flow {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
