//! Chat-flow binary entry point.

use std::sync::Arc;

use chat_flow::{api, cli, logging, ChatFlowError, Config, SessionStore};
use tracing::info;

#[tokio::main]
async fn main() -> chat_flow::Result<()> {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return Ok(());
    }
    if args.version {
        cli::print_version();
        return Ok(());
    }

    let config = Config::load(&args).map_err(|e| ChatFlowError::Config(e.to_string()))?;
    logging::init_with_filter(config.log_filter());

    info!("chat-flow v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(SessionStore::new(config.to_store_config()));
    info!(
        ttl_secs = config.store.ttl_secs,
        prefix = %config.store.key_prefix,
        "session store initialized"
    );

    let server_config = config
        .to_server_config()
        .map_err(|e| ChatFlowError::Config(e.to_string()))?;

    api::serve(server_config, api::AppState::new(store)).await
}
