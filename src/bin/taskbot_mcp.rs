//! MCP server binary for taskbot.
//!
//! This binary runs an MCP server that exposes task tracking through stdio
//! transport. Logs go to stderr.

use rmcp::ServiceExt;
use taskbot::config::BotConfig;
use taskbot::mcp::TaskbotServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os("TASKBOT_CONFIG").map(std::path::PathBuf::from);
    let config = BotConfig::load_or_default(config_path.as_deref())?;
    taskbot::logging::init(config.log_filter.as_deref());

    let server = TaskbotServer::new(config)?;
    tracing::info!("MCP server created, starting stdio transport");
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running");
    service.waiting().await?;
    tracing::info!("MCP server stopped");

    Ok(())
}
