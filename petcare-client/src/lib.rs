pub mod auth;
pub mod config;
pub mod control;
pub mod error;
pub mod session;

pub mod commands;
pub mod notification;
pub mod output;
pub mod report;

pub mod server;
pub mod util;

pub mod tui;
// === CLI entrypoint ===
pub mod cli;

#[cfg(test)]
mod testing;

/// Entrypoint used by `main.rs` and tests to run the full CLI.
pub async fn run_cli() -> anyhow::Result<()> {
    cli::cli().await
}
