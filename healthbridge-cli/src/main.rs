mod args;
mod dashboards;
mod input;
mod render;
mod repl;

use anyhow::Context;
use clap::Parser;
use healthbridge_client::views::AuthFlow;
use healthbridge_client::{ApiClient, InMemorySessionStore, Shell};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Args, Command};
use crate::repl::Repl;

/// Logs go to stderr so they never interleave with dashboard output.
/// `LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "healthbridge_cli=warn,healthbridge_client=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let client = ApiClient::new(args.client_config()).context("failed to build HTTP client")?;
    let shell = Shell::new(client.clone(), Arc::new(InMemorySessionStore::new()));

    let mut auth = AuthFlow::new(client);
    let user = match args.command {
        Command::Health => {
            let status = shell.probe_services().await;
            println!("{}", render::service_status(&status));
            return Ok(());
        }
        Command::Workspace => {
            Repl::workspace(shell).run().await?;
            return Ok(());
        }
        Command::Login { email, password } => auth.login(&email, &password).await,
        Command::Register {
            email,
            password,
            full_name,
        } => auth.register_patient(&full_name, &email, &password).await,
        Command::RegisterOrg {
            org_name,
            admin_name,
            admin_email,
            admin_password,
        } => {
            auth.register_organization(&org_name, &admin_name, &admin_email, &admin_password)
                .await
        }
    };
    let user = user?;

    println!("Welcome, {}.", user.user_name);
    Repl::sign_in(shell, user).await?.run().await?;
    Ok(())
}
