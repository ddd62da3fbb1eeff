use clap::{Parser, Subcommand};
use healthbridge_client::ClientConfig;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(version, about)]
/// HealthBridge terminal client.
///
/// Service URLs and the API token are read from PATIENT_SERVICE_URL,
/// AI_SERVICE_URL and HEALTHBRIDGE_API_TOKEN; the flags below override them.
pub struct Args {
    /// Base URL of the patient service, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    pub patient_url: Option<String>,

    /// Base URL of the AI service
    #[arg(long, global = true)]
    pub ai_url: Option<String>,

    /// Bearer token sent on every request
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Probe both services
    Health,
    /// Sign in and open the dashboard for your role
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a patient account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        full_name: String,
    },
    /// Create an organization with its admin and sign the admin in
    RegisterOrg {
        #[arg(long)]
        org_name: String,
        #[arg(long)]
        admin_name: String,
        #[arg(long)]
        admin_email: String,
        #[arg(long)]
        admin_password: String,
    },
    /// Open the clinical workspace (overview, notes, scanner, safety, care)
    Workspace,
}

impl Args {
    /// Environment first, then flags.
    pub fn client_config(&self) -> ClientConfig {
        let env = ClientConfig::from_env();
        let mut config = ClientConfig::new(
            self.patient_url
                .clone()
                .unwrap_or(env.patient_service_url),
            self.ai_url.clone().unwrap_or(env.ai_service_url),
        )
        .with_bearer_token(self.token.clone().unwrap_or(env.bearer_token));
        config.timeout = self.timeout.map(Duration::from_secs).unwrap_or(env.timeout);
        config
    }
}
