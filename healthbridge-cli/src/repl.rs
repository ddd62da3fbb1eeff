use anyhow::Context;
use healthbridge_client::models::User;
use healthbridge_client::{ClientError, Dashboard, Shell, Tab};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::dashboards::{
    DOCTOR_HELP, DoctorDashboard, ORG_HELP, OrgDashboard, PATIENT_HELP, PatientDashboard, Reply,
    WORKSPACE_HELP, Workspace,
};
use crate::input::split_words;
use crate::render;

const COMMON_HELP: &str = "\
help                                      this text
status                                    probe both services
whoami                                    the signed-in user
logout | quit                             end the session";

enum Mounted {
    Org(OrgDashboard),
    Doctor(DoctorDashboard),
    Patient(Box<PatientDashboard>),
    Workspace(Box<Workspace>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Continue,
    Logout,
    Quit,
}

#[derive(Debug, PartialEq)]
pub struct Step {
    pub output: String,
    pub exit: Exit,
}

impl Step {
    fn print(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit: Exit::Continue,
        }
    }
}

/// One mounted dashboard plus the shell that owns the session.
pub struct Repl {
    shell: Shell,
    dashboard: Dashboard,
    mounted: Mounted,
}

impl Repl {
    /// Begins a session for `user` and mounts the dashboard for its role.
    pub async fn sign_in(shell: Shell, user: User) -> Result<Self, ClientError> {
        let (session, dashboard) = shell.enter(user).await;
        let client = shell.client().clone();
        let mounted = match dashboard {
            Dashboard::OrgAdmin => {
                let organization_id = session.user.organization_id().ok_or_else(|| {
                    ClientError::validation("This administrator has no organization.")
                })?;
                Mounted::Org(OrgDashboard::new(client, organization_id))
            }
            Dashboard::Doctor => Mounted::Doctor(DoctorDashboard::new(client, session.user)),
            Dashboard::Patient => {
                Mounted::Patient(Box::new(PatientDashboard::new(client, session.user)))
            }
            Dashboard::ClinicalWorkspace => Mounted::Workspace(Box::new(Workspace::new(client))),
        };
        Ok(Self {
            shell,
            dashboard,
            mounted,
        })
    }

    /// The clinical workspace without a signed-in user.
    pub fn workspace(shell: Shell) -> Self {
        let client = shell.client().clone();
        Self {
            shell,
            dashboard: Dashboard::ClinicalWorkspace,
            mounted: Mounted::Workspace(Box::new(Workspace::new(client))),
        }
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard
    }

    fn help(&self) -> String {
        let specific = match self.mounted {
            Mounted::Org(_) => ORG_HELP,
            Mounted::Doctor(_) => DOCTOR_HELP,
            Mounted::Patient(_) => PATIENT_HELP,
            Mounted::Workspace(_) => WORKSPACE_HELP,
        };
        format!("{}\n\n{}", specific, COMMON_HELP)
    }

    pub async fn execute(&mut self, line: &str) -> Step {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => return Step::print(format!("error: {}", e)),
        };
        let Some((command, args)) = words.split_first() else {
            return Step::print("");
        };

        match (command.as_str(), args) {
            ("help", _) => return Step::print(self.help()),
            ("status", []) => {
                let status = self.shell.probe_services().await;
                return Step::print(render::service_status(&status));
            }
            ("whoami", []) => {
                let text = match self.shell.current().await {
                    Some(session) => format!(
                        "{} <{}> ({}) - {}",
                        session.user.user_name,
                        session.user.email,
                        session.user.role,
                        self.dashboard.title()
                    ),
                    None => format!("Not signed in - {}", self.dashboard.title()),
                };
                return Step::print(text);
            }
            ("logout", []) => {
                return Step {
                    output: "Signed out.".into(),
                    exit: Exit::Logout,
                };
            }
            ("quit" | "exit", []) => {
                return Step {
                    output: String::new(),
                    exit: Exit::Quit,
                };
            }
            _ => {}
        }

        let reply = match &mut self.mounted {
            Mounted::Org(board) => board.handle(command, args).await,
            Mounted::Doctor(board) => board.handle(command, args).await,
            Mounted::Patient(board) => board.handle(command, args).await,
            Mounted::Workspace(workspace) => {
                let reply = match (command.as_str(), args) {
                    ("tab", []) => Reply::Text(render::tabs(workspace.active)),
                    ("tab", [id]) => {
                        workspace.active = Tab::from_id(id);
                        Reply::Text(render::tabs(workspace.active))
                    }
                    _ => workspace.handle(command, args).await,
                };
                let active = workspace.active;
                self.sync_tab(active).await;
                reply
            }
        };

        match reply {
            Reply::Text(text) => Step::print(text),
            Reply::Unknown => Step::print(format!(
                "Unknown command '{}'. Type 'help' for the commands of this dashboard.",
                command
            )),
        }
    }

    /// Keeps the session's active tab in step with the workspace.
    async fn sync_tab(&self, tab: Tab) {
        let Some(session) = self.shell.current().await else {
            return;
        };
        if session.active_tab == tab {
            return;
        }
        if let Err(e) = self.shell.switch_tab(tab).await {
            warn!("Failed to record active tab {}: {}", tab.id(), e);
        }
    }

    /// Stops background work and ends the session.
    pub async fn close(mut self) {
        if let Mounted::Workspace(workspace) = &mut self.mounted {
            workspace.stop();
        }
        if let Some(session) = self.shell.logout().await {
            info!(session_id = %session.id, "Signed out");
        }
    }

    /// Reads commands from stdin until `logout`, `quit` or end of input.
    pub async fn run(mut self) -> anyhow::Result<Exit> {
        println!("{}. Type 'help' for commands.", self.dashboard.title());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let exit = loop {
            print!("{}> ", self.dashboard.title());
            std::io::stdout().flush().context("failed to flush stdout")?;

            let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
                break Exit::Quit;
            };
            let step = self.execute(&line).await;
            if !step.output.is_empty() {
                println!("{}", step.output);
            }
            if step.exit != Exit::Continue {
                break step.exit;
            }
        };
        self.close().await;
        Ok(exit)
    }
}
