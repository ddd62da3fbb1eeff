//! Command handlers for each mounted dashboard. Every handler returns the
//! text to print; controller failures come back as the controller's inline
//! error string.

use healthbridge_client::models::{AdherenceStatus, AppointmentStatus, DoctorUpdate, NewMedication, User};
use healthbridge_client::views::{
    DocumentVault, DoctorPortal, InteractionChecker, MedicationManager, NoteAnalyzer, NoteForm,
    OrgConsole, Overview, PatientPortal, PrescriptionScanner,
};
use healthbridge_client::{ApiClient, ClientError, Result, Tab, UploadFile};

use crate::render;

pub const ORG_HELP: &str = "\
doctors [search]                                        list or search doctors
add-doctor <name> <email> <password> [specialty] [hours] add a doctor
update-doctor <id> <name|-> [specialty|-] [hours|-]     edit a doctor
remove-doctor <id>                                      remove a doctor
appointments                                            list appointments
schedule <doctor_id> <patient> <date_time> [reason]     schedule an appointment
complete <id> | cancel <id>                             close a scheduled appointment";

pub const DOCTOR_HELP: &str = "\
appointments                              your schedule, oldest first
complete <id> <diagnosis> [notes]         record a consultation
history <patient name>                    completed visits for a patient";

pub const PATIENT_HELP: &str = "\
doctors [specialization]                  browse the doctor directory
appointments                              your appointments
book <doctor_id> <date_time> <reason>     book an appointment
cancel <id>                               cancel a scheduled appointment
profile <full name> [new password]        update your profile
docs                                      list your documents
upload <path>                             upload a document
unlock <doc_id> <password>                unlock a document
open <doc_id> [save to]                   show or save an unlocked document";

pub const WORKSPACE_HELP: &str = "\
tab [id]                                  list or switch tabs
stats | audit                             executive overview
analyze <patient_id> <note...>            analyze a clinical note
deidentify <patient_id> <note...>         de-identify a clinical note
scan <path> | save <n>                    scan a prescription, save a result
interactions <med> <med> [...]            check drug interactions
meds                                      medication list
add-med <name> <dosage> <frequency>       add a medication
rm-med <id> | taken <id> | skipped <id>   manage or log a medication";

/// What a dashboard made of one command.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Unknown,
}

fn done(result: Result<String>) -> Reply {
    Reply::Text(match result {
        Ok(text) => text,
        Err(e) => format!("error: {}", e.message()),
    })
}

fn usage(text: &str) -> Reply {
    Reply::Text(format!("usage: {}", text))
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| ClientError::validation(format!("Invalid id: {}", raw)))
}

fn optional(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| *v != "-" && !v.is_empty())
}

pub struct OrgDashboard {
    console: OrgConsole,
}

impl OrgDashboard {
    pub fn new(client: ApiClient, organization_id: i64) -> Self {
        Self {
            console: OrgConsole::new(client, organization_id),
        }
    }

    pub async fn handle(&mut self, command: &str, args: &[String]) -> Reply {
        let console = &mut self.console;
        match (command, args) {
            ("doctors", []) => done(
                console
                    .load_doctors()
                    .await
                    .map(|_| render::doctors(&console.doctors)),
            ),
            ("doctors", terms) => done(
                console
                    .search_doctors(&terms.join(" "))
                    .await
                    .map(|_| render::doctors(&console.doctors)),
            ),
            ("add-doctor", [name, email, password, rest @ ..]) if rest.len() <= 2 => done(
                console
                    .add_doctor(name, email, password, optional(rest.first()), optional(rest.get(1)))
                    .await
                    .map(|_| render::doctors(&console.doctors)),
            ),
            ("add-doctor", _) => usage("add-doctor <name> <email> <password> [specialty] [hours]"),
            ("update-doctor", [id, rest @ ..]) if !rest.is_empty() && rest.len() <= 3 => {
                let update = DoctorUpdate {
                    full_name: optional(rest.first()).map(str::to_string),
                    specialization: optional(rest.get(1)).map(str::to_string),
                    availability: optional(rest.get(2)).map(str::to_string),
                };
                let result: Result<String> = async {
                    console.update_doctor(parse_id(id)?, update).await?;
                    Ok(render::doctors(&console.doctors))
                }
                .await;
                done(result)
            }
            ("update-doctor", _) => usage("update-doctor <id> <name|-> [specialty|-] [hours|-]"),
            ("remove-doctor", [id]) => {
                let result: Result<String> = async {
                    console.delete_doctor(parse_id(id)?).await?;
                    Ok(render::doctors(&console.doctors))
                }
                .await;
                done(result)
            }
            ("appointments", []) => done(
                console
                    .load_appointments()
                    .await
                    .map(|_| render::appointments(&console.appointments, false)),
            ),
            ("schedule", [doctor_id, patient, date_time, reason @ ..]) => {
                let result: Result<String> = async {
                    console
                        .create_appointment(parse_id(doctor_id)?, patient, date_time, &reason.join(" "))
                        .await?;
                    Ok(render::appointments(&console.appointments, false))
                }
                .await;
                done(result)
            }
            ("schedule", _) => usage("schedule <doctor_id> <patient> <date_time> [reason]"),
            (verb @ ("complete" | "cancel"), [id]) => {
                let status = if verb == "complete" {
                    AppointmentStatus::Completed
                } else {
                    AppointmentStatus::Cancelled
                };
                let result: Result<String> = async {
                    console.set_appointment_status(parse_id(id)?, status).await?;
                    Ok(render::appointments(&console.appointments, false))
                }
                .await;
                done(result)
            }
            _ => Reply::Unknown,
        }
    }
}

pub struct DoctorDashboard {
    portal: DoctorPortal,
}

impl DoctorDashboard {
    pub fn new(client: ApiClient, doctor: User) -> Self {
        Self {
            portal: DoctorPortal::new(client, doctor),
        }
    }

    pub async fn handle(&mut self, command: &str, args: &[String]) -> Reply {
        let portal = &mut self.portal;
        match (command, args) {
            ("appointments", []) => done(
                portal
                    .load()
                    .await
                    .map(|_| render::appointments(&portal.appointments, false)),
            ),
            ("complete", [id, diagnosis, notes @ ..]) => {
                let result: Result<String> = async {
                    if portal.appointments.is_empty() {
                        portal.load().await?;
                    }
                    portal
                        .complete(parse_id(id)?, diagnosis, &notes.join(" "))
                        .await?;
                    Ok(render::appointments(&portal.appointments, false))
                }
                .await;
                done(result)
            }
            ("complete", _) => usage("complete <id> <diagnosis> [notes]"),
            ("history", []) => usage("history <patient name>"),
            ("history", name) => done(
                portal
                    .search_history(&name.join(" "))
                    .await
                    .map(|_| render::history(&portal.history)),
            ),
            _ => Reply::Unknown,
        }
    }
}

pub struct PatientDashboard {
    portal: PatientPortal,
    vault: DocumentVault,
}

impl PatientDashboard {
    pub fn new(client: ApiClient, patient: User) -> Self {
        let vault = DocumentVault::new(client.clone(), patient.user_id);
        Self {
            portal: PatientPortal::new(client, patient),
            vault,
        }
    }

    fn notice(&self) -> String {
        self.portal
            .notice
            .as_ref()
            .map(render::notice)
            .unwrap_or_default()
    }

    pub async fn handle(&mut self, command: &str, args: &[String]) -> Reply {
        match (command, args) {
            ("doctors", specialization) => {
                let portal = &mut self.portal;
                portal.specialization = specialization.join(" ");
                done(
                    portal
                        .load_doctors()
                        .await
                        .map(|_| render::doctors(&portal.doctors)),
                )
            }
            ("appointments", []) => {
                let portal = &mut self.portal;
                done(
                    portal
                        .load_appointments()
                        .await
                        .map(|_| render::appointments(&portal.appointments, true)),
                )
            }
            ("book", [doctor_id, date_time, reason @ ..]) => {
                let result = self.book(doctor_id, date_time, &reason.join(" ")).await;
                done(result)
            }
            ("book", _) => usage("book <doctor_id> <date_time> <reason>"),
            ("cancel", [id]) => {
                let result: Result<String> = async {
                    let id = parse_id(id)?;
                    if self.portal.appointments.is_empty() {
                        self.portal.load_appointments().await?;
                    }
                    self.portal.cancel(id).await?;
                    Ok(format!(
                        "{}\n{}",
                        self.notice(),
                        render::appointments(&self.portal.appointments, true)
                    ))
                }
                .await;
                done(result)
            }
            ("profile", [full_name, password @ ..]) if password.len() <= 1 => {
                let password = password.first().map(String::as_str);
                let result = self.portal.update_profile(full_name, password).await;
                done(result.map(|_| self.notice()))
            }
            ("profile", _) => usage("profile <full name> [new password]"),
            ("docs", []) => {
                let vault = &mut self.vault;
                done(vault.load().await.map(|_| {
                    render::documents(&vault.documents, |id| vault.is_unlocked(id))
                }))
            }
            ("upload", [path]) => {
                let result: Result<String> = async {
                    let file = UploadFile::from_path(path).await?;
                    self.vault.upload(file).await?;
                    let vault = &self.vault;
                    Ok(render::documents(&vault.documents, |id| vault.is_unlocked(id)))
                }
                .await;
                done(result)
            }
            ("unlock", [id, password]) => done(
                self.vault
                    .unlock(id, password)
                    .await
                    .map(|_| format!("Document {} unlocked.", id)),
            ),
            ("open", [id, target @ ..]) if target.len() <= 1 => {
                let result: Result<String> = async {
                    let bytes = self.vault.open(id).await?;
                    match target.first() {
                        Some(path) => {
                            tokio::fs::write(path, &bytes).await.map_err(|e| {
                                ClientError::validation(format!("Cannot write {}: {}", path, e))
                            })?;
                            Ok(format!("Saved {} bytes to {}", bytes.len(), path))
                        }
                        None => Ok(match String::from_utf8(bytes) {
                            Ok(text) => text,
                            Err(e) => format!(
                                "{} bytes of binary content; pass a path to save it.",
                                e.as_bytes().len()
                            ),
                        }),
                    }
                }
                .await;
                done(result)
            }
            ("open", _) => usage("open <doc_id> [save to]"),
            _ => Reply::Unknown,
        }
    }

    async fn book(&mut self, doctor_id: &str, date_time: &str, reason: &str) -> Result<String> {
        let doctor_id = parse_id(doctor_id)?;
        if !self.portal.doctors.iter().any(|d| d.id == doctor_id) {
            self.portal.load_doctors().await?;
        }
        let doctor = self
            .portal
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .cloned()
            .ok_or_else(|| ClientError::validation(format!("No doctor with id {}", doctor_id)))?;
        self.portal.book(&doctor, date_time, reason).await?;
        Ok(format!(
            "{}\n{}",
            self.notice(),
            render::appointments(&self.portal.appointments, true)
        ))
    }
}

/// The tabbed clinical workstation.
pub struct Workspace {
    pub active: Tab,
    overview: Overview,
    notes: NoteAnalyzer,
    scanner: PrescriptionScanner,
    checker: InteractionChecker,
    medications: MedicationManager,
}

impl Workspace {
    pub fn new(client: ApiClient) -> Self {
        Self {
            active: Tab::default(),
            overview: Overview::new(client.clone()),
            notes: NoteAnalyzer::new(client.clone()),
            scanner: PrescriptionScanner::new(client.clone()),
            checker: InteractionChecker::new(client.clone()),
            medications: MedicationManager::new(client),
        }
    }

    /// The tab a command belongs to, if it belongs to one.
    pub fn tab_of(command: &str) -> Option<Tab> {
        match command {
            "stats" | "audit" => Some(Tab::Overview),
            "analyze" | "deidentify" => Some(Tab::Clinical),
            "scan" | "save" => Some(Tab::Prescription),
            "interactions" => Some(Tab::Interactions),
            "meds" | "add-med" | "rm-med" | "taken" | "skipped" => Some(Tab::Medications),
            _ => None,
        }
    }

    pub async fn handle(&mut self, command: &str, args: &[String]) -> Reply {
        if let Some(tab) = Self::tab_of(command) {
            self.active = tab;
        }
        match (command, args) {
            ("stats", []) => Reply::Text(render::stats(&self.overview.stats())),
            ("audit", []) => {
                self.overview.fetch_audit_logs().await;
                Reply::Text(render::audit_log(&self.overview.audit_logs))
            }
            (verb @ ("analyze" | "deidentify"), [patient_id, note @ ..]) => {
                self.notes.form = NoteForm {
                    patient_id: patient_id.clone(),
                    note_text: note.join(" "),
                    note_date: None,
                };
                let notes = &mut self.notes;
                if verb == "analyze" {
                    let result = notes.submit().await;
                    done(result.map(|_| {
                        notes.result.as_ref().map(render::analysis).unwrap_or_default()
                    }))
                } else {
                    let result = notes.de_identify().await;
                    done(result.map(|_| notes.de_identified_text.clone().unwrap_or_default()))
                }
            }
            ("analyze" | "deidentify", _) => usage("analyze <patient_id> <note...>"),
            ("scan", [path]) => {
                let result: Result<String> = async {
                    let file = UploadFile::from_path(path).await?;
                    self.scanner.select_file(file);
                    self.scanner.submit().await?;
                    Ok(self.scan_listing())
                }
                .await;
                done(result)
            }
            ("save", [index]) => {
                let picked = index
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.scanner.result.as_ref()?.medications.get(i).cloned());
                match picked {
                    Some(medication) => {
                        self.scanner.save_medication(&medication).await;
                        Reply::Text(self.scan_listing())
                    }
                    None => Reply::Text("error: No scanned medication with that number.".into()),
                }
            }
            ("interactions", names) => {
                self.checker.set_all(names.iter().cloned());
                let checker = &mut self.checker;
                done(checker.submit().await.map(|_| {
                    checker.result.as_ref().map(render::interactions).unwrap_or_default()
                }))
            }
            ("meds", []) => {
                let medications = &mut self.medications;
                done(
                    medications
                        .load()
                        .await
                        .map(|_| render::medications(&medications.medications)),
                )
            }
            ("add-med", [name, dosage, frequency]) => {
                let new = NewMedication {
                    name: name.clone(),
                    dosage: dosage.clone(),
                    frequency: frequency.clone(),
                };
                let medications = &mut self.medications;
                done(
                    medications
                        .add(new)
                        .await
                        .map(|_| render::medications(&medications.medications)),
                )
            }
            ("add-med", _) => usage("add-med <name> <dosage> <frequency>"),
            ("rm-med", [id]) => {
                let medications = &mut self.medications;
                done(
                    medications
                        .delete(id)
                        .await
                        .map(|_| render::medications(&medications.medications)),
                )
            }
            (verb @ ("taken" | "skipped"), [id]) => {
                let status = if verb == "taken" {
                    AdherenceStatus::Taken
                } else {
                    AdherenceStatus::Skipped
                };
                done(
                    self.medications
                        .log_adherence(id, status)
                        .await
                        .map(|_| format!("Logged {} as {}.", id, verb)),
                )
            }
            _ => Reply::Unknown,
        }
    }

    fn scan_listing(&self) -> String {
        self.scanner
            .result
            .as_ref()
            .map(|scan| render::scan(scan, |name| self.scanner.is_saved(name)))
            .unwrap_or_default()
    }

    pub fn stop(&mut self) {
        self.overview.stop();
    }
}
