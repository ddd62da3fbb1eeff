//! Plain-text rendering of controller state.

use healthbridge_client::models::{
    Appointment, AuditEntry, Doctor, Document, HealthStatus, InteractionReport, Medication,
    PatientHistoryEntry, PrescriptionScan, Severity,
};
use healthbridge_client::views::note_analyzer::NoteAnalysisView;
use healthbridge_client::views::{Notice, Stats};
use healthbridge_client::{ServiceStatus, Tab};
use std::fmt::Write;

fn dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn health_line(name: &str, health: &HealthStatus) -> String {
    let mark = if health.is_healthy() { "online" } else { "offline" };
    format!("{:<8} {} ({})", name, mark, health.status)
}

pub fn service_status(status: &ServiceStatus) -> String {
    format!(
        "{}\n{}",
        health_line("patient", &status.patient),
        health_line("ai", &status.ai)
    )
}

pub fn tabs(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            let marker = if *tab == active { "*" } else { " " };
            format!("{} {:<13} {}", marker, tab.id(), tab.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stats(stats: &Stats) -> String {
    format!(
        "Patients {}  Notes analyzed {}  Prescriptions scanned {}  Interactions checked {}",
        stats.total_patients,
        stats.notes_analyzed,
        stats.prescriptions_scanned,
        stats.interactions_checked
    )
}

pub fn audit_log(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries.".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{}  {:<28} {:<12} {}", e.timestamp, e.action, e.user, e.status))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn medications(medications: &[Medication]) -> String {
    if medications.is_empty() {
        return "No medications.".to_string();
    }
    medications
        .iter()
        .map(|m| format!("[{}] {} {} ({})", m.id, m.name, m.dosage, m.frequency))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn doctors(doctors: &[Doctor]) -> String {
    if doctors.is_empty() {
        return "No doctors found.".to_string();
    }
    let mut out = String::new();
    for d in doctors {
        let _ = write!(
            out,
            "[{}] {} - {}",
            d.id,
            d.display_name(),
            dash(d.specialization.as_deref())
        );
        if let Some(org) = d.organization_name.as_deref() {
            let _ = write!(out, " @ {}", org);
        }
        if let Some(rating) = d.rating {
            let _ = write!(out, " ({:.1})", rating);
        }
        if let Some(availability) = d.availability.as_deref() {
            let _ = write!(out, " {}", availability);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// `with_cancel` marks the rows that still offer a cancel action.
pub fn appointments(appointments: &[Appointment], with_cancel: bool) -> String {
    if appointments.is_empty() {
        return "No appointments.".to_string();
    }
    appointments
        .iter()
        .map(|a| {
            let who = a
                .patient_name
                .as_deref()
                .or(a.doctor_name.as_deref())
                .unwrap_or("Unknown");
            let mut line = format!(
                "[{}] {} {:<10} {} - {}",
                a.id, a.date_time, a.status, who, a.reason
            );
            if let Some(diagnosis) = a.diagnosis.as_deref() {
                let _ = write!(line, " | dx: {}", diagnosis);
            }
            if with_cancel && a.can_cancel() {
                line.push_str("  (cancel)");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history(entries: &[PatientHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No completed visits.".to_string();
    }
    entries
        .iter()
        .map(|h| {
            format!(
                "{} {} | {} | {}",
                h.date,
                dash(h.doctor_name.as_deref()),
                dash(h.diagnosis.as_deref()),
                dash(h.treatment_notes.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis(view: &NoteAnalysisView) -> String {
    let analysis = &view.analysis;
    let mut out = format!("Summary: {}\n", analysis.clinical_summary);

    out.push_str("Conditions:\n");
    for c in &analysis.extracted_entities.conditions {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            c.clinical_text,
            dash(c.icd_10.as_deref()),
            dash(c.severity.as_deref())
        );
    }
    out.push_str("Medications:\n");
    for m in &analysis.extracted_entities.medications {
        let _ = writeln!(
            out,
            "  {} {} {}",
            m.drug_name,
            dash(m.dosage.as_deref()),
            dash(m.frequency.as_deref())
        );
    }
    if let Some(insights) = &analysis.adherence_insights {
        if let Some(score) = insights.complexity_score {
            let _ = writeln!(out, "Regimen complexity: {}/5", score);
        }
        if !insights.barriers_identified.is_empty() {
            let _ = writeln!(out, "Barriers: {}", insights.barriers_identified.join(", "));
        }
    }
    if let Some(coaching) = &view.coaching {
        out.push_str("Coaching:\n");
        for c in coaching {
            let _ = writeln!(out, "  {}: {}", c.medication, c.message);
        }
    }
    if analysis.fhir_resources.is_some() {
        out.push_str("FHIR bundle attached.\n");
    }
    out.trim_end().to_string()
}

pub fn interactions(report: &InteractionReport) -> String {
    let mut out = String::new();
    if report.interactions.is_empty() {
        out.push_str("No interactions found.\n");
    }
    for i in &report.interactions {
        let flag = match i.severity_level() {
            Severity::High => "!!",
            Severity::Moderate => "! ",
            Severity::Low | Severity::Other => "  ",
        };
        let _ = writeln!(
            out,
            "{} {} + {} [{}]: {}",
            flag,
            i.drug_a,
            i.drug_b,
            dash(i.severity.as_deref()),
            dash(i.recommendation.as_deref())
        );
    }
    for w in &report.warnings {
        let _ = writeln!(out, "warning: {}", w);
    }
    out.trim_end().to_string()
}

pub fn scan(scan: &PrescriptionScan, saved: impl Fn(&str) -> bool) -> String {
    if scan.medications.is_empty() {
        return "No medications detected.".to_string();
    }
    scan.medications
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let state = if saved(&m.name) { " (saved)" } else { "" };
            format!(
                "{}. {} {} {}{}",
                i + 1,
                m.name,
                dash(m.dosage.as_deref()),
                dash(m.frequency.as_deref()),
                state
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn documents(documents: &[Document], unlocked: impl Fn(&str) -> bool) -> String {
    if documents.is_empty() {
        return "No documents.".to_string();
    }
    documents
        .iter()
        .map(|d| {
            let lock = if unlocked(&d.id) { "unlocked" } else { "locked" };
            format!("[{}] {} {} ({})", d.id, d.upload_date, d.filename, lock)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) => message.clone(),
        Notice::Error(message) => format!("error: {}", message),
    }
}
