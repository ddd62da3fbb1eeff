//! Drives the real router over TCP with the typed client.

use healthbridge_client::models::{
    AdherenceLog, AdherenceStatus, AppointmentStatus, ClinicalNote, Credentials, NewAppointment,
    NewDoctor, NewMedication, OrgRegistration, Registration, Role, UnlockRequest, User,
};
use healthbridge_client::{ApiClient, ClientConfig, ClientError, Service, UploadFile};
use healthbridge_server::{AppState, ServerConfig, build_router};

async fn spawn_server() -> ApiClient {
    let state = AppState::new(&ServerConfig::for_tests());
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = format!("http://{}/api", addr);
    ApiClient::new(ClientConfig::new(base.clone(), base)).unwrap()
}

async fn sign_in(client: &ApiClient, email: &str, password: &str) -> User {
    let login = client
        .login(&Credentials {
            email: email.into(),
            password: password.into(),
        })
        .await
        .unwrap();
    User::from_login(email, login)
}

#[tokio::test]
async fn test_health_probes() {
    let client = spawn_server().await;
    for service in Service::ALL {
        assert!(client.check_health(service).await.is_healthy());
    }
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_detail() {
    let client = spawn_server().await;
    let registration = Registration {
        email: "ann@example.com".into(),
        password: "pw".into(),
        full_name: Some("Ann Lee".into()),
    };
    client.register(&registration).await.unwrap();

    let err = client.register(&registration).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "Email already registered");

    let user = sign_in(&client, "ann@example.com", "pw").await;
    assert_eq!(user.role, Role::Patient);
    assert_eq!(user.user_name, "Ann Lee");
}

#[tokio::test]
async fn test_medication_lifecycle() {
    let client = spawn_server().await;
    assert_eq!(client.get_medications().await.unwrap().len(), 2);

    let created = client
        .add_medication(&NewMedication {
            name: "Atorvastatin".into(),
            dosage: "20mg".into(),
            frequency: "Nightly".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.status, "success");

    client
        .log_adherence(&AdherenceLog::now(created.data.id.clone(), AdherenceStatus::Taken))
        .await
        .unwrap();
    client.delete_medication(&created.data.id).await.unwrap();

    let err = client.delete_medication(&created.data.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let audit = client.get_audit_logs().await.unwrap();
    assert!(audit.iter().any(|entry| entry.action.starts_with("Adherence Log")));
}

#[tokio::test]
async fn test_clinical_ai_round_trip() {
    let client = spawn_server().await;

    let analysis = client
        .analyze_note(&ClinicalNote {
            patient_id: "P-1".into(),
            note_text: "Pt with T2DM on metformin".into(),
            note_date: None,
        })
        .await
        .unwrap();
    assert!(!analysis.extracted_entities.medications.is_empty());

    let scan = client
        .scan_prescription(UploadFile::new("rx.jpg", vec![0xFF, 0xD8]).with_mime("image/jpeg"))
        .await
        .unwrap();
    assert_eq!(scan.medications[0].name, "Amoxicillin");

    let report = client
        .check_interactions(&["Aspirin".to_string(), "Warfarin".to_string()])
        .await
        .unwrap();
    assert_eq!(report.interactions.len(), 1);
}

#[tokio::test]
async fn test_organization_booking_flow() {
    let client = spawn_server().await;
    client
        .register_org(&OrgRegistration {
            org_name: "St. Grace".into(),
            admin_email: "admin@grace.org".into(),
            admin_password: "admin-pw".into(),
            admin_name: "Ada".into(),
        })
        .await
        .unwrap();
    let admin = sign_in(&client, "admin@grace.org", "admin-pw").await;
    let org_id = admin.organization_id().unwrap();

    client
        .add_doctor(&NewDoctor {
            email: "grey@grace.org".into(),
            password: "doc-pw".into(),
            full_name: "Dr. Grey".into(),
            specialization: Some("Cardiology".into()),
            availability: None,
            organization_id: org_id,
        })
        .await
        .unwrap();
    let doctors = client.get_doctors(org_id, "cardio").await.unwrap();
    assert_eq!(doctors.len(), 1);

    client
        .create_appointment(&NewAppointment {
            doctor_id: doctors[0].id,
            organization_id: org_id,
            patient_id: None,
            patient_name: "Ann Lee".into(),
            date_time: "2026-11-02T09:30:00".into(),
            reason: "Checkup".into(),
        })
        .await
        .unwrap();
    let appointments = client.get_appointments(org_id).await.unwrap();
    assert_eq!(appointments.len(), 1);

    client
        .update_appointment(appointments[0].id, AppointmentStatus::Cancelled)
        .await
        .unwrap();
    let err = client
        .update_appointment(appointments[0].id, AppointmentStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_document_requires_grant() {
    let client = spawn_server().await;
    client
        .register(&Registration {
            email: "ann@example.com".into(),
            password: "vault-pw".into(),
            full_name: None,
        })
        .await
        .unwrap();
    let user = sign_in(&client, "ann@example.com", "vault-pw").await;

    client
        .upload_document(
            user.user_id,
            UploadFile::new("labs.txt", b"HbA1c 6.9".to_vec()).with_mime("text/plain"),
        )
        .await
        .unwrap();
    let documents = client.get_documents(user.user_id).await.unwrap();
    assert_eq!(documents.len(), 1);
    let document_id = documents[0].id.clone();

    let err = client
        .unlock_document(
            &document_id,
            &UnlockRequest {
                user_id: user.user_id,
                password: "guess".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    let grant = client
        .unlock_document(
            &document_id,
            &UnlockRequest {
                user_id: user.user_id,
                password: "vault-pw".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(client.fetch_document(&grant).await.unwrap(), b"HbA1c 6.9");

    let mut forged = grant.clone();
    forged.access_token = "forged".into();
    let err = client.fetch_document(&forged).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}
