//! Deterministic AI responses served while no model backend is configured.

use serde_json::{Value, json};

pub fn note_analysis() -> Value {
    json!({
        "status": "success",
        "clinical_summary": "Patient presented with typical symptoms of hypertension and Type 2 Diabetes. Plan involves continuing current medication regimen with Lisinopril and Metformin, indicating a chronic management strategy.",
        "extracted_entities": {
            "conditions": [
                {"clinical_text": "Hypertension", "icd_10": "I10", "confidence": 98, "severity": "Moderate"},
                {"clinical_text": "Type 2 Diabetes", "icd_10": "E11.9", "confidence": 95, "severity": "Chronic"}
            ],
            "medications": [
                {"drug_name": "Lisinopril", "dosage": "10mg", "frequency": "Daily", "confidence": 99},
                {"drug_name": "Metformin", "dosage": "500mg", "frequency": "Twice Daily", "confidence": 97}
            ]
        },
        "fhir_resources": {
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Condition", "code": {"text": "Hypertension"}}},
                {"resource": {"resourceType": "MedicationRequest", "medication": {"text": "Lisinopril"}}}
            ]
        },
        "adherence_insights": {
            "complexity_score": 3,
            "barriers_identified": ["Multiple daily doses", "Complex schedule"]
        }
    })
}

pub fn prescription_scan() -> Value {
    json!({
        "medications": [
            {"name": "Amoxicillin", "dosage": "500mg", "frequency": "Every 8 hours", "duration": "7 days"},
            {"name": "Ibuprofen", "dosage": "400mg", "frequency": "As needed", "duration": "5 days"}
        ],
        "raw_text": "DEMO MODE: Amoxicillin 500mg - 1 tab TID x 7d. Ibuprofen 400mg PRN pain."
    })
}

pub fn interactions() -> Value {
    json!({
        "interactions": [
            {
                "drug_a": "Aspirin",
                "drug_b": "Warfarin",
                "severity": "High",
                "mechanism": "Increased risk of bleeding due to combined anticoagulant/antiplatelet effects.",
                "recommendation": "Avoid combination or closely monitor INR and signs of bleeding."
            }
        ],
        "warnings": ["Check patient history for gastric ulcers."]
    })
}

pub fn coaching() -> Value {
    json!({
        "coaching_messages": [
            {"medication": "Lisinopril", "message": "Best taken in the morning to keep blood pressure stable all day.", "importance": "high", "timing": "Morning"},
            {"medication": "Metformin", "message": "Take with meals to reduce stomach sensitivity.", "importance": "moderate", "timing": "With Dinner"}
        ]
    })
}

/// `[DE-IDENTIFIED] ` followed by the first 50 characters and an ellipsis.
pub fn de_identify(note_text: &str) -> String {
    let head: String = note_text.chars().take(50).collect();
    format!("[DE-IDENTIFIED] {}...", head)
}
