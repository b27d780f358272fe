//! Risk categories and their trigger phrases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health-risk topic a query can touch on.
///
/// Variants are declared in detection order, which is also their `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SafetyCategory {
    /// Pregnancy and the postnatal period
    Pregnancy,
    /// Heart and blood pressure
    Cardiovascular,
    /// Bones, joints and injuries
    Musculoskeletal,
    /// Glaucoma and other eye conditions
    EyeConditions,
    /// Recovery after an operation
    SurgeryRecovery,
    /// Seizures, vertigo and nerve conditions
    NeurologicalConditions,
    /// Asthma and lung conditions
    RespiratoryConditions,
    /// Chronic and systemic illness
    OtherConditions,
    /// Older practitioners
    AgeRelated,
    /// Anxiety, trauma and mood
    MentalHealth,
}

impl SafetyCategory {
    /// Every category, in the order queries are scanned.
    pub const ALL: [Self; 10] = [
        Self::Pregnancy,
        Self::Cardiovascular,
        Self::Musculoskeletal,
        Self::EyeConditions,
        Self::SurgeryRecovery,
        Self::NeurologicalConditions,
        Self::RespiratoryConditions,
        Self::OtherConditions,
        Self::AgeRelated,
        Self::MentalHealth,
    ];

    /// Order in which a matched category's message wins.
    ///
    /// Deliberately differs from [`Self::ALL`]: surgery recovery and eye
    /// conditions outrank musculoskeletal, and other conditions come last.
    pub const PRIORITY: [Self; 10] = [
        Self::Pregnancy,
        Self::Cardiovascular,
        Self::SurgeryRecovery,
        Self::EyeConditions,
        Self::NeurologicalConditions,
        Self::Musculoskeletal,
        Self::RespiratoryConditions,
        Self::MentalHealth,
        Self::AgeRelated,
        Self::OtherConditions,
    ];

    /// Stable identifier used in logs and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pregnancy => "pregnancy",
            Self::Cardiovascular => "cardiovascular",
            Self::Musculoskeletal => "musculoskeletal",
            Self::EyeConditions => "eyeConditions",
            Self::SurgeryRecovery => "surgeryRecovery",
            Self::NeurologicalConditions => "neurologicalConditions",
            Self::RespiratoryConditions => "respiratoryConditions",
            Self::OtherConditions => "otherConditions",
            Self::AgeRelated => "ageRelated",
            Self::MentalHealth => "mentalHealth",
        }
    }

    /// Lower-case trigger phrases, matched as substrings.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Pregnancy => &[
                "pregnant",
                "pregnancy",
                "first trimester",
                "second trimester",
                "third trimester",
                "trimester",
                "prenatal",
                "postnatal",
                "postpartum",
                "expecting",
                "expecting a baby",
                "baby bump",
                "morning sickness",
                "gestational",
                "conceived",
                "conception",
                "maternity",
                "breastfeeding",
                "nursing mother",
            ],
            Self::Cardiovascular => &[
                "high blood pressure",
                "hypertension",
                "low blood pressure",
                "hypotension",
                "heart disease",
                "heart condition",
                "heart attack",
                "cardiac",
                "cardiovascular",
                "arrhythmia",
                "palpitations",
                "stroke",
                "blood clot",
                "thrombosis",
                "aneurysm",
            ],
            Self::Musculoskeletal => &[
                "hernia",
                "herniated disc",
                "slipped disc",
                "back injury",
                "spine injury",
                "spinal cord",
                "scoliosis",
                "sciatica",
                "arthritis",
                "osteoporosis",
                "fracture",
                "broken bone",
                "torn ligament",
                "torn muscle",
                "rotator cuff",
                "knee injury",
                "hip replacement",
                "joint replacement",
                "carpal tunnel",
                "tendonitis",
            ],
            Self::EyeConditions => &[
                "glaucoma",
                "detached retina",
                "retinal detachment",
                "eye surgery",
                "lasik",
                "cataract",
                "eye pressure",
                "macular degeneration",
            ],
            Self::SurgeryRecovery => &[
                "recent surgery",
                "post surgery",
                "post-surgery",
                "after surgery",
                "recovering from surgery",
                "surgical",
                "operation",
                "post-operative",
                "postoperative",
                "stitches",
                "incision",
            ],
            Self::NeurologicalConditions => &[
                "epilepsy",
                "seizure",
                "vertigo",
                "dizziness",
                "migraine",
                "concussion",
                "head injury",
                "brain injury",
                "multiple sclerosis",
                "parkinsons",
                "parkinson's",
                "neuropathy",
            ],
            Self::RespiratoryConditions => &[
                "asthma",
                "copd",
                "bronchitis",
                "emphysema",
                "breathing difficulty",
                "shortness of breath",
                "respiratory condition",
                "lung disease",
                "pneumonia",
            ],
            Self::OtherConditions => &[
                "diabetes",
                "diabetic",
                "kidney disease",
                "liver disease",
                "cancer",
                "tumor",
                "chemotherapy",
                "radiation therapy",
                "autoimmune",
                "lupus",
                "fibromyalgia",
                "chronic fatigue",
                "chronic pain",
                "infection",
                "fever",
                "inflammation",
                "swelling",
            ],
            Self::AgeRelated => &[
                "elderly",
                "senior citizen",
                "senior",
                "old age",
                "aging",
                "aged",
                "70 years",
                "80 years",
                "90 years",
                "geriatric",
            ],
            Self::MentalHealth => &[
                "anxiety",
                "depression",
                "anxiety disorder",
                "panic attack",
                "panic disorder",
                "ptsd",
                "trauma",
                "severe depression",
                "clinical depression",
                "bipolar",
                "schizophrenia",
                "stress",
                "mental health",
                "suicidal",
                "self-harm",
            ],
        }
    }
}

impl fmt::Display for SafetyCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
