//! Normalized FIR record types.
//!
//! These are produced by [`super::validation::validate`] and never mutated
//! afterwards. The serde shape mirrors the JSON payload the form submits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Statutory code family a charge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ChargeCode {
    /// Bharatiya Nyaya Sanhita
    #[serde(rename = "BNS")]
    Bns,
    /// Bharatiya Sakshya Adhiniyam
    #[serde(rename = "BSA")]
    Bsa,
    /// Bharatiya Nagarik Suraksha Sanhita
    #[serde(rename = "BNSS")]
    Bnss,
}

impl ChargeCode {
    pub const ALL: [ChargeCode; 3] = [ChargeCode::Bns, ChargeCode::Bsa, ChargeCode::Bnss];

    /// External label, used both on the wire and in the rendered document.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bns => "BNS",
            Self::Bsa => "BSA",
            Self::Bnss => "BNSS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.label() == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Complainant {
    #[schema(example = "Ramesh Kumar")]
    pub name: String,
    #[schema(example = "Suresh Kumar")]
    pub father_name: String,
    #[schema(example = 34, minimum = 1, maximum = 120)]
    pub age: u8,
    #[schema(example = "12 MG Road, Bengaluru")]
    pub address: String,
    #[schema(example = "9876543210", pattern = "^[0-9]{10}$")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Incident {
    #[schema(example = "2024-03-15")]
    pub date: NaiveDate,
    #[schema(example = "21:30")]
    pub time: String,
    #[schema(example = "Near City Bus Stand")]
    pub place: String,
    #[schema(example = "The complainant's mobile phone was snatched by an unknown person.")]
    pub description: String,
}

/// Accused details. Every field may be empty; the section only renders when
/// `name` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Accused {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub address: String,
}

impl Accused {
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Charge {
    #[schema(example = "303")]
    pub section: String,
    #[schema(example = "Theft")]
    pub description: String,
    #[serde(rename = "type")]
    pub code: ChargeCode,
}

impl Charge {
    pub fn new(section: &str, description: &str, code: ChargeCode) -> Self {
        Self {
            section: section.to_string(),
            description: description.to_string(),
            code,
        }
    }
}

/// A validated First Information Report record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    #[schema(example = "FIR/2024/1234")]
    pub case_number: String,
    #[schema(example = "Cubbon Park")]
    pub police_station: String,
    #[schema(example = "Bengaluru Urban")]
    pub district: String,
    pub complainant: Complainant,
    pub incident: Incident,
    #[serde(default)]
    pub accused: Accused,
    pub charges: Vec<Charge>,
}
