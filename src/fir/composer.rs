//! Composer for the First Information Report document.
//!
//! Turns a validated [`IncidentRecord`] into a self-contained Typst source.
//! The embedded prelude provides styles and helper functions; the body is
//! assembled here so optional sections are left out of the source entirely
//! rather than hidden at render time. Every record value goes through
//! [`escape_typst_string`].

use super::common::{escape_typst_string, format_date};
use super::models::{Accused, IncidentRecord};
use super::traits::Clock;
use super::MarkupDocument;

const PRELUDE: &str = include_str!("../../static/fir.typ");

pub const TITLE: &str = "FIRST INFORMATION REPORT (FIR)";
pub const SUBTITLE: &str = "Under Bharatiya Nyaya Sanhita (BNS) 2023";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, Default)]
pub struct FirComposer;

impl FirComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose the report. The output depends only on `record` and the date
    /// `clock` reports.
    pub fn compose(&self, record: &IncidentRecord, clock: &dyn Clock) -> MarkupDocument {
        let generated_on = format_date(clock.today());
        let mut body: Vec<String> = Vec::new();

        body.push(call("report-header", &[TITLE, SUBTITLE]));
        body.push(String::new());
        body.push(call("field", &["FIR No", record.case_number.as_str()]));
        body.push(call("field", &["Police Station", record.police_station.as_str()]));
        body.push(call("field", &["District", record.district.as_str()]));
        body.push(call("field", &["Date", generated_on.as_str()]));

        let complainant = &record.complainant;
        let age = complainant.age.to_string();
        body.push(section("Complainant Details"));
        body.push(details_table(&[
            ("Name", complainant.name.as_str()),
            ("Father's Name", complainant.father_name.as_str()),
            ("Age", age.as_str()),
            ("Address", complainant.address.as_str()),
            ("Phone", complainant.phone.as_str()),
        ]));

        let incident = &record.incident;
        let incident_date = format_date(incident.date);
        body.push(section("Incident Details"));
        body.push(details_table(&[
            ("Date of Incident", incident_date.as_str()),
            ("Time", incident.time.as_str()),
            ("Place of Occurrence", incident.place.as_str()),
        ]));
        body.push(String::new());
        body.push(call("strong", &["Description of Incident:"]));
        body.push(call("description-box", &[incident.description.as_str()]));

        if record.accused.is_named() {
            body.push(section("Accused Details"));
            body.push(accused_table(&record.accused));
        }

        body.push(section("Charges Applied"));
        let items: Vec<String> = record
            .charges
            .iter()
            .map(|charge| {
                let heading = format!("{} Section {}", charge.code.label(), charge.section);
                format!(
                    "  charge-item({}, {}),",
                    escape_typst_string(&heading),
                    escape_typst_string(&charge.description)
                )
            })
            .collect();
        body.push(format!("#charges-box(\n{}\n)", items.join("\n")));

        body.push(String::new());
        body.push("#v(30pt)".to_string());
        body.push(call("signature-line", &["Investigating Officer"]));
        body.push(call("signature-line", &["Signature"]));
        body.push(format!(
            "#signature-line({}, value: {})",
            escape_typst_string("Date"),
            escape_typst_string(generated_on.as_str())
        ));

        MarkupDocument::new(format!("{}\n{}\n", PRELUDE, body.join("\n")))
    }
}

/// `#name("arg", ...)` with every argument escaped.
fn call(name: &str, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|arg| escape_typst_string(arg)).collect();
    format!("#{}({})", name, args.join(", "))
}

fn section(title: &str) -> String {
    format!("\n== {title}")
}

fn details_table(rows: &[(&str, &str)]) -> String {
    let rows: Vec<String> = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "  ({}, {}),",
                escape_typst_string(label),
                escape_typst_string(value)
            )
        })
        .collect();
    format!("#details-table(\n{}\n)", rows.join("\n"))
}

fn accused_table(accused: &Accused) -> String {
    let or_unknown = |value: &str| -> String {
        if value.is_empty() {
            UNKNOWN.to_string()
        } else {
            value.to_string()
        }
    };
    let name = or_unknown(&accused.name);
    let age = or_unknown(&accused.age);
    let address = or_unknown(&accused.address);
    details_table(&[
        ("Name", name.as_str()),
        ("Age", age.as_str()),
        ("Address", address.as_str()),
    ])
}
