//! CSV exports of report data.
//!
//! Column layouts match what the clinic's front desk downloads from the
//! reports screen, so exported files open the same way in spreadsheets.

use std::path::Path;

use clinic_api::Record;
use serde_json::Value;

use crate::commands::util;
use crate::error::CliError;
use crate::output;

const APPOINTMENT_COLUMNS: [&str; 7] = [
    "Appointment ID",
    "Patient Name",
    "Doctor",
    "Specialization",
    "Status",
    "Date",
    "Time",
];

const DEMOGRAPHIC_COLUMNS: [&str; 3] = ["Category", "Label", "Count"];

/// One row per appointment. Nested patient and doctor objects collapse to
/// their full names.
pub fn appointments(records: &[Record]) -> Result<String, csv::Error> {
    let rows = records.iter().map(|a| {
        let doctor = a.get("doctor").unwrap_or(&Value::Null);
        [
            util::first_text(a, &["appointment_id", "id"]),
            util::first_text(a, &["patient_name", "patient"]),
            util::first_text(a, &["doctor_name", "doctor"]),
            util::text(doctor, "specialization"),
            util::text(a, "status"),
            util::text(a, "appointment_date"),
            util::text(a, "appointment_time"),
        ]
    });
    output::to_csv(APPOINTMENT_COLUMNS, rows)
}

/// Age buckets, then gender counts, then conditions, from the patient
/// analysis report.
pub fn demographics(analysis: &Record) -> Result<String, csv::Error> {
    let rows = section(analysis, "ageDistribution", "Age", "count")
        .chain(section(analysis, "genderRatio", "Gender", "value"))
        .chain(section(analysis, "topConditions", "Condition", "count"));
    output::to_csv(DEMOGRAPHIC_COLUMNS, rows)
}

fn section<'a>(
    analysis: &'a Record,
    key: &'static str,
    category: &'static str,
    count_key: &'static str,
) -> impl Iterator<Item = [String; 3]> + 'a {
    analysis
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(move |item| {
            [category.to_owned(), util::text(item, "name"), util::text(item, count_key)]
        })
}

/// Write an export, creating missing parent directories.
pub fn write(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn appointment_rows_flatten_people() {
        let records = vec![json!({
            "appointment_id": "APT-001",
            "patient": { "id": 3, "first_name": "Ann", "last_name": "Lee" },
            "doctor": {
                "id": 5,
                "first_name": "Sam",
                "last_name": "Ng",
                "specialization": "Cardiology",
            },
            "status": "completed",
            "appointment_date": "2025-04-16",
            "appointment_time": "09:30:00",
        })];
        let csv = appointments(&records).unwrap();
        assert_eq!(
            csv,
            "Appointment ID,Patient Name,Doctor,Specialization,Status,Date,Time\n\
             APT-001,Ann Lee,Sam Ng,Cardiology,completed,2025-04-16,09:30:00\n"
        );
    }

    #[test]
    fn appointment_without_nested_doctor_leaves_specialization_empty() {
        let records = vec![json!({ "id": 9, "doctor": 5, "status": "scheduled" })];
        let csv = appointments(&records).unwrap();
        assert!(csv.ends_with("9,,5,,scheduled,,\n"), "got: {csv}");
    }

    #[test]
    fn demographics_lists_every_section() {
        let analysis = json!({
            "ageDistribution": [{ "name": "0-10", "count": 2 }, { "name": "61+", "count": 1 }],
            "genderRatio": [{ "name": "Female", "value": 4 }],
            "topConditions": [{ "name": "Asthma, mild", "count": 3 }],
            "patientGrowth": { "new": 1, "growthRate": 25.0, "total": 4 },
        });
        let csv = demographics(&analysis).unwrap();
        assert_eq!(
            csv,
            "Category,Label,Count\n\
             Age,0-10,2\n\
             Age,61+,1\n\
             Gender,Female,4\n\
             Condition,\"Asthma, mild\",3\n"
        );
    }

    #[test]
    fn demographics_of_an_empty_report_is_just_the_header() {
        assert_eq!(demographics(&json!({})).unwrap(), "Category,Label,Count\n");
    }
}
