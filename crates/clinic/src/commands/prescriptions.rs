//! Prescription handlers.

use clinic_api::{PrescriptionMedication, Record};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, PrescriptionsArgs, PrescriptionsCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct PrescriptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Medical record")]
    medical_record: String,
    #[tabled(rename = "Medications")]
    medications: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Record> for PrescriptionRow {
    fn from(p: &Record) -> Self {
        let medications = p
            .get("medications")
            .and_then(serde_json::Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .map(|line| util::first_text(line, &["medication_name", "medication"]))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        Self {
            id: util::id_of(p),
            medical_record: util::first_text(p, &["medical_record", "medical_record_id"]),
            medications,
            created: util::text(p, "created_at"),
        }
    }
}

pub async fn handle(
    clinic: &Clinic,
    args: PrescriptionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.prescriptions();
    match args.command {
        PrescriptionsCommand::List { patient, page } => {
            let page = vm.list(patient, page).fetch().await?;
            util::print_page(global, &page, |r| PrescriptionRow::from(r));
            Ok(())
        }

        PrescriptionsCommand::Create { medical_record } => {
            let created = vm.create().mutate(medical_record).await.map_err(|e| {
                CliError::from(e).not_found_as("medical record", medical_record, "records list")
            })?;
            util::done(global, &format!("Prescription {} opened", util::id_of(&created)));
            Ok(())
        }

        PrescriptionsCommand::AddMedications {
            prescription,
            payload,
        } => {
            let lines: Vec<PrescriptionMedication> = util::read_json_as(&payload.from_file)?;
            if lines.is_empty() {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected at least one medication line".into(),
                });
            }
            let count = lines.len();
            vm.add_medications().mutate((prescription, lines)).await?;
            util::done(
                global,
                &format!("Added {count} medication(s) to prescription {prescription}"),
            );
            Ok(())
        }
    }
}
