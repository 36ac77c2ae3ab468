//! Medical record handlers.

use clinic_api::{Record, RecordId};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, RecordsArgs, RecordsCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Diagnosis")]
    diagnosis: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Record> for RecordRow {
    fn from(r: &Record) -> Self {
        Self {
            id: util::id_of(r),
            patient: util::first_text(r, &["patient_name", "patient"]),
            doctor: util::first_text(r, &["doctor_name", "doctor"]),
            diagnosis: util::text(r, "diagnosis"),
            created: util::text(r, "created_at"),
        }
    }
}

fn lookup(e: impl Into<CliError>, id: RecordId) -> CliError {
    e.into().not_found_as("medical record", id, "records list")
}

pub async fn handle(
    clinic: &Clinic,
    args: RecordsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.medical_records();
    match args.command {
        RecordsCommand::List { page, patient } => {
            let page = vm.list(page, patient).fetch().await?;
            util::print_page(global, &page, |r| RecordRow::from(r));
            Ok(())
        }

        RecordsCommand::Get { id } => {
            let record = vm.detail(id).fetch().await.map_err(|e| lookup(e, id))?;
            util::print_record(global, &record);
            Ok(())
        }

        RecordsCommand::Latest { patient } => {
            let latest = vm.latest(patient).fetch().await?;
            match &*latest {
                Some(record) => util::print_record(global, record),
                None => util::note(global, &format!("Patient {patient} has no medical records")),
            }
            Ok(())
        }

        RecordsCommand::Create(payload) => {
            let body = util::read_json_file(&payload.from_file)?;
            let created = vm.create().mutate(body).await?;
            util::done(global, &format!("Medical record {} created", util::id_of(&created)));
            Ok(())
        }

        RecordsCommand::Update { id, payload } => {
            let body = util::read_json_file(&payload.from_file)?;
            vm.update().mutate((id, body)).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Medical record {id} updated"));
            Ok(())
        }

        RecordsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete medical record {id}?"), global.yes)? {
                return Ok(());
            }
            vm.delete().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Medical record {id} deleted"));
            Ok(())
        }
    }
}
