//! Doctor command handlers.

use clinic_api::Record;
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{DoctorsArgs, DoctorsCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DoctorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Specialization")]
    specialization: String,
    #[tabled(rename = "License")]
    license: String,
    #[tabled(rename = "Years")]
    experience: String,
}

impl From<&Record> for DoctorRow {
    fn from(d: &Record) -> Self {
        Self {
            id: util::id_of(d),
            name: util::full_name(d),
            specialization: util::first_text(d, &["specialization_name", "specialization"]),
            license: util::text(d, "license_number"),
            experience: util::text(d, "years_of_experience"),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: DoctorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.doctors();
    match args.command {
        DoctorsCommand::List { search } => {
            let page = vm.list(search.as_deref()).fetch().await?;
            util::print_page(global, &page, |r| DoctorRow::from(r));
            Ok(())
        }

        DoctorsCommand::Create(payload) => {
            let body = util::read_json_file(&payload.from_file)?;
            let created = vm.create().mutate(body).await?;
            util::done(global, &format!("Doctor {} added", util::id_of(&created)));
            Ok(())
        }

        DoctorsCommand::Update { id, payload } => {
            let body = util::read_json_file(&payload.from_file)?;
            vm.update()
                .mutate((id, body))
                .await
                .map_err(|e| CliError::from(e).not_found_as("doctor", id, "doctors list"))?;
            util::done(global, &format!("Doctor {id} updated"));
            Ok(())
        }

        DoctorsCommand::Delete { id } => {
            if !util::confirm(&format!("Remove doctor {id}?"), global.yes)? {
                return Ok(());
            }
            vm.delete()
                .mutate(id)
                .await
                .map_err(|e| CliError::from(e).not_found_as("doctor", id, "doctors list"))?;
            util::done(global, &format!("Doctor {id} removed"));
            Ok(())
        }
    }
}
