//! Patient command handlers.

use clinic_api::{ListParams, Record};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, ListArgs, PatientsArgs, PatientsCommand};
use crate::error::CliError;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PatientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Birth date")]
    birth_date: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Blood")]
    blood_type: String,
}

impl From<&Record> for PatientRow {
    fn from(p: &Record) -> Self {
        Self {
            id: util::id_of(p),
            name: util::full_name(p),
            gender: util::text(p, "gender"),
            birth_date: util::text(p, "birth_date"),
            phone: util::first_text(p, &["phone", "phone_number"]),
            blood_type: util::text(p, "blood_type"),
        }
    }
}

fn params(list: ListArgs) -> ListParams {
    let params = ListParams::page(list.page);
    match list.search {
        Some(search) => params.with_search(search),
        None => params,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: PatientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.patients();
    match args.command {
        PatientsCommand::List(list) => {
            let query = vm.list(&params(list));
            let page = util::with_spinner("Loading patients", global, query.fetch()).await?;
            util::print_page(global, &page, |r| PatientRow::from(r));
            Ok(())
        }

        PatientsCommand::Deactivated(list) => {
            let page = vm.deactivated(&params(list)).fetch().await?;
            util::print_page(global, &page, |r| PatientRow::from(r));
            Ok(())
        }

        PatientsCommand::Get { id } => {
            let patient = vm
                .detail(id)
                .fetch()
                .await
                .map_err(|e| CliError::from(e).not_found_as("patient", id, "patients list"))?;
            util::print_record(global, &patient);
            Ok(())
        }

        PatientsCommand::Create(payload) => {
            let body = util::read_json_file(&payload.from_file)?;
            let created = vm.create().mutate(body).await?;
            util::done(global, &format!("Patient {} registered", util::id_of(&created)));
            Ok(())
        }

        PatientsCommand::Update { id, payload } => {
            let body = util::read_json_file(&payload.from_file)?;
            vm.update()
                .mutate((id, body))
                .await
                .map_err(|e| CliError::from(e).not_found_as("patient", id, "patients list"))?;
            util::done(global, &format!("Patient {id} updated"));
            Ok(())
        }

        PatientsCommand::Delete { id } => {
            let prompt = format!("Delete patient {id}? This cannot be undone.");
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            vm.delete()
                .mutate(id)
                .await
                .map_err(|e| CliError::from(e).not_found_as("patient", id, "patients list"))?;
            util::done(global, &format!("Patient {id} deleted"));
            Ok(())
        }

        PatientsCommand::Activate { id } => {
            vm.activate()
                .mutate(id)
                .await
                .map_err(|e| {
                    CliError::from(e).not_found_as("patient", id, "patients deactivated")
                })?;
            util::done(global, &format!("Patient {id} activated"));
            Ok(())
        }

        PatientsCommand::Deactivate { id } => {
            vm.set_active()
                .mutate((id, false))
                .await
                .map_err(|e| CliError::from(e).not_found_as("patient", id, "patients list"))?;
            util::done(global, &format!("Patient {id} deactivated"));
            Ok(())
        }
    }
}
