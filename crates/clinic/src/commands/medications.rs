//! Medication catalogue handlers.

use clinic_api::{ListParams, Record, RecordId};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, MedicationsArgs, MedicationsCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct MedicationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Default dosage")]
    dosage: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Record> for MedicationRow {
    fn from(m: &Record) -> Self {
        Self {
            id: util::id_of(m),
            name: util::text(m, "name"),
            dosage: util::text(m, "default_dosage"),
            active: util::text(m, "is_active"),
        }
    }
}

fn lookup(e: impl Into<CliError>, id: RecordId) -> CliError {
    e.into().not_found_as("medication", id, "medications list")
}

pub async fn handle(
    clinic: &Clinic,
    args: MedicationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.medications();
    match args.command {
        MedicationsCommand::List(list) => {
            let mut params = ListParams::page(list.page);
            params.search = list.search;
            let page = vm.list(&params).fetch().await?;
            util::print_page(global, &page, |r| MedicationRow::from(r));
            Ok(())
        }

        MedicationsCommand::Get { id } => {
            let medication = vm.detail(id).fetch().await.map_err(|e| lookup(e, id))?;
            util::print_record(global, &medication);
            Ok(())
        }

        MedicationsCommand::Create(payload) => {
            let body = util::read_json_file(&payload.from_file)?;
            let created = vm.create().mutate(body).await?;
            util::done(global, &format!("Medication {} added", util::id_of(&created)));
            Ok(())
        }

        MedicationsCommand::Update { id, payload } => {
            let body = util::read_json_file(&payload.from_file)?;
            vm.update().mutate((id, body)).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Medication {id} updated"));
            Ok(())
        }

        MedicationsCommand::Delete { id } => {
            if !util::confirm(&format!("Remove medication {id}?"), global.yes)? {
                return Ok(());
            }
            vm.delete().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Medication {id} removed"));
            Ok(())
        }
    }
}
