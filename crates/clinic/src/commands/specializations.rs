//! Specialization command handlers.

use clinic_api::Record;
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, SpecializationsArgs, SpecializationsCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct SpecializationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Record> for SpecializationRow {
    fn from(s: &Record) -> Self {
        Self {
            id: util::id_of(s),
            name: util::text(s, "name"),
            description: util::text(s, "description"),
        }
    }
}

pub async fn handle(
    clinic: &Clinic,
    args: SpecializationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.specializations();
    match args.command {
        SpecializationsCommand::List => {
            let page = vm.list().fetch().await?;
            util::print_page(global, &page, |r| SpecializationRow::from(r));
            Ok(())
        }

        SpecializationsCommand::Create { name } => {
            let created = vm.create().mutate(name).await?;
            util::done(
                global,
                &format!("Specialization '{}' added", util::text(&created, "name")),
            );
            Ok(())
        }

        SpecializationsCommand::Delete { id } => {
            if !util::confirm(&format!("Remove specialization {id}?"), global.yes)? {
                return Ok(());
            }
            vm.delete().mutate(id).await.map_err(|e| {
                CliError::from(e).not_found_as("specialization", id, "specializations list")
            })?;
            util::done(global, &format!("Specialization {id} removed"));
            Ok(())
        }
    }
}
