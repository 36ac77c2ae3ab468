//! Lab result handlers.

use clinic_api::{NewLabResult, Record};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, LabResultsArgs, LabResultsCommand};
use crate::error::CliError;

use super::util;

#[derive(Tabled)]
struct LabResultRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Results")]
    results: String,
}

impl From<&Record> for LabResultRow {
    fn from(r: &Record) -> Self {
        Self {
            id: util::id_of(r),
            test: util::text(r, "test_name"),
            date: util::text(r, "test_date"),
            results: util::text(r, "results"),
        }
    }
}

pub async fn handle(
    clinic: &Clinic,
    args: LabResultsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.lab_results();
    match args.command {
        LabResultsCommand::List { patient } => {
            let page = vm
                .list(patient)
                .fetch()
                .await
                .map_err(|e| CliError::from(e).not_found_as("patient", patient, "patients list"))?;
            util::print_page(global, &page, |r| LabResultRow::from(r));
            Ok(())
        }

        LabResultsCommand::Add {
            patient,
            test_name,
            test_date,
            results,
            notes,
        } => {
            let result = NewLabResult {
                patient_id: patient,
                test_name,
                test_date: test_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                notes,
                results,
            };
            let created = vm.add().mutate(result).await?;
            util::done(global, &format!("Lab result {} recorded", util::id_of(&created)));
            Ok(())
        }
    }
}
