//! Command dispatch: bridges CLI args -> view-models -> output formatting.

pub mod account;
pub mod appointments;
pub mod auth;
pub mod config_cmd;
pub mod doctors;
pub mod lab_results;
pub mod medications;
pub mod patients;
pub mod prescriptions;
pub mod records;
pub mod reports;
pub mod specializations;
pub mod stats;
pub mod util;

use clinic_core::Clinic;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    clinic: &Clinic,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => return auth::login(clinic, resolved, args, global).await,
        Command::Logout => return auth::logout(clinic, global),
        _ => {}
    }

    if !clinic.is_authenticated() {
        return Err(CliError::NotSignedIn {
            profile: resolved.profile_name.clone(),
        });
    }

    match cmd {
        Command::Whoami => auth::whoami(clinic, global).await,
        Command::Patients(args) => patients::handle(clinic, args, global).await,
        Command::Appointments(args) => appointments::handle(clinic, args, global).await,
        Command::Doctors(args) => doctors::handle(clinic, args, global).await,
        Command::Specializations(args) => specializations::handle(clinic, args, global).await,
        Command::Medications(args) => medications::handle(clinic, args, global).await,
        Command::Records(args) => records::handle(clinic, args, global).await,
        Command::Prescriptions(args) => prescriptions::handle(clinic, args, global).await,
        Command::LabResults(args) => lab_results::handle(clinic, args, global).await,
        Command::Reports(args) => reports::handle(clinic, args, global).await,
        Command::Stats(args) => stats::handle(clinic, args, global).await,
        Command::Account(args) => account::handle(clinic, args, global).await,
        // Handled above or before dispatch
        Command::Login(_) | Command::Logout | Command::Config(_) | Command::Completions(_) => {
            unreachable!()
        }
    }
}
