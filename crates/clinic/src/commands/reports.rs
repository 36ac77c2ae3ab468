//! Report handlers.

use clinic_api::Record;
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{GlobalOpts, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::{export, output};

use super::util;

#[derive(Tabled)]
struct PerformanceRow {
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Appointments")]
    appointments: String,
    #[tabled(rename = "Completed")]
    completed: String,
    #[tabled(rename = "Cancelled")]
    cancelled: String,
}

impl From<&Record> for PerformanceRow {
    fn from(r: &Record) -> Self {
        let doctor = match util::full_name(r) {
            name if name.is_empty() => util::first_text(r, &["doctor_name", "doctor"]),
            name => name,
        };
        Self {
            doctor,
            appointments: util::first_text(r, &["total_appointments", "appointments"]),
            completed: util::first_text(r, &["completed_appointments", "completed"]),
            cancelled: util::first_text(r, &["cancelled_appointments", "cancelled"]),
        }
    }
}

#[derive(Tabled)]
struct ReportAppointmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn handle(
    clinic: &Clinic,
    args: ReportsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.reports();
    match args.command {
        ReportsCommand::Metrics => {
            let report = vm.appointment_metrics().fetch().await?;
            util::print_record(global, &report);
        }
        ReportsCommand::Patients { export: Some(path) } => {
            let report = vm.patient_analysis().fetch().await?;
            export::write(&path, &export::demographics(&report)?)?;
            util::done(global, &format!("Demographics exported to {}", path.display()));
        }
        ReportsCommand::Patients { export: None } => {
            let report = vm.patient_analysis().fetch().await?;
            util::print_record(global, &report);
        }
        ReportsCommand::Doctors { page } => {
            let page = vm.doctor_performance(page).fetch().await?;
            util::print_page(global, &page, |r| PerformanceRow::from(r));
        }
        ReportsCommand::AvailableDoctors => {
            let report = vm.available_doctors().fetch().await?;
            util::print_record(global, &report);
        }
        ReportsCommand::Appointments {
            page,
            when,
            export: Some(path),
        } => {
            let page = vm.appointments(page, when).fetch().await?;
            export::write(&path, &export::appointments(&page.results)?)?;
            let count = page.results.len();
            util::done(global, &format!("{count} appointments exported to {}", path.display()));
        }
        ReportsCommand::Appointments {
            page,
            when,
            export: None,
        } => {
            let page = vm.appointments(page, when).fetch().await?;
            let color = output::color_for(global);
            util::print_page(global, &page, |a| ReportAppointmentRow {
                id: util::id_of(a),
                date: util::text(a, "appointment_date"),
                patient: util::first_text(a, &["patient_name", "patient"]),
                doctor: util::first_text(a, &["doctor_name", "doctor"]),
                status: output::paint_status(&util::text(a, "status"), color),
            });
        }
    }
    Ok(())
}
