//! Appointment command handlers.

use clinic_api::{AppointmentFilter, Record};
use clinic_core::Clinic;
use tabled::Tabled;

use crate::cli::{AppointmentListArgs, AppointmentsArgs, AppointmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AppointmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl AppointmentRow {
    fn new(a: &Record, color: bool) -> Self {
        Self {
            id: util::id_of(a),
            date: util::text(a, "appointment_date"),
            time: util::text(a, "appointment_time"),
            patient: util::first_text(a, &["patient_name", "patient"]),
            doctor: util::first_text(a, &["doctor_name", "doctor"]),
            status: output::paint_status(&util::text(a, "status"), color),
        }
    }
}

fn filter(args: AppointmentListArgs) -> AppointmentFilter {
    AppointmentFilter {
        page: Some(args.list.page),
        search: args.list.search,
        doctor: args.doctor,
        patient: args.patient,
        status: args.status,
        date: args.date,
        date_filter: args.when,
        ..AppointmentFilter::default()
    }
}

fn lookup(e: impl Into<CliError>, id: u64) -> CliError {
    e.into().not_found_as("appointment", id, "appointments list")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: AppointmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.appointments();
    match args.command {
        AppointmentsCommand::List(list) => {
            let query = vm.list(&filter(list));
            let page = util::with_spinner("Loading appointments", global, query.fetch()).await?;
            let color = output::color_for(global);
            util::print_page(global, &page, |a| AppointmentRow::new(a, color));
            Ok(())
        }

        AppointmentsCommand::Get { id } => {
            let appt = vm.detail(id).fetch().await.map_err(|e| lookup(e, id))?;
            util::print_record(global, &appt);
            Ok(())
        }

        AppointmentsCommand::Create(payload) => {
            let body = util::read_json_file(&payload.from_file)?;
            let created = vm.create().mutate(body).await?;
            util::done(global, &format!("Appointment {} booked", util::id_of(&created)));
            Ok(())
        }

        AppointmentsCommand::Update { id, payload } => {
            let body = util::read_json_file(&payload.from_file)?;
            vm.update().mutate((id, body)).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Appointment {id} updated"));
            Ok(())
        }

        AppointmentsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete appointment {id}?"), global.yes)? {
                return Ok(());
            }
            vm.delete().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Appointment {id} deleted"));
            Ok(())
        }

        AppointmentsCommand::Cancel { id } => {
            if !util::confirm(&format!("Cancel appointment {id}?"), global.yes)? {
                return Ok(());
            }
            vm.cancel().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Appointment {id} cancelled"));
            Ok(())
        }

        AppointmentsCommand::Complete { id } => {
            vm.complete().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Appointment {id} completed"));
            Ok(())
        }

        AppointmentsCommand::Queue { id } => {
            vm.queue().mutate(id).await.map_err(|e| lookup(e, id))?;
            util::done(global, &format!("Appointment {id} moved to the waiting queue"));
            Ok(())
        }
    }
}
