//! Dashboard statistics handler.

use std::time::Duration;

use clinic_core::{Clinic, DashboardState, DashboardStats, KeyFilter};
use owo_colors::OwoColorize;

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

/// How often a long-running watch sweeps idle cache entries.
const COLLECT_EVERY: Duration = Duration::from_secs(60);

fn detail(stats: &DashboardStats, color: bool) -> String {
    let rows = [
        ("Today's check-ins", stats.today_check_ins),
        ("Waiting patients", stats.waiting_patients),
        ("Available doctors", stats.available_doctors),
        ("New registrations", stats.new_registrations),
    ];
    rows.iter()
        .map(|(label, value)| {
            let label = output::paint_label(&format!("{label:<18}"), color);
            if color {
                format!("{label} {}", value.cyan())
            } else {
                format!("{label} {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print(state: DashboardState, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(error) = state.error {
        return Err(error.into());
    }
    let color = output::color_for(global);
    let out = output::render_single(
        &global.output,
        &state.stats,
        |s| detail(s, color),
        |s| {
            format!(
                "{} {} {} {}",
                s.today_check_ins, s.waiting_patients, s.available_doctors, s.new_registrations
            )
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(clinic: &Clinic, args: StatsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let queries = clinic.stats().dashboard();

    let Some(every) = args.watch else {
        return print(queries.fetch().await, global);
    };

    let every = Duration::from_secs(every.max(1));
    let _collector = clinic.cache().spawn_collector(COLLECT_EVERY);
    let mut observer = queries.observe();
    loop {
        print(observer.settled().await, global)?;
        tokio::select! {
            () = tokio::time::sleep(every) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
        clinic.cache().invalidate(KeyFilter::All);
    }
}
