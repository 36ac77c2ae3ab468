use chrono::{Local, NaiveDate};
use clinic_api::{DateFilter, Paginated, Record, REPORT_APPOINTMENTS_PAGE_SIZE};

use super::Context;
use crate::query::{Query, QueryKey, Resource};

/// Read-only reporting dashboards.
#[derive(Clone)]
pub struct ReportsViewModel {
    ctx: Context,
}

impl ReportsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn appointment_metrics(&self) -> Query<Record> {
        self.ctx
            .query(QueryKey::new(Resource::AppointmentMetrics), |api| async move {
                api.appointment_metrics().await
            })
    }

    pub fn patient_analysis(&self) -> Query<Record> {
        self.ctx
            .query(QueryKey::new(Resource::PatientAnalysis), |api| async move {
                api.patient_analysis().await
            })
    }

    pub fn doctor_performance(&self, page: u32) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::DoctorPerformance).with("page", page);
        self.ctx.query(key, move |api| async move {
            api.doctor_performance(page).await
        })
    }

    pub fn available_doctors(&self) -> Query<Record> {
        self.ctx
            .query(QueryKey::new(Resource::AvailableDoctors), |api| async move {
                api.available_doctors().await
            })
    }

    /// Report appointment table; keyed under appointments so appointment
    /// writes refresh it.
    pub fn appointments(&self, page: u32, window: Option<DateFilter>) -> Query<Paginated<Record>> {
        self.appointments_on(page, window, Local::now().date_naive())
    }

    pub fn appointments_on(
        &self,
        page: u32,
        window: Option<DateFilter>,
        today: NaiveDate,
    ) -> Query<Paginated<Record>> {
        let mut key = QueryKey::new(Resource::Appointments)
            .with("page", page)
            .with("page_size", REPORT_APPOINTMENTS_PAGE_SIZE);
        if let Some(window) = window {
            let (start, end) = window.range(today);
            key = key
                .with("appointment_date_after", start)
                .with("appointment_date_before", end);
        }
        self.ctx.query(key, move |api| async move {
            api.report_appointments(page, window, today).await
        })
    }
}
