// Reporting endpoints
//
// Aggregates computed server-side. Shapes vary by report, so everything
// comes back as `Record`.

use chrono::NaiveDate;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AppointmentFilter, DateFilter, Paginated, Record};

/// Page size of the report appointment table.
pub const REPORT_APPOINTMENTS_PAGE_SIZE: u32 = 8;

impl ApiClient {
    /// `GET /reports/appointment-metrics/`
    pub async fn appointment_metrics(&self) -> Result<Record, Error> {
        self.get("reports/appointment-metrics/").await
    }

    /// `GET /reports/patients-analysis/`
    pub async fn patient_analysis(&self) -> Result<Record, Error> {
        self.get("reports/patients-analysis/").await
    }

    /// `GET /reports/doctor-performance/?page`
    pub async fn doctor_performance(&self, page: u32) -> Result<Paginated<Record>, Error> {
        debug!(page, "fetching doctor performance");
        self.get_with_params("reports/doctor-performance/", vec![("page", page.to_string())]).await
    }

    /// `GET /reports/available-doctors/`
    pub async fn available_doctors(&self) -> Result<Record, Error> {
        self.get("reports/available-doctors/").await
    }

    /// Appointment table for the report view: page size 8 and a relative
    /// date window resolved against `today`.
    ///
    /// `GET /appointments/?page&page_size=8&appointment_date_after&appointment_date_before`
    pub async fn report_appointments(
        &self,
        page: u32,
        window: Option<DateFilter>,
        today: NaiveDate,
    ) -> Result<Paginated<Record>, Error> {
        let filter = AppointmentFilter {
            page: Some(page),
            page_size: Some(REPORT_APPOINTMENTS_PAGE_SIZE),
            date_filter: window,
            ..AppointmentFilter::default()
        };
        self.list_appointments_on(&filter, today).await
    }
}
