// Appointment endpoints
//
// Status transitions (cancel, complete, queue) are separate POST actions
// rather than field updates.

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AppointmentFilter, Paginated, Record, RecordId};

impl ApiClient {
    /// List appointments matching `filter`.
    ///
    /// `GET /appointments/?page&page_size&search&doctor&patient&status&appointment_date...`
    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Paginated<Record>, Error> {
        self.list_appointments_on(filter, Local::now().date_naive()).await
    }

    /// Like [`list_appointments`](Self::list_appointments) with an explicit
    /// "today" anchor for relative date filters.
    pub async fn list_appointments_on(
        &self,
        filter: &AppointmentFilter,
        today: NaiveDate,
    ) -> Result<Paginated<Record>, Error> {
        debug!(?filter, "listing appointments");
        self.get_with_params("appointments/", filter.to_query(today)).await
    }

    /// `GET /appointments/{id}/`
    pub async fn get_appointment(&self, id: RecordId) -> Result<Record, Error> {
        self.get(&format!("appointments/{id}/")).await
    }

    /// `POST /appointments/`
    pub async fn create_appointment(&self, appointment: &Record) -> Result<Record, Error> {
        debug!("creating appointment");
        self.post("appointments/", appointment).await
    }

    /// `PUT /appointments/{id}/`
    pub async fn update_appointment(
        &self,
        id: RecordId,
        appointment: &Record,
    ) -> Result<Record, Error> {
        debug!(id, "updating appointment");
        self.put(&format!("appointments/{id}/"), appointment).await
    }

    /// `DELETE /appointments/{id}/`
    pub async fn delete_appointment(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting appointment");
        self.delete(&format!("appointments/{id}/")).await
    }

    /// `POST /appointments/{id}/cancel/`
    pub async fn cancel_appointment(&self, id: RecordId) -> Result<Record, Error> {
        debug!(id, "cancelling appointment");
        self.post_action(&format!("appointments/{id}/cancel/")).await
    }

    /// `POST /appointments/{id}/complete/`
    pub async fn complete_appointment(&self, id: RecordId) -> Result<Record, Error> {
        debug!(id, "completing appointment");
        self.post_action(&format!("appointments/{id}/complete/")).await
    }

    /// Move a checked-in appointment into the waiting queue.
    ///
    /// `POST /appointments/{id}/queue/`
    pub async fn queue_appointment(&self, id: RecordId) -> Result<Record, Error> {
        debug!(id, "queueing appointment");
        self.post_action(&format!("appointments/{id}/queue/")).await
    }
}
