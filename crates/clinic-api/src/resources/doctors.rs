// Doctor roster endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Paginated, Record, RecordId};

impl ApiClient {
    /// `GET /doctors/doctorsList/?search`
    pub async fn list_doctors(&self, search: Option<&str>) -> Result<Paginated<Record>, Error> {
        let mut params = Vec::new();
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            params.push(("search", search.to_owned()));
        }
        debug!(?search, "listing doctors");
        self.get_with_params("doctors/doctorsList/", params).await
    }

    /// `POST /doctors/doctorsList/`
    pub async fn create_doctor(&self, doctor: &Record) -> Result<Record, Error> {
        debug!("creating doctor");
        self.post("doctors/doctorsList/", doctor).await
    }

    /// Partial update.
    ///
    /// `PATCH /doctors/doctorsList/{id}/`
    pub async fn update_doctor(&self, id: RecordId, changes: &Record) -> Result<Record, Error> {
        debug!(id, "updating doctor");
        self.patch(&format!("doctors/doctorsList/{id}/"), changes).await
    }

    /// `DELETE /doctors/doctorsList/{id}/`
    pub async fn delete_doctor(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting doctor");
        self.delete(&format!("doctors/doctorsList/{id}/")).await
    }
}
