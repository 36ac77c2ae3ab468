// Medication catalogue endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ListParams, Paginated, Record, RecordId};

impl ApiClient {
    /// `GET /medications/?page&search`
    pub async fn list_medications(&self, params: &ListParams) -> Result<Paginated<Record>, Error> {
        debug!(page = ?params.page, "listing medications");
        self.get_with_params("medications/", params.to_query()).await
    }

    /// `GET /medications/{id}/`
    pub async fn get_medication(&self, id: RecordId) -> Result<Record, Error> {
        self.get(&format!("medications/{id}/")).await
    }

    /// `POST /medications/`
    pub async fn create_medication(&self, medication: &Record) -> Result<Record, Error> {
        debug!("creating medication");
        self.post("medications/", medication).await
    }

    /// `PUT /medications/{id}/`
    pub async fn update_medication(
        &self,
        id: RecordId,
        medication: &Record,
    ) -> Result<Record, Error> {
        debug!(id, "updating medication");
        self.put(&format!("medications/{id}/"), medication).await
    }

    /// `DELETE /medications/{id}/`
    pub async fn delete_medication(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting medication");
        self.delete(&format!("medications/{id}/")).await
    }
}
