use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Paginated, Record, RecordId};

impl ApiClient {
    /// `GET /doctors/specializations/`
    pub async fn list_specializations(&self) -> Result<Paginated<Record>, Error> {
        self.get("doctors/specializations/").await
    }

    /// `POST /doctors/specializations/` with `{"name"}`
    pub async fn create_specialization(&self, name: &str) -> Result<Record, Error> {
        debug!(name, "creating specialization");
        self.post("doctors/specializations/", &json!({ "name": name })).await
    }

    /// `DELETE /doctors/specializations/{id}/`
    pub async fn delete_specialization(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting specialization");
        self.delete(&format!("doctors/specializations/{id}/")).await
    }
}
