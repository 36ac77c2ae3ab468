// Patient endpoints
//
// Patients are soft-deleted: deactivation flips `is_active` and the
// record moves to the `deactivated/` listing until reactivated.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DashboardStatistics, ListParams, Paginated, Record, RecordId};

impl ApiClient {
    /// List active patients.
    ///
    /// `GET /patients/patients/?page&search`
    pub async fn list_patients(&self, params: &ListParams) -> Result<Paginated<Record>, Error> {
        debug!(page = ?params.page, search = ?params.search, "listing patients");
        self.get_with_params("patients/patients/", params.to_query()).await
    }

    /// `GET /patients/patients/{id}/`
    pub async fn get_patient(&self, id: RecordId) -> Result<Record, Error> {
        self.get(&format!("patients/patients/{id}/")).await
    }

    /// `POST /patients/patients/`
    pub async fn create_patient(&self, patient: &Record) -> Result<Record, Error> {
        debug!("creating patient");
        self.post("patients/patients/", patient).await
    }

    /// `PUT /patients/patients/{id}/`
    pub async fn update_patient(&self, id: RecordId, patient: &Record) -> Result<Record, Error> {
        debug!(id, "updating patient");
        self.put(&format!("patients/patients/{id}/"), patient).await
    }

    /// Create when `id` is `None`, otherwise replace.
    pub async fn save_patient(
        &self,
        id: Option<RecordId>,
        patient: &Record,
    ) -> Result<Record, Error> {
        match id {
            Some(id) => self.update_patient(id, patient).await,
            None => self.create_patient(patient).await,
        }
    }

    /// `DELETE /patients/patients/{id}/`
    pub async fn delete_patient(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting patient");
        self.delete(&format!("patients/patients/{id}/")).await
    }

    /// `GET /patients/patients/deactivated/?page&search`
    pub async fn list_deactivated_patients(
        &self,
        params: &ListParams,
    ) -> Result<Paginated<Record>, Error> {
        debug!(page = ?params.page, "listing deactivated patients");
        self.get_with_params("patients/patients/deactivated/", params.to_query()).await
    }

    /// Toggle the active flag.
    ///
    /// `PATCH /patients/patients/{id}/` with `{"is_active": bool}`
    pub async fn set_patient_active(&self, id: RecordId, is_active: bool) -> Result<Record, Error> {
        debug!(id, is_active, "setting patient active flag");
        self.patch(
            &format!("patients/patients/{id}/"),
            &json!({ "is_active": is_active }),
        )
        .await
    }

    /// `POST /patients/patients/{id}/activate/`
    pub async fn activate_patient(&self, id: RecordId) -> Result<Record, Error> {
        debug!(id, "activating patient");
        self.post_action(&format!("patients/patients/{id}/activate/")).await
    }

    /// Backend-computed dashboard counters.
    ///
    /// `GET /patients/patients/statistics/`
    pub async fn dashboard_statistics(&self) -> Result<DashboardStatistics, Error> {
        self.get("patients/patients/statistics/").await
    }
}
