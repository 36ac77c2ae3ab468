use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{NewLabResult, Paginated, Record, RecordId};

impl ApiClient {
    /// `GET /lab-results/{patient}/patient-results/`
    pub async fn list_patient_lab_results(
        &self,
        patient: RecordId,
    ) -> Result<Paginated<Record>, Error> {
        debug!(patient, "listing lab results");
        self.get(&format!("lab-results/{patient}/patient-results/")).await
    }

    /// `POST /lab-results/`
    pub async fn add_lab_result(&self, result: &NewLabResult) -> Result<Record, Error> {
        debug!(patient = result.patient_id, test = %result.test_name, "adding lab result");
        self.post("lab-results/", result).await
    }
}
