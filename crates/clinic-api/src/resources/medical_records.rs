// Medical record endpoints
//
// Records are per patient; `latest/` returns the most recent one (or an
// empty body when the patient has none).

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Paginated, Record, RecordId};

impl ApiClient {
    /// `GET /medical-records/?page&patient`
    pub async fn list_medical_records(
        &self,
        page: Option<u32>,
        patient: Option<RecordId>,
    ) -> Result<Paginated<Record>, Error> {
        let mut params = Vec::new();
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(patient) = patient {
            params.push(("patient", patient.to_string()));
        }
        debug!(?page, ?patient, "listing medical records");
        self.get_with_params("medical-records/", params).await
    }

    /// `GET /medical-records/{id}/`
    pub async fn get_medical_record(&self, id: RecordId) -> Result<Record, Error> {
        self.get(&format!("medical-records/{id}/")).await
    }

    /// `GET /medical-records/{patient}/latest/`
    pub async fn latest_medical_record(&self, patient: RecordId) -> Result<Option<Record>, Error> {
        let record: Record = self
            .get(&format!("medical-records/{patient}/latest/"))
            .await?;
        Ok((!record.is_null()).then_some(record))
    }

    /// `POST /medical-records/`
    pub async fn create_medical_record(&self, record: &Record) -> Result<Record, Error> {
        debug!("creating medical record");
        self.post("medical-records/", record).await
    }

    /// `PUT /medical-records/{id}/`
    pub async fn update_medical_record(
        &self,
        id: RecordId,
        record: &Record,
    ) -> Result<Record, Error> {
        debug!(id, "updating medical record");
        self.put(&format!("medical-records/{id}/"), record).await
    }

    /// `DELETE /medical-records/{id}/`
    pub async fn delete_medical_record(&self, id: RecordId) -> Result<(), Error> {
        debug!(id, "deleting medical record");
        self.delete(&format!("medical-records/{id}/")).await
    }
}
