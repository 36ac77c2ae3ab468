// Prescription endpoints
//
// A prescription is created empty against a medical record, then filled
// with medication lines in a second call.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AddMedicationsRequest, Paginated, PrescriptionMedication, Record, RecordId};

/// Page size the prescription history view uses.
pub const PRESCRIPTION_PAGE_SIZE: u32 = 2;

impl ApiClient {
    /// `GET /prescriptions/by-patient/?page&patient_id&page_size=2`
    pub async fn list_patient_prescriptions(
        &self,
        patient: RecordId,
        page: u32,
    ) -> Result<Paginated<Record>, Error> {
        debug!(patient, page, "listing prescriptions");
        self.get_with_params(
            "prescriptions/by-patient/",
            vec![
                ("page", page.to_string()),
                ("patient_id", patient.to_string()),
                ("page_size", PRESCRIPTION_PAGE_SIZE.to_string()),
            ],
        )
        .await
    }

    /// `POST /prescriptions/` with `{"medical_record_id"}`
    pub async fn create_prescription(&self, medical_record: RecordId) -> Result<Record, Error> {
        debug!(medical_record, "creating prescription");
        self.post(
            "prescriptions/",
            &json!({ "medical_record_id": medical_record }),
        )
        .await
    }

    /// `POST /prescription-medications/` with `{"prescription_id", "medications": [...]}`
    pub async fn add_medications_to_prescription(
        &self,
        prescription: RecordId,
        medications: &[PrescriptionMedication],
    ) -> Result<Record, Error> {
        debug!(prescription, count = medications.len(), "adding medications");
        self.post(
            "prescription-medications/",
            &AddMedicationsRequest {
                prescription_id: prescription,
                medications,
            },
        )
        .await
    }
}
