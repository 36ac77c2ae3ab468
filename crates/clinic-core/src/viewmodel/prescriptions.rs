use clinic_api::{Paginated, PrescriptionMedication, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

/// A patient's prescription history, two prescriptions per page.
#[derive(Clone)]
pub struct PrescriptionsViewModel {
    ctx: Context,
}

impl PrescriptionsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, patient: RecordId, page: u32) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::Prescriptions)
            .with("patient", patient)
            .with("page", page);
        self.ctx.query(key, move |api| async move {
            api.list_patient_prescriptions(patient, page).await
        })
    }

    /// Input: the medical record the prescription belongs to.
    pub fn create(&self) -> Mutation<RecordId, Record> {
        self.ctx
            .mutation(Entity::Prescription, |api, medical_record: RecordId| async move {
                api.create_prescription(medical_record).await
            })
    }

    pub fn add_medications(&self) -> Mutation<(RecordId, Vec<PrescriptionMedication>), Record> {
        self.ctx.mutation(
            Entity::Prescription,
            |api, (prescription, lines): (RecordId, Vec<PrescriptionMedication>)| async move {
                api.add_medications_to_prescription(prescription, &lines).await
            },
        )
    }
}
