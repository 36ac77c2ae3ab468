use clinic_api::{NewLabResult, Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

#[derive(Clone)]
pub struct LabResultsViewModel {
    ctx: Context,
}

impl LabResultsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, patient: RecordId) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::LabResults).with("patient", patient);
        self.ctx.query(key, move |api| async move {
            api.list_patient_lab_results(patient).await
        })
    }

    pub fn add(&self) -> Mutation<NewLabResult, Record> {
        self.ctx
            .mutation(Entity::LabResult, |api, result: NewLabResult| async move {
                api.add_lab_result(&result).await
            })
    }
}
