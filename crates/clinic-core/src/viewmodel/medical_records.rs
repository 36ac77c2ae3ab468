use clinic_api::{Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

#[derive(Clone)]
pub struct MedicalRecordsViewModel {
    ctx: Context,
}

impl MedicalRecordsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, page: Option<u32>, patient: Option<RecordId>) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::MedicalRecords)
            .with_opt("page", page)
            .with_opt("patient", patient);
        self.ctx.query(key, move |api| async move {
            api.list_medical_records(page, patient).await
        })
    }

    pub fn detail(&self, id: RecordId) -> Query<Record> {
        let key = QueryKey::new(Resource::MedicalRecord).with("id", id);
        self.ctx
            .query(key, move |api| async move { api.get_medical_record(id).await })
    }

    /// Most recent record for a patient; `None` when there is none yet.
    pub fn latest(&self, patient: RecordId) -> Query<Option<Record>> {
        let key = QueryKey::new(Resource::LatestMedicalRecord).with("patient", patient);
        self.ctx.query(key, move |api| async move {
            api.latest_medical_record(patient).await
        })
    }

    pub fn create(&self) -> Mutation<Record, Record> {
        self.ctx
            .mutation(Entity::MedicalRecord, |api, record: Record| async move {
                api.create_medical_record(&record).await
            })
    }

    pub fn update(&self) -> Mutation<(RecordId, Record), Record> {
        self.ctx.mutation(
            Entity::MedicalRecord,
            |api, (id, record): (RecordId, Record)| async move {
                api.update_medical_record(id, &record).await
            },
        )
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx
            .mutation(Entity::MedicalRecord, |api, id: RecordId| async move {
                api.delete_medical_record(id).await
            })
    }
}
