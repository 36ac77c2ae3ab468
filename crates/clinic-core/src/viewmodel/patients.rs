use clinic_api::{ListParams, Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

/// Patient directory: active and deactivated listings, detail, and the
/// create/update/deactivate lifecycle.
#[derive(Clone)]
pub struct PatientsViewModel {
    ctx: Context,
}

impl PatientsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, params: &ListParams) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::Patients).with_pairs(&params.to_query());
        let params = params.clone();
        self.ctx.query(key, move |api| {
            let params = params.clone();
            async move { api.list_patients(&params).await }
        })
    }

    pub fn detail(&self, id: RecordId) -> Query<Record> {
        let key = QueryKey::new(Resource::Patient).with("id", id);
        self.ctx
            .query(key, move |api| async move { api.get_patient(id).await })
    }

    pub fn deactivated(&self, params: &ListParams) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::DeactivatedPatients).with_pairs(&params.to_query());
        let params = params.clone();
        self.ctx.query(key, move |api| {
            let params = params.clone();
            async move { api.list_deactivated_patients(&params).await }
        })
    }

    pub fn create(&self) -> Mutation<Record, Record> {
        self.ctx.mutation(Entity::Patient, |api, patient: Record| async move {
            api.create_patient(&patient).await
        })
    }

    pub fn update(&self) -> Mutation<(RecordId, Record), Record> {
        self.ctx
            .mutation(Entity::Patient, |api, (id, patient): (RecordId, Record)| async move {
                api.update_patient(id, &patient).await
            })
    }

    /// Create when the id is `None`, otherwise update.
    pub fn save(&self) -> Mutation<(Option<RecordId>, Record), Record> {
        self.ctx.mutation(
            Entity::Patient,
            |api, (id, patient): (Option<RecordId>, Record)| async move {
                api.save_patient(id, &patient).await
            },
        )
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx.mutation(Entity::Patient, |api, id: RecordId| async move {
            api.delete_patient(id).await
        })
    }

    /// Deactivate (`false`) or reactivate (`true`) through the active flag.
    pub fn set_active(&self) -> Mutation<(RecordId, bool), Record> {
        self.ctx
            .mutation(Entity::Patient, |api, (id, active): (RecordId, bool)| async move {
                api.set_patient_active(id, active).await
            })
    }

    pub fn activate(&self) -> Mutation<RecordId, Record> {
        self.ctx.mutation(Entity::Patient, |api, id: RecordId| async move {
            api.activate_patient(id).await
        })
    }
}
