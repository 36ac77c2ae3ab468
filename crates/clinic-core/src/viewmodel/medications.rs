use clinic_api::{ListParams, Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

/// Medication catalogue.
#[derive(Clone)]
pub struct MedicationsViewModel {
    ctx: Context,
}

impl MedicationsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, params: &ListParams) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::Medications).with_pairs(&params.to_query());
        let params = params.clone();
        self.ctx.query(key, move |api| {
            let params = params.clone();
            async move { api.list_medications(&params).await }
        })
    }

    pub fn detail(&self, id: RecordId) -> Query<Record> {
        let key = QueryKey::new(Resource::Medication).with("id", id);
        self.ctx
            .query(key, move |api| async move { api.get_medication(id).await })
    }

    pub fn create(&self) -> Mutation<Record, Record> {
        self.ctx
            .mutation(Entity::Medication, |api, medication: Record| async move {
                api.create_medication(&medication).await
            })
    }

    pub fn update(&self) -> Mutation<(RecordId, Record), Record> {
        self.ctx.mutation(
            Entity::Medication,
            |api, (id, medication): (RecordId, Record)| async move {
                api.update_medication(id, &medication).await
            },
        )
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx.mutation(Entity::Medication, |api, id: RecordId| async move {
            api.delete_medication(id).await
        })
    }
}
