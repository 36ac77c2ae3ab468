use clinic_api::{Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

#[derive(Clone)]
pub struct SpecializationsViewModel {
    ctx: Context,
}

impl SpecializationsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self) -> Query<Paginated<Record>> {
        self.ctx.query(QueryKey::new(Resource::Specializations), |api| async move {
            api.list_specializations().await
        })
    }

    pub fn create(&self) -> Mutation<String, Record> {
        self.ctx
            .mutation(Entity::Specialization, |api, name: String| async move {
                api.create_specialization(&name).await
            })
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx
            .mutation(Entity::Specialization, |api, id: RecordId| async move {
                api.delete_specialization(id).await
            })
    }
}
