use clinic_api::{Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

#[derive(Clone)]
pub struct DoctorsViewModel {
    ctx: Context,
}

impl DoctorsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Doctor roster, optionally narrowed by a search term.
    pub fn list(&self, search: Option<&str>) -> Query<Paginated<Record>> {
        let search = search.filter(|s| !s.is_empty()).map(str::to_owned);
        let key = QueryKey::new(Resource::Doctors).with_opt("search", search.as_deref());
        self.ctx.query(key, move |api| {
            let search = search.clone();
            async move { api.list_doctors(search.as_deref()).await }
        })
    }

    pub fn create(&self) -> Mutation<Record, Record> {
        self.ctx.mutation(Entity::Doctor, |api, doctor: Record| async move {
            api.create_doctor(&doctor).await
        })
    }

    pub fn update(&self) -> Mutation<(RecordId, Record), Record> {
        self.ctx
            .mutation(Entity::Doctor, |api, (id, changes): (RecordId, Record)| async move {
                api.update_doctor(id, &changes).await
            })
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx.mutation(Entity::Doctor, |api, id: RecordId| async move {
            api.delete_doctor(id).await
        })
    }
}
