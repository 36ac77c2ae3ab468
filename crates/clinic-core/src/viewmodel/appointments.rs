use chrono::{Local, NaiveDate};
use clinic_api::{AppointmentFilter, Paginated, Record, RecordId};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

/// Appointment book: filtered listing, detail, CRUD, and the
/// cancel/complete/queue transitions.
#[derive(Clone)]
pub struct AppointmentsViewModel {
    ctx: Context,
}

impl AppointmentsViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn list(&self, filter: &AppointmentFilter) -> Query<Paginated<Record>> {
        self.list_on(filter, Local::now().date_naive())
    }

    /// Relative date filters resolve against `today`, and the resolved
    /// dates are part of the key.
    pub fn list_on(
        &self,
        filter: &AppointmentFilter,
        today: NaiveDate,
    ) -> Query<Paginated<Record>> {
        let key = QueryKey::new(Resource::Appointments).with_pairs(&filter.to_query(today));
        let filter = filter.clone();
        self.ctx.query(key, move |api| {
            let filter = filter.clone();
            async move { api.list_appointments_on(&filter, today).await }
        })
    }

    pub fn detail(&self, id: RecordId) -> Query<Record> {
        let key = QueryKey::new(Resource::Appointment).with("id", id);
        self.ctx
            .query(key, move |api| async move { api.get_appointment(id).await })
    }

    pub fn create(&self) -> Mutation<Record, Record> {
        self.ctx
            .mutation(Entity::Appointment, |api, appointment: Record| async move {
                api.create_appointment(&appointment).await
            })
    }

    pub fn update(&self) -> Mutation<(RecordId, Record), Record> {
        self.ctx.mutation(
            Entity::Appointment,
            |api, (id, appointment): (RecordId, Record)| async move {
                api.update_appointment(id, &appointment).await
            },
        )
    }

    pub fn delete(&self) -> Mutation<RecordId, ()> {
        self.ctx.mutation(Entity::Appointment, |api, id: RecordId| async move {
            api.delete_appointment(id).await
        })
    }

    pub fn cancel(&self) -> Mutation<RecordId, Record> {
        self.ctx.mutation(Entity::Appointment, |api, id: RecordId| async move {
            api.cancel_appointment(id).await
        })
    }

    pub fn complete(&self) -> Mutation<RecordId, Record> {
        self.ctx.mutation(Entity::Appointment, |api, id: RecordId| async move {
            api.complete_appointment(id).await
        })
    }

    pub fn queue(&self) -> Mutation<RecordId, Record> {
        self.ctx.mutation(Entity::Appointment, |api, id: RecordId| async move {
            api.queue_appointment(id).await
        })
    }
}
