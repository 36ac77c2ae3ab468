use clinic_api::{Attachment, PasswordChange, ProfileForm, Record};

use super::Context;
use crate::invalidation::Entity;
use crate::mutation::Mutation;
use crate::query::{Query, QueryKey, Resource};

/// Settings for the signed-in user.
#[derive(Clone)]
pub struct AccountViewModel {
    ctx: Context,
}

impl AccountViewModel {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn current_user(&self) -> Query<Record> {
        self.ctx
            .query(QueryKey::new(Resource::CurrentUser), |api| async move {
                api.current_user().await
            })
    }

    pub fn update_status(&self) -> Mutation<String, Record> {
        self.ctx.mutation(Entity::Account, |api, status: String| async move {
            api.update_status(&status).await
        })
    }

    pub fn update_profile(&self) -> Mutation<ProfileForm, Record> {
        self.ctx.mutation(Entity::Account, |api, form: ProfileForm| async move {
            api.update_profile(&form).await
        })
    }

    pub fn update_doctor_profile(&self) -> Mutation<ProfileForm, Record> {
        self.ctx.mutation(Entity::Account, |api, form: ProfileForm| async move {
            api.update_doctor_profile(&form).await
        })
    }

    pub fn upload_avatar(&self) -> Mutation<Attachment, Record> {
        self.ctx.mutation(Entity::Account, |api, avatar: Attachment| async move {
            api.upload_avatar(avatar).await
        })
    }

    pub fn set_password(&self) -> Mutation<PasswordChange, ()> {
        self.ctx
            .mutation(Entity::Account, |api, change: PasswordChange| async move {
                api.set_password(&change).await
            })
    }

    pub fn delete_account(&self) -> Mutation<(), ()> {
        self.ctx.mutation(Entity::Account, |api, (): ()| async move {
            api.delete_account().await
        })
    }
}
