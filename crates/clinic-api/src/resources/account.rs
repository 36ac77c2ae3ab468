// Account endpoints
//
// Operate on the authenticated user (`/auth/users/me/`). Doctors have a
// second profile under `/doctors/me/`. Profile writes are multipart so
// files can travel with the text fields.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Attachment, PasswordChange, ProfileForm, Record};

impl ApiClient {
    /// `GET /auth/users/me/`
    pub async fn current_user(&self) -> Result<Record, Error> {
        self.get("auth/users/me/").await
    }

    /// Set the user's availability status.
    ///
    /// `PUT /auth/users/me/` with `{"status"}`
    pub async fn update_status(&self, status: &str) -> Result<Record, Error> {
        debug!(status, "updating account status");
        self.put("auth/users/me/", &json!({ "status": status })).await
    }

    /// `PUT /auth/users/me/` as `multipart/form-data`
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<Record, Error> {
        debug!(fields = form.fields.len(), files = form.files.len(), "updating account profile");
        self.put_form("auth/users/me/", form.parts()).await
    }

    /// `PUT /doctors/me/` as `multipart/form-data`
    pub async fn update_doctor_profile(&self, form: &ProfileForm) -> Result<Record, Error> {
        debug!(fields = form.fields.len(), files = form.files.len(), "updating doctor profile");
        self.put_form("doctors/me/", form.parts()).await
    }

    /// Replace the profile picture: `PUT /auth/users/me/` with a single
    /// `avatar` file part.
    pub async fn upload_avatar(&self, avatar: Attachment) -> Result<Record, Error> {
        debug!(file = %avatar.file_name, len = avatar.bytes.len(), "uploading avatar");
        let form = ProfileForm::default().attach("avatar", avatar);
        self.put_form("auth/users/me/", form.parts()).await
    }

    /// `POST /auth/users/set_password/`
    pub async fn set_password(&self, change: &PasswordChange) -> Result<(), Error> {
        debug!("changing password");
        let _: Record = self.post("auth/users/set_password/", change).await?;
        Ok(())
    }

    /// `DELETE /auth/users/me/`
    pub async fn delete_account(&self) -> Result<(), Error> {
        debug!("deleting account");
        self.delete("auth/users/me/").await
    }
}
