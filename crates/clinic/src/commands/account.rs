//! Account handlers for the signed-in user.

use clinic_api::{PasswordChange, ProfileForm};
use clinic_core::Clinic;

use crate::cli::{AccountArgs, AccountCommand, GlobalOpts, ProfileArgs};
use crate::error::CliError;

use super::util;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

fn profile_form(args: &ProfileArgs) -> Result<ProfileForm, CliError> {
    let fields = match &args.from_file {
        Some(path) => util::read_json_as(path)?,
        None => serde_json::Map::new(),
    };
    args.attach
        .iter()
        .try_fold(ProfileForm::new(fields), |form, (field, path)| {
            Ok(form.attach(field.clone(), util::read_attachment(path)?))
        })
}

pub async fn handle(
    clinic: &Clinic,
    args: AccountArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let vm = clinic.account();
    match args.command {
        AccountCommand::Show => {
            let me = vm.current_user().fetch().await?;
            util::print_record(global, &me);
        }

        AccountCommand::Status { status } => {
            vm.update_status().mutate(status.clone()).await?;
            util::done(global, &format!("Status set to {status}"));
        }

        AccountCommand::Update(profile) => {
            vm.update_profile().mutate(profile_form(&profile)?).await?;
            util::done(global, "Profile updated");
        }

        AccountCommand::UpdateDoctor(profile) => {
            vm.update_doctor_profile().mutate(profile_form(&profile)?).await?;
            util::done(global, "Doctor profile updated");
        }

        AccountCommand::UploadAvatar { path } => {
            let avatar = util::read_attachment(&path)?;
            vm.upload_avatar().mutate(avatar).await?;
            util::done(global, "Avatar uploaded");
        }

        AccountCommand::SetPassword => {
            let current_password = prompt_secret("Current password: ")?;
            let new_password = prompt_secret("New password: ")?;
            let repeated = prompt_secret("Repeat new password: ")?;
            if new_password != repeated {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "passwords do not match".into(),
                });
            }
            vm.set_password()
                .mutate(PasswordChange {
                    current_password,
                    new_password,
                })
                .await?;
            util::done(global, "Password changed");
        }

        AccountCommand::Delete => {
            if !util::confirm("Permanently delete your account?", global.yes)? {
                return Ok(());
            }
            vm.delete_account().mutate(()).await?;
            clinic.logout();
            util::done(global, "Account deleted");
        }
    }
    Ok(())
}
