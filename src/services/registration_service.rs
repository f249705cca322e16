// ==================== REGISTERED USERS DIRECTORY ====================
// Plain CRUD over the `registereduser` collection. Deleting a user also
// deletes the identity provider account (provider first, then local).

use crate::{
    database::RegistrationStore,
    models::{InsertResult, RegisteredUser, UpdateResult},
    services::identity_provider::IdentityProvider,
    utils::{AppError, AppResult},
};
use mongodb::bson::oid::ObjectId;

#[derive(Debug, PartialEq)]
pub enum CreateOutcome {
    Created(InsertResult),
    AlreadyExists,
}

pub async fn create_user(
    store: &dyn RegistrationStore,
    user: RegisteredUser,
) -> AppResult<CreateOutcome> {
    log::info!("📝 Registering user {}", user.email);

    if store.find_by_email(&user.email).await?.is_some() {
        log::info!("ℹ️ User {} already registered", user.email);
        return Ok(CreateOutcome::AlreadyExists);
    }

    let email = user.email.clone();
    match store.insert(user).await? {
        Some(result) => {
            log::info!("✅ User {} registered with id {}", email, result.inserted_id);
            Ok(CreateOutcome::Created(result))
        }
        None => {
            log::info!("ℹ️ User {} registered concurrently", email);
            Ok(CreateOutcome::AlreadyExists)
        }
    }
}

pub async fn list_users(store: &dyn RegistrationStore) -> AppResult<Vec<RegisteredUser>> {
    store.list().await
}

pub async fn get_user_by_email(
    store: &dyn RegistrationStore,
    email: &str,
) -> AppResult<Option<RegisteredUser>> {
    store.find_by_email(email).await
}

pub async fn set_role(
    store: &dyn RegistrationStore,
    id: &str,
    role: &str,
) -> AppResult<UpdateResult> {
    let object_id = ObjectId::parse_str(id)
        .map_err(|_| AppError::InvalidRequest(format!("Invalid user id: {}", id)))?;

    log::info!("🛡️ Setting role '{}' on registered user {}", role, id);

    store.set_role(object_id, role).await
}

/// Deletes the identity provider account, then the local document.
///
/// The two deletions are not atomic: if the local step fails or finds nothing
/// after the provider account is gone, no compensation is attempted and the
/// orphaned state is only logged.
pub async fn delete_user(
    store: &dyn RegistrationStore,
    identity: &dyn IdentityProvider,
    email: &str,
) -> AppResult<()> {
    log::info!("🗑️ Deleting registered user {}", email);

    let uid = identity.get_user_by_email(email).await?;
    identity.delete_user(&uid).await?;

    let deleted = match store.delete_by_email(email).await {
        Ok(count) => count,
        Err(e) => {
            log::error!(
                "❌ Identity account {} deleted but local record {} was not: {}",
                uid,
                email,
                e
            );
            return Err(e);
        }
    };

    if deleted == 0 {
        log::warn!(
            "⚠️ Identity account {} deleted but no local record exists for {}",
            uid,
            email
        );
        return Err(AppError::NotFound(format!("User {} not found", email)));
    }

    log::info!("✅ Registered user {} deleted", email);
    Ok(())
}
