// ==================== LIKE TOGGLE ====================
// Keeps users.likedTemplates and templates.likeCount in step.
// The edge change is a single conditional document update; the counter is
// only touched by the request whose update actually changed the edge.

use crate::{
    database::LikeStore,
    models::{LikerUser, TemplateLikes},
    utils::{AppError, AppResult},
};

fn validate_ids(email: &str, template_id: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::InvalidRequest("email is required".to_string()));
    }
    if template_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("templateId is required".to_string()));
    }
    Ok(())
}

/// Moves (email, template_id) from not-liked to liked. Returns the new like count.
pub async fn like(store: &dyn LikeStore, email: &str, template_id: &str) -> AppResult<i64> {
    validate_ids(email, template_id)?;

    log::info!("👍 Like {} by {}", template_id, email);

    let user = store.find_or_create_user(email).await?;
    if user.has_liked(template_id) {
        log::warn!("⚠️ {} already liked {}", email, template_id);
        return Err(AppError::AlreadyLiked);
    }

    // A concurrent like of the same pair may have won since the read
    if !store.add_liked_template(email, template_id).await? {
        log::warn!("⚠️ {} already liked {} (concurrent request)", email, template_id);
        return Err(AppError::AlreadyLiked);
    }

    let counter = store.find_or_create_template_and_adjust(template_id, 1).await?;

    log::info!("✅ {} now has {} likes", template_id, counter.like_count);
    Ok(counter.like_count)
}

/// Moves (email, template_id) from liked to not-liked. Returns the new like count.
pub async fn unlike(store: &dyn LikeStore, email: &str, template_id: &str) -> AppResult<i64> {
    validate_ids(email, template_id)?;

    log::info!("👎 Unlike {} by {}", template_id, email);

    let liked = store
        .find_user(email)
        .await?
        .map(|u| u.has_liked(template_id))
        .unwrap_or(false);

    if !liked || !store.remove_liked_template(email, template_id).await? {
        log::warn!("⚠️ {} has not liked {}", email, template_id);
        return Err(AppError::NotLiked);
    }

    let counter = store.find_or_create_template_and_adjust(template_id, -1).await?;

    if counter.created {
        log::warn!(
            "⚠️ Template {} had a like from {} but no counter document; created it at 0",
            template_id,
            email
        );
    }

    log::info!("✅ {} now has {} likes", template_id, counter.like_count);
    Ok(counter.like_count)
}

/// User documents matching `email` (empty when the user never liked anything)
pub async fn like_status(store: &dyn LikeStore, email: &str) -> AppResult<Vec<LikerUser>> {
    store.users_by_email(email).await
}

/// Template counter documents matching `template_id`
pub async fn template_likes(
    store: &dyn LikeStore,
    template_id: &str,
) -> AppResult<Vec<TemplateLikes>> {
    store.templates_by_id(template_id).await
}
