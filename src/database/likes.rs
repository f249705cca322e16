use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::ReturnDocument;

use super::{LikeStore, MongoDB, TEMPLATES_COLLECTION, USERS_COLLECTION};
use crate::models::{CounterUpdate, LikerUser, TemplateLikes};
use crate::utils::{is_duplicate_key, AppError, AppResult};

#[async_trait]
impl LikeStore for MongoDB {
    async fn find_user(&self, email: &str) -> AppResult<Option<LikerUser>> {
        let users = self.collection::<LikerUser>(USERS_COLLECTION);
        Ok(users.find_one(doc! { "email": email }).await?)
    }

    async fn find_or_create_user(&self, email: &str) -> AppResult<LikerUser> {
        let users = self.collection::<LikerUser>(USERS_COLLECTION);

        let created = users
            .find_one_and_update(
                doc! { "email": email },
                doc! { "$setOnInsert": { "likedTemplates": [] } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await;

        match created {
            Ok(Some(user)) => Ok(user),
            // Another request created the document between our match and insert
            Err(e) if is_duplicate_key(&e) => users
                .find_one(doc! { "email": email })
                .await?
                .ok_or_else(|| AppError::DatabaseError(format!("User {} vanished after upsert", email))),
            Ok(None) => Err(AppError::DatabaseError(format!(
                "Upsert returned no document for user {}",
                email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn add_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool> {
        let users = self.collection::<LikerUser>(USERS_COLLECTION);

        // Membership test and set-add in one document update
        let result = users
            .update_one(
                doc! { "email": email, "likedTemplates": { "$ne": template_id } },
                doc! { "$addToSet": { "likedTemplates": template_id } },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    async fn remove_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool> {
        let users = self.collection::<LikerUser>(USERS_COLLECTION);

        let result = users
            .update_one(
                doc! { "email": email, "likedTemplates": template_id },
                doc! { "$pull": { "likedTemplates": template_id } },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    async fn find_template(&self, template_id: &str) -> AppResult<Option<TemplateLikes>> {
        let templates = self.collection::<TemplateLikes>(TEMPLATES_COLLECTION);
        Ok(templates.find_one(doc! { "templateId": template_id }).await?)
    }

    async fn find_or_create_template_and_adjust(
        &self,
        template_id: &str,
        delta: i64,
    ) -> AppResult<CounterUpdate> {
        let templates = self.collection::<TemplateLikes>(TEMPLATES_COLLECTION);

        // Pipeline update: a missing counter counts as 0 and the result is floored at 0
        let pipeline = vec![doc! {
            "$set": {
                "likeCount": {
                    "$max": [
                        0_i64,
                        { "$add": [ { "$ifNull": ["$likeCount", 0_i64] }, delta ] }
                    ]
                }
            }
        }];

        let filter = doc! { "templateId": template_id };

        // The pre-image tells whether the upsert inserted the document (None)
        let previous = match templates
            .find_one_and_update(filter.clone(), pipeline.clone())
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .await
        {
            Ok(previous) => previous,
            // Lost a create race: the document exists now, apply the delta to it
            Err(e) if is_duplicate_key(&e) => {
                let previous = templates
                    .find_one_and_update(filter, pipeline)
                    .return_document(ReturnDocument::Before)
                    .await?;
                if previous.is_none() {
                    return Err(AppError::DatabaseError(format!(
                        "Template {} vanished after upsert",
                        template_id
                    )));
                }
                previous
            }
            Err(e) => return Err(e.into()),
        };

        let created = previous.is_none();
        let start = previous.map(|t| t.like_count).unwrap_or(0);

        Ok(CounterUpdate {
            like_count: (start + delta).max(0),
            created,
        })
    }

    async fn users_by_email(&self, email: &str) -> AppResult<Vec<LikerUser>> {
        let users = self.collection::<LikerUser>(USERS_COLLECTION);
        let cursor = users.find(doc! { "email": email }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn templates_by_id(&self, template_id: &str) -> AppResult<Vec<TemplateLikes>> {
        let templates = self.collection::<TemplateLikes>(TEMPLATES_COLLECTION);
        let cursor = templates.find(doc! { "templateId": template_id }).await?;
        Ok(cursor.try_collect().await?)
    }
}
