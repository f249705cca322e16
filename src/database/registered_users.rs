use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};

use super::{MongoDB, RegistrationStore, REGISTERED_USERS_COLLECTION};
use crate::models::{InsertResult, RegisteredUser, UpdateResult};
use crate::utils::{is_duplicate_key, AppResult};

fn bson_id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RegistrationStore for MongoDB {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<RegisteredUser>> {
        let collection = self.collection::<RegisteredUser>(REGISTERED_USERS_COLLECTION);
        Ok(collection.find_one(doc! { "email": email }).await?)
    }

    async fn insert(&self, user: RegisteredUser) -> AppResult<Option<InsertResult>> {
        let collection = self.collection::<RegisteredUser>(REGISTERED_USERS_COLLECTION);

        match collection.insert_one(&user).await {
            Ok(result) => Ok(Some(InsertResult {
                acknowledged: true,
                inserted_id: bson_id_to_string(&result.inserted_id),
            })),
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> AppResult<Vec<RegisteredUser>> {
        let collection = self.collection::<RegisteredUser>(REGISTERED_USERS_COLLECTION);
        let cursor = collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_role(&self, id: ObjectId, role: &str) -> AppResult<UpdateResult> {
        let collection = self.collection::<RegisteredUser>(REGISTERED_USERS_COLLECTION);

        let result = collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "role": role } })
            .upsert(true)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id.as_ref().map(bson_id_to_string),
        })
    }

    async fn delete_by_email(&self, email: &str) -> AppResult<u64> {
        let collection = self.collection::<RegisteredUser>(REGISTERED_USERS_COLLECTION);
        let result = collection.delete_one(doc! { "email": email }).await?;
        Ok(result.deleted_count)
    }
}
