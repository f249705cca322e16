mod likes;
mod registered_users;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use crate::models::{
    CounterUpdate, InsertResult, LikerUser, RegisteredUser, TemplateLikes, UpdateResult,
};
use crate::utils::{is_index_conflict, AppResult};

pub const USERS_COLLECTION: &str = "users";
pub const TEMPLATES_COLLECTION: &str = "templates";
pub const REGISTERED_USERS_COLLECTION: &str = "registereduser";

/// Storage for the like relationship: liker documents plus per-template counters.
///
/// Every mutating method is a single-document atomic operation. The `find_or_create_*`
/// methods materialize the document when it does not exist yet.
#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn find_user(&self, email: &str) -> AppResult<Option<LikerUser>>;

    async fn find_or_create_user(&self, email: &str) -> AppResult<LikerUser>;

    /// Adds `template_id` to the user's liked set only if it is not already there.
    /// Returns `false` when the edge already existed (or the user is missing).
    async fn add_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool>;

    /// Removes `template_id` from the user's liked set only if it is there.
    /// Returns `false` when there was no edge to remove.
    async fn remove_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool>;

    async fn find_template(&self, template_id: &str) -> AppResult<Option<TemplateLikes>>;

    /// Adds `delta` to the template counter, creating the template with a zero counter
    /// first if needed. The counter never goes below zero.
    async fn find_or_create_template_and_adjust(
        &self,
        template_id: &str,
        delta: i64,
    ) -> AppResult<CounterUpdate>;

    async fn users_by_email(&self, email: &str) -> AppResult<Vec<LikerUser>>;

    async fn templates_by_id(&self, template_id: &str) -> AppResult<Vec<TemplateLikes>>;
}

/// Storage for the registered users directory.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<RegisteredUser>>;

    /// Inserts the user. Returns `None` when the email is already taken.
    async fn insert(&self, user: RegisteredUser) -> AppResult<Option<InsertResult>>;

    async fn list(&self) -> AppResult<Vec<RegisteredUser>>;

    /// Sets `role` on the document with the given id, creating it if absent.
    async fn set_role(&self, id: ObjectId, role: &str) -> AppResult<UpdateResult>;

    /// Returns the number of deleted documents.
    async fn delete_by_email(&self, email: &str) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("greenforms-service".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        log::info!("📡 Pinged deployment, database: {}", db_name);

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique keys back the conditional updates: a racing find-or-create fails with
    /// E11000 instead of producing a second document.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        // (collection, field, sparse)
        let unique_keys = [
            (USERS_COLLECTION, "email", false),
            (TEMPLATES_COLLECTION, "templateId", false),
            // Role upserts by _id insert documents with no email at all
            (REGISTERED_USERS_COLLECTION, "email", true),
        ];

        for (collection_name, field, sparse) in unique_keys {
            let collection = self.collection::<mongodb::bson::Document>(collection_name);

            let mut created = collection.create_index(unique_index(field, sparse)).await;

            // An index on the same key built with other options blocks the new one
            if matches!(&created, Err(e) if is_index_conflict(e)) {
                log::warn!(
                    "   ⚠️  Rebuilding index {}({}) with sparse={}",
                    collection_name,
                    field,
                    sparse
                );
                created = match collection.drop_index(format!("{}_1", field)).await {
                    Ok(()) => collection.create_index(unique_index(field, sparse)).await,
                    Err(e) => Err(e),
                };
            }

            match created {
                Ok(_) => log::info!("   ✅ Index created: {}({}) unique", collection_name, field),
                // Existing duplicates make this fail; the service still works, just without the guard
                Err(e) => log::warn!(
                    "   ⚠️  Could not create unique index {}({}): {}",
                    collection_name,
                    field,
                    e
                ),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

fn unique_index(field: &str, sparse: bool) -> IndexModel {
    IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(IndexOptions::builder().unique(true).sparse(sparse).build())
        .build()
}
