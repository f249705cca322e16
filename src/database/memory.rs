//! In-memory stores used by the service and handler tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{LikeStore, RegistrationStore};
use crate::models::{
    CounterUpdate, InsertResult, LikerUser, RegisteredUser, TemplateLikes, UpdateResult,
};
use crate::utils::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryLikeStore {
    users: Mutex<Vec<LikerUser>>,
    templates: Mutex<Vec<TemplateLikes>>,
    fail: bool,
}

impl InMemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database
    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::DatabaseError("server selection timeout".to_string()));
        }
        Ok(())
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn find_user(&self, email: &str) -> AppResult<Option<LikerUser>> {
        self.check()?;
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_or_create_user(&self, email: &str) -> AppResult<LikerUser> {
        self.check()?;
        let mut users = self.users.lock().await;

        if let Some(user) = users.iter().find(|u| u.email == email) {
            return Ok(user.clone());
        }

        let user = LikerUser {
            id: Some(ObjectId::new()),
            email: email.to_string(),
            liked_templates: vec![],
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn add_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool> {
        self.check()?;
        let mut users = self.users.lock().await;

        match users.iter_mut().find(|u| u.email == email) {
            Some(user) if !user.has_liked(template_id) => {
                user.liked_templates.push(template_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_liked_template(&self, email: &str, template_id: &str) -> AppResult<bool> {
        self.check()?;
        let mut users = self.users.lock().await;

        match users.iter_mut().find(|u| u.email == email) {
            Some(user) if user.has_liked(template_id) => {
                user.liked_templates.retain(|t| t != template_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_template(&self, template_id: &str) -> AppResult<Option<TemplateLikes>> {
        self.check()?;
        let templates = self.templates.lock().await;
        Ok(templates.iter().find(|t| t.template_id == template_id).cloned())
    }

    async fn find_or_create_template_and_adjust(
        &self,
        template_id: &str,
        delta: i64,
    ) -> AppResult<CounterUpdate> {
        self.check()?;
        let mut templates = self.templates.lock().await;

        let (position, created) = match templates.iter().position(|t| t.template_id == template_id) {
            Some(i) => (i, false),
            None => {
                templates.push(TemplateLikes {
                    id: Some(ObjectId::new()),
                    template_id: template_id.to_string(),
                    like_count: 0,
                });
                (templates.len() - 1, true)
            }
        };

        let template = &mut templates[position];
        template.like_count = (template.like_count + delta).max(0);
        Ok(CounterUpdate {
            like_count: template.like_count,
            created,
        })
    }

    async fn users_by_email(&self, email: &str) -> AppResult<Vec<LikerUser>> {
        self.check()?;
        let users = self.users.lock().await;
        Ok(users.iter().filter(|u| u.email == email).cloned().collect())
    }

    async fn templates_by_id(&self, template_id: &str) -> AppResult<Vec<TemplateLikes>> {
        self.check()?;
        let templates = self.templates.lock().await;
        Ok(templates
            .iter()
            .filter(|t| t.template_id == template_id)
            .cloned()
            .collect())
    }
}

/// Mirrors the sparse unique index on `email`: documents upserted by id carry no
/// email and never match, nor collide with, an email lookup.
#[derive(Default)]
pub struct InMemoryRegistrationStore {
    users: Mutex<Vec<RegisteredUser>>,
    fail: bool,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database
    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::DatabaseError("server selection timeout".to_string()));
        }
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}

fn has_email(user: &RegisteredUser, email: &str) -> bool {
    !user.email.is_empty() && user.email == email
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<RegisteredUser>> {
        self.check()?;
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| has_email(u, email)).cloned())
    }

    async fn insert(&self, mut user: RegisteredUser) -> AppResult<Option<InsertResult>> {
        self.check()?;
        let mut users = self.users.lock().await;

        if users.iter().any(|u| has_email(u, &user.email)) {
            return Ok(None);
        }

        let id = ObjectId::new();
        user.id = Some(id);
        users.push(user);

        Ok(Some(InsertResult {
            acknowledged: true,
            inserted_id: id.to_hex(),
        }))
    }

    async fn list(&self) -> AppResult<Vec<RegisteredUser>> {
        self.check()?;
        Ok(self.users.lock().await.clone())
    }

    async fn set_role(&self, id: ObjectId, role: &str) -> AppResult<UpdateResult> {
        self.check()?;
        let mut users = self.users.lock().await;

        if let Some(user) = users.iter_mut().find(|u| u.id == Some(id)) {
            let modified = user.role.as_deref() != Some(role);
            user.role = Some(role.to_string());
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        users.push(RegisteredUser {
            id: Some(id),
            email: String::new(),
            role: Some(role.to_string()),
            profile: Default::default(),
        });

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id.to_hex()),
        })
    }

    async fn delete_by_email(&self, email: &str) -> AppResult<u64> {
        self.check()?;
        let mut users = self.users.lock().await;

        match users.iter().position(|u| has_email(u, email)) {
            Some(i) => {
                users.remove(i);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
