use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Liker document (collection `users`), keyed by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikerUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,

    /// Set of liked template ids (kept unique with $addToSet)
    #[serde(rename = "likedTemplates", default)]
    pub liked_templates: Vec<String>,
}

impl LikerUser {
    pub fn has_liked(&self, template_id: &str) -> bool {
        self.liked_templates.iter().any(|t| t == template_id)
    }
}

/// Body of POST /api/like and POST /api/unlike
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub template_id: String,
    pub email: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LikerUserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(rename = "likedTemplates")]
    pub liked_templates: Vec<String>,
}

impl From<LikerUser> for LikerUserResponse {
    fn from(u: LikerUser) -> Self {
        LikerUserResponse {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: u.email,
            liked_templates: u.liked_templates,
        }
    }
}
