use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Like counter of a template (collection `templates`).
/// `template_id` is assigned by the client, not by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLikes {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(rename = "templateId")]
    pub template_id: String,

    #[serde(rename = "likeCount", default)]
    pub like_count: i64,
}

/// Outcome of a counter adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterUpdate {
    pub like_count: i64,
    /// The template document did not exist and was created by this adjustment
    pub created: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TemplateLikesResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "templateId")]
    pub template_id: String,
    #[serde(rename = "likeCount")]
    pub like_count: i64,
}

impl From<TemplateLikes> for TemplateLikesResponse {
    fn from(t: TemplateLikes) -> Self {
        TemplateLikesResponse {
            id: t.id.map(|id| id.to_hex()).unwrap_or_default(),
            template_id: t.template_id,
            like_count: t.like_count,
        }
    }
}
