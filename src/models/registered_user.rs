use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered user (collection `registereduser`).
/// Only `email` and `role` are interpreted; the rest of the profile is stored as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    // A role upsert on an unknown id leaves a document without email
    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl RegisteredUser {
    /// Builds a registered user from an arbitrary JSON object. `email` must be a non-empty string.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let mut fields = match body {
            Value::Object(map) => map,
            _ => return Err("body must be a JSON object".to_string()),
        };

        // The store assigns the identifier
        fields.remove("_id");

        let email = match fields.remove("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => email,
            _ => return Err("email is required".to_string()),
        };

        let role = match fields.remove("role") {
            Some(Value::String(role)) => Some(role),
            Some(Value::Null) | None => None,
            Some(_) => return Err("role must be a string".to_string()),
        };

        Ok(RegisteredUser {
            id: None,
            email,
            role,
            profile: fields,
        })
    }
}

/// Body of PUT /registereduser/{id}
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    pub value: String,
}

/// JSON view of a registered user: profile fields flattened, `_id` as hex
#[derive(Debug, Serialize)]
pub struct RegisteredUserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl From<RegisteredUser> for RegisteredUserResponse {
    fn from(u: RegisteredUser) -> Self {
        RegisteredUserResponse {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: u.email,
            role: u.role,
            profile: u.profile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}
