use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most admin endpoints wrap their payload in `{ "data": ... }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Delete endpoints answer with 204 or a small acknowledgement.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Admin {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|perms| perms.iter().any(|p| p == name))
    }
}

/// Partial admin profile sent to `PUT /admin/profile`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AdminProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LoginResponse {
    pub admin: Admin,
    pub token: String,
}

/// Answer of `PUT /admin/profile`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AdminResponse {
    pub admin: Admin,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Encrypted identifier issued by the API.
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    #[serde(default)]
    pub role_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role_id: String,
}

impl UserUpdate {
    /// Query parameters for the update call. An empty password is left out
    /// so the API keeps the current one.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
        ];
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            params.push(("password".to_string(), password.to_string()));
        }
        params.push(("role_id".to_string(), self.role_id.clone()));
        params
    }
}

impl UserCreate {
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("password".to_string(), self.password.clone()),
            ("role_id".to_string(), self.role_id.clone()),
        ]
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    pub id: String,
    pub name: String,
    /// Free-form description.
    pub content: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PermissionCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

pub type PermissionUpdate = PermissionCreate;

impl PermissionCreate {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![("name".to_string(), self.name.clone())];
        if let Some(content) = &self.content {
            params.push(("content".to_string(), content.clone()));
        }
        params
    }
}
