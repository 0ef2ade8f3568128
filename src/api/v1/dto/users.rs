/*
 * Responsibility
 * - Users request/response DTO
 * - validate() does shape checks only; uniqueness is the repo's job
 * - password hashes never appear in a response
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRow;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PHOTO_LEN: usize = 5000;

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub photo: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if !looks_like_email(self.identifier.trim()) {
            return Err("identifier must be an email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 8 characters");
        }
        if let Some(photo) = &self.photo
            && photo.len() > MAX_PHOTO_LEN
        {
            return Err("photo must be <= 5000 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.identifier.trim().is_empty() || self.password.is_empty() {
            return Err("identifier and password are required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub password: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, with = "tri_state")]
    pub photo: Option<Option<String>>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(identifier) = &self.identifier
            && !looks_like_email(identifier.trim())
        {
            return Err("identifier must be an email address");
        }
        if let Some(password) = &self.password
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err("password must be at least 8 characters");
        }
        if let Some(Some(photo)) = &self.photo
            && photo.len() > MAX_PHOTO_LEN
        {
            return Err("photo must be <= 5000 chars");
        }
        Ok(())
    }
}

// serde collapses a missing field and an explicit null into `None`; keep them apart.
mod tri_state {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub identifier: String,
    pub photo: Option<String>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            identifier: row.identifier,
            photo: row.photo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub name: String,
    pub identifier: String,
    pub photo: Option<String>,
    /// `"Bearer <jwt>"`, ready to be sent back as the Authorization header.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, identifier: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            identifier: identifier.to_string(),
            password: password.to_string(),
            photo: None,
        }
    }

    #[test]
    fn register_validation() {
        assert!(register("Root", "root@root.com", "rootroot").validate().is_ok());
        assert!(register(" ", "root@root.com", "rootroot").validate().is_err());
        assert!(register("Root", "root", "rootroot").validate().is_err());
        assert!(register("Root", "root@localhost", "rootroot").validate().is_err());
        assert!(register("Root", "root@root.com", "short").validate().is_err());
    }

    #[test]
    fn update_photo_is_tri_state() {
        let missing: UpdateUserRequest = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert!(missing.photo.is_none());

        let null: UpdateUserRequest = serde_json::from_str(r#"{"photo":null}"#).unwrap();
        assert_eq!(null.photo, Some(None));

        let set: UpdateUserRequest = serde_json::from_str(r#"{"photo":"-"}"#).unwrap();
        assert_eq!(set.photo, Some(Some("-".to_string())));
    }

    #[test]
    fn update_validation() {
        let bad: UpdateUserRequest = serde_json::from_str(r#"{"password":"123"}"#).unwrap();
        assert!(bad.validate().is_err());

        let ok: UpdateUserRequest =
            serde_json::from_str(r#"{"identifier":"juliana_ramos@email.com.br"}"#).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn login_requires_both_fields() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"identifier":"root@root.com","password":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
