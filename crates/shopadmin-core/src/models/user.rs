use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

impl User {
    /// Staff flag as the server reports it; either field grants admin
    pub fn has_admin_rights(&self) -> bool {
        self.is_admin || self.is_staff
    }

    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Body of `PUT /api/users/{id}/`. Fields left `None` keep their current
/// value on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "isAdmin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.name.is_none()
            && self.is_admin.is_none()
            && self.password.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let json = r#"{"id": 3, "username": "jdoe", "email": "j@example.com", "first_name": "Jane", "last_name": "Doe", "is_staff": true, "isAdmin": true}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name(), "Jane Doe");
        assert!(user.has_admin_rights());
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let user: User = serde_json::from_str(r#"{"id": 1, "username": "bob", "first_name": ""}"#).unwrap();
        assert_eq!(user.full_name(), "bob");
        assert!(!user.has_admin_rights());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = UserUpdate {
            is_admin: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"isAdmin": false}));
        assert!(UserUpdate::default().is_empty());
    }
}
