use serde::Deserialize;

/// Upsert payload for the administrative save endpoint. A missing or zero
/// id means "create"; the password is required then, and optional (a
/// reset) on update.
#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    #[serde(default)]
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_defaults() {
        let req: SaveUserRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).expect("parse");
        assert_eq!(req.id, 0);
        assert_eq!(req.email, "a@b.com");
        assert_eq!(req.first_name, "");
        assert_eq!(req.last_name, "");
        assert!(req.active);
        assert!(req.password.is_none());
    }

    #[test]
    fn save_request_full_payload() {
        let req: SaveUserRequest = serde_json::from_str(
            r#"{"id":3,"email":"a@b.com","first_name":"A","last_name":"B","active":false,"password":"hunter2hunter2"}"#,
        )
        .expect("parse");
        assert_eq!(req.id, 3);
        assert!(!req.active);
        assert_eq!(req.password.as_deref(), Some("hunter2hunter2"));
    }
}
