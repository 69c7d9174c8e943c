use serde::Deserialize;

/// Login form body. Field names follow the HTML form inputs; `username`
/// carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form body, same shape as login.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

/// Query half of the provider callback. Both fields are absent when the
/// user cancels at the consent screen.
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_query_tolerates_missing_fields() {
        let q: OAuthCallback =
            serde_json::from_value(serde_json::json!({ "error": "access_denied" }))
                .expect("deserializes");
        assert!(q.code.is_none());
        assert!(q.state.is_none());
    }
}
