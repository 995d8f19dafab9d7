use serde::Deserialize;

/// Body of both /register and /login. Missing fields deserialize as empty.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    /// Emails are matched case-insensitively and without surrounding whitespace.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let req = CredentialsRequest {
            email: "  Ada@Example.COM ".into(),
            password: "pw".into(),
        };
        assert_eq!(req.normalized_email(), "ada@example.com");
        assert!(req.is_complete());
    }

    #[test]
    fn blank_fields_are_incomplete() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"email": "   "}"#).unwrap();
        assert!(!req.is_complete());
    }
}
