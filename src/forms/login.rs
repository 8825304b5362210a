use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate)]
/// Credentials submitted on the login screen.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginForm {
    /// Email as sent to the API: trimmed and lowercased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_email_and_empty_password() {
        let form = LoginForm {
            email: "admin".into(),
            password: "".into(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn normalizes_email() {
        let form = LoginForm {
            email: "  Admin@Example.COM ".into(),
            password: "secret".into(),
        };
        assert_eq!(form.normalized_email(), "admin@example.com");
    }
}
