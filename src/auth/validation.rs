//! Form checks. Each returns every problem it finds, at most one per field,
//! so the form can show them all at once.

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 3;
pub const PASSWORD_MAX: usize = 69;
/// bcrypt only reads the first 72 bytes of its input.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Shown for every login failure so the form never reveals which part was wrong.
pub const LOGIN_FAILED: &str = "Invalid username/password";
pub const USERNAME_TAKEN: &str = "Username is taken";

pub fn registration_errors(username: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let name_len = username.chars().count();
    if username.is_empty() {
        errors.push("Provide a username first!".to_string());
    } else if name_len < USERNAME_MIN {
        errors.push(format!(
            "Username must be at least {} characters!",
            USERNAME_MIN
        ));
    } else if name_len > USERNAME_MAX {
        errors.push(format!(
            "Username must be at most {} characters!",
            USERNAME_MAX
        ));
    } else if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Username can only contain alphanumeric characters!".to_string());
    }

    let password_len = password.chars().count();
    if password.is_empty() {
        errors.push("Provide a password first!".to_string());
    } else if password_len < PASSWORD_MIN {
        errors.push(format!(
            "Password must be at least {} characters!",
            PASSWORD_MIN
        ));
    } else if password_len > PASSWORD_MAX {
        errors.push(format!(
            "Password must be at most {} characters!",
            PASSWORD_MAX
        ));
    } else if password.len() > PASSWORD_MAX_BYTES {
        errors.push(format!(
            "Password must be at most {} bytes!",
            PASSWORD_MAX_BYTES
        ));
    }

    errors
}

pub fn post_errors(title: &str, body: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push("Add a title before saving.".to_string());
    }
    if body.is_empty() {
        errors.push("Add some text before saving.".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_boundary_is_three() {
        let errors = registration_errors("ab", "secret123");
        assert_eq!(errors, vec!["Username must be at least 3 characters!"]);

        assert!(registration_errors("abc", "secret123").is_empty());
    }

    #[test]
    fn username_upper_bound_is_thirty() {
        assert!(registration_errors(&"a".repeat(30), "secret123").is_empty());
        assert_eq!(
            registration_errors(&"a".repeat(31), "secret123"),
            vec!["Username must be at most 30 characters!"]
        );
    }

    #[test]
    fn username_must_be_alphanumeric() {
        for name in ["al ice", "alice!", "al_ice", "ålice"] {
            assert_eq!(
                registration_errors(name, "secret123"),
                vec!["Username can only contain alphanumeric characters!"],
                "{}",
                name
            );
        }
    }

    #[test]
    fn password_bounds() {
        assert_eq!(
            registration_errors("alice", ""),
            vec!["Provide a password first!"]
        );
        assert_eq!(
            registration_errors("alice", "ab"),
            vec!["Password must be at least 3 characters!"]
        );
        assert!(registration_errors("alice", &"p".repeat(69)).is_empty());
        assert_eq!(
            registration_errors("alice", &"p".repeat(70)),
            vec!["Password must be at most 69 characters!"]
        );
    }

    #[test]
    fn multibyte_password_is_capped_by_bytes() {
        // 37 characters, 73 bytes
        let long = format!("{}a", "é".repeat(36));
        assert_eq!(
            registration_errors("alice", &long),
            vec!["Password must be at most 72 bytes!"]
        );

        let exact = format!("{}ab", "é".repeat(35));
        assert_eq!(exact.len(), 72);
        assert!(registration_errors("alice", &exact).is_empty());
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let errors = registration_errors("", "");
        assert_eq!(
            errors,
            vec!["Provide a username first!", "Provide a password first!"]
        );
    }

    #[test]
    fn post_needs_title_and_body() {
        assert!(post_errors("Hello", "World").is_empty());
        assert_eq!(post_errors("", "World"), vec!["Add a title before saving."]);
        assert_eq!(post_errors("Hello", ""), vec!["Add some text before saving."]);
        assert_eq!(post_errors("", "").len(), 2);
    }
}
