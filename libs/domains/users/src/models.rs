use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::{validate_password_confirmation, validate_strong_password, validate_us_phone};

/// Stored user record.
///
/// `password_hash` serializes as `password` so the file store keeps its
/// document shape; this type never leaves the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub bio: Option<String>,
    pub contact: String,
    pub module: String,
}

impl User {
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            bio: input.bio,
            contact: input.contact,
            module: input.module,
        }
    }

    /// Replace only the supplied fields
    pub fn apply_changes(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(hash) = changes.password_hash {
            self.password_hash = hash;
        }
        if let Some(bio) = changes.bio {
            self.bio = bio;
        }
        if let Some(contact) = changes.contact {
            self.contact = contact;
        }
        if let Some(module) = changes.module {
            self.module = module;
        }
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// Public view of a user (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub contact: String,
    pub module: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            bio: user.bio,
            contact: user.contact,
            module: user.module,
        }
    }
}

/// DTO for creating a new user
///
/// Missing fields deserialize empty so the rules below report them per field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(custom(function = "validate_strong_password"))]
    #[schema(example = "Str0ng!pass")]
    pub password: String,
    #[serde(alias = "confPassword")]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    #[schema(example = "Str0ng!pass")]
    pub confirm_password: String,
    pub bio: Option<String>,
    #[validate(custom(function = "validate_us_phone"))]
    #[schema(example = "2025550143")]
    pub contact: String,
    #[validate(length(min = 1, message = "Module is required"))]
    #[schema(example = "analytics")]
    pub module: String,
}

/// DTO for a partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_confirmation"))]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_strong_password"))]
    pub password: Option<String>,
    #[serde(alias = "confPassword")]
    pub confirm_password: Option<String>,
    /// `null` clears the bio; an absent key leaves it unchanged
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[validate(custom(function = "validate_us_phone"))]
    pub contact: Option<String>,
    #[validate(length(min = 1, message = "Module is required"))]
    pub module: Option<String>,
}

/// Wraps any present value (including `null`) in `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_update_confirmation(input: &UpdateUser) -> Result<(), ValidationError> {
    validate_password_confirmation(input.password.as_deref(), input.confirm_password.as_deref())
}

/// DTO for user login
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Str0ng!pass")]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Repository input for a new record; the password is already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub contact: String,
    pub module: String,
}

/// Repository input for a partial update; the password is already hashed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub bio: Option<Option<String>>,
    pub contact: Option<String>,
    pub module: Option<String>,
}

impl UserChanges {
    pub fn from_update(input: UpdateUser, password_hash: Option<String>) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password_hash,
            bio: input.bio,
            contact: input.contact,
            module: input.module,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::errors::field_errors;
    use serde_json::json;

    fn valid_create() -> serde_json::Value {
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "Str0ng!pass",
            "confirm_password": "Str0ng!pass",
            "contact": "2025550143",
            "module": "analytics"
        })
    }

    fn failing_fields<T: Validate>(input: &T) -> Vec<String> {
        match input.validate() {
            Ok(()) => vec![],
            Err(e) => field_errors(&e).into_iter().map(|f| f.field).collect(),
        }
    }

    #[test]
    fn test_valid_create_passes() {
        let input: CreateUser = serde_json::from_value(valid_create()).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.bio.is_none());
    }

    #[test]
    fn test_conf_password_alias_is_accepted() {
        let mut body = valid_create();
        let obj = body.as_object_mut().unwrap();
        obj.remove("confirm_password");
        obj.insert("confPassword".into(), json!("Str0ng!pass"));

        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert_eq!(input.confirm_password, "Str0ng!pass");
    }

    #[test]
    fn test_create_reports_every_failing_field() {
        let input = CreateUser {
            name: "Al".into(),
            email: "not-an-email".into(),
            password: "weak".into(),
            confirm_password: "different".into(),
            bio: None,
            contact: "555".into(),
            module: "".into(),
        };

        assert_eq!(
            failing_fields(&input),
            vec!["confirm_password", "contact", "email", "module", "name", "password"]
        );
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateUser::default().validate().is_ok());
    }

    #[test]
    fn test_update_password_requires_confirmation() {
        let input = UpdateUser {
            password: Some("Str0ng!pass".into()),
            ..Default::default()
        };
        assert_eq!(failing_fields(&input), vec!["confirm_password"]);

        let input = UpdateUser {
            password: Some("Str0ng!pass".into()),
            confirm_password: Some("Str0ng!pass".into()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_update_checks_present_fields_only() {
        let input = UpdateUser {
            name: Some("Al".into()),
            bio: Some(Some(String::new())),
            ..Default::default()
        };
        assert_eq!(failing_fields(&input), vec!["name"]);
    }

    #[test]
    fn test_stored_user_serializes_hash_as_password() {
        let user = User::new(NewUser {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            bio: None,
            contact: "2025550143".into(),
            module: "analytics".into(),
        });

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["password"], "$argon2id$hash");
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_public_view_has_no_password() {
        let user = User::new(NewUser {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            bio: Some("Analyst".into()),
            contact: "2025550143".into(),
            module: "analytics".into(),
        });
        let id = user.id;

        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(value["id"], id.to_string());
        assert_eq!(value["bio"], "Analyst");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_apply_changes_only_touches_supplied_fields() {
        let mut user = User::new(NewUser {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "h1".into(),
            bio: None,
            contact: "2025550143".into(),
            module: "analytics".into(),
        });
        let before = user.clone();

        user.apply_changes(UserChanges {
            bio: Some(Some("Mathematician".into())),
            ..Default::default()
        });

        assert_eq!(user.bio.as_deref(), Some("Mathematician"));
        assert_eq!(user.name, before.name);
        assert_eq!(user.email, before.email);
        assert_eq!(user.password_hash, before.password_hash);
        assert_eq!(user.id, before.id);
    }

    #[test]
    fn test_missing_create_fields_fail_their_rules() {
        let mut body = valid_create();
        body.as_object_mut().unwrap().remove("contact");

        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert_eq!(failing_fields(&input), vec!["contact"]);

        let input: CreateUser = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            failing_fields(&input),
            vec!["contact", "email", "module", "name", "password"]
        );
    }

    #[test]
    fn test_missing_login_fields_fail_their_rules() {
        let input: LoginRequest = serde_json::from_value(json!({"email": "ada@example.com"})).unwrap();
        assert_eq!(failing_fields(&input), vec!["password"]);
    }

    #[test]
    fn test_update_bio_null_differs_from_absent() {
        let absent: UpdateUser = serde_json::from_value(json!({"name": "Grace Hopper"})).unwrap();
        assert_eq!(absent.bio, None);

        let cleared: UpdateUser = serde_json::from_value(json!({"bio": null})).unwrap();
        assert_eq!(cleared.bio, Some(None));

        let set: UpdateUser = serde_json::from_value(json!({"bio": "Admiral"})).unwrap();
        assert_eq!(set.bio, Some(Some("Admiral".to_string())));
    }

    #[test]
    fn test_apply_changes_can_clear_bio() {
        let mut user = User::new(NewUser {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "h1".into(),
            bio: Some("Analyst".into()),
            contact: "2025550143".into(),
            module: "analytics".into(),
        });

        user.apply_changes(UserChanges {
            bio: Some(None),
            ..Default::default()
        });
        assert!(user.bio.is_none());

        user.apply_changes(UserChanges::default());
        assert!(user.bio.is_none());
    }
}
