use common::{
    error::ValidationError,
    validation::Validate,
};
use serde::{Deserialize, Serialize};

/// Username and password entered into the login form
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Form fields sent to the login endpoint. The username is trimmed, the password is not.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_owned(), self.username.trim().to_owned()),
            ("password".to_owned(), self.password.clone()),
        ]
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            let field = if self.username.trim().is_empty() {
                "username"
            } else {
                "password"
            };
            return Err(ValidationError::new(
                field,
                "Please enter both username and password.",
            ));
        }
        Ok(())
    }
}

/// Role of a portal user, transferred as the role id of the backend
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "i64", into = "i64")]
pub enum Role {
    Admin,
    Applicant,
    Recruiter,
    Other(i64),
}

impl Role {
    pub const fn id(self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Applicant => 2,
            Self::Recruiter => 3,
            Self::Other(id) => id,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Applicant => "Applicant",
            Self::Recruiter => "Recruiter",
            Self::Other(_) => "User",
        }
    }
}

impl From<i64> for Role {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Admin,
            2 => Self::Applicant,
            3 => Self::Recruiter,
            other => Self::Other(other),
        }
    }
}

impl From<Role> for i64 {
    fn from(value: Role) -> Self {
        value.id()
    }
}

/// Identity of the signed in user. Only the username is guaranteed, the remaining fields are
/// filled when the auth service user lookup succeeds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "role_id", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    /// Minimal user known only by name
    pub fn named<S: Into<String>>(username: S) -> Self {
        Self {
            id: None,
            person_id: None,
            username: username.into(),
            firstname: None,
            lastname: None,
            email: None,
            role: None,
        }
    }

    /// First name when known, otherwise the username
    pub fn display_name(&self) -> &str {
        match self.firstname.as_deref() {
            Some(firstname) if !firstname.trim().is_empty() => firstname,
            _ => &self.username,
        }
    }
}

/// Authentication token paired with the user it belongs to. The two only ever exist together.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Body of a login response. The edge service answers with `token`, the auth service with
/// `access_token` plus the user id and name.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct LoginResponse {
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body of the token verification endpoint
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
}

#[cfg(test)]
mod test {
    use common::validation::Validate;
    use rstest::rstest;

    use super::{Credentials, LoginResponse, Role, User};

    #[rstest]
    #[case::both("u", "p", true)]
    #[case::blank_username("  ", "p", false)]
    #[case::blank_password("u", "", false)]
    fn credentials_validation(#[case] username: &str, #[case] password: &str, #[case] ok: bool) {
        let credentials = Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        assert_eq!(credentials.validate().is_ok(), ok);
    }

    #[test]
    fn login_response_should_accept_both_token_names() -> Result<(), serde_json::Error> {
        let edge: LoginResponse = serde_json::from_str(r#"{"token": "abc"}"#)?;
        assert_eq!(edge.token.as_deref(), Some("abc"));

        let auth: LoginResponse = serde_json::from_str(
            r#"{"access_token": "jwt", "token_type": "bearer", "user_id": 7, "username": "jane"}"#,
        )?;
        assert_eq!(auth.token.as_deref(), Some("jwt"));
        assert_eq!(auth.user_id, Some(7));
        assert_eq!(auth.username.as_deref(), Some("jane"));
        Ok(())
    }

    #[test]
    fn user_should_read_auth_service_user_info() -> Result<(), serde_json::Error> {
        let user: User = serde_json::from_str(
            r#"{"id": 4, "person_id": 9, "username": "jane", "firstname": "Jane",
                "lastname": "Doe", "email": "jane@example.com", "role_id": 3}"#,
        )?;
        assert_eq!(user.role, Some(Role::Recruiter));
        assert_eq!(user.person_id, Some(9));
        assert_eq!(user.display_name(), "Jane");

        let stored = serde_json::to_string(&user)?;
        assert!(stored.contains(r#""role":3"#));
        Ok(())
    }

    #[test]
    fn display_name_should_fall_back_to_username() {
        assert_eq!(User::named("jdoe").display_name(), "jdoe");
    }

    #[rstest]
    #[case(1, Role::Admin)]
    #[case(2, Role::Applicant)]
    #[case(3, Role::Recruiter)]
    #[case(42, Role::Other(42))]
    fn role_ids(#[case] id: i64, #[case] role: Role) {
        assert_eq!(Role::from(id), role);
        assert_eq!(role.id(), id);
    }
}
