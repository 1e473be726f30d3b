use chrono::NaiveDate;
use common::{
    error::{RpResult, ValidationError},
    validation::{self, Validate, MIN_PASSWORD_LENGTH},
};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Raw values of the registration form, as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub date_of_birth: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role_id: String,
}

impl Validate for RegistrationForm {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("firstName", "First name", &self.firstname)?;
        validation::required("lastName", "Last name", &self.lastname)?;
        validation::required("email", "Email", &self.email)?;
        validation::required("username", "Username", &self.username)?;
        validation::required("password", "Password", &self.password)?;
        validation::passwords_match(&self.password, &self.confirm_password)?;
        validation::min_length("password", "Password", &self.password, MIN_PASSWORD_LENGTH)?;
        validation::password_strength(&self.password)?;
        validation::email(&self.email)?;
        self.parse_date_of_birth()?;
        self.parse_role()?;
        Ok(())
    }
}

impl RegistrationForm {
    /// Validate the form and convert it into the request sent to the registration service
    /// # Errors
    /// This function will return an error if the form does not pass validation
    pub fn into_request(self) -> RpResult<RegistrationRequest> {
        self.validate_form()?;
        let date_of_birth = self.parse_date_of_birth()?;
        let role = self.parse_role()?;
        Ok(RegistrationRequest {
            firstname: self.firstname.trim().to_owned(),
            lastname: self.lastname.trim().to_owned(),
            email: self.email.trim().to_owned(),
            date_of_birth,
            username: self.username.trim().to_owned(),
            password: self.password,
            role_id: role.id(),
        })
    }

    /// Date of birth is optional, an empty field means no date
    fn parse_date_of_birth(&self) -> Result<Option<NaiveDate>, ValidationError> {
        if self.date_of_birth.trim().is_empty() {
            return Ok(None);
        }
        validation::iso_date("dateOfBirth", "Date of birth", &self.date_of_birth).map(Some)
    }

    /// Role select value, defaulting to applicant when nothing is selected. Only roles known to
    /// the portal can be registered.
    fn parse_role(&self) -> Result<Role, ValidationError> {
        let raw = self.role_id.trim();
        if raw.is_empty() {
            return Ok(Role::Applicant);
        }
        raw.parse::<i64>()
            .ok()
            .map(Role::from)
            .filter(|role| !matches!(role, Role::Other(_)))
            .ok_or_else(|| ValidationError::new("role", "Please select a valid role."))
    }
}

/// Registration payload as expected by the registration service
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub username: String,
    pub password: String,
    pub role_id: i64,
}

impl RegistrationRequest {
    /// Form fields in submission order. An absent date of birth is sent as an empty value.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let date_of_birth = self
            .date_of_birth
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        vec![
            ("firstname".to_owned(), self.firstname.clone()),
            ("lastname".to_owned(), self.lastname.clone()),
            ("email".to_owned(), self.email.clone()),
            ("date_of_birth".to_owned(), date_of_birth),
            ("username".to_owned(), self.username.clone()),
            ("password".to_owned(), self.password.clone()),
            ("role_id".to_owned(), self.role_id.to_string()),
        ]
    }
}

/// Response of the username availability check
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
}

#[cfg(test)]
mod test {
    use common::validation::Validate;
    use rstest::rstest;

    use super::RegistrationForm;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            firstname: "Jane".to_owned(),
            lastname: "Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            date_of_birth: "1990-04-21".to_owned(),
            username: "jdoe".to_owned(),
            password: "Secret123".to_owned(),
            confirm_password: "Secret123".to_owned(),
            role_id: "2".to_owned(),
        }
    }

    #[test]
    fn valid_form_should_convert_to_request() -> common::error::RpResult<()> {
        let request = valid_form().into_request()?;
        let fields = request.form_fields();
        assert!(fields.contains(&("date_of_birth".to_owned(), "1990-04-21".to_owned())));
        assert!(fields.contains(&("role_id".to_owned(), "2".to_owned())));
        assert_eq!(request.username, "jdoe");
        Ok(())
    }

    #[rstest]
    #[case::mismatch(RegistrationForm { password: "a".to_owned(), confirm_password: "b".to_owned(), ..valid_form() }, "Passwords do not match.")]
    #[case::short(RegistrationForm { password: "Ab1".to_owned(), confirm_password: "Ab1".to_owned(), ..valid_form() }, "Password must be at least 8 characters long.")]
    #[case::weak(RegistrationForm { password: "secret123".to_owned(), confirm_password: "secret123".to_owned(), ..valid_form() }, "Password must contain at least an uppercase letter.")]
    #[case::email(RegistrationForm { email: "jane".to_owned(), ..valid_form() }, "Please enter a valid email address.")]
    #[case::missing(RegistrationForm { lastname: " ".to_owned(), ..valid_form() }, "Last name is required.")]
    #[case::date(RegistrationForm { date_of_birth: "21.04.1990".to_owned(), ..valid_form() }, "Date of birth must be a date in YYYY-MM-DD format.")]
    #[case::role(RegistrationForm { role_id: "admin".to_owned(), ..valid_form() }, "Please select a valid role.")]
    #[case::unknown_role(RegistrationForm { role_id: "42".to_owned(), ..valid_form() }, "Please select a valid role.")]
    #[case::negative_role(RegistrationForm { role_id: "-1".to_owned(), ..valid_form() }, "Please select a valid role.")]
    fn invalid_form_should_report(#[case] form: RegistrationForm, #[case] message: &str) {
        let error = form.validate().expect_err("form must be rejected");
        assert_eq!(error.message(), message);
    }

    #[test]
    fn blank_optional_fields_should_use_defaults() -> common::error::RpResult<()> {
        let form = RegistrationForm {
            date_of_birth: String::new(),
            role_id: String::new(),
            ..valid_form()
        };
        let request = form.into_request()?;
        assert_eq!(request.date_of_birth, None);
        assert_eq!(request.role_id, 2);
        Ok(())
    }
}
