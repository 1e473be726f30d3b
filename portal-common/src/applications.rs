use chrono::NaiveDate;
use common::{
    error::{RpResult, ValidationError},
    validation::{self, Validate},
};
use serde::{Deserialize, Serialize};

/// Competence an applicant can declare experience in
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Competence {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Envelope of the competences endpoint
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CompetenceList {
    #[serde(default)]
    pub competences: Vec<Competence>,
}

/// One competence row of the profile form, as read from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetenceEntry {
    pub competence_id: String,
    pub years_of_experience: String,
}

/// Raw values of the competence profile form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetenceProfileForm {
    pub from_date: String,
    pub to_date: String,
    pub competences: Vec<CompetenceEntry>,
}

/// Period the applicant is available for work
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Years of experience within a single competence
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CompetenceExperience {
    pub competence_id: i64,
    pub years_of_experience: f64,
}

/// Application payload sent to the job application service
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ApplicationRequest {
    pub person_id: i64,
    pub availability: Availability,
    pub competences: Vec<CompetenceExperience>,
}

impl Validate for CompetenceProfileForm {
    fn validate(&self) -> Result<(), ValidationError> {
        self.parse_availability()?;
        self.parse_competences()?;
        Ok(())
    }
}

impl CompetenceProfileForm {
    /// Validate the form and convert it into an [ApplicationRequest] for the person with
    /// `person_id`
    /// # Errors
    /// This function will return an error if the form does not pass validation
    pub fn into_request(self, person_id: i64) -> RpResult<ApplicationRequest> {
        self.validate_form()?;
        Ok(ApplicationRequest {
            person_id,
            availability: self.parse_availability()?,
            competences: self.parse_competences()?,
        })
    }

    fn parse_availability(&self) -> Result<Availability, ValidationError> {
        let from_date = validation::iso_date("fromDate", "Available from", &self.from_date)?;
        let to_date = validation::iso_date("toDate", "Available to", &self.to_date)?;
        if from_date > to_date {
            return Err(ValidationError::new(
                "toDate",
                "Availability must end on or after its start date.",
            ));
        }
        Ok(Availability { from_date, to_date })
    }

    fn parse_competences(&self) -> Result<Vec<CompetenceExperience>, ValidationError> {
        if self.competences.is_empty() {
            return Err(ValidationError::new(
                "competences",
                "Please add at least one competence.",
            ));
        }
        self.competences
            .iter()
            .map(|entry| -> Result<CompetenceExperience, ValidationError> {
                let competence_id = entry
                    .competence_id
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| {
                        ValidationError::new("competences", "Please select a competence.")
                    })?;
                let years_of_experience = entry
                    .years_of_experience
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|years| years.is_finite() && *years >= 0.0)
                    .ok_or_else(|| {
                        ValidationError::new(
                            "competences",
                            "Years of experience must be a non-negative number.",
                        )
                    })?;
                Ok(CompetenceExperience {
                    competence_id,
                    years_of_experience,
                })
            })
            .collect()
    }
}

/// Application as returned after creation
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApplicationReceipt {
    pub id: i64,
    pub person_id: i64,
    #[serde(default)]
    pub job_posting_id: Option<i64>,
    pub status_id: i64,
    #[serde(default)]
    pub applied_date: Option<String>,
}

/// Row of the signed in user's application history
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApplicationSummary {
    pub id: i64,
    #[serde(default)]
    pub job_posting_id: Option<i64>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default)]
    pub applied_date: Option<String>,
}

/// Envelope of the user applications endpoint
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApplicationList {
    #[serde(default)]
    pub applications: Vec<ApplicationSummary>,
}
