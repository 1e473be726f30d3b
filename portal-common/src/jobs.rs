use common::{
    error::{RpResult, ValidationError},
    validation::{self, Validate},
};
use serde::{Deserialize, Serialize};

/// Active job posting as listed by the jobs endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Job {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Job {
    /// Human readable salary range, if the posting declares one
    pub fn salary_range(&self) -> Option<String> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some(format!("{min:.0} - {max:.0}")),
            (Some(min), None) => Some(format!("from {min:.0}")),
            (None, Some(max)) => Some(format!("up to {max:.0}")),
            (None, None) => None,
        }
    }
}

/// Envelope of the jobs endpoint
#[derive(Deserialize, Debug, Clone, Default)]
pub struct JobList {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Raw values of the apply-to-job form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobApplyForm {
    pub job_id: String,
    pub cover_letter: String,
}

impl Validate for JobApplyForm {
    fn validate(&self) -> Result<(), ValidationError> {
        self.parse_job_id()?;
        validation::required("coverLetter", "Cover letter", &self.cover_letter)?;
        Ok(())
    }
}

impl JobApplyForm {
    /// Validate the form and convert it into a [JobApplication]
    /// # Errors
    /// This function will return an error if the form does not pass validation
    pub fn into_application(self) -> RpResult<JobApplication> {
        self.validate_form()?;
        Ok(JobApplication {
            job_id: self.parse_job_id()?,
            cover_letter: self.cover_letter.trim().to_owned(),
        })
    }

    fn parse_job_id(&self) -> Result<i64, ValidationError> {
        self.job_id
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ValidationError::new("jobId", "Please select a job to apply for."))
    }
}

/// Validated job application, sent as multipart form data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobApplication {
    pub job_id: i64,
    pub cover_letter: String,
}

impl JobApplication {
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![("cover_letter".to_owned(), self.cover_letter.clone())]
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{Job, JobApplyForm, JobList};

    #[test]
    fn job_list_should_tolerate_sparse_postings() -> Result<(), serde_json::Error> {
        let list: JobList = serde_json::from_str(
            r#"{"jobs": [{"id": 1, "title": "Backend Developer", "location": "Remote",
                          "salary_min": 50000, "salary_max": 70000},
                         {"id": 2, "title": "Designer"}]}"#,
        )?;
        assert_eq!(list.jobs.len(), 2);
        assert_eq!(list.jobs[0].salary_range().as_deref(), Some("50000 - 70000"));
        assert_eq!(list.jobs[1].salary_range(), None);
        Ok(())
    }

    #[rstest]
    #[case::valid("3", "I would like to join.", true)]
    #[case::zero_id("0", "I would like to join.", false)]
    #[case::text_id("abc", "I would like to join.", false)]
    #[case::blank_letter("3", "   ", false)]
    fn apply_form_validation(#[case] job_id: &str, #[case] letter: &str, #[case] ok: bool) {
        let form = JobApplyForm {
            job_id: job_id.to_owned(),
            cover_letter: letter.to_owned(),
        };
        assert_eq!(form.into_application().is_ok(), ok);
    }

    #[test]
    fn salary_range_with_single_bound() {
        let job = Job {
            id: 1,
            title: "Intern".to_owned(),
            description: None,
            company: None,
            location: None,
            salary_min: Some(1000.0),
            salary_max: None,
            employment_type: None,
            experience_level: None,
            category: None,
        };
        assert_eq!(job.salary_range().as_deref(), Some("from 1000"));
    }
}
