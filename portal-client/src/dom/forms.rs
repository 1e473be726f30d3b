use std::cell::RefCell;

use recruit_portal_common::{
    CompetenceEntry, CompetenceProfileForm, Credentials, JobApplyForm, RegistrationForm,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement};

use super::{set_hidden, value_in, value_of};
use crate::{bindings::Action, form::SubmitControl};

pub fn read_credentials(document: &Document) -> Credentials {
    Credentials {
        username: value_of(document, "loginUsername"),
        password: value_of(document, "loginPassword"),
    }
}

pub fn read_registration(document: &Document) -> RegistrationForm {
    RegistrationForm {
        firstname: value_of(document, "firstName"),
        lastname: value_of(document, "lastName"),
        email: value_of(document, "email"),
        date_of_birth: value_of(document, "dateOfBirth"),
        username: value_of(document, "username"),
        password: value_of(document, "password"),
        confirm_password: value_of(document, "confirmPassword"),
        role_id: value_of(document, "role"),
    }
}

/// The job id is taken from the form's `data-job-id` attribute, falling back to a `jobId` field
pub fn read_job_apply(form: &Element) -> JobApplyForm {
    let job_id = form
        .get_attribute("data-job-id")
        .unwrap_or_else(|| value_in(form, "[name=jobId]"));
    JobApplyForm {
        job_id,
        cover_letter: value_in(form, "[name=cover_letter]"),
    }
}

/// Each `.competence-row` of the form contributes one competence entry
pub fn read_profile(form: &Element) -> CompetenceProfileForm {
    let mut competences = Vec::new();
    if let Ok(rows) = form.query_selector_all(".competence-row") {
        for index in 0..rows.length() {
            let Some(row) = rows
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            competences.push(CompetenceEntry {
                competence_id: value_in(&row, "[name=competence_id]"),
                years_of_experience: value_in(&row, "[name=years_of_experience]"),
            });
        }
    }
    CompetenceProfileForm {
        from_date: value_in(form, "[name=from_date]"),
        to_date: value_in(form, "[name=to_date]"),
        competences,
    }
}

/// Submit button of a form. The label lives in the `{prefix}Text` element when the page has one,
/// otherwise in the button itself; a `{prefix}Spinner` element is shown while busy.
pub struct ButtonControl {
    button: HtmlButtonElement,
    label: Element,
    spinner: Option<Element>,
    busy_label: &'static str,
    original_label: RefCell<Option<String>>,
}

impl ButtonControl {
    /// Control of the submit button in `form`, if the form has one
    pub fn for_form(document: &Document, form: &Element, action: Action) -> Option<Self> {
        let button = form
            .query_selector("button[type=submit]")
            .ok()
            .flatten()?
            .dyn_into::<HtmlButtonElement>()
            .ok()?;
        let prefix = action.control_prefix();
        let label = prefix
            .and_then(|prefix| document.get_element_by_id(&format!("{prefix}Text")))
            .unwrap_or_else(|| button.clone().into());
        let spinner =
            prefix.and_then(|prefix| document.get_element_by_id(&format!("{prefix}Spinner")));
        Some(Self {
            button,
            label,
            spinner,
            busy_label: action.busy_label().unwrap_or("Submitting..."),
            original_label: RefCell::new(None),
        })
    }
}

impl SubmitControl for ButtonControl {
    fn engage(&self) {
        self.button.set_disabled(true);
        self.original_label
            .replace(self.label.text_content());
        self.label.set_text_content(Some(self.busy_label));
        if let Some(spinner) = &self.spinner {
            set_hidden(spinner, false);
        }
    }

    fn release(&self) {
        self.button.set_disabled(false);
        if let Some(original) = self.original_label.take() {
            self.label.set_text_content(Some(&original));
        }
        if let Some(spinner) = &self.spinner {
            set_hidden(spinner, true);
        }
    }
}
