//! Declarative wiring between page elements and portal actions. Pages only carry some of the
//! bound elements, so absent elements are skipped, but an element that exists with the wrong tag
//! or a binding declared twice is an error reported before anything is attached.

use std::collections::HashSet;

use common::error::RpError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Click,
    Blur,
    /// Runs once at startup when the element is present
    Ready,
}

impl EventKind {
    /// DOM event name, [None] for [EventKind::Ready]
    pub const fn dom_event(self) -> Option<&'static str> {
        match self {
            Self::Submit => Some("submit"),
            Self::Click => Some("click"),
            Self::Blur => Some("blur"),
            Self::Ready => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    CheckUsername,
    ApplyToJob,
    SubmitProfile,
    LoadCompetences,
    LoadJobs,
    LoadApplications,
    Logout,
    ToggleTheme,
    PollHealth,
}

impl Action {
    /// Label of the submit control while the request of a form action is in flight
    pub const fn busy_label(self) -> Option<&'static str> {
        match self {
            Self::Login => Some("Logging in..."),
            Self::Register => Some("Creating Account..."),
            Self::ApplyToJob | Self::SubmitProfile => Some("Submitting..."),
            _ => None,
        }
    }

    /// Prefix of the `{prefix}Text` and `{prefix}Spinner` elements inside the submit control
    pub const fn control_prefix(self) -> Option<&'static str> {
        match self {
            Self::Login => Some("login"),
            Self::Register => Some("register"),
            Self::ApplyToJob => Some("apply"),
            Self::SubmitProfile => Some("application"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub element_id: &'static str,
    pub event: EventKind,
    pub action: Action,
    /// Lowercase tag name the element must have
    pub expected_tag: &'static str,
}

impl Binding {
    pub const fn new(
        element_id: &'static str,
        event: EventKind,
        action: Action,
        expected_tag: &'static str,
    ) -> Self {
        Self {
            element_id,
            event,
            action,
            expected_tag,
        }
    }
}

/// Every binding of the portal pages
pub const PORTAL_BINDINGS: &[Binding] = &[
    Binding::new("loginForm", EventKind::Submit, Action::Login, "form"),
    Binding::new("registrationForm", EventKind::Submit, Action::Register, "form"),
    Binding::new("username", EventKind::Blur, Action::CheckUsername, "input"),
    Binding::new("jobApplyForm", EventKind::Submit, Action::ApplyToJob, "form"),
    Binding::new("applicationForm", EventKind::Submit, Action::SubmitProfile, "form"),
    Binding::new("applicationForm", EventKind::Ready, Action::LoadCompetences, "form"),
    Binding::new("logoutButton", EventKind::Click, Action::Logout, "button"),
    Binding::new("themeToggle", EventKind::Click, Action::ToggleTheme, "button"),
    Binding::new("jobList", EventKind::Ready, Action::LoadJobs, "div"),
    Binding::new("myApplications", EventKind::Ready, Action::LoadApplications, "div"),
    Binding::new("serviceStatus", EventKind::Ready, Action::PollHealth, "div"),
];

/// Read access to the elements of the current document
pub trait ElementLookup {
    /// Tag name of the element with `element_id`, [None] if the page has no such element
    fn tag_of(&self, element_id: &str) -> Option<String>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Element `{element_id}` is a <{found}> but is bound as a <{expected}>")]
    TagMismatch {
        element_id: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("Element `{element_id}` is bound more than once to {event:?}")]
    Duplicate {
        element_id: &'static str,
        event: EventKind,
    },
}

impl From<BindingError> for RpError {
    fn from(value: BindingError) -> Self {
        Self::Binding(value.to_string())
    }
}

pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new(bindings: &[Binding]) -> Self {
        Self {
            bindings: bindings.to_vec(),
        }
    }

    pub fn portal() -> Self {
        Self::new(PORTAL_BINDINGS)
    }

    /// Validate the table against the document seen through `lookup` and return the bindings
    /// whose elements are present, in table order
    /// # Errors
    /// This function will return an error for the first duplicate binding or the first present
    /// element whose tag does not match its binding
    pub fn resolve(&self, lookup: &dyn ElementLookup) -> Result<Vec<Binding>, BindingError> {
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if !seen.insert((binding.element_id, binding.event)) {
                return Err(BindingError::Duplicate {
                    element_id: binding.element_id,
                    event: binding.event,
                });
            }
        }

        let mut present = Vec::new();
        for binding in &self.bindings {
            let Some(tag) = lookup.tag_of(binding.element_id) else {
                log::debug!("`{}` not on this page, skipping", binding.element_id);
                continue;
            };
            if !tag.eq_ignore_ascii_case(binding.expected_tag) {
                return Err(BindingError::TagMismatch {
                    element_id: binding.element_id,
                    expected: binding.expected_tag,
                    found: tag.to_ascii_lowercase(),
                });
            }
            present.push(*binding);
        }
        Ok(present)
    }
}
