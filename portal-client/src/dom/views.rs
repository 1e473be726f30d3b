use common::error::RpResult;
use recruit_portal_common::{ApplicationSummary, Competence, Job, ServiceStatus, User};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Element};

use super::{js_error, set_hidden};
use crate::{
    controller::{ListingView, NavView},
    health::StatusView,
    notify::{Alert, AlertView, DEFAULT_CONTAINER},
    theme::{Theme, ThemeTarget},
};

/// Page specific containers tried, in order, before the default container
const PAGE_CONTAINERS: [&str; 2] = ["loginMessage", "registrationMessage"];

/// Create an element with the given `tag`, `class` and text
fn create(document: &Document, tag: &str, class: &str, text: Option<&str>) -> RpResult<Element> {
    let element = document.create_element(tag).map_err(js_error)?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    if text.is_some() {
        element.set_text_content(text);
    }
    Ok(element)
}

/// Remove every child of `element`
fn clear(element: &Element) {
    element.set_text_content(None);
}

fn log_render_error(result: RpResult<()>, what: &str) {
    if let Err(error) = result {
        log::error!("Could not render {what}. {error}");
    }
}

/// Bootstrap alerts rendered as text into a message container
pub struct DomAlertView {
    document: Document,
}

impl DomAlertView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Existing container for `container`. The default container also resolves to the login
    /// and registration message areas.
    fn find_container(&self, container: &str) -> Option<Element> {
        if container == DEFAULT_CONTAINER {
            let page_container = PAGE_CONTAINERS
                .iter()
                .find_map(|id| self.document.get_element_by_id(id));
            if page_container.is_some() {
                return page_container;
            }
        }
        self.document.get_element_by_id(container)
    }

    /// Find the container or create it after the first form, or at the top of the page
    fn container(&self, container: &str) -> RpResult<Element> {
        if let Some(element) = self.find_container(container) {
            return Ok(element);
        }
        let element = create(&self.document, "div", "mt-3", None)?;
        element.set_id(container);
        let form = self.document.query_selector("form").ok().flatten();
        if let Some((form, parent)) = form.and_then(|form| form.parent_node().map(|p| (form, p))) {
            parent
                .insert_before(&element, form.next_sibling().as_ref())
                .map_err(js_error)?;
            return Ok(element);
        }
        let host = self
            .document
            .query_selector(".container")
            .ok()
            .flatten()
            .or_else(|| self.document.body().map(Into::into));
        if let Some(host) = host {
            host.insert_before(&element, host.first_child().as_ref())
                .map_err(js_error)?;
        }
        Ok(element)
    }

    fn render(&self, container: &str, alert: &Alert, dismiss: Box<dyn Fn()>) -> RpResult<()> {
        let container = self.container(container)?;
        let element = create(
            &self.document,
            "div",
            &format!(
                "alert alert-{} alert-dismissible fade show",
                alert.severity.css_class()
            ),
            Some(&alert.message),
        )?;
        element.set_attribute("role", "alert").map_err(js_error)?;
        element
            .set_attribute("data-alert-id", &alert.id.to_string())
            .map_err(js_error)?;

        let close = create(&self.document, "button", "btn-close", None)?;
        close.set_attribute("type", "button").map_err(js_error)?;
        close.set_attribute("aria-label", "Close").map_err(js_error)?;
        let on_close = Closure::once_into_js(move || dismiss());
        close
            .add_event_listener_with_callback("click", on_close.unchecked_ref())
            .map_err(js_error)?;
        element.append_child(&close).map_err(js_error)?;

        clear(&container);
        container.append_child(&element).map_err(js_error)?;
        Ok(())
    }
}

impl AlertView for DomAlertView {
    fn show(&self, container: &str, alert: &Alert, dismiss: Box<dyn Fn()>) {
        log_render_error(self.render(container, alert, dismiss), "alert");
    }

    fn remove(&self, container: &str, alert_id: u64) {
        let Some(container) = self.find_container(container) else {
            return;
        };
        let selector = format!("[data-alert-id=\"{alert_id}\"]");
        if let Ok(Some(alert)) = container.query_selector(&selector) {
            alert.remove();
        }
    }
}

/// Navigation bar toggling `data-auth="signed-in"` and `data-auth="signed-out"` items and
/// showing the user name in `navUsername`
pub struct DomNavView {
    document: Document,
}

impl DomNavView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn set_visible(&self, selector: &str, visible: bool) {
        let Ok(items) = self.document.query_selector_all(selector) else {
            return;
        };
        for index in 0..items.length() {
            let Some(item) = items
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            set_hidden(&item, !visible);
        }
    }
}

impl NavView for DomNavView {
    fn render(&self, user: Option<&User>) {
        self.set_visible("[data-auth=signed-in]", user.is_some());
        self.set_visible("[data-auth=signed-out]", user.is_none());
        if let Some(name) = self.document.get_element_by_id("navUsername") {
            name.set_text_content(user.map(User::display_name));
        }
    }
}

/// Status badges rendered into `serviceStatus`
pub struct DomStatusView {
    document: Document,
}

impl DomStatusView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn render_statuses(&self, statuses: &[ServiceStatus]) -> RpResult<()> {
        let Some(container) = self.document.get_element_by_id("serviceStatus") else {
            return Ok(());
        };
        clear(&container);
        for status in statuses {
            let row = create(
                &self.document,
                "div",
                "d-flex justify-content-between align-items-center mb-2",
                None,
            )?;
            row.append_child(&create(&self.document, "span", "", Some(&status.name))?)
                .map_err(js_error)?;
            let badge_class = if status.healthy {
                "badge bg-success"
            } else {
                "badge bg-danger"
            };
            row.append_child(&create(
                &self.document,
                "span",
                badge_class,
                Some(status.label()),
            )?)
            .map_err(js_error)?;
            container.append_child(&row).map_err(js_error)?;
        }
        Ok(())
    }
}

impl StatusView for DomStatusView {
    fn render(&self, statuses: &[ServiceStatus]) {
        log_render_error(self.render_statuses(statuses), "service status");
    }
}

/// Job cards in `jobList`, competence options in the profile form and the user's applications
/// in `myApplications`
pub struct DomListingView {
    document: Document,
}

impl DomListingView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn job_card(&self, job: &Job) -> RpResult<Element> {
        let card = create(&self.document, "div", "card mb-3", None)?;
        let body = create(&self.document, "div", "card-body", None)?;
        body.append_child(&create(&self.document, "h5", "card-title", Some(&job.title))?)
            .map_err(js_error)?;
        let subtitle = [job.company.as_deref(), job.location.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" - ");
        if !subtitle.is_empty() {
            body.append_child(&create(
                &self.document,
                "h6",
                "card-subtitle mb-2 text-muted",
                Some(&subtitle),
            )?)
            .map_err(js_error)?;
        }
        if let Some(description) = &job.description {
            body.append_child(&create(&self.document, "p", "card-text", Some(description))?)
                .map_err(js_error)?;
        }
        if let Some(salary) = job.salary_range() {
            body.append_child(&create(&self.document, "small", "text-muted", Some(&salary))?)
                .map_err(js_error)?;
        }
        card.set_attribute("data-job-id", &job.id.to_string())
            .map_err(js_error)?;
        card.append_child(&body).map_err(js_error)?;
        Ok(card)
    }

    fn render_job_list(&self, jobs: &[Job]) -> RpResult<()> {
        let Some(container) = self.document.get_element_by_id("jobList") else {
            return Ok(());
        };
        clear(&container);
        if jobs.is_empty() {
            container
                .append_child(&create(
                    &self.document,
                    "p",
                    "text-muted",
                    Some("No open positions right now."),
                )?)
                .map_err(js_error)?;
        }
        for job in jobs {
            container
                .append_child(&self.job_card(job)?)
                .map_err(js_error)?;
        }
        Ok(())
    }

    fn render_competence_options(&self, competences: &[Competence]) -> RpResult<()> {
        let Some(form) = self.document.get_element_by_id("applicationForm") else {
            return Ok(());
        };
        let selects = form
            .query_selector_all("select[name=competence_id]")
            .map_err(js_error)?;
        for index in 0..selects.length() {
            let Some(select) = selects
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            clear(&select);
            let placeholder =
                create(&self.document, "option", "", Some("Select a competence"))?;
            placeholder.set_attribute("value", "").map_err(js_error)?;
            select.append_child(&placeholder).map_err(js_error)?;
            for competence in competences {
                let option = create(&self.document, "option", "", Some(&competence.name))?;
                option
                    .set_attribute("value", &competence.id.to_string())
                    .map_err(js_error)?;
                select.append_child(&option).map_err(js_error)?;
            }
        }
        Ok(())
    }

    fn render_application_list(&self, applications: &[ApplicationSummary]) -> RpResult<()> {
        let Some(container) = self.document.get_element_by_id("myApplications") else {
            return Ok(());
        };
        clear(&container);
        let list = create(&self.document, "ul", "list-group", None)?;
        for application in applications {
            let title = application
                .job_title
                .clone()
                .unwrap_or_else(|| format!("Application #{}", application.id));
            let item = create(
                &self.document,
                "li",
                "list-group-item d-flex justify-content-between",
                Some(&title),
            )?;
            if let Some(status) = &application.status_name {
                item.append_child(&create(
                    &self.document,
                    "span",
                    "badge bg-secondary",
                    Some(status),
                )?)
                .map_err(js_error)?;
            }
            list.append_child(&item).map_err(js_error)?;
        }
        container.append_child(&list).map_err(js_error)?;
        Ok(())
    }
}

impl ListingView for DomListingView {
    fn render_jobs(&self, jobs: &[Job]) {
        log_render_error(self.render_job_list(jobs), "job postings");
    }

    fn render_competences(&self, competences: &[Competence]) {
        log_render_error(self.render_competence_options(competences), "competences");
    }

    fn render_applications(&self, applications: &[ApplicationSummary]) {
        log_render_error(self.render_application_list(applications), "applications");
    }
}

/// Applies the theme to the document root through Bootstrap's `data-bs-theme`
pub struct DomThemeTarget {
    document: Document,
}

impl DomThemeTarget {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ThemeTarget for DomThemeTarget {
    fn apply(&self, theme: Theme) {
        let Some(root) = self.document.document_element() else {
            return;
        };
        if let Err(error) = root.set_attribute("data-bs-theme", theme.as_str()) {
            log::error!("Could not apply theme. {error:?}");
        }
    }
}
