//! The portal controller owns the session and every service the page actions need. Browser
//! facilities reach it through [Ports], so each action runs the same way in the browser and in
//! tests.

use std::{cell::RefCell, future::Future, rc::Rc};

use common::error::{RpError, LOGIN_REQUIRED_MESSAGE};
use recruit_portal_common::{
    ApplicationSummary, Competence, CompetenceProfileForm, Credentials, Job, JobApplyForm,
    RegistrationForm, User,
};

use crate::{
    api::{AuthorizedApi, Transport, UnauthorizedApi},
    config::ClientConfig,
    form::{self, SubmitControl, SubmitOutcome},
    health::{HealthPoller, PollHandle, StatusView, Ticker},
    notify::{AlertView, Notifier, Scheduler, Severity},
    session::SessionStore,
    storage::KeyValueStore,
    theme::{Theme, ThemeSwitch, ThemeTarget},
};

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful! Redirecting...";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful! You can now login.";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";
pub const APPLICATION_SUCCESS_MESSAGE: &str = "Application submitted successfully!";
pub const APPLICATION_FAILED_MESSAGE: &str = "Application submission failed.";
pub const NO_APPLICANT_PROFILE_MESSAGE: &str =
    "Only applicant accounts can submit a competence profile.";

/// Page navigation
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Navigation bar, rendered for the signed in user or for anonymous visitors
pub trait NavView {
    fn render(&self, user: Option<&User>);
}

/// Lists filled from backend data
pub trait ListingView {
    fn render_jobs(&self, jobs: &[Job]);
    fn render_competences(&self, competences: &[Competence]);
    fn render_applications(&self, applications: &[ApplicationSummary]);
}

/// Browser facilities used by the [PortalController]
#[derive(Clone)]
pub struct Ports {
    pub storage: Rc<dyn KeyValueStore>,
    pub transport: Rc<dyn Transport>,
    pub alerts: Rc<dyn AlertView>,
    pub scheduler: Rc<dyn Scheduler>,
    pub navigator: Rc<dyn Navigator>,
    pub nav: Rc<dyn NavView>,
    pub listings: Rc<dyn ListingView>,
    pub theme: Rc<dyn ThemeTarget>,
    pub status: Rc<dyn StatusView>,
    pub ticker: Rc<dyn Ticker>,
}

pub struct PortalController {
    config: Rc<ClientConfig>,
    session: Rc<SessionStore>,
    public_api: UnauthorizedApi,
    api: AuthorizedApi,
    notifier: Notifier,
    theme: ThemeSwitch,
    ports: Ports,
    poller: RefCell<Option<PollHandle>>,
}

impl PortalController {
    /// Build the controller and load the persisted session. The navigation is rendered for the
    /// loaded session and again after every later change.
    pub fn new(config: ClientConfig, ports: Ports) -> Self {
        let config = Rc::new(config);
        let session = Rc::new(SessionStore::new(
            ports.storage.clone(),
            config.storage.clone(),
        ));
        let nav = ports.nav.clone();
        session.subscribe(move |user| nav.render(user));
        if session.load() {
            log::info!("Restored session from storage");
        }

        let public_api = UnauthorizedApi::new(config.clone(), ports.transport.clone());
        let api = AuthorizedApi::new(config.clone(), ports.transport.clone(), session.clone());
        let notifier = Notifier::new(
            ports.alerts.clone(),
            ports.scheduler.clone(),
            config.alert_dismiss_after(),
        );
        let theme = ThemeSwitch::new(
            ports.storage.clone(),
            config.storage.theme.clone(),
            ports.theme.clone(),
        );
        Self {
            config,
            session,
            public_api,
            api,
            notifier,
            theme,
            ports,
            poller: RefCell::new(None),
        }
    }

    pub const fn session(&self) -> &Rc<SessionStore> {
        &self.session
    }

    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign in and, on success, store the session and redirect to the dashboard
    pub async fn login(
        &self,
        credentials: Credentials,
        control: &dyn SubmitControl,
    ) -> SubmitOutcome {
        let api = &self.public_api;
        let result = form::submit(credentials, control, |credentials| async move {
            api.login(&credentials).await
        })
        .await;
        let session = match result {
            Ok(session) => session,
            Err(RpError::Validation(error)) => {
                return self.invalid(error.message(), Severity::Warning);
            }
            Err(error) => {
                log::error!("Login failed. {error}");
                return self.failed(&error, LOGIN_FAILED_MESSAGE);
            }
        };
        if let Err(error) = self.session.save(&session.token, session.user) {
            log::error!("Could not store session. {error}");
            return self.failed(&error, LOGIN_FAILED_MESSAGE);
        }
        self.redirect_after(
            self.config.dashboard_page.clone(),
            self.config.login_redirect_delay(),
        );
        self.succeeded(LOGIN_SUCCESS_MESSAGE)
    }

    /// Create an account and redirect to the login page
    pub async fn register(
        &self,
        form: RegistrationForm,
        control: &dyn SubmitControl,
    ) -> SubmitOutcome {
        let api = &self.public_api;
        let result = form::submit(form, control, |form| async move {
            let request = form.into_request()?;
            api.register(&request).await
        })
        .await;
        match result {
            Ok(message) => {
                log::info!(
                    "Registration accepted. {}",
                    message.as_deref().unwrap_or_default()
                );
                self.redirect_after(
                    self.config.login_page.clone(),
                    self.config.registration_redirect_delay(),
                );
                self.succeeded(REGISTRATION_SUCCESS_MESSAGE)
            }
            Err(RpError::Validation(error)) => self.invalid(error.message(), Severity::Danger),
            Err(error) => {
                log::error!("Registration failed. {error}");
                self.failed(&error, REGISTRATION_FAILED_MESSAGE)
            }
        }
    }

    /// Warn when the `username` is already taken. Returns the availability when it could be
    /// checked.
    pub async fn check_username(&self, username: &str) -> Option<bool> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }
        match self.public_api.username_available(username).await {
            Ok(true) => Some(true),
            Ok(false) => {
                self.notifier.notify(
                    &format!("Username \"{username}\" is already taken."),
                    Severity::Warning,
                );
                Some(false)
            }
            Err(error) => {
                log::warn!("Could not check username availability. {error}");
                None
            }
        }
    }

    /// Apply to a job posting as the signed in user
    pub async fn apply_to_job(
        &self,
        form: JobApplyForm,
        control: &dyn SubmitControl,
    ) -> SubmitOutcome {
        if !self.session.is_authenticated() {
            return self.login_required();
        }
        let api = &self.api;
        let result = form::submit(form, control, |form| async move {
            let application = form.into_application()?;
            api.apply_to_job(&application).await
        })
        .await;
        match result {
            Ok(()) => self.succeeded(APPLICATION_SUCCESS_MESSAGE),
            Err(RpError::Validation(error)) => self.invalid(error.message(), Severity::Danger),
            Err(error) => self.authorized_failure(&error, APPLICATION_FAILED_MESSAGE),
        }
    }

    /// Submit the availability and competences of the signed in applicant
    pub async fn submit_profile(
        &self,
        form: CompetenceProfileForm,
        control: &dyn SubmitControl,
    ) -> SubmitOutcome {
        let Some(user) = self.session.user() else {
            return self.login_required();
        };
        let Some(person_id) = user.person_id else {
            self.notifier
                .notify(NO_APPLICANT_PROFILE_MESSAGE, Severity::Danger);
            return SubmitOutcome::Failed(NO_APPLICANT_PROFILE_MESSAGE.to_owned());
        };
        let api = &self.api;
        let result = form::submit(form, control, |form| async move {
            let request = form.into_request(person_id)?;
            api.submit_application(&request).await
        })
        .await;
        match result {
            Ok(receipt) => {
                if let Some(receipt) = receipt {
                    log::info!("Created application {}", receipt.id);
                }
                self.succeeded(APPLICATION_SUCCESS_MESSAGE)
            }
            Err(RpError::Validation(error)) => self.invalid(error.message(), Severity::Danger),
            Err(error) => self.authorized_failure(&error, APPLICATION_FAILED_MESSAGE),
        }
    }

    pub async fn load_jobs(&self) {
        match self.public_api.jobs().await {
            Ok(jobs) => {
                log::debug!("Loaded {} job postings", jobs.len());
                self.ports.listings.render_jobs(&jobs);
            }
            Err(error) => {
                log::error!("Could not load job postings. {error}");
                self.notifier.notify(
                    &error.user_message("Could not load job postings."),
                    Severity::Danger,
                );
            }
        }
    }

    pub async fn load_competences(&self) {
        match self.public_api.competences().await {
            Ok(competences) => self.ports.listings.render_competences(&competences),
            Err(error) => {
                log::error!("Could not load competences. {error}");
                self.notifier.notify(
                    &error.user_message("Could not load competences."),
                    Severity::Danger,
                );
            }
        }
    }

    /// Load the application history of the signed in applicant. Applications belong to the
    /// person record, not the login account.
    pub async fn load_applications(&self) {
        let Some(person_id) = self.session.user().and_then(|user| user.person_id) else {
            log::debug!("No signed in applicant profile, skipping application history");
            return;
        };
        match self.api.applications(person_id).await {
            Ok(applications) => self.ports.listings.render_applications(&applications),
            Err(error) => {
                log::error!("Could not load applications. {error}");
                self.authorized_failure(&error, "Could not load your applications.");
            }
        }
    }

    /// Check the restored session with the auth service. A rejected token ends the session
    /// and redirects to the login page; an unreachable service keeps it. Returns true if a
    /// session is still active afterwards.
    pub async fn verify_session(&self) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }
        match self.api.verify().await {
            Ok(true) => true,
            Ok(false) => {
                log::info!("Token no longer valid");
                self.session.clear();
                self.ports.navigator.navigate(&self.config.login_page);
                false
            }
            Err(error) if error.is_unauthorized() => {
                self.ports.navigator.navigate(&self.config.login_page);
                false
            }
            Err(error) => {
                log::warn!("Could not verify session, keeping it. {error}");
                self.session.is_authenticated()
            }
        }
    }

    pub fn logout(&self) {
        self.session.clear();
        self.ports.navigator.navigate(&self.config.login_page);
    }

    pub fn init_theme(&self, prefers_dark: bool) -> Theme {
        self.theme.init(prefers_dark)
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle()
    }

    /// Poller over the configured health endpoints
    pub fn health_poller(&self) -> HealthPoller {
        HealthPoller::new(
            self.ports.transport.clone(),
            self.config.resolved_health_services(),
            self.ports.status.clone(),
            self.ports.ticker.clone(),
            self.config.health_interval(),
        )
    }

    /// Start a new health poll loop and return it for spawning. The controller keeps its handle,
    /// stopping any loop started before.
    pub fn start_health_polling(&self) -> impl Future<Output = ()> {
        let (task, handle) = self.health_poller().start();
        if self.poller.replace(Some(handle)).is_some() {
            log::debug!("Replaced running health poll loop");
        }
        task
    }

    pub fn is_polling(&self) -> bool {
        self.poller.borrow().is_some()
    }

    /// Stop background work owned by the controller
    pub fn teardown(&self) {
        if let Some(handle) = self.poller.take() {
            handle.stop();
        }
    }

    fn invalid(&self, message: &str, severity: Severity) -> SubmitOutcome {
        self.notifier.notify(message, severity);
        SubmitOutcome::Invalid(message.to_owned())
    }

    fn succeeded(&self, message: &str) -> SubmitOutcome {
        self.notifier.notify(message, Severity::Success);
        SubmitOutcome::Succeeded(message.to_owned())
    }

    fn failed(&self, error: &RpError, fallback: &str) -> SubmitOutcome {
        let message = error.user_message(fallback);
        self.notifier.notify(&message, Severity::Danger);
        SubmitOutcome::Failed(message)
    }

    /// Report a failed authenticated call, sending the user to the login page when the session
    /// was rejected
    fn authorized_failure(&self, error: &RpError, fallback: &str) -> SubmitOutcome {
        if error.is_unauthorized() {
            self.redirect_after(
                self.config.login_page.clone(),
                self.config.login_redirect_delay(),
            );
        } else {
            log::error!("{fallback} {error}");
        }
        self.failed(error, fallback)
    }

    fn login_required(&self) -> SubmitOutcome {
        self.notifier.notify(LOGIN_REQUIRED_MESSAGE, Severity::Info);
        self.redirect_after(
            self.config.login_page.clone(),
            self.config.login_redirect_delay(),
        );
        SubmitOutcome::Failed(LOGIN_REQUIRED_MESSAGE.to_owned())
    }

    fn redirect_after(&self, path: String, delay: std::time::Duration) {
        let navigator = self.ports.navigator.clone();
        self.ports
            .scheduler
            .schedule(delay, Box::new(move || navigator.navigate(&path)));
    }
}

impl Drop for PortalController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

    use async_trait::async_trait;
    use common::error::{RpError, RpResult, LOGIN_REQUIRED_MESSAGE, SESSION_EXPIRED_MESSAGE};
    use recruit_portal_common::{
        ApplicationSummary, Competence, CompetenceEntry, CompetenceProfileForm, Credentials, Job,
        JobApplyForm, ServiceStatus, User,
    };
    use rstest::rstest;

    use super::{
        ListingView, NavView, Navigator, PortalController, Ports, APPLICATION_SUCCESS_MESSAGE,
        LOGIN_FAILED_MESSAGE, NO_APPLICANT_PROFILE_MESSAGE,
    };
    use crate::{
        api::{Body, HttpRequest, HttpResponse, Transport},
        config::ClientConfig,
        form::{test::RecordingControl, SubmitOutcome},
        health::{StatusView, Ticker},
        notify::{
            test::{ManualScheduler, RecordingView},
            Severity,
        },
        storage::{KeyValueStore, MemoryStore},
        theme::{Theme, ThemeTarget},
    };

    /// Transport answering by url with fixed responses
    #[derive(Default)]
    struct RoutedTransport {
        routes: RefCell<HashMap<String, HttpResponse>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl RoutedTransport {
        fn route(&self, url: &str, status: u16, body: &str) {
            self.routes
                .borrow_mut()
                .insert(url.to_owned(), HttpResponse::new(status, body));
        }
    }

    #[async_trait(?Send)]
    impl Transport for RoutedTransport {
        async fn send(&self, request: HttpRequest) -> RpResult<HttpResponse> {
            let response = self.routes.borrow().get(&request.url).cloned();
            self.requests.borrow_mut().push(request);
            response.ok_or_else(|| RpError::Network("connection refused".to_owned()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        navigations: RefCell<Vec<String>>,
        nav_users: RefCell<Vec<Option<String>>>,
        jobs: RefCell<Vec<Job>>,
        competences: RefCell<Vec<Competence>>,
        applications: RefCell<Vec<ApplicationSummary>>,
        themes: RefCell<Vec<Theme>>,
    }

    impl Navigator for Recorder {
        fn navigate(&self, path: &str) {
            self.navigations.borrow_mut().push(path.to_owned());
        }
    }

    impl NavView for Recorder {
        fn render(&self, user: Option<&User>) {
            self.nav_users
                .borrow_mut()
                .push(user.map(|user| user.username.clone()));
        }
    }

    impl ListingView for Recorder {
        fn render_jobs(&self, jobs: &[Job]) {
            self.jobs.borrow_mut().extend_from_slice(jobs);
        }

        fn render_competences(&self, competences: &[Competence]) {
            self.competences.borrow_mut().extend_from_slice(competences);
        }

        fn render_applications(&self, applications: &[ApplicationSummary]) {
            self.applications
                .borrow_mut()
                .extend_from_slice(applications);
        }
    }

    impl ThemeTarget for Recorder {
        fn apply(&self, theme: Theme) {
            self.themes.borrow_mut().push(theme);
        }
    }

    impl StatusView for Recorder {
        fn render(&self, _statuses: &[ServiceStatus]) {}
    }

    #[async_trait(?Send)]
    impl Ticker for Recorder {
        async fn sleep(&self, _period: Duration) {
            futures::future::pending::<()>().await;
        }
    }

    struct Harness {
        controller: PortalController,
        storage: Rc<MemoryStore>,
        transport: Rc<RoutedTransport>,
        alerts: Rc<RecordingView>,
        scheduler: Rc<ManualScheduler>,
        recorder: Rc<Recorder>,
    }

    fn harness_with(storage: Rc<MemoryStore>) -> Harness {
        let transport = Rc::new(RoutedTransport::default());
        let alerts = Rc::new(RecordingView::default());
        let scheduler = Rc::new(ManualScheduler::default());
        let recorder = Rc::new(Recorder::default());
        let ports = Ports {
            storage: storage.clone(),
            transport: transport.clone(),
            alerts: alerts.clone(),
            scheduler: scheduler.clone(),
            navigator: recorder.clone(),
            nav: recorder.clone(),
            listings: recorder.clone(),
            theme: recorder.clone(),
            status: recorder.clone(),
            ticker: recorder.clone(),
        };
        Harness {
            controller: PortalController::new(
                ClientConfig {
                    api_base: String::new(),
                    ..ClientConfig::default()
                },
                ports,
            ),
            storage,
            transport,
            alerts,
            scheduler,
            recorder,
        }
    }

    fn harness() -> Harness {
        harness_with(Rc::new(MemoryStore::new()))
    }

    fn signed_in(user: &str) -> Harness {
        let storage = Rc::new(MemoryStore::new());
        storage.set("authToken", "abc").expect("memory store accepts writes");
        storage.set("currentUser", user).expect("memory store accepts writes");
        harness_with(storage)
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn login_should_store_token_and_redirect() -> RpResult<()> {
        let harness = harness();
        harness
            .transport
            .route("/auth/login", 200, r#"{"token": "abc"}"#);
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .login(credentials("u", "p"), &control)
            .await;

        assert!(outcome.is_success());
        assert_eq!(harness.storage.get("authToken")?.as_deref(), Some("abc"));
        assert_eq!(
            harness.recorder.nav_users.borrow().last(),
            Some(&Some("u".to_owned()))
        );
        assert!(harness
            .scheduler
            .delays()
            .contains(&Duration::from_secs(1)));
        harness.scheduler.run_all();
        assert_eq!(*harness.recorder.navigations.borrow(), vec!["/dashboard"]);
        Ok(())
    }

    #[tokio::test]
    async fn login_with_missing_fields_should_warn_without_request() {
        let harness = harness();
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .login(credentials("u", " "), &control)
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Invalid("Please enter both username and password.".to_owned())
        );
        assert_eq!(harness.alerts.last_severity(), Some(Severity::Warning));
        assert!(harness.transport.requests.borrow().is_empty());
        assert!(control.events.borrow().is_empty());
    }

    #[rstest]
    #[case::no_token(200, r#"{"message": "ok"}"#, LOGIN_FAILED_MESSAGE)]
    #[case::unparsable_error(500, "<html>Internal Server Error</html>", LOGIN_FAILED_MESSAGE)]
    #[case::rejected(401, r#"{"detail": "Incorrect username or password"}"#, "Incorrect username or password")]
    #[tokio::test]
    async fn failed_login_should_show_message(
        #[case] status: u16,
        #[case] body: &str,
        #[case] message: &str,
    ) {
        let harness = harness();
        harness.transport.route("/auth/login", status, body);
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .login(credentials("u", "p"), &control)
            .await;

        assert_eq!(outcome, SubmitOutcome::Failed(message.to_owned()));
        assert_eq!(harness.alerts.last_message().as_deref(), Some(message));
        assert!(!harness.controller.session().is_authenticated());
        assert_eq!(*control.events.borrow(), vec!["engage", "release"]);
    }

    #[tokio::test]
    async fn apply_without_session_should_ask_for_login() {
        let harness = harness();
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .apply_to_job(
                JobApplyForm {
                    job_id: "3".to_owned(),
                    cover_letter: "Hello".to_owned(),
                },
                &control,
            )
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(LOGIN_REQUIRED_MESSAGE.to_owned())
        );
        assert_eq!(harness.alerts.last_severity(), Some(Severity::Info));
        harness.scheduler.run_all();
        assert_eq!(*harness.recorder.navigations.borrow(), vec!["/login"]);
    }

    #[tokio::test]
    async fn apply_should_send_multipart_with_token() {
        let harness = signed_in(r#"{"username": "jane"}"#);
        harness.transport.route("/jobs/3/apply", 201, "{}");
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .apply_to_job(
                JobApplyForm {
                    job_id: "3".to_owned(),
                    cover_letter: " Hello ".to_owned(),
                },
                &control,
            )
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Succeeded(APPLICATION_SUCCESS_MESSAGE.to_owned())
        );
        let requests = harness.transport.requests.borrow();
        assert_eq!(requests[0].bearer.as_deref(), Some("abc"));
        assert_eq!(
            requests[0].body,
            Body::Multipart(vec![("cover_letter".to_owned(), "Hello".to_owned())])
        );
    }

    #[tokio::test]
    async fn rejected_token_should_end_session_on_profile_submit() {
        let harness = signed_in(r#"{"username": "jane", "person_id": 9}"#);
        harness.transport.route(
            "/jobapplications/applications",
            401,
            r#"{"detail": "Could not validate credentials"}"#,
        );
        let control = RecordingControl::default();
        let form = CompetenceProfileForm {
            from_date: "2024-06-01".to_owned(),
            to_date: "2024-08-31".to_owned(),
            competences: vec![CompetenceEntry {
                competence_id: "1".to_owned(),
                years_of_experience: "2".to_owned(),
            }],
        };

        let outcome = harness.controller.submit_profile(form, &control).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SESSION_EXPIRED_MESSAGE.to_owned())
        );
        assert!(!harness.controller.session().is_authenticated());
        assert!(harness.storage.is_empty());
        assert_eq!(harness.recorder.nav_users.borrow().last(), Some(&None));
    }

    #[tokio::test]
    async fn profile_submit_requires_person_id() {
        let harness = signed_in(r#"{"username": "recruiter", "role_id": 3}"#);
        let control = RecordingControl::default();

        let outcome = harness
            .controller
            .submit_profile(CompetenceProfileForm::default(), &control)
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(NO_APPLICANT_PROFILE_MESSAGE.to_owned())
        );
        assert!(harness.transport.requests.borrow().is_empty());
    }

    #[rstest]
    #[case::valid(200, r#"{"valid": true}"#, true, &[])]
    #[case::invalid(200, r#"{"valid": false}"#, false, &["/login"])]
    #[case::unauthorized(401, r#"{"detail": "Invalid token"}"#, false, &["/login"])]
    #[case::service_down(502, "", true, &[])]
    #[tokio::test]
    async fn verify_session_outcomes(
        #[case] status: u16,
        #[case] body: &str,
        #[case] active: bool,
        #[case] navigations: &[&str],
    ) {
        let harness = signed_in(r#"{"username": "jane"}"#);
        harness.transport.route("/auth/verify", status, body);

        assert_eq!(harness.controller.verify_session().await, active);
        assert_eq!(harness.controller.session().is_authenticated(), active);
        assert_eq!(*harness.recorder.navigations.borrow(), navigations);
    }

    #[tokio::test]
    async fn check_username_should_warn_when_taken() {
        let harness = harness();
        harness.transport.route(
            "/registration/username/jane",
            200,
            r#"{"username": "jane", "available": false}"#,
        );

        assert_eq!(harness.controller.check_username("jane").await, Some(false));
        assert_eq!(harness.alerts.last_severity(), Some(Severity::Warning));
        assert_eq!(harness.controller.check_username("  ").await, None);
    }

    #[tokio::test]
    async fn listings_should_render_backend_data() {
        let harness = signed_in(r#"{"id": 4, "person_id": 9, "username": "jane"}"#);
        harness.transport.route(
            "/jobs",
            200,
            r#"{"jobs": [{"id": 1, "title": "Backend Developer"}]}"#,
        );
        harness.transport.route(
            "/jobapplications/competences",
            200,
            r#"{"competences": [{"id": 1, "name": "ticket sales"}]}"#,
        );
        harness.transport.route(
            "/jobapplications/applications/user/9",
            200,
            r#"{"applications": [{"id": 11, "job_title": "Backend Developer"}]}"#,
        );

        harness.controller.load_jobs().await;
        harness.controller.load_competences().await;
        harness.controller.load_applications().await;

        assert_eq!(harness.recorder.jobs.borrow().len(), 1);
        assert_eq!(harness.recorder.competences.borrow()[0].name, "ticket sales");
        assert_eq!(harness.recorder.applications.borrow()[0].id, 11);
    }

    #[tokio::test]
    async fn failed_listing_should_notify() {
        let harness = harness();
        harness.controller.load_jobs().await;
        assert_eq!(
            harness.alerts.last_message().as_deref(),
            Some("Network error, please try again.")
        );
    }

    #[test]
    fn logout_should_clear_storage_and_redirect() {
        let harness = signed_in(r#"{"username": "jane"}"#);
        assert!(harness.controller.session().is_authenticated());

        harness.controller.logout();

        assert!(harness.storage.is_empty());
        assert_eq!(harness.recorder.nav_users.borrow().last(), Some(&None));
        assert_eq!(*harness.recorder.navigations.borrow(), vec!["/login"]);
    }

    #[test]
    fn theme_toggle_should_persist() -> RpResult<()> {
        let harness = harness();
        assert_eq!(harness.controller.init_theme(false), Theme::Light);
        assert_eq!(harness.controller.toggle_theme(), Theme::Dark);
        assert_eq!(harness.storage.get("theme")?.as_deref(), Some("dark"));
        Ok(())
    }

    #[test]
    fn teardown_should_stop_health_polling() {
        use futures::FutureExt;

        let harness = harness();
        let task = harness.controller.start_health_polling();
        assert!(harness.controller.is_polling());

        harness.controller.teardown();

        assert!(!harness.controller.is_polling());
        assert!(task.now_or_never().is_some());
    }
}
