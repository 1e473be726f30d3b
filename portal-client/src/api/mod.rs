//! HTTP access to the recruitment backend. Requests are described as plain values and handed to a
//! [Transport], keeping the request building and response interpretation independent of the
//! browser fetch API.

#[cfg(target_arch = "wasm32")]
mod fetch;

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;

use std::rc::Rc;

use async_trait::async_trait;
use common::{
    api::{error_message, StatusBody},
    error::{RpError, RpResult},
};
use recruit_portal_common::{
    ApplicationList, ApplicationReceipt, ApplicationRequest, ApplicationSummary, Competence,
    CompetenceList, Credentials, Job, JobApplication, JobList, LoginResponse, RegistrationRequest,
    Session, User, UsernameAvailability, VerifyResponse,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::ClientConfig, session::SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Payload of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// Serialized JSON document
    Json(String),
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(String, String)>),
    /// `multipart/form-data` text fields
    Multipart(Vec<(String, String)>),
}

/// Request to send through a [Transport]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Body,
}

impl HttpRequest {
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            bearer: None,
            body: Body::Empty,
        }
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }

    /// Attach `value` as a JSON body
    /// # Errors
    /// This function will return an error if the `value` cannot be serialized
    pub fn json<T: Serialize>(mut self, value: &T) -> RpResult<Self> {
        self.body = Body::Json(serde_json::to_string(value)?);
        Ok(self)
    }

    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Body::Form(fields);
        self
    }

    #[must_use]
    pub fn multipart(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Body::Multipart(fields);
        self
    }
}

/// Status and raw body of a settled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to the backend. A response with any status is a successful send; only failing
/// to get a response at all is an error.
#[async_trait(?Send)]
pub trait Transport {
    /// Send the `request` and wait for its response
    /// # Errors
    /// This function will return [RpError::Network] if no response could be obtained
    async fn send(&self, request: HttpRequest) -> RpResult<HttpResponse>;
}

/// Error describing a non-2xx `response`. With `authenticated` set, a 401 is reported as
/// [RpError::Unauthorized].
pub fn status_error(response: &HttpResponse, authenticated: bool) -> RpError {
    let message = error_message(&response.body).unwrap_or_default();
    if authenticated && response.status == 401 {
        return RpError::Unauthorized(message);
    }
    RpError::Api {
        status: response.status,
        message,
    }
}

/// Deserialize the body of a successful `response`, or convert a failed one to an error
/// # Errors
/// This function will return an error if the status is not 2xx or the body is not the expected
/// JSON shape
pub fn parse_response<T: DeserializeOwned>(
    response: &HttpResponse,
    authenticated: bool,
) -> RpResult<T> {
    if !response.is_success() {
        return Err(status_error(response, authenticated));
    }
    serde_json::from_str(&response.body).map_err(|error| {
        log::error!("Could not parse response body. {error}");
        RpError::Json(error)
    })
}

/// Characters escaped in a path segment: everything outside the RFC 3986 unreserved set
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent encode a single path segment
fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Endpoints that do not need a session
#[derive(Clone)]
pub struct UnauthorizedApi {
    config: Rc<ClientConfig>,
    transport: Rc<dyn Transport>,
}

impl UnauthorizedApi {
    pub fn new(config: Rc<ClientConfig>, transport: Rc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Sign in with the `credentials`. The user is taken from the response when embedded, looked
    /// up by id when only the id is returned, and otherwise known by name only.
    /// # Errors
    /// This function will return an error if the login is rejected, the response carries no
    /// token or the request fails
    pub async fn login(&self, credentials: &Credentials) -> RpResult<Session> {
        let request =
            HttpRequest::post(self.config.url("/auth/login")).form(credentials.form_fields());
        let response = self.transport.send(request).await?;
        let login: LoginResponse = parse_response(&response, false)?;
        let token = match login.token {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                return Err(RpError::UnexpectedBody(
                    "Login response did not contain a token".to_owned(),
                ))
            }
        };
        let user = match (login.user, login.user_id) {
            (Some(user), _) => user,
            (None, Some(user_id)) => match self.user_info(&token, user_id).await {
                Ok(user) => user,
                Err(error) => {
                    log::warn!("Could not look up user {user_id}, using login name. {error}");
                    User {
                        id: Some(user_id),
                        ..User::named(login_name(login.username, credentials))
                    }
                }
            },
            (None, None) => User::named(login_name(login.username, credentials)),
        };
        Ok(Session { token, user })
    }

    /// Fetch the user with `user_id` using a freshly issued `token`
    /// # Errors
    /// This function will return an error if the lookup fails
    pub async fn user_info(&self, token: &str, user_id: i64) -> RpResult<User> {
        let request =
            HttpRequest::get(self.config.url(&format!("/auth/user/{user_id}"))).bearer(token);
        let response = self.transport.send(request).await?;
        parse_response(&response, false)
    }

    /// Create a new account. Returns the confirmation message of the service, if any.
    /// # Errors
    /// This function will return an error if the service rejects the registration or the
    /// request fails
    pub async fn register(&self, request: &RegistrationRequest) -> RpResult<Option<String>> {
        let http_request =
            HttpRequest::post(self.config.url("/registration/register")).form(request.form_fields());
        let response = self.transport.send(http_request).await?;
        if !response.is_success() {
            return Err(status_error(&response, false));
        }
        let status = StatusBody::parse(&response.body);
        if !status.is_success() {
            return Err(RpError::Api {
                status: response.status,
                message: error_message(&response.body).unwrap_or_default(),
            });
        }
        Ok(status.message)
    }

    /// True if no account uses the `username` yet
    /// # Errors
    /// This function will return an error if the check fails
    pub async fn username_available(&self, username: &str) -> RpResult<bool> {
        let url = self.config.url(&format!(
            "/registration/username/{}",
            encode_segment(username.trim())
        ));
        let response = self.transport.send(HttpRequest::get(url)).await?;
        let availability: UsernameAvailability = parse_response(&response, false)?;
        Ok(availability.available)
    }

    /// Active job postings
    /// # Errors
    /// This function will return an error if the request fails
    pub async fn jobs(&self) -> RpResult<Vec<Job>> {
        let response = self
            .transport
            .send(HttpRequest::get(self.config.url("/jobs")))
            .await?;
        let list: JobList = parse_response(&response, false)?;
        Ok(list.jobs)
    }

    /// Competences an applicant can choose from
    /// # Errors
    /// This function will return an error if the request fails
    pub async fn competences(&self) -> RpResult<Vec<Competence>> {
        let response = self
            .transport
            .send(HttpRequest::get(
                self.config.url("/jobapplications/competences"),
            ))
            .await?;
        let list: CompetenceList = parse_response(&response, false)?;
        Ok(list.competences)
    }
}

/// Username to remember after login when the response does not name the user
fn login_name(response_username: Option<String>, credentials: &Credentials) -> String {
    response_username
        .filter(|username| !username.trim().is_empty())
        .unwrap_or_else(|| credentials.username.trim().to_owned())
}

/// Endpoints that require the token of the current session. A 401 from any of them ends the
/// session.
#[derive(Clone)]
pub struct AuthorizedApi {
    config: Rc<ClientConfig>,
    transport: Rc<dyn Transport>,
    session: Rc<SessionStore>,
}

impl AuthorizedApi {
    pub fn new(
        config: Rc<ClientConfig>,
        transport: Rc<dyn Transport>,
        session: Rc<SessionStore>,
    ) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    /// Ask the auth service if the current token is still accepted
    /// # Errors
    /// This function will return an error if there is no session or the request fails
    pub async fn verify(&self) -> RpResult<bool> {
        let response = self
            .send(HttpRequest::get(self.config.url("/auth/verify")))
            .await?;
        let verify: VerifyResponse = parse_response(&response, true)?;
        Ok(verify.valid)
    }

    /// Apply to a job posting with a cover letter
    /// # Errors
    /// This function will return an error if there is no session or the application is rejected
    pub async fn apply_to_job(&self, application: &JobApplication) -> RpResult<()> {
        let url = self
            .config
            .url(&format!("/jobs/{}/apply", application.job_id));
        let response = self
            .send(HttpRequest::post(url).multipart(application.form_fields()))
            .await?;
        if !response.is_success() {
            return Err(status_error(&response, true));
        }
        Ok(())
    }

    /// Submit a competence profile. The created application is returned when the service
    /// echoes it back.
    /// # Errors
    /// This function will return an error if there is no session or the application is rejected
    pub async fn submit_application(
        &self,
        application: &ApplicationRequest,
    ) -> RpResult<Option<ApplicationReceipt>> {
        let request =
            HttpRequest::post(self.config.url("/jobapplications/applications")).json(application)?;
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(status_error(&response, true));
        }
        Ok(serde_json::from_str(&response.body).ok())
    }

    /// Application history of the applicant with `person_id`
    /// # Errors
    /// This function will return an error if there is no session or the request fails
    pub async fn applications(&self, person_id: i64) -> RpResult<Vec<ApplicationSummary>> {
        let url = self
            .config
            .url(&format!("/jobapplications/applications/user/{person_id}"));
        let response = self.send(HttpRequest::get(url)).await?;
        let list: ApplicationList = parse_response(&response, true)?;
        Ok(list.applications)
    }

    /// Send the `request` with the session token. A 401 response clears the session.
    async fn send(&self, request: HttpRequest) -> RpResult<HttpResponse> {
        let Some(token) = self.session.token() else {
            return Err(RpError::MissingSession);
        };
        let response = self.transport.send(request.bearer(&token)).await?;
        if response.status == 401 {
            log::warn!("Backend rejected the session token");
            self.session.clear();
            return Err(status_error(&response, true));
        }
        Ok(response)
    }
}
