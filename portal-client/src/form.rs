//! Submit cycle shared by every portal form: validate locally, lock the submit control, send one
//! request and release the control once it settles.

use std::future::Future;

use common::{error::RpResult, validation::Validate};

/// Submit button of a form
pub trait SubmitControl {
    /// Disable the control and show the busy label
    fn engage(&self);
    /// Enable the control and restore its original label
    fn release(&self);
}

/// Control of forms without a submit button, or whose button could not be found
#[derive(Clone, Copy, Default)]
pub struct NoControl;

impl SubmitControl for NoControl {
    fn engage(&self) {}

    fn release(&self) {}
}

/// Keeps a [SubmitControl] engaged while alive
pub struct ControlGuard<'c> {
    control: &'c dyn SubmitControl,
}

impl<'c> ControlGuard<'c> {
    pub fn engage(control: &'c dyn SubmitControl) -> Self {
        control.engage();
        Self { control }
    }
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        self.control.release();
    }
}

/// How a submission ended, as reported to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed and nothing was sent
    Invalid(String),
    /// The request succeeded, with the notice shown
    Succeeded(String),
    /// The request failed, with the message shown
    Failed(String),
}

impl SubmitOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Invalid(message) | Self::Succeeded(message) | Self::Failed(message) => message,
        }
    }
}

/// Run the `request` with the `control` engaged. The control is released however the request
/// ends, including when the returned future is dropped before completion.
/// # Errors
/// This function will return the error of the `request`
pub async fn dispatch<T, F, Fut>(control: &dyn SubmitControl, request: F) -> RpResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = RpResult<T>>,
{
    let _guard = ControlGuard::engage(control);
    request().await
}

/// Validate the `form` and, only when valid, [dispatch] the `request` built from it. Validation
/// failures never engage the control.
/// # Errors
/// This function will return the validation error or the error of the `request`
pub async fn submit<V, T, F, Fut>(form: V, control: &dyn SubmitControl, request: F) -> RpResult<T>
where
    V: Validate,
    F: FnOnce(V) -> Fut,
    Fut: Future<Output = RpResult<T>>,
{
    form.validate_form()?;
    dispatch(control, || request(form)).await
}

#[cfg(test)]
pub(crate) mod test {
    use std::cell::RefCell;

    use common::error::{RpError, RpResult};
    use recruit_portal_common::Credentials;
    use rstest::rstest;

    use super::{dispatch, submit, SubmitControl};

    /// Control recording every state change
    #[derive(Default)]
    pub(crate) struct RecordingControl {
        pub(crate) events: RefCell<Vec<&'static str>>,
    }

    impl SubmitControl for RecordingControl {
        fn engage(&self) {
            self.events.borrow_mut().push("engage");
        }

        fn release(&self) {
            self.events.borrow_mut().push("release");
        }
    }

    #[rstest]
    #[case::success(Ok(()))]
    #[case::api_error(Err(RpError::Api { status: 500, message: String::new() }))]
    #[case::network_error(Err(RpError::Network("offline".to_owned())))]
    #[tokio::test]
    async fn control_should_be_released_on_every_outcome(#[case] result: RpResult<()>) {
        let control = RecordingControl::default();
        let _ = dispatch(&control, || async {
            control.events.borrow_mut().push("request");
            result
        })
        .await;
        assert_eq!(*control.events.borrow(), vec!["engage", "request", "release"]);
    }

    #[tokio::test]
    async fn dropped_submission_should_release_control() {
        let control = RecordingControl::default();
        let pending = dispatch(&control, || futures::future::pending::<RpResult<()>>());
        let _ = futures::FutureExt::now_or_never(pending);
        assert_eq!(*control.events.borrow(), vec!["engage", "release"]);
    }

    #[tokio::test]
    async fn invalid_form_should_not_engage_control() {
        let control = RecordingControl::default();
        let credentials = Credentials {
            username: String::new(),
            password: "p".to_owned(),
        };
        let result = submit(credentials, &control, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(RpError::Validation(_))));
        assert!(control.events.borrow().is_empty());
    }
}
