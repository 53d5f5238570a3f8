//! Registration form state machine.
//!
//! A [`FormController`] holds the three fields a registrant fills in and
//! walks one submission at a time through
//! `Idle → Submitting → Settled(outcome) → Idle`. Every transition is
//! published on a [`watch`] channel so a front end can render it.
//!
//! Client-side checks only cover shape (blank fields, email pattern). The
//! server repeats them and also enforces the phone length.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::{Contact, ContactField, ContactInput, DuplicateField, is_valid_email};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ContactsApi, Submission};

/// Shown when a non-duplicate failure carries no server message.
pub const FAILED_TO_REGISTER: &str = "Failed to register";

/// Shown when the server could not be reached.
pub const UNABLE_TO_CONNECT: &str = "Unable to connect to the server. Please try again.";

/// Shown for a 409 without a server message.
pub const ALREADY_EXISTS: &str = "This contact already exists";

/// Shown when the sheet link cannot be fetched.
pub const SHEET_URL_UNAVAILABLE: &str = "Could not retrieve sheet URL";

/// The three fields of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
}

impl ContactForm {
    /// Creates a filled-in form.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Empties every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Checks the fields a registrant must fill before submitting.
    pub fn check(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::new(
                ContactField::Name,
                "Please enter your full name",
            ));
        }
        if self.email.trim().is_empty() {
            return Err(FieldError::new(
                ContactField::Email,
                "Please enter your email address",
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(FieldError::new(
                ContactField::Email,
                "Please enter a valid email address",
            ));
        }
        if self.phone.trim().is_empty() {
            return Err(FieldError::new(
                ContactField::Phone,
                "Please enter your phone number",
            ));
        }
        Ok(())
    }

    fn to_input(&self) -> ContactInput {
        ContactInput::new(&self.name, &self.email, &self.phone)
    }
}

/// A client-side check failed; nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    /// Offending field.
    pub field: ContactField,
    /// Message for the registrant.
    pub message: &'static str,
}

impl FieldError {
    fn new(field: ContactField, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The contact was stored.
    Success(Contact),
    /// The email or phone is already registered.
    Duplicate {
        /// Colliding field, when the server named one.
        field: Option<DuplicateField>,
        /// Message for the registrant.
        message: String,
    },
    /// Anything else, including an unreachable server.
    Error {
        /// Message for the registrant.
        message: String,
    },
}

impl Outcome {
    /// Message for the registrant.
    pub fn message(&self) -> String {
        match self {
            Outcome::Success(contact) => format!("Welcome {}!", contact.name),
            Outcome::Duplicate { message, .. } | Outcome::Error { message } => message.clone(),
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Observable form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    /// Ready for input.
    Idle,
    /// A request is in flight; submit is disabled.
    Submitting,
    /// The last request finished. Immediately followed by `Idle`.
    Settled(Outcome),
}

/// Drives a [`ContactForm`] against a [`ContactsApi`].
pub struct FormController<A: ContactsApi + ?Sized> {
    api: Arc<A>,
    form: ContactForm,
    focus: Option<ContactField>,
    total: Option<u64>,
    last_outcome: Option<Outcome>,
    state: watch::Sender<FormState>,
}

impl<A: ContactsApi + ?Sized> FormController<A> {
    /// Creates an empty, idle form.
    pub fn new(api: Arc<A>) -> Self {
        let (state, _rx) = watch::channel(FormState::Idle);
        Self {
            api,
            form: ContactForm::default(),
            focus: None,
            total: None,
            last_outcome: None,
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// The fields as currently entered.
    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    /// Mutable access for entering fields.
    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    /// Field that should hold input focus.
    pub fn focus(&self) -> Option<ContactField> {
        self.focus
    }

    /// Last known registration total.
    pub fn total_count(&self) -> Option<u64> {
        self.total
    }

    /// Outcome of the most recent submission.
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Whether the submit control should be enabled.
    pub fn is_submit_enabled(&self) -> bool {
        !matches!(*self.state.borrow(), FormState::Submitting)
    }

    /// Validates and submits the form.
    ///
    /// A failed client-side check returns the [`FieldError`] and leaves the
    /// form idle. Otherwise the request runs to an [`Outcome`]; on success
    /// the form is cleared, focus returns to the name field, and the total
    /// is refreshed.
    pub async fn submit(&mut self) -> Result<Outcome, FieldError> {
        if let Err(e) = self.form.check() {
            if e.field == ContactField::Name {
                self.focus = Some(ContactField::Name);
            }
            tracing::debug!(field = %e.field, reason = e.message, "Form check failed");
            return Err(e);
        }

        self.state.send_replace(FormState::Submitting);
        let outcome = match self.api.submit(&self.form.to_input()).await {
            Ok(Submission::Created(contact)) => Outcome::Success(contact),
            Ok(Submission::Duplicate { field, message }) => Outcome::Duplicate {
                field,
                message: message.unwrap_or_else(|| ALREADY_EXISTS.to_string()),
            },
            Ok(Submission::Rejected { status, message }) => {
                tracing::warn!(status, server_message = ?message, "Registration rejected");
                Outcome::Error {
                    message: message.unwrap_or_else(|| FAILED_TO_REGISTER.to_string()),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Submission error");
                Outcome::Error {
                    message: UNABLE_TO_CONNECT.to_string(),
                }
            }
        };

        if outcome.is_success() {
            self.form.clear();
            self.focus = Some(ContactField::Name);
        }

        self.last_outcome = Some(outcome.clone());
        self.state.send_replace(FormState::Settled(outcome.clone()));
        self.state.send_replace(FormState::Idle);

        if outcome.is_success() {
            self.refresh_count().await;
        }
        Ok(outcome)
    }

    /// Re-reads the registration total. Failures keep the previous value.
    pub async fn refresh_count(&mut self) -> Option<u64> {
        match self.api.count().await {
            Ok(count) => self.total = Some(count),
            Err(e) => tracing::warn!(error = %e, "Error fetching count"),
        }
        self.total
    }

    /// Fetches the link to the registration sheet.
    pub async fn open_sheet_url(&self) -> Result<String, String> {
        self.api.sheet_url().await.map_err(|e| {
            tracing::warn!(error = %e, "Error fetching sheet URL");
            SHEET_URL_UNAVAILABLE.to_string()
        })
    }
}

/// Background task publishing the registration total on an interval.
///
/// The task stops when the poller is dropped.
pub struct CountPoller {
    rx: watch::Receiver<Option<u64>>,
    handle: JoinHandle<()>,
}

impl CountPoller {
    /// Latest total, `None` until the first successful read.
    pub fn latest(&self) -> Option<u64> {
        *self.rx.borrow()
    }

    /// Subscribe to total updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.rx.clone()
    }

    /// Waits for the next published total.
    pub async fn changed(&mut self) -> Option<u64> {
        self.rx.changed().await.ok()?;
        *self.rx.borrow_and_update()
    }
}

impl Drop for CountPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Polls `api.count()` every `interval`, starting immediately.
pub fn spawn_count_poller<A>(api: Arc<A>, interval: Duration) -> CountPoller
where
    A: ContactsApi + ?Sized + 'static,
{
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match api.count().await {
                Ok(count) => {
                    tx.send_replace(Some(count));
                }
                Err(e) => tracing::debug!(error = %e, "Count poll failed"),
            }
            if tx.is_closed() {
                break;
            }
        }
    });
    CountPoller { rx, handle }
}
