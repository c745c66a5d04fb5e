//! Submission state machine and the transport it hands messages to.
//!
//! ```text
//! Idle -> Validating -> Invalid -> Idle
//!                    -> Submitting -> Sent -> Idle
//! ```
//!
//! The flow owns no timers. `begin` returns how long the transmission takes
//! and the caller schedules `complete` and later `restore`.

use super::validation::{validate, ValidationReport};
use crate::dom::{ContactForm, SubmitButton};
use crate::draft::DraftRecord;
use crate::{Error, FormLabels, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Invalid,
    Submitting,
    Sent,
}

/// External collaborator that delivers a contact message.
pub trait SubmissionTransport: Send {
    /// Time the delivery takes.
    fn latency(&self) -> Duration;

    /// Deliver `message`; called once `latency` has elapsed.
    fn transmit(&mut self, message: &DraftRecord) -> Result<()>;
}

/// Local stand-in for a backend: records messages instead of sending them.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    latency: Duration,
    outbox: Arc<Mutex<Vec<DraftRecord>>>,
    failure: Option<String>,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency, outbox: Arc::new(Mutex::new(Vec::new())), failure: None }
    }

    /// A transport whose every delivery fails with `reason`.
    pub fn failing(latency: Duration, reason: &str) -> Self {
        Self { failure: Some(reason.to_string()), ..Self::new(latency) }
    }

    /// Messages delivered so far. Clones share the same outbox.
    pub fn sent(&self) -> Vec<DraftRecord> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SubmissionTransport for SimulatedTransport {
    fn latency(&self) -> Duration {
        self.latency
    }

    fn transmit(&mut self, message: &DraftRecord) -> Result<()> {
        if let Some(reason) = &self.failure {
            return Err(Error::SubmissionError(reason.clone()));
        }
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner).push(message.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission is already in flight or being held as sent.
    Ignored,
    /// Validation failed; nothing was transmitted.
    Rejected(ValidationReport),
    /// Transmission started and completes after `latency`.
    Accepted { latency: Duration },
}

pub struct SubmissionFlow {
    phase: SubmissionPhase,
    transport: Box<dyn SubmissionTransport>,
    labels: FormLabels,
    original_button: Option<SubmitButton>,
    in_flight: Option<DraftRecord>,
    history: Vec<SubmissionPhase>,
}

impl SubmissionFlow {
    pub fn new(transport: Box<dyn SubmissionTransport>, labels: FormLabels) -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            transport,
            labels,
            original_button: None,
            in_flight: None,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Every phase entered since construction, in order.
    pub fn history(&self) -> &[SubmissionPhase] {
        &self.history
    }

    fn enter(&mut self, phase: SubmissionPhase) {
        log::debug!("submission {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.history.push(phase);
    }

    /// Validate the form and, when every field passes, start transmitting.
    pub fn begin(&mut self, form: &mut dyn ContactForm) -> SubmitOutcome {
        if matches!(self.phase, SubmissionPhase::Submitting | SubmissionPhase::Sent) {
            log::info!("submit ignored while {:?}", self.phase);
            return SubmitOutcome::Ignored;
        }

        self.enter(SubmissionPhase::Validating);
        let report = validate(form);
        report.apply(form);
        if !report.is_valid() {
            log::info!("submission rejected, invalid fields: {:?}", report.invalid_fields());
            self.enter(SubmissionPhase::Invalid);
            self.enter(SubmissionPhase::Idle);
            return SubmitOutcome::Rejected(report);
        }

        self.in_flight = Some(DraftRecord::capture(form));
        self.original_button = form.submit_button();
        if let Some(button) = &self.original_button {
            form.set_submit_button(SubmitButton { label: self.labels.in_flight.clone(), disabled: true });
            log::debug!("submit button `{}` disabled", button.label);
        }
        self.enter(SubmissionPhase::Submitting);
        SubmitOutcome::Accepted { latency: self.transport.latency() }
    }

    /// Hand the message to the transport. On success the flow is `Sent` and
    /// the caller clears the form and draft; on failure the button is
    /// restored and the flow returns to `Idle`.
    pub fn complete(&mut self, form: &mut dyn ContactForm) -> Result<()> {
        if self.phase != SubmissionPhase::Submitting {
            return Ok(());
        }
        let message = self.in_flight.take().unwrap_or_default();
        match self.transport.transmit(&message) {
            Ok(()) => {
                if self.original_button.is_some() {
                    form.set_submit_button(SubmitButton { label: self.labels.sent.clone(), disabled: true });
                }
                self.enter(SubmissionPhase::Sent);
                Ok(())
            }
            Err(e) => {
                self.restore(form);
                Err(e)
            }
        }
    }

    /// Put the submit button back the way it was and return to `Idle`.
    pub fn restore(&mut self, form: &mut dyn ContactForm) {
        if let Some(button) = self.original_button.take() {
            form.set_submit_button(button);
        }
        if self.phase != SubmissionPhase::Idle {
            self.enter(SubmissionPhase::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryPage, PageLayout};
    use SubmissionPhase::*;

    fn filled_page() -> MemoryPage {
        let page = MemoryPage::new(PageLayout::contact());
        page.type_into("name", "Ada");
        page.type_into("email", "a@b.com");
        page.type_into("message", "Hi");
        page
    }

    #[test]
    fn invalid_form_never_submits() {
        let page = MemoryPage::new(PageLayout::contact());
        page.type_into("email", "not-an-email");
        let mut caps = page.capabilities();
        let form = caps.form.as_deref_mut().unwrap();
        let mut flow = SubmissionFlow::new(Box::new(SimulatedTransport::new(Duration::ZERO)), FormLabels::default());
        let outcome = flow.begin(form);
        assert!(matches!(outcome, SubmitOutcome::Rejected(ref r) if r.invalid_fields().len() == 3));
        assert_eq!(flow.history(), &[Validating, Invalid, Idle]);
        assert!(!flow.history().contains(&Submitting));
        assert!(!page.snapshot().submit_button.unwrap().disabled);
    }

    #[test]
    fn accepted_then_sent_then_restored() {
        let page = filled_page();
        let transport = SimulatedTransport::new(Duration::from_millis(1500));
        let mut caps = page.capabilities();
        let mut flow = SubmissionFlow::new(Box::new(transport.clone()), FormLabels::default());

        let outcome = flow.begin(caps.form.as_deref_mut().unwrap());
        assert_eq!(outcome, SubmitOutcome::Accepted { latency: Duration::from_millis(1500) });
        let button = page.snapshot().submit_button.unwrap();
        assert_eq!(button.label, "TRANSMITTING...");
        assert!(button.disabled);

        assert_eq!(flow.begin(caps.form.as_deref_mut().unwrap()), SubmitOutcome::Ignored);

        flow.complete(caps.form.as_deref_mut().unwrap()).unwrap();
        assert_eq!(flow.phase(), Sent);
        assert_eq!(page.snapshot().submit_button.unwrap().label, "SENT");
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent()[0].email, "a@b.com");

        flow.restore(caps.form.as_deref_mut().unwrap());
        assert_eq!(flow.history(), &[Validating, Submitting, Sent, Idle]);
        let button = page.snapshot().submit_button.unwrap();
        assert_eq!(button.label, "SEND");
        assert!(!button.disabled);
    }

    #[test]
    fn transport_failure_restores_button() {
        let page = filled_page();
        let mut caps = page.capabilities();
        let mut flow = SubmissionFlow::new(
            Box::new(SimulatedTransport::failing(Duration::ZERO, "offline")),
            FormLabels::default(),
        );
        flow.begin(caps.form.as_deref_mut().unwrap());
        let err = flow.complete(caps.form.as_deref_mut().unwrap()).unwrap_err();
        assert!(matches!(err, Error::SubmissionError(_)));
        assert_eq!(flow.phase(), Idle);
        assert!(!page.snapshot().submit_button.unwrap().disabled);
    }
}
