use crate::core::form::QueryForm;
use crate::core::payload::{PartyEncodingConfig, QueryPayload};
use crate::core::services::traits::SearchGateway;
use crate::core::session::{SearchSession, SubmissionTicket, SubmitOutcome};
use std::cell::{Ref, RefCell};

/// Submits forms through a gateway and keeps the display state.
///
/// The session lives in a `RefCell` because all submissions run on one
/// thread; no borrow is held across an `.await`.
pub struct SearchService<G> {
    gateway: G,
    encoding: PartyEncodingConfig,
    session: RefCell<SearchSession>,
}

/// Releases the ticket if the submission future is dropped before finishing.
struct PendingSubmission<'a> {
    session: &'a RefCell<SearchSession>,
    ticket: SubmissionTicket,
    finished: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.borrow_mut().abandon(self.ticket);
        }
    }
}

impl<G: SearchGateway> SearchService<G> {
    pub fn new(gateway: G, encoding: PartyEncodingConfig) -> Self {
        Self {
            gateway,
            encoding,
            session: RefCell::new(SearchSession::new()),
        }
    }

    pub fn encoding(&self) -> &PartyEncodingConfig {
        &self.encoding
    }

    /// The payload a submission of `form` would send.
    pub fn payload_for(&self, form: &QueryForm) -> QueryPayload {
        form.build_payload(&self.encoding)
    }

    /// One submission: build payload, call the gateway once, record the outcome.
    pub async fn submit(&self, form: &QueryForm) -> SubmitOutcome {
        let payload = self.payload_for(form);
        let ticket = self.session.borrow_mut().begin();
        let mut pending = PendingSubmission {
            session: &self.session,
            ticket,
            finished: false,
        };

        let outcome = self.gateway.search(&payload).await;

        pending.finished = true;
        self.session.borrow_mut().finish(ticket, outcome)
    }

    pub fn session(&self) -> Ref<'_, SearchSession> {
        self.session.borrow()
    }
}
