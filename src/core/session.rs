//! Display state for submissions: busy flag, last result, last error.
//!
//! Every submission takes a ticket with a fresh sequence number. Only the
//! outcome of the most recently issued ticket is ever applied, so a slow
//! response from an older submission cannot overwrite a newer one.

use crate::api::models::SearchResult;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    sequence: u64,
}

impl SubmissionTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    /// A newer submission was issued before this one finished.
    Superseded,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    loading: bool,
    result: Option<SearchResult>,
    error: Option<String>,
    issued: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the loading state and clears what was displayed.
    pub fn begin(&mut self) -> SubmissionTicket {
        self.issued += 1;
        self.loading = true;
        self.result = None;
        self.error = None;
        log::debug!("submission #{} started", self.issued);
        SubmissionTicket {
            sequence: self.issued,
        }
    }

    pub fn is_latest(&self, ticket: SubmissionTicket) -> bool {
        ticket.sequence == self.issued
    }

    pub fn finish(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<SearchResult, ApiError>,
    ) -> SubmitOutcome {
        if !self.is_latest(ticket) {
            log::warn!(
                "dropping response of submission #{} (latest is #{})",
                ticket.sequence,
                self.issued
            );
            return SubmitOutcome::Superseded;
        }

        self.loading = false;
        match outcome {
            Ok(result) => {
                log::debug!(
                    "submission #{} returned {} of {} works",
                    ticket.sequence,
                    result.records.len(),
                    result.total
                );
                self.error = None;
                self.result = Some(result);
            }
            Err(err) => {
                log::debug!("submission #{} failed: {}", ticket.sequence, err);
                self.result = None;
                self.error = Some(err.display_friendly());
            }
        }
        SubmitOutcome::Applied
    }

    /// Releases a ticket whose request never completed.
    pub fn abandon(&mut self, ticket: SubmissionTicket) {
        if self.is_latest(ticket) {
            log::debug!("submission #{} abandoned", ticket.sequence);
            self.loading = false;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submissions(&self) -> u64 {
        self.issued
    }
}
