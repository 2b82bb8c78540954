use thiserror::Error;

/// Lifecycle of one add product form submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// The operator is filling the form.
    #[default]
    Editing,
    /// A creation request is in flight.
    Submitting,
    /// The product was created and the view is leaving the form.
    Navigating,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("the product was already created")]
    Finished,
}

/// Guards the form against concurrent or repeated submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionGate {
    phase: SubmissionPhase,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Whether a submission could start now.
    pub fn check_ready(&self) -> Result<(), SubmissionError> {
        match self.phase {
            SubmissionPhase::Editing => Ok(()),
            SubmissionPhase::Submitting => Err(SubmissionError::AlreadySubmitting),
            SubmissionPhase::Navigating => Err(SubmissionError::Finished),
        }
    }

    /// Moves to [`SubmissionPhase::Submitting`].
    pub fn try_begin(&mut self) -> Result<(), SubmissionError> {
        self.check_ready()?;
        self.phase = SubmissionPhase::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self) {
        self.phase = SubmissionPhase::Navigating;
    }

    /// Returns to editing so the operator can correct and retry.
    pub fn fail(&mut self) {
        self.phase = SubmissionPhase::Editing;
    }

    pub fn reset(&mut self) {
        self.phase = SubmissionPhase::Editing;
    }
}
