//! HB-03: Workflow session state machine.
//!
//! One `WorkflowSession` per opened module. Phase, progress and result
//! rows are private; the transition methods below are the only way to
//! move a session, which is what enforces the lifecycle invariants:
//! terminal phases reject everything, progress only ever grows, rows
//! appear atomically with completion, and each outcome notifies the
//! operator exactly once because the toast is emitted inside the one
//! transition that can reach it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::module::{ModuleDescriptor, ModuleVariant};
use crate::workflow::notify::{Notification, Notifier};
use crate::workflow::types::{EditDraft, InputArtifact, Phase, RecordSummary, SessionSnapshot};

// ── Operator-facing messages ────────────────────────────

pub const MSG_EXTRACTION_DONE: &str = "Extração concluída com sucesso!";
pub const MSG_EDIT_CONFIRMED: &str = "Registro atualizado com sucesso!";
pub const MSG_RUN_CANCELLED: &str = "Operação cancelada.";
pub const MSG_MISSING_INPUT: &str = "Por favor, selecione o arquivo ou informe o código.";
pub const MSG_MISSING_CNPJ: &str = "Informe o novo CNPJ para confirmar.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },
    #[error("No usable input supplied")]
    MissingInput,
    #[error("Edit draft is missing the new CNPJ")]
    MissingPrimaryField,
    #[error("Processing incomplete at {0}%")]
    ProgressIncomplete(u8),
}

/// A single module run, from module card click to terminal phase.
#[derive(Debug)]
pub struct WorkflowSession {
    pub id: Uuid,
    pub area_id: String,
    pub descriptor: ModuleDescriptor,
    phase: Phase,
    progress: u8,
    input_artifact: Option<InputArtifact>,
    result_rows: Vec<RecordSummary>,
    edit_draft: Option<EditDraft>,
    failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new(area_id: &str, descriptor: ModuleDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            area_id: area_id.to_string(),
            descriptor,
            phase: Phase::Selecting,
            progress: 0,
            input_artifact: None,
            result_rows: Vec::new(),
            edit_draft: None,
            failure_reason: None,
            created_at: Utc::now(),
        }
    }

    // ── Accessors ────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result_rows(&self) -> &[RecordSummary] {
        &self.result_rows
    }

    pub fn input_artifact(&self) -> Option<&InputArtifact> {
        self.input_artifact.as_ref()
    }

    pub fn edit_draft(&self) -> Option<&EditDraft> {
        self.edit_draft.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            area_id: self.area_id.clone(),
            module_id: self.descriptor.id.clone(),
            module_title: self.descriptor.title.clone(),
            variant: self.descriptor.variant,
            action_label: self.descriptor.action_label.clone(),
            phase: self.phase,
            progress: self.progress,
            result_rows: self.result_rows.clone(),
            edit_draft: self.edit_draft.clone(),
            failure_reason: self.failure_reason.clone(),
            created_at: self.created_at,
        }
    }

    // ── Transitions ────────────────────────────

    /// Leave `Selecting`. Edit modules go straight to review; every
    /// other variant waits for operator input first.
    pub fn begin(&mut self) -> Result<Phase, WorkflowError> {
        if self.phase != Phase::Selecting {
            return Err(self.invalid("begin"));
        }

        self.phase = match self.descriptor.variant {
            ModuleVariant::Edit => Phase::ReviewingEdit,
            _ => Phase::AwaitingInput,
        };

        tracing::debug!(session = %self.id, module = %self.descriptor.id, phase = %self.phase, "Session began");
        Ok(self.phase)
    }

    /// Record what the operator picked or typed. Replaces any earlier
    /// artifact; validation happens when processing starts.
    pub fn supply_input(&mut self, artifact: InputArtifact) -> Result<(), WorkflowError> {
        if self.phase != Phase::AwaitingInput {
            return Err(self.invalid("supply input"));
        }

        self.input_artifact = Some(artifact);
        Ok(())
    }

    /// Start the processing run. Refuses when no usable input has been
    /// supplied: the operator gets a toast and the session stays in
    /// `AwaitingInput` so they can fix it and retry.
    pub fn start_processing(&mut self, notifier: &dyn Notifier) -> Result<(), WorkflowError> {
        if self.phase != Phase::AwaitingInput {
            return Err(self.invalid("start processing"));
        }

        let usable = self
            .input_artifact
            .as_ref()
            .is_some_and(|a| !a.is_empty());
        if !usable {
            notifier.notify(Notification::error(MSG_MISSING_INPUT));
            return Err(WorkflowError::MissingInput);
        }

        self.phase = Phase::Processing;
        self.progress = 0;
        tracing::info!(session = %self.id, module = %self.descriptor.id, "Processing started");
        Ok(())
    }

    /// Advance progress by `step`, clamped to 100. Progress never
    /// decreases over a session's lifetime.
    pub fn advance(&mut self, step: u8) -> Result<u8, WorkflowError> {
        if self.phase != Phase::Processing {
            return Err(self.invalid("advance"));
        }

        self.progress = self.progress.saturating_add(step).min(100);
        Ok(self.progress)
    }

    /// Finish a processing run. Rows become visible in the same call
    /// that flips the phase, so readers never observe a completed
    /// session without its rows or rows on an unfinished one.
    pub fn complete(
        &mut self,
        rows: Vec<RecordSummary>,
        notifier: &dyn Notifier,
    ) -> Result<(), WorkflowError> {
        if self.phase != Phase::Processing {
            return Err(self.invalid("complete"));
        }
        if self.progress < 100 {
            return Err(WorkflowError::ProgressIncomplete(self.progress));
        }

        self.result_rows = rows;
        self.phase = Phase::Completed;
        notifier.notify(Notification::success(MSG_EXTRACTION_DONE));
        tracing::info!(session = %self.id, rows = self.result_rows.len(), "Session completed");
        Ok(())
    }

    /// Confirm an edit draft. Validation is lenient: the new CNPJ is
    /// required, the IE may stay blank. A refused draft keeps the
    /// session in `ReviewingEdit` for another attempt.
    pub fn confirm_edit(
        &mut self,
        draft: EditDraft,
        notifier: &dyn Notifier,
    ) -> Result<(), WorkflowError> {
        if self.phase != Phase::ReviewingEdit {
            return Err(self.invalid("confirm edit"));
        }

        if !draft.has_primary() {
            notifier.notify(Notification::error(MSG_MISSING_CNPJ));
            return Err(WorkflowError::MissingPrimaryField);
        }

        self.edit_draft = Some(draft);
        self.phase = Phase::Completed;
        notifier.notify(Notification::success(MSG_EDIT_CONFIRMED));
        tracing::info!(session = %self.id, module = %self.descriptor.id, "Edit confirmed");
        Ok(())
    }

    /// Cancel from any non-terminal phase. Progress freezes where it
    /// was and no rows are ever installed.
    pub fn cancel(&mut self, notifier: &dyn Notifier) -> Result<(), WorkflowError> {
        if self.phase.is_terminal() {
            return Err(self.invalid("cancel"));
        }

        self.phase = Phase::Cancelled;
        notifier.notify(Notification::info(MSG_RUN_CANCELLED));
        tracing::info!(session = %self.id, progress = self.progress, "Session cancelled");
        Ok(())
    }

    /// Record a processing failure with its reason.
    pub fn fail(&mut self, reason: &str, notifier: &dyn Notifier) -> Result<(), WorkflowError> {
        if self.phase != Phase::Processing {
            return Err(self.invalid("fail"));
        }

        self.failure_reason = Some(reason.to_string());
        self.phase = Phase::Failed;
        notifier.notify(Notification::error(&format!("Falha na extração: {reason}")));
        tracing::warn!(session = %self.id, %reason, "Session failed");
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            from: self.phase,
            action,
        }
    }
}
