//! Workflow wire types: phases, input artifacts, result rows and the
//! progress events streamed to the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::module::ModuleVariant;

// ═══════════════════════════════════════════
// Phase
// ═══════════════════════════════════════════

/// Lifecycle phase of a workflow session.
///
/// `Selecting` is the entry phase for every variant. Upload modules
/// continue through `AwaitingInput`; edit modules branch into
/// `ReviewingEdit` instead. `Completed`, `Cancelled` and `Failed` are
/// terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Selecting,
    AwaitingInput,
    ReviewingEdit,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selecting => "selecting",
            Self::AwaitingInput => "awaiting_input",
            Self::ReviewingEdit => "reviewing_edit",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "selecting" => Some(Self::Selecting),
            "awaiting_input" => Some(Self::AwaitingInput),
            "reviewing_edit" => Some(Self::ReviewingEdit),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Terminal phases reject every further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn all() -> &'static [Phase] {
        &[
            Self::Selecting,
            Self::AwaitingInput,
            Self::ReviewingEdit,
            Self::Processing,
            Self::Completed,
            Self::Cancelled,
            Self::Failed,
        ]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Operator input
// ═══════════════════════════════════════════

/// What the operator supplied to feed a module run. Upload modules
/// take a file path picked via the native dialog; Ecac-style modules
/// take an access token typed into the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputArtifact {
    FilePath { path: PathBuf },
    Token { value: String },
}

impl InputArtifact {
    /// True when the artifact carries nothing usable. An empty
    /// artifact never starts processing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::FilePath { path } => path.as_os_str().is_empty(),
            Self::Token { value } => value.trim().is_empty(),
        }
    }
}

/// Draft of a |0000| record edit. `new_cnpj` is the primary field;
/// `new_ie` may stay blank (ISENTO registrations have none).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDraft {
    #[serde(default)]
    pub new_cnpj: String,
    #[serde(default)]
    pub new_ie: String,
}

impl EditDraft {
    pub fn has_primary(&self) -> bool {
        !self.new_cnpj.trim().is_empty()
    }
}

// ═══════════════════════════════════════════
// Results
// ═══════════════════════════════════════════

/// One extracted record as shown in the results table. Values arrive
/// pre-formatted from the extraction backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    pub processed_on: String,
    pub amount: String,
    pub status: String,
    pub operator: String,
}

// ═══════════════════════════════════════════
// Progress events
// ═══════════════════════════════════════════

/// Events emitted on the `workflow-progress` channel while a session
/// runs. Tagged so the frontend can dispatch on `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { session_id: Uuid },
    Tick { session_id: Uuid, progress: u8 },
    Completed { session_id: Uuid, row_count: usize },
    Failed { session_id: Uuid, error: String },
    Cancelled { session_id: Uuid },
}

// ═══════════════════════════════════════════
// Snapshot
// ═══════════════════════════════════════════

/// Read-only view of a session handed across the IPC boundary. The
/// live session stays server-side; the frontend only ever sees this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub area_id: String,
    pub module_id: String,
    pub module_title: String,
    pub variant: ModuleVariant,
    pub action_label: String,
    pub phase: Phase,
    pub progress: u8,
    pub result_rows: Vec<RecordSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_draft: Option<EditDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
