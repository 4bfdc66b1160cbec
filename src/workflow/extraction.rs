//! Extraction backend seam.
//!
//! The driver hands the module descriptor and the operator's input to
//! an `ExtractionBackend` once progress completes. The production
//! build ships the simulated backend; real extractors plug in behind
//! the same trait.

use crate::models::module::ModuleDescriptor;
use crate::workflow::types::{InputArtifact, RecordSummary};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    #[error("Cannot read source file: {0}")]
    SourceUnreadable(String),
    #[error("Extraction failed: {0}")]
    Backend(String),
}

/// Produces result rows for a finished run.
pub trait ExtractionBackend: Send + Sync {
    fn extract(
        &self,
        descriptor: &ModuleDescriptor,
        artifact: &InputArtifact,
    ) -> Result<Vec<RecordSummary>, ExtractionError>;
}

/// Backend used by the simulated pipeline. File inputs must point at
/// an existing file; tokens pass through. Output is the canned record
/// set every module currently shows.
pub struct SimulatedExtraction;

impl ExtractionBackend for SimulatedExtraction {
    fn extract(
        &self,
        descriptor: &ModuleDescriptor,
        artifact: &InputArtifact,
    ) -> Result<Vec<RecordSummary>, ExtractionError> {
        if let InputArtifact::FilePath { path } = artifact {
            if !path.is_file() {
                return Err(ExtractionError::SourceUnreadable(
                    path.display().to_string(),
                ));
            }
        }

        tracing::debug!(module = %descriptor.id, "Simulated extraction producing sample rows");
        Ok(sample_rows())
    }
}

/// Backend that always fails with the configured detail. For driving
/// the failure path in tests.
pub struct FailingExtraction {
    pub detail: String,
}

impl FailingExtraction {
    pub fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

impl ExtractionBackend for FailingExtraction {
    fn extract(
        &self,
        _descriptor: &ModuleDescriptor,
        _artifact: &InputArtifact,
    ) -> Result<Vec<RecordSummary>, ExtractionError> {
        Err(ExtractionError::Backend(self.detail.clone()))
    }
}

fn row(id: &str, processed_on: &str, amount: &str, status: &str, operator: &str) -> RecordSummary {
    RecordSummary {
        id: id.to_string(),
        processed_on: processed_on.to_string(),
        amount: amount.to_string(),
        status: status.to_string(),
        operator: operator.to_string(),
    }
}

/// The canned result set shown while real extractors are stubbed out.
pub fn sample_rows() -> Vec<RecordSummary> {
    vec![
        row("1", "15/02/2026", "R$ 1.250,00", "Processado", "Admin"),
        row("2", "14/02/2026", "R$ 3.420,50", "Processado", "Admin"),
        row("3", "12/02/2026", "R$ 890,00", "Erro", "User"),
        row("4", "10/02/2026", "R$ 2.100,00", "Processado", "Admin"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resolver;
    use crate::models::module::ModuleStub;
    use std::io::Write;
    use std::path::PathBuf;

    fn darf_descriptor() -> ModuleDescriptor {
        resolver::resolve_stub(&ModuleStub {
            id: "darf".to_string(),
            label: "Extrair Darf".to_string(),
            ..ModuleStub::default()
        })
        .unwrap()
    }

    #[test]
    fn sample_rows_are_stable() {
        let rows = sample_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].amount, "R$ 1.250,00");
        assert_eq!(rows[2].status, "Erro");
        assert_eq!(rows[2].operator, "User");
    }

    #[test]
    fn simulated_backend_requires_existing_file() {
        let backend = SimulatedExtraction;
        let artifact = InputArtifact::FilePath {
            path: PathBuf::from("/nonexistent/sped-efd.txt"),
        };

        let err = backend.extract(&darf_descriptor(), &artifact).unwrap_err();
        assert!(matches!(err, ExtractionError::SourceUnreadable(_)));
        assert!(err.to_string().contains("sped-efd.txt"));
    }

    #[test]
    fn simulated_backend_reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "|0000|014|0|").unwrap();

        let backend = SimulatedExtraction;
        let artifact = InputArtifact::FilePath {
            path: file.path().to_path_buf(),
        };

        let rows = backend.extract(&darf_descriptor(), &artifact).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn simulated_backend_accepts_tokens() {
        let backend = SimulatedExtraction;
        let artifact = InputArtifact::Token {
            value: "ecac-token-123".to_string(),
        };

        let rows = backend.extract(&darf_descriptor(), &artifact).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn failing_backend_reports_detail() {
        let backend = FailingExtraction::new("PDF corrompido");
        let artifact = InputArtifact::Token {
            value: "tok".to_string(),
        };

        let err = backend.extract(&darf_descriptor(), &artifact).unwrap_err();
        assert_eq!(err.to_string(), "Extraction failed: PDF corrompido");
    }
}
