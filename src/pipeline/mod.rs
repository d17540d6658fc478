//! Scan workflow — upload, OCR analysis, manual correction, and the
//! records commit that turns a confirmed scan into prescriptions and
//! tracking days.

pub mod commit;
pub mod scan;

pub use commit::{commit_scan, CommitOutcome};
pub use scan::{build_pipeline, PipelineError, SaveOutcome, ScanPipeline};
