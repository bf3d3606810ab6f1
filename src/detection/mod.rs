//! AI-image detection: verdict model and upstream backends.

pub mod analyzer;
pub mod verdict;

pub use analyzer::{DetectionError, Detector, HuggingFaceDetector, LovableDetector, analyze};
pub use verdict::{AnalysisResult, Severity, Signal, Verdict};
