//! Verdict model shared by every detector backend.
//!
//! Backends differ in what they send upstream and how they read the reply, but
//! they all end up producing the same [`AnalysisResult`]. The threshold mapping
//! from a scalar AI-likelihood score to a [`Verdict`] lives here and nowhere else.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Score above which an image is called AI generated (or real, mirrored).
pub const STRONG_THRESHOLD: f64 = 0.7;
/// Score above which an image is called likely AI (or likely real, mirrored).
pub const LEANING_THRESHOLD: f64 = 0.55;

/// Five-way classification shown to the user.
///
/// Serialized in SCREAMING_SNAKE_CASE so the front-end can match on the exact
/// strings `AI_GENERATED`, `LIKELY_AI`, `UNCERTAIN`, `LIKELY_REAL` and `REAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    AiGenerated,
    LikelyAi,
    Uncertain,
    LikelyReal,
    Real,
}

impl Verdict {
    /// Maps an AI-likelihood score in `[0, 1]` to a verdict.
    ///
    /// The realness score is taken as `1 - score`. Thresholds are checked in
    /// order: strong AI, leaning AI, strong real, leaning real, then uncertain.
    /// Out-of-range input is clamped and `NaN` is treated as no signal at all.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use deeptrust_server::detection::Verdict;
    ///
    /// assert_eq!(Verdict::from_ai_score(0.92), Verdict::AiGenerated);
    /// assert_eq!(Verdict::from_ai_score(0.5), Verdict::Uncertain);
    /// assert_eq!(Verdict::from_ai_score(0.1), Verdict::Real);
    /// ```
    pub fn from_ai_score(score: f64) -> Self {
        if score.is_nan() {
            return Self::Uncertain;
        }
        let ai = score.clamp(0.0, 1.0);
        let real = 1.0 - ai;

        if ai > STRONG_THRESHOLD {
            Self::AiGenerated
        } else if ai > LEANING_THRESHOLD {
            Self::LikelyAi
        } else if real > STRONG_THRESHOLD {
            Self::Real
        } else if real > LEANING_THRESHOLD {
            Self::LikelyReal
        } else {
            Self::Uncertain
        }
    }

    /// Wire name, e.g. `LIKELY_AI`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI_GENERATED",
            Self::LikelyAi => "LIKELY_AI",
            Self::Uncertain => "UNCERTAIN",
            Self::LikelyReal => "LIKELY_REAL",
            Self::Real => "REAL",
        }
    }
}

impl fmt::Display for Verdict {
    /// Human-readable form used in summaries: `AI_GENERATED` becomes `ai generated`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " ").to_lowercase())
    }
}

/// Severity tag attached to a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score > STRONG_THRESHOLD {
            Self::High
        } else if score > 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// A named detection sub-result surfaced next to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub detected: bool,
    pub severity: Severity,
    pub description: String,
}

/// Response body of a successful analysis.
///
/// `confidence` is a percentage in `[0, 100]`. The value is built per request
/// from whatever the upstream model returned and dropped after the response
/// is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub confidence: f64,
    pub verdict: Verdict,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub summary: String,
}

impl AnalysisResult {
    /// Builds the full result from a single AI-likelihood score.
    ///
    /// Used by classifier backends that only report label scores. Produces an
    /// "AI Pattern Detection" and an "Authenticity Score" signal plus a one-line
    /// summary.
    pub fn from_ai_score(score: f64) -> Self {
        let ai = if score.is_nan() { 0.5 } else { score.clamp(0.0, 1.0) };
        let real = 1.0 - ai;
        let verdict = Verdict::from_ai_score(ai);
        let confidence = round_percent(ai.max(real));

        let signals = vec![
            Signal {
                name: "AI Pattern Detection".to_string(),
                detected: ai > 0.5,
                severity: Severity::from_score(ai),
                description: format!(
                    "CLIP model detected {:.1}% AI-generated characteristics",
                    ai * 100.0
                ),
            },
            Signal {
                name: "Authenticity Score".to_string(),
                detected: real > 0.5,
                severity: Severity::from_score(real),
                description: format!("{:.1}% authenticity indicators detected", real * 100.0),
            },
        ];

        Self {
            confidence,
            verdict,
            signals,
            summary: format!(
                "Based on multimodal AI analysis, this image is {verdict}. Confidence: {confidence:.1}%"
            ),
        }
    }

    /// Clamps `confidence` into `[0, 100]`, mapping `NaN` to zero.
    pub fn normalized(mut self) -> Self {
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 100.0)
        };
        self
    }
}

/// Fraction to percentage with one decimal place.
fn round_percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}
