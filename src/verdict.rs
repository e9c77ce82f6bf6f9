//! Verdict classification from similarity scores

use crate::classify::Moderation;
use crate::config::VerdictConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final classification of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TrueHighConfidence,
    LikelyTrue,
    Fake,
    FakeHateSpeech,
    FakeProfanity,
    Unverified,
    InsufficientData,
    SourcesFoundUnanalyzed,
}

impl Verdict {
    /// User-facing sentence; clients colour results by its keywords
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::TrueHighConfidence => "The News is True (High Confidence)",
            Verdict::LikelyTrue => "The News is Likely True",
            Verdict::Fake => "We can classify the news as Fake",
            Verdict::FakeHateSpeech => "We can classify the news as Fake (Hate Speech Detected)",
            Verdict::FakeProfanity => "We can classify the news as Fake (Profanity Detected)",
            Verdict::Unverified => "Unverified: not enough corroborating sources",
            Verdict::InsufficientData => "Insufficient data found to verify.",
            Verdict::SourcesFoundUnanalyzed => {
                "Found sources, but unable to analyze content deeply. Please check links below."
            }
        }
    }

    /// Short metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::TrueHighConfidence => "true_high_confidence",
            Verdict::LikelyTrue => "likely_true",
            Verdict::Fake => "fake",
            Verdict::FakeHateSpeech => "fake_hate_speech",
            Verdict::FakeProfanity => "fake_profanity",
            Verdict::Unverified => "unverified",
            Verdict::InsufficientData => "insufficient_data",
            Verdict::SourcesFoundUnanalyzed => "sources_found_unanalyzed",
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Verdict::TrueHighConfidence | Verdict::LikelyTrue)
    }

    pub fn is_fake(&self) -> bool {
        matches!(self, Verdict::Fake | Verdict::FakeHateSpeech | Verdict::FakeProfanity)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate of the per-summary similarity scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimilarityStats {
    pub average: f32,
    pub max: f32,
    pub count: usize,
}

impl SimilarityStats {
    pub fn from_scores(scores: &[f32]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let sum: f32 = scores.iter().sum();
        let max = scores.iter().copied().fold(f32::MIN, f32::max);
        Self {
            average: sum / scores.len() as f32,
            max,
            count: scores.len(),
        }
    }

    /// Max similarity as a whole percentage, e.g. `"72%"`
    pub fn confidence(&self) -> String {
        format!("{}%", (self.max.clamp(0.0, 1.0) * 100.0).round() as u32)
    }
}

/// Verdict the scores point to before moderation is considered
pub fn lean(stats: &SimilarityStats, source_count: usize, thresholds: &VerdictConfig) -> Verdict {
    if stats.average >= thresholds.true_threshold {
        Verdict::TrueHighConfidence
    } else if stats.average >= thresholds.likely_threshold || stats.max >= thresholds.true_threshold {
        Verdict::LikelyTrue
    } else if stats.average <= thresholds.fake_threshold
        && source_count >= thresholds.min_sources_for_fake
    {
        Verdict::Fake
    } else {
        Verdict::Unverified
    }
}

/// Final verdict
///
/// A claim the sources corroborate is still reported as fake when it was
/// flagged as hate speech or profanity.
pub fn classify(
    stats: &SimilarityStats,
    source_count: usize,
    moderation: Moderation,
    thresholds: &VerdictConfig,
) -> Verdict {
    let leaning = lean(stats, source_count, thresholds);
    if !leaning.is_true() {
        return leaning;
    }
    match moderation {
        Moderation::HateSpeech => Verdict::FakeHateSpeech,
        Moderation::Profanity => Verdict::FakeProfanity,
        Moderation::Clean => leaning,
    }
}
