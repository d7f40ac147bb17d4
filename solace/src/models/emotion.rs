use serde::{Deserialize, Serialize};

/// The seven emotion classes produced by the classification model.
///
/// The declaration order is significant: it is the fixed tie-break order
/// used whenever two labels carry the same score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Neutral,
    Sadness,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Neutral,
        Emotion::Sadness,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Neutral => "neutral",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anger" => Ok(Emotion::Anger),
            "disgust" => Ok(Emotion::Disgust),
            "fear" => Ok(Emotion::Fear),
            "joy" => Ok(Emotion::Joy),
            "neutral" => Ok(Emotion::Neutral),
            "sadness" => Ok(Emotion::Sadness),
            "surprise" => Ok(Emotion::Surprise),
            other => Err(format!("Unknown emotion label: {other}")),
        }
    }
}

/// Per-note emotion scores, one per supported label, each in [0, 1].
///
/// Scores are independently normalized by the upstream model and are not
/// required to sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmotionVector {
    pub anger: f64,
    pub disgust: f64,
    pub fear: f64,
    pub joy: f64,
    pub neutral: f64,
    pub sadness: f64,
    pub surprise: f64,
}

impl EmotionVector {
    /// Deterministic fallback written when classification fails permanently
    /// or exhausts its retries.
    pub fn neutral_fallback() -> Self {
        Self {
            neutral: 1.0,
            ..Self::default()
        }
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Anger => self.anger,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Joy => self.joy,
            Emotion::Neutral => self.neutral,
            Emotion::Sadness => self.sadness,
            Emotion::Surprise => self.surprise,
        }
    }

    pub fn set(&mut self, emotion: Emotion, score: f64) {
        match emotion {
            Emotion::Anger => self.anger = score,
            Emotion::Disgust => self.disgust = score,
            Emotion::Fear => self.fear = score,
            Emotion::Joy => self.joy = score,
            Emotion::Neutral => self.neutral = score,
            Emotion::Sadness => self.sadness = score,
            Emotion::Surprise => self.surprise = score,
        }
    }

    /// The (label, score) pair with the highest score. Ties keep the label
    /// that enumerates first in [`Emotion::ALL`].
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = (Emotion::Anger, self.get(Emotion::Anger));
        for emotion in Emotion::ALL.into_iter().skip(1) {
            let score = self.get(emotion);
            if score > best.1 {
                best = (emotion, score);
            }
        }
        best
    }

    /// Round every score to 3 decimal digits.
    pub fn rounded(mut self) -> Self {
        for emotion in Emotion::ALL {
            self.set(emotion, (self.get(emotion) * 1000.0).round() / 1000.0);
        }
        self
    }

    /// Per-emotion arithmetic mean. `None` for an empty slice.
    pub fn mean(vectors: &[EmotionVector]) -> Option<EmotionVector> {
        if vectors.is_empty() {
            return None;
        }

        let mut sum = EmotionVector::default();
        for vector in vectors {
            for emotion in Emotion::ALL {
                sum.set(emotion, sum.get(emotion) + vector.get(emotion));
            }
        }

        let count = vectors.len() as f64;
        for emotion in Emotion::ALL {
            sum.set(emotion, sum.get(emotion) / count);
        }
        Some(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_picks_highest_score() {
        let v = EmotionVector {
            joy: 0.9,
            sadness: 0.05,
            ..Default::default()
        };
        assert_eq!(v.dominant(), (Emotion::Joy, 0.9));
    }

    #[test]
    fn dominant_tie_breaks_by_enumeration_order() {
        let v = EmotionVector {
            fear: 0.5,
            joy: 0.5,
            sadness: 0.5,
            ..Default::default()
        };
        // fear enumerates before joy and sadness
        assert_eq!(v.dominant().0, Emotion::Fear);
    }

    #[test]
    fn dominant_of_zero_vector_is_first_label() {
        let v = EmotionVector::default();
        assert_eq!(v.dominant(), (Emotion::Anger, 0.0));
    }

    #[test]
    fn neutral_fallback_is_fully_populated() {
        let v = EmotionVector::neutral_fallback();
        assert_eq!(v.neutral, 1.0);
        for emotion in Emotion::ALL {
            let score = v.get(emotion);
            assert!((0.0..=1.0).contains(&score));
        }
        assert_eq!(v.dominant().0, Emotion::Neutral);
    }

    #[test]
    fn rounded_truncates_to_three_decimals() {
        let v = EmotionVector {
            joy: 0.123456,
            anger: 0.9995,
            ..Default::default()
        }
        .rounded();
        assert_eq!(v.joy, 0.123);
        assert_eq!(v.anger, 1.0);
    }

    #[test]
    fn mean_averages_per_emotion() {
        let a = EmotionVector {
            joy: 0.8,
            sadness: 0.2,
            ..Default::default()
        };
        let b = EmotionVector {
            joy: 0.4,
            sadness: 0.6,
            ..Default::default()
        };
        let mean = EmotionVector::mean(&[a, b]).expect("mean");
        assert!((mean.joy - 0.6).abs() < 1e-9);
        assert!((mean.sadness - 0.4).abs() < 1e-9);
        assert_eq!(mean.anger, 0.0);
    }

    #[test]
    fn mean_of_empty_slice_is_none() {
        assert!(EmotionVector::mean(&[]).is_none());
    }

    #[test]
    fn emotion_round_trips_through_str() {
        for emotion in Emotion::ALL {
            let parsed: Emotion = emotion.as_str().parse().expect("parse");
            assert_eq!(parsed, emotion);
        }
        assert!("bliss".parse::<Emotion>().is_err());
    }
}
