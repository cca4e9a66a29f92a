//! Nearest-identity matching with a distance-threshold accept policy.

use thiserror::Error;

use crate::metric;
use crate::roster::Roster;
use crate::types::{Detection, MatchResult};

/// Recognition parameters, constructed once at startup and passed in
/// explicitly. `model_id` and `detector_id` are pass-through identifiers for
/// the external collaborators; the core never interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// Maximum cosine distance at which a match is still accepted.
    /// Lower is stricter.
    pub threshold: f32,
    pub model_id: String,
    pub detector_id: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.40,
            model_id: "VGG-Face".to_string(),
            detector_id: "opencv".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    /// The probe embedding comes from a different model than the roster.
    #[error("probe embedding has dimension {got}, roster uses {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Matches one detection at a time against a roster.
pub struct Matcher {
    threshold: f32,
}

impl Matcher {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self { threshold: config.threshold }
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Linear scan over the roster in load order, keeping the minimum
    /// distance. Ties retain the first identity encountered, so results are
    /// deterministic for a fixed roster. A rejected result never carries the
    /// name of the nearest candidate.
    pub fn best_match(
        &self,
        detection: Detection,
        roster: &Roster,
    ) -> Result<MatchResult, MatchError> {
        let Some(dimension) = roster.dimension() else {
            // Empty roster: nothing can match and no distances are computed.
            return Ok(MatchResult {
                detection,
                identity: None,
                distance: f32::INFINITY,
                confidence: 0.0,
                accepted: false,
            });
        };

        if detection.embedding.len() != dimension {
            return Err(MatchError::DimensionMismatch {
                expected: dimension,
                got: detection.embedding.len(),
            });
        }

        let mut best_name = "";
        let mut best_distance = f32::INFINITY;
        for identity in roster.identities() {
            let distance =
                metric::cosine_distance(&detection.embedding.values, &identity.embedding.values);
            // Strict improvement keeps the first-loaded identity on ties.
            if distance < best_distance {
                best_distance = distance;
                best_name = &identity.name;
            }
        }

        let accepted = best_distance <= self.threshold;
        let identity = accepted.then(|| best_name.to_string());
        Ok(MatchResult {
            detection,
            identity,
            distance: best_distance,
            confidence: metric::confidence(best_distance, self.threshold),
            accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Embedding};

    fn detection(values: Vec<f32>) -> Detection {
        Detection {
            bbox: BoundingBox { x: 0, y: 0, width: 10, height: 10 },
            embedding: Embedding::new(values),
        }
    }

    fn roster() -> Roster {
        Roster::from_entries([
            ("Alice".to_string(), vec![1.0, 0.0, 0.0]),
            ("Bob".to_string(), vec![0.0, 1.0, 0.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_accepts_nearest_identity() {
        let matcher = Matcher::with_threshold(0.40);
        let result = matcher.best_match(detection(vec![0.99, 0.01, 0.0]), &roster()).unwrap();
        assert!(result.accepted);
        assert_eq!(result.identity.as_deref(), Some("Alice"));
        assert!(result.distance < 0.40);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_rejection_does_not_leak_nearest_name() {
        let matcher = Matcher::with_threshold(0.40);
        // Closest to Bob, but far beyond the threshold.
        let result = matcher.best_match(detection(vec![-0.2, 0.3, 0.9]), &roster()).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.identity, None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_exact_threshold_distance_is_accepted() {
        // probe at 45 degrees to Alice: distance = 1 - cos(45°) ≈ 0.2929.
        let probe = vec![1.0, 1.0, 0.0];
        let distance = crate::metric::cosine_distance(&probe, &[1.0, 0.0, 0.0]);
        let matcher = Matcher::with_threshold(distance);
        let result = matcher.best_match(detection(probe), &roster()).unwrap();
        assert!(result.accepted, "distance == threshold must be accepted");
        assert_eq!(result.identity.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_tie_retains_first_loaded_identity() {
        let twins = Roster::from_entries([
            ("First".to_string(), vec![1.0, 0.0]),
            ("Second".to_string(), vec![1.0, 0.0]),
        ])
        .unwrap();
        let matcher = Matcher::with_threshold(0.40);
        let result = matcher.best_match(detection(vec![1.0, 0.0]), &twins).unwrap();
        assert!(result.accepted);
        assert_eq!(result.identity.as_deref(), Some("First"));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let matcher = Matcher::with_threshold(0.40);
        let roster = roster();
        let first = matcher.best_match(detection(vec![0.8, 0.1, 0.1]), &roster).unwrap();
        for _ in 0..10 {
            let again = matcher.best_match(detection(vec![0.8, 0.1, 0.1]), &roster).unwrap();
            assert_eq!(again.identity, first.identity);
            assert_eq!(again.distance, first.distance);
            assert_eq!(again.accepted, first.accepted);
        }
    }

    #[test]
    fn test_empty_roster_short_circuits() {
        let matcher = Matcher::with_threshold(0.40);
        let empty = Roster::default();
        let result = matcher.best_match(detection(vec![1.0, 0.0]), &empty).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.identity, None);
        assert_eq!(result.distance, f32::INFINITY);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let matcher = Matcher::with_threshold(0.40);
        let result = matcher.best_match(detection(vec![1.0, 0.0]), &roster());
        assert!(matches!(
            result,
            Err(MatchError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = RecognitionConfig::default();
        assert_eq!(config.threshold, 0.40);
        assert_eq!(config.model_id, "VGG-Face");
        assert_eq!(config.detector_id, "opencv");
        assert_eq!(Matcher::new(&config).threshold(), 0.40);
    }
}
