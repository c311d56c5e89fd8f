//! Turns a validated coordinate into ranked state predictions.

use std::sync::Arc;

use geo_state_geography_models::{Coordinate, NigerianState, STATE_COUNT};
use geo_state_inference_models::{RankedPrediction, StatePrediction};

use crate::{Artifacts, InferenceError};

/// Numerically stable softmax: the max score is subtracted before
/// exponentiating, so the largest term is always `exp(0) = 1`.
///
/// # Errors
///
/// Returns [`InferenceError::EmptyScores`] for an empty slice and
/// [`InferenceError::NonFiniteScore`] if any score is NaN or infinite.
pub fn softmax(scores: &[f64]) -> Result<Vec<f64>, InferenceError> {
    if scores.is_empty() {
        return Err(InferenceError::EmptyScores);
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(InferenceError::NonFiniteScore { index });
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    Ok(exps.into_iter().map(|e| e / sum).collect())
}

/// Scores coordinates against a loaded scaler and classifier.
///
/// Cheap to clone; all clones share the same [`Artifacts`].
#[derive(Clone)]
pub struct Predictor {
    artifacts: Arc<Artifacts>,
}

impl Predictor {
    #[must_use]
    pub const fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Full probability distribution over every label, in label index order,
    /// as percentages.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if scaling or scoring fails, or the
    /// classifier returns a score vector of the wrong length.
    pub fn distribution(
        &self,
        coordinate: Coordinate,
    ) -> Result<Vec<StatePrediction>, InferenceError> {
        let features = self
            .artifacts
            .scaler()
            .transform(&coordinate.to_features())?;
        let scores = self.artifacts.classifier().scores(&features)?;

        if scores.len() != STATE_COUNT {
            return Err(InferenceError::ScoreCount {
                expected: STATE_COUNT,
                found: scores.len(),
            });
        }

        let probabilities = softmax(&scores)?;

        Ok(NigerianState::all()
            .iter()
            .zip(probabilities)
            .map(|(state, p)| StatePrediction {
                state: *state,
                confidence: p * 100.0,
            })
            .collect())
    }

    /// The three most likely states for `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] under the same conditions as
    /// [`Predictor::distribution`].
    pub fn predict(&self, coordinate: Coordinate) -> Result<RankedPrediction, InferenceError> {
        let ranked = RankedPrediction::rank(self.distribution(coordinate)?);

        if let Some(top) = ranked.top() {
            log::debug!(
                "Predicted {} at {coordinate} ({:.1}%)",
                top.state,
                top.confidence
            );
        }

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classifier, Scaler};

    /// Ignores its input and returns fixed scores, whatever their length.
    struct FixedScores(Vec<f64>);

    impl Classifier for FixedScores {
        fn input_len(&self) -> usize {
            2
        }

        fn output_len(&self) -> usize {
            STATE_COUNT
        }

        fn scores(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            if features.len() != 2 {
                return Err(InferenceError::FeatureCount {
                    expected: 2,
                    found: features.len(),
                });
            }
            Ok(self.0.clone())
        }
    }

    /// Scores each label by negative squared distance to a point derived
    /// from its index, so different coordinates favor different labels.
    struct IndexedGrid;

    impl Classifier for IndexedGrid {
        fn input_len(&self) -> usize {
            2
        }

        fn output_len(&self) -> usize {
            STATE_COUNT
        }

        #[allow(clippy::cast_precision_loss)]
        fn scores(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok((0..STATE_COUNT)
                .map(|i| {
                    let cx = (i % 6) as f64 / 3.0 - 1.0;
                    let cy = (i / 6) as f64 / 3.0 - 1.0;
                    -((features[0] - cx).powi(2) + (features[1] - cy).powi(2)) * 4.0
                })
                .collect())
        }
    }

    fn scaler() -> Scaler {
        Scaler::Standard {
            mean: vec![9.0, 8.5],
            scale: vec![2.5, 3.25],
        }
    }

    fn predictor(classifier: impl Classifier + 'static) -> Predictor {
        Predictor::new(Arc::new(
            Artifacts::new(scaler(), Box::new(classifier)).unwrap(),
        ))
    }

    fn abuja_heavy() -> Vec<f64> {
        let mut scores = vec![0.0; STATE_COUNT];
        scores[NigerianState::Abuja.index()] = 8.0;
        scores[NigerianState::Niger.index()] = 2.0;
        scores[NigerianState::Kogi.index()] = 1.0;
        scores
    }

    fn grid_coordinates() -> Vec<Coordinate> {
        let mut coordinates = Vec::new();
        for lat_step in 0..=10 {
            for lon_step in 0..=13 {
                coordinates.push(
                    Coordinate::new(4.0 + f64::from(lat_step), 2.0 + f64::from(lon_step))
                        .unwrap(),
                );
            }
        }
        coordinates
    }

    #[test]
    fn softmax_is_stable_for_large_scores() {
        let probs = softmax(&[1000.0, 1000.0, 999.0]).unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((probs[0] - probs[1]).abs() < 1e-15);
        assert!(probs[2] < probs[0]);
    }

    #[test]
    fn softmax_rejects_empty_and_non_finite() {
        assert_eq!(softmax(&[]), Err(InferenceError::EmptyScores));
        assert_eq!(
            softmax(&[1.0, f64::NAN]),
            Err(InferenceError::NonFiniteScore { index: 1 })
        );
        assert_eq!(
            softmax(&[f64::INFINITY]),
            Err(InferenceError::NonFiniteScore { index: 0 })
        );
    }

    #[test]
    fn abuja_defaults_predict_abuja() {
        let ranked = predictor(FixedScores(abuja_heavy()))
            .predict(Coordinate::abuja())
            .unwrap();

        let top = ranked.top().unwrap();
        assert_eq!(top.state, NigerianState::Abuja);
        assert!(top.confidence > 50.0, "confidence {}", top.confidence);

        let states: Vec<_> = ranked.predictions().iter().map(|p| p.state).collect();
        assert_eq!(
            states,
            vec![
                NigerianState::Abuja,
                NigerianState::Niger,
                NigerianState::Kogi
            ]
        );
    }

    #[test]
    fn every_valid_coordinate_yields_three_sorted_entries() {
        let predictor = predictor(IndexedGrid);

        for coordinate in grid_coordinates() {
            let ranked = predictor.predict(coordinate).unwrap();
            assert_eq!(ranked.len(), 3, "at {coordinate}");

            for p in ranked.predictions() {
                assert!(NigerianState::all().contains(&p.state));
                assert!((0.0..=100.0).contains(&p.confidence), "at {coordinate}");
            }
            for pair in ranked.predictions().windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence, "at {coordinate}");
            }
        }
    }

    #[test]
    fn distribution_sums_to_one_hundred() {
        let predictor = predictor(IndexedGrid);

        for coordinate in grid_coordinates() {
            let distribution = predictor.distribution(coordinate).unwrap();
            assert_eq!(distribution.len(), STATE_COUNT);
            let total: f64 = distribution.iter().map(|p| p.confidence).sum();
            assert!((total - 100.0).abs() < 0.01, "{total} at {coordinate}");
        }
    }

    #[test]
    fn distribution_follows_label_index_order() {
        let distribution = predictor(FixedScores(abuja_heavy()))
            .distribution(Coordinate::abuja())
            .unwrap();
        for (i, p) in distribution.iter().enumerate() {
            assert_eq!(p.state.index(), i);
        }
    }

    #[test]
    fn uniform_scores_rank_by_index() {
        let ranked = predictor(FixedScores(vec![0.0; STATE_COUNT]))
            .predict(Coordinate::abuja())
            .unwrap();
        let states: Vec<_> = ranked.predictions().iter().map(|p| p.state).collect();
        assert_eq!(
            states,
            vec![
                NigerianState::Abia,
                NigerianState::Abuja,
                NigerianState::Adamawa
            ]
        );
    }

    #[test]
    fn predict_is_deterministic() {
        let predictor = predictor(IndexedGrid);
        let coordinate = Coordinate::new(6.5244, 3.3792).unwrap();
        assert_eq!(
            predictor.predict(coordinate).unwrap(),
            predictor.predict(coordinate).unwrap()
        );
    }

    #[test]
    fn wrong_score_count_is_an_inference_error() {
        let predictor = predictor(FixedScores(vec![1.0; 5]));
        assert_eq!(
            predictor.predict(Coordinate::abuja()),
            Err(InferenceError::ScoreCount {
                expected: STATE_COUNT,
                found: 5
            })
        );
    }

    #[test]
    fn non_finite_scores_are_an_inference_error() {
        let mut scores = abuja_heavy();
        scores[3] = f64::NAN;
        assert_eq!(
            predictor(FixedScores(scores)).predict(Coordinate::abuja()),
            Err(InferenceError::NonFiniteScore { index: 3 })
        );
    }
}
