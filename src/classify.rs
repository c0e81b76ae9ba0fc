//! Multinomial logistic classification of statistics windows
//!
//! Fixed-coefficient regression over the windowed statistics, one table
//! per feature set. The last class is the reference category of the
//! regression: its score is implicitly 1, so only four coefficient
//! columns exist and probabilities follow from normalizing against
//! `1 + sum(exp(scores))`.

use crate::config::FeatureSet;
use crate::stats::{EXTENDED_STAT_COUNT, LEGACY_STAT_COUNT};

/// Class labels in table column order.
pub const CLASS_NAMES: [&str; 5] = ["solo", "choir", "bell", "instrumental", "speech"];

/// Rows: one per input statistic plus a final bias row.
const LEGACY_COEFFS: [[f32; 4]; LEGACY_STAT_COUNT + 1] = [
    [-2.54360, 1.20630, 1.25340, 1.02670],
    [0.01410, 0.01860, 0.00570, 0.02100],
    [0.03250, 0.04000, -0.05880, -0.07790],
    [-0.00070, 0.00770, 0.00980, -0.03070],
    [-45.79580, -17.22620, -57.71280, 85.87760],
    [-0.16760, -0.27780, -1.14750, -0.71080],
    [-0.24500, -0.61390, -2.13820, 0.05400],
    [-0.28430, -0.60280, -3.08030, -0.43420],
    [-0.40990, -1.52120, -1.16710, -0.98170],
    [9.72240, -0.61690, 10.70270, 2.26640],
];

const EXTENDED_COEFFS: [[f32; 4]; EXTENDED_STAT_COUNT + 1] = [
    [7.2167803598, 6.7546674784, 2.4266379892, -2.4717760029],
    [-3.5872281700, 0.6072347911, 1.8414028714, 2.2034845670],
    [-3.6282955710, 4.0023822690, 24.5460436473, 9.8999564256],
    [1.5852707243, 0.8001852249, -3.0620514025, 0.6355285476],
    [13.4272833985, -6.5855565616, -15.3262530286, -5.7903571674],
    [-1.1057892874, -2.1950890900, 1.5537406267, 1.5332794847],
    [-0.0938808825, -0.1271246065, -0.1365147948, -0.0805778048],
    [0.0329521240, -0.0907322511, -0.0545751082, 0.0301488257],
    [-0.0127837404, -0.1146084664, -0.0472986272, 0.0686640993],
    [-48.8447183118, -43.3820036434, -118.4792918921, 19.6619504215],
    [1.1102278505, -5.9568952783, -8.1252887526, -5.7130277204],
    [-0.0271290595, 0.0941640111, 0.3104335501, 0.0046523263],
    [0.2328909073, 0.3577255579, -0.4705257276, -0.2329033807],
    [0.2366534740, 0.2733698412, 0.1162459615, -0.2195797060],
    [-0.7064083607, -0.3722998341, -3.3327763422, -3.2676743146],
    [0.0810537624, -0.9897814477, -0.1841711166, 0.1095410510],
    [-0.2802757255, -1.3975128828, -4.3334540597, -1.7647213147],
];

pub struct Classifier {
    coeffs: &'static [[f32; 4]],
    input_count: usize,
}

impl Classifier {
    pub fn new(feature_set: FeatureSet) -> Self {
        match feature_set {
            FeatureSet::Legacy => Self {
                coeffs: &LEGACY_COEFFS,
                input_count: LEGACY_STAT_COUNT,
            },
            FeatureSet::Extended => Self {
                coeffs: &EXTENDED_COEFFS,
                input_count: EXTENDED_STAT_COUNT,
            },
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Probability of each class for one statistics vector.
    pub fn process(&self, input: &[f32]) -> [f32; 5] {
        debug_assert_eq!(input.len(), self.input_count);

        let mut distribution = [0.0_f32; 5];
        let mut sum = 1.0_f32;
        for class in 0..4 {
            let mut score = 0.0_f32;
            for (stat, value) in input.iter().enumerate() {
                score += self.coeffs[stat][class] * value;
            }
            let t = (score + self.coeffs[self.input_count][class]).exp();
            distribution[class] = t;
            sum += t;
        }
        for p in distribution.iter_mut().take(4) {
            *p /= sum;
        }
        distribution[4] = 1.0 / sum;
        distribution
    }
}

/// Center of mass of the distribution on the class axis, in [0, 1].
///
/// Smooth segment boundaries show up as values between class positions.
pub fn average_class(distribution: &[f32; 5]) -> f32 {
    let weighted: f32 = distribution
        .iter()
        .enumerate()
        .map(|(class, p)| p * class as f32)
        .sum();
    weighted / (distribution.len() - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_is_distribution(dist: &[f32; 5]) {
        let sum: f32 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "probabilities sum to {}", sum);
        for p in dist {
            assert!((0.0..=1.0).contains(p), "probability out of range: {}", p);
        }
    }

    #[test]
    fn test_legacy_output_is_a_distribution() {
        let classifier = Classifier::new(FeatureSet::Legacy);
        let input = [1.5, 0.2, 0.1, 0.05, 0.01, 0.002, 0.001, 0.001, 0.8];
        assert_is_distribution(&classifier.process(&input));
    }

    #[test]
    fn test_extended_output_is_a_distribution() {
        let classifier = Classifier::new(FeatureSet::Extended);
        let input = vec![0.1_f32; EXTENDED_STAT_COUNT];
        assert_is_distribution(&classifier.process(&input));
    }

    #[test]
    fn test_legacy_zero_input_distribution() {
        // With all statistics zero only the bias terms act; the known
        // result splits mass between "solo" and "bell"
        let classifier = Classifier::new(FeatureSet::Legacy);
        let dist = classifier.process(&[0.0; LEGACY_STAT_COUNT]);

        assert_is_distribution(&dist);
        assert!((dist[0] - 0.2727).abs() < 1e-3, "solo: {}", dist[0]);
        assert!((dist[2] - 0.7272).abs() < 1e-3, "bell: {}", dist[2]);
        assert!(dist[1] < 1e-4, "choir: {}", dist[1]);
        assert!(dist[3] < 1e-3, "instrumental: {}", dist[3]);
        assert!(dist[4] < 1e-4, "speech: {}", dist[4]);
    }

    #[test]
    fn test_average_class_bounds() {
        assert_eq!(average_class(&[1.0, 0.0, 0.0, 0.0, 0.0]), 0.0);
        assert_eq!(average_class(&[0.0, 0.0, 0.0, 0.0, 1.0]), 1.0);
        let uniform = [0.2; 5];
        assert!((average_class(&uniform) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_class_names_align_with_columns() {
        assert_eq!(CLASS_NAMES.len(), 5);
        assert_eq!(CLASS_NAMES[2], "bell");
        assert_eq!(CLASS_NAMES[4], "speech");
    }
}
