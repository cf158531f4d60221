//! Letter grade classification and summary buckets.
//!
//! Two representations are kept separate: [`classify`] is
//! letter-exact (B+ and B differ), while [`GradeBucket`] merges the plus and
//! plain letters for the summary histogram.

use peergrade_state::Grade;
use serde::{Deserialize, Serialize};

/// Inclusive lower bounds, highest first. First match wins.
const THRESHOLDS: [(f64, Grade); 7] = [
    (80.0, Grade::A),
    (75.0, Grade::BPlus),
    (70.0, Grade::B),
    (65.0, Grade::CPlus),
    (60.0, Grade::C),
    (55.0, Grade::DPlus),
    (50.0, Grade::D),
];

/// Map a percentage to its letter grade.
///
/// Total over all inputs; NaN falls through to F.
pub fn classify(percentage: f64) -> Grade {
    THRESHOLDS
        .iter()
        .find(|(bound, _)| percentage >= *bound)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

/// Merged grade bucket used by the summary histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeBucket {
    A,
    B,
    C,
    D,
    F,
}

impl From<Grade> for GradeBucket {
    fn from(grade: Grade) -> Self {
        match grade {
            Grade::A => GradeBucket::A,
            Grade::BPlus | Grade::B => GradeBucket::B,
            Grade::CPlus | Grade::C => GradeBucket::C,
            Grade::DPlus | Grade::D => GradeBucket::D,
            Grade::F => GradeBucket::F,
        }
    }
}

/// Count of evaluations per merged bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: u64,
    #[serde(rename = "B")]
    pub b: u64,
    #[serde(rename = "C")]
    pub c: u64,
    #[serde(rename = "D")]
    pub d: u64,
    #[serde(rename = "F")]
    pub f: u64,
}

impl GradeDistribution {
    pub fn record(&mut self, grade: Grade) {
        match GradeBucket::from(grade) {
            GradeBucket::A => self.a += 1,
            GradeBucket::B => self.b += 1,
            GradeBucket::C => self.c += 1,
            GradeBucket::D => self.d += 1,
            GradeBucket::F => self.f += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.a + self.b + self.c + self.d + self.f
    }
}

impl FromIterator<Grade> for GradeDistribution {
    fn from_iter<I: IntoIterator<Item = Grade>>(iter: I) -> Self {
        let mut dist = GradeDistribution::default();
        for grade in iter {
            dist.record(grade);
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_higher_bracket() {
        assert_eq!(classify(80.0), Grade::A);
        assert_eq!(classify(79.999), Grade::BPlus);
        assert_eq!(classify(75.0), Grade::BPlus);
        assert_eq!(classify(74.999), Grade::B);
        assert_eq!(classify(70.0), Grade::B);
        assert_eq!(classify(65.0), Grade::CPlus);
        assert_eq!(classify(60.0), Grade::C);
        assert_eq!(classify(55.0), Grade::DPlus);
        assert_eq!(classify(50.0), Grade::D);
        assert_eq!(classify(49.999), Grade::F);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(100.0), Grade::A);
        assert_eq!(classify(150.0), Grade::A);
        assert_eq!(classify(0.0), Grade::F);
        assert_eq!(classify(-10.0), Grade::F);
        assert_eq!(classify(f64::NAN), Grade::F);
    }

    #[test]
    fn test_classify_is_monotone_as_percentage_decreases() {
        // Grade derives Ord with A smallest, so "quality non-increasing"
        // means the Ord value is non-decreasing as p goes down.
        let mut previous = classify(100.0);
        let mut p = 100.0;
        while p >= 0.0 {
            let g = classify(p);
            assert!(g >= previous, "grade improved from {previous} to {g} at {p}");
            previous = g;
            p -= 0.125;
        }
    }

    #[test]
    fn test_every_grade_is_reachable() {
        let seen: std::collections::BTreeSet<Grade> =
            (0..=100).map(|p| classify(p as f64)).collect();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_bucket_merges_plus_and_plain() {
        assert_eq!(GradeBucket::from(Grade::BPlus), GradeBucket::B);
        assert_eq!(GradeBucket::from(Grade::B), GradeBucket::B);
        assert_eq!(GradeBucket::from(Grade::CPlus), GradeBucket::C);
        assert_eq!(GradeBucket::from(Grade::DPlus), GradeBucket::D);
        assert_eq!(GradeBucket::from(Grade::A), GradeBucket::A);
        assert_eq!(GradeBucket::from(Grade::F), GradeBucket::F);
    }

    #[test]
    fn test_distribution_counts() {
        let dist: GradeDistribution = [
            Grade::A,
            Grade::BPlus,
            Grade::B,
            Grade::C,
            Grade::DPlus,
            Grade::F,
            Grade::F,
        ]
        .into_iter()
        .collect();
        assert_eq!(dist.a, 1);
        assert_eq!(dist.b, 2);
        assert_eq!(dist.c, 1);
        assert_eq!(dist.d, 1);
        assert_eq!(dist.f, 2);
        assert_eq!(dist.total(), 7);

        let json = serde_json::to_value(dist).unwrap();
        assert_eq!(json, serde_json::json!({"A": 1, "B": 2, "C": 1, "D": 1, "F": 2}));
    }
}
