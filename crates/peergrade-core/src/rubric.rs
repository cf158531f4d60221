//! Rubric definition and score aggregation.
//!
//! The rubric has three categories (content, technical, presentation), each
//! with four sub-criteria and a nominal maximum of 40 points, for 120 in
//! total. Sub-criteria ranges are not validated; callers are trusted.

use peergrade_state::{ContentScores, PresentationScores, ScoreSheet, TechnicalScores};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Nominal maximum per category.
pub const CATEGORY_MAX_SCORE: f64 = 40.0;

/// Maximum total across all three categories.
pub const MAX_TOTAL_SCORE: f64 = 120.0;

/// A rubric category that can be summed into a subtotal.
pub trait Criteria {
    fn subtotal(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCriteria {
    pub clarity: f64,
    pub completeness: f64,
    pub relevance: f64,
    pub innovation: f64,
}

impl Criteria for ContentCriteria {
    fn subtotal(&self) -> f64 {
        self.clarity + self.completeness + self.relevance + self.innovation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalCriteria {
    pub design: f64,
    pub implementation: f64,
    pub testing: f64,
    pub documentation: f64,
}

impl Criteria for TechnicalCriteria {
    fn subtotal(&self) -> f64 {
        self.design + self.implementation + self.testing + self.documentation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationCriteria {
    pub delivery: f64,
    pub visual_aids: f64,
    pub answering_questions: f64,
    pub time_management: f64,
}

impl Criteria for PresentationCriteria {
    fn subtotal(&self) -> f64 {
        self.delivery + self.visual_aids + self.answering_questions + self.time_management
    }
}

/// The complete set of twelve sub-criteria values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub content: ContentCriteria,
    pub technical: TechnicalCriteria,
    pub presentation: PresentationCriteria,
}

impl RubricScores {
    /// Every sub-criterion set to the same value.
    pub fn uniform(value: f64) -> Self {
        Self {
            content: ContentCriteria {
                clarity: value,
                completeness: value,
                relevance: value,
                innovation: value,
            },
            technical: TechnicalCriteria {
                design: value,
                implementation: value,
                testing: value,
                documentation: value,
            },
            presentation: PresentationCriteria {
                delivery: value,
                visual_aids: value,
                answering_questions: value,
                time_management: value,
            },
        }
    }
}

/// Output of [`aggregate`]: the stored score sheet and its total.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub sheet: ScoreSheet,
    pub total_score: f64,
}

/// Sum each category into its subtotal and the subtotals into a total.
pub fn aggregate(scores: &RubricScores) -> Aggregate {
    let c = scores.content;
    let t = scores.technical;
    let p = scores.presentation;

    let sheet = ScoreSheet {
        content: ContentScores {
            clarity: c.clarity,
            completeness: c.completeness,
            relevance: c.relevance,
            innovation: c.innovation,
            subtotal: c.subtotal(),
            max_score: CATEGORY_MAX_SCORE,
        },
        technical: TechnicalScores {
            design: t.design,
            implementation: t.implementation,
            testing: t.testing,
            documentation: t.documentation,
            subtotal: t.subtotal(),
            max_score: CATEGORY_MAX_SCORE,
        },
        presentation: PresentationScores {
            delivery: p.delivery,
            visual_aids: p.visual_aids,
            answering_questions: p.answering_questions,
            time_management: p.time_management,
            subtotal: p.subtotal(),
            max_score: CATEGORY_MAX_SCORE,
        },
    };
    let total_score =
        sheet.content.subtotal + sheet.technical.subtotal + sheet.presentation.subtotal;

    Aggregate { sheet, total_score }
}

/// `total / 120 * 100`
pub fn percentage(total_score: f64) -> f64 {
    total_score / MAX_TOTAL_SCORE * 100.0
}

// ---------------------------------------------------------------------------
// Wire input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInput {
    pub clarity: Option<f64>,
    pub completeness: Option<f64>,
    pub relevance: Option<f64>,
    pub innovation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalInput {
    pub design: Option<f64>,
    pub implementation: Option<f64>,
    pub testing: Option<f64>,
    pub documentation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationInput {
    pub delivery: Option<f64>,
    pub visual_aids: Option<f64>,
    pub answering_questions: Option<f64>,
    pub time_management: Option<f64>,
}

/// Scores as received from a caller, where any field may be missing.
///
/// [`ScoresInput::into_complete`] turns it into [`RubricScores`] or reports
/// every missing sub-criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoresInput {
    pub content: Option<ContentInput>,
    pub technical: Option<TechnicalInput>,
    pub presentation: Option<PresentationInput>,
}

impl From<RubricScores> for ScoresInput {
    fn from(s: RubricScores) -> Self {
        Self {
            content: Some(ContentInput {
                clarity: Some(s.content.clarity),
                completeness: Some(s.content.completeness),
                relevance: Some(s.content.relevance),
                innovation: Some(s.content.innovation),
            }),
            technical: Some(TechnicalInput {
                design: Some(s.technical.design),
                implementation: Some(s.technical.implementation),
                testing: Some(s.technical.testing),
                documentation: Some(s.technical.documentation),
            }),
            presentation: Some(PresentationInput {
                delivery: Some(s.presentation.delivery),
                visual_aids: Some(s.presentation.visual_aids),
                answering_questions: Some(s.presentation.answering_questions),
                time_management: Some(s.presentation.time_management),
            }),
        }
    }
}

struct Missing(Vec<&'static str>);

impl Missing {
    fn take(&mut self, value: Option<f64>, path: &'static str) -> f64 {
        value.unwrap_or_else(|| {
            self.0.push(path);
            0.0
        })
    }
}

impl ScoresInput {
    /// Require all twelve sub-criteria.
    pub fn into_complete(self) -> Result<RubricScores, EvalError> {
        let mut missing = Missing(Vec::new());
        let c = self.content.unwrap_or_default();
        let t = self.technical.unwrap_or_default();
        let p = self.presentation.unwrap_or_default();

        let scores = RubricScores {
            content: ContentCriteria {
                clarity: missing.take(c.clarity, "scores.content.clarity"),
                completeness: missing.take(c.completeness, "scores.content.completeness"),
                relevance: missing.take(c.relevance, "scores.content.relevance"),
                innovation: missing.take(c.innovation, "scores.content.innovation"),
            },
            technical: TechnicalCriteria {
                design: missing.take(t.design, "scores.technical.design"),
                implementation: missing.take(t.implementation, "scores.technical.implementation"),
                testing: missing.take(t.testing, "scores.technical.testing"),
                documentation: missing.take(t.documentation, "scores.technical.documentation"),
            },
            presentation: PresentationCriteria {
                delivery: missing.take(p.delivery, "scores.presentation.delivery"),
                visual_aids: missing.take(p.visual_aids, "scores.presentation.visualAids"),
                answering_questions: missing.take(
                    p.answering_questions,
                    "scores.presentation.answeringQuestions",
                ),
                time_management: missing
                    .take(p.time_management, "scores.presentation.timeManagement"),
            },
        };

        if missing.0.is_empty() {
            Ok(scores)
        } else {
            Err(EvalError::Validation(format!(
                "missing sub-criteria: {}",
                missing.0.join(", ")
            )))
        }
    }
}
