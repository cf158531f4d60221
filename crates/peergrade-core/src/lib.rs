//! peergrade core library
//!
//! Rubric scoring, grade classification, the evaluation record builder and
//! the classroom application-state service.
//!
//! ## Key Components
//!
//! - `rubric`: score aggregation over the twelve sub-criteria
//! - `grade`: letter classification and summary buckets
//! - `record`: create/patch builders that keep derived fields consistent
//! - `service`: `EvaluationService` over an `EvaluationStore`
//! - `classroom`: rooms, groups, peer scores and analytics over a `KeyValueStore`

pub mod avatar;
pub mod classroom;
pub mod error;
pub mod grade;
pub mod obs;
pub mod record;
pub mod rubric;
pub mod service;
pub mod summary;
pub mod telemetry;

pub use avatar::{avatar_seed, avatar_url, DEFAULT_AVATAR_BASE_URL};
pub use classroom::{
    Classroom, ClassroomConfig, ClassroomError, Group, GroupAnalytics, PeerScore, Role, Room,
    RoomOverview, User,
};
pub use error::{EvalError, Result};
pub use grade::{classify, GradeBucket, GradeDistribution};
pub use record::{apply_patch, build_record, EvaluationPatch, NewEvaluation};
pub use rubric::{aggregate, percentage, RubricScores, ScoresInput, MAX_TOTAL_SCORE};
pub use service::EvaluationService;
pub use summary::{summarize, AverageScores, EvaluationSummary};

pub use peergrade_state::{
    EvaluationFilter, EvaluationId, EvaluationKind, EvaluationRecord, EvaluationStatus, Grade,
};
