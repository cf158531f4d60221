//! Group analytics derived from stored peer scores.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Group, PeerScore, Room};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionMean {
    pub criterion: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub evaluator_group: String,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAnalytics {
    pub group_id: String,
    pub group_name: String,
    pub evaluator_count: usize,
    /// False until `min_evaluators` groups have scored this one.
    pub visible: bool,
    /// Rubric order. Empty when not visible.
    pub criteria: Vec<CriterionMean>,
    pub overall_mean: Option<f64>,
    /// Newest first.
    pub comments: Vec<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOverview {
    pub code: String,
    pub name: String,
    /// Ranked by overall mean, highest first. Hidden groups sort last.
    pub groups: Vec<GroupAnalytics>,
}

/// Compute analytics for `group` from the peer scores that target it.
pub fn analyze_group(
    rubric: &[String],
    group: &Group,
    scores: &[PeerScore],
    min_evaluators: usize,
) -> GroupAnalytics {
    let received: Vec<&PeerScore> = scores.iter().filter(|s| s.target_group == group.id).collect();
    let evaluator_count = received.len();
    let visible = evaluator_count > 0 && evaluator_count >= min_evaluators;

    let criteria: Vec<CriterionMean> = if visible {
        rubric
            .iter()
            .filter_map(|item| {
                let values: Vec<f64> = received
                    .iter()
                    .filter_map(|s| s.scores.get(item).map(|v| f64::from(*v)))
                    .collect();
                if values.is_empty() {
                    return None;
                }
                Some(CriterionMean {
                    criterion: item.clone(),
                    mean: values.iter().sum::<f64>() / values.len() as f64,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let overall_mean = if criteria.is_empty() {
        None
    } else {
        Some(criteria.iter().map(|c| c.mean).sum::<f64>() / criteria.len() as f64)
    };

    let mut comments: Vec<Feedback> = received
        .iter()
        .filter(|s| !s.comment.trim().is_empty())
        .map(|s| Feedback {
            evaluator_group: s.evaluator_group.clone(),
            comment: s.comment.clone(),
            submitted_at: s.submitted_at,
        })
        .collect();
    comments.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    GroupAnalytics {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        evaluator_count,
        visible,
        criteria,
        overall_mean,
        comments,
    }
}

fn rank(a: &GroupAnalytics, b: &GroupAnalytics) -> Ordering {
    match (a.overall_mean, b.overall_mean) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.group_name.cmp(&b.group_name))
}

/// Analytics for every group in `room`, ranked.
pub fn overview(room: &Room, scores: &[PeerScore], min_evaluators: usize) -> RoomOverview {
    let mut groups: Vec<GroupAnalytics> = room
        .groups
        .iter()
        .map(|g| analyze_group(&room.rubric, g, scores, min_evaluators))
        .collect();
    groups.sort_by(rank);
    RoomOverview {
        code: room.code.clone(),
        name: room.name.clone(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn rubric() -> Vec<String> {
        vec!["content".into(), "technical".into()]
    }

    fn group(id: &str) -> Group {
        Group {
            id: id.to_string(),
            name: format!("Team {id}"),
            members: vec![],
            created_at: Utc::now(),
        }
    }

    fn score(from: &str, to: &str, content: u8, technical: u8, comment: &str, age: i64) -> PeerScore {
        let mut scores = BTreeMap::new();
        scores.insert("content".to_string(), content);
        scores.insert("technical".to_string(), technical);
        PeerScore {
            room_code: "ABC123".to_string(),
            evaluator_group: from.to_string(),
            target_group: to.to_string(),
            scores,
            comment: comment.to_string(),
            submitted_at: Utc::now() - Duration::minutes(age),
        }
    }

    #[test]
    fn test_means_from_real_scores() {
        let scores = vec![
            score("g2", "g1", 4, 2, "solid", 10),
            score("g3", "g1", 5, 3, "", 5),
            score("g1", "g2", 1, 1, "weak", 1),
        ];
        let a = analyze_group(&rubric(), &group("g1"), &scores, 1);
        assert!(a.visible);
        assert_eq!(a.evaluator_count, 2);
        assert_eq!(a.criteria[0], CriterionMean { criterion: "content".into(), mean: 4.5 });
        assert_eq!(a.criteria[1].mean, 2.5);
        assert_eq!(a.overall_mean, Some(3.5));
        assert_eq!(a.comments.len(), 1);
        assert_eq!(a.comments[0].comment, "solid");
    }

    #[test]
    fn test_comments_newest_first() {
        let scores = vec![
            score("g2", "g1", 3, 3, "older", 30),
            score("g3", "g1", 3, 3, "newest", 1),
            score("g4", "g1", 3, 3, "middle", 10),
        ];
        let a = analyze_group(&rubric(), &group("g1"), &scores, 1);
        let order: Vec<&str> = a.comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(order, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn test_hidden_below_min_evaluators() {
        let scores = vec![score("g2", "g1", 5, 5, "great", 1)];
        let a = analyze_group(&rubric(), &group("g1"), &scores, 2);
        assert!(!a.visible);
        assert_eq!(a.evaluator_count, 1);
        assert!(a.criteria.is_empty());
        assert_eq!(a.overall_mean, None);
    }

    #[test]
    fn test_no_scores_is_never_visible() {
        let a = analyze_group(&rubric(), &group("g1"), &[], 0);
        assert!(!a.visible);
        assert_eq!(a.overall_mean, None);
    }

    #[test]
    fn test_overview_ranks_by_overall_mean() {
        let room = Room {
            code: "ABC123".to_string(),
            name: "Capstone".to_string(),
            owner_id: "t".to_string(),
            rubric: rubric(),
            members: vec![],
            groups: vec![group("g1"), group("g2"), group("g3")],
            created_at: Utc::now(),
        };
        let scores = vec![
            score("g2", "g1", 2, 2, "", 1),
            score("g1", "g2", 5, 4, "", 1),
        ];
        let ov = overview(&room, &scores, 1);
        let order: Vec<&str> = ov.groups.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(order, vec!["g2", "g1", "g3"]);
    }
}
