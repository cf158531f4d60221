//! Documents stored on the key-value port.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rubric used when a room is created without one.
pub const DEFAULT_RUBRIC: [&str; 3] = ["content", "technical", "presentation"];

/// Inclusive bounds of a peer score.
pub const PEER_SCORE_MIN: u8 = 1;
pub const PEER_SCORE_MAX: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar_seed: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    /// User ids, in join order.
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub code: String,
    pub name: String,
    pub owner_id: String,
    pub rubric: Vec<String>,
    pub members: Vec<String>,
    pub groups: Vec<Group>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_of(&self, user_id: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.members.iter().any(|m| m == user_id))
    }

    /// Move `user_id` into `group_id`, leaving any other group in the room.
    ///
    /// Returns false if the group does not exist.
    pub(crate) fn place_in_group(&mut self, group_id: &str, user_id: &str) -> bool {
        if self.group(group_id).is_none() {
            return false;
        }
        for group in &mut self.groups {
            if group.id == group_id {
                if !group.members.iter().any(|m| m == user_id) {
                    group.members.push(user_id.to_string());
                }
            } else {
                group.members.retain(|m| m != user_id);
            }
        }
        true
    }
}

/// One group's scores for another group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerScore {
    pub room_code: String,
    pub evaluator_group: String,
    pub target_group: String,
    /// Rubric item to score in `1..=5`.
    pub scores: BTreeMap<String, u8>,
    #[serde(default)]
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

pub(crate) fn user_key(user_id: &str) -> String {
    format!("users/{user_id}")
}

pub(crate) fn room_key(code: &str) -> String {
    format!("rooms/{code}")
}

pub(crate) fn peer_scores_prefix(code: &str) -> String {
    format!("peer-scores/{code}/")
}

pub(crate) fn peer_score_key(code: &str, evaluator: &str, target: &str) -> String {
    format!("peer-scores/{code}/{evaluator}/{target}")
}
