//! Classroom application state: users, rooms, groups and peer scores.
//!
//! All state lives behind a [`KeyValueStore`] as JSON documents. Reads and
//! writes are plain get/put with no locking, so concurrent edits to the same
//! room are last-writer-wins.

pub mod analytics;
pub mod code;
mod error;
pub mod model;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use peergrade_state::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

pub use analytics::{CriterionMean, Feedback, GroupAnalytics, RoomOverview};
pub use error::{ClassroomError, Result};
pub use model::{Group, PeerScore, Role, Room, User, DEFAULT_RUBRIC};

use crate::avatar::avatar_seed;
use crate::obs;
use code::{generate_room_code, normalize_code};
use model::{peer_score_key, peer_scores_prefix, room_key, user_key, PEER_SCORE_MAX, PEER_SCORE_MIN};

/// Attempts at drawing an unused room code before giving up.
const ROOM_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassroomConfig {
    /// Evaluator groups required before a group's means are shown.
    pub min_evaluators: usize,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self { min_evaluators: 1 }
    }
}

pub struct Classroom<K: KeyValueStore + ?Sized> {
    store: Arc<K>,
    config: ClassroomConfig,
}

impl<K: KeyValueStore + ?Sized> Clone for Classroom<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClassroomError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

impl<K: KeyValueStore + ?Sized> Classroom<K> {
    pub fn new(store: Arc<K>, config: ClassroomConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> ClassroomConfig {
        self.config
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, doc: &T) -> Result<()> {
        self.store.put(key, serde_json::to_value(doc)?).await?;
        Ok(())
    }

    /// Register a user for this session.
    #[instrument(skip(self))]
    pub async fn login(&self, name: &str, role: Role) -> Result<User> {
        let name = required(name, "name")?;
        let id = Uuid::new_v4().to_string();
        let user = User {
            avatar_seed: avatar_seed(&name, &id),
            id,
            name,
            role,
            created_at: Utc::now(),
        };
        self.save(&user_key(&user.id), &user).await?;
        debug!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    pub async fn user(&self, user_id: &str) -> Result<User> {
        self.load(&user_key(user_id))
            .await?
            .ok_or_else(|| ClassroomError::NotFound(format!("user {user_id}")))
    }

    pub async fn room(&self, code: &str) -> Result<Room> {
        let code = normalize_code(code);
        self.load(&room_key(&code))
            .await?
            .ok_or_else(|| ClassroomError::NotFound(format!("room {code}")))
    }

    async fn unused_room_code(&self) -> Result<String> {
        for _ in 0..ROOM_CODE_ATTEMPTS {
            let code = generate_room_code();
            if self.store.get(&room_key(&code)).await?.is_none() {
                return Ok(code);
            }
        }
        Err(ClassroomError::Conflict(
            "could not allocate an unused room code".to_string(),
        ))
    }

    /// Open a new room. Only teachers may do this; the owner joins it.
    #[instrument(skip(self, rubric_items))]
    pub async fn create_room(
        &self,
        owner_id: &str,
        name: &str,
        rubric_items: &[String],
    ) -> Result<Room> {
        let owner = self.user(owner_id).await?;
        if owner.role != Role::Teacher {
            return Err(ClassroomError::Forbidden(
                "only teachers can create rooms".to_string(),
            ));
        }
        let name = required(name, "name")?;

        let mut rubric: Vec<String> = Vec::new();
        for item in rubric_items {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            if rubric.iter().any(|r| r == item) {
                return Err(ClassroomError::Validation(format!(
                    "duplicate rubric item: {item}"
                )));
            }
            rubric.push(item.to_string());
        }
        if rubric.is_empty() {
            rubric = DEFAULT_RUBRIC.iter().map(|s| s.to_string()).collect();
        }

        let room = Room {
            code: self.unused_room_code().await?,
            name,
            owner_id: owner.id.clone(),
            rubric,
            members: vec![owner.id],
            groups: Vec::new(),
            created_at: Utc::now(),
        };
        self.save(&room_key(&room.code), &room).await?;
        obs::emit_room_created(&room.code, &room.owner_id);
        Ok(room)
    }

    /// Join a room by code. Joining twice is a no-op.
    pub async fn join_room(&self, code: &str, user_id: &str) -> Result<Room> {
        let user = self.user(user_id).await?;
        let mut room = self.room(code).await?;
        if !room.is_member(&user.id) {
            room.members.push(user.id);
            self.save(&room_key(&room.code), &room).await?;
        }
        Ok(room)
    }

    /// Create a group in the room and move the creator into it.
    #[instrument(skip(self))]
    pub async fn create_group(&self, code: &str, name: &str, creator_id: &str) -> Result<Group> {
        let mut room = self.room(code).await?;
        if !room.is_member(creator_id) {
            return Err(ClassroomError::Forbidden(format!(
                "user {creator_id} is not a member of room {}",
                room.code
            )));
        }
        let name = required(name, "name")?;
        if room.groups.iter().any(|g| g.name.eq_ignore_ascii_case(&name)) {
            return Err(ClassroomError::Conflict(format!(
                "group {name} already exists in room {}",
                room.code
            )));
        }

        let group_id = Uuid::new_v4().to_string();
        room.groups.push(Group {
            id: group_id.clone(),
            name,
            members: Vec::new(),
            created_at: Utc::now(),
        });
        room.place_in_group(&group_id, creator_id);
        self.save(&room_key(&room.code), &room).await?;
        obs::emit_group_created(&room.code, &group_id);

        room.group(&group_id)
            .cloned()
            .ok_or_else(|| ClassroomError::NotFound(format!("group {group_id}")))
    }

    /// Join a group, leaving whatever group the user was in before.
    pub async fn join_group(&self, code: &str, group_id: &str, user_id: &str) -> Result<Group> {
        let mut room = self.room(code).await?;
        if !room.is_member(user_id) {
            return Err(ClassroomError::Forbidden(format!(
                "user {user_id} is not a member of room {}",
                room.code
            )));
        }
        if !room.place_in_group(group_id, user_id) {
            return Err(ClassroomError::NotFound(format!("group {group_id}")));
        }
        self.save(&room_key(&room.code), &room).await?;
        room.group(group_id)
            .cloned()
            .ok_or_else(|| ClassroomError::NotFound(format!("group {group_id}")))
    }

    /// Record one group's scores for another. A resubmission replaces the
    /// earlier one.
    ///
    /// `submitted_by` must currently belong to `evaluator_group`.
    #[instrument(skip(self, scores, comment))]
    pub async fn submit_peer_score(
        &self,
        code: &str,
        submitted_by: &str,
        evaluator_group: &str,
        target_group: &str,
        scores: BTreeMap<String, u8>,
        comment: &str,
    ) -> Result<PeerScore> {
        let room = self.room(code).await?;
        for group_id in [evaluator_group, target_group] {
            if room.group(group_id).is_none() {
                return Err(ClassroomError::NotFound(format!("group {group_id}")));
            }
        }
        if !room.is_member(submitted_by) {
            return Err(ClassroomError::Forbidden(format!(
                "user {submitted_by} is not a member of room {}",
                room.code
            )));
        }
        if room.group_of(submitted_by).map(|g| g.id.as_str()) != Some(evaluator_group) {
            return Err(ClassroomError::Forbidden(format!(
                "user {submitted_by} cannot score on behalf of group {evaluator_group}"
            )));
        }
        if evaluator_group == target_group {
            return Err(ClassroomError::Validation(
                "a group cannot score itself".to_string(),
            ));
        }
        validate_scores(&room.rubric, &scores)?;

        let key = peer_score_key(&room.code, evaluator_group, target_group);
        let replaced = self.store.get(&key).await?.is_some();
        let score = PeerScore {
            room_code: room.code.clone(),
            evaluator_group: evaluator_group.to_string(),
            target_group: target_group.to_string(),
            scores,
            comment: comment.trim().to_string(),
            submitted_at: Utc::now(),
        };
        self.save(&key, &score).await?;
        obs::emit_peer_score_submitted(&room.code, evaluator_group, target_group, replaced);
        Ok(score)
    }

    async fn peer_scores(&self, code: &str) -> Result<Vec<PeerScore>> {
        self.store
            .scan_prefix(&peer_scores_prefix(code))
            .await?
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(ClassroomError::from))
            .collect()
    }

    pub async fn group_analytics(&self, code: &str, group_id: &str) -> Result<GroupAnalytics> {
        let room = self.room(code).await?;
        let group = room
            .group(group_id)
            .ok_or_else(|| ClassroomError::NotFound(format!("group {group_id}")))?;
        let scores = self.peer_scores(&room.code).await?;
        Ok(analytics::analyze_group(
            &room.rubric,
            group,
            &scores,
            self.config.min_evaluators,
        ))
    }

    pub async fn room_overview(&self, code: &str) -> Result<RoomOverview> {
        let room = self.room(code).await?;
        let scores = self.peer_scores(&room.code).await?;
        Ok(analytics::overview(&room, &scores, self.config.min_evaluators))
    }
}

fn validate_scores(rubric: &[String], scores: &BTreeMap<String, u8>) -> Result<()> {
    let expected: BTreeSet<&str> = rubric.iter().map(String::as_str).collect();
    let given: BTreeSet<&str> = scores.keys().map(String::as_str).collect();

    let missing: Vec<&str> = expected.difference(&given).copied().collect();
    let unknown: Vec<&str> = given.difference(&expected).copied().collect();
    if !missing.is_empty() || !unknown.is_empty() {
        return Err(ClassroomError::Validation(format!(
            "scores must cover exactly the rubric; missing: [{}], unknown: [{}]",
            missing.join(", "),
            unknown.join(", ")
        )));
    }

    if let Some((item, value)) = scores
        .iter()
        .find(|(_, v)| !(PEER_SCORE_MIN..=PEER_SCORE_MAX).contains(*v))
    {
        return Err(ClassroomError::Validation(format!(
            "score for {item} must be between {PEER_SCORE_MIN} and {PEER_SCORE_MAX}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peergrade_state::fakes::MemoryKeyValueStore;

    fn rubric() -> Vec<String> {
        DEFAULT_RUBRIC.iter().map(|s| s.to_string()).collect()
    }

    fn full(v: u8) -> BTreeMap<String, u8> {
        rubric().into_iter().map(|k| (k, v)).collect()
    }

    #[test]
    fn test_validate_scores_accepts_exact_rubric() {
        assert!(validate_scores(&rubric(), &full(1)).is_ok());
        assert!(validate_scores(&rubric(), &full(5)).is_ok());
    }

    #[test]
    fn test_validate_scores_range() {
        assert!(validate_scores(&rubric(), &full(0)).is_err());
        assert!(validate_scores(&rubric(), &full(6)).is_err());
    }

    #[test]
    fn test_validate_scores_keys() {
        let mut scores = full(3);
        scores.remove("technical");
        let err = validate_scores(&rubric(), &scores).unwrap_err();
        assert!(err.to_string().contains("missing: [technical]"));

        let mut scores = full(3);
        scores.insert("style".to_string(), 3);
        let err = validate_scores(&rubric(), &scores).unwrap_err();
        assert!(err.to_string().contains("unknown: [style]"));
    }

    #[tokio::test]
    async fn test_students_cannot_create_rooms() {
        let classroom = Classroom::new(
            Arc::new(MemoryKeyValueStore::new()),
            ClassroomConfig::default(),
        );
        let student = classroom.login("Sam", Role::Student).await.unwrap();
        let err = classroom
            .create_room(&student.id, "Room", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClassroomError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_login_requires_name() {
        let classroom = Classroom::new(
            Arc::new(MemoryKeyValueStore::new()),
            ClassroomConfig::default(),
        );
        assert!(matches!(
            classroom.login("  ", Role::Student).await,
            Err(ClassroomError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_store_error() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .put("rooms/ABC123", serde_json::json!({"bogus": true}))
            .await
            .unwrap();
        let classroom = Classroom::new(store, ClassroomConfig::default());
        assert!(matches!(
            classroom.room("abc123").await,
            Err(ClassroomError::Store(_))
        ));
    }
}
