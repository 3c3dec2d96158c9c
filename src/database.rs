use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::avatars::Avatar;
use crate::data;
use crate::error::{ProgressError, Result};
use crate::gamification::ExerciseType;
use crate::progression::Level;
use crate::units::Unit;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub full_name: Option<String>,
    pub email: String,
    /// Raw value from the profile row; may be missing or negative.
    pub xp: Option<i64>,
    pub avatar_url: Option<String>,
    pub streak_count: u32,
    /// Minutes.
    pub total_practice_time: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub exercise_id: String,
    pub exercise_title: String,
    pub exercise_type: ExerciseType,
    pub status: ProgressStatus,
    pub score: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The hosted backend as seen by this service. Each call is a single
/// read or single-row write; nothing is cached or retried.
pub trait RecordStore: Send + Sync {
    fn level_catalog(&self) -> Result<Vec<Level>>;
    fn avatar_catalog(&self) -> Result<Vec<Avatar>>;
    fn user(&self, user_id: &str) -> Result<UserRecord>;
    fn update_avatar(&mut self, user_id: &str, avatar_url: &str) -> Result<()>;
    fn update_profile(&mut self, user_id: &str, full_name: Option<&str>) -> Result<()>;
    fn progress_for(&self, user_id: &str) -> Result<Vec<ProgressRecord>>;
    fn units_for_course(&self, course_id: &str) -> Result<Vec<Unit>>;
    /// Stores the unit and returns it with its assigned id.
    fn insert_unit(&mut self, unit: Unit) -> Result<Unit>;
}

/// In-memory store seeded from the CSV exports in the data directory.
/// A catalog that failed to load stays `None` and reads report it as
/// unavailable.
#[derive(Debug)]
pub struct MemoryStore {
    levels: Option<Vec<Level>>,
    avatars: Option<Vec<Avatar>>,
    users: HashMap<String, UserRecord>,
    progress: Vec<ProgressRecord>,
    units: Vec<Unit>,
    /// None once the id space is used up.
    next_unit_id: Option<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
            .without_levels()
            .without_avatars()
    }
}

impl MemoryStore {
    pub fn new(levels: Vec<Level>, avatars: Vec<Avatar>, users: Vec<UserRecord>, progress: Vec<ProgressRecord>) -> Self {
        Self {
            levels: Some(levels),
            avatars: Some(avatars),
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            progress,
            units: Vec::new(),
            next_unit_id: Some(1),
        }
    }

    pub fn without_avatars(mut self) -> Self {
        self.avatars = None;
        self
    }

    pub fn without_levels(mut self) -> Self {
        self.levels = None;
        self
    }

    pub fn with_units(mut self, units: Vec<Unit>) -> Self {
        self.next_unit_id = units.iter().map(|u| u.id).max().map_or(Some(1), |id| id.checked_add(1));
        self.units = units;
        self
    }

    /// Loads `levels.csv`, `avatars.csv`, `users.csv`, `progress.csv` and
    /// `units.csv`. Missing or malformed files are logged and left empty.
    pub fn load_dir(dir: &Path) -> Self {
        let levels = match data::load_levels(&dir.join("levels.csv")) {
            Ok(levels) => {
                info!("Loaded {} levels", levels.len());
                Some(levels)
            }
            Err(e) => {
                warn!("Level catalog unavailable: {}", e);
                None
            }
        };

        let avatars = match data::load_avatars(&dir.join("avatars.csv")) {
            Ok(avatars) => {
                info!("Loaded {} avatars", avatars.len());
                Some(avatars)
            }
            Err(e) => {
                warn!("Avatar catalog unavailable: {}", e);
                None
            }
        };

        let users = data::load_users(&dir.join("users.csv")).unwrap_or_else(|e| {
            warn!("No users loaded: {}", e);
            Vec::new()
        });
        let progress = data::load_progress(&dir.join("progress.csv")).unwrap_or_else(|e| {
            warn!("No progress loaded: {}", e);
            Vec::new()
        });
        let units = data::load_units(&dir.join("units.csv")).unwrap_or_else(|e| {
            warn!("No units loaded: {}", e);
            Vec::new()
        });
        info!("Loaded {} users, {} progress rows, {} units", users.len(), progress.len(), units.len());

        let mut store = Self::new(Vec::new(), Vec::new(), users, progress).with_units(units);
        store.levels = levels;
        store.avatars = avatars;
        store
    }
}

impl RecordStore for MemoryStore {
    fn level_catalog(&self) -> Result<Vec<Level>> {
        self.levels
            .clone()
            .ok_or_else(|| ProgressError::CatalogUnavailable("level catalog".to_string()))
    }

    fn avatar_catalog(&self) -> Result<Vec<Avatar>> {
        self.avatars
            .clone()
            .ok_or_else(|| ProgressError::CatalogUnavailable("avatar catalog".to_string()))
    }

    fn user(&self, user_id: &str) -> Result<UserRecord> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ProgressError::UnknownUser(user_id.to_string()))
    }

    fn update_avatar(&mut self, user_id: &str, avatar_url: &str) -> Result<()> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| ProgressError::UnknownUser(user_id.to_string()))?;
        user.avatar_url = Some(avatar_url.to_string());
        Ok(())
    }

    fn update_profile(&mut self, user_id: &str, full_name: Option<&str>) -> Result<()> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| ProgressError::UnknownUser(user_id.to_string()))?;
        user.full_name = full_name.map(str::to_string);
        Ok(())
    }

    fn progress_for(&self, user_id: &str) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn units_for_course(&self, course_id: &str) -> Result<Vec<Unit>> {
        Ok(self
            .units
            .iter()
            .filter(|u| u.course_id == course_id)
            .cloned()
            .collect())
    }

    fn insert_unit(&mut self, mut unit: Unit) -> Result<Unit> {
        let id = self
            .next_unit_id
            .ok_or_else(|| ProgressError::Store("unit ids exhausted".to_string()))?;
        unit.id = id;
        self.next_unit_id = id.checked_add(1);
        self.units.push(unit.clone());
        Ok(unit)
    }
}
