//! Curriculum units created from the admin screen.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::RecordStore;
use crate::error::{ProgressError, Result};

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Red,
    Yellow,
}

impl ColorTheme {
    pub fn label(self) -> &'static str {
        match self {
            ColorTheme::Blue => "Blue",
            ColorTheme::Green => "Green",
            ColorTheme::Purple => "Purple",
            ColorTheme::Orange => "Orange",
            ColorTheme::Red => "Red",
            ColorTheme::Yellow => "Yellow",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ColorTheme::Blue => "#3b82f6",
            ColorTheme::Green => "#22c55e",
            ColorTheme::Purple => "#a855f7",
            ColorTheme::Orange => "#f97316",
            ColorTheme::Red => "#ef4444",
            ColorTheme::Yellow => "#eab308",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u64,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub unit_number: u32,
    pub color_theme: ColorTheme,
    pub unlock_requirement: u64,
    pub is_active: bool,
    /// Minutes.
    pub estimated_duration: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUnit {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color_theme: ColorTheme,
    #[serde(default = "default_duration")]
    pub estimated_duration: u32,
}

fn default_duration() -> u32 {
    60
}

impl NewUnit {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            color_theme: ColorTheme::default(),
            estimated_duration: default_duration(),
        }
    }
}

/// Unit numbers continue from the highest one already in the course.
pub fn next_unit_number(existing: &[Unit]) -> Result<u32> {
    match existing.iter().map(|u| u.unit_number).max() {
        None => Ok(1),
        Some(n) => n
            .checked_add(1)
            .ok_or_else(|| ProgressError::InvalidUnit("course has no unit numbers left".to_string())),
    }
}

pub fn create_unit(store: &mut dyn RecordStore, course_id: &str, request: NewUnit) -> Result<Unit> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ProgressError::InvalidUnit("title is required".to_string()));
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&request.estimated_duration) {
        return Err(ProgressError::InvalidUnit(format!(
            "estimated_duration must be between {} and {} minutes",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )));
    }

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let existing = store.units_for_course(course_id)?;
    let unit_number = next_unit_number(&existing)?;
    let unit = store.insert_unit(Unit {
        id: 0,
        course_id: course_id.to_string(),
        title: title.to_string(),
        description,
        unit_number,
        color_theme: request.color_theme,
        unlock_requirement: 0,
        is_active: true,
        estimated_duration: request.estimated_duration,
    })?;

    info!("Created unit {} '{}' in course {}", unit.unit_number, unit.title, course_id);
    Ok(unit)
}
