use csv::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::avatars::Avatar;
use crate::database::{ProgressRecord, UserRecord};
use crate::error::{ProgressError, Result};
use crate::progression::{BadgeTier, Level};
use crate::units::Unit;

// Thresholds are read signed so that a negative value is reported as a
// rejected row instead of a generic parse failure.
#[derive(Deserialize)]
struct LevelRow {
    level_number: u32,
    xp_required: i64,
    badge_name: String,
    badge_icon: String,
    badge_tier: String,
    is_active: bool,
}

#[derive(Deserialize)]
struct AvatarRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    image_url: String,
    unlock_xp: i64,
    tier: String,
    is_active: bool,
}

pub fn load_levels(path: &Path) -> Result<Vec<Level>> {
    read_levels(Reader::from_path(path)?)
}

pub fn load_avatars(path: &Path) -> Result<Vec<Avatar>> {
    read_avatars(Reader::from_path(path)?)
}

pub fn load_users(path: &Path) -> Result<Vec<UserRecord>> {
    read_rows(Reader::from_path(path)?)
}

pub fn load_progress(path: &Path) -> Result<Vec<ProgressRecord>> {
    read_rows(Reader::from_path(path)?)
}

pub fn load_units(path: &Path) -> Result<Vec<Unit>> {
    read_rows(Reader::from_path(path)?)
}

pub fn read_levels<R: Read>(mut rdr: Reader<R>) -> Result<Vec<Level>> {
    let mut levels = Vec::new();

    for (index, result) in rdr.deserialize::<LevelRow>().enumerate() {
        let row = result?;
        let line = index + 1;
        if row.level_number == 0 {
            return Err(invalid(line, "level_number must be positive"));
        }
        levels.push(Level {
            level_number: row.level_number,
            xp_required: non_negative(line, "xp_required", row.xp_required)?,
            badge_name: row.badge_name,
            badge_icon: row.badge_icon,
            badge_tier: parse_tier(line, &row.badge_tier)?,
            is_active: row.is_active,
        });
    }

    Ok(levels)
}

pub fn read_avatars<R: Read>(mut rdr: Reader<R>) -> Result<Vec<Avatar>> {
    let mut avatars = Vec::new();

    for (index, result) in rdr.deserialize::<AvatarRow>().enumerate() {
        let row = result?;
        let line = index + 1;
        avatars.push(Avatar {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            unlock_xp: non_negative(line, "unlock_xp", row.unlock_xp)?,
            tier: parse_tier(line, &row.tier)?,
            is_active: row.is_active,
        });
    }

    Ok(avatars)
}

fn read_rows<T: DeserializeOwned, R: Read>(mut rdr: Reader<R>) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for result in rdr.deserialize::<T>() {
        rows.push(result?);
    }
    Ok(rows)
}

fn parse_tier(line: usize, raw: &str) -> Result<BadgeTier> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "bronze" => Ok(BadgeTier::Bronze),
        "silver" => Ok(BadgeTier::Silver),
        "gold" => Ok(BadgeTier::Gold),
        "platinum" => Ok(BadgeTier::Platinum),
        "diamond" => Ok(BadgeTier::Diamond),
        "default" | "" => Ok(BadgeTier::Default),
        other => Err(invalid(line, &format!("unknown tier '{}'", other))),
    }
}

fn non_negative(line: usize, field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| invalid(line, &format!("negative {}", field)))
}

fn invalid(row: usize, reason: &str) -> ProgressError {
    ProgressError::InvalidRow {
        row,
        reason: reason.to_string(),
    }
}
