//! XP progression: level thresholds, badges and unlock checks.
//!
//! Everything here is a pure function of the user's XP and a catalog
//! snapshot. Callers re-run [`evaluate`] whenever either changes.

use serde::{Deserialize, Serialize};

/// Visual rank of a badge or avatar. Grouping only, never evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    #[default]
    Default,
}

impl BadgeTier {
    pub fn label(self) -> &'static str {
        match self {
            BadgeTier::Bronze => "Bronze",
            BadgeTier::Silver => "Silver",
            BadgeTier::Gold => "Gold",
            BadgeTier::Platinum => "Platinum",
            BadgeTier::Diamond => "Diamond",
            BadgeTier::Default => "Standard",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BadgeTier::Bronze | BadgeTier::Default => "🛡️",
            BadgeTier::Silver => "🏅",
            BadgeTier::Gold => "👑",
            BadgeTier::Platinum => "💎",
            BadgeTier::Diamond => "⚡",
        }
    }

    /// Accent colour used by the profile screen for this tier.
    pub fn accent_color(self) -> &'static str {
        match self {
            BadgeTier::Bronze => "#d97706",
            BadgeTier::Silver | BadgeTier::Default => "#6b7280",
            BadgeTier::Gold => "#eab308",
            BadgeTier::Platinum => "#a855f7",
            BadgeTier::Diamond => "#22d3ee",
        }
    }
}

/// One row of the level catalog. Each level carries exactly one badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub level_number: u32,
    pub xp_required: u64,
    pub badge_name: String,
    pub badge_icon: String,
    pub badge_tier: BadgeTier,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub name: String,
    pub icon: String,
    pub tier: BadgeTier,
}

impl Level {
    pub fn badge(&self) -> Badge {
        Badge {
            name: self.badge_name.clone(),
            icon: self.badge_icon.clone(),
            tier: self.badge_tier,
        }
    }
}

/// Where the user stands relative to the catalog.
///
/// `Unranked` and `NoCatalog` both report level 0, but only the former
/// means the user still has something to earn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelStanding {
    Ranked { level_number: u32 },
    Unranked,
    NoCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    /// Absent once the last level is reached.
    pub xp_needed: Option<u64>,
    pub progress_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionState {
    pub user_xp: u64,
    pub standing: LevelStanding,
    pub current_level: Option<Level>,
    pub next_level: Option<Level>,
    pub level_progress: LevelProgress,
    pub is_max_level: bool,
    pub earned_badges: Vec<Level>,
    pub upcoming_badges: Vec<Level>,
}

impl ProgressionState {
    /// Level number of the current level, 0 when unranked.
    pub fn current_level_number(&self) -> u32 {
        self.current_level.as_ref().map_or(0, |l| l.level_number)
    }

    pub fn current_badge(&self) -> Option<Badge> {
        self.current_level.as_ref().map(Level::badge)
    }

    pub fn next_badge(&self) -> Option<Badge> {
        self.next_level.as_ref().map(Level::badge)
    }

    pub fn has_unlocked_perk(&self, perk_threshold: u64) -> bool {
        has_unlocked_perk(self.user_xp, perk_threshold)
    }
}

/// The single XP comparison shared by levels, badges, perks and avatars.
/// The boundary is inclusive.
pub fn meets_threshold(user_xp: u64, threshold: u64) -> bool {
    user_xp >= threshold
}

pub fn has_unlocked_perk(user_xp: u64, perk_threshold: u64) -> bool {
    meets_threshold(user_xp, perk_threshold)
}

/// Missing or negative XP counts as zero.
pub fn normalize_xp(raw: Option<i64>) -> u64 {
    raw.map_or(0, |xp| u64::try_from(xp).unwrap_or(0))
}

pub fn evaluate_raw(raw_xp: Option<i64>, catalog: &[Level]) -> ProgressionState {
    evaluate(normalize_xp(raw_xp), catalog)
}

pub fn evaluate(user_xp: u64, catalog: &[Level]) -> ProgressionState {
    let mut active: Vec<Level> = catalog.iter().filter(|l| l.is_active).cloned().collect();
    active.sort_by_key(|l| l.level_number);

    let (earned_badges, upcoming_badges): (Vec<Level>, Vec<Level>) = active
        .into_iter()
        .partition(|l| meets_threshold(user_xp, l.xp_required));

    let current_level = earned_badges.last().cloned();
    let next_level = upcoming_badges.first().cloned();

    let standing = match &current_level {
        Some(level) => LevelStanding::Ranked {
            level_number: level.level_number,
        },
        None if upcoming_badges.is_empty() => LevelStanding::NoCatalog,
        None => LevelStanding::Unranked,
    };

    let level_progress = match &next_level {
        Some(next) => {
            let floor = current_level.as_ref().map_or(0, |l| l.xp_required);
            LevelProgress {
                xp_needed: Some(next.xp_required.saturating_sub(user_xp)),
                progress_percentage: progress_percentage(user_xp, floor, next.xp_required),
            }
        }
        None => LevelProgress {
            xp_needed: None,
            progress_percentage: 100,
        },
    };

    ProgressionState {
        user_xp,
        standing,
        is_max_level: next_level.is_none(),
        current_level,
        next_level,
        level_progress,
        earned_badges,
        upcoming_badges,
    }
}

fn progress_percentage(user_xp: u64, floor: u64, ceiling: u64) -> u8 {
    if ceiling <= floor {
        return 100;
    }
    let span = (ceiling - floor) as f64;
    let gained = user_xp.saturating_sub(floor) as f64;
    (100.0 * gained / span).round().clamp(0.0, 100.0) as u8
}
