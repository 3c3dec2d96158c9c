use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::avatars::{
    build_gallery, choose_avatar, default_avatars, Avatar, AvatarChoice, AvatarGallery, DEFAULT_AVATAR,
};
use crate::context::SessionContext;
use crate::database::{ProgressRecord, ProgressStatus, RecordStore, UserRecord};
use crate::error::{ProgressError, Result};
use crate::progression::{evaluate, normalize_xp, ProgressionState};

pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    MultipleChoice,
    Flashcard,
    FillBlank,
}

impl ExerciseType {
    pub fn label(self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "Multiple Choice",
            ExerciseType::Flashcard => "Flashcard",
            ExerciseType::FillBlank => "Fill in the Blank",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "🎯",
            ExerciseType::Flashcard => "📚",
            ExerciseType::FillBlank => "✏️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub total_xp: u64,
    pub exercises_completed: usize,
    pub streak_count: u32,
    /// Minutes.
    pub total_practice_time: u32,
    pub average_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub exercise_title: String,
    pub exercise_type: ExerciseType,
    pub type_label: &'static str,
    pub score: u32,
    pub xp_earned: u32,
    /// Rows marked completed without a timestamp keep `None` here.
    pub completed_at: Option<DateTime<Utc>>,
    pub time_ago: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    /// Selected avatar, or [`DEFAULT_AVATAR`] when none is set.
    pub avatar: String,
    pub stats: ProfileStats,
    pub practice_time_label: String,
    pub progression: ProgressionState,
    pub avatars: AvatarGallery,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarSelection {
    pub selected: bool,
    pub avatar_url: Option<String>,
}

/// Editable profile fields. A blank name clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
}

pub fn compute_stats(user: &UserRecord, progress: &[ProgressRecord]) -> ProfileStats {
    let completed: Vec<&ProgressRecord> = progress
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .collect();

    let average_score = if completed.is_empty() {
        0
    } else {
        let total: u64 = completed.iter().map(|p| u64::from(p.score.unwrap_or(0))).sum();
        (total as f64 / completed.len() as f64).round() as u32
    };

    ProfileStats {
        total_xp: normalize_xp(user.xp),
        exercises_completed: completed.len(),
        streak_count: user.streak_count,
        total_practice_time: user.total_practice_time,
        average_score,
    }
}

/// Completed exercises, newest first. Undated completions sort last in
/// their stored order.
pub fn recent_activity(progress: &[ProgressRecord], now: DateTime<Utc>, limit: usize) -> Vec<ActivityEntry> {
    let mut completed: Vec<&ProgressRecord> = progress
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .collect();
    completed.sort_by(|a, b| match (a.completed_at, b.completed_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    completed
        .into_iter()
        .take(limit)
        .map(|p| {
            let score = p.score.unwrap_or(0);
            ActivityEntry {
                exercise_title: p.exercise_title.clone(),
                exercise_type: p.exercise_type,
                type_label: p.exercise_type.label(),
                score,
                xp_earned: score,
                completed_at: p.completed_at,
                time_ago: p.completed_at.map(|at| time_ago(at, now)),
            }
        })
        .collect()
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if minutes < 1440 {
        plural(minutes / 60, "hour")
    } else {
        plural(minutes / 1440, "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

pub fn format_practice_time(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining > 0 {
        format!("{}h {}m", hours, remaining)
    } else {
        format!("{}h", hours)
    }
}

fn display_name(user: &UserRecord) -> String {
    user.full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Learner")
        .to_string()
}

fn selected_avatar(user: &UserRecord) -> &str {
    user.avatar_url.as_deref().unwrap_or(DEFAULT_AVATAR)
}

/// The avatar catalog falls back to the built-in set when the store
/// cannot provide it.
fn avatar_catalog(store: &dyn RecordStore) -> Vec<Avatar> {
    store.avatar_catalog().unwrap_or_else(|e| {
        warn!("Using default avatars: {}", e);
        default_avatars()
    })
}

pub fn progression_for(ctx: &SessionContext, store: &dyn RecordStore) -> Result<ProgressionState> {
    let user = store.user(&ctx.user_id)?;
    let catalog = store.level_catalog()?;
    let state = evaluate(normalize_xp(user.xp), &catalog);
    debug!(
        "Evaluated {} at {} XP: level {}, {}%",
        ctx.user_id,
        state.user_xp,
        state.current_level_number(),
        state.level_progress.progress_percentage
    );
    Ok(state)
}

pub fn avatar_gallery_for(ctx: &SessionContext, store: &dyn RecordStore) -> Result<AvatarGallery> {
    let user = store.user(&ctx.user_id)?;
    Ok(build_gallery(
        normalize_xp(user.xp),
        &avatar_catalog(store),
        Some(selected_avatar(&user)),
    ))
}

pub fn build_profile(ctx: &SessionContext, store: &dyn RecordStore) -> Result<ProfileView> {
    let user = store.user(&ctx.user_id)?;
    let progress = store.progress_for(&ctx.user_id)?;
    let stats = compute_stats(&user, &progress);
    let progression = progression_for(ctx, store)?;
    let avatars = build_gallery(stats.total_xp, &avatar_catalog(store), Some(selected_avatar(&user)));

    Ok(ProfileView {
        user_id: user.id.clone(),
        display_name: display_name(&user),
        email: user.email.clone(),
        avatar: selected_avatar(&user).to_string(),
        practice_time_label: format_practice_time(stats.total_practice_time),
        stats,
        progression,
        avatars,
        recent_activity: recent_activity(&progress, ctx.now, RECENT_ACTIVITY_LIMIT),
    })
}

/// Applies an avatar if the user's XP unlocks it. A locked avatar leaves
/// the profile untouched and reports `selected: false`.
pub fn select_avatar(ctx: &SessionContext, store: &mut dyn RecordStore, avatar_id: &str) -> Result<AvatarSelection> {
    let user = store.user(&ctx.user_id)?;
    let user_xp = normalize_xp(user.xp);
    let catalog = avatar_catalog(store);

    match choose_avatar(user_xp, &catalog, avatar_id) {
        Some(AvatarChoice::Unlocked(avatar)) => {
            store.update_avatar(&ctx.user_id, &avatar.image_url)?;
            Ok(AvatarSelection {
                selected: true,
                avatar_url: Some(avatar.image_url.clone()),
            })
        }
        Some(AvatarChoice::Locked) => {
            debug!("{} tried locked avatar {} at {} XP", ctx.user_id, avatar_id, user_xp);
            Ok(AvatarSelection {
                selected: false,
                avatar_url: user.avatar_url,
            })
        }
        None => Err(ProgressError::UnknownAvatar(avatar_id.to_string())),
    }
}

/// Saves the editable profile fields and returns the updated record.
pub fn update_profile(ctx: &SessionContext, store: &mut dyn RecordStore, update: ProfileUpdate) -> Result<UserRecord> {
    let full_name = update
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    store.update_profile(&ctx.user_id, full_name)?;
    info!("Updated profile for {}", ctx.user_id);
    store.user(&ctx.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::progression::{BadgeTier, Level};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn user(xp: Option<i64>) -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            full_name: Some("linh nguyen".to_string()),
            email: "linh@example.com".to_string(),
            xp,
            avatar_url: None,
            streak_count: 4,
            total_practice_time: 135,
        }
    }

    fn record(title: &str, status: ProgressStatus, score: Option<u32>, minutes_ago: i64) -> ProgressRecord {
        ProgressRecord {
            user_id: "u1".to_string(),
            exercise_id: title.to_lowercase(),
            exercise_title: title.to_string(),
            exercise_type: ExerciseType::MultipleChoice,
            status,
            score,
            completed_at: Some(now() - Duration::minutes(minutes_ago)),
        }
    }

    fn store(xp: Option<i64>) -> MemoryStore {
        let levels = vec![
            Level {
                level_number: 1,
                xp_required: 0,
                badge_name: "Newcomer".to_string(),
                badge_icon: "🌱".to_string(),
                badge_tier: BadgeTier::Bronze,
                is_active: true,
            },
            Level {
                level_number: 2,
                xp_required: 500,
                badge_name: "Explorer".to_string(),
                badge_icon: "🧭".to_string(),
                badge_tier: BadgeTier::Silver,
                is_active: true,
            },
        ];
        let progress = vec![
            record("Greetings", ProgressStatus::Completed, Some(80), 5),
            record("Numbers", ProgressStatus::Completed, Some(95), 90),
            record("Colors", ProgressStatus::InProgress, None, 1),
        ];
        MemoryStore::new(levels, default_avatars(), vec![user(xp)], progress)
    }

    #[test]
    fn test_stats() {
        let progress = vec![
            record("A", ProgressStatus::Completed, Some(80), 5),
            record("B", ProgressStatus::Completed, Some(95), 10),
            record("C", ProgressStatus::InProgress, Some(10), 15),
        ];
        let stats = compute_stats(&user(Some(-3)), &progress);
        assert_eq!(stats.total_xp, 0);
        assert_eq!(stats.exercises_completed, 2);
        assert_eq!(stats.average_score, 88);
        assert_eq!(compute_stats(&user(None), &[]).average_score, 0);
    }

    #[test]
    fn test_time_ago_labels() {
        assert_eq!(time_ago(now(), now()), "just now");
        assert_eq!(time_ago(now() - Duration::minutes(1), now()), "1 minute ago");
        assert_eq!(time_ago(now() - Duration::minutes(45), now()), "45 minutes ago");
        assert_eq!(time_ago(now() - Duration::minutes(150), now()), "2 hours ago");
        assert_eq!(time_ago(now() - Duration::days(3), now()), "3 days ago");
        assert_eq!(time_ago(now() + Duration::minutes(5), now()), "just now");
    }

    #[test]
    fn test_practice_time_labels() {
        assert_eq!(format_practice_time(45), "45 min");
        assert_eq!(format_practice_time(135), "2h 15m");
        assert_eq!(format_practice_time(120), "2h");
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let progress = vec![
            record("Old", ProgressStatus::Completed, Some(70), 3000),
            record("New", ProgressStatus::Completed, Some(90), 2),
            record("Skipped", ProgressStatus::NotStarted, None, 1),
        ];
        let activity = recent_activity(&progress, now(), 10);
        let titles: Vec<&str> = activity.iter().map(|a| a.exercise_title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
        assert_eq!(activity[0].type_label, "Multiple Choice");
        assert_eq!(activity[0].xp_earned, 90);
        assert_eq!(activity[1].time_ago.as_deref(), Some("2 days ago"));
        assert_eq!(recent_activity(&progress, now(), 1).len(), 1);
    }

    #[test]
    fn test_undated_completions_listed_last() {
        let mut undated = record("Undated", ProgressStatus::Completed, Some(60), 0);
        undated.completed_at = None;
        let progress = vec![
            undated,
            record("Old", ProgressStatus::Completed, Some(70), 3000),
            record("New", ProgressStatus::Completed, Some(90), 2),
        ];
        let activity = recent_activity(&progress, now(), 10);
        let titles: Vec<&str> = activity.iter().map(|a| a.exercise_title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);
        assert_eq!(activity[2].completed_at, None);
        assert_eq!(activity[2].time_ago, None);

        let stats = compute_stats(&user(Some(0)), &progress);
        assert_eq!(stats.exercises_completed, activity.len());
    }

    #[test]
    fn test_build_profile() {
        let store = store(Some(600));
        let view = build_profile(&SessionContext::at("u1", now()), &store).unwrap();
        assert_eq!(view.display_name, "linh nguyen");
        assert_eq!(view.avatar, DEFAULT_AVATAR);
        let selected: Vec<&str> = view
            .avatars
            .slots
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.avatar.name.as_str())
            .collect();
        assert_eq!(selected, vec!["Default"]);
        assert_eq!(view.practice_time_label, "2h 15m");
        assert_eq!(view.progression.current_level_number(), 2);
        assert!(view.progression.is_max_level);
        assert_eq!(view.recent_activity.len(), 2);
        assert_eq!(view.avatars.next_avatar.as_ref().map(|n| n.xp_remaining), Some(1400));
    }

    #[test]
    fn test_profile_without_level_catalog_fails() {
        let store = store(Some(600)).without_levels();
        let err = build_profile(&SessionContext::at("u1", now()), &store).unwrap_err();
        assert!(matches!(err, ProgressError::CatalogUnavailable(_)));
    }

    #[test]
    fn test_select_avatar() {
        let mut store = store(Some(600));
        let ctx = SessionContext::at("u1", now());

        let locked = select_avatar(&ctx, &mut store, "4").unwrap();
        assert!(!locked.selected);
        assert_eq!(store.user("u1").unwrap().avatar_url, None);

        let chosen = select_avatar(&ctx, &mut store, "3").unwrap();
        assert!(chosen.selected);
        assert_eq!(store.user("u1").unwrap().avatar_url.as_deref(), Some("🌱"));

        assert!(matches!(
            select_avatar(&ctx, &mut store, "99"),
            Err(ProgressError::UnknownAvatar(_))
        ));
    }

    #[test]
    fn test_update_profile_name() {
        let mut store = store(Some(600));
        let ctx = SessionContext::at("u1", now());

        let update = ProfileUpdate {
            full_name: Some("  Linh Tran ".to_string()),
        };
        let saved = update_profile(&ctx, &mut store, update).unwrap();
        assert_eq!(saved.full_name.as_deref(), Some("Linh Tran"));
        let view = build_profile(&ctx, &store).unwrap();
        assert_eq!(view.display_name, "Linh Tran");

        let cleared = update_profile(
            &ctx,
            &mut store,
            ProfileUpdate {
                full_name: Some("   ".to_string()),
            },
        )
        .unwrap();
        assert_eq!(cleared.full_name, None);
        assert_eq!(build_profile(&ctx, &store).unwrap().display_name, "Learner");

        let stranger = SessionContext::at("nobody", now());
        assert!(matches!(
            update_profile(&stranger, &mut store, ProfileUpdate::default()),
            Err(ProgressError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_select_avatar_uses_fallback_catalog() {
        let mut store = store(Some(0)).without_avatars();
        let ctx = SessionContext::at("u1", now());
        let chosen = select_avatar(&ctx, &mut store, "2").unwrap();
        assert_eq!(chosen.avatar_url.as_deref(), Some("😊"));
    }
}
