use serde::{Deserialize, Serialize};

use crate::progression::{meets_threshold, BadgeTier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Either an http(s) URL or a single emoji.
    pub image_url: String,
    pub unlock_xp: u64,
    pub tier: BadgeTier,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarSlot {
    pub avatar: Avatar,
    pub unlocked: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextAvatar {
    pub avatar: Avatar,
    pub xp_remaining: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarGallery {
    pub slots: Vec<AvatarSlot>,
    /// None once every avatar is unlocked.
    pub next_avatar: Option<NextAvatar>,
}

/// Shown for users who have never picked an avatar.
pub const DEFAULT_AVATAR: &str = "👤";

pub fn is_avatar_unlocked(user_xp: u64, unlock_xp: u64) -> bool {
    meets_threshold(user_xp, unlock_xp)
}

/// Builds the avatar picker: active avatars ordered by unlock threshold.
pub fn build_gallery(user_xp: u64, catalog: &[Avatar], selected_url: Option<&str>) -> AvatarGallery {
    let mut active: Vec<&Avatar> = catalog.iter().filter(|a| a.is_active).collect();
    active.sort_by_key(|a| a.unlock_xp);

    let next_avatar = active
        .iter()
        .find(|a| !is_avatar_unlocked(user_xp, a.unlock_xp))
        .map(|a| NextAvatar {
            avatar: (*a).clone(),
            xp_remaining: a.unlock_xp - user_xp,
        });

    let slots = active
        .into_iter()
        .map(|a| AvatarSlot {
            unlocked: is_avatar_unlocked(user_xp, a.unlock_xp),
            selected: selected_url == Some(a.image_url.as_str()),
            avatar: a.clone(),
        })
        .collect();

    AvatarGallery { slots, next_avatar }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AvatarChoice<'a> {
    Unlocked(&'a Avatar),
    /// Not an error: the caller keeps the current avatar.
    Locked,
}

/// Looks up an active avatar by id and gates it on XP.
pub fn choose_avatar<'a>(user_xp: u64, catalog: &'a [Avatar], avatar_id: &str) -> Option<AvatarChoice<'a>> {
    let avatar = catalog.iter().find(|a| a.is_active && a.id == avatar_id)?;
    if is_avatar_unlocked(user_xp, avatar.unlock_xp) {
        Some(AvatarChoice::Unlocked(avatar))
    } else {
        Some(AvatarChoice::Locked)
    }
}

/// Used when the avatar catalog cannot be loaded.
pub fn default_avatars() -> Vec<Avatar> {
    vec![
        Avatar {
            id: "1".to_string(),
            name: "Default".to_string(),
            description: "Default avatar".to_string(),
            image_url: DEFAULT_AVATAR.to_string(),
            unlock_xp: 0,
            tier: BadgeTier::Default,
            is_active: true,
        },
        Avatar {
            id: "2".to_string(),
            name: "Smiley".to_string(),
            description: "Happy face".to_string(),
            image_url: "😊".to_string(),
            unlock_xp: 0,
            tier: BadgeTier::Default,
            is_active: true,
        },
        Avatar {
            id: "3".to_string(),
            name: "Rookie".to_string(),
            description: "Rookie learner".to_string(),
            image_url: "🌱".to_string(),
            unlock_xp: 500,
            tier: BadgeTier::Bronze,
            is_active: true,
        },
        Avatar {
            id: "4".to_string(),
            name: "Scholar".to_string(),
            description: "Academic scholar".to_string(),
            image_url: "🎓".to_string(),
            unlock_xp: 2000,
            tier: BadgeTier::Silver,
            is_active: true,
        },
        Avatar {
            id: "5".to_string(),
            name: "Expert".to_string(),
            description: "Expert level".to_string(),
            image_url: "⚡".to_string(),
            unlock_xp: 8000,
            tier: BadgeTier::Gold,
            is_active: true,
        },
    ]
}
