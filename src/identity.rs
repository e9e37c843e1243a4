//! Avatar and banner lookup from a free-form identifier.

use crate::delivery::{Card, Reply, ReplyBody};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

const BLURPLE: u32 = 0x5865F2;

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub tag: String,
    pub avatar_url: String,
    pub banner_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("User not found")]
    NotFound,
    #[error("Directory error: {0}")]
    Directory(String),
}

/// Read access to the users and members a lookup may resolve against.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch_user(&self, id: u64) -> Result<UserRecord, LookupError>;

    /// Fetch bypassing any cache; banners are only present on a fresh fetch.
    async fn refresh_user(&self, id: u64) -> Result<UserRecord, LookupError>;

    /// Every member of `scope`, in the order the platform enumerates them.
    async fn list_members(&self, scope: u64) -> Result<Vec<UserRecord>, LookupError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Avatar,
    Banner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerOutcome {
    Banner { user: UserRecord, url: String },
    NoCustomBanner(UserRecord),
}

/// Digits of a bare numeric id or a `<@id>` / `<@!id>` mention.
fn id_digits(trimmed: &str) -> Option<&str> {
    if let Some(caps) = MENTION.captures(trimmed) {
        return caps.get(1).map(|m| m.as_str());
    }
    NUMERIC_ID.is_match(trimmed).then_some(trimmed)
}

/// Text matched against member names: mentions reduce to their id, otherwise
/// only `@ < >` are removed so names containing `!` still match exactly.
pub fn search_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match id_digits(trimmed) {
        Some(digits) => digits.to_string(),
        None => trimmed
            .chars()
            .filter(|c| !matches!(c, '@' | '<' | '>'))
            .collect(),
    }
}

/// Numeric identifiers and mentions try a direct fetch first, then everything
/// falls back to a case-insensitive substring search over the scope's members.
pub async fn resolve_user(
    directory: &dyn UserDirectory,
    identifier: &str,
    scope: Option<u64>,
) -> Result<UserRecord, LookupError> {
    let trimmed = identifier.trim();
    if let Some(id) = id_digits(trimmed).and_then(|d| d.parse::<u64>().ok()) {
        match directory.fetch_user(id).await {
            Ok(user) => return Ok(user),
            Err(e) => debug!("Direct fetch of {} failed, searching by name: {}", id, e),
        }
    }

    let needle = search_text(trimmed);
    if needle.is_empty() {
        return Err(LookupError::NotFound);
    }

    let Some(scope) = scope else {
        return Err(LookupError::NotFound);
    };

    let needle = needle.to_lowercase();
    let members = directory.list_members(scope).await?;
    members
        .into_iter()
        .find(|m| {
            m.username.to_lowercase().contains(&needle) || m.tag.to_lowercase().contains(&needle)
        })
        .ok_or(LookupError::NotFound)
}

pub async fn resolve_banner(
    directory: &dyn UserDirectory,
    user: &UserRecord,
) -> Result<BannerOutcome, LookupError> {
    let fresh = directory.refresh_user(user.id).await?;
    Ok(match fresh.banner_url.clone() {
        Some(url) if !url.is_empty() => BannerOutcome::Banner { user: fresh, url },
        _ => BannerOutcome::NoCustomBanner(fresh),
    })
}

pub fn avatar_card(user: &UserRecord) -> Card {
    image_card(
        format!("👤 Avatar of {}", user.tag),
        "📥 Download avatar in high quality",
        &user.avatar_url,
        user.id,
    )
}

pub fn banner_card(user: &UserRecord, url: &str) -> Card {
    image_card(
        format!("🎨 Banner of {}", user.tag),
        "📥 Download banner in high quality",
        url,
        user.id,
    )
}

fn image_card(title: String, link_label: &str, url: &str, id: u64) -> Card {
    let mut card = Card::new(title, format!("[{}]({})", link_label, url), BLURPLE);
    card.image_url = Some(url.to_string());
    card.footer = Some(format!("User ID: {}", id));
    card
}

async fn lookup(
    directory: &dyn UserDirectory,
    kind: LookupKind,
    identifier: &str,
    scope: Option<u64>,
) -> Result<ReplyBody, LookupError> {
    let user = resolve_user(directory, identifier, scope).await?;
    Ok(match kind {
        LookupKind::Avatar => ReplyBody::Card(avatar_card(&user)),
        LookupKind::Banner => match resolve_banner(directory, &user).await? {
            BannerOutcome::Banner { user, url } => ReplyBody::Card(banner_card(&user, &url)),
            BannerOutcome::NoCustomBanner(user) => {
                ReplyBody::Text(format!("❌ User **{}** has no custom banner.", user.tag))
            }
        },
    })
}

/// Resolve and render a lookup as one edit of `reply`.
pub async fn handle(
    directory: &dyn UserDirectory,
    kind: LookupKind,
    identifier: &str,
    scope: Option<u64>,
    reply: &dyn Reply,
) {
    let body = match lookup(directory, kind, identifier, scope).await {
        Ok(body) => body,
        Err(LookupError::NotFound) => {
            info!("No user matches {:?}", identifier);
            ReplyBody::Text(
                "❌ Could not find this user. Check the ID or name and try again.".into(),
            )
        }
        Err(e) => {
            warn!("{:?} lookup for {:?} failed: {}", kind, identifier, e);
            ReplyBody::Text(
                "❌ Something went wrong while fetching the information. Please try again later."
                    .into(),
            )
        }
    };
    if let Err(e) = reply.edit(body).await {
        warn!("Could not send lookup result: {}", e);
    }
}
