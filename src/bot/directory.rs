use crate::identity::{LookupError, UserDirectory, UserRecord};
use async_trait::async_trait;
use serenity::all::{Context, GuildId, User, UserId};
use tracing::debug;

const IMAGE_SIZE: u32 = 4096;
const MEMBER_PAGE: u64 = 1000;

/// Users and guild members as seen by the connected bot.
pub struct SerenityDirectory {
    ctx: Context,
}

impl SerenityDirectory {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl UserDirectory for SerenityDirectory {
    async fn fetch_user(&self, id: u64) -> Result<UserRecord, LookupError> {
        if id == 0 {
            return Err(LookupError::NotFound);
        }
        let user = UserId::new(id)
            .to_user(&self.ctx)
            .await
            .map_err(|_| LookupError::NotFound)?;
        Ok(to_record(&user))
    }

    async fn refresh_user(&self, id: u64) -> Result<UserRecord, LookupError> {
        if id == 0 {
            return Err(LookupError::NotFound);
        }
        let user = self
            .ctx
            .http
            .get_user(UserId::new(id))
            .await
            .map_err(|e| LookupError::Directory(e.to_string()))?;
        Ok(to_record(&user))
    }

    async fn list_members(&self, scope: u64) -> Result<Vec<UserRecord>, LookupError> {
        if scope == 0 {
            return Err(LookupError::NotFound);
        }
        let guild = GuildId::new(scope);
        let mut records = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = guild
                .members(&self.ctx.http, Some(MEMBER_PAGE), after)
                .await
                .map_err(|e| LookupError::Directory(e.to_string()))?;
            let count = page.len() as u64;
            after = page.last().map(|m| m.user.id);
            records.extend(page.iter().map(|m| to_record(&m.user)));
            if count < MEMBER_PAGE || after.is_none() {
                break;
            }
        }
        debug!("Listed {} members of guild {}", records.len(), scope);
        Ok(records)
    }
}

fn to_record(user: &User) -> UserRecord {
    UserRecord {
        id: user.id.get(),
        username: user.name.clone(),
        tag: user.tag(),
        avatar_url: sized(&user.face(), IMAGE_SIZE),
        banner_url: user.banner_url().map(|url| sized(&url, IMAGE_SIZE)),
    }
}

/// Replace any query on a CDN url with `?size=N`.
fn sized(url: &str, size: u32) -> String {
    let base = url.split('?').next().unwrap_or(url);
    format!("{}?size={}", base, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sized_replaces_query() {
        assert_eq!(
            sized("https://cdn.discordapp.com/avatars/1/a.webp?size=1024", 4096),
            "https://cdn.discordapp.com/avatars/1/a.webp?size=4096"
        );
        assert_eq!(
            sized("https://cdn.discordapp.com/embed/avatars/0.png", 4096),
            "https://cdn.discordapp.com/embed/avatars/0.png?size=4096"
        );
    }
}
