use crate::services::user::UserService;
use crate::Data;
use rand::Rng;
use serenity::all::{GuildId, Message, Reaction, ReactionType, RoleId, UserId};
use serenity::client::Context as SerenityContext;
use tracing::{debug, warn};

/// Passive chat rewards: a little XP and a few coins per message, throttled
/// per user so spam doesn't pay.
pub async fn handle_message(
    ctx: &SerenityContext,
    data: &Data,
    message: &Message,
) -> anyhow::Result<()> {
    // Bots earn nothing, and DMs are not part of the economy.
    if message.author.bot || message.guild_id.is_none() {
        return Ok(());
    }

    let (xp, coins) = {
        let mut rng = rand::thread_rng();
        (rng.gen_range(1..=3), rng.gen_range(1..=5))
    };

    let service = UserService::new(data.db.clone());
    let report = service
        .message_reward(
            message.author.id.get(),
            &message.author.name,
            data.config.message_reward_cooldown_secs,
            xp,
            coins,
        )
        .await?;

    if let Some(report) = report {
        if report.leveled_up {
            let announcement = format!(
                "🎉 **{}** leveled up to level {}!",
                message.author.name, report.new_level
            );
            if let Err(e) = message.channel_id.say(&ctx.http, announcement).await {
                warn!("Failed to announce level up: {}", e);
            }
        }
    }

    Ok(())
}

pub async fn handle_reaction_add(
    ctx: &SerenityContext,
    data: &Data,
    reaction: &Reaction,
) -> anyhow::Result<()> {
    let Some((guild_id, user_id, role_id)) = resolve_reaction_role(ctx, data, reaction).await?
    else {
        return Ok(());
    };

    ctx.http
        .add_member_role(
            GuildId::new(guild_id),
            UserId::new(user_id),
            RoleId::new(role_id),
            Some("Reaction role"),
        )
        .await?;
    debug!("Granted role {} to user {} via reaction", role_id, user_id);
    Ok(())
}

pub async fn handle_reaction_remove(
    ctx: &SerenityContext,
    data: &Data,
    reaction: &Reaction,
) -> anyhow::Result<()> {
    let Some((guild_id, user_id, role_id)) = resolve_reaction_role(ctx, data, reaction).await?
    else {
        return Ok(());
    };

    ctx.http
        .remove_member_role(
            GuildId::new(guild_id),
            UserId::new(user_id),
            RoleId::new(role_id),
            Some("Reaction role removed"),
        )
        .await?;
    debug!("Removed role {} from user {} via reaction", role_id, user_id);
    Ok(())
}

/// Maps a reaction to (guild, user, role) when it lands on a tracked panel
/// message with a bound emoji.
async fn resolve_reaction_role(
    ctx: &SerenityContext,
    data: &Data,
    reaction: &Reaction,
) -> anyhow::Result<Option<(u64, u64, u64)>> {
    let Some(guild_id) = reaction.guild_id else {
        return Ok(None);
    };
    let Some(user_id) = reaction.user_id else {
        return Ok(None);
    };
    if user_id == ctx.cache.current_user().id {
        return Ok(None);
    }

    let message_id = reaction.message_id.to_string();
    let emoji = emoji_key(&reaction.emoji);

    let db = data.db.clone();
    let role_id = {
        let message_id = message_id.clone();
        db.run_blocking(move |db| {
            if !db.is_reaction_panel(&message_id)? {
                return Ok(None);
            }
            db.role_for_reaction(&message_id, &emoji)
        })
        .await?
    };

    let Some(role_id) = role_id else {
        return Ok(None);
    };
    let role_id: u64 = match role_id.parse() {
        Ok(id) => id,
        Err(_) => {
            warn!("Invalid role id '{}' bound to message {}", role_id, message_id);
            return Ok(None);
        }
    };

    Ok(Some((guild_id.get(), user_id.get(), role_id)))
}

/// Storage key for an emoji: custom emoji ID, or the unicode glyph itself.
pub fn emoji_key(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Custom { id, .. } => id.to_string(),
        ReactionType::Unicode(s) => s.clone(),
        _ => emoji.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::emoji_key;
    use serenity::all::{EmojiId, ReactionType};

    #[test]
    fn test_emoji_key_forms() {
        assert_eq!(emoji_key(&ReactionType::Unicode("🔴".to_string())), "🔴");

        let custom = ReactionType::Custom {
            animated: false,
            id: EmojiId::new(1234567890),
            name: Some("blob".to_string()),
        };
        assert_eq!(emoji_key(&custom), "1234567890");
    }
}
