use crate::events::emoji_key;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Storage key for user-typed emoji input: custom emoji ID, or the glyph.
fn emoji_storage_key(input: &str) -> String {
    match serenity::ReactionType::try_from(input.trim()) {
        Ok(reaction) => emoji_key(&reaction),
        Err(_) => input.trim().to_string(),
    }
}

/// Manage reaction role mappings
#[poise::command(
    slash_command,
    subcommands("add", "remove", "edit", "list"),
    guild_only,
    required_permissions = "MANAGE_ROLES",
    rename = "reactionrole"
)]
pub async fn reactionrole(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Map an emoji to a role for the next panel
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Emoji to react with"] emoji: String,
    #[description = "Role to grant"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?.to_string();
    let channel_id = ctx.channel_id().to_string();
    let key = emoji_storage_key(&emoji);
    let role_id = role.id.to_string();

    let db = ctx.data().db.clone();
    db.run_blocking(move |db| db.add_reaction_role(&guild_id, &channel_id, &key, &role_id))
        .await?;

    ctx.say(format!(
        "✅ {emoji} → **{}**. Post it with `/roles` when your mappings are ready.",
        role.name
    ))
    .await?;
    Ok(())
}

/// Remove a mapping from a panel
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Panel message ID"] message_id: String,
    #[description = "Emoji to remove"] emoji: String,
) -> Result<(), Error> {
    let key = emoji_storage_key(&emoji);
    let db = ctx.data().db.clone();
    let message = message_id.clone();
    let removed = db
        .run_blocking(move |db| db.remove_reaction_role(&message, &key))
        .await?;

    if removed > 0 {
        ctx.say(format!("🗑️ Removed {emoji} from message `{message_id}`."))
            .await?;
    } else {
        ctx.say("❌ No mapping found for that message and emoji.")
            .await?;
    }
    Ok(())
}

/// Point an existing mapping at a different role
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn edit(
    ctx: Context<'_>,
    #[description = "Panel message ID"] message_id: String,
    #[description = "Emoji to change"] emoji: String,
    #[description = "New role"] role: serenity::Role,
) -> Result<(), Error> {
    let key = emoji_storage_key(&emoji);
    let role_id = role.id.to_string();
    let db = ctx.data().db.clone();
    let message = message_id.clone();
    let updated = db
        .run_blocking(move |db| db.update_reaction_role(&message, &key, &role_id))
        .await?;

    if updated > 0 {
        ctx.say(format!("✏️ {emoji} now grants **{}**.", role.name))
            .await?;
    } else {
        ctx.say("❌ No mapping found for that message and emoji.")
            .await?;
    }
    Ok(())
}

/// List this server's reaction role mappings
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?.to_string();
    let db = ctx.data().db.clone();
    let mappings = db
        .run_blocking(move |db| db.list_reaction_roles(&guild_id))
        .await?;

    if mappings.is_empty() {
        ctx.say("📭 No reaction roles configured. Add one with `/reactionrole add`.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = mappings
        .iter()
        .map(|m| {
            let status = if m.message_id == "0" {
                "unposted".to_string()
            } else {
                format!("message `{}`", m.message_id)
            };
            format!("• {} → <@&{}> ({status})", m.emoji, m.role_id)
        })
        .collect();
    ctx.say(super::clamp_reply(format!(
        "**Reaction roles:**\n{}",
        lines.join("\n")
    )))
    .await?;
    Ok(())
}

/// Post the reaction role panel for pending mappings
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn roles(ctx: Context<'_>) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Must be run in a guild")?;
    let guild_id = guild.to_string();

    let db = ctx.data().db.clone();
    let pending: Vec<_> = {
        let guild_id = guild_id.clone();
        db.run_blocking(move |db| db.list_reaction_roles(&guild_id))
            .await?
            .into_iter()
            .filter(|m| m.message_id == "0")
            .collect()
    };

    if pending.is_empty() {
        ctx.say("📭 No pending mappings. Add some with `/reactionrole add` first.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = pending
        .iter()
        .map(|m| format!("{} → <@&{}>", m.emoji, m.role_id))
        .collect();
    let embed = serenity::CreateEmbed::new()
        .title("🎭 Pick your roles")
        .color(0x5865F2)
        .description(format!(
            "React to get a role, unreact to lose it.\n\n{}",
            lines.join("\n")
        ));

    let panel = ctx
        .channel_id()
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await?;

    for mapping in &pending {
        // Stored keys are either a unicode glyph or a custom emoji ID.
        let reaction = match mapping.emoji.parse::<u64>() {
            Ok(id) => serenity::ReactionType::Custom {
                animated: false,
                id: serenity::EmojiId::new(id),
                name: Some("_".to_string()),
            },
            Err(_) => serenity::ReactionType::Unicode(mapping.emoji.clone()),
        };
        if let Err(e) = panel.react(ctx.http(), reaction).await {
            warn!("Failed to seed reaction '{}': {}", mapping.emoji, e);
        }
    }

    let channel_id = ctx.channel_id().to_string();
    let message_id = panel.id.to_string();
    db.run_blocking(move |db| db.bind_reaction_panel(&guild_id, &channel_id, &message_id))
        .await?;

    info!("Reaction role panel {} posted in guild {}", panel.id, guild);
    ctx.send(
        poise::CreateReply::default()
            .content("✅ Panel posted and mappings bound.")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
