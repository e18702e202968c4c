use crate::db::GiveawayStatus;
use crate::services::giveaway::GiveawayService;
use crate::{Context, Error};
use chrono::{Duration as ChronoDuration, Utc};
use humantime::parse_duration;
use tracing::info;

const MIN_GIVEAWAY_SECS: u64 = 60;
const MAX_PRIZE_CHARS: usize = 200;

/// Run giveaways in this server
#[poise::command(
    slash_command,
    subcommands("start", "enter", "list", "cancel"),
    guild_only
)]
pub async fn giveaway(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Start a giveaway (duration examples: 10m, 2h, 1d)
#[poise::command(slash_command, guild_only)]
pub async fn start(
    ctx: Context<'_>,
    #[description = "How long it runs (e.g., 10m, 2h, 1d)"] duration: String,
    #[description = "What you're giving away"] prize: String,
) -> Result<(), Error> {
    let trimmed = prize.trim();
    if trimmed.is_empty() {
        ctx.say("❌ The prize cannot be empty.").await?;
        return Ok(());
    }
    if trimmed.chars().count() > MAX_PRIZE_CHARS {
        ctx.say(format!(
            "❌ Prize is too long (max {MAX_PRIZE_CHARS} characters)."
        ))
        .await?;
        return Ok(());
    }

    let parsed = match parse_duration(duration.trim()) {
        Ok(parsed) => parsed,
        Err(_) => {
            ctx.say("❌ Invalid duration. Examples: `10m`, `2h`, `1d`.")
                .await?;
            return Ok(());
        }
    };
    if parsed.as_secs() < MIN_GIVEAWAY_SECS {
        ctx.say("❌ Giveaways must run for at least 1 minute.").await?;
        return Ok(());
    }

    let ends_at = match ChronoDuration::from_std(parsed) {
        Ok(delta) => Utc::now() + delta,
        Err(_) => {
            ctx.say("❌ Giveaway duration is too large.").await?;
            return Ok(());
        }
    };

    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let service = GiveawayService::new(ctx.data().db.clone());
    let giveaway_id = service
        .create(
            guild_id.get(),
            ctx.channel_id().get(),
            ctx.author().id.get(),
            trimmed,
            ends_at,
        )
        .await?;

    info!(
        "Giveaway {} started by {} in guild {}",
        giveaway_id,
        ctx.author().id,
        guild_id
    );

    let unix = ends_at.timestamp();
    ctx.say(format!(
        "🎉 Giveaway started: **{trimmed}**! Ends <t:{unix}:R>. Enter with `/giveaway enter id:{giveaway_id}`."
    ))
    .await?;
    Ok(())
}

/// Enter a running giveaway
#[poise::command(slash_command, guild_only)]
pub async fn enter(
    ctx: Context<'_>,
    #[description = "Giveaway ID"] id: i64,
) -> Result<(), Error> {
    let service = GiveawayService::new(ctx.data().db.clone());
    match service.enter(id, ctx.author().id.get()).await? {
        GiveawayStatus::Entered => {
            ctx.say("🎟️ You're in! Good luck!").await?;
        }
        GiveawayStatus::AlreadyEntered => {
            ctx.say("🎟️ You already entered this giveaway.").await?;
        }
        GiveawayStatus::NotOpen => {
            ctx.say("❌ That giveaway doesn't exist or has ended.").await?;
        }
    }
    Ok(())
}

/// List running giveaways
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let service = GiveawayService::new(ctx.data().db.clone());
    let open = service.list_open(guild_id.get()).await?;

    if open.is_empty() {
        ctx.say("📭 No giveaways running right now.").await?;
        return Ok(());
    }

    let mut lines = Vec::new();
    for giveaway in open {
        let when = GiveawayService::parse_sqlite_utc(&giveaway.ends_at)
            .map(|dt| format!("<t:{}:R>", dt.timestamp()))
            .unwrap_or_else(|| giveaway.ends_at.clone());
        lines.push(format!(
            "• `{}` **{}** — ends {} (host <@{}>)",
            giveaway.giveaway_id, giveaway.prize, when, giveaway.host_id
        ));
    }
    ctx.say(super::clamp_reply(format!(
        "**Running giveaways:**\n{}",
        lines.join("\n")
    )))
    .await?;
    Ok(())
}

/// Cancel a giveaway you host
#[poise::command(slash_command, guild_only)]
pub async fn cancel(
    ctx: Context<'_>,
    #[description = "Giveaway ID"] id: i64,
) -> Result<(), Error> {
    let service = GiveawayService::new(ctx.data().db.clone());
    if service.cancel(id, ctx.author().id.get()).await? {
        ctx.say(format!("🛑 Giveaway `{id}` cancelled.")).await?;
    } else {
        ctx.say("❌ No open giveaway with that ID that you host.")
            .await?;
    }
    Ok(())
}
