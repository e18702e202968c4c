use crate::services::quest::QuestService;
use crate::services::user::UserService;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Quests: earn rewards for playing
#[poise::command(
    slash_command,
    subcommands("list", "active", "accept", "redeem"),
    guild_only
)]
pub async fn quest(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show quests you can take on
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    UserService::new(ctx.data().db.clone())
        .ensure(author.id.get(), &author.name)
        .await?;

    let service = QuestService::new(ctx.data().db.clone());
    let board = service.board(author.id.get()).await?;

    if board.is_empty() {
        ctx.say("📭 No new quests at your level right now.").await?;
        return Ok(());
    }

    let lines: Vec<String> = board
        .iter()
        .take(15)
        .map(|q| {
            format!(
                "`{}` **{}** — {} (lvl {})\n└ 💰 {} coins · ✨ {} XP",
                q.quest_id, q.name, q.description, q.requirement_level, q.reward_coins, q.reward_xp
            )
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("📜 Quest Board")
        .color(0x1ABC9C)
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(
            "Take a quest with /quest accept <id>",
        ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show your quests in progress
#[poise::command(slash_command, guild_only)]
pub async fn active(ctx: Context<'_>) -> Result<(), Error> {
    let service = QuestService::new(ctx.data().db.clone());
    let active = service.active(ctx.author().id.get()).await?;

    if active.is_empty() {
        ctx.say("📭 You have no active quests. Browse `/quest list`.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = active
        .iter()
        .map(|q| {
            let done = q.progress >= q.quest.target;
            let marker = if done { "✅" } else { "▫️" };
            format!(
                "{marker} **{}** — {}/{}",
                q.quest.name,
                q.progress.min(q.quest.target),
                q.quest.target
            )
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("📖 Active Quests")
        .color(0x1ABC9C)
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(
            "Claim finished quests with /quest redeem",
        ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Take on a quest
#[poise::command(slash_command, guild_only)]
pub async fn accept(
    ctx: Context<'_>,
    #[description = "Quest ID from /quest list"] quest_id: i64,
) -> Result<(), Error> {
    let author = ctx.author();
    UserService::new(ctx.data().db.clone())
        .ensure(author.id.get(), &author.name)
        .await?;

    let service = QuestService::new(ctx.data().db.clone());
    match service.accept(author.id.get(), quest_id).await? {
        Ok(quest) => {
            ctx.say(format!(
                "📜 Quest accepted: **{}** — {}",
                quest.name, quest.description
            ))
            .await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}

/// Claim rewards for finished quests
#[poise::command(slash_command, guild_only)]
pub async fn redeem(ctx: Context<'_>) -> Result<(), Error> {
    let service = QuestService::new(ctx.data().db.clone());
    let completed = service.redeem(ctx.author().id.get()).await?;

    if completed.is_empty() {
        ctx.say("📭 Nothing to claim yet. Check `/quest active` for progress.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = completed
        .iter()
        .map(|q| {
            format!(
                "🎉 **{}** — +{} coins, +{} XP",
                q.name, q.reward_coins, q.reward_xp
            )
        })
        .collect();
    ctx.say(super::clamp_reply(lines.join("\n"))).await?;
    Ok(())
}
