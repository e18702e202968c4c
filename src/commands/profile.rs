use crate::db::users::LeaderboardCategory;
use crate::services::user::UserService;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use poise::ChoiceParameter;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LeaderboardChoice {
    #[name = "level"]
    Level,
    #[name = "coins"]
    Coins,
    #[name = "pvp"]
    Pvp,
    #[name = "bosses"]
    Bosses,
}

impl From<LeaderboardChoice> for LeaderboardCategory {
    fn from(choice: LeaderboardChoice) -> Self {
        match choice {
            LeaderboardChoice::Level => LeaderboardCategory::Level,
            LeaderboardChoice::Coins => LeaderboardCategory::Coins,
            LeaderboardChoice::Pvp => LeaderboardCategory::Pvp,
            LeaderboardChoice::Bosses => LeaderboardCategory::Bosses,
        }
    }
}

/// Show a character sheet
#[poise::command(slash_command, guild_only)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Whose profile to show (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let service = UserService::new(ctx.data().db.clone());
    service.ensure(target.id.get(), &target.name).await?;

    let Some(record) = service.profile(target.id.get()).await? else {
        ctx.say("❌ No profile found.").await?;
        return Ok(());
    };

    let equipped = {
        let user_id = record.user_id.clone();
        ctx.data()
            .db
            .run_blocking(move |db| db.get_equipped_items(&user_id))
            .await?
    };
    let equipment = if equipped.is_empty() {
        "None".to_string()
    } else {
        equipped.join(", ")
    };

    let xp_needed = crate::rpg::xp_for_level(record.level);
    let embed = serenity::CreateEmbed::new()
        .title(format!("{} — {}", record.username, record.class))
        .color(0x5865F2)
        .field("Level", format!("{} ({}/{} XP)", record.level, record.xp, xp_needed), true)
        .field("Coins", record.balance.to_string(), true)
        .field("HP", format!("{}/{}", record.hp, record.max_hp), true)
        .field("Attack", record.attack.to_string(), true)
        .field("Defense", record.defense.to_string(), true)
        .field("Adventures", record.adventure_count.to_string(), true)
        .field(
            "PvP",
            format!(
                "{}W / {}L ({:.0}%)",
                record.pvp_wins,
                record.pvp_losses,
                record.win_rate()
            ),
            true,
        )
        .field("Boss kills", record.boss_kills.to_string(), true)
        .field("Equipment", equipment, false);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the server rankings
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[description = "What to rank by (default: level)"] category: Option<LeaderboardChoice>,
) -> Result<(), Error> {
    let choice = category.unwrap_or(LeaderboardChoice::Level);
    let service = UserService::new(ctx.data().db.clone());
    let rows = service.leaderboard(choice.into(), 10).await?;

    if rows.is_empty() {
        ctx.say("📭 Nobody is on the board yet.").await?;
        return Ok(());
    }

    let mut lines = Vec::new();
    for (rank, row) in rows.iter().enumerate() {
        let medal = match rank {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "▫️",
        };
        let value = match choice {
            LeaderboardChoice::Level => format!("level {} ({} XP)", row.level, row.xp),
            LeaderboardChoice::Coins => format!("{} coins", row.balance),
            LeaderboardChoice::Pvp => format!("{}W / {}L", row.pvp_wins, row.pvp_losses),
            LeaderboardChoice::Bosses => format!("{} boss kills", row.boss_kills),
        };
        lines.push(format!("{medal} **{}** — {}", row.username, value));
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("🏆 Leaderboard — {}", choice.name()))
        .color(0xF1C40F)
        .description(lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
