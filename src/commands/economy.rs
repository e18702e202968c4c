use crate::error::GameError;
use crate::services::user::UserService;
use crate::{Context, Error};
use rand::Rng;

/// Claim your daily reward
#[poise::command(slash_command, guild_only)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    let service = UserService::new(ctx.data().db.clone());
    service.ensure(author.id.get(), &author.name).await?;

    let user = service
        .profile(author.id.get())
        .await?
        .ok_or("profile missing after ensure")?;

    let amount = {
        let mut rng = rand::thread_rng();
        rng.gen_range(50..=150) + user.level * 10
    };

    match service.claim_daily(author.id.get(), amount).await? {
        Some(amount) => {
            ctx.say(format!(
                "💰 You claimed your daily reward of **{amount}** coins!"
            ))
            .await?;
        }
        None => {
            ctx.say("⏳ You already claimed your daily reward today. Come back tomorrow!")
                .await?;
        }
    }
    Ok(())
}

/// Fully heal for a fee
#[poise::command(slash_command, guild_only)]
pub async fn heal(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    let service = UserService::new(ctx.data().db.clone());
    service.ensure(author.id.get(), &author.name).await?;

    let user = service
        .profile(author.id.get())
        .await?
        .ok_or("profile missing after ensure")?;
    if user.is_full_hp() {
        ctx.say("💚 You are already at full HP.").await?;
        return Ok(());
    }

    match service.heal(author.id.get()).await? {
        Ok(cost) => {
            ctx.say(format!(
                "✨ The healer restores you to **{}/{} HP** for {cost} coins.",
                user.max_hp, user.max_hp
            ))
            .await?;
        }
        Err(error @ GameError::InsufficientFunds(_)) => {
            ctx.say(format!("❌ {error} You have {}.", user.balance))
                .await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}
