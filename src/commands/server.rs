use crate::{Context, Error};
use tracing::info;

/// Control the game server process (Owner only)
#[poise::command(
    slash_command,
    subcommands("start", "stop", "restart", "run", "status"),
    owners_only,
    hide_in_help
)]
pub async fn server(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Start the game server
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().server.start().await {
        Ok(pid) => {
            info!("Game server started by {} (pid {})", ctx.author().name, pid);
            ctx.say(format!("🟢 Game server started (pid {pid}).")).await?;
        }
        Err(e) => {
            ctx.say(format!("❌ Failed to start: {e}")).await?;
        }
    }
    Ok(())
}

/// Stop the game server
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().server.stop().await {
        Ok(()) => {
            info!("Game server stopped by {}", ctx.author().name);
            ctx.say("🔴 Game server stopped.").await?;
        }
        Err(e) => {
            ctx.say(format!("❌ Failed to stop: {e}")).await?;
        }
    }
    Ok(())
}

/// Restart the game server
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn restart(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    match ctx.data().server.restart().await {
        Ok(pid) => {
            info!("Game server restarted by {} (pid {})", ctx.author().name, pid);
            ctx.say(format!("🔄 Game server restarted (pid {pid}).")).await?;
        }
        Err(e) => {
            ctx.say(format!("❌ Failed to restart: {e}")).await?;
        }
    }
    Ok(())
}

/// Send a console command to the game server
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn run(
    ctx: Context<'_>,
    #[description = "Console command"] command: String,
) -> Result<(), Error> {
    match ctx.data().server.send_command(&command).await {
        Ok(()) => {
            info!("Console command from {}: {}", ctx.author().name, command);
            ctx.say(format!("📨 Sent: `{command}`")).await?;
        }
        Err(e) => {
            ctx.say(format!("❌ {e}")).await?;
        }
    }
    Ok(())
}

/// Check whether the game server is running
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    if ctx.data().server.is_running().await {
        ctx.say("🟢 Game server is running.").await?;
    } else {
        ctx.say("🔴 Game server is not running.").await?;
    }
    Ok(())
}
