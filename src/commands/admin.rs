use crate::{Context, Error};
use tracing::info;

/// Show available commands
#[poise::command(slash_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help for"] command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "An RPG lives in this server. Start with /profile.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Restart the bot process (Owner only)
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn reboot(ctx: Context<'_>) -> Result<(), Error> {
    info!("Reboot command received from owner: {}", ctx.author().name);
    ctx.say("🔄 Rebooting... back in a moment.").await?;

    // Leave no orphaned child behind; the supervisor restarts us.
    if ctx.data().server.is_running().await {
        if let Err(e) = ctx.data().server.stop().await {
            info!("Game server did not stop cleanly before reboot: {}", e);
        }
    }
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}

/// Shut down the bot (Owner only)
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    info!("Shutdown command received from owner: {}", ctx.author().name);
    ctx.say("👋 Shutting down...").await?;
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}
