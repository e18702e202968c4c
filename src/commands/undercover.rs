use crate::undercover::{
    Conclusion, JoinError, StartError, VoteError, VoteOutcome, MIN_PLAYERS,
};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

fn guild_key(ctx: &Context<'_>) -> Result<u64, Error> {
    Ok(ctx.guild_id().ok_or("Must be run in a guild")?.get())
}

/// Undercover: a social deduction word game
#[poise::command(
    slash_command,
    subcommands("open", "join", "leave", "start", "vote", "status", "stop"),
    guild_only
)]
pub async fn undercover(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Open a lobby for a new game
#[poise::command(slash_command, guild_only)]
pub async fn open(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;
    let author = ctx.author();

    let result = ctx.data().undercover.with_game(guild, |game| {
        if game.is_started() {
            return Err("A game is already running. Finish it or `/undercover stop` first.");
        }
        game.reset();
        game.join(author.id.get(), &author.name)
            .map_err(|_| "Could not open the lobby.")
    });

    match result {
        Ok(()) => {
            ctx.say(format!(
                "🕵️ **{}** opened an Undercover lobby! Join with `/undercover join` (minimum {MIN_PLAYERS} players).",
                author.name
            ))
            .await?;
        }
        Err(message) => {
            ctx.say(format!("❌ {message}")).await?;
        }
    }
    Ok(())
}

/// Join the open lobby
#[poise::command(slash_command, guild_only)]
pub async fn join(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;
    let author = ctx.author();

    let result = ctx
        .data()
        .undercover
        .with_game(guild, |game| game.join(author.id.get(), &author.name));

    match result {
        Ok(()) => {
            let count = ctx
                .data()
                .undercover
                .with_game(guild, |game| game.players().len());
            ctx.say(format!(
                "✅ **{}** joined the lobby ({count} players).",
                author.name
            ))
            .await?;
        }
        Err(JoinError::AlreadyStarted) => {
            ctx.say("❌ The game already started.").await?;
        }
        Err(JoinError::AlreadyJoined) => {
            ctx.say("❌ You are already in the lobby.").await?;
        }
    }
    Ok(())
}

/// Leave the lobby before the game starts
#[poise::command(slash_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;
    let author = ctx.author();

    let left = ctx
        .data()
        .undercover
        .with_game(guild, |game| game.leave(author.id.get()));

    if left {
        ctx.say(format!("👋 **{}** left the lobby.", author.name))
            .await?;
    } else {
        ctx.say("❌ You can't leave now (not in the lobby, or the game already started).")
            .await?;
    }
    Ok(())
}

/// Start the game and deal secret words
#[poise::command(slash_command, guild_only)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;

    let result = ctx.data().undercover.with_game(guild, |game| {
        let mut rng = rand::thread_rng();
        game.start(&mut rng)
    });

    let assignments = match result {
        Ok(assignments) => assignments,
        Err(StartError::AlreadyStarted) => {
            ctx.say("❌ The game already started.").await?;
            return Ok(());
        }
        Err(StartError::NotEnoughPlayers(n)) => {
            ctx.say(format!(
                "❌ Need at least {MIN_PLAYERS} players to start ({n} in the lobby)."
            ))
            .await?;
            return Ok(());
        }
    };

    // Words go out by DM so only each player sees their own.
    let mut undeliverable = Vec::new();
    for assignment in &assignments {
        let user_id = serenity::UserId::new(assignment.player.id);
        let content = format!(
            "🤫 Your secret word is: **{}**\nDescribe it without saying it. One of you has a different word...",
            assignment.word
        );
        let delivered = async {
            let dm = user_id.create_dm_channel(ctx.serenity_context()).await?;
            dm.id.say(ctx.http(), content).await?;
            Ok::<_, serenity::Error>(())
        }
        .await;
        if delivered.is_err() {
            undeliverable.push(assignment.player.name.clone());
        }
    }

    let mut text = format!(
        "🕵️ The game begins with {} players! Check your DMs for your secret word, describe it in turn, then vote with `/undercover vote`.",
        assignments.len()
    );
    if !undeliverable.is_empty() {
        text.push_str(&format!(
            "\n⚠️ Could not DM: {}. They may need to allow DMs from this server.",
            undeliverable.join(", ")
        ));
    }
    ctx.say(text).await?;
    Ok(())
}

/// Vote to eliminate a suspect
#[poise::command(slash_command, guild_only)]
pub async fn vote(
    ctx: Context<'_>,
    #[description = "Who you think is the undercover"] suspect: serenity::User,
) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;
    let author = ctx.author();

    let result = ctx.data().undercover.with_game(guild, |game| {
        let mut rng = rand::thread_rng();
        game.cast_vote(author.id.get(), suspect.id.get(), &mut rng)
    });

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(VoteError::NotStarted) => {
            ctx.say("❌ No game is running.").await?;
            return Ok(());
        }
        Err(VoteError::NotAPlayer) => {
            ctx.say("❌ You are not in this game.").await?;
            return Ok(());
        }
        Err(VoteError::InvalidTarget) => {
            ctx.say("❌ You can only vote for another living player.")
                .await?;
            return Ok(());
        }
        Err(VoteError::AlreadyVoted) => {
            ctx.say("❌ You already voted this round.").await?;
            return Ok(());
        }
    };

    match outcome {
        VoteOutcome::Recorded { votes_cast, needed } => {
            ctx.say(format!(
                "🗳️ Vote recorded ({votes_cast}/{needed})."
            ))
            .await?;
        }
        VoteOutcome::RoundComplete(result) => {
            let text = match result.conclusion {
                Conclusion::CiviliansWin => format!(
                    "⚖️ **{}** is eliminated... and was the undercover! 🎉 The civilians win!",
                    result.eliminated.name
                ),
                Conclusion::UndercoverWins => format!(
                    "⚖️ **{}** is eliminated... a civilian! Too few players remain: 😈 the undercover wins!",
                    result.eliminated.name
                ),
                Conclusion::Continues => format!(
                    "⚖️ **{}** is eliminated... a civilian! The undercover is still among you. Next round: describe and vote again.",
                    result.eliminated.name
                ),
            };
            ctx.say(text).await?;
        }
    }
    Ok(())
}

/// Show the lobby or game state
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;

    let (started, names, votes) = ctx.data().undercover.with_game(guild, |game| {
        let names: Vec<String> = game.players().iter().map(|p| p.name.clone()).collect();
        (game.is_started(), names, game.votes_cast())
    });

    if names.is_empty() {
        ctx.say("📭 No game or lobby. Open one with `/undercover open`.")
            .await?;
        return Ok(());
    }

    let phase = if started {
        format!("in progress — {votes}/{} votes this round", names.len())
    } else {
        "waiting in the lobby".to_string()
    };
    ctx.say(format!(
        "🕵️ Undercover {phase}\nPlayers: {}",
        names.join(", ")
    ))
    .await?;
    Ok(())
}

/// Abort the current game
#[poise::command(slash_command, guild_only)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let guild = guild_key(&ctx)?;
    let had_game = ctx.data().undercover.with_game(guild, |game| {
        let had = !game.players().is_empty();
        game.reset();
        had
    });

    if had_game {
        ctx.say("🛑 Game aborted.").await?;
    } else {
        ctx.say("📭 Nothing to stop.").await?;
    }
    Ok(())
}
