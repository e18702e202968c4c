use poise::serenity_prelude as serenity;
use tracing::{error, info};
use turingbot::giveaways::GiveawayDispatcher;
use turingbot::services::giveaway::GiveawayService;
use turingbot::services::user::UserService;
use turingbot::{commands, config::Config, events, Data};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let mut owners = std::collections::HashSet::new();
    if let Some(owner_id) = config.owner_id {
        owners.insert(serenity::UserId::new(owner_id));
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            owners,
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::Message { new_message } => {
                            if let Err(e) = events::handle_message(ctx, data, new_message).await {
                                error!("Message handler failed: {}", e);
                            }
                        }
                        serenity::FullEvent::ReactionAdd { add_reaction } => {
                            if let Err(e) =
                                events::handle_reaction_add(ctx, data, add_reaction).await
                            {
                                error!("Reaction add handler failed: {}", e);
                            }
                        }
                        serenity::FullEvent::ReactionRemove { removed_reaction } => {
                            if let Err(e) =
                                events::handle_reaction_remove(ctx, data, removed_reaction).await
                            {
                                error!("Reaction remove handler failed: {}", e);
                            }
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let db = turingbot::db::Database::new(&config)?;
                db.execute_init()?;

                // Periodic HP regeneration for everyone below max.
                let regen_service = UserService::new(db.clone());
                let regen_interval = config.hp_regen_interval_secs;
                let regen_amount = config.hp_regen_amount;
                tokio::spawn(async move {
                    let mut ticker =
                        tokio::time::interval(std::time::Duration::from_secs(regen_interval));
                    loop {
                        ticker.tick().await;
                        match regen_service.regen_all(regen_amount).await {
                            Ok(0) => {}
                            Ok(n) => info!("Regenerated HP for {} users", n),
                            Err(e) => error!("HP regen cycle failed: {}", e),
                        }
                    }
                });

                // Finish due giveaways in the background.
                let dispatcher = GiveawayDispatcher::new(
                    GiveawayService::new(db.clone()),
                    ctx.http.clone(),
                    config.giveaway_poll_secs,
                    10,
                );
                tokio::spawn(dispatcher.run());

                let server =
                    std::sync::Arc::new(turingbot::gameserver::ServerManager::new(&config));

                Ok(Data {
                    config,
                    http_client: reqwest::Client::new(),
                    db,
                    cooldowns: turingbot::cooldown::CooldownTracker::new(),
                    undercover: turingbot::undercover::UndercoverManager::new(),
                    server,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
