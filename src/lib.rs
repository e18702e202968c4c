pub mod calc;
pub mod commands;
pub mod config;
pub mod cooldown;
pub mod db;
pub mod error;
pub mod events;
pub mod gameserver;
pub mod giveaways;
pub mod rpg;
pub mod services;
pub mod undercover;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub http_client: reqwest::Client,
    pub db: db::Database,
    pub cooldowns: cooldown::CooldownTracker,
    pub undercover: undercover::UndercoverManager,
    pub server: std::sync::Arc<gameserver::ServerManager>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
