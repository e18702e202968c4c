use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub owner_id: Option<u64>,
    pub database_url: String,
    pub giphy_api_key: Option<String>,
    pub status_message: String,

    // Gameplay pacing
    pub message_reward_cooldown_secs: u64,
    pub adventure_cooldown_secs: u64,
    pub pvp_cooldown_secs: u64,
    pub pvp_challenge_timeout_secs: u64,

    // Background tasks
    pub hp_regen_interval_secs: u64,
    pub hp_regen_amount: i64,
    pub giveaway_poll_secs: u64,

    // Managed game-server process
    pub game_server_dir: Option<String>,
    pub game_server_command: String,
    pub game_server_stop_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/turingbot.db".to_string()),
            giphy_api_key: env::var("GIPHY_API_KEY").ok(),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Adventuring!".to_string()),
            message_reward_cooldown_secs: parse_or("MESSAGE_REWARD_COOLDOWN_SECS", 60),
            adventure_cooldown_secs: parse_or("ADVENTURE_COOLDOWN_SECS", 300),
            pvp_cooldown_secs: parse_or("PVP_COOLDOWN_SECS", 600),
            pvp_challenge_timeout_secs: parse_or("PVP_CHALLENGE_TIMEOUT_SECS", 60),
            hp_regen_interval_secs: parse_or("HP_REGEN_INTERVAL_SECS", 300),
            hp_regen_amount: parse_or("HP_REGEN_AMOUNT", 10),
            giveaway_poll_secs: parse_or("GIVEAWAY_POLL_SECS", 15),
            game_server_dir: env::var("GAME_SERVER_DIR").ok(),
            game_server_command: env::var("GAME_SERVER_COMMAND").unwrap_or_else(|_| {
                "java -Xmx2G -Xms2G -jar paper-1.21.4.jar --nogui".to_string()
            }),
            game_server_stop_timeout_secs: parse_or("GAME_SERVER_STOP_TIMEOUT_SECS", 30),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("database_url", &self.database_url)
            .field(
                "giphy_api_key",
                &self.giphy_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("status_message", &self.status_message)
            .field(
                "message_reward_cooldown_secs",
                &self.message_reward_cooldown_secs,
            )
            .field("adventure_cooldown_secs", &self.adventure_cooldown_secs)
            .field("pvp_cooldown_secs", &self.pvp_cooldown_secs)
            .field(
                "pvp_challenge_timeout_secs",
                &self.pvp_challenge_timeout_secs,
            )
            .field("hp_regen_interval_secs", &self.hp_regen_interval_secs)
            .field("hp_regen_amount", &self.hp_regen_amount)
            .field("giveaway_poll_secs", &self.giveaway_poll_secs)
            .field("game_server_dir", &self.game_server_dir)
            .field("game_server_command", &self.game_server_command)
            .field(
                "game_server_stop_timeout_secs",
                &self.game_server_stop_timeout_secs,
            )
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing token must fail
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when DISCORD_TOKEN is missing");

        // 2. Defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.adventure_cooldown_secs, 300);
        assert_eq!(config.pvp_cooldown_secs, 600);
        assert_eq!(config.hp_regen_amount, 10);

        // 3. Debug redaction
        env::set_var("GIPHY_API_KEY", "secret_api_key");
        let config_redacted = Config::build().unwrap();
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("GIPHY_API_KEY");
    }
}
