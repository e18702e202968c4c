use crate::config::Config;
use rusqlite::{Connection, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub mod giveaways;
pub mod inventory;
pub mod pvp;
pub mod quests;
pub mod reaction_roles;
pub mod shop;
pub mod users;

pub use giveaways::{GiveawayRecord, GiveawayStatus};
pub use inventory::InventoryEntry;
pub use quests::{ActiveQuestRecord, CompletedQuest, QuestRecord};
pub use reaction_roles::ReactionRoleRecord;
pub use shop::ShopItem;
pub use users::UserRecord;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        let conn = Connection::open(&config.database_url)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs a blocking database closure off the async executor.
    pub async fn run_blocking<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                username TEXT,
                balance INTEGER DEFAULT 0,
                last_daily TEXT,
                last_message_ts TEXT,
                level INTEGER DEFAULT 1,
                xp INTEGER DEFAULT 0,
                class TEXT DEFAULT 'Novice',
                hp INTEGER DEFAULT 100,
                max_hp INTEGER DEFAULT 100,
                attack INTEGER DEFAULT 10,
                defense INTEGER DEFAULT 5,
                adventure_count INTEGER DEFAULT 0,
                pvp_wins INTEGER DEFAULT 0,
                pvp_losses INTEGER DEFAULT 0,
                boss_kills INTEGER DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS inventory (
                user_id TEXT NOT NULL,
                item TEXT NOT NULL,
                quantity INTEGER DEFAULT 1,
                equipped INTEGER DEFAULT 0,
                PRIMARY KEY(user_id, item)
            );

            CREATE TABLE IF NOT EXISTS shop (
                item TEXT PRIMARY KEY,
                description TEXT,
                price INTEGER,
                item_type TEXT,
                stat_bonus TEXT,
                bonus_value INTEGER DEFAULT 0,
                level_req INTEGER DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS quests (
                quest_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE,
                description TEXT,
                reward_coins INTEGER,
                reward_xp INTEGER,
                requirement_level INTEGER DEFAULT 1,
                quest_type TEXT DEFAULT 'adventure',
                target INTEGER DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS user_quests (
                user_id TEXT NOT NULL,
                quest_id INTEGER NOT NULL,
                status TEXT DEFAULT 'active',
                progress INTEGER DEFAULT 0,
                PRIMARY KEY(user_id, quest_id)
            );

            CREATE TABLE IF NOT EXISTS pvp (
                battle_id INTEGER PRIMARY KEY AUTOINCREMENT,
                attacker_id TEXT NOT NULL,
                defender_id TEXT NOT NULL,
                winner_id TEXT NOT NULL,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                attacker_power INTEGER,
                defender_power INTEGER
            );

            CREATE TABLE IF NOT EXISTS reaction_roles (
                guild_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                emoji TEXT NOT NULL,
                role_id TEXT NOT NULL,
                UNIQUE(message_id, emoji)
            );
            CREATE INDEX IF NOT EXISTS idx_reaction_roles_guild ON reaction_roles (guild_id);

            CREATE TABLE IF NOT EXISTS reaction_role_messages (
                guild_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                message_id TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS giveaways (
                giveaway_id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                host_id TEXT NOT NULL,
                prize TEXT NOT NULL,
                ends_at DATETIME NOT NULL,
                status TEXT DEFAULT 'open',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_giveaways_due ON giveaways (status, ends_at);

            CREATE TABLE IF NOT EXISTS giveaway_entries (
                giveaway_id INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                PRIMARY KEY(giveaway_id, user_id)
            );
        ";
        {
            let conn = self.conn.lock().unwrap();
            conn.execute_batch(sql)?;
        }
        self.seed_shop()?;
        self.seed_quests()?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn test_config() -> Config {
        Config {
            discord_token: "test".to_string(),
            owner_id: Some(1),
            database_url: ":memory:".to_string(),
            giphy_api_key: None,
            status_message: "test".to_string(),
            message_reward_cooldown_secs: 60,
            adventure_cooldown_secs: 300,
            pvp_cooldown_secs: 600,
            pvp_challenge_timeout_secs: 60,
            hp_regen_interval_secs: 300,
            hp_regen_amount: 10,
            giveaway_poll_secs: 15,
            game_server_dir: None,
            game_server_command: "true".to_string(),
            game_server_stop_timeout_secs: 5,
        }
    }

    pub fn test_db() -> Database {
        let db = Database::new(&test_config()).unwrap();
        db.execute_init().unwrap();
        db
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::test_db;

    #[test]
    fn test_init_is_idempotent_and_seeds() {
        let db = test_db();
        db.execute_init().unwrap();

        let conn = db.lock();
        let shop_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM shop", [], |row| row.get(0))
            .unwrap();
        let quest_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM quests", [], |row| row.get(0))
            .unwrap();
        assert!(shop_count >= 8);
        assert!(quest_count >= 20);
    }
}
