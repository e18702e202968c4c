use super::Database;
use crate::rpg;
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub balance: i64,
    pub level: i64,
    pub xp: i64,
    pub class: String,
    pub hp: i64,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub adventure_count: i64,
    pub pvp_wins: i64,
    pub pvp_losses: i64,
    pub boss_kills: i64,
}

impl UserRecord {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp >= self.max_hp
    }

    pub fn win_rate(&self) -> f64 {
        let total = self.pvp_wins + self.pvp_losses;
        if total == 0 {
            return 0.0;
        }
        self.pvp_wins as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub leveled_up: bool,
    pub new_level: i64,
    pub new_xp: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardCategory {
    Level,
    Coins,
    Pvp,
    Bosses,
}

#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub username: String,
    pub level: i64,
    pub xp: i64,
    pub balance: i64,
    pub pvp_wins: i64,
    pub pvp_losses: i64,
    pub boss_kills: i64,
}

impl Database {
    pub fn ensure_user(&self, user_id: &str, username: &str) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO users (user_id, username) VALUES (?1, ?2)",
            (user_id, username),
        )?;
        // Keep the display name current.
        conn.execute(
            "UPDATE users SET username = ?2 WHERE user_id = ?1",
            (user_id, username),
        )?;
        Ok(())
    }

    pub fn get_user(&self, user_id: &str) -> anyhow::Result<Option<UserRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT user_id, username, balance, level, xp, class, hp, max_hp,
                    attack, defense, adventure_count, pvp_wins, pvp_losses, boss_kills
             FROM users WHERE user_id = ?1",
        )?;
        let mut rows = stmt.query([user_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(UserRecord {
                user_id: row.get(0)?,
                username: row.get(1)?,
                balance: row.get(2)?,
                level: row.get(3)?,
                xp: row.get(4)?,
                class: row.get(5)?,
                hp: row.get(6)?,
                max_hp: row.get(7)?,
                attack: row.get(8)?,
                defense: row.get(9)?,
                adventure_count: row.get(10)?,
                pvp_wins: row.get(11)?,
                pvp_losses: row.get(12)?,
                boss_kills: row.get(13)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Adds XP and coins, walking the level curve for as many level-ups as
    /// the new XP total covers. Balance never drops below zero.
    pub fn add_xp_and_coins(
        &self,
        user_id: &str,
        xp: i64,
        coins: i64,
    ) -> anyhow::Result<ProgressReport> {
        let conn = self.lock();
        let (level, old_xp, balance): (i64, i64, i64) = conn.query_row(
            "SELECT level, xp, balance FROM users WHERE user_id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut new_xp = old_xp + xp;
        let new_balance = (balance + coins).max(0);
        let mut new_level = level;
        let mut leveled_up = false;

        let mut needed = rpg::xp_for_level(new_level);
        while new_xp >= needed {
            new_xp -= needed;
            new_level += 1;
            leveled_up = true;
            needed = rpg::xp_for_level(new_level);
        }

        if leveled_up {
            let stats = rpg::stats_for_level(new_level);
            conn.execute(
                "UPDATE users SET level=?1, xp=?2, balance=?3, class=?4,
                                  max_hp=?5, hp=?5, attack=?6, defense=?7
                 WHERE user_id=?8",
                (
                    new_level,
                    new_xp,
                    new_balance,
                    stats.class,
                    stats.max_hp,
                    stats.attack,
                    stats.defense,
                    user_id,
                ),
            )?;
            debug!("User {} leveled up to {}", user_id, new_level);
        } else {
            conn.execute(
                "UPDATE users SET xp=?1, balance=?2 WHERE user_id=?3",
                (new_xp, new_balance, user_id),
            )?;
        }

        Ok(ProgressReport {
            leveled_up,
            new_level,
            new_xp,
            new_balance,
        })
    }

    pub fn set_hp(&self, user_id: &str, hp: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute("UPDATE users SET hp = ?1 WHERE user_id = ?2", (hp, user_id))?;
        Ok(())
    }

    /// Claims the daily reward. Returns false when already claimed for `date`.
    pub fn claim_daily(&self, user_id: &str, date: &str, amount: i64) -> anyhow::Result<bool> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE users SET balance = balance + ?1, last_daily = ?2
             WHERE user_id = ?3 AND (last_daily IS NULL OR last_daily <> ?2)",
            (amount, date, user_id),
        )?;
        Ok(changed > 0)
    }

    pub fn heal_full(&self, user_id: &str, cost: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET hp = max_hp, balance = balance - ?1 WHERE user_id = ?2",
            (cost, user_id),
        )?;
        Ok(())
    }

    /// Message-reward throttle: updates `last_message_ts` and reports whether
    /// a reward should be granted (i.e. the cooldown had elapsed).
    pub fn try_claim_message_reward(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        cooldown_secs: u64,
    ) -> anyhow::Result<bool> {
        let conn = self.lock();
        let last: Option<String> = conn.query_row(
            "SELECT last_message_ts FROM users WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;

        if let Some(last) = last {
            if let Ok(last) = DateTime::parse_from_rfc3339(&last) {
                let elapsed = now.signed_duration_since(last.with_timezone(&Utc));
                if elapsed.num_seconds() < cooldown_secs as i64 {
                    return Ok(false);
                }
            }
        }

        conn.execute(
            "UPDATE users SET last_message_ts = ?1 WHERE user_id = ?2",
            (now.to_rfc3339(), user_id),
        )?;
        Ok(true)
    }

    pub fn record_adventure(&self, user_id: &str, new_hp: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET hp = ?1, adventure_count = adventure_count + 1
             WHERE user_id = ?2",
            (new_hp, user_id),
        )?;
        Ok(())
    }

    pub fn record_boss_kill(&self, user_id: &str, new_hp: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET hp = ?1, adventure_count = adventure_count + 1,
                              boss_kills = boss_kills + 1
             WHERE user_id = ?2",
            (new_hp, user_id),
        )?;
        Ok(())
    }

    pub fn leaderboard(
        &self,
        category: LeaderboardCategory,
        limit: usize,
    ) -> anyhow::Result<Vec<LeaderboardRow>> {
        let order = match category {
            LeaderboardCategory::Level => "level DESC, xp DESC",
            LeaderboardCategory::Coins => "balance DESC",
            LeaderboardCategory::Pvp => "pvp_wins DESC",
            LeaderboardCategory::Bosses => "boss_kills DESC",
        };
        let sql = format!(
            "SELECT username, level, xp, balance, pvp_wins, pvp_losses, boss_kills
             FROM users ORDER BY {order} LIMIT ?1"
        );

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([limit], |row| {
            Ok(LeaderboardRow {
                username: row.get(0)?,
                level: row.get(1)?,
                xp: row.get(2)?,
                balance: row.get(3)?,
                pvp_wins: row.get(4)?,
                pvp_losses: row.get(5)?,
                boss_kills: row.get(6)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Periodic regeneration for everyone below max HP.
    pub fn regen_hp(&self, amount: i64) -> anyhow::Result<usize> {
        let conn = self.lock();
        let count = conn.execute(
            "UPDATE users SET hp = MIN(hp + ?1, max_hp) WHERE hp < max_hp",
            [amount],
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ensure_and_get_user() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.ensure_user("1", "alice2").unwrap();

        let user = db.get_user("1").unwrap().unwrap();
        assert_eq!(user.username, "alice2");
        assert_eq!(user.level, 1);
        assert_eq!(user.hp, 100);
        assert!(user.is_alive());
        assert!(user.is_full_hp());
        assert_eq!(user.win_rate(), 0.0);

        assert!(db.get_user("2").unwrap().is_none());
    }

    #[test]
    fn test_add_xp_levels_up_and_restores_stats() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.set_hp("1", 10).unwrap();

        // Level 1 needs 100 XP, level 2 needs 150: 260 XP crosses two levels.
        let report = db.add_xp_and_coins("1", 260, 30).unwrap();
        assert!(report.leveled_up);
        assert_eq!(report.new_level, 3);
        assert_eq!(report.new_xp, 10);
        assert_eq!(report.new_balance, 30);

        let user = db.get_user("1").unwrap().unwrap();
        assert_eq!(user.level, 3);
        assert_eq!(user.max_hp, 120);
        // Level-up fully restores HP.
        assert_eq!(user.hp, 120);
        assert_eq!(user.attack, 14);
        assert_eq!(user.defense, 7);
    }

    #[test]
    fn test_balance_floors_at_zero() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        let report = db.add_xp_and_coins("1", 0, -500).unwrap();
        assert_eq!(report.new_balance, 0);
    }

    #[test]
    fn test_claim_daily_once_per_day() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        assert!(db.claim_daily("1", "2026-08-26", 100).unwrap());
        assert!(!db.claim_daily("1", "2026-08-26", 100).unwrap());
        assert!(db.claim_daily("1", "2026-08-27", 100).unwrap());

        let user = db.get_user("1").unwrap().unwrap();
        assert_eq!(user.balance, 200);
    }

    #[test]
    fn test_message_reward_throttle() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        let t0 = Utc::now();
        assert!(db.try_claim_message_reward("1", t0, 60).unwrap());
        assert!(!db
            .try_claim_message_reward("1", t0 + Duration::seconds(30), 60)
            .unwrap());
        assert!(db
            .try_claim_message_reward("1", t0 + Duration::seconds(61), 60)
            .unwrap());
    }

    #[test]
    fn test_leaderboard_ordering() {
        let db = test_db();
        for (id, name, coins) in [("1", "a", 10), ("2", "b", 50), ("3", "c", 30)] {
            db.ensure_user(id, name).unwrap();
            db.add_xp_and_coins(id, 0, coins).unwrap();
        }

        let rows = db.leaderboard(LeaderboardCategory::Coins, 10).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        let rows = db.leaderboard(LeaderboardCategory::Coins, 2).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_regen_hp_clamps_to_max() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.ensure_user("2", "bob").unwrap();
        db.set_hp("1", 95).unwrap();
        db.set_hp("2", 40).unwrap();

        let touched = db.regen_hp(10).unwrap();
        assert_eq!(touched, 2);

        assert_eq!(db.get_user("1").unwrap().unwrap().hp, 100);
        assert_eq!(db.get_user("2").unwrap().unwrap().hp, 50);
    }
}
