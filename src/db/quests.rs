use super::Database;
use crate::error::GameError;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct QuestRecord {
    pub quest_id: i64,
    pub name: String,
    pub description: String,
    pub reward_coins: i64,
    pub reward_xp: i64,
    pub requirement_level: i64,
    pub quest_type: String,
    pub target: i64,
}

#[derive(Debug, Clone)]
pub struct ActiveQuestRecord {
    pub quest: QuestRecord,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuest {
    pub name: String,
    pub reward_coins: i64,
    pub reward_xp: i64,
}

/// Quest progress is derived from the matching stat column on the users row.
fn stat_column(quest_type: &str) -> Option<&'static str> {
    match quest_type {
        "adventure" => Some("adventure_count"),
        "pvp" => Some("pvp_wins"),
        "boss" => Some("boss_kills"),
        "coins" => Some("balance"),
        _ => None,
    }
}

type SeedQuest = (&'static str, &'static str, i64, i64, i64, &'static str, i64);

const QUEST_SEED: &[SeedQuest] = &[
    // Adventure
    ("Novice Explorer", "Complete 5 adventures", 100, 50, 1, "adventure", 5),
    ("Adventurer", "Complete 20 adventures", 500, 200, 5, "adventure", 20),
    ("Veteran Adventurer", "Complete 50 adventures", 1500, 600, 10, "adventure", 50),
    ("Master Explorer", "Complete 100 adventures", 3000, 1200, 15, "adventure", 100),
    ("Legendary Explorer", "Complete 200 adventures", 7000, 2500, 20, "adventure", 200),
    ("Legendary Adventurer", "Complete 500 adventures", 20000, 10000, 25, "adventure", 500),
    // PvP
    ("Warrior Initiate", "Win 5 PvP battles", 300, 150, 3, "pvp", 5),
    ("Champion", "Win 20 PvP battles", 1000, 500, 10, "pvp", 20),
    ("PvP Master", "Win 50 PvP battles", 3000, 1500, 15, "pvp", 50),
    ("Gladiator", "Win 100 PvP battles", 7000, 3500, 20, "pvp", 100),
    ("Arena Legend", "Win 200 PvP battles", 15000, 7000, 25, "pvp", 200),
    ("PvP God", "Win 500 PvP battles", 500000, 250000, 45, "pvp", 500),
    // Coins
    ("Treasure Hunter", "Collect 1000 coins", 200, 100, 1, "coins", 1000),
    ("Wealthy Merchant", "Collect 5000 coins", 800, 400, 8, "coins", 5000),
    ("Coin Collector", "Collect 10000 coins", 2000, 1000, 12, "coins", 10000),
    ("Rich Trader", "Collect 50000 coins", 8000, 4000, 18, "coins", 50000),
    ("Tycoon", "Collect 100000 coins", 20000, 10000, 25, "coins", 100000),
    ("Hoarder", "Collect 250000 coins", 50000, 25000, 30, "coins", 250000),
    ("Banker", "Collect 500000 coins", 100000, 50000, 35, "coins", 500000),
    ("Magnate", "Collect 1,000,000 coins", 250000, 125000, 40, "coins", 1000000),
    // Bosses
    ("Dragon Apprentice", "Defeat 5 bosses", 600, 300, 10, "boss", 5),
    ("Boss Slayer", "Defeat 20 bosses", 2000, 1000, 15, "boss", 20),
    ("Legendary Hunter", "Defeat 50 bosses", 5000, 2500, 20, "boss", 50),
    ("Elite Boss Slayer", "Defeat 100 bosses", 12000, 6000, 25, "boss", 100),
    ("Mythic Conqueror", "Defeat 200 bosses", 25000, 12500, 30, "boss", 200),
    ("Titan Vanquisher", "Defeat 300 bosses", 50000, 25000, 35, "boss", 300),
    ("Ultimate Boss Hunter", "Defeat 500 bosses", 100000, 50000, 40, "boss", 500),
    ("Godslayer", "Defeat 2000 bosses", 1000000, 500000, 55, "boss", 2000),
];

impl Database {
    pub(super) fn seed_quests(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO quests
                 (name, description, reward_coins, reward_xp, requirement_level, quest_type, target)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in QUEST_SEED {
            stmt.execute(*row)?;
        }
        Ok(())
    }

    pub fn available_quests(&self, user_level: i64) -> anyhow::Result<Vec<QuestRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT quest_id, name, description, reward_coins, reward_xp,
                    requirement_level, quest_type, target
             FROM quests
             WHERE requirement_level <= ?1
             ORDER BY requirement_level, quest_id",
        )?;
        let rows = stmt.query_map([user_level], map_quest)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn active_quests(&self, user_id: &str) -> anyhow::Result<Vec<ActiveQuestRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT q.quest_id, q.name, q.description, q.reward_coins, q.reward_xp,
                    q.requirement_level, q.quest_type, q.target, uq.progress
             FROM user_quests uq
             JOIN quests q ON uq.quest_id = q.quest_id
             WHERE uq.user_id = ?1 AND uq.status = 'active'
             ORDER BY q.quest_id",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(ActiveQuestRecord {
                quest: map_quest(row)?,
                progress: row.get(8)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn accept_quest(
        &self,
        user_id: &str,
        quest_id: i64,
    ) -> anyhow::Result<Result<QuestRecord, GameError>> {
        let conn = self.lock();

        let existing: Option<String> = conn
            .query_row(
                "SELECT status FROM user_quests WHERE user_id = ?1 AND quest_id = ?2",
                (user_id, quest_id),
                |row| row.get(0),
            )
            .ok();

        match existing.as_deref() {
            Some("active") => return Ok(Err(GameError::QuestAlreadyActive)),
            Some(_) => return Ok(Err(GameError::QuestAlreadyCompleted)),
            None => {}
        }

        let quest: Option<QuestRecord> = conn
            .query_row(
                "SELECT quest_id, name, description, reward_coins, reward_xp,
                        requirement_level, quest_type, target
                 FROM quests WHERE quest_id = ?1",
                [quest_id],
                map_quest,
            )
            .ok();

        let Some(quest) = quest else {
            return Ok(Err(GameError::QuestNotFound));
        };

        conn.execute(
            "INSERT INTO user_quests (user_id, quest_id, status, progress)
             VALUES (?1, ?2, 'active', 0)",
            (user_id, quest_id),
        )?;
        Ok(Ok(quest))
    }

    /// Mirrors the user's stat column into the progress of every active
    /// quest of the given type.
    pub fn sync_quest_progress(&self, user_id: &str, quest_type: &str) -> anyhow::Result<()> {
        let Some(column) = stat_column(quest_type) else {
            return Ok(());
        };

        let conn = self.lock();
        let sql = format!("SELECT {column} FROM users WHERE user_id = ?1");
        let current: i64 = conn.query_row(&sql, [user_id], |row| row.get(0))?;

        conn.execute(
            "UPDATE user_quests SET progress = ?1
             WHERE user_id = ?2 AND status = 'active'
               AND quest_id IN (SELECT quest_id FROM quests WHERE quest_type = ?3)",
            (current, user_id, quest_type),
        )?;
        Ok(())
    }

    /// Marks every active quest whose progress reached its target as
    /// completed and returns them. Rewards are granted by the caller so the
    /// XP gain goes through the level-up bookkeeping.
    pub fn collect_completed_quests(&self, user_id: &str) -> anyhow::Result<Vec<CompletedQuest>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT q.quest_id, q.name, q.reward_coins, q.reward_xp
             FROM user_quests uq
             JOIN quests q ON uq.quest_id = q.quest_id
             WHERE uq.user_id = ?1 AND uq.status = 'active' AND uq.progress >= q.target",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                CompletedQuest {
                    name: row.get(1)?,
                    reward_coins: row.get(2)?,
                    reward_xp: row.get(3)?,
                },
            ))
        })?;

        let mut completed = Vec::new();
        for row in rows {
            completed.push(row?);
        }

        for (quest_id, quest) in &completed {
            conn.execute(
                "UPDATE user_quests SET status = 'completed'
                 WHERE user_id = ?1 AND quest_id = ?2",
                (user_id, quest_id),
            )?;
            debug!("User {} completed quest '{}'", user_id, quest.name);
        }

        Ok(completed.into_iter().map(|(_, quest)| quest).collect())
    }
}

fn map_quest(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestRecord> {
    Ok(QuestRecord {
        quest_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        reward_coins: row.get(3)?,
        reward_xp: row.get(4)?,
        requirement_level: row.get(5)?,
        quest_type: row.get(6)?,
        target: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use crate::error::GameError;

    #[test]
    fn test_available_respects_level_requirement() {
        let db = test_db();
        let low = db.available_quests(1).unwrap();
        let high = db.available_quests(50).unwrap();
        assert!(!low.is_empty());
        assert!(high.len() > low.len());
        assert!(low.iter().all(|q| q.requirement_level <= 1));
    }

    #[test]
    fn test_accept_rejects_duplicates() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        let quests = db.available_quests(1).unwrap();
        let quest_id = quests[0].quest_id;

        let accepted = db.accept_quest("1", quest_id).unwrap().unwrap();
        assert_eq!(accepted.quest_id, quest_id);

        assert_eq!(
            db.accept_quest("1", quest_id).unwrap().unwrap_err(),
            GameError::QuestAlreadyActive
        );
        assert_eq!(
            db.accept_quest("1", 999999).unwrap().unwrap_err(),
            GameError::QuestNotFound
        );
    }

    #[test]
    fn test_progress_sync_and_completion() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        // "Novice Explorer": 5 adventures.
        let quest = db
            .available_quests(1)
            .unwrap()
            .into_iter()
            .find(|q| q.name == "Novice Explorer")
            .unwrap();
        db.accept_quest("1", quest.quest_id).unwrap().unwrap();

        for _ in 0..4 {
            db.record_adventure("1", 100).unwrap();
        }
        db.sync_quest_progress("1", "adventure").unwrap();
        assert!(db.collect_completed_quests("1").unwrap().is_empty());

        let active = db.active_quests("1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].progress, 4);

        db.record_adventure("1", 100).unwrap();
        db.sync_quest_progress("1", "adventure").unwrap();
        let completed = db.collect_completed_quests("1").unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].name, "Novice Explorer");
        assert_eq!(completed[0].reward_coins, 100);

        // Completed quests leave the active list and cannot be re-accepted.
        assert!(db.active_quests("1").unwrap().is_empty());
        assert_eq!(
            db.accept_quest("1", quest.quest_id).unwrap().unwrap_err(),
            GameError::QuestAlreadyCompleted
        );
    }
}
