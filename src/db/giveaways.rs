use super::Database;

#[derive(Debug, Clone)]
pub struct GiveawayRecord {
    pub giveaway_id: i64,
    pub guild_id: String,
    pub channel_id: String,
    pub host_id: String,
    pub prize: String,
    pub ends_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveawayStatus {
    Entered,
    AlreadyEntered,
    NotOpen,
}

impl Database {
    pub fn create_giveaway(
        &self,
        guild_id: &str,
        channel_id: &str,
        host_id: &str,
        prize: &str,
        ends_at: &str,
    ) -> anyhow::Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO giveaways (guild_id, channel_id, host_id, prize, ends_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (guild_id, channel_id, host_id, prize, ends_at),
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn enter_giveaway(&self, giveaway_id: i64, user_id: &str) -> anyhow::Result<GiveawayStatus> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT 1 FROM giveaways WHERE giveaway_id = ?1 AND status = 'open'")?;
        if !stmt.exists([giveaway_id])? {
            return Ok(GiveawayStatus::NotOpen);
        }

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO giveaway_entries (giveaway_id, user_id) VALUES (?1, ?2)",
            (giveaway_id, user_id),
        )?;
        if inserted == 0 {
            Ok(GiveawayStatus::AlreadyEntered)
        } else {
            Ok(GiveawayStatus::Entered)
        }
    }

    pub fn list_open_giveaways(&self, guild_id: &str) -> anyhow::Result<Vec<GiveawayRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT giveaway_id, guild_id, channel_id, host_id, prize, ends_at
             FROM giveaways WHERE guild_id = ?1 AND status = 'open' ORDER BY ends_at",
        )?;
        let rows = stmt.query_map([guild_id], map_giveaway)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Cancels an open giveaway. Only the host may cancel.
    pub fn cancel_giveaway(&self, giveaway_id: i64, host_id: &str) -> anyhow::Result<usize> {
        let conn = self.lock();
        let count = conn.execute(
            "UPDATE giveaways SET status = 'cancelled'
             WHERE giveaway_id = ?1 AND host_id = ?2 AND status = 'open'",
            (giveaway_id, host_id),
        )?;
        Ok(count)
    }

    pub fn due_giveaways(&self, now: &str, limit: usize) -> anyhow::Result<Vec<GiveawayRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT giveaway_id, guild_id, channel_id, host_id, prize, ends_at
             FROM giveaways WHERE status = 'open' AND ends_at <= ?1
             ORDER BY ends_at LIMIT ?2",
        )?;
        let rows = stmt.query_map((now, limit), map_giveaway)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn giveaway_entries(&self, giveaway_id: i64) -> anyhow::Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT user_id FROM giveaway_entries WHERE giveaway_id = ?1")?;
        let rows = stmt.query_map([giveaway_id], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn mark_giveaway_ended(&self, giveaway_id: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE giveaways SET status = 'ended' WHERE giveaway_id = ?1",
            [giveaway_id],
        )?;
        Ok(())
    }
}

fn map_giveaway(row: &rusqlite::Row<'_>) -> rusqlite::Result<GiveawayRecord> {
    Ok(GiveawayRecord {
        giveaway_id: row.get(0)?,
        guild_id: row.get(1)?,
        channel_id: row.get(2)?,
        host_id: row.get(3)?,
        prize: row.get(4)?,
        ends_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use super::GiveawayStatus;

    #[test]
    fn test_lifecycle_create_enter_end() {
        let db = test_db();
        let id = db
            .create_giveaway("g1", "c1", "host", "Nitro", "2026-01-01 00:00:00")
            .unwrap();

        assert_eq!(db.enter_giveaway(id, "1").unwrap(), GiveawayStatus::Entered);
        assert_eq!(
            db.enter_giveaway(id, "1").unwrap(),
            GiveawayStatus::AlreadyEntered
        );
        assert_eq!(db.enter_giveaway(id, "2").unwrap(), GiveawayStatus::Entered);
        assert_eq!(db.giveaway_entries(id).unwrap().len(), 2);

        let due = db.due_giveaways("2026-06-01 00:00:00", 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].prize, "Nitro");

        db.mark_giveaway_ended(id).unwrap();
        assert!(db.due_giveaways("2026-06-01 00:00:00", 10).unwrap().is_empty());
        assert_eq!(db.enter_giveaway(id, "3").unwrap(), GiveawayStatus::NotOpen);
    }

    #[test]
    fn test_not_due_until_deadline() {
        let db = test_db();
        db.create_giveaway("g1", "c1", "host", "Nitro", "2026-12-31 00:00:00")
            .unwrap();
        assert!(db.due_giveaways("2026-06-01 00:00:00", 10).unwrap().is_empty());
    }

    #[test]
    fn test_only_host_cancels() {
        let db = test_db();
        let id = db
            .create_giveaway("g1", "c1", "host", "Nitro", "2026-12-31 00:00:00")
            .unwrap();

        assert_eq!(db.cancel_giveaway(id, "someone_else").unwrap(), 0);
        assert_eq!(db.cancel_giveaway(id, "host").unwrap(), 1);
        assert!(db.list_open_giveaways("g1").unwrap().is_empty());
    }
}
