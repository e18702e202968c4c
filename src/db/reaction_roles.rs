use super::Database;

#[derive(Debug, Clone)]
pub struct ReactionRoleRecord {
    pub channel_id: String,
    pub message_id: String,
    pub emoji: String,
    pub role_id: String,
}

impl Database {
    /// Registers an emoji → role mapping. The mapping starts unbound
    /// (message_id '0') until a /roles panel is posted.
    pub fn add_reaction_role(
        &self,
        guild_id: &str,
        channel_id: &str,
        emoji: &str,
        role_id: &str,
    ) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR REPLACE INTO reaction_roles (guild_id, channel_id, message_id, emoji, role_id)
             VALUES (?1, ?2, '0', ?3, ?4)",
            (guild_id, channel_id, emoji, role_id),
        )?;
        Ok(())
    }

    pub fn remove_reaction_role(&self, message_id: &str, emoji: &str) -> anyhow::Result<usize> {
        let conn = self.lock();
        let count = conn.execute(
            "DELETE FROM reaction_roles WHERE message_id = ?1 AND emoji = ?2",
            (message_id, emoji),
        )?;
        Ok(count)
    }

    pub fn update_reaction_role(
        &self,
        message_id: &str,
        emoji: &str,
        role_id: &str,
    ) -> anyhow::Result<usize> {
        let conn = self.lock();
        let count = conn.execute(
            "UPDATE reaction_roles SET role_id = ?1 WHERE message_id = ?2 AND emoji = ?3",
            (role_id, message_id, emoji),
        )?;
        Ok(count)
    }

    pub fn list_reaction_roles(&self, guild_id: &str) -> anyhow::Result<Vec<ReactionRoleRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT channel_id, message_id, emoji, role_id
             FROM reaction_roles WHERE guild_id = ?1 ORDER BY channel_id",
        )?;
        let rows = stmt.query_map([guild_id], |row| {
            Ok(ReactionRoleRecord {
                channel_id: row.get(0)?,
                message_id: row.get(1)?,
                emoji: row.get(2)?,
                role_id: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Binds every unbound mapping in the guild to a freshly posted panel
    /// message and tracks the message for reaction dispatch.
    pub fn bind_reaction_panel(
        &self,
        guild_id: &str,
        channel_id: &str,
        message_id: &str,
    ) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE reaction_roles SET message_id = ?1, channel_id = ?2
             WHERE guild_id = ?3 AND message_id = '0'",
            (message_id, channel_id, guild_id),
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO reaction_role_messages (guild_id, channel_id, message_id)
             VALUES (?1, ?2, ?3)",
            (guild_id, channel_id, message_id),
        )?;
        Ok(())
    }

    pub fn is_reaction_panel(&self, message_id: &str) -> anyhow::Result<bool> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT 1 FROM reaction_role_messages WHERE message_id = ?1")?;
        Ok(stmt.exists([message_id])?)
    }

    pub fn role_for_reaction(
        &self,
        message_id: &str,
        emoji: &str,
    ) -> anyhow::Result<Option<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT role_id FROM reaction_roles WHERE message_id = ?1 AND emoji = ?2",
        )?;
        let mut rows = stmt.query((message_id, emoji))?;

        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;

    #[test]
    fn test_add_bind_and_lookup() {
        let db = test_db();

        db.add_reaction_role("g1", "0", "🔴", "100").unwrap();
        db.add_reaction_role("g1", "0", "🔵", "200").unwrap();

        // Not dispatched before a panel exists.
        assert!(!db.is_reaction_panel("555").unwrap());

        db.bind_reaction_panel("g1", "c1", "555").unwrap();
        assert!(db.is_reaction_panel("555").unwrap());
        assert_eq!(
            db.role_for_reaction("555", "🔴").unwrap(),
            Some("100".to_string())
        );
        assert_eq!(db.role_for_reaction("555", "🟢").unwrap(), None);

        let listed = db.list_reaction_roles("g1").unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.message_id == "555"));
    }

    #[test]
    fn test_edit_and_remove() {
        let db = test_db();
        db.add_reaction_role("g1", "0", "🔴", "100").unwrap();
        db.bind_reaction_panel("g1", "c1", "555").unwrap();

        assert_eq!(db.update_reaction_role("555", "🔴", "300").unwrap(), 1);
        assert_eq!(
            db.role_for_reaction("555", "🔴").unwrap(),
            Some("300".to_string())
        );

        assert_eq!(db.remove_reaction_role("555", "🔴").unwrap(), 1);
        assert_eq!(db.role_for_reaction("555", "🔴").unwrap(), None);
        assert_eq!(db.remove_reaction_role("555", "🔴").unwrap(), 0);
    }
}
