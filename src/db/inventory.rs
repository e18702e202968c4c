use super::Database;
use crate::error::GameError;

#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub item: String,
    pub quantity: i64,
    pub equipped: bool,
    pub item_type: Option<String>,
    pub stat_bonus: Option<String>,
    pub bonus_value: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct EquipResult {
    pub stat_bonus: String,
    pub bonus_value: i64,
    pub replaced: Option<String>,
}

impl Database {
    pub fn get_inventory(&self, user_id: &str) -> anyhow::Result<Vec<InventoryEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT i.item, i.quantity, i.equipped, s.item_type, s.stat_bonus, s.bonus_value
             FROM inventory i
             LEFT JOIN shop s ON i.item = s.item
             WHERE i.user_id = ?1
             ORDER BY i.equipped DESC, s.item_type",
        )?;
        let rows = stmt.query_map([user_id], |row| {
            Ok(InventoryEntry {
                item: row.get(0)?,
                quantity: row.get(1)?,
                equipped: row.get::<_, i64>(2)? != 0,
                item_type: row.get(3)?,
                stat_bonus: row.get(4)?,
                bonus_value: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn add_item(&self, user_id: &str, item: &str, quantity: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO inventory (user_id, item, quantity) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, item) DO UPDATE SET quantity = quantity + ?3",
            (user_id, item, quantity),
        )?;
        Ok(())
    }

    /// Removes up to `quantity` of an item, deleting the row when it hits
    /// zero. Returns false when the user doesn't own the item.
    pub fn remove_item(&self, user_id: &str, item: &str, quantity: i64) -> anyhow::Result<bool> {
        let conn = self.lock();
        let owned: Option<i64> = conn
            .query_row(
                "SELECT quantity FROM inventory WHERE user_id = ?1 AND item = ?2",
                (user_id, item),
                |row| row.get(0),
            )
            .ok();

        let Some(owned) = owned else {
            return Ok(false);
        };

        if owned <= quantity {
            conn.execute(
                "DELETE FROM inventory WHERE user_id = ?1 AND item = ?2",
                (user_id, item),
            )?;
        } else {
            conn.execute(
                "UPDATE inventory SET quantity = quantity - ?3
                 WHERE user_id = ?1 AND item = ?2",
                (user_id, item, quantity),
            )?;
        }
        Ok(true)
    }

    /// Equips an item, unequipping any currently equipped item of the same
    /// slot type and moving its stat bonus over on the users row.
    pub fn equip_item(
        &self,
        user_id: &str,
        item: &str,
    ) -> anyhow::Result<Result<EquipResult, GameError>> {
        let conn = self.lock();

        let found: Option<(bool, String, String, i64)> = conn
            .query_row(
                "SELECT i.equipped, s.item_type, s.stat_bonus, s.bonus_value
                 FROM inventory i
                 JOIN shop s ON i.item = s.item
                 WHERE i.user_id = ?1 AND i.item = ?2",
                (user_id, item),
                |row| {
                    Ok((
                        row.get::<_, i64>(0)? != 0,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .ok();

        let Some((equipped, item_type, stat_bonus, bonus_value)) = found else {
            return Ok(Err(GameError::ItemNotFound));
        };
        if equipped {
            return Ok(Err(GameError::AlreadyEquipped));
        }
        if !matches!(item_type.as_str(), "weapon" | "armor") {
            return Ok(Err(GameError::NotEquippable));
        }

        // Swap out an already equipped item of the same slot.
        let old: Option<(String, String, i64)> = conn
            .query_row(
                "SELECT i.item, s.stat_bonus, s.bonus_value
                 FROM inventory i
                 JOIN shop s ON i.item = s.item
                 WHERE i.user_id = ?1 AND i.equipped = 1 AND s.item_type = ?2",
                (user_id, &item_type),
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .ok();

        let mut replaced = None;
        if let Some((old_item, old_bonus, old_value)) = old {
            conn.execute(
                "UPDATE inventory SET equipped = 0 WHERE user_id = ?1 AND item = ?2",
                (user_id, &old_item),
            )?;
            apply_stat(&conn, user_id, &old_bonus, -old_value)?;
            replaced = Some(old_item);
        }

        conn.execute(
            "UPDATE inventory SET equipped = 1 WHERE user_id = ?1 AND item = ?2",
            (user_id, item),
        )?;
        apply_stat(&conn, user_id, &stat_bonus, bonus_value)?;

        Ok(Ok(EquipResult {
            stat_bonus,
            bonus_value,
            replaced,
        }))
    }

    pub fn get_equipped_items(&self, user_id: &str) -> anyhow::Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT item FROM inventory WHERE user_id = ?1 AND equipped = 1")?;
        let rows = stmt.query_map([user_id], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

fn apply_stat(
    conn: &rusqlite::Connection,
    user_id: &str,
    stat: &str,
    delta: i64,
) -> anyhow::Result<()> {
    match stat {
        "attack" => {
            conn.execute(
                "UPDATE users SET attack = attack + ?1 WHERE user_id = ?2",
                (delta, user_id),
            )?;
        }
        "defense" => {
            conn.execute(
                "UPDATE users SET defense = defense + ?1 WHERE user_id = ?2",
                (delta, user_id),
            )?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;
    use crate::error::GameError;

    #[test]
    fn test_add_and_remove_stacks() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        db.add_item("1", "Health Potion", 1).unwrap();
        db.add_item("1", "Health Potion", 2).unwrap();

        let inv = db.get_inventory("1").unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv[0].quantity, 3);
        assert_eq!(inv[0].item_type.as_deref(), Some("consumable"));

        assert!(db.remove_item("1", "Health Potion", 2).unwrap());
        assert_eq!(db.get_inventory("1").unwrap()[0].quantity, 1);

        // Removing the last one deletes the row.
        assert!(db.remove_item("1", "Health Potion", 5).unwrap());
        assert!(db.get_inventory("1").unwrap().is_empty());

        assert!(!db.remove_item("1", "Health Potion", 1).unwrap());
    }

    #[test]
    fn test_equip_swaps_same_slot_and_moves_stats() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.add_item("1", "Iron Sword", 1).unwrap();
        db.add_item("1", "Steel Sword", 1).unwrap();

        let result = db.equip_item("1", "Iron Sword").unwrap().unwrap();
        assert_eq!(result.stat_bonus, "attack");
        assert_eq!(result.bonus_value, 5);
        assert!(result.replaced.is_none());
        assert_eq!(db.get_user("1").unwrap().unwrap().attack, 15);

        // Equipping another weapon swaps the bonus instead of stacking it.
        let result = db.equip_item("1", "Steel Sword").unwrap().unwrap();
        assert_eq!(result.replaced.as_deref(), Some("Iron Sword"));
        assert_eq!(db.get_user("1").unwrap().unwrap().attack, 20);

        let equipped = db.get_equipped_items("1").unwrap();
        assert_eq!(equipped, vec!["Steel Sword".to_string()]);
    }

    #[test]
    fn test_equip_rejections() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();

        assert_eq!(
            db.equip_item("1", "Iron Sword").unwrap().unwrap_err(),
            GameError::ItemNotFound
        );

        db.add_item("1", "Health Potion", 1).unwrap();
        assert_eq!(
            db.equip_item("1", "Health Potion").unwrap().unwrap_err(),
            GameError::NotEquippable
        );

        db.add_item("1", "Iron Sword", 1).unwrap();
        db.equip_item("1", "Iron Sword").unwrap().unwrap();
        assert_eq!(
            db.equip_item("1", "Iron Sword").unwrap().unwrap_err(),
            GameError::AlreadyEquipped
        );
    }
}
