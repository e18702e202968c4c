use super::Database;

#[derive(Debug, Clone)]
pub struct ShopItem {
    pub item: String,
    pub description: String,
    pub price: i64,
    pub item_type: String,
    pub stat_bonus: String,
    pub bonus_value: i64,
    pub level_req: i64,
}

impl ShopItem {
    pub fn is_consumable(&self) -> bool {
        self.item_type == "consumable"
    }

    pub fn is_equipment(&self) -> bool {
        matches!(self.item_type.as_str(), "weapon" | "armor")
    }
}

type SeedItem = (&'static str, &'static str, i64, &'static str, &'static str, i64, i64);

const SHOP_SEED: &[SeedItem] = &[
    ("Health Potion", "Restores 50 HP", 25, "consumable", "hp", 50, 1),
    ("Iron Sword", "Basic sword", 100, "weapon", "attack", 5, 1),
    ("Leather Armor", "Basic armor", 150, "armor", "defense", 3, 1),
    ("Steel Sword", "Strong sword", 300, "weapon", "attack", 10, 5),
    ("Chain Mail", "Medium armor", 400, "armor", "defense", 8, 5),
    ("Excalibur", "Legendary sword", 1000, "weapon", "attack", 25, 10),
    ("Dragon Scale", "Ultimate armor", 1500, "armor", "defense", 20, 15),
    ("Elixir", "Full HP restore", 100, "consumable", "hp", 999, 3),
];

impl Database {
    pub(super) fn seed_shop(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO shop (item, description, price, item_type, stat_bonus, bonus_value, level_req)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in SHOP_SEED {
            stmt.execute(*row)?;
        }
        Ok(())
    }

    pub fn list_shop_items(&self) -> anyhow::Result<Vec<ShopItem>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT item, description, price, item_type, stat_bonus, bonus_value, level_req
             FROM shop ORDER BY level_req, price",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShopItem {
                item: row.get(0)?,
                description: row.get(1)?,
                price: row.get(2)?,
                item_type: row.get(3)?,
                stat_bonus: row.get(4)?,
                bonus_value: row.get(5)?,
                level_req: row.get(6)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn get_shop_item(&self, item_name: &str) -> anyhow::Result<Option<ShopItem>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT item, description, price, item_type, stat_bonus, bonus_value, level_req
             FROM shop WHERE item = ?1 COLLATE NOCASE",
        )?;
        let mut rows = stmt.query([item_name])?;

        if let Some(row) = rows.next()? {
            Ok(Some(ShopItem {
                item: row.get(0)?,
                description: row.get(1)?,
                price: row.get(2)?,
                item_type: row.get(3)?,
                stat_bonus: row.get(4)?,
                bonus_value: row.get(5)?,
                level_req: row.get(6)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn debit_balance(&self, user_id: &str, amount: i64) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET balance = balance - ?1 WHERE user_id = ?2",
            (amount, user_id),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;

    #[test]
    fn test_shop_seeded_and_ordered() {
        let db = test_db();
        let items = db.list_shop_items().unwrap();
        assert_eq!(items.len(), 8);
        // Ordered by level requirement, then price.
        assert!(items.windows(2).all(|w| (w[0].level_req, w[0].price)
            <= (w[1].level_req, w[1].price)));
    }

    #[test]
    fn test_get_item_case_insensitive() {
        let db = test_db();
        let item = db.get_shop_item("health potion").unwrap().unwrap();
        assert_eq!(item.item, "Health Potion");
        assert!(item.is_consumable());
        assert!(!item.is_equipment());

        let sword = db.get_shop_item("Iron Sword").unwrap().unwrap();
        assert!(sword.is_equipment());

        assert!(db.get_shop_item("Nonexistent").unwrap().is_none());
    }
}
