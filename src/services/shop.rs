use crate::db::inventory::EquipResult;
use crate::db::{Database, InventoryEntry, ShopItem};
use crate::error::GameError;

/// Shop purchases plus everything inventory: equip, consume, list.
pub struct ShopService {
    db: Database,
}

#[derive(Debug, Clone)]
pub struct UseOutcome {
    pub item: String,
    pub healed: i64,
    pub new_hp: i64,
}

impl ShopService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn catalog(&self) -> anyhow::Result<Vec<ShopItem>> {
        self.db.run_blocking(|db| db.list_shop_items()).await
    }

    /// Buys one item: level gate, price gate, then debit and stock.
    pub async fn purchase(
        &self,
        user_id: u64,
        item_name: &str,
    ) -> anyhow::Result<Result<ShopItem, GameError>> {
        let user_id = user_id.to_string();
        let item_name = item_name.to_string();
        self.db
            .run_blocking(move |db| {
                let Some(item) = db.get_shop_item(&item_name)? else {
                    return Ok(Err(GameError::ItemNotFound));
                };
                let user = db
                    .get_user(&user_id)?
                    .ok_or_else(|| anyhow::anyhow!("unknown user {user_id}"))?;

                if user.level < item.level_req {
                    return Ok(Err(GameError::LevelTooLow(item.level_req)));
                }
                if user.balance < item.price {
                    return Ok(Err(GameError::InsufficientFunds(item.price)));
                }

                db.debit_balance(&user_id, item.price)?;
                db.add_item(&user_id, &item.item, 1)?;
                Ok(Ok(item))
            })
            .await
    }

    pub async fn inventory(&self, user_id: u64) -> anyhow::Result<Vec<InventoryEntry>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| db.get_inventory(&user_id))
            .await
    }

    pub async fn equip(
        &self,
        user_id: u64,
        item_name: &str,
    ) -> anyhow::Result<Result<EquipResult, GameError>> {
        let user_id = user_id.to_string();
        let item_name = item_name.to_string();
        self.db
            .run_blocking(move |db| db.equip_item(&user_id, &item_name))
            .await
    }

    /// Consumes one item from the inventory and applies its HP bonus.
    pub async fn consume(
        &self,
        user_id: u64,
        item_name: &str,
    ) -> anyhow::Result<Result<UseOutcome, GameError>> {
        let user_id = user_id.to_string();
        let item_name = item_name.to_string();
        self.db
            .run_blocking(move |db| {
                let Some(item) = db.get_shop_item(&item_name)? else {
                    return Ok(Err(GameError::ItemNotFound));
                };
                if !item.is_consumable() {
                    return Ok(Err(GameError::NotConsumable));
                }
                if !db.remove_item(&user_id, &item.item, 1)? {
                    return Ok(Err(GameError::NotOwned));
                }

                let user = db
                    .get_user(&user_id)?
                    .ok_or_else(|| anyhow::anyhow!("unknown user {user_id}"))?;
                let new_hp = (user.hp + item.bonus_value).min(user.max_hp);
                db.set_hp(&user_id, new_hp)?;

                Ok(Ok(UseOutcome {
                    item: item.item,
                    healed: new_hp - user.hp,
                    new_hp,
                }))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[tokio::test]
    async fn test_purchase_gates() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        let service = ShopService::new(db);

        assert_eq!(
            service.purchase(1, "No Such Thing").await.unwrap().unwrap_err(),
            GameError::ItemNotFound
        );
        // Excalibur needs level 10.
        assert_eq!(
            service.purchase(1, "Excalibur").await.unwrap().unwrap_err(),
            GameError::LevelTooLow(10)
        );
        // Iron Sword costs 100 and we have nothing.
        assert_eq!(
            service.purchase(1, "Iron Sword").await.unwrap().unwrap_err(),
            GameError::InsufficientFunds(100)
        );
    }

    #[tokio::test]
    async fn test_purchase_debits_and_stocks() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.add_xp_and_coins("1", 0, 150).unwrap();
        let service = ShopService::new(db.clone());

        let item = service.purchase(1, "iron sword").await.unwrap().unwrap();
        assert_eq!(item.item, "Iron Sword");
        assert_eq!(db.get_user("1").unwrap().unwrap().balance, 50);

        let inventory = service.inventory(1).await.unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].item, "Iron Sword");
    }

    #[tokio::test]
    async fn test_consume_heals_up_to_max() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.set_hp("1", 40).unwrap();
        db.add_item("1", "Health Potion", 2).unwrap();
        let service = ShopService::new(db.clone());

        let outcome = service.consume(1, "Health Potion").await.unwrap().unwrap();
        assert_eq!(outcome.healed, 50);
        assert_eq!(outcome.new_hp, 90);

        // Second potion clamps at max HP.
        let outcome = service.consume(1, "Health Potion").await.unwrap().unwrap();
        assert_eq!(outcome.healed, 10);
        assert_eq!(outcome.new_hp, 100);

        assert_eq!(
            service.consume(1, "Health Potion").await.unwrap().unwrap_err(),
            GameError::NotOwned
        );
        assert_eq!(
            service.consume(1, "Iron Sword").await.unwrap().unwrap_err(),
            GameError::NotConsumable
        );
    }
}
