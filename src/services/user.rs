use crate::db::users::{LeaderboardCategory, LeaderboardRow, ProgressReport};
use crate::db::{CompletedQuest, Database, UserRecord};
use crate::error::GameError;
use crate::rpg::{self, AdventureRoll, BossFight};
use chrono::Utc;

/// Profile, progression and combat bookkeeping on top of the users table.
pub struct UserService {
    db: Database,
}

/// What a finished encounter did to the character, including any quests it
/// pushed over the line.
#[derive(Debug, Clone)]
pub struct EncounterReport {
    pub report: ProgressReport,
    pub new_hp: i64,
    pub completed_quests: Vec<CompletedQuest>,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn ensure(&self, user_id: u64, username: &str) -> anyhow::Result<()> {
        let user_id = user_id.to_string();
        let username = username.to_string();
        self.db
            .run_blocking(move |db| db.ensure_user(&user_id, &username))
            .await
    }

    pub async fn profile(&self, user_id: u64) -> anyhow::Result<Option<UserRecord>> {
        let user_id = user_id.to_string();
        self.db.run_blocking(move |db| db.get_user(&user_id)).await
    }

    pub async fn grant(&self, user_id: u64, xp: i64, coins: i64) -> anyhow::Result<ProgressReport> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| db.add_xp_and_coins(&user_id, xp, coins))
            .await
    }

    /// Daily reward, once per UTC calendar day. Returns None when already
    /// claimed today.
    pub async fn claim_daily(&self, user_id: u64, amount: i64) -> anyhow::Result<Option<i64>> {
        let user_id = user_id.to_string();
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.db
            .run_blocking(move |db| {
                if db.claim_daily(&user_id, &date, amount)? {
                    db.sync_quest_progress(&user_id, "coins")?;
                    Ok(Some(amount))
                } else {
                    Ok(None)
                }
            })
            .await
    }

    /// Full heal for coins. The cost scales with level.
    pub async fn heal(&self, user_id: u64) -> anyhow::Result<Result<i64, GameError>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                let Some(user) = db.get_user(&user_id)? else {
                    return Ok(Err(GameError::ItemNotFound));
                };
                let cost = rpg::heal_cost(user.level);
                if user.balance < cost {
                    return Ok(Err(GameError::InsufficientFunds(cost)));
                }
                db.heal_full(&user_id, cost)?;
                Ok(Ok(cost))
            })
            .await
    }

    /// Applies an adventure roll: HP, stats, rewards and quest progress in
    /// one pass.
    pub async fn apply_adventure(
        &self,
        user_id: u64,
        roll: AdventureRoll,
    ) -> anyhow::Result<EncounterReport> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                let user = db
                    .get_user(&user_id)?
                    .ok_or_else(|| anyhow::anyhow!("unknown user {user_id}"))?;
                let new_hp = (user.hp + roll.hp_change).clamp(0, user.max_hp);

                db.record_adventure(&user_id, new_hp)?;
                let report = db.add_xp_and_coins(&user_id, roll.xp, roll.coins)?;
                let completed_quests = settle_quests(db, &user_id, &["adventure", "coins"])?;

                Ok(EncounterReport {
                    report,
                    new_hp,
                    completed_quests,
                })
            })
            .await
    }

    /// Applies a boss fight outcome. A kill counts as an adventure too.
    pub async fn apply_boss_fight(
        &self,
        user_id: u64,
        fight: BossFight,
    ) -> anyhow::Result<EncounterReport> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                let user = db
                    .get_user(&user_id)?
                    .ok_or_else(|| anyhow::anyhow!("unknown user {user_id}"))?;
                let new_hp = (user.hp - fight.damage).clamp(0, user.max_hp);

                if fight.victory {
                    db.record_boss_kill(&user_id, new_hp)?;
                } else {
                    db.record_adventure(&user_id, new_hp)?;
                }
                let report =
                    db.add_xp_and_coins(&user_id, fight.reward_xp, fight.reward_coins)?;
                let completed_quests =
                    settle_quests(db, &user_id, &["adventure", "boss", "coins"])?;

                Ok(EncounterReport {
                    report,
                    new_hp,
                    completed_quests,
                })
            })
            .await
    }

    /// Settles a PvP battle for both sides and returns the winner's
    /// completed quests.
    pub async fn apply_pvp_result(
        &self,
        attacker_id: u64,
        defender_id: u64,
        winner_id: u64,
        loser_hp: i64,
        attacker_power: i64,
        defender_power: i64,
        reward_xp: i64,
        reward_coins: i64,
    ) -> anyhow::Result<Vec<CompletedQuest>> {
        let attacker = attacker_id.to_string();
        let defender = defender_id.to_string();
        let winner = winner_id.to_string();
        self.db
            .run_blocking(move |db| {
                let loser = if winner == attacker {
                    defender.clone()
                } else {
                    attacker.clone()
                };
                db.record_pvp_battle(
                    &attacker,
                    &defender,
                    &winner,
                    &loser,
                    loser_hp,
                    attacker_power,
                    defender_power,
                )?;
                db.add_xp_and_coins(&winner, reward_xp, reward_coins)?;
                settle_quests(db, &winner, &["pvp", "coins"])
            })
            .await
    }

    /// Passive reward for chatting, throttled per user.
    pub async fn message_reward(
        &self,
        user_id: u64,
        username: &str,
        cooldown_secs: u64,
        xp: i64,
        coins: i64,
    ) -> anyhow::Result<Option<ProgressReport>> {
        let user_id = user_id.to_string();
        let username = username.to_string();
        self.db
            .run_blocking(move |db| {
                db.ensure_user(&user_id, &username)?;
                if !db.try_claim_message_reward(&user_id, Utc::now(), cooldown_secs)? {
                    return Ok(None);
                }
                let report = db.add_xp_and_coins(&user_id, xp, coins)?;
                db.sync_quest_progress(&user_id, "coins")?;
                Ok(Some(report))
            })
            .await
    }

    pub async fn leaderboard(
        &self,
        category: LeaderboardCategory,
        limit: usize,
    ) -> anyhow::Result<Vec<LeaderboardRow>> {
        self.db
            .run_blocking(move |db| db.leaderboard(category, limit))
            .await
    }

    pub async fn regen_all(&self, amount: i64) -> anyhow::Result<usize> {
        self.db.run_blocking(move |db| db.regen_hp(amount)).await
    }
}

/// Syncs the given quest types and completes whatever reached its target.
/// Rewards flow through the normal XP/coin pipeline.
pub(crate) fn settle_quests(
    db: &Database,
    user_id: &str,
    quest_types: &[&str],
) -> anyhow::Result<Vec<CompletedQuest>> {
    for quest_type in quest_types {
        db.sync_quest_progress(user_id, quest_type)?;
    }
    let completed = db.collect_completed_quests(user_id)?;
    for quest in &completed {
        db.add_xp_and_coins(user_id, quest.reward_xp, quest.reward_coins)?;
        // The payout itself can finish a coin quest.
        db.sync_quest_progress(user_id, "coins")?;
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::rpg::AdventureRoll;

    #[tokio::test]
    async fn test_adventure_updates_hp_and_rewards() {
        let service = UserService::new(test_db());
        service.ensure(1, "alice").await.unwrap();

        let roll = AdventureRoll {
            description: "🗡️ Defeated a goblin",
            coins: 30,
            xp: 20,
            hp_change: -5,
        };
        let applied = service.apply_adventure(1, roll).await.unwrap();
        assert_eq!(applied.new_hp, 95);
        assert_eq!(applied.report.new_balance, 30);
        assert!(applied.completed_quests.is_empty());

        let user = service.profile(1).await.unwrap().unwrap();
        assert_eq!(user.adventure_count, 1);
        assert_eq!(user.hp, 95);
    }

    #[tokio::test]
    async fn test_heal_costs_coins() {
        let service = UserService::new(test_db());
        service.ensure(1, "alice").await.unwrap();

        // Broke: healing is refused.
        let refused = service.heal(1).await.unwrap();
        assert_eq!(refused, Err(GameError::InsufficientFunds(55)));

        service.grant(1, 0, 100).await.unwrap();
        let cost = service.heal(1).await.unwrap().unwrap();
        assert_eq!(cost, 55);

        let user = service.profile(1).await.unwrap().unwrap();
        assert_eq!(user.balance, 45);
        assert!(user.is_full_hp());
    }

    #[tokio::test]
    async fn test_daily_claims_once() {
        let service = UserService::new(test_db());
        service.ensure(1, "alice").await.unwrap();

        assert_eq!(service.claim_daily(1, 120).await.unwrap(), Some(120));
        assert_eq!(service.claim_daily(1, 120).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_message_reward_throttles() {
        let service = UserService::new(test_db());

        let first = service.message_reward(1, "alice", 60, 2, 3).await.unwrap();
        assert!(first.is_some());
        let second = service.message_reward(1, "alice", 60, 2, 3).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_quest_settlement_pays_out() {
        let db = test_db();
        let service = UserService::new(db.clone());
        service.ensure(1, "alice").await.unwrap();

        // "Novice Explorer" needs 5 adventures.
        let quest = db.available_quests(1).unwrap()[0].clone();
        db.accept_quest("1", quest.quest_id).unwrap().unwrap();

        let roll = AdventureRoll {
            description: "💎 Found treasure",
            coins: 50,
            xp: 10,
            hp_change: 0,
        };
        for _ in 0..4 {
            let applied = service.apply_adventure(1, roll.clone()).await.unwrap();
            assert!(applied.completed_quests.is_empty());
        }
        let applied = service.apply_adventure(1, roll).await.unwrap();
        assert_eq!(applied.completed_quests.len(), 1);
        assert_eq!(applied.completed_quests[0].name, quest.name);

        // Quest coins landed on top of the adventure coins.
        let user = service.profile(1).await.unwrap().unwrap();
        assert_eq!(user.balance, 5 * 50 + quest.reward_coins);
    }
}
