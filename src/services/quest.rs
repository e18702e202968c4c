use crate::db::{ActiveQuestRecord, CompletedQuest, Database, QuestRecord};
use crate::error::GameError;
use crate::services::user::settle_quests;

/// Quest board: what's on offer, what's in progress, and claiming rewards.
pub struct QuestService {
    db: Database,
}

impl QuestService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Quests the user's level unlocks, minus those already taken.
    pub async fn board(&self, user_id: u64) -> anyhow::Result<Vec<QuestRecord>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                let level = db.get_user(&user_id)?.map(|u| u.level).unwrap_or(1);
                let taken: Vec<i64> = db
                    .active_quests(&user_id)?
                    .into_iter()
                    .map(|q| q.quest.quest_id)
                    .collect();
                Ok(db
                    .available_quests(level)?
                    .into_iter()
                    .filter(|q| !taken.contains(&q.quest_id))
                    .collect())
            })
            .await
    }

    pub async fn active(&self, user_id: u64) -> anyhow::Result<Vec<ActiveQuestRecord>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                // Refresh progress so the listing is current.
                for quest_type in ["adventure", "pvp", "boss", "coins"] {
                    db.sync_quest_progress(&user_id, quest_type)?;
                }
                db.active_quests(&user_id)
            })
            .await
    }

    pub async fn accept(
        &self,
        user_id: u64,
        quest_id: i64,
    ) -> anyhow::Result<Result<QuestRecord, GameError>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                let result = db.accept_quest(&user_id, quest_id)?;
                if let Ok(quest) = &result {
                    // A fresh coin quest may already be satisfied.
                    db.sync_quest_progress(&user_id, &quest.quest_type)?;
                }
                Ok(result)
            })
            .await
    }

    /// Completes everything that reached its target and pays out.
    pub async fn redeem(&self, user_id: u64) -> anyhow::Result<Vec<CompletedQuest>> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| {
                settle_quests(db, &user_id, &["adventure", "pvp", "boss", "coins"])
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[tokio::test]
    async fn test_board_hides_taken_quests() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        let service = QuestService::new(db);

        let board = service.board(1).await.unwrap();
        assert!(!board.is_empty());
        let first = board[0].clone();

        service.accept(1, first.quest_id).await.unwrap().unwrap();
        let board = service.board(1).await.unwrap();
        assert!(board.iter().all(|q| q.quest_id != first.quest_id));

        assert_eq!(
            service.accept(1, first.quest_id).await.unwrap().unwrap_err(),
            GameError::QuestAlreadyActive
        );
    }

    #[tokio::test]
    async fn test_redeem_pays_coin_quest() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        let service = QuestService::new(db.clone());

        // "Treasure Hunter": hold 1000 coins.
        let quest = db
            .available_quests(1)
            .unwrap()
            .into_iter()
            .find(|q| q.quest_type == "coins")
            .unwrap();
        service.accept(1, quest.quest_id).await.unwrap().unwrap();

        assert!(service.redeem(1).await.unwrap().is_empty());

        db.add_xp_and_coins("1", 0, quest.target).unwrap();
        let completed = service.redeem(1).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].name, quest.name);

        let user = db.get_user("1").unwrap().unwrap();
        assert_eq!(user.balance, quest.target + quest.reward_coins);
    }

    #[tokio::test]
    async fn test_active_listing_tracks_progress() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        let service = QuestService::new(db.clone());

        let quest = db
            .available_quests(1)
            .unwrap()
            .into_iter()
            .find(|q| q.quest_type == "adventure")
            .unwrap();
        service.accept(1, quest.quest_id).await.unwrap().unwrap();

        db.record_adventure("1", 100).unwrap();
        db.record_adventure("1", 100).unwrap();

        let active = service.active(1).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].progress, 2);
    }
}
