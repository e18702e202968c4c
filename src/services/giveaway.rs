use crate::db::{Database, GiveawayRecord, GiveawayStatus};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Giveaway lifecycle on top of the giveaways tables. Winner drawing and
/// announcements live in the dispatcher.
pub struct GiveawayService {
    db: Database,
}

impl GiveawayService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        guild_id: u64,
        channel_id: u64,
        host_id: u64,
        prize: &str,
        ends_at: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let guild_id = guild_id.to_string();
        let channel_id = channel_id.to_string();
        let host_id = host_id.to_string();
        let prize = prize.to_string();
        let ends_at = ends_at.format("%Y-%m-%d %H:%M:%S").to_string();
        self.db
            .run_blocking(move |db| {
                db.create_giveaway(&guild_id, &channel_id, &host_id, &prize, &ends_at)
            })
            .await
    }

    pub async fn enter(&self, giveaway_id: i64, user_id: u64) -> anyhow::Result<GiveawayStatus> {
        let user_id = user_id.to_string();
        self.db
            .run_blocking(move |db| db.enter_giveaway(giveaway_id, &user_id))
            .await
    }

    pub async fn list_open(&self, guild_id: u64) -> anyhow::Result<Vec<GiveawayRecord>> {
        let guild_id = guild_id.to_string();
        self.db
            .run_blocking(move |db| db.list_open_giveaways(&guild_id))
            .await
    }

    pub async fn cancel(&self, giveaway_id: i64, host_id: u64) -> anyhow::Result<bool> {
        let host_id = host_id.to_string();
        let cancelled = self
            .db
            .run_blocking(move |db| db.cancel_giveaway(giveaway_id, &host_id))
            .await?;
        Ok(cancelled > 0)
    }

    pub async fn due(&self, limit: usize) -> anyhow::Result<Vec<GiveawayRecord>> {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.db
            .run_blocking(move |db| db.due_giveaways(&now, limit))
            .await
    }

    pub async fn entries(&self, giveaway_id: i64) -> anyhow::Result<Vec<String>> {
        self.db
            .run_blocking(move |db| db.giveaway_entries(giveaway_id))
            .await
    }

    pub async fn mark_ended(&self, giveaway_id: i64) -> anyhow::Result<()> {
        self.db
            .run_blocking(move |db| db.mark_giveaway_ended(giveaway_id))
            .await
    }

    pub fn parse_sqlite_utc(ts: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok()?;
        Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use chrono::Duration;

    #[tokio::test]
    async fn test_round_trip_timestamps() {
        let service = GiveawayService::new(test_db());

        let ends_at = Utc::now() + Duration::minutes(5);
        let id = service.create(1, 2, 3, "Nitro", ends_at).await.unwrap();

        let open = service.list_open(1).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].giveaway_id, id);

        let parsed = GiveawayService::parse_sqlite_utc(&open[0].ends_at).unwrap();
        assert_eq!(parsed.timestamp(), ends_at.timestamp());

        // Not due yet, due after its deadline passes.
        assert!(service.due(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enter_and_cancel() {
        let service = GiveawayService::new(test_db());
        let ends_at = Utc::now() + Duration::minutes(5);
        let id = service.create(1, 2, 3, "Nitro", ends_at).await.unwrap();

        assert_eq!(service.enter(id, 7).await.unwrap(), GiveawayStatus::Entered);
        assert_eq!(
            service.enter(id, 7).await.unwrap(),
            GiveawayStatus::AlreadyEntered
        );

        assert!(!service.cancel(id, 999).await.unwrap());
        assert!(service.cancel(id, 3).await.unwrap());
        assert_eq!(service.enter(id, 8).await.unwrap(), GiveawayStatus::NotOpen);
    }
}
