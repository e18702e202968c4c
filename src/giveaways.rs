use crate::db::GiveawayRecord;
use crate::services::giveaway::GiveawayService;
use anyhow::Context as AnyhowContext;
use rand::Rng;
use serenity::all::{ChannelId, CreateAllowedMentions, CreateMessage, UserId};
use serenity::http::Http;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

pub struct GiveawayDispatcher {
    service: GiveawayService,
    http: Arc<Http>,
    poll_interval: Duration,
    batch_size: usize,
}

impl GiveawayDispatcher {
    pub fn new(
        service: GiveawayService,
        http: Arc<Http>,
        poll_interval_secs: u64,
        batch_size: usize,
    ) -> Self {
        Self {
            service,
            http,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
        }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.finish_due().await {
                error!("Giveaway dispatch cycle failed: {}", e);
            }
        }
    }

    async fn finish_due(&self) -> anyhow::Result<()> {
        let giveaways = self.service.due(self.batch_size).await?;
        if giveaways.is_empty() {
            return Ok(());
        }

        for giveaway in giveaways {
            match self.announce_result(&giveaway).await {
                Ok(()) => {
                    if let Err(e) = self.service.mark_ended(giveaway.giveaway_id).await {
                        error!(
                            "Failed to mark giveaway {} ended: {}",
                            giveaway.giveaway_id, e
                        );
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to finish giveaway {}: {}",
                        giveaway.giveaway_id, e
                    );
                    // Mark it anyway so a dead channel doesn't wedge the loop.
                    if let Err(e) = self.service.mark_ended(giveaway.giveaway_id).await {
                        error!(
                            "Failed to mark giveaway {} ended: {}",
                            giveaway.giveaway_id, e
                        );
                    }
                }
            }
        }

        Ok(())
    }

    async fn announce_result(&self, giveaway: &GiveawayRecord) -> anyhow::Result<()> {
        let channel_id: u64 = giveaway
            .channel_id
            .parse()
            .with_context(|| format!("Invalid giveaway channel_id '{}'", giveaway.channel_id))?;

        let entries = self.service.entries(giveaway.giveaway_id).await?;
        debug!(
            "Finishing giveaway {} with {} entries",
            giveaway.giveaway_id,
            entries.len()
        );

        let builder = match draw_winner(&entries, &mut rand::thread_rng()) {
            Some(winner) => {
                let winner_id: u64 = winner
                    .parse()
                    .with_context(|| format!("Invalid giveaway entry '{}'", winner))?;
                let content = format!(
                    "🎉 The giveaway for **{}** has ended! Congratulations <@{winner_id}>!",
                    giveaway.prize
                );
                let allowed_mentions =
                    CreateAllowedMentions::new().users(vec![UserId::new(winner_id)]);
                CreateMessage::new()
                    .content(content)
                    .allowed_mentions(allowed_mentions)
            }
            None => CreateMessage::new().content(format!(
                "📭 The giveaway for **{}** ended with no entries.",
                giveaway.prize
            )),
        };

        ChannelId::new(channel_id)
            .send_message(&self.http, builder)
            .await?;
        Ok(())
    }
}

fn draw_winner<'a>(entries: &'a [String], rng: &mut impl Rng) -> Option<&'a String> {
    if entries.is_empty() {
        return None;
    }
    Some(&entries[rng.gen_range(0..entries.len())])
}

#[cfg(test)]
mod tests {
    use super::draw_winner;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_winner_uniform_over_entries() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_winner(&[], &mut rng).is_none());

        let entries: Vec<String> = (1..=4).map(|n| n.to_string()).collect();
        for _ in 0..50 {
            let winner = draw_winner(&entries, &mut rng).unwrap();
            assert!(entries.contains(winner));
        }
    }
}
