use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// In-memory per-user command cooldowns. Checking a cooldown that has
/// elapsed (or was never set) stamps it and allows the command.
#[derive(Clone, Default)]
pub struct CooldownTracker {
    entries: Arc<Mutex<HashMap<(u64, &'static str), Instant>>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the remaining wait when the user is still on cooldown.
    pub fn check(&self, user_id: u64, command: &'static str, cooldown: Duration) -> Option<Duration> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        if let Some(last) = entries.get(&(user_id, command)) {
            let elapsed = now.duration_since(*last);
            if elapsed < cooldown {
                return Some(cooldown - elapsed);
            }
        }

        entries.insert((user_id, command), now);
        None
    }

    pub fn reset(&self, user_id: u64, command: &'static str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&(user_id, command));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_blocks_then_allows() {
        let tracker = CooldownTracker::new();

        assert!(tracker.check(1, "adventure", Duration::from_secs(300)).is_none());
        let remaining = tracker
            .check(1, "adventure", Duration::from_secs(300))
            .expect("should be on cooldown");
        assert!(remaining <= Duration::from_secs(300));

        // Zero-length cooldowns never block.
        assert!(tracker.check(1, "adventure", Duration::ZERO).is_none());
    }

    #[test]
    fn test_cooldowns_are_per_user_and_per_command() {
        let tracker = CooldownTracker::new();
        let cd = Duration::from_secs(60);

        assert!(tracker.check(1, "adventure", cd).is_none());
        assert!(tracker.check(2, "adventure", cd).is_none());
        assert!(tracker.check(1, "pvp", cd).is_none());
        assert!(tracker.check(1, "adventure", cd).is_some());
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let tracker = CooldownTracker::new();
        let cd = Duration::from_secs(60);

        assert!(tracker.check(1, "pvp", cd).is_none());
        assert!(tracker.check(1, "pvp", cd).is_some());
        tracker.reset(1, "pvp");
        assert!(tracker.check(1, "pvp", cd).is_none());
    }
}
