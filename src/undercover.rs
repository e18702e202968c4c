use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

pub const MIN_PLAYERS: usize = 3;

/// (civilian word, undercover word)
pub const WORD_PAIRS: &[(&str, &str)] = &[
    ("Cat", "Tiger"),
    ("Coffee", "Tea"),
    ("Pizza", "Burger"),
    ("Beach", "Desert"),
    ("Guitar", "Violin"),
    ("Soccer", "Basketball"),
    ("Winter", "Autumn"),
    ("Moon", "Sun"),
    ("Train", "Bus"),
    ("Apple", "Pear"),
    ("Painter", "Sculptor"),
    ("Doctor", "Nurse"),
    ("River", "Lake"),
    ("Castle", "Palace"),
    ("Spider", "Scorpion"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinError {
    AlreadyStarted,
    AlreadyJoined,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StartError {
    AlreadyStarted,
    NotEnoughPlayers(usize),
}

#[derive(Debug, PartialEq, Eq)]
pub enum VoteError {
    NotStarted,
    NotAPlayer,
    InvalidTarget,
    AlreadyVoted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub player: Player,
    pub word: &'static str,
    pub is_undercover: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conclusion {
    /// The undercover was voted out.
    CiviliansWin,
    /// Too few players remain to corner the undercover.
    UndercoverWins,
    /// A civilian was eliminated; next round begins.
    Continues,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    pub eliminated: Player,
    pub conclusion: Conclusion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote recorded, round still in progress.
    Recorded { votes_cast: usize, needed: usize },
    RoundComplete(TallyResult),
}

/// One Undercover game: lobby, secret word assignment, then rounds of
/// voting until the undercover is caught or outlasts the group.
#[derive(Debug, Default)]
pub struct UndercoverGame {
    players: Vec<Player>,
    started: bool,
    undercover: Option<u64>,
    votes: HashMap<u64, u64>,
}

impl UndercoverGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn votes_cast(&self) -> usize {
        self.votes.len()
    }

    pub fn join(&mut self, id: u64, name: &str) -> Result<(), JoinError> {
        if self.started {
            return Err(JoinError::AlreadyStarted);
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(JoinError::AlreadyJoined);
        }
        self.players.push(Player {
            id,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn leave(&mut self, id: u64) -> bool {
        if self.started {
            return false;
        }
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != before
    }

    /// Starts the game: picks the undercover and a word pair, and returns
    /// the per-player word assignments to deliver by DM.
    pub fn start(&mut self, rng: &mut impl Rng) -> Result<Vec<Assignment>, StartError> {
        if self.started {
            return Err(StartError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(StartError::NotEnoughPlayers(self.players.len()));
        }

        self.started = true;
        self.votes.clear();

        let undercover = self.players[rng.gen_range(0..self.players.len())].id;
        self.undercover = Some(undercover);

        let (civilian_word, undercover_word) = WORD_PAIRS[rng.gen_range(0..WORD_PAIRS.len())];

        Ok(self
            .players
            .iter()
            .map(|player| {
                let is_undercover = player.id == undercover;
                Assignment {
                    player: player.clone(),
                    word: if is_undercover {
                        undercover_word
                    } else {
                        civilian_word
                    },
                    is_undercover,
                }
            })
            .collect())
    }

    /// Records a vote. When the last outstanding vote lands, the round is
    /// tallied: the most-voted player is eliminated (ties broken at
    /// random) and the game either ends or moves to the next round.
    pub fn cast_vote(
        &mut self,
        voter: u64,
        target: u64,
        rng: &mut impl Rng,
    ) -> Result<VoteOutcome, VoteError> {
        if !self.started {
            return Err(VoteError::NotStarted);
        }
        if !self.players.iter().any(|p| p.id == voter) {
            return Err(VoteError::NotAPlayer);
        }
        if voter == target || !self.players.iter().any(|p| p.id == target) {
            return Err(VoteError::InvalidTarget);
        }
        if self.votes.contains_key(&voter) {
            return Err(VoteError::AlreadyVoted);
        }

        self.votes.insert(voter, target);

        if self.votes.len() < self.players.len() {
            return Ok(VoteOutcome::Recorded {
                votes_cast: self.votes.len(),
                needed: self.players.len(),
            });
        }

        Ok(VoteOutcome::RoundComplete(self.tally(rng)))
    }

    fn tally(&mut self, rng: &mut impl Rng) -> TallyResult {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for target in self.votes.values() {
            *counts.entry(*target).or_insert(0) += 1;
        }

        let highest = counts.values().copied().max().unwrap_or(0);
        let mut tied: Vec<u64> = counts
            .iter()
            .filter(|(_, n)| **n == highest)
            .map(|(id, _)| *id)
            .collect();
        tied.sort_unstable(); // deterministic order before the random pick
        let eliminated_id = tied[rng.gen_range(0..tied.len())];

        // Votes are validated against the player list, so the pick is
        // always present.
        let eliminated = self
            .players
            .iter()
            .find(|p| p.id == eliminated_id)
            .cloned()
            .unwrap_or_else(|| Player {
                id: eliminated_id,
                name: String::from("?"),
            });

        if Some(eliminated_id) == self.undercover {
            self.reset();
            return TallyResult {
                eliminated,
                conclusion: Conclusion::CiviliansWin,
            };
        }

        self.players.retain(|p| p.id != eliminated_id);
        self.votes.clear();

        if self.players.len() < MIN_PLAYERS {
            self.reset();
            return TallyResult {
                eliminated,
                conclusion: Conclusion::UndercoverWins,
            };
        }

        TallyResult {
            eliminated,
            conclusion: Conclusion::Continues,
        }
    }

    pub fn reset(&mut self) {
        self.players.clear();
        self.started = false;
        self.undercover = None;
        self.votes.clear();
    }
}

/// One game per guild.
#[derive(Default)]
pub struct UndercoverManager {
    games: Mutex<HashMap<u64, UndercoverGame>>,
}

impl UndercoverManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game<T>(&self, guild_id: u64, f: impl FnOnce(&mut UndercoverGame) -> T) -> T {
        let mut games = self.games.lock().unwrap();
        f(games.entry(guild_id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lobby(n: usize) -> UndercoverGame {
        let mut game = UndercoverGame::new();
        for i in 0..n {
            game.join(i as u64 + 1, &format!("p{}", i + 1)).unwrap();
        }
        game
    }

    fn started(n: usize, seed: u64) -> (UndercoverGame, u64) {
        let mut game = lobby(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let assignments = game.start(&mut rng).unwrap();
        let undercover = assignments
            .iter()
            .find(|a| a.is_undercover)
            .unwrap()
            .player
            .id;
        (game, undercover)
    }

    #[test]
    fn test_lobby_join_leave() {
        let mut game = UndercoverGame::new();
        assert!(game.join(1, "alice").is_ok());
        assert_eq!(game.join(1, "alice"), Err(JoinError::AlreadyJoined));
        assert!(game.leave(1));
        assert!(!game.leave(1));
    }

    #[test]
    fn test_start_requires_three_players() {
        let mut game = lobby(2);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(game.start(&mut rng), Err(StartError::NotEnoughPlayers(2)));

        game.join(3, "p3").unwrap();
        let assignments = game.start(&mut rng).unwrap();
        assert_eq!(assignments.len(), 3);
        assert_eq!(game.start(&mut rng), Err(StartError::AlreadyStarted));
        assert_eq!(game.join(4, "late"), Err(JoinError::AlreadyStarted));
        assert!(!game.leave(1));
    }

    #[test]
    fn test_word_assignment_is_consistent() {
        let mut game = lobby(5);
        let mut rng = StdRng::seed_from_u64(11);
        let assignments = game.start(&mut rng).unwrap();

        let undercover: Vec<_> = assignments.iter().filter(|a| a.is_undercover).collect();
        assert_eq!(undercover.len(), 1);

        let civilian_words: Vec<_> = assignments
            .iter()
            .filter(|a| !a.is_undercover)
            .map(|a| a.word)
            .collect();
        assert!(civilian_words.windows(2).all(|w| w[0] == w[1]));
        assert_ne!(undercover[0].word, civilian_words[0]);
        assert!(WORD_PAIRS
            .iter()
            .any(|(c, u)| *c == civilian_words[0] && *u == undercover[0].word));
    }

    #[test]
    fn test_vote_validation() {
        let (mut game, _) = started(3, 1);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(
            game.cast_vote(99, 1, &mut rng),
            Err(VoteError::NotAPlayer)
        );
        assert_eq!(
            game.cast_vote(1, 1, &mut rng),
            Err(VoteError::InvalidTarget)
        );
        assert_eq!(
            game.cast_vote(1, 99, &mut rng),
            Err(VoteError::InvalidTarget)
        );

        assert!(matches!(
            game.cast_vote(1, 2, &mut rng),
            Ok(VoteOutcome::Recorded {
                votes_cast: 1,
                needed: 3
            })
        ));
        assert_eq!(game.cast_vote(1, 3, &mut rng), Err(VoteError::AlreadyVoted));
    }

    #[test]
    fn test_vote_rejected_before_start() {
        let mut game = lobby(3);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(game.cast_vote(1, 2, &mut rng), Err(VoteError::NotStarted));
    }

    #[test]
    fn test_civilians_win_when_undercover_voted_out() {
        let (mut game, undercover) = started(3, 5);
        let mut rng = StdRng::seed_from_u64(6);

        let ids: Vec<u64> = game.players().iter().map(|p| p.id).collect();
        let mut outcome = None;
        for voter in ids {
            let target = if voter == undercover {
                // The undercover votes for someone else.
                *game
                    .players()
                    .iter()
                    .map(|p| &p.id)
                    .find(|id| **id != undercover)
                    .unwrap()
            } else {
                undercover
            };
            outcome = Some(game.cast_vote(voter, target, &mut rng).unwrap());
        }

        match outcome.unwrap() {
            VoteOutcome::RoundComplete(result) => {
                assert_eq!(result.eliminated.id, undercover);
                assert_eq!(result.conclusion, Conclusion::CiviliansWin);
            }
            other => panic!("expected round completion, got {:?}", other),
        }
        // Game reset after the win.
        assert!(!game.is_started());
        assert!(game.players().is_empty());
    }

    #[test]
    fn test_undercover_wins_when_group_shrinks() {
        // 3 players: eliminating one civilian drops the group below the
        // minimum, so the undercover wins immediately.
        let (mut game, undercover) = started(3, 9);
        let mut rng = StdRng::seed_from_u64(10);

        let civilian = *game
            .players()
            .iter()
            .map(|p| &p.id)
            .find(|id| **id != undercover)
            .unwrap();

        let ids: Vec<u64> = game.players().iter().map(|p| p.id).collect();
        let mut outcome = None;
        for voter in ids {
            let target = if voter == civilian {
                if civilian == undercover {
                    unreachable!()
                } else {
                    // The scapegoat votes for anyone but themselves.
                    *game
                        .players()
                        .iter()
                        .map(|p| &p.id)
                        .find(|id| **id != civilian)
                        .unwrap()
                }
            } else {
                civilian
            };
            outcome = Some(game.cast_vote(voter, target, &mut rng).unwrap());
        }

        match outcome.unwrap() {
            VoteOutcome::RoundComplete(result) => {
                assert_eq!(result.eliminated.id, civilian);
                assert_eq!(result.conclusion, Conclusion::UndercoverWins);
            }
            other => panic!("expected round completion, got {:?}", other),
        }
    }

    #[test]
    fn test_game_continues_with_enough_players() {
        let (mut game, undercover) = started(5, 21);
        let mut rng = StdRng::seed_from_u64(22);

        let civilian = *game
            .players()
            .iter()
            .map(|p| &p.id)
            .find(|id| **id != undercover)
            .unwrap();

        let ids: Vec<u64> = game.players().iter().map(|p| p.id).collect();
        let mut outcome = None;
        for voter in ids {
            let target = if voter == civilian { undercover } else { civilian };
            outcome = Some(game.cast_vote(voter, target, &mut rng).unwrap());
        }

        match outcome.unwrap() {
            VoteOutcome::RoundComplete(result) => {
                assert_eq!(result.eliminated.id, civilian);
                assert_eq!(result.conclusion, Conclusion::Continues);
            }
            other => panic!("expected round completion, got {:?}", other),
        }

        // Next round: eliminated player is gone, votes reset.
        assert!(game.is_started());
        assert_eq!(game.players().len(), 4);
        assert_eq!(game.votes_cast(), 0);
        assert!(game.players().iter().all(|p| p.id != civilian));
    }

    #[test]
    fn test_tie_break_picks_one_of_the_tied() {
        let (mut game, _) = started(4, 31);
        let mut rng = StdRng::seed_from_u64(32);

        let ids: Vec<u64> = game.players().iter().map(|p| p.id).collect();
        // A clean 2-2 tie between ids[0] and ids[1].
        game.cast_vote(ids[0], ids[1], &mut rng).unwrap();
        game.cast_vote(ids[2], ids[1], &mut rng).unwrap();
        game.cast_vote(ids[1], ids[0], &mut rng).unwrap();
        let outcome = game.cast_vote(ids[3], ids[0], &mut rng).unwrap();

        match outcome {
            VoteOutcome::RoundComplete(result) => {
                assert!(result.eliminated.id == ids[0] || result.eliminated.id == ids[1]);
            }
            other => panic!("expected round completion, got {:?}", other),
        }
    }

    #[test]
    fn test_manager_keeps_games_per_guild() {
        let manager = UndercoverManager::new();
        manager.with_game(1, |game| game.join(10, "a").unwrap());
        manager.with_game(2, |game| game.join(20, "b").unwrap());

        assert_eq!(manager.with_game(1, |game| game.players().len()), 1);
        assert_eq!(manager.with_game(2, |game| game.players().len()), 1);
        assert_eq!(
            manager.with_game(1, |game| game.players()[0].id),
            10
        );
    }
}
