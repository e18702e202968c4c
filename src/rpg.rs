use rand::Rng;

/// XP required to advance from `level` to the next one.
pub fn xp_for_level(level: i64) -> i64 {
    (100.0 * 1.5f64.powi((level - 1) as i32)) as i64
}

pub fn class_for_level(level: i64) -> &'static str {
    match level {
        l if l >= 50 => "Legendary Hero",
        l if l >= 40 => "Dragon Slayer",
        l if l >= 30 => "Master",
        l if l >= 20 => "Champion",
        l if l >= 15 => "Knight",
        l if l >= 10 => "Warrior",
        l if l >= 5 => "Adventurer",
        _ => "Novice",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStats {
    pub class: &'static str,
    pub max_hp: i64,
    pub attack: i64,
    pub defense: i64,
}

pub fn stats_for_level(level: i64) -> LevelStats {
    LevelStats {
        class: class_for_level(level),
        max_hp: 100 + (level - 1) * 10,
        attack: 10 + (level - 1) * 2,
        defense: 5 + (level - 1),
    }
}

pub fn battle_power(attack: i64, level: i64, rng: &mut impl Rng) -> i64 {
    attack * rng.gen_range(8..=12) + level * 5
}

pub fn heal_cost(level: i64) -> i64 {
    50 + level * 5
}

/// Chance of running into a boss instead of a regular encounter.
pub const BOSS_CHANCE: f64 = 0.1;
pub const BOSS_MIN_LEVEL: i64 = 10;

pub struct AdventureOutcome {
    pub description: &'static str,
    pub coins: (i64, i64),
    pub xp: (i64, i64),
    pub hp: (i64, i64),
}

pub const ADVENTURE_OUTCOMES: &[AdventureOutcome] = &[
    AdventureOutcome {
        description: "🗡️ Defeated a goblin",
        coins: (15, 30),
        xp: (10, 20),
        hp: (-5, 0),
    },
    AdventureOutcome {
        description: "💎 Found treasure",
        coins: (40, 80),
        xp: (5, 15),
        hp: (0, 0),
    },
    AdventureOutcome {
        description: "🕳️ Fell in trap",
        coins: (-20, 0),
        xp: (2, 5),
        hp: (-20, -10),
    },
    AdventureOutcome {
        description: "🧙 Helped wizard",
        coins: (25, 50),
        xp: (15, 30),
        hp: (0, 10),
    },
    AdventureOutcome {
        description: "⚔️ Fought bandit",
        coins: (20, 40),
        xp: (12, 25),
        hp: (-10, 0),
    },
];

#[derive(Debug, Clone)]
pub struct AdventureRoll {
    pub description: &'static str,
    pub coins: i64,
    pub xp: i64,
    pub hp_change: i64,
}

pub fn roll_adventure(rng: &mut impl Rng) -> AdventureRoll {
    let outcome = &ADVENTURE_OUTCOMES[rng.gen_range(0..ADVENTURE_OUTCOMES.len())];
    AdventureRoll {
        description: outcome.description,
        coins: rng.gen_range(outcome.coins.0..=outcome.coins.1),
        xp: rng.gen_range(outcome.xp.0..=outcome.xp.1),
        hp_change: rng.gen_range(outcome.hp.0..=outcome.hp.1),
    }
}

#[derive(Debug, Clone)]
pub struct BossFight {
    pub victory: bool,
    pub damage: i64,
    pub reward_coins: i64,
    pub reward_xp: i64,
}

pub fn roll_boss_fight(attack: i64, defense: i64, level: i64, rng: &mut impl Rng) -> BossFight {
    let boss_hp = 50 + level * 5;
    let player_power = attack + rng.gen_range(5..=15);
    let boss_power = 10 + level * 2 + rng.gen_range(0..=10);
    let damage = (boss_power - defense).max(0);

    if player_power >= boss_hp {
        BossFight {
            victory: true,
            damage,
            reward_coins: 100 + level * 20,
            reward_xp: 50 + level * 10,
        }
    } else {
        // A lost boss fight hurts twice as much.
        BossFight {
            victory: false,
            damage: damage * 2,
            reward_coins: 0,
            reward_xp: 0,
        }
    }
}
