use crate::calc;
use crate::services::user::UserService;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const SLOT_SYMBOLS: &[&str] = &["🍒", "🍋", "🍇", "💎", "⭐", "7️⃣"];

const EIGHTBALL_ANSWERS: &[&str] = &[
    "It is certain.",
    "Without a doubt.",
    "Yes, definitely.",
    "Most likely.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

const SPIN_FRAMES: usize = 5;

/// The reels slow down as they settle.
fn spin_delay(frame: usize) -> Duration {
    Duration::from_millis((100 * (frame as u64 + 1)).min(500))
}

fn slot_winnings([a, b, c]: [&str; 3]) -> i64 {
    if a == b && b == c {
        100
    } else if a == b || b == c || a == c {
        20
    } else {
        0
    }
}

/// Spin the luck wheel
#[poise::command(slash_command, guild_only)]
pub async fn luck(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    let service = UserService::new(ctx.data().db.clone());
    service.ensure(author.id.get(), &author.name).await?;

    let spins: Vec<[&str; 3]> = {
        let mut rng = rand::thread_rng();
        (0..SPIN_FRAMES)
            .map(|_| {
                [
                    SLOT_SYMBOLS[rng.gen_range(0..SLOT_SYMBOLS.len())],
                    SLOT_SYMBOLS[rng.gen_range(0..SLOT_SYMBOLS.len())],
                    SLOT_SYMBOLS[rng.gen_range(0..SLOT_SYMBOLS.len())],
                ]
            })
            .collect()
    };

    let reply = ctx.say("🎰 Spinning...").await?;
    for (frame, spin) in spins[..spins.len() - 1].iter().enumerate() {
        tokio::time::sleep(spin_delay(frame)).await;
        reply
            .edit(
                ctx,
                poise::CreateReply::default()
                    .content(format!("🎰 | {} | {} | {} |", spin[0], spin[1], spin[2])),
            )
            .await?;
    }

    let last = spins[spins.len() - 1];
    let [a, b, c] = last;
    let winnings = slot_winnings(last);

    let outcome = match winnings {
        100 => "💰 JACKPOT! You win **100 coins**!",
        20 => "✨ A pair! You win **20 coins**.",
        _ => "😢 No luck this time.",
    };
    if winnings > 0 {
        service.grant(author.id.get(), 0, winnings).await?;
    }

    tokio::time::sleep(spin_delay(SPIN_FRAMES - 1)).await;
    let embed = serenity::CreateEmbed::new()
        .title("🎰 Luck Wheel")
        .color(if winnings > 0 { 0xF1C40F } else { 0x95A5A6 })
        .description(format!("| {a} | {b} | {c} |\n\n{outcome}"));
    reply
        .edit(
            ctx,
            poise::CreateReply::default().content("").embed(embed),
        )
        .await?;
    Ok(())
}

/// Ask the magic 8-ball
#[poise::command(slash_command)]
pub async fn eightball(
    ctx: Context<'_>,
    #[description = "Your question"] question: String,
) -> Result<(), Error> {
    let answer = {
        let mut rng = rand::thread_rng();
        EIGHTBALL_ANSWERS[rng.gen_range(0..EIGHTBALL_ANSWERS.len())]
    };
    ctx.say(format!("❓ {question}\n🎱 {answer}")).await?;
    Ok(())
}

const WHEEL_DEFAULTS: &[&str] = &[
    "Minecraft",
    "Among Us",
    "Rocket League",
    "Fortnite",
    "Valorant",
    "League of Legends",
    "Stardew Valley",
    "Chess",
];

/// Spin the game wheel
#[poise::command(slash_command)]
pub async fn wheel(
    ctx: Context<'_>,
    #[description = "Comma-separated options (default: the game wheel)"] options: Option<String>,
) -> Result<(), Error> {
    let options = options.unwrap_or_default();
    let mut choices: Vec<&str> = options
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if choices.is_empty() {
        choices = WHEEL_DEFAULTS.to_vec();
    }

    if choices.len() < 2 {
        ctx.say("❌ Give me at least two options, separated by commas.")
            .await?;
        return Ok(());
    }

    let picked = {
        let mut rng = rand::thread_rng();
        *choices.choose(&mut rng).ok_or("empty choices")?
    };
    ctx.say(format!("🎡 The wheel lands on... **{picked}**!"))
        .await?;
    Ok(())
}

/// Search for a GIF
#[poise::command(slash_command)]
pub async fn gif(
    ctx: Context<'_>,
    #[description = "What to search for"] query: String,
) -> Result<(), Error> {
    let Some(api_key) = ctx.data().config.giphy_api_key.clone() else {
        ctx.say("❌ GIF search is not configured on this bot.").await?;
        return Ok(());
    };

    ctx.defer().await?;

    let response: serde_json::Value = ctx
        .data()
        .http_client
        .get("https://api.giphy.com/v1/gifs/search")
        .query(&[
            ("api_key", api_key.as_str()),
            ("q", query.as_str()),
            ("limit", "25"),
            ("rating", "pg-13"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let urls: Vec<&str> = response["data"]
        .as_array()
        .map(|gifs| {
            gifs.iter()
                .filter_map(|gif| gif["url"].as_str())
                .collect()
        })
        .unwrap_or_default();

    let picked = {
        let mut rng = rand::thread_rng();
        urls.choose(&mut rng).copied()
    };
    match picked {
        Some(url) => ctx.say(url).await?,
        None => ctx.say(format!("🔍 No GIFs found for \"{query}\".")).await?,
    };
    Ok(())
}

/// Evaluate a math expression
#[poise::command(slash_command)]
pub async fn calc(
    ctx: Context<'_>,
    #[description = "Expression, e.g. (2 + 3) * sqrt(16)"] expression: String,
) -> Result<(), Error> {
    match calc::evaluate(&expression) {
        Ok(value) => {
            ctx.say(format!("🧮 `{expression}` = **{value}**")).await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{slot_winnings, spin_delay, SPIN_FRAMES};
    use std::time::Duration;

    #[test]
    fn test_spin_delay_ramps_up() {
        let delays: Vec<Duration> = (0..SPIN_FRAMES).map(spin_delay).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(delays[0], Duration::from_millis(100));
        assert_eq!(delays[SPIN_FRAMES - 1], Duration::from_millis(500));
    }

    #[test]
    fn test_slot_winnings_tiers() {
        assert_eq!(slot_winnings(["💎", "💎", "💎"]), 100);
        assert_eq!(slot_winnings(["💎", "💎", "🍒"]), 20);
        assert_eq!(slot_winnings(["🍋", "💎", "🍋"]), 20);
        assert_eq!(slot_winnings(["🍒", "🍋", "💎"]), 0);
    }
}
