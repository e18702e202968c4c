use crate::db::CompletedQuest;
use crate::rpg;
use crate::services::user::UserService;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use rand::Rng;
use std::time::Duration;
use tracing::info;

fn fmt_cooldown(remaining: Duration) -> String {
    humantime::format_duration(Duration::from_secs(remaining.as_secs().max(1))).to_string()
}

fn quest_lines(completed: &[CompletedQuest]) -> Option<String> {
    if completed.is_empty() {
        return None;
    }
    let lines: Vec<String> = completed
        .iter()
        .map(|q| {
            format!(
                "📜 **{}** complete! +{} coins, +{} XP",
                q.name, q.reward_coins, q.reward_xp
            )
        })
        .collect();
    Some(lines.join("\n"))
}

/// Go on an adventure
#[poise::command(slash_command, guild_only)]
pub async fn adventure(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author();
    let data = ctx.data();
    let service = UserService::new(data.db.clone());
    service.ensure(author.id.get(), &author.name).await?;

    let user = service
        .profile(author.id.get())
        .await?
        .ok_or("profile missing after ensure")?;
    if !user.is_alive() {
        ctx.say("💀 You are at 0 HP. Use `/heal` before adventuring again.")
            .await?;
        return Ok(());
    }

    let cooldown = Duration::from_secs(data.config.adventure_cooldown_secs);
    if let Some(remaining) = data.cooldowns.check(author.id.get(), "adventure", cooldown) {
        ctx.say(format!(
            "⏳ You are still recovering. Try again in {}.",
            fmt_cooldown(remaining)
        ))
        .await?;
        return Ok(());
    }

    enum Encounter {
        Regular(rpg::AdventureRoll),
        Boss(rpg::BossFight),
    }

    let encounter = {
        let mut rng = rand::thread_rng();
        if user.level >= rpg::BOSS_MIN_LEVEL && rng.gen_bool(rpg::BOSS_CHANCE) {
            Encounter::Boss(rpg::roll_boss_fight(
                user.attack,
                user.defense,
                user.level,
                &mut rng,
            ))
        } else {
            Encounter::Regular(rpg::roll_adventure(&mut rng))
        }
    };

    let embed = match encounter {
        Encounter::Regular(roll) => {
            let description = roll.description;
            let (coins, xp, hp_change) = (roll.coins, roll.xp, roll.hp_change);
            let applied = service.apply_adventure(author.id.get(), roll).await?;

            let mut body = format!(
                "{description}!\n💰 {coins:+} coins · ✨ +{xp} XP · ❤️ {hp_change:+} HP ({}/{})",
                applied.new_hp, user.max_hp
            );
            if applied.report.leveled_up {
                body.push_str(&format!(
                    "\n🎉 Level up! You are now level {}.",
                    applied.report.new_level
                ));
            }
            if let Some(quests) = quest_lines(&applied.completed_quests) {
                body.push('\n');
                body.push_str(&quests);
            }
            serenity::CreateEmbed::new()
                .title("🌄 Adventure")
                .color(0x57F287)
                .description(body)
        }
        Encounter::Boss(fight) => {
            let victory = fight.victory;
            let (damage, coins, xp) = (fight.damage, fight.reward_coins, fight.reward_xp);
            let applied = service.apply_boss_fight(author.id.get(), fight).await?;

            let mut body = if victory {
                format!(
                    "🐉 A mighty boss appeared — and you slew it!\n💰 +{coins} coins · ✨ +{xp} XP · ❤️ -{damage} HP ({}/{})",
                    applied.new_hp, user.max_hp
                )
            } else {
                format!(
                    "🐉 A mighty boss appeared and drove you off!\n❤️ -{damage} HP ({}/{})",
                    applied.new_hp, user.max_hp
                )
            };
            if applied.report.leveled_up {
                body.push_str(&format!(
                    "\n🎉 Level up! You are now level {}.",
                    applied.report.new_level
                ));
            }
            if let Some(quests) = quest_lines(&applied.completed_quests) {
                body.push('\n');
                body.push_str(&quests);
            }
            serenity::CreateEmbed::new()
                .title("⚔️ Boss Fight")
                .color(if victory { 0xF1C40F } else { 0xED4245 })
                .description(body)
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Challenge another player to a duel
#[poise::command(slash_command, guild_only)]
pub async fn pvp(
    ctx: Context<'_>,
    #[description = "Who to challenge"] opponent: serenity::User,
) -> Result<(), Error> {
    let author = ctx.author();
    let data = ctx.data();

    if opponent.bot {
        ctx.say("🤖 Bots don't duel.").await?;
        return Ok(());
    }
    if opponent.id == author.id {
        ctx.say("🪞 You cannot fight yourself.").await?;
        return Ok(());
    }

    let service = UserService::new(data.db.clone());
    service.ensure(author.id.get(), &author.name).await?;
    service.ensure(opponent.id.get(), &opponent.name).await?;

    let attacker = service
        .profile(author.id.get())
        .await?
        .ok_or("profile missing after ensure")?;
    let defender = service
        .profile(opponent.id.get())
        .await?
        .ok_or("profile missing after ensure")?;

    if !attacker.is_alive() {
        ctx.say("💀 You are at 0 HP. Use `/heal` first.").await?;
        return Ok(());
    }
    if !defender.is_alive() {
        ctx.say(format!("💀 {} is at 0 HP and cannot fight.", defender.username))
            .await?;
        return Ok(());
    }

    let cooldown = Duration::from_secs(data.config.pvp_cooldown_secs);
    if let Some(remaining) = data.cooldowns.check(author.id.get(), "pvp", cooldown) {
        ctx.say(format!(
            "⏳ You fought too recently. Try again in {}.",
            fmt_cooldown(remaining)
        ))
        .await?;
        return Ok(());
    }

    // Challenge with accept/decline buttons; only the opponent may answer.
    let accept = serenity::CreateButton::new("pvp_accept")
        .label("Accept")
        .style(serenity::ButtonStyle::Success);
    let decline = serenity::CreateButton::new("pvp_decline")
        .label("Decline")
        .style(serenity::ButtonStyle::Danger);
    let row = serenity::CreateActionRow::Buttons(vec![accept, decline]);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content(format!(
                    "⚔️ <@{}>, **{}** challenges you to a duel! Do you accept?",
                    opponent.id, author.name
                ))
                .components(vec![row]),
        )
        .await?;
    let mut message = reply.message().await?.into_owned();

    let timeout = Duration::from_secs(data.config.pvp_challenge_timeout_secs);
    let accepted = loop {
        let Some(interaction) = message
            .await_component_interaction(ctx.serenity_context())
            .timeout(timeout)
            .await
        else {
            break None;
        };

        if interaction.user.id != opponent.id {
            let _ = interaction
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .content(format!("Only <@{}> can answer this challenge.", opponent.id))
                            .ephemeral(true),
                    ),
                )
                .await;
            continue;
        }

        let accepted = interaction.data.custom_id == "pvp_accept";
        let _ = interaction
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new().components(vec![]),
                ),
            )
            .await;
        break Some(accepted);
    };

    match accepted {
        None => {
            let _ = message
                .edit(
                    ctx.http(),
                    serenity::EditMessage::new()
                        .content(format!(
                            "⌛ {} didn't answer the challenge in time.",
                            opponent.name
                        ))
                        .components(vec![]),
                )
                .await;
            // An unanswered challenge doesn't burn the cooldown.
            data.cooldowns.reset(author.id.get(), "pvp");
            return Ok(());
        }
        Some(false) => {
            message
                .edit(
                    ctx.http(),
                    serenity::EditMessage::new()
                        .content(format!("🏳️ {} declined the duel.", opponent.name))
                        .components(vec![]),
                )
                .await?;
            data.cooldowns.reset(author.id.get(), "pvp");
            return Ok(());
        }
        Some(true) => {}
    }

    let (attacker_power, defender_power) = {
        let mut rng = rand::thread_rng();
        (
            rpg::battle_power(attacker.attack, attacker.level, &mut rng),
            rpg::battle_power(defender.attack, defender.level, &mut rng),
        )
    };

    // Ties go to the challenger.
    let attacker_won = attacker_power >= defender_power;
    let (winner, loser) = if attacker_won {
        (&attacker, &defender)
    } else {
        (&defender, &attacker)
    };
    let (winner_power, loser_power) = if attacker_won {
        (attacker_power, defender_power)
    } else {
        (defender_power, attacker_power)
    };

    let damage = ((winner_power - loser_power) / 10).max(1);
    let loser_hp = (loser.hp - damage).max(0);
    let reward_xp = 30 + loser.level * 5;
    let reward_coins = 25 + loser.level * 5;

    let winner_id: u64 = winner.user_id.parse()?;
    let completed = service
        .apply_pvp_result(
            author.id.get(),
            opponent.id.get(),
            winner_id,
            loser_hp,
            attacker_power,
            defender_power,
            reward_xp,
            reward_coins,
        )
        .await?;

    info!(
        "PvP: {} ({}) vs {} ({}), winner {}",
        attacker.username, attacker_power, defender.username, defender_power, winner.username
    );

    let mut body = format!(
        "**{}** ({attacker_power}) vs **{}** ({defender_power})\n\n🏆 **{}** wins! +{reward_coins} coins, +{reward_xp} XP\n💔 {} drops to {loser_hp} HP.",
        attacker.username, defender.username, winner.username, loser.username
    );
    if let Some(quests) = quest_lines(&completed) {
        body.push('\n');
        body.push_str(&quests);
    }

    let embed = serenity::CreateEmbed::new()
        .title("⚔️ Duel Result")
        .color(0xE67E22)
        .description(body);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
