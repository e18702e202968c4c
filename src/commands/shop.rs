use crate::services::shop::ShopService;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Browse the item shop, or buy straight from it
#[poise::command(slash_command, guild_only)]
pub async fn shop(
    ctx: Context<'_>,
    #[description = "Item to buy right away"] item: Option<String>,
) -> Result<(), Error> {
    if let Some(item) = item {
        return purchase_reply(ctx, &item).await;
    }

    let service = ShopService::new(ctx.data().db.clone());
    let items = service.catalog().await?;

    let mut weapons = Vec::new();
    let mut armor = Vec::new();
    let mut consumables = Vec::new();
    for item in &items {
        let line = format!(
            "**{}** — {} coins (lvl {})\n└ {}",
            item.item, item.price, item.level_req, item.description
        );
        match item.item_type.as_str() {
            "weapon" => weapons.push(line),
            "armor" => armor.push(line),
            _ => consumables.push(line),
        }
    }

    let embed = serenity::CreateEmbed::new()
        .title("🏪 Item Shop")
        .color(0x3498DB)
        .field("⚔️ Weapons", weapons.join("\n"), false)
        .field("🛡️ Armor", armor.join("\n"), false)
        .field("🧪 Consumables", consumables.join("\n"), false)
        .footer(serenity::CreateEmbedFooter::new(
            "Buy with /buy, equip with /equip, drink with /use",
        ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Buy an item from the shop
#[poise::command(slash_command, guild_only)]
pub async fn buy(
    ctx: Context<'_>,
    #[description = "Item name"] item: String,
) -> Result<(), Error> {
    purchase_reply(ctx, &item).await
}

async fn purchase_reply(ctx: Context<'_>, item: &str) -> Result<(), Error> {
    let author = ctx.author();
    let db = ctx.data().db.clone();
    crate::services::user::UserService::new(db.clone())
        .ensure(author.id.get(), &author.name)
        .await?;

    let service = ShopService::new(db);
    match service.purchase(author.id.get(), item).await? {
        Ok(item) => {
            ctx.say(format!(
                "🛒 You bought **{}** for {} coins.",
                item.item, item.price
            ))
            .await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}

/// Show your inventory
#[poise::command(slash_command, guild_only)]
pub async fn inventory(ctx: Context<'_>) -> Result<(), Error> {
    let service = ShopService::new(ctx.data().db.clone());
    let entries = service.inventory(ctx.author().id.get()).await?;

    if entries.is_empty() {
        ctx.say("🎒 Your inventory is empty. Visit the `/shop`!")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let marker = if entry.equipped { " *(equipped)*" } else { "" };
            let kind = entry.item_type.as_deref().unwrap_or("item");
            format!("**{}** ×{} — {kind}{marker}", entry.item, entry.quantity)
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title(format!("🎒 {}'s Inventory", ctx.author().name))
        .color(0x9B59B6)
        .description(lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Equip a weapon or armor
#[poise::command(slash_command, guild_only)]
pub async fn equip(
    ctx: Context<'_>,
    #[description = "Item name"] item: String,
) -> Result<(), Error> {
    let service = ShopService::new(ctx.data().db.clone());
    match service.equip(ctx.author().id.get(), &item).await? {
        Ok(result) => {
            let mut text = format!(
                "🛡️ Equipped **{item}**: +{} {}.",
                result.bonus_value, result.stat_bonus
            );
            if let Some(replaced) = result.replaced {
                text.push_str(&format!(" ({replaced} was unequipped.)"));
            }
            ctx.say(text).await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}

/// Use a consumable item
#[poise::command(slash_command, guild_only, rename = "use")]
pub async fn useitem(
    ctx: Context<'_>,
    #[description = "Item name"] item: String,
) -> Result<(), Error> {
    let service = ShopService::new(ctx.data().db.clone());
    match service.consume(ctx.author().id.get(), &item).await? {
        Ok(outcome) => {
            ctx.say(format!(
                "🧪 You used **{}** and recovered {} HP ({} HP now).",
                outcome.item, outcome.healed, outcome.new_hp
            ))
            .await?;
        }
        Err(error) => {
            ctx.say(format!("❌ {error}")).await?;
        }
    }
    Ok(())
}
