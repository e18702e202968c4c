pub mod admin;
pub mod combat;
pub mod economy;
pub mod fun;
pub mod giveaway;
pub mod profile;
pub mod quests;
pub mod roles;
pub mod server;
pub mod shop;
pub mod undercover;

use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::{Data, Error};

/// Trims reply text to the platform message limit, cutting on a line
/// boundary where possible.
pub fn clamp_reply(text: String) -> String {
    if text.len() <= DISCORD_MESSAGE_LIMIT {
        return text;
    }
    let marker = "\n…";
    let mut cut = DISCORD_MESSAGE_LIMIT - marker.len();
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let cut = text[..cut].rfind('\n').unwrap_or(cut);
    format!("{}{marker}", &text[..cut])
}

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        profile::profile(),
        profile::leaderboard(),
        economy::daily(),
        economy::heal(),
        combat::adventure(),
        combat::pvp(),
        shop::shop(),
        shop::buy(),
        shop::inventory(),
        shop::equip(),
        shop::useitem(),
        quests::quest(),
        fun::luck(),
        fun::eightball(),
        fun::wheel(),
        fun::gif(),
        fun::calc(),
        undercover::undercover(),
        giveaway::giveaway(),
        roles::reactionrole(),
        roles::roles(),
        server::server(),
        admin::help(),
        admin::reboot(),
        admin::shutdown(),
    ]
}

#[cfg(test)]
mod tests {
    use super::clamp_reply;
    use crate::config::DISCORD_MESSAGE_LIMIT;

    #[test]
    fn test_clamp_reply_passes_short_text_through() {
        let text = "• one\n• two".to_string();
        assert_eq!(clamp_reply(text.clone()), text);
    }

    #[test]
    fn test_clamp_reply_cuts_long_text_on_a_line() {
        let lines: Vec<String> = (0..200).map(|i| format!("• entry number {i}")).collect();
        let clamped = clamp_reply(lines.join("\n"));
        assert!(clamped.len() <= DISCORD_MESSAGE_LIMIT);
        assert!(clamped.ends_with('…'));
        // No line is left half-printed before the marker.
        let before_marker = clamped.trim_end_matches("\n…");
        assert!(before_marker.lines().last().is_some_and(|l| l.starts_with("• entry")));
        assert!(before_marker.lines().last().is_some_and(|l| l.len() < 25));
    }
}
