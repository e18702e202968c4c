use thiserror::Error;

/// Expected gameplay failures. These are surfaced to the user as a plain
/// message instead of being logged as command errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("You need {0} coins for that.")]
    InsufficientFunds(i64),

    #[error("You need to be level {0} for that.")]
    LevelTooLow(i64),

    #[error("Item not found.")]
    ItemNotFound,

    #[error("That item is already equipped.")]
    AlreadyEquipped,

    #[error("You don't own that item.")]
    NotOwned,

    #[error("That item cannot be equipped. Try /use instead.")]
    NotEquippable,

    #[error("That item is not a consumable. Try /equip instead.")]
    NotConsumable,

    #[error("Quest not found.")]
    QuestNotFound,

    #[error("Quest already active.")]
    QuestAlreadyActive,

    #[error("Quest already completed.")]
    QuestAlreadyCompleted,
}
