pub mod giveaway;
pub mod quest;
pub mod shop;
pub mod user;
