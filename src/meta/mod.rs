//! Meta-progression: the skill tree and shop item rolls
//!
//! Logic only. The widgets that display these live outside the core.

pub mod shop;
pub mod skills;

pub use shop::{Item, ItemRarity, random_item};
pub use skills::{SkillKind, SkillTree};
