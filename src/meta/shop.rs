//! Shop item rolls
//!
//! Rarity first (weighted), then a uniform pick inside the rarity bucket.
//! The RNG is handed in so shop rolls share the game's seeded stream.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub name: &'static str,
    pub cost: u32,
    pub rarity: ItemRarity,
}

const fn item(name: &'static str, cost: u32, rarity: ItemRarity) -> Item {
    Item { name, cost, rarity }
}

const COMMON: &[Item] = &[
    item("Small Potion", 25, ItemRarity::Common),
    item("Throwing Knife", 40, ItemRarity::Common),
    item("Bandage", 15, ItemRarity::Common),
];

const UNCOMMON: &[Item] = &[
    item("Medium Potion", 75, ItemRarity::Uncommon),
    item("Sturdy Boots", 120, ItemRarity::Uncommon),
];

const RARE: &[Item] = &[
    item("Large Potion", 150, ItemRarity::Rare),
    item("Samurai Charm", 200, ItemRarity::Rare),
];

const EPIC: &[Item] = &[item("Blade of Rhythm", 500, ItemRarity::Epic)];

/// Rarity weights out of 100
const WEIGHTS: [(ItemRarity, u32); 4] = [
    (ItemRarity::Common, 60),
    (ItemRarity::Uncommon, 25),
    (ItemRarity::Rare, 12),
    (ItemRarity::Epic, 3),
];

fn pick_rarity_weighted(rng: &mut impl Rng) -> ItemRarity {
    let total: u32 = WEIGHTS.iter().map(|(_, w)| w).sum();
    let roll = rng.random_range(0..total);

    let mut acc = 0;
    for (rarity, weight) in WEIGHTS {
        acc += weight;
        if roll < acc {
            return rarity;
        }
    }
    ItemRarity::Common
}

fn bucket(rarity: ItemRarity) -> &'static [Item] {
    match rarity {
        ItemRarity::Common => COMMON,
        ItemRarity::Uncommon => UNCOMMON,
        ItemRarity::Rare => RARE,
        ItemRarity::Epic => EPIC,
    }
}

/// Roll one shop offer
pub fn random_item(rng: &mut impl Rng) -> Item {
    let rarity = pick_rarity_weighted(rng);
    let pool = bucket(rarity);
    pool[rng.random_range(0..pool.len())]
}
