//! Skill tree progression
//!
//! Four branches radiating from a shared pool of points earned on kills.
//! Each branch is a tier chain: a skill unlocks only when some skill one
//! tier below it in the same branch is already owned. Pure logic; drawing
//! the tree is someone else's job.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Survivability,
    Offense,
    Mobility,
    Rhythm,
}

/// What a skill actually does when owned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    /// +1 heal charge
    ExtraHeal,
    /// +1 max HP
    ExtraHealth,
    /// Small heal when killing enemies
    HealOnKill,
    /// +10% damage
    CritChance,
    /// Unlocks the special finisher
    SpecialAttack,
    /// Faster combo window
    AttackSpeed,
    /// Dash move / dash upgrades
    Dash,
    /// Perfect blocks restore stamina
    PerfectBlockBonus,
    /// +damage at high BPM
    BpmDamageBoost,
    /// +defence at low BPM
    BpmDefenceBoost,
}

#[derive(Debug, Clone)]
pub struct Skill {
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub branch: Branch,
    pub tier: u8,
    pub kind: SkillKind,
    pub unlocked: bool,
}

const fn skill(
    name: &'static str,
    description: &'static str,
    cost: u32,
    branch: Branch,
    tier: u8,
    kind: SkillKind,
) -> Skill {
    Skill {
        name,
        description,
        cost,
        branch,
        tier,
        kind,
        unlocked: false,
    }
}

#[derive(Debug, Clone)]
pub struct SkillTree {
    skills: Vec<Skill>,
    points: u32,
}

impl Default for SkillTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillTree {
    pub fn new() -> Self {
        let skills = vec![
            // Survivability branch
            skill("Extra Heal I", "+1 Heal Charge", 1, Branch::Survivability, 0, SkillKind::ExtraHeal),
            skill("Extra Heal II", "+1 Heal Charge", 2, Branch::Survivability, 1, SkillKind::ExtraHeal),
            skill("Extra Heart I", "+1 Max HP", 2, Branch::Survivability, 2, SkillKind::ExtraHealth),
            skill("Heal on Kill", "Small heal when killing enemies", 3, Branch::Survivability, 3, SkillKind::HealOnKill),
            // Offense branch
            skill("Attack Up I", "+10% damage", 1, Branch::Offense, 0, SkillKind::CritChance),
            skill("Attack Up II", "+10% damage", 2, Branch::Offense, 1, SkillKind::CritChance),
            skill("Special Attack", "Unlocks special finisher", 4, Branch::Offense, 2, SkillKind::SpecialAttack),
            skill("Attack Speed", "Faster combo window", 3, Branch::Offense, 3, SkillKind::AttackSpeed),
            // Mobility branch
            skill("Dash", "Quick dash move", 2, Branch::Mobility, 0, SkillKind::Dash),
            skill("Dash I-frames", "Dash grants brief invulnerability", 3, Branch::Mobility, 1, SkillKind::Dash),
            skill("Double Dash", "2 dash charges", 4, Branch::Mobility, 2, SkillKind::Dash),
            // Rhythm branch
            skill("Perfect Guard", "Perfect blocks restore stamina", 2, Branch::Rhythm, 0, SkillKind::PerfectBlockBonus),
            skill("Beat Fury", "+damage at high BPM", 3, Branch::Rhythm, 1, SkillKind::BpmDamageBoost),
            skill("Beat Focus", "+defence at low BPM", 3, Branch::Rhythm, 2, SkillKind::BpmDefenceBoost),
        ];
        Self { skills, points: 0 }
    }

    /// Gain a point (from defeating an enemy)
    pub fn add_point(&mut self) {
        self.points += 1;
        log::debug!("skill point gained (total {})", self.points);
    }

    #[inline]
    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Affordable, not yet owned, and tier-gated within its branch
    pub fn can_unlock(&self, index: usize) -> bool {
        let Some(s) = self.skills.get(index) else {
            return false;
        };
        if s.unlocked || self.points < s.cost {
            return false;
        }
        // Starting nodes only gate on cost
        if s.tier == 0 {
            return true;
        }
        self.skills
            .iter()
            .any(|other| other.branch == s.branch && other.tier == s.tier - 1 && other.unlocked)
    }

    /// Purchase a skill; returns whether it happened
    pub fn unlock(&mut self, index: usize) -> bool {
        if !self.can_unlock(index) {
            return false;
        }
        let cost = self.skills[index].cost;
        self.skills[index].unlocked = true;
        self.points -= cost;
        log::info!("unlocked skill: {}", self.skills[index].name);
        true
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        self.skills.get(index).is_some_and(|s| s.unlocked)
    }

    /// Whether any owned skill grants this effect
    pub fn has(&self, kind: SkillKind) -> bool {
        self.skills.iter().any(|s| s.unlocked && s.kind == kind)
    }

    /// Index of the first skill granting `kind`
    pub fn index_of(&self, kind: SkillKind) -> Option<usize> {
        self.skills.iter().position(|s| s.kind == kind)
    }
}
