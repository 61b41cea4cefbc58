//! Static upgrade tables: every known upgrade, the window listing it, and the
//! templates used to recognise and switch windows.

use crate::game_automation::match_image::Template;
use std::fmt;

/// Which of the three upgrade panels is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeWindow {
    None,
    Attack,
    Defense,
    Utility,
}

impl UpgradeWindow {
    /// Windows in the order they are detected and refreshed.
    pub const TRACKED: [UpgradeWindow; 3] = [
        UpgradeWindow::Attack,
        UpgradeWindow::Defense,
        UpgradeWindow::Utility,
    ];

    /// Header shown while this window is open.
    pub const fn indicator(self) -> Option<Template> {
        match self {
            UpgradeWindow::None => None,
            UpgradeWindow::Attack => Some(Template::AttackUpgrade),
            UpgradeWindow::Defense => Some(Template::DefenseUpgrade),
            UpgradeWindow::Utility => Some(Template::UtilityUpgrade),
        }
    }

    /// Button that opens this window.
    pub const fn toggle(self) -> Option<Template> {
        match self {
            UpgradeWindow::None => None,
            UpgradeWindow::Attack => Some(Template::AttackOn),
            UpgradeWindow::Defense => Some(Template::DefenseOff),
            UpgradeWindow::Utility => Some(Template::EcoOff),
        }
    }
}

impl fmt::Display for UpgradeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Upgrade {
    // Attack
    Damage,
    AttackSpeed,
    CriticalChance,
    CriticalFactor,
    Range,
    DamageMeter,
    MultishotChance,
    MultishotTargets,
    RapidFireChance,
    RapidFireDuration,
    BounceShotChance,
    BounceShotTargets,
    BounceShotRange,
    // Defense
    Health,
    HealthRegen,
    Defense,
    DefenseAbsolute,
    ThornDamage,
    Lifesteal,
    KnockbackChance,
    KnockbackForce,
    OrbSpeed,
    Orbs,
    ShockwaveSize,
    ShockwaveFrequency,
    // Utility
    CashBonus,
    CashWave,
    CoinsKillBonus,
    CoinsWave,
    FreeAttackUpgrade,
    FreeDefenseUpgrade,
    FreeUtilityUpgrade,
    InterestWave,
}

impl Upgrade {
    pub const ALL: [Upgrade; 33] = [
        Upgrade::Damage,
        Upgrade::AttackSpeed,
        Upgrade::CriticalChance,
        Upgrade::CriticalFactor,
        Upgrade::Range,
        Upgrade::DamageMeter,
        Upgrade::MultishotChance,
        Upgrade::MultishotTargets,
        Upgrade::RapidFireChance,
        Upgrade::RapidFireDuration,
        Upgrade::BounceShotChance,
        Upgrade::BounceShotTargets,
        Upgrade::BounceShotRange,
        Upgrade::Health,
        Upgrade::HealthRegen,
        Upgrade::Defense,
        Upgrade::DefenseAbsolute,
        Upgrade::ThornDamage,
        Upgrade::Lifesteal,
        Upgrade::KnockbackChance,
        Upgrade::KnockbackForce,
        Upgrade::OrbSpeed,
        Upgrade::Orbs,
        Upgrade::ShockwaveSize,
        Upgrade::ShockwaveFrequency,
        Upgrade::CashBonus,
        Upgrade::CashWave,
        Upgrade::CoinsKillBonus,
        Upgrade::CoinsWave,
        Upgrade::FreeAttackUpgrade,
        Upgrade::FreeDefenseUpgrade,
        Upgrade::FreeUtilityUpgrade,
        Upgrade::InterestWave,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Upgrade::Damage => "Damage",
            Upgrade::AttackSpeed => "AttackSpeed",
            Upgrade::CriticalChance => "CriticalChance",
            Upgrade::CriticalFactor => "CriticalFactor",
            Upgrade::Range => "Range",
            Upgrade::DamageMeter => "DamageMeter",
            Upgrade::MultishotChance => "MultishotChance",
            Upgrade::MultishotTargets => "MultishotTargets",
            Upgrade::RapidFireChance => "RapidFireChance",
            Upgrade::RapidFireDuration => "RapidFireDuration",
            Upgrade::BounceShotChance => "BounceShotChance",
            Upgrade::BounceShotTargets => "BounceShotTargets",
            Upgrade::BounceShotRange => "BounceShotRange",
            Upgrade::Health => "Health",
            Upgrade::HealthRegen => "HealthRegen",
            Upgrade::Defense => "Defense",
            Upgrade::DefenseAbsolute => "DefenseAbsolute",
            Upgrade::ThornDamage => "ThornDamage",
            Upgrade::Lifesteal => "Lifesteal",
            Upgrade::KnockbackChance => "KnockbackChance",
            Upgrade::KnockbackForce => "KnockbackForce",
            Upgrade::OrbSpeed => "OrbSpeed",
            Upgrade::Orbs => "Orbs",
            Upgrade::ShockwaveSize => "ShockwaveSize",
            Upgrade::ShockwaveFrequency => "ShockwaveFrequency",
            Upgrade::CashBonus => "CashBonus",
            Upgrade::CashWave => "CashWave",
            Upgrade::CoinsKillBonus => "CoinsKillBonus",
            Upgrade::CoinsWave => "CoinsWave",
            Upgrade::FreeAttackUpgrade => "FreeAttackUpgrade",
            Upgrade::FreeDefenseUpgrade => "FreeDefenseUpgrade",
            Upgrade::FreeUtilityUpgrade => "FreeUtilityUpgrade",
            Upgrade::InterestWave => "InterestWave",
        }
    }

    pub const fn window(self) -> UpgradeWindow {
        use Upgrade::*;
        match self {
            Damage | AttackSpeed | CriticalChance | CriticalFactor | Range | DamageMeter
            | MultishotChance | MultishotTargets | RapidFireChance | RapidFireDuration
            | BounceShotChance | BounceShotTargets | BounceShotRange => UpgradeWindow::Attack,
            Health | HealthRegen | Defense | DefenseAbsolute | ThornDamage | Lifesteal
            | KnockbackChance | KnockbackForce | OrbSpeed | Orbs | ShockwaveSize
            | ShockwaveFrequency => UpgradeWindow::Defense,
            CashBonus | CashWave | CoinsKillBonus | CoinsWave | FreeAttackUpgrade
            | FreeDefenseUpgrade | FreeUtilityUpgrade | InterestWave => UpgradeWindow::Utility,
        }
    }

    /// Map an OCR'd panel label to a catalog entry.
    ///
    /// Line breaks, slashes, percent signs and spaces are dropped before a
    /// case-insensitive comparison, so "Attack\nSpeed" and "Coins / Kill Bonus" both resolve.
    pub fn from_panel_name(raw: &str) -> Option<Upgrade> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '/' | '%') && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        Upgrade::ALL
            .into_iter()
            .find(|u| u.name().eq_ignore_ascii_case(&cleaned))
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Latest reading for one upgrade. When `is_max` is set the amount and cost are -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeOption {
    pub amount: f64,
    pub cost: f64,
    pub is_max: bool,
}

impl UpgradeOption {
    pub const MAXED: UpgradeOption = UpgradeOption {
        amount: -1.0,
        cost: -1.0,
        is_max: true,
    };

    pub fn new(amount: f64, cost: f64) -> Self {
        Self {
            amount,
            cost,
            is_max: false,
        }
    }
}
