use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::ticket::{Ticket, has_run_length};

/// Répartition pairs/impairs exigée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParityTarget {
    #[default]
    Any,
    Exact { even: usize, odd: usize },
}

impl FromStr for ParityTarget {
    type Err = anyhow::Error;

    /// `"any"` ou `"pairs/impairs"`, ex. `"6/4"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") || s.eq_ignore_ascii_case("dowolnie") {
            return Ok(ParityTarget::Any);
        }
        let (even, odd) = s
            .split_once('/')
            .with_context(|| format!("Répartition pairs/impairs invalide : '{s}' (ex: 5/5)"))?;
        let even = even
            .trim()
            .parse()
            .with_context(|| format!("Nombre de pairs invalide : '{even}'"))?;
        let odd = odd
            .trim()
            .parse()
            .with_context(|| format!("Nombre d'impairs invalide : '{odd}'"))?;
        Ok(ParityTarget::Exact { even, odd })
    }
}

impl std::fmt::Display for ParityTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParityTarget::Any => write!(f, "any"),
            ParityTarget::Exact { even, odd } => write!(f, "{even}/{odd}"),
        }
    }
}

/// Règle non respectée par une grille.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    Sum { sum: u32, min: u32, max: u32 },
    Parity { even: usize, odd: usize },
    LowHigh { low: usize, min: usize, max: usize },
    Run { threshold: usize },
    Pairs { pairs: usize, max: usize },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Sum { sum, min, max } => write!(f, "somme {sum} hors [{min}, {max}]"),
            Violation::Parity { even, odd } => write!(f, "pairs/impairs {even}/{odd}"),
            Violation::LowHigh { low, min, max } => write!(f, "{low} bas hors [{min}, {max}]"),
            Violation::Run { threshold } => write!(f, "suite d'au moins {threshold} consécutifs"),
            Violation::Pairs { pairs, max } => write!(f, "{pairs} paires > {max}"),
        }
    }
}

/// Règles structurelles d'une grille. Un champ à `None` (ou `Any`) est inactif.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Somme des numéros, bornes incluses
    pub sum: Option<(u32, u32)>,
    pub parity: ParityTarget,
    /// Nombre de numéros bas (`<=` milieu de plage), bornes incluses
    pub low: Option<(usize, usize)>,
    /// Interdit toute suite de consécutifs de cette longueur ou plus
    pub forbidden_run: Option<usize>,
    /// Nombre maximal de paires de consécutifs
    pub max_pairs: Option<usize>,
}

impl Constraints {
    pub fn active_count(&self) -> usize {
        [
            self.sum.is_some(),
            self.parity != ParityTarget::Any,
            self.low.is_some(),
            self.forbidden_run.is_some(),
            self.max_pairs.is_some(),
        ]
        .into_iter()
        .filter(|&active| active)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn violations(&self, ticket: &Ticket) -> Vec<Violation> {
        let stats = ticket.stats();
        let mut violations = Vec::new();

        if let Some((min, max)) = self.sum {
            if !(min..=max).contains(&stats.sum) {
                violations.push(Violation::Sum { sum: stats.sum, min, max });
            }
        }

        if let ParityTarget::Exact { even, odd } = self.parity {
            if stats.even != even || stats.odd != odd {
                violations.push(Violation::Parity {
                    even: stats.even,
                    odd: stats.odd,
                });
            }
        }

        if let Some((min, max)) = self.low {
            if !(min..=max).contains(&stats.low) {
                violations.push(Violation::LowHigh { low: stats.low, min, max });
            }
        }

        if let Some(threshold) = self.forbidden_run {
            if has_run_length(ticket.numbers(), threshold) {
                violations.push(Violation::Run { threshold });
            }
        }

        if let Some(max) = self.max_pairs {
            if stats.consecutive_pairs > max {
                violations.push(Violation::Pairs {
                    pairs: stats.consecutive_pairs,
                    max,
                });
            }
        }

        violations
    }

    pub fn accepts(&self, ticket: &Ticket) -> bool {
        self.violations(ticket).is_empty()
    }

    /// Vérifie la cohérence des règles. Des règles cohérentes mais impossibles
    /// à satisfaire ensemble ne sont pas une erreur.
    pub fn validate(&self, pick_count: usize) -> Result<()> {
        if let Some((min, max)) = self.sum {
            if min > max {
                bail!("Plage de somme invalide : {min} > {max}");
            }
        }
        if let ParityTarget::Exact { even, odd } = self.parity {
            if even + odd != pick_count {
                bail!("Répartition {even}/{odd} invalide pour {pick_count} numéros par grille");
            }
        }
        if let Some((min, max)) = self.low {
            if min > max {
                bail!("Plage de numéros bas invalide : {min} > {max}");
            }
        }
        Ok(())
    }
}
