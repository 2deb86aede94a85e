use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Un tirage historique : identifiant facultatif + numéros distincts, dans l'ordre du document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub draw_id: Option<u64>,
    pub numbers: Vec<u8>,
}

impl Draw {
    pub fn contains(&self, n: u8) -> bool {
        self.numbers.contains(&n)
    }
}

/// Forme du document source, déduite du texte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// Une ligne par tirage : `<identifiant> <numéros...>`
    Lines,
    /// Flux continu de numéros, découpé en blocs de `draw_size`
    Blocks,
}

impl std::fmt::Display for SourceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceShape::Lines => write!(f, "lignes"),
            SourceShape::Blocks => write!(f, "blocs"),
        }
    }
}

/// Hypothèse d'ordre chronologique du document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Identifiant décroissant si tous les tirages en ont un, sinon ordre du document
    #[default]
    Auto,
    SourceNewestFirst,
    SourceOldestFirst,
}

/// Stratégie de découpage des suites de chiffres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    #[default]
    Auto,
    WholeToken,
    GreedySplit,
}

/// Paramètres du jeu : plage des numéros, taille de grille, taille des tirages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub min: u8,
    pub max: u8,
    /// K : nombre de numéros par grille générée
    pub pick_count: usize,
    /// Nombre de numéros attendus par tirage historique
    pub draw_size: usize,
    /// En dessous de ce nombre de numéros valides, un tirage est rejeté
    pub min_accept: usize,
    pub order: HistoryOrder,
    pub segmentation: Segmentation,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min: 1,
            max: 80,
            pick_count: 10,
            draw_size: 20,
            min_accept: 10,
            order: HistoryOrder::Auto,
            segmentation: Segmentation::Auto,
        }
    }
}

impl GameConfig {
    pub fn contains(&self, n: u64) -> bool {
        n >= self.min as u64 && n <= self.max as u64
    }

    pub fn range_size(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    pub fn numbers(&self) -> std::ops::RangeInclusive<u8> {
        self.min..=self.max
    }

    /// Milieu de la plage : les numéros `<= midpoint` sont « bas ».
    pub fn midpoint(&self) -> u8 {
        ((self.min as u16 + self.max as u16) / 2) as u8
    }

    /// Nombre de chiffres de `max` (2 pour 80).
    pub fn max_digits(&self) -> usize {
        self.max.to_string().len()
    }

    pub fn index(&self, n: u8) -> usize {
        (n - self.min) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.min == 0 {
            bail!("Le numéro minimum doit être >= 1");
        }
        if self.min > self.max {
            bail!("Plage invalide : {} > {}", self.min, self.max);
        }
        if self.pick_count == 0 || self.pick_count > self.range_size() {
            bail!(
                "Taille de grille {} hors limites (1-{})",
                self.pick_count,
                self.range_size()
            );
        }
        if self.draw_size == 0 || self.draw_size > self.range_size() {
            bail!(
                "Taille de tirage {} hors limites (1-{})",
                self.draw_size,
                self.range_size()
            );
        }
        if self.min_accept == 0 || self.min_accept > self.draw_size {
            bail!(
                "Seuil d'acceptation {} hors limites (1-{})",
                self.min_accept,
                self.draw_size
            );
        }
        Ok(())
    }
}

/// Historique reconstruit, du plus récent au plus ancien. Jamais vide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawHistory {
    draws: Vec<Draw>,
    shape: SourceShape,
}

impl DrawHistory {
    pub(crate) fn new(draws: Vec<Draw>, shape: SourceShape) -> Self {
        debug_assert!(!draws.is_empty());
        Self { draws, shape }
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn shape(&self) -> SourceShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn newest(&self) -> &Draw {
        &self.draws[0]
    }

    pub fn oldest(&self) -> &Draw {
        &self.draws[self.draws.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_multi_multi() {
        let config = GameConfig::default();
        assert_eq!(config.range_size(), 80);
        assert_eq!(config.midpoint(), 40);
        assert_eq!(config.max_digits(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let config = GameConfig { min: 10, max: 5, ..GameConfig::default() };
        assert!(config.validate().is_err());

        let config = GameConfig { min: 0, ..GameConfig::default() };
        assert!(config.validate().is_err());

        let config = GameConfig { pick_count: 81, ..GameConfig::default() };
        assert!(config.validate().is_err());

        let config = GameConfig { min_accept: 21, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_contains_bounds() {
        let config = GameConfig::default();
        assert!(config.contains(1));
        assert!(config.contains(80));
        assert!(!config.contains(0));
        assert!(!config.contains(81));
        assert!(!config.contains(16616));
    }

    #[test]
    fn test_config_json_defaults_missing_fields() {
        let config: GameConfig = serde_json::from_str(r#"{"max": 49, "pick_count": 6}"#).unwrap();
        assert_eq!(config.max, 49);
        assert_eq!(config.pick_count, 6);
        assert_eq!(config.draw_size, 20);
        assert_eq!(config.order, HistoryOrder::Auto);
    }
}
