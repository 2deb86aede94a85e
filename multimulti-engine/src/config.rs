use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use multimulti_history::models::GameConfig;

use crate::generator::GeneratorConfig;

/// Configuration complète : paramètres du jeu et du générateur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub generator: GeneratorConfig,
}

impl Settings {
    /// Les champs absents du JSON prennent leur valeur par défaut.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.game.validate().context("Paramètres du jeu invalides")?;
        self.generator
            .validate(&self.game)
            .context("Paramètres du générateur invalides")?;
        Ok(())
    }
}
