use crate::stats::{HistoryStats, Recency};

/// Plancher ajouté aux deux composantes pour qu'aucun numéro ne soit exclu.
const BASELINE: f64 = 0.20;

/// Pondération fréquence / retard : `w = frequency·(0.2 + f) + overdue·(0.2 + o)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightProfile {
    pub frequency: f64,
    pub overdue: f64,
}

impl WeightProfile {
    /// Surtout la fréquence, un peu de retard pour varier
    pub const HOT: Self = Self { frequency: 0.80, overdue: 0.20 };
    /// Surtout le retard
    pub const COLD: Self = Self { frequency: 0.30, overdue: 0.70 };
    pub const BALANCED: Self = Self { frequency: 0.55, overdue: 0.45 };
    /// Désirabilité d'une grille, pour départager les essais rejetés
    pub const SCORING: Self = Self { frequency: 0.60, overdue: 0.40 };

    pub fn weight(&self, frequency: f64, overdue: f64) -> f64 {
        self.frequency * (BASELINE + frequency) + self.overdue * (BASELINE + overdue)
    }
}

/// Poids précalculés pour chaque numéro de la plage.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberWeights {
    min: u8,
    values: Vec<f64>,
}

impl NumberWeights {
    pub fn new(stats: &HistoryStats, profile: WeightProfile) -> Self {
        let max_freq = stats.frequency.max().max(1) as f64;
        let max_seen = stats.recency.max_seen().unwrap_or(0).max(1) as f64;

        let mut min = u8::MAX;
        let values = stats
            .frequency
            .iter()
            .map(|(n, count)| {
                min = min.min(n);
                let f = count as f64 / max_freq;
                let o = match stats.recency.get(n) {
                    Recency::Never => 1.0,
                    Recency::Seen(i) => (i as f64 / max_seen).min(1.0),
                };
                profile.weight(f, o)
            })
            .collect();

        Self { min, values }
    }

    /// 1.0 pour un numéro hors plage.
    pub fn get(&self, n: u8) -> f64 {
        n.checked_sub(self.min)
            .and_then(|i| self.values.get(i as usize))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn sum(&self, numbers: &[u8]) -> f64 {
        numbers.iter().map(|&n| self.get(n)).sum()
    }
}
