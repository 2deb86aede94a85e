use serde::Serialize;

use multimulti_history::models::{Draw, DrawHistory, GameConfig};

/// Ancienneté de la dernière sortie d'un numéro.
///
/// `Never` est plus en retard que n'importe quel `Seen` : l'ordre dérivé suit
/// l'ordre des variantes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recency {
    /// Index du tirage le plus récent contenant le numéro (0 = dernier tirage)
    Seen(usize),
    Never,
}

impl Recency {
    pub fn index(self) -> Option<usize> {
        match self {
            Recency::Seen(i) => Some(i),
            Recency::Never => None,
        }
    }
}

impl std::fmt::Display for Recency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recency::Seen(i) => write!(f, "{i}"),
            Recency::Never => write!(f, "jamais"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    min: u8,
    counts: Vec<u32>,
}

impl FrequencyTable {
    /// 0 pour un numéro jamais sorti (ou hors plage).
    pub fn get(&self, n: u8) -> u32 {
        n.checked_sub(self.min)
            .and_then(|i| self.counts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.min + i as u8, c))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecencyTable {
    min: u8,
    last_seen: Vec<Recency>,
}

impl RecencyTable {
    pub fn get(&self, n: u8) -> Recency {
        n.checked_sub(self.min)
            .and_then(|i| self.last_seen.get(i as usize))
            .copied()
            .unwrap_or(Recency::Never)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Recency)> + '_ {
        self.last_seen
            .iter()
            .enumerate()
            .map(|(i, &r)| (self.min + i as u8, r))
    }

    /// Plus grand index observé (les numéros jamais sortis sont ignorés).
    pub fn max_seen(&self) -> Option<usize> {
        self.last_seen.iter().filter_map(|r| r.index()).max()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub recency: Recency,
}

/// Fréquences et retards sur tout l'historique, en lecture seule une fois calculés.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub frequency: FrequencyTable,
    pub recency: RecencyTable,
    pub draw_count: usize,
}

impl HistoryStats {
    pub fn compute(history: &DrawHistory, config: &GameConfig) -> Self {
        Self::from_draws(history.draws(), config)
    }

    /// draws[0] = tirage le plus récent.
    pub fn from_draws(draws: &[Draw], config: &GameConfig) -> Self {
        let size = config.range_size();
        let mut counts = vec![0u32; size];
        let mut last_seen = vec![Recency::Never; size];

        for (i, draw) in draws.iter().enumerate() {
            for &n in &draw.numbers {
                if !config.contains(n as u64) {
                    continue;
                }
                let idx = config.index(n);
                counts[idx] += 1;
                if last_seen[idx] == Recency::Never {
                    last_seen[idx] = Recency::Seen(i);
                }
            }
        }

        Self {
            frequency: FrequencyTable {
                min: config.min,
                counts,
            },
            recency: RecencyTable {
                min: config.min,
                last_seen,
            },
            draw_count: draws.len(),
        }
    }

    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.frequency.iter().map(|(n, _)| n)
    }

    pub fn number_stats(&self) -> Vec<NumberStats> {
        self.numbers().map(|n| self.row(n)).collect()
    }

    fn row(&self, n: u8) -> NumberStats {
        NumberStats {
            number: n,
            frequency: self.frequency.get(n),
            recency: self.recency.get(n),
        }
    }

    /// Numéros par (fréquence, numéro) décroissants.
    fn by_frequency_desc(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.numbers().collect();
        numbers.sort_by(|&a, &b| {
            (self.frequency.get(b), b).cmp(&(self.frequency.get(a), a))
        });
        numbers
    }

    /// Numéros par (fréquence, numéro) croissants.
    fn by_frequency_asc(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.numbers().collect();
        numbers.sort_by_key(|&n| (self.frequency.get(n), n));
        numbers
    }

    pub fn most_frequent(&self, count: usize) -> Vec<NumberStats> {
        self.by_frequency_desc().into_iter().take(count).map(|n| self.row(n)).collect()
    }

    pub fn least_frequent(&self, count: usize) -> Vec<NumberStats> {
        self.by_frequency_asc().into_iter().take(count).map(|n| self.row(n)).collect()
    }

    /// Les plus en retard d'abord (jamais sortis en tête), à égalité par numéro croissant.
    pub fn most_overdue(&self, count: usize) -> Vec<NumberStats> {
        let mut rows = self.number_stats();
        rows.sort_by(|a, b| b.recency.cmp(&a.recency));
        rows.truncate(count);
        rows
    }

    /// Groupes « chaud » (plus fréquents) et « froid » (moins fréquents).
    ///
    /// Les tailles sont ramenées entre 1 et la taille de la plage.
    pub fn groups(&self, hot_size: usize, cold_size: usize) -> (Vec<u8>, Vec<u8>) {
        let size = self.frequency.len();
        let mut hot = self.by_frequency_desc();
        hot.truncate(hot_size.clamp(1, size));
        let mut cold = self.by_frequency_asc();
        cold.truncate(cold_size.clamp(1, size));
        (hot, cold)
    }
}
