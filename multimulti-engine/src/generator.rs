use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use multimulti_history::models::GameConfig;

use crate::constraints::{Constraints, ParityTarget, Violation};
use crate::sampler::weighted_pick;
use crate::stats::HistoryStats;
use crate::ticket::Ticket;
use crate::weights::{NumberWeights, WeightProfile};

const BASE_ATTEMPTS: usize = 250;
const MAX_AUTO_ATTEMPTS: usize = 3000;

const PARITY_PENALTY: f64 = 0.15;
const PAIR_PENALTY: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Numéros du groupe chaud uniquement
    Hot,
    /// Numéros du groupe froid uniquement
    Cold,
    /// Parts chaud / froid / libre
    #[default]
    Mixed,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Hot => write!(f, "chaud"),
            GenerationMode::Cold => write!(f, "froid"),
            GenerationMode::Mixed => write!(f, "mixte"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mode: GenerationMode,
    pub hot_size: usize,
    pub cold_size: usize,
    /// Part de la grille tirée du groupe chaud (mode mixte)
    pub hot_share: f64,
    /// Part tirée du groupe froid (mode mixte), le reste est libre
    pub cold_share: f64,
    pub constraints: Constraints,
    /// `None` : budget calculé selon le nombre de règles actives
    pub max_attempts: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Mixed,
            hot_size: 25,
            cold_size: 25,
            hot_share: 0.70,
            cold_share: 0.20,
            constraints: Constraints::default(),
            max_attempts: None,
        }
    }
}

impl GeneratorConfig {
    pub fn free_share(&self) -> f64 {
        (1.0 - self.hot_share - self.cold_share).max(0.0)
    }

    pub fn attempt_budget(&self) -> usize {
        self.max_attempts
            .unwrap_or_else(|| auto_budget(self.constraints.active_count()))
            .max(1)
    }

    pub fn validate(&self, game: &GameConfig) -> Result<()> {
        for (name, share) in [("chaude", self.hot_share), ("froide", self.cold_share)] {
            if !share.is_finite() || !(0.0..=1.0).contains(&share) {
                bail!("Part {name} {share} hors de [0, 1]");
            }
        }
        if self.hot_size == 0 || self.cold_size == 0 {
            bail!("Les groupes chaud et froid doivent contenir au moins un numéro");
        }
        if self.max_attempts == Some(0) {
            bail!("Le nombre d'essais doit être >= 1");
        }
        self.constraints.validate(game.pick_count)
    }
}

/// 250 essais pour 0 ou 1 règle, doublés par règle supplémentaire, plafonnés à 3000.
pub fn auto_budget(active_rules: usize) -> usize {
    if active_rules <= 1 {
        return BASE_ATTEMPTS;
    }
    let shift = (active_rules - 1).min(16) as u32;
    (BASE_ATTEMPTS << shift).min(MAX_AUTO_ATTEMPTS)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Accepted { attempts: usize },
    /// Budget épuisé : meilleure grille rencontrée et règles qu'elle viole
    Exhausted { attempts: usize, violations: Vec<Violation> },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            Outcome::Accepted { attempts } | Outcome::Exhausted { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTicket {
    pub ticket: Ticket,
    pub outcome: Outcome,
    pub score: f64,
}

struct Attempt {
    ticket: Ticket,
    violations: Vec<Violation>,
    score: f64,
}

/// Générateur de grilles sur des statistiques figées. Sans état entre deux appels.
pub struct Generator<'a> {
    game: &'a GameConfig,
    config: &'a GeneratorConfig,
    hot: Vec<u8>,
    cold: Vec<u8>,
    hot_weights: NumberWeights,
    cold_weights: NumberWeights,
    balanced_weights: NumberWeights,
    scoring_weights: NumberWeights,
}

impl<'a> Generator<'a> {
    pub fn new(stats: &HistoryStats, game: &'a GameConfig, config: &'a GeneratorConfig) -> Self {
        let (hot, cold) = stats.groups(config.hot_size, config.cold_size);
        Self {
            game,
            config,
            hot,
            cold,
            hot_weights: NumberWeights::new(stats, WeightProfile::HOT),
            cold_weights: NumberWeights::new(stats, WeightProfile::COLD),
            balanced_weights: NumberWeights::new(stats, WeightProfile::BALANCED),
            scoring_weights: NumberWeights::new(stats, WeightProfile::SCORING),
        }
    }

    pub fn hot_pool(&self) -> &[u8] {
        &self.hot
    }

    pub fn cold_pool(&self) -> &[u8] {
        &self.cold
    }

    /// (chaud, froid) pour le mode mixte, avec `chaud + froid <= K`.
    pub fn mixed_split(&self) -> (usize, usize) {
        let k = self.game.pick_count;
        let hot_k = ((k as f64 * self.config.hot_share).round() as usize).min(k);
        let cold_k = ((k as f64 * self.config.cold_share).round() as usize).min(k - hot_k);
        (hot_k, cold_k)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let k = self.game.pick_count;
        match self.config.mode {
            GenerationMode::Hot => weighted_pick(&self.hot, |n| self.hot_weights.get(n), k, rng),
            GenerationMode::Cold => weighted_pick(&self.cold, |n| self.cold_weights.get(n), k, rng),
            GenerationMode::Mixed => {
                let (hot_k, cold_k) = self.mixed_split();
                let mut chosen = weighted_pick(&self.hot, |n| self.hot_weights.get(n), hot_k, rng);

                let cold: Vec<u8> =
                    self.cold.iter().copied().filter(|n| !chosen.contains(n)).collect();
                chosen.extend(weighted_pick(&cold, |n| self.cold_weights.get(n), cold_k, rng));

                let free = k.saturating_sub(chosen.len());
                let rest: Vec<u8> = self.game.numbers().filter(|n| !chosen.contains(n)).collect();
                chosen.extend(weighted_pick(&rest, |n| self.balanced_weights.get(n), free, rng));

                if chosen.len() < k {
                    let fallback: Vec<u8> = self
                        .hot
                        .iter()
                        .copied()
                        .chain(self.game.numbers())
                        .filter(|n| !chosen.contains(n))
                        .collect();
                    let missing = k - chosen.len();
                    let weight = |n| self.balanced_weights.get(n);
                    chosen.extend(weighted_pick(&fallback, weight, missing, rng));
                }
                chosen
            }
        }
    }

    /// Exactement K numéros distincts dans la plage ; complète au hasard si besoin.
    fn normalize<R: Rng + ?Sized>(&self, mut numbers: Vec<u8>, rng: &mut R) -> Vec<u8> {
        let k = self.game.pick_count;
        numbers.retain(|&n| self.game.contains(n as u64));
        numbers.sort_unstable();
        numbers.dedup();
        numbers.truncate(k);

        if numbers.len() < k {
            let mut unused: Vec<u8> =
                self.game.numbers().filter(|n| !numbers.contains(n)).collect();
            unused.shuffle(rng);
            numbers.extend(unused.into_iter().take(k - numbers.len()));
            numbers.sort_unstable();
        }
        numbers
    }

    /// Désirabilité d'une grille : poids cumulés moins pénalités parité et paires.
    pub fn score(&self, ticket: &Ticket) -> f64 {
        let stats = ticket.stats();
        let parity_deviation = match self.config.constraints.parity {
            ParityTarget::Any => stats.even.abs_diff(stats.odd),
            ParityTarget::Exact { even, .. } => 2 * stats.even.abs_diff(even),
        };
        self.scoring_weights.sum(ticket.numbers())
            - PARITY_PENALTY * parity_deviation as f64
            - PAIR_PENALTY * stats.consecutive_pairs as f64
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Attempt {
        let numbers = self.sample(rng);
        let ticket = Ticket::new(self.normalize(numbers, rng), self.game);
        let violations = self.config.constraints.violations(&ticket);
        let score = self.score(&ticket);
        Attempt { ticket, violations, score }
    }

    /// Tire jusqu'à la première grille conforme, sinon rend la mieux notée.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedTicket {
        let budget = self.config.attempt_budget();

        let mut best = self.attempt(rng);
        if best.violations.is_empty() {
            return accepted(best, 1);
        }

        for attempt in 2..=budget {
            let candidate = self.attempt(rng);
            if candidate.violations.is_empty() {
                log::debug!("Grille acceptée après {attempt} essais");
                return accepted(candidate, attempt);
            }
            if candidate.score > best.score {
                best = candidate;
            }
        }

        log::debug!(
            "Budget de {budget} essais épuisé, meilleure grille : {} ({} règles violées)",
            best.ticket,
            best.violations.len()
        );
        GeneratedTicket {
            ticket: best.ticket,
            outcome: Outcome::Exhausted {
                attempts: budget,
                violations: best.violations,
            },
            score: best.score,
        }
    }

    /// `count` grilles en parallèle ; la grille `i` utilise la graine `seed + i`.
    ///
    /// `on_ticket` est appelé après chaque grille (barre de progression).
    pub fn generate_batch<F>(&self, count: usize, seed: u64, on_ticket: F) -> Vec<GeneratedTicket>
    where
        F: Fn() + Sync,
    {
        (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let ticket = self.generate(&mut rng);
                on_ticket();
                ticket
            })
            .collect()
    }
}

fn accepted(attempt: Attempt, attempts: usize) -> GeneratedTicket {
    GeneratedTicket {
        ticket: attempt.ticket,
        outcome: Outcome::Accepted { attempts },
        score: attempt.score,
    }
}
