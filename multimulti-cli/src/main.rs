mod display;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use multimulti_engine::config::Settings;
use multimulti_engine::constraints::ParityTarget;
use multimulti_engine::generator::{GenerationMode, Generator};
use multimulti_engine::stats::HistoryStats;
use multimulti_history::cache::HistoryCache;
use multimulti_history::models::DrawHistory;

use crate::display::{
    display_draws, display_groups, display_history_summary, display_number_stats, display_ranked,
    display_tickets,
};

/// En dessous, pas de barre de progression.
const PROGRESS_THRESHOLD: usize = 50;

#[derive(Parser)]
#[command(
    name = "multimulti",
    about = "Générateur de grilles Multi Multi à partir de l'historique des tirages"
)]
struct Cli {
    /// Fichier des résultats (PDF ou texte)
    #[arg(short, long, global = true, default_value = "wyniki.pdf")]
    file: PathBuf,

    /// Configuration JSON (jeu + générateur)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les tirages reconstruits, du plus récent au plus ancien
    Draws {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher fréquences, retards et groupes chaud/froid
    Stats {
        /// Taille des listes (plus fréquents, moins fréquents, en retard)
        #[arg(short, long, default_value = "15")]
        top: usize,

        /// Taille du groupe chaud
        #[arg(long)]
        hot_size: Option<usize>,

        /// Taille du groupe froid
        #[arg(long)]
        cold_size: Option<usize>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Générer des grilles
    Generate {
        /// Mode de génération
        #[arg(short, long)]
        mode: Option<GenerationMode>,

        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Somme autorisée, ex: 320-490
        #[arg(long, value_parser = parse_range::<u32>)]
        sum: Option<(u32, u32)>,

        /// Répartition pairs/impairs, ex: 5/5 (ou "any")
        #[arg(long)]
        parity: Option<ParityTarget>,

        /// Nombre de numéros bas autorisé, ex: 4-6
        #[arg(long, value_parser = parse_range::<usize>)]
        low: Option<(usize, usize)>,

        /// Interdire les suites d'au moins N numéros consécutifs
        #[arg(long)]
        forbidden_run: Option<usize>,

        /// Nombre maximal de paires consécutives
        #[arg(long)]
        max_pairs: Option<usize>,

        /// Nombre maximal d'essais par grille
        #[arg(long)]
        attempts: Option<usize>,

        /// Part chaude (mode mixte)
        #[arg(long)]
        hot_share: Option<f64>,

        /// Part froide (mode mixte)
        #[arg(long)]
        cold_share: Option<f64>,

        /// Taille du groupe chaud
        #[arg(long)]
        hot_size: Option<usize>,

        /// Taille du groupe froid
        #[arg(long)]
        cold_size: Option<usize>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Écrire la configuration courante (ou par défaut) en JSON
    Config {
        /// Fichier de sortie
        #[arg(short, long, default_value = "multimulti.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let cache = HistoryCache::new();

    match cli.command {
        Command::Draws { last } => cmd_draws(&cache, &cli.file, &settings, last),
        Command::Stats {
            top,
            hot_size,
            cold_size,
            json,
        } => {
            if let Some(size) = hot_size {
                settings.generator.hot_size = size;
            }
            if let Some(size) = cold_size {
                settings.generator.cold_size = size;
            }
            cmd_stats(&cache, &cli.file, &settings, top, json)
        }
        Command::Generate {
            mode,
            count,
            seed,
            sum,
            parity,
            low,
            forbidden_run,
            max_pairs,
            attempts,
            hot_share,
            cold_share,
            hot_size,
            cold_size,
            json,
        } => {
            let generator = &mut settings.generator;
            if let Some(mode) = mode {
                generator.mode = mode;
            }
            if let Some(share) = hot_share {
                generator.hot_share = share;
            }
            if let Some(share) = cold_share {
                generator.cold_share = share;
            }
            if let Some(size) = hot_size {
                generator.hot_size = size;
            }
            if let Some(size) = cold_size {
                generator.cold_size = size;
            }
            if attempts.is_some() {
                generator.max_attempts = attempts;
            }

            let constraints = &mut generator.constraints;
            if sum.is_some() {
                constraints.sum = sum;
            }
            if let Some(parity) = parity {
                constraints.parity = parity;
            }
            if low.is_some() {
                constraints.low = low;
            }
            if forbidden_run.is_some() {
                constraints.forbidden_run = forbidden_run;
            }
            if max_pairs.is_some() {
                constraints.max_pairs = max_pairs;
            }

            cmd_generate(&cache, &cli.file, &settings, count, seed, json)
        }
        Command::Config { output } => cmd_config(&settings, &output),
    }
}

/// Historique partagé via le cache du processus.
fn load_history(
    cache: &HistoryCache,
    file: &Path,
    settings: &Settings,
) -> Result<Arc<DrawHistory>> {
    settings.validate()?;
    cache
        .load(file, &settings.game)
        .with_context(|| format!("Chargement de l'historique depuis {}", file.display()))
}

fn cmd_draws(cache: &HistoryCache, file: &Path, settings: &Settings, last: usize) -> Result<()> {
    let history = load_history(cache, file, settings)?;
    display_history_summary(&history, file);
    let shown = last.min(history.len());
    display_draws(&history.draws()[..shown]);
    Ok(())
}

fn cmd_stats(
    cache: &HistoryCache,
    file: &Path,
    settings: &Settings,
    top: usize,
    json: bool,
) -> Result<()> {
    let history = load_history(cache, file, settings)?;
    let stats = HistoryStats::compute(&history, &settings.game);
    let (hot, cold) = stats.groups(settings.generator.hot_size, settings.generator.cold_size);

    if json {
        let report = serde_json::json!({
            "draw_count": stats.draw_count,
            "numbers": stats.number_stats(),
            "most_frequent": stats.most_frequent(top),
            "least_frequent": stats.least_frequent(top),
            "most_overdue": stats.most_overdue(top),
            "hot": hot,
            "cold": cold,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    display_history_summary(&history, file);
    display_number_stats(&stats.number_stats(), stats.draw_count);
    display_ranked("Les plus fréquents", &stats.most_frequent(top));
    display_ranked("Les moins fréquents", &stats.least_frequent(top));
    display_ranked("Les plus en retard", &stats.most_overdue(top));
    display_groups(&hot, &cold);
    Ok(())
}

fn cmd_generate(
    cache: &HistoryCache,
    file: &Path,
    settings: &Settings,
    count: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    if count == 0 {
        bail!("Le nombre de grilles doit être >= 1");
    }

    let history = load_history(cache, file, settings)?;
    let stats = HistoryStats::compute(&history, &settings.game);
    let generator = Generator::new(&stats, &settings.game, &settings.generator);
    let seed = seed.unwrap_or_else(rand::random);

    log::info!(
        "Génération de {count} grilles (mode {}, seed {seed}, budget {} essais)",
        settings.generator.mode,
        settings.generator.attempt_budget()
    );

    let pb = if count >= PROGRESS_THRESHOLD && !json {
        let pb = ProgressBar::new(count as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("=> "),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let tickets = generator.generate_batch(count, seed, || pb.inc(1));
    pb.finish_and_clear();

    let exhausted = tickets.iter().filter(|t| !t.outcome.is_accepted()).count();
    if exhausted > 0 {
        log::warn!("{exhausted}/{count} grilles ne respectent pas toutes les règles");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tickets)?);
        return Ok(());
    }

    display_tickets(&tickets, settings.generator.mode, seed);
    Ok(())
}

fn cmd_config(settings: &Settings, output: &Path) -> Result<()> {
    settings.validate()?;
    settings.save(output)?;
    println!("Configuration écrite dans {}", output.display());
    Ok(())
}

/// `"a-b"` (ou `"a:b"`) en bornes inclusives, `"a"` seul pour `a-a`.
fn parse_range<T>(s: &str) -> Result<(T, T)>
where
    T: FromStr + PartialOrd + Copy,
    T::Err: Display,
{
    let parse = |part: &str| -> Result<T> {
        part.trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Borne invalide '{}' : {e}", part.trim()))
    };

    let (min, max) = match s.split_once(['-', ':']) {
        Some((min, max)) => (parse(min)?, parse(max)?),
        None => {
            let value = parse(s)?;
            (value, value)
        }
    };
    if min > max {
        bail!("Plage inversée : {s}");
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range::<u32>("320-490").unwrap(), (320, 490));
        assert_eq!(parse_range::<u32>(" 320 : 490 ").unwrap(), (320, 490));
        assert_eq!(parse_range::<usize>("5").unwrap(), (5, 5));
        assert!(parse_range::<u32>("490-320").is_err());
        assert!(parse_range::<u32>("abc-10").is_err());
    }

    #[test]
    fn test_cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "multimulti", "generate", "--mode", "cold", "--sum", "320-490", "--parity", "5/5",
            "--forbidden-run", "3", "-c", "2", "--file", "wyniki.txt",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("wyniki.txt"));
        match cli.command {
            Command::Generate {
                mode,
                sum,
                parity,
                forbidden_run,
                count,
                ..
            } => {
                assert_eq!(mode, Some(GenerationMode::Cold));
                assert_eq!(sum, Some((320, 490)));
                assert_eq!(parity, Some(ParityTarget::Exact { even: 5, odd: 5 }));
                assert_eq!(forbidden_run, Some(3));
                assert_eq!(count, 2);
            }
            _ => panic!("sous-commande inattendue"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_parity() {
        assert!(Cli::try_parse_from(["multimulti", "generate", "--parity", "cinq"]).is_err());
    }
}
