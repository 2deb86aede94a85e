use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::HistoryError;
use crate::models::{Draw, DrawHistory, GameConfig, HistoryOrder, SourceShape};
use crate::tokenizer::{
    digit_runs, parse_run, resolve_line_strategy, resolve_strategy, tokenize,
};

/// Ligne de tirage : identifiant de 4 à 6 chiffres suivi des numéros.
static DRAW_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,6}\s+[0-9]").expect("motif de ligne de tirage"));

/// Une ligne avec moins d'entiers (identifiant compris) n'est pas un tirage.
const MIN_LINE_TOKENS: usize = 5;

pub fn detect_shape(text: &str) -> SourceShape {
    if text.lines().any(|line| DRAW_LINE.is_match(line.trim())) {
        SourceShape::Lines
    } else {
        SourceShape::Blocks
    }
}

/// Reconstruit l'historique (du plus récent au plus ancien) à partir du texte brut.
///
/// Les unités mal formées (jetons, groupes, lignes) sont ignorées une à une.
/// Seule l'absence totale de tirage valide est une erreur.
pub fn reconstruct(text: &str, config: &GameConfig) -> Result<DrawHistory, HistoryError> {
    config
        .validate()
        .map_err(|e| HistoryError::InvalidConfig { reason: format!("{e:#}") })?;

    if digit_runs(text).next().is_none() {
        return Err(HistoryError::NoUsableHistory {
            reason: "aucun nombre dans le texte extrait".to_string(),
        });
    }

    let mut shape = detect_shape(text);
    let mut draws = match shape {
        SourceShape::Lines => draws_from_lines(text, config),
        SourceShape::Blocks => draws_from_blocks(text, config),
    };

    // Un en-tête du type "2024 12 ..." suffit à faire croire à des lignes
    if draws.is_empty() && shape == SourceShape::Lines {
        log::debug!("Aucun tirage en mode lignes, nouvel essai en mode blocs");
        shape = SourceShape::Blocks;
        draws = draws_from_blocks(text, config);
    }

    let draws = order_newest_first(dedupe_by_id(draws), config.order);
    if draws.is_empty() {
        return Err(HistoryError::NoUsableHistory {
            reason: format!(
                "aucun tirage d'au moins {} numéros valides ({}-{})",
                config.min_accept, config.min, config.max
            ),
        });
    }

    log::info!("{} tirages reconstruits (forme : {shape})", draws.len());
    Ok(DrawHistory::new(draws, shape))
}

/// Lit une ligne `<identifiant> <numéros...>`.
///
/// L'identifiant est lu d'un bloc, le reste est découpé selon la segmentation
/// (numéros collés compris). Les entiers hors plage (dates, heures) sont
/// écartés, les doublons aussi, et la lecture s'arrête à `draw_size` numéros.
pub fn parse_line(line: &str, config: &GameConfig) -> Option<Draw> {
    let line = line.trim();
    if !DRAW_LINE.is_match(line) {
        return None;
    }

    let id_end = line.find(|c: char| !c.is_ascii_digit())?;
    let (id, rest) = line.split_at(id_end);
    let strategy = resolve_line_strategy(rest, config);
    let tokens: Vec<u64> = tokenize(rest, strategy, config).collect();
    if tokens.len() + 1 < MIN_LINE_TOKENS {
        return None;
    }

    let draw_id = parse_run(id);
    let numbers = distinct_numbers(
        tokens.into_iter().filter(|&t| config.contains(t)),
        config.draw_size,
    );

    (numbers.len() >= config.min_accept).then(|| Draw {
        draw_id: Some(draw_id),
        numbers,
    })
}

fn draws_from_lines(text: &str, config: &GameConfig) -> Vec<Draw> {
    let mut draws = Vec::new();
    let mut rejected = 0usize;

    for line in text.lines().filter(|line| DRAW_LINE.is_match(line.trim())) {
        match parse_line(line, config) {
            Some(draw) => draws.push(draw),
            None => rejected += 1,
        }
    }

    if rejected > 0 {
        log::debug!(
            "{rejected} lignes de tirage rejetées (moins de {} numéros)",
            config.min_accept
        );
    }
    draws
}

fn draws_from_blocks(text: &str, config: &GameConfig) -> Vec<Draw> {
    let strategy = resolve_strategy(text, config);
    log::debug!("Découpage en blocs, stratégie {strategy:?}");

    let mut draws = Vec::new();
    let mut segment: Vec<u8> = Vec::with_capacity(config.draw_size);

    for token in tokenize(text, strategy, config) {
        if config.contains(token) {
            segment.push(token as u8);
        } else {
            close_segment(&mut segment, config, &mut draws);
        }
    }
    close_segment(&mut segment, config, &mut draws);

    draws
}

/// Coupe une suite ininterrompue de numéros en tirages de `draw_size`.
///
/// Le reste d'une suite plus longue qu'un tirage est retiré au début : ce sont
/// les enregistrements les plus anciens, les plus susceptibles d'être tronqués.
fn close_segment(segment: &mut Vec<u8>, config: &GameConfig, draws: &mut Vec<Draw>) {
    let size = config.draw_size;
    let skip = if segment.len() > size { segment.len() % size } else { 0 };
    if skip > 0 {
        log::debug!("{skip} numéros orphelins retirés en tête de bloc");
    }

    for group in segment[skip..].chunks(size) {
        let numbers = distinct_numbers(group.iter().map(|&n| n as u64), size);
        if numbers.len() >= config.min_accept {
            draws.push(Draw {
                draw_id: None,
                numbers,
            });
        }
    }

    segment.clear();
}

/// Numéros distincts dans l'ordre d'apparition, au plus `limit`.
fn distinct_numbers(tokens: impl Iterator<Item = u64>, limit: usize) -> Vec<u8> {
    let mut seen = HashSet::new();
    tokens
        .filter_map(|t| u8::try_from(t).ok())
        .filter(|&n| seen.insert(n))
        .take(limit)
        .collect()
}

/// Premier tirage rencontré gagnant ; les tirages sans identifiant ne sont jamais fusionnés.
fn dedupe_by_id(draws: Vec<Draw>) -> Vec<Draw> {
    let mut seen = HashSet::new();
    draws
        .into_iter()
        .filter(|draw| draw.draw_id.is_none_or(|id| seen.insert(id)))
        .collect()
}

fn order_newest_first(mut draws: Vec<Draw>, order: HistoryOrder) -> Vec<Draw> {
    match order {
        HistoryOrder::Auto if draws.iter().all(|d| d.draw_id.is_some()) => {
            draws.sort_by(|a, b| b.draw_id.cmp(&a.draw_id));
        }
        HistoryOrder::Auto | HistoryOrder::SourceNewestFirst => {}
        HistoryOrder::SourceOldestFirst => draws.reverse(),
    }
    draws
}
