use crate::models::{GameConfig, Segmentation};

/// Stratégie effective de découpage, une fois la forme du texte connue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Chaque suite de chiffres est un seul entier
    WholeToken,
    /// Les suites trop longues sont des numéros collés : "3839" -> 38, 39
    GreedySplit,
}

/// Suites maximales de chiffres ASCII, dans l'ordre du texte.
pub fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}

/// Une suite trop longue pour `u64` ne peut être qu'un artefact : elle devient `u64::MAX`.
pub fn parse_run(run: &str) -> u64 {
    run.parse().unwrap_or(u64::MAX)
}

/// Choisit la stratégie : `Auto` passe en découpage glouton quand la majorité
/// des suites de chiffres sont plus larges que `max`.
pub fn resolve_strategy(text: &str, config: &GameConfig) -> Strategy {
    match config.segmentation {
        Segmentation::WholeToken => Strategy::WholeToken,
        Segmentation::GreedySplit => Strategy::GreedySplit,
        Segmentation::Auto => {
            let width = config.max_digits();
            let (total, glued) = digit_runs(text).fold((0usize, 0usize), |(total, glued), run| {
                (total + 1, glued + usize::from(run.len() > width))
            });
            if total > 0 && glued * 2 > total {
                Strategy::GreedySplit
            } else {
                Strategy::WholeToken
            }
        }
    }
}

/// Stratégie pour la partie d'une ligne qui suit l'identifiant : en `Auto`,
/// découpage glouton quand la première suite est plus large que `max`.
pub fn resolve_line_strategy(rest: &str, config: &GameConfig) -> Strategy {
    match config.segmentation {
        Segmentation::WholeToken => Strategy::WholeToken,
        Segmentation::GreedySplit => Strategy::GreedySplit,
        Segmentation::Auto => {
            let width = config.max_digits();
            if digit_runs(rest).next().is_some_and(|run| run.len() > width) {
                Strategy::GreedySplit
            } else {
                Strategy::WholeToken
            }
        }
    }
}

/// Vrai pour une suite faite de numéros collés : plus large que `max` et de
/// longueur multiple de sa largeur. Un identifiant comme "16615" n'en est pas une.
pub fn is_glued(run: &str, width: usize) -> bool {
    run.len() > width && run.len() % width == 0
}

/// Découpe gloutonne d'une suite de chiffres : on retire le plus long préfixe
/// (au plus `max_digits` chiffres) dont la valeur est dans la plage, sinon on
/// abandonne le premier caractère. Chaque tour raccourcit la suite.
pub fn greedy_split(run: &str, config: &GameConfig) -> Vec<u64> {
    let width = config.max_digits();
    let mut rest = run;
    let mut values = Vec::with_capacity(run.len() / width + 1);

    while !rest.is_empty() {
        let peeled = (1..=width.min(rest.len())).rev().find_map(|w| {
            let value = parse_run(&rest[..w]);
            config.contains(value).then_some((w, value))
        });
        match peeled {
            Some((w, value)) => {
                values.push(value);
                rest = &rest[w..];
            }
            None => rest = &rest[1..],
        }
    }

    values
}

/// Flux d'entiers extrait du texte selon la stratégie.
///
/// En mode glouton, seules les suites collées sont découpées : une suite pas
/// plus large que `max` (un `0` ou un `99` isolé) ou de longueur non multiple
/// (un identifiant "16615") reste lue d'un bloc et sert de séparateur.
pub fn tokenize<'a>(
    text: &'a str,
    strategy: Strategy,
    config: &'a GameConfig,
) -> impl Iterator<Item = u64> + 'a {
    let width = config.max_digits();
    digit_runs(text).flat_map(move |run| match strategy {
        Strategy::GreedySplit if is_glued(run, width) => greedy_split(run, config),
        _ => vec![parse_run(run)],
    })
}
