use serde::Serialize;

use multimulti_history::models::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub sum: u32,
    pub even: usize,
    pub odd: usize,
    /// Numéros `<=` milieu de plage
    pub low: usize,
    pub high: usize,
    pub consecutive_pairs: usize,
    pub longest_run: usize,
}

/// Grille générée : numéros uniques triés, statistiques figées à la création.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    numbers: Vec<u8>,
    stats: TicketStats,
}

impl Ticket {
    pub fn new(mut numbers: Vec<u8>, config: &GameConfig) -> Self {
        numbers.sort_unstable();
        numbers.dedup();

        let (even, odd) = even_odd_split(&numbers);
        let midpoint = config.midpoint();
        let low = numbers.iter().filter(|&&n| n <= midpoint).count();

        let stats = TicketStats {
            sum: numbers.iter().map(|&n| n as u32).sum(),
            even,
            odd,
            low,
            high: numbers.len() - low,
            consecutive_pairs: consecutive_pairs(&numbers),
            longest_run: longest_run(&numbers),
        };

        Self { numbers, stats }
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn stats(&self) -> &TicketStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| format!("{n:02}")).collect();
        write!(f, "{}", parts.join(" "))
    }
}

pub fn even_odd_split(numbers: &[u8]) -> (usize, usize) {
    let even = numbers.iter().filter(|&&n| n % 2 == 0).count();
    (even, numbers.len() - even)
}

/// Paires de numéros consécutifs : [2, 3, 4, 10] en compte 2.
pub fn consecutive_pairs(sorted: &[u8]) -> usize {
    sorted.windows(2).filter(|w| w[1] - w[0] == 1).count()
}

pub fn longest_run(sorted: &[u8]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    let mut longest = 1;
    let mut run = 1;
    for w in sorted.windows(2) {
        if w[1] - w[0] == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

/// Vrai s'il existe une suite de numéros consécutifs de longueur `>= run_len`.
pub fn has_run_length(sorted: &[u8], run_len: usize) -> bool {
    if run_len <= 1 {
        return true;
    }
    let mut run = 1;
    for w in sorted.windows(2) {
        if w[1] - w[0] == 1 {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_is_sorted_and_unique() {
        let ticket = Ticket::new(vec![40, 2, 17, 2, 80], &GameConfig::default());
        assert_eq!(ticket.numbers(), &[2, 17, 40, 80]);
        assert_eq!(ticket.to_string(), "02 17 40 80");
    }

    #[test]
    fn test_ticket_stats() {
        let ticket = Ticket::new(vec![4, 5, 6, 10, 41, 42, 60, 71, 77, 80], &GameConfig::default());
        let stats = ticket.stats();
        assert_eq!(stats.sum, 396);
        assert_eq!((stats.even, stats.odd), (6, 4));
        assert_eq!((stats.low, stats.high), (4, 6));
        assert_eq!(stats.consecutive_pairs, 3);
        assert_eq!(stats.longest_run, 3);
    }

    #[test]
    fn test_consecutive_pairs() {
        assert_eq!(consecutive_pairs(&[2, 3, 4, 10]), 2);
        assert_eq!(consecutive_pairs(&[1, 3, 5]), 0);
        assert_eq!(consecutive_pairs(&[]), 0);
    }

    #[test]
    fn test_has_run_length() {
        assert!(has_run_length(&[4, 5, 6, 20], 3));
        assert!(!has_run_length(&[4, 5, 7, 8], 3));
        assert!(has_run_length(&[4, 5, 7, 8], 2));
        assert!(!has_run_length(&[1, 3, 5], 2));
        assert!(has_run_length(&[1, 3, 5], 1));
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run(&[1, 2, 3, 7, 8]), 3);
        assert_eq!(longest_run(&[9]), 1);
        assert_eq!(longest_run(&[]), 0);
    }
}
