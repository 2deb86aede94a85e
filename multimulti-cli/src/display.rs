use std::path::Path;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use multimulti_engine::generator::{GeneratedTicket, GenerationMode, Outcome};
use multimulti_engine::stats::{NumberStats, Recency};
use multimulti_history::models::{Draw, DrawHistory};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_history_summary(history: &DrawHistory, file: &Path) {
    println!("\nHistorique : {}", file.display());
    println!("  Tirages reconstruits : {}", history.len());
    println!("  Format détecté       : {}", history.shape());
    if let Some(id) = history.newest().draw_id {
        println!("  Dernier tirage       : {id}");
    }
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["#", "Tirage", "Numéros"]);
    for (i, draw) in draws.iter().enumerate() {
        let mut sorted = draw.numbers.clone();
        sorted.sort_unstable();
        let id = draw.draw_id.map_or_else(|| "—".to_string(), |id| id.to_string());
        table.add_row(vec![(i + 1).to_string(), id, join_numbers(&sorted)]);
    }
    println!("{table}");
}

pub fn display_number_stats(rows: &[NumberStats], draw_count: usize) {
    println!("\n📊 Statistiques sur {draw_count} tirages (retard 0 = dernier tirage)\n");

    let mut table = new_table(vec!["Numéro", "Fréquence", "Retard"]);
    for row in rows {
        let recency = match row.recency {
            Recency::Never => Cell::new(row.recency.to_string()).fg(Color::Red),
            Recency::Seen(_) => Cell::new(row.recency.to_string()),
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", row.number)),
            Cell::new(row.frequency.to_string()),
            recency,
        ]);
    }
    println!("{table}");
}

pub fn display_ranked(title: &str, rows: &[NumberStats]) {
    println!("\n── {title} ──");
    let numbers: Vec<String> = rows
        .iter()
        .map(|r| format!("{:2} ({}x, retard {})", r.number, r.frequency, r.recency))
        .collect();
    println!("{}", numbers.join(", "));
}

pub fn display_groups(hot: &[u8], cold: &[u8]) {
    let mut sorted_hot = hot.to_vec();
    sorted_hot.sort_unstable();
    let mut sorted_cold = cold.to_vec();
    sorted_cold.sort_unstable();

    let mut table = new_table(vec!["Groupe", "Taille", "Numéros"]);
    table.add_row(vec![
        Cell::new("Chaud").fg(Color::Green),
        Cell::new(hot.len().to_string()),
        Cell::new(join_numbers(&sorted_hot)),
    ]);
    table.add_row(vec![
        Cell::new("Froid").fg(Color::Blue),
        Cell::new(cold.len().to_string()),
        Cell::new(join_numbers(&sorted_cold)),
    ]);
    println!("\n{table}");
}

pub fn display_tickets(tickets: &[GeneratedTicket], mode: GenerationMode, seed: u64) {
    println!("\n🎲 Grilles générées (mode {mode}, seed {seed})\n");

    let mut table = new_table(vec![
        "#", "Numéros", "Somme", "Pairs/Impairs", "Bas/Haut", "Paires", "Statut", "Score",
    ]);

    for (i, generated) in tickets.iter().enumerate() {
        let stats = generated.ticket.stats();
        let status = match &generated.outcome {
            Outcome::Accepted { attempts } => {
                Cell::new(format!("OK ({attempts} essais)")).fg(Color::Green)
            }
            Outcome::Exhausted { attempts, violations } => {
                let reasons = violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ; ");
                Cell::new(format!("Épuisé ({attempts} essais) : {reasons}")).fg(Color::Red)
            }
        };

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(join_numbers(generated.ticket.numbers())),
            Cell::new(stats.sum),
            Cell::new(format!("{}/{}", stats.even, stats.odd)),
            Cell::new(format!("{}/{}", stats.low, stats.high)),
            Cell::new(stats.consecutive_pairs),
            status,
            Cell::new(format!("{:.3}", generated.score)),
        ]);
    }
    println!("{table}");
}
