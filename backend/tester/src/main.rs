use std::{
    fs,
    time::{Duration, Instant},
};

use anyhow::Result;
use chrono::DateTime;
use clap::Parser;
use query::{Loan, LoanQuery, SortKey, lenient::snapshot, run};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const FRAME_BUDGET: Duration = Duration::from_millis(16);

// 2025-01-01T00:00:00Z
const START_MILLIS: i64 = 1_735_689_600_000;

const MATERIALS: [&str; 8] = [
    "Notebook",
    "Câmera",
    "Rádio HT",
    "Pilhas AA",
    "Colete",
    "Lanterna tática",
    "Binóculo",
    "Cabo HDMI",
];

const PEOPLE: [&str; 6] = [
    "Ana Lúcia",
    "Bruno Souza",
    "Érica Lima",
    "joão Pedro",
    "Ângela Reis",
    "Caio Araújo",
];

const STATUSES: [&str; 4] = ["pendente", "cautelado", "descautelado", "cancelado"];

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(default_value_t = 5000)]
    count: usize,

    #[arg(long, default_value = "../cautelas.json")]
    out: String,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn pick(rng: &mut StdRng, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

fn synthetic_loans(count: usize, seed: u64) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let material = format!("{} {}", pick(&mut rng, &MATERIALS), i % 97);
            let tipo = if material.starts_with("Pilhas") {
                "consumivel"
            } else {
                "permanente"
            };

            // minutes apart, with collisions so stability is exercised
            let millis = START_MILLIS + rng.random_range(0..50_000i64) * 60_000;
            let data_criacao = match i % 10 {
                0 => Value::Null,
                1 => json!(millis),
                _ => DateTime::from_timestamp_millis(millis)
                    .map(|at| json!(at.to_rfc3339()))
                    .unwrap_or(Value::Null),
            };

            json!({
                "id": i + 1,
                "uuid": format!("cautela-{:06}", i + 1),
                "material": material,
                "tipo_material": tipo,
                "quantidade": rng.random_range(0..5u32),
                "responsavel_nome": pick(&mut rng, &PEOPLE),
                "status": pick(&mut rng, &STATUSES),
                "data_criacao": data_criacao,
            })
        })
        .collect()
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let raw = Value::Array(synthetic_loans(args.count, args.seed));
    fs::write(&args.out, serde_json::to_vec_pretty(&raw)?)?;
    info!("Wrote {} loans to {}", args.count, args.out);

    let loans: Vec<Loan> = snapshot(raw);

    for sort in SortKey::ALL {
        let query = LoanQuery::default().with_search("camera").with_sort(sort);

        let started = Instant::now();
        let shown = run(&loans, &query).len();
        let elapsed = started.elapsed();

        println!("{:<12} {shown:>6} shown  {elapsed:?}", sort.as_str());

        if elapsed > FRAME_BUDGET {
            warn!("{sort} took {elapsed:?} over {} loans", loans.len());
        }
    }

    Ok(())
}
