use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mtg_commander::build::{DeckBuilder, DECK_SIZE};
use mtg_commander::card::{Card, CardDatabase};
use mtg_commander::config::DeckConfig;
use mtg_commander::simulation::simulate;
use mtg_commander::tags::classify;

fn sample_deck() -> Vec<Card> {
    (0..DECK_SIZE)
        .map(|i| {
            let mut card = Card::basic_land("Forest");
            if i >= 37 {
                card.name = format!("Spell {}", i);
                card.type_line = "Sorcery".to_string();
            }
            card
        })
        .collect()
}

fn benchmark_simulation(c: &mut Criterion) {
    let deck = sample_deck();

    c.bench_function("simulate_20000_trials", |b| {
        b.iter(|| simulate(black_box(&deck), black_box(20_000), black_box(12345)))
    });
}

fn benchmark_build(c: &mut Criterion) {
    let db = CardDatabase::from_file("cards.json").expect("Failed to load cards");

    c.bench_function("build_atraxa", |b| {
        b.iter(|| {
            DeckBuilder::new(&db, DeckConfig::default())
                .build(black_box("Atraxa, Praetors' Voice"))
                .expect("commander exists")
        })
    });
}

fn benchmark_classify(c: &mut Criterion) {
    let text = "Whenever you draw a card, you gain 1 life.\n{2}, {T}: Draw a card. Each player draws a card.";

    c.bench_function("classify_oracle_text", |b| {
        b.iter(|| classify(black_box(text), black_box("Artifact"), black_box("Bench Engine")))
    });
}

criterion_group!(benches, benchmark_simulation, benchmark_build, benchmark_classify);
criterion_main!(benches);
