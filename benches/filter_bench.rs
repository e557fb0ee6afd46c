//! Benchmarks for prompt filtering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fflt::core::FuzzyMatcher;
use fflt::prompt::{Choice, Entry, SelectConfig, SelectPrompt};

/// Branch-like names: `feature/<area>-<n>`, `fix/<area>-<n>`, ...
fn generate_branches(n: usize) -> Vec<String> {
    let kinds = ["feature", "fix", "chore", "release"];
    let areas = ["login", "checkout", "search", "billing", "profile"];
    (0..n)
        .map(|i| format!("{}/{}-{}", kinds[i % kinds.len()], areas[i % areas.len()], i))
        .collect()
}

fn bench_fuzzy_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("FuzzyMatcher::find");

    for size in [100, 1_000, 10_000] {
        let branches = generate_branches(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &branches, |b, branches| {
            let mut matcher = FuzzyMatcher::new();
            b.iter(|| {
                matcher.find(
                    black_box("fe chk"),
                    branches.iter().enumerate().map(|(i, s)| (i, s.as_str())),
                )
            });
        });
    }

    group.finish();
}

fn bench_select_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("SelectPrompt typing");

    for size in [100, 1_000] {
        let choices: Vec<Entry<String>> = generate_branches(size)
            .into_iter()
            .map(|b| Choice::new(b).into())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &choices, |b, choices| {
            b.iter(|| {
                let mut prompt =
                    SelectPrompt::new(SelectConfig::new("Branch", choices.clone())).unwrap();
                for c in "billing".chars() {
                    prompt.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
                    black_box(prompt.render());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fuzzy_find, bench_select_typing);
criterion_main!(benches);
