use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_rag::graph::{fulltext_query, remove_lucene_chars};
use graph_rag::retrieval::assemble_context;

fn fulltext_query_benchmark(c: &mut Criterion) {
    let names = [
        "Julius Caesar",
        "Gaius Julius Caesar Octavianus Augustus",
        "Marcus (Aurelius) Antoninus!",
        "Rome",
    ];

    c.bench_function("fulltext_query_entity_names", |b| {
        b.iter(|| {
            for name in &names {
                black_box(fulltext_query(black_box(name)));
            }
        });
    });
}

fn lucene_cleaning_benchmark(c: &mut Criterion) {
    let noisy = "Senatus+Populusque~Romanus (SPQR) [anno] \"urbis\" conditae!".repeat(16);

    c.bench_function("remove_lucene_chars_noisy_text", |b| {
        b.iter(|| {
            black_box(remove_lucene_chars(black_box(&noisy)));
        });
    });
}

fn context_assembly_benchmark(c: &mut Criterion) {
    let structured = (0..50)
        .map(|i| format!("Entity{i} - RELATES_TO -> Entity{}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let passages: Vec<String> = (0..4)
        .map(|i| format!("Passage {i}: the empire endured. ").repeat(64))
        .collect();

    c.bench_function("assemble_context_full_load", |b| {
        b.iter(|| {
            black_box(assemble_context(
                black_box(&structured),
                black_box(&passages),
            ));
        });
    });
}

criterion_group!(
    query_terms,
    fulltext_query_benchmark,
    lucene_cleaning_benchmark,
    context_assembly_benchmark
);
criterion_main!(query_terms);
