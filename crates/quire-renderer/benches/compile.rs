//! Benchmarks for document compilation.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quire_parser::parse_markdown;
use quire_renderer::{TocRange, compile, render_html};

/// Generate markdown with repeated section headings and code blocks.
fn generate_markdown(sections: usize) -> String {
    let mut md = String::from("# Document Title\n\n");
    for i in 0..sections {
        md.push_str(&format!("## Section {}\n\n", i % 7));
        md.push_str("Paragraph with **bold**, *italic* and `code`.\n\n");
        md.push_str("```python\nfor i in range(n):\n    dp[i] = dp[i - 1] + 1\n```\n\n");
        md.push_str("- first\n- second\n\n");
    }
    md
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for sections in [10, 100, 500] {
        let ast = parse_markdown(&generate_markdown(sections));
        group.throughput(Throughput::Elements(sections as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &ast, |b, ast| {
            b.iter(|| compile(ast, TocRange::default()));
        });
    }
    group.finish();
}

fn bench_render_html(c: &mut Criterion) {
    let doc = compile(&parse_markdown(&generate_markdown(100)), TocRange::default());
    c.bench_function("render_html_100_sections", |b| {
        b.iter(|| render_html(&doc.nodes));
    });
}

criterion_group!(benches, bench_compile, bench_render_html);
criterion_main!(benches);
