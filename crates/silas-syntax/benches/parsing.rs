use criterion::{Criterion, criterion_group, criterion_main};
use silas_syntax::lexer::tokenize;
use silas_syntax::parse;
use silas_syntax::tree::{LinkResolution, ResolvedLink};
use silas_syntax::tree::render::{RenderContext, render_nodes};
use silas_syntax::RenderError;

/// Section titles double as ids, so every generated section is numbered.
fn generate_org_content(sections: usize) -> String {
    let mut content = String::from("#+TITLE: Benchmark\n#+PUBLISHED: <2024-01-01>\n\n");
    for n in 0..sections {
        content.push_str(&format!(
            "* Section {n}\n\
             Some *bold* and /italic/ text with a [[https://example.com/{n}][link]].\n\
             A second line with an unclosed *asterisk.\n\n\
             ** Details {n}\n\
             - first item\n  continued\n  1. nested\n  2. nested again\n- second item\n\n\
             #+BEGIN_QUOTE\nQuoted text.\n--- Someone\n#+END_QUOTE\n\n\
             #+BEGIN_SRC\nlet value = {n};\n#+END_SRC\n\n"
        ));
    }
    content
}

struct Unresolved;

impl RenderContext for Unresolved {
    fn resolve_link(&self, target: &str) -> Result<LinkResolution, RenderError> {
        Ok(ResolvedLink::External(target.to_string()).into())
    }
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = generate_org_content(100);

    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let tokens = tokenize(std::hint::black_box(&content)).unwrap();
            std::hint::black_box(tokens);
        });
    });

    group.bench_function("parse", |b| {
        b.iter(|| {
            let parsed = parse(std::hint::black_box(&content)).unwrap();
            std::hint::black_box(parsed);
        });
    });

    let parsed = parse(&content).unwrap();
    group.bench_function("render", |b| {
        b.iter(|| {
            let html = render_nodes(std::hint::black_box(&parsed.nodes), &Unresolved).unwrap();
            std::hint::black_box(html);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parsing);
criterion_main!(benches);
