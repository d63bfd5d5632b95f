//! Benchmarks for CSS parsing and the cascade.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use giraffe_browser::css::{CssParser, default_stylesheet, style_tree};
use giraffe_browser::html::HtmlParser;

const TAGS: &[&str] = &["p", "div", "span", "b", "i", "li"];

/// A stylesheet with `n` rules mixing tag and descendant selectors.
fn generate_css(n: usize) -> String {
    let mut css = String::with_capacity(n * 64);
    for i in 0..n {
        let tag = TAGS[i % TAGS.len()];
        if i % 2 == 0 {
            css.push_str(&format!("{tag} {{ color: c{i}; font-size: {}px; }}\n", 10 + i % 20));
        } else {
            let outer = TAGS[(i / 2) % TAGS.len()];
            css.push_str(&format!("body {outer} {tag} {{ background-color: c{i}; }}\n"));
        }
    }
    css
}

fn generate_html(n: usize) -> String {
    let mut html = String::from("<html><head></head><body>\n");
    for i in 0..n {
        html.push_str(&format!(
            "<div><p style=\"font-size: 120%\">Element {i} <b>x</b> <i>y</i></p></div>\n"
        ));
    }
    html.push_str("</body></html>");
    html
}

fn bench_stylesheet_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("css_parse");

    for n_rules in [50, 100, 500] {
        let css = generate_css(n_rules);
        group.bench_with_input(BenchmarkId::from_parameter(n_rules), &css, |b, css| {
            b.iter(|| CssParser::new(css).parse());
        });
    }

    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("css_cascade");

    for (n_rules, n_elements) in [(50, 200), (100, 500), (100, 1000)] {
        let mut rules = default_stylesheet();
        rules.extend(CssParser::new(&generate_css(n_rules)).parse().unwrap_or_default());
        let doc = HtmlParser::new(&generate_html(n_elements)).parse();
        let label = format!("{n_rules}r_{n_elements}e");

        group.bench_with_input(
            BenchmarkId::new("style_tree", &label),
            &(doc, rules),
            |b, (doc, rules)| {
                b.iter(|| {
                    let mut doc = doc.clone();
                    style_tree(&mut doc, rules);
                    doc
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_stylesheet_parse, bench_cascade);
criterion_main!(benches);
