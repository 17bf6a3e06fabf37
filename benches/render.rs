//! Criterion benchmarks for commentbox rendering.
//!
//! The library exposes the glyph resolver and renderer directly, so these
//! measure them in-process rather than through the binary.

use commentbox::{
    BorderGlyphs, BoxSpec, CornerPosition, LineEnding, LineStyle, LineThickness, SideSpec, corner,
    render,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn spec(content: String) -> BoxSpec {
    BoxSpec {
        line_ending: LineEnding::Lf,
        ..BoxSpec::new(content)
    }
}

/// Resolve every corner for every style/thickness pairing
fn bench_corner_resolution(c: &mut Criterion) {
    let styles = [
        LineStyle::Solid,
        LineStyle::DoubleDash,
        LineStyle::TripleDash,
        LineStyle::QuadrupleDash,
        LineStyle::DoubleLine,
    ];
    let sides: Vec<SideSpec> = styles
        .iter()
        .flat_map(|&style| {
            [LineThickness::Light, LineThickness::Heavy]
                .into_iter()
                .map(move |thickness| SideSpec::new(style, thickness))
        })
        .collect();

    c.bench_function("corner_resolution", |b| {
        b.iter(|| {
            for &h in &sides {
                for &v in &sides {
                    for position in CornerPosition::ALL {
                        let _ = black_box(corner(position, black_box(h), black_box(v)));
                    }
                }
            }
        })
    });
}

/// Resolve the eight glyphs of a mixed-style box
fn bench_border_glyphs(c: &mut Criterion) {
    let spec = BoxSpec {
        top: SideSpec::double(),
        bottom: SideSpec::new(LineStyle::TripleDash, LineThickness::Heavy),
        left: SideSpec::light(),
        ..spec(String::new())
    };

    c.bench_function("border_glyphs", |b| {
        b.iter(|| BorderGlyphs::resolve(black_box(&spec)))
    });
}

/// Render a one-line banner at the default width
fn bench_render_banner(c: &mut Criterion) {
    let spec = spec("Section: Configuration".to_string());

    c.bench_function("render_banner", |b| b.iter(|| render(black_box(&spec))));
}

/// Render a 100-line block, left-aligned
fn bench_render_100_lines(c: &mut Criterion) {
    let content = (0..100)
        .map(|i| format!("    line {:03}: {}", i, "x".repeat(i % 60)))
        .collect::<Vec<_>>()
        .join("\n");
    let spec = BoxSpec {
        is_centered: false,
        ..spec(content)
    };

    c.bench_function("render_100_lines", |b| b.iter(|| render(black_box(&spec))));
}

/// Render CJK content, where byte and code point counts diverge
fn bench_render_cjk(c: &mut Criterion) {
    let content = (0..50)
        .map(|_| "配置文件 設定ファイル 구성 파일")
        .collect::<Vec<_>>()
        .join("\n");
    let spec = spec(content);

    c.bench_function("render_cjk", |b| b.iter(|| render(black_box(&spec))));
}

criterion_group!(
    benches,
    bench_corner_resolution,
    bench_border_glyphs,
    bench_render_banner,
    bench_render_100_lines,
    bench_render_cjk
);
criterion_main!(benches);
