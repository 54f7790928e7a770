//! Benchmarks for the conversion pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mpq_minify::codec::{decode_list, encode_frames};
use mpq_minify::parser::parse_directives;
use mpq_minify::pipeline::spell_icons::{
    extract_spell_icons, separate_layers, BACKGROUND_FRAME, TRANSPARENT_COLOR,
};
use mpq_minify::CommandTable;

const DIRECTIVES: &str = "\
# Towners
cl22clx --combine --width 96 towners/animals/cow1.cl2 towners/animals/cow2.cl2 towners/animals/cow3.cl2
cl22clx --width 96 towners/smith/smithn.cl2
cel2clx --width 37 data/spelli2.cel
cel2clx --width 56 ctrlpan/spelicon.cel
pcx2clx --num-sprites 3 --transparent-color 1 --export-palette ui_art/title.pcx
";

/// A spell icon sheet with noisy background and a few foreground pixels.
fn icon_sheet(width: usize, height: usize, frames: usize) -> Vec<u8> {
    let frame_size = width * height;
    (0..frames * frame_size)
        .map(|i| {
            let p = i % frame_size;
            if p % 97 == 13 {
                40
            } else {
                (192 + (i * 31 % 7)) as u8
            }
        })
        .collect()
}

// -- Parsing benchmarks --

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let large: String = (0..500)
        .map(|i| format!("cl22clx --width 96,128 monsters/m{i}/m{i}a.cl2 monsters/m{i}/m{i}h.cl2\n"))
        .collect();

    group.bench_function("parse_directives_small", |b| {
        b.iter(|| parse_directives(black_box(DIRECTIVES).lines()).unwrap())
    });

    group.bench_function("build_table_large", |b| {
        b.iter(|| {
            let directives = parse_directives(black_box(large.as_str()).lines()).unwrap();
            CommandTable::from_directives(directives).unwrap()
        })
    });

    group.finish();
}

// -- Extraction benchmarks --

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    let frames = 52;
    let small = icon_sheet(37, 38, frames);
    let large = icon_sheet(56, 56, frames);

    group.bench_function("separate_layers_37x38", |b| {
        b.iter(|| separate_layers(black_box(small.clone()), 37, 38, frames, BACKGROUND_FRAME).unwrap())
    });

    group.bench_function("separate_layers_56x56", |b| {
        b.iter(|| separate_layers(black_box(large.clone()), 56, 56, frames, BACKGROUND_FRAME).unwrap())
    });

    let clx = encode_frames(&large, 56, 56, 56, frames, Some(TRANSPARENT_COLOR)).unwrap();
    group.bench_function("decode_list_56x56", |b| {
        b.iter(|| decode_list(black_box(&clx), TRANSPARENT_COLOR).unwrap())
    });

    group.bench_function("extract_spell_icons_56x56", |b| {
        b.iter(|| extract_spell_icons(black_box(&clx)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_extraction);
criterion_main!(benches);
