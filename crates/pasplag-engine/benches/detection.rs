use criterion::{Criterion, criterion_group, criterion_main};
use pasplag_core::config::{DetectOptions, EngineConfig};
use pasplag_engine::Engine;
use pasplag_lexer::{SourceFile, tokenize};
use std::hint::black_box;

/// Generate a synthetic Pascal program of roughly `procedures * 12` lines.
fn sample_program(procedures: usize) -> String {
    let mut text = String::from("program Bench;\nvar\n  total: integer;\n");
    for p in 0..procedures {
        text.push_str(&format!(
            "procedure Step{p}(var value: integer);\n\
             var\n  i: integer;\n\
             begin\n\
               for i := 1 to {p} + 10 do\n\
               begin\n\
                 value := value + i * {p};\n\
                 if value > 1000 then\n\
                   value := value - 1000;\n\
               end;\n\
             end;\n\n"
        ));
    }
    text.push_str("begin\n  total := 0;\n  writeln(total);\nend.\n");
    text
}

fn bench_tokenize(c: &mut Criterion) {
    let source = sample_program(30);
    c.bench_function("tokenize_30_procedures", |b| {
        b.iter(|| tokenize(black_box("bench.pas"), black_box(&source)))
    });
}

fn bench_detect_pair(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let left = SourceFile::new("left.pas", sample_program(30));
    let right = SourceFile::new("right.pas", sample_program(25));
    let opts = DetectOptions::default();

    c.bench_function("detect_pair", |b| {
        b.iter(|| engine.detect(black_box(&left), black_box(&right), black_box(&opts)))
    });
}

fn bench_detect_batch(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let files: Vec<SourceFile> = (0..12)
        .map(|i| SourceFile::new(format!("f{i}.pas"), sample_program(10 + i)))
        .collect();
    let opts = DetectOptions::default();

    c.bench_function("detect_batch_12_files", |b| {
        b.iter(|| engine.detect_batch(black_box(&files), black_box(&opts)))
    });
}

criterion_group!(benches, bench_tokenize, bench_detect_pair, bench_detect_batch);
criterion_main!(benches);
