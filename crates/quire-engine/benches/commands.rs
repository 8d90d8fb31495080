use criterion::{Criterion, criterion_group, criterion_main};
use quire_engine::editing::{Command, Editor, EditorOptions, Mark, RawRange};
mod common;

fn bench_command_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("commands");
    group.sample_size(10);

    let content = common::generate_document_markup(100);

    group.bench_function("insert_text", |b| {
        let mut e = Editor::new(&content, EditorOptions::default());
        e.select(RawRange::caret(50));
        b.iter(|| {
            let patch = e.execute(Command::InsertText(std::hint::black_box("test".to_string())));
            std::hint::black_box(patch).ok();
        });
    });

    group.bench_function("toggle_bold_range", |b| {
        let mut e = Editor::new(&content, EditorOptions::default());
        e.select(RawRange::text(100, 2000));
        b.iter(|| {
            let patch = e.execute(Command::ToggleMark(Mark::Bold));
            std::hint::black_box(patch).ok();
        });
    });

    group.bench_function("undo_redo", |b| {
        let mut e = Editor::new(&content, EditorOptions::default());
        e.execute(Command::InsertText("x".into())).ok();
        b.iter(|| {
            std::hint::black_box(e.undo());
            std::hint::black_box(e.redo());
        });
    });

    group.bench_function("format_state", |b| {
        let mut e = Editor::new(&content, EditorOptions::default());
        e.select(RawRange::text(10, 5000));
        b.iter(|| std::hint::black_box(e.format_state()));
    });

    group.finish();
}

criterion_group!(benches, bench_command_operations);
criterion_main!(benches);
