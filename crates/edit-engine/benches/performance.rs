use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use edit_engine::{DocumentSession, Rope, Selection};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (edit-engine benchmark line)\n"
        ));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn bench_large_file_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("large_file_open/50k_lines", |b| {
        b.iter(|| {
            let session = DocumentSession::new(black_box(&text));
            black_box(session.line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || DocumentSession::new(&text),
            |mut session| {
                let mut offset = session.len() / 2;
                for _ in 0..100 {
                    session
                        .insert_at(offset, "x", Selection::caret(offset + 1))
                        .unwrap();
                    offset += 1;
                }
                session.flush().unwrap();
                black_box(session.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_rope_random_edits(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("rope/1000_scattered_edits", |b| {
        b.iter_batched(
            || Rope::from_text(&text),
            |mut rope| {
                let len = rope.len();
                for i in 0..1000 {
                    let pos = (i * 7919) % len;
                    rope.insert(pos, "ab\n").unwrap();
                    rope.delete(pos, pos + 2).unwrap();
                }
                black_box(rope.line_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_line_lookup(c: &mut Criterion) {
    let rope = Rope::from_text(&large_text(50_000));
    c.bench_function("rope/1000_line_lookups", |b| {
        b.iter(|| {
            for line in (0..50_000).step_by(50) {
                let start = rope.line_start_offset(line).unwrap();
                black_box(rope.line_at_offset(start).unwrap());
            }
        })
    });
}

criterion_group!(
    benches,
    bench_large_file_open,
    bench_typing_in_middle,
    bench_rope_random_edits,
    bench_line_lookup
);
criterion_main!(benches);
