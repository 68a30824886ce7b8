use core_text::{Buffer, CellSurface, FontSpec, LineBreaker, TableSurface, TextBuffer, TextMeasurer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;

fn paragraph(words: usize) -> String {
    (0..words)
        .map(|i| match i % 4 {
            0 => "lorem",
            1 => "ipsum",
            2 => "dolor",
            _ => "sit",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_wrap(c: &mut Criterion) {
    let text = paragraph(400);

    let mono = TextMeasurer::new(Rc::new(CellSurface), FontSpec::new("mono", 14.0)).unwrap();
    let mono = LineBreaker::new(mono, 640.0);
    c.bench_function("line_break_monospace_400_words", |b| {
        b.iter(|| black_box(mono.get_line_break(black_box(&text))))
    });

    let table = TableSurface::new(7.5).with('i', 3.0).with('m', 11.0);
    let prop = TextMeasurer::new(Rc::new(table), FontSpec::new("serif", 14.0)).unwrap();
    let prop = LineBreaker::new(prop, 640.0);
    c.bench_function("line_break_proportional_400_words", |b| {
        b.iter(|| black_box(prop.get_line_break(black_box(&text))))
    });

    let doc: String = (0..2_000).map(|_| paragraph(40) + "\n").collect();
    c.bench_function("buffer_rewrap_2000_lines", |b| {
        b.iter(|| {
            let buffer = TextBuffer::with_wrapping("bench", &doc, mono.clone());
            black_box(buffer.screen_len())
        })
    });
}

criterion_group!(benches, bench_wrap);
criterion_main!(benches);
