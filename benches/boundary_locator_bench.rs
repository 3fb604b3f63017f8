use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sentence_follower::dom::parse_html;
use sentence_follower::highlight::{highlight_sentence, LineLayout, Point};
use sentence_follower::sentence_detector::{BoundaryRules, SentenceBoundaryLocator};

const SIMPLE_TEXT: &str = "This is a test sentence. Here is another one.";
const COMPLEX_TEXT: &str = "Dr. Smith said it twice.[3] Did he mean it?! (Nobody knew.) \
    これは文です。次の文です。 The   end\n   came  quickly.";

// WHY: paragraph-sized text is what a hovered container usually holds
fn paragraph(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Sentence number {i} talks about Mr. Jones and the weather."))
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundary_locator");
    let locator = SentenceBoundaryLocator::with_default_rules().unwrap();

    group.bench_function("compile_patterns", |b| {
        b.iter(|| SentenceBoundaryLocator::new(black_box(BoundaryRules::default())).unwrap())
    });

    group.bench_function("simple_text", |b| {
        b.iter(|| locator.locate(black_box(SIMPLE_TEXT), black_box(30)))
    });

    group.bench_function("complex_text", |b| {
        b.iter(|| locator.locate(black_box(COMPLEX_TEXT), black_box(50)))
    });

    let long = paragraph(200);
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_paragraph_uncached", |b| {
        b.iter(|| locator.locate(black_box(&long), black_box(long.len() / 2)))
    });

    let mut cached = SentenceBoundaryLocator::with_default_rules().unwrap();
    group.bench_function("long_paragraph_cached", |b| {
        b.iter(|| cached.find_sentence_boundaries(black_box(&long), black_box(long.len() / 2)))
    });
    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight_pass");
    let html = format!("<p>{}</p>", paragraph(50));
    let mut doc = parse_html(&html).unwrap();
    let mut locator = SentenceBoundaryLocator::with_default_rules().unwrap();
    let container = doc.find_element("p").unwrap();

    group.bench_function("highlight_in_paragraph", |b| {
        b.iter(|| highlight_sentence(&mut doc, &mut locator, container, black_box(700)))
    });

    let layout_doc = parse_html(&html).unwrap();
    group.bench_function("layout_caret_lookup", |b| {
        b.iter(|| LineLayout.element_from_point(&layout_doc, black_box(Point::new(300.0, 0.0))))
    });
    group.finish();
}

criterion_group!(benches, bench_locate, bench_highlight);
criterion_main!(benches);
