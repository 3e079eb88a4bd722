use criterion::*;
use kson::{parse, ParseOptions};

fn parse_document(source: &str) {
    let outcome = parse(source, ParseOptions::default());
    if outcome.messages.has_errors() {
        panic!("error parsing document: {:?}", outcome.messages.iter().collect::<Vec<_>>());
    }
}

fn bench_lex_and_parse(c: &mut Criterion) {
    let source = unindent::unindent(
        r#"
        # a config-ish document, nested a few levels deep
        name: 'example service'
        version: 3
        tags: [ 'a', 'b', 'c', 'd', 'e' ]
        limits: {
          max_connections: 128
          timeout_seconds: 30.5
          retry: {
            attempts: 3
            backoff: [ 1, 2, 4, 8 ]
          }
        }
        endpoints: [
          { path: '/health', method: 'GET' }
          { path: '/users', method: 'POST' }
          { path: '/users/:id', method: 'DELETE' }
        ]
        "#,
    );

    c.bench_function("lex_and_parse", move |b| b.iter(|| parse_document(&source)));
}

criterion_group!(benches, bench_lex_and_parse);
criterion_main!(benches);
