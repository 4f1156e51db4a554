//! Benchmarks for the Measure and Emit passes

use core::convert::Infallible;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use embedded_io::{ErrorType, Write};
use greenpost_core::{
    alert::refresh_alerts, traits::NoopLiveness, ClientConfig, Document,
};

/// Sink that counts bytes, so the bench measures encoding rather than memcpy
#[derive(Default)]
struct Counter(usize);

impl ErrorType for Counter {
    type Error = Infallible;
}

impl Write for Counter {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn full_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.identity.id = 400;
    config.identity.digits = 3;
    config.alerts.recipient = greenpost_core::config::bounded("recipient", "ops@example.org").unwrap();
    for i in 0..5u8 {
        config.add_environment(&format!("env_{i}"), i * 2).unwrap();
        config.add_soil(&format!("soil_{i}"), i).unwrap();
        config.add_temperature(&format!("probe_{i}"), i, 10.0, 30.0).unwrap();
    }
    config
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");

    let config = full_config();
    let identity = config.identity().unwrap();
    let layout = config.layout();
    let mut registry = config.build_registry().unwrap();
    for reading in registry.temperatures_mut() {
        reading.temp = 35.5;
    }
    refresh_alerts(&mut registry);

    let document = Document::build(&registry, &identity, &layout);
    group.throughput(Throughput::Bytes(document.length() as u64));

    group.bench_function("measure", |b| b.iter(|| black_box(document.length())));

    group.bench_function("emit", |b| {
        b.iter(|| {
            let mut sink = Counter::default();
            let written = document.write_to(&mut sink, &mut NoopLiveness).unwrap();
            black_box(written)
        })
    });

    group.bench_function("build_and_measure", |b| {
        b.iter(|| black_box(Document::build(&registry, &identity, &layout).length()))
    });

    group.finish();
}

criterion_group!(benches, bench_document);
criterion_main!(benches);
