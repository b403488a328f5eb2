//! Record codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recfile_bench::{generate_records, wide_schema};
use recfile_codec::{encode_record, varint, RecordDecoder, RecordEncoder, Schema};

/// Benchmark varint encoding across magnitudes.
fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");

    for value in [0i32, 63, 8_191, 1 << 20, i32::MIN] {
        group.bench_with_input(BenchmarkId::new("write_i32", value), &value, |b, &value| {
            let mut out = Vec::with_capacity(8);
            b.iter(|| {
                out.clear();
                varint::write_i32(black_box(value), &mut out);
                black_box(&out);
            });
        });
    }

    group.finish();
}

/// Benchmark encoding records of increasing width.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for fields in [2usize, 8, 32] {
        let schema = wide_schema(fields / 2, fields / 2);
        let record = generate_records(&schema, 1, 16).remove(0);
        let size = encode_record(&record).unwrap().len();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("fields", fields), &record, |b, record| {
            let mut encoder = RecordEncoder::with_capacity(schema.clone(), size);
            b.iter(|| {
                let bytes = encoder.encode(black_box(record)).unwrap();
                black_box(bytes.len());
            });
        });
    }

    group.finish();
}

/// Benchmark full decoding against projected decoding.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let schema = wide_schema(8, 8);
    let record = generate_records(&schema, 1, 64).remove(0);
    let bytes = encode_record(&record).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("full", |b| {
        let decoder = RecordDecoder::new(schema.clone());
        b.iter(|| black_box(decoder.decode(black_box(&bytes)).unwrap()));
    });

    let projection = Schema::builder("Wide")
        .field("i0", recfile_codec::FieldType::Int32)
        .build()
        .unwrap();
    group.bench_function("projected_one_int", |b| {
        let decoder = RecordDecoder::with_projection(schema.clone(), &projection).unwrap();
        b.iter(|| black_box(decoder.decode(black_box(&bytes)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_varint, bench_encode, bench_decode);
criterion_main!(benches);
