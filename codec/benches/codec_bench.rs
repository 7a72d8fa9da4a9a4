use admit_codec::{compose, decode, DecodedToken, Taxon, TokenFlags, TokenId};
use admit_types::AccountId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_parts() -> DecodedToken {
    DecodedToken {
        flags: TokenFlags::TRANSFERABLE,
        transfer_fee: 0,
        issuer: AccountId::new([0x42; 20]),
        taxon: Taxon::new(12_345_678),
        sequence: 7,
    }
}

fn compose_bench(c: &mut Criterion) {
    let parts = sample_parts();
    c.bench_function("token_id_compose", |b| b.iter(|| compose(black_box(&parts))));
}

fn decode_bench(c: &mut Criterion) {
    let id = compose(&sample_parts()).unwrap();
    c.bench_function("token_id_decode", |b| b.iter(|| decode(black_box(&id))));
}

fn parse_bench(c: &mut Criterion) {
    let hex = compose(&sample_parts()).unwrap().to_string();
    c.bench_function("token_id_parse_hex", |b| {
        b.iter(|| black_box(hex.as_str()).parse::<TokenId>())
    });
}

criterion_group!(benches, compose_bench, decode_bench, parse_bench);
criterion_main!(benches);
