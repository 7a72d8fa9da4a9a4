use admit_crypto::{
    blake2b_256, decode_address, derive_address, keypair_from_seed, sign_message, verify_signature,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const CHALLENGE: &[u8] = b"admit-ownership-challenge-v1\naccount:adm_x\ntoken:000B0000";

fn challenge_signatures(c: &mut Criterion) {
    let holder = keypair_from_seed(&[5u8; 32]);
    let sig = sign_message(CHALLENGE, &holder.private);

    let mut group = c.benchmark_group("challenge");
    group.bench_function("sign", |b| {
        b.iter(|| sign_message(black_box(CHALLENGE), &holder.private))
    });
    group.bench_function("verify", |b| {
        b.iter(|| verify_signature(black_box(CHALLENGE), &sig, &holder.public))
    });
    group.finish();
}

fn metadata_digest(c: &mut Criterion) {
    let memo = vec![b'x'; 1024];
    c.bench_function("metadata_digest_1KiB", |b| b.iter(|| blake2b_256(black_box(&memo))));
}

fn addresses(c: &mut Criterion) {
    let keys = keypair_from_seed(&[6u8; 32]);
    let address = derive_address(&keys.public);

    let mut group = c.benchmark_group("address");
    group.bench_function("derive", |b| b.iter(|| derive_address(black_box(&keys.public))));
    group.bench_function("decode", |b| b.iter(|| decode_address(black_box(address.as_str()))));
    group.finish();
}

criterion_group!(benches, challenge_signatures, metadata_digest, addresses);
criterion_main!(benches);
