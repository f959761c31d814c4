//! Benchmarks for accumulator operations and document encryption
//!
//! Run with: cargo bench --bench clearance_ops

use clearance_core::{
    abe::{AbeMode, EncryptionService},
    accumulator::{self, Element, MembershipWitness},
    authorization::AuthorizationService,
    policy::{Department, LevelHierarchy},
    storage::MemoryAccumulatorStore,
};
use cosmian_crypto_core::{CsRng, reexport::rand_core::SeedableRng};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;

fn bench_accumulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator");
    let mut rng = CsRng::from_seed([42u8; 32]);
    let (sk, pk, acc) = accumulator::create(b"bench/level/0", &mut rng).unwrap();
    let element = Element::hash(b"bench user");
    let (acc, _) = acc.add(&sk, &element).unwrap();
    let witness = MembershipWitness::new(&element, &acc, &sk).unwrap();

    group.bench_function("add", |b| {
        b.iter(|| acc.add(black_box(&sk), black_box(&Element::hash(b"another user"))).unwrap())
    });
    group.bench_function("issue_witness", |b| {
        b.iter(|| MembershipWitness::new(black_box(&element), black_box(&acc), &sk).unwrap())
    });
    group.bench_function("verify_witness", |b| {
        b.iter(|| assert!(witness.verify(black_box(&pk), black_box(&acc))))
    });

    group.finish();
}

fn bench_enroll(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let service = AuthorizationService::new(
        Arc::new(MemoryAccumulatorStore::new()),
        LevelHierarchy::default(),
        b"bench".as_slice(),
    );
    let mut counter = 0u64;

    c.bench_function("authorization_enroll", |b| {
        b.iter(|| {
            counter += 1;
            runtime
                .block_on(service.enroll(&counter.to_be_bytes(), 2, Department(1)))
                .unwrap()
        })
    });
}

fn bench_documents(c: &mut Criterion) {
    let sizes = [32, 1024, 8192];

    for mode in [AbeMode::Single, AbeMode::Multi] {
        let service = EncryptionService::new(LevelHierarchy::default(), mode);
        let mut group = c.benchmark_group(format!("document_{mode:?}").to_lowercase());

        for size in sizes {
            let plaintext: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
            group.throughput(Throughput::Bytes(size as u64));

            group.bench_with_input(BenchmarkId::new("encrypt", size), &plaintext, |b, pt| {
                b.iter(|| service.encrypt_document(Department(1), 2, black_box(pt)).unwrap())
            });

            let (ct, material) = service.encrypt_document(Department(1), 2, &plaintext).unwrap();
            group.bench_with_input(BenchmarkId::new("decrypt", size), &ct, |b, ct| {
                b.iter(|| {
                    service.decrypt_document(Department(1), 3, black_box(ct), &material).unwrap()
                })
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_accumulator, bench_enroll, bench_documents);
criterion_main!(benches);
