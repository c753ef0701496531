use ark_bls12_381::{Bls12_381, Fr};
use ceremony_phase2::{
    compute_linear_combination, compute_response, initial_challenge, verify_response,
    Phase2Accumulator, Phase2Challenge,
};
use ceremony_pot::{lagrange_evaluations, PowersOfTau};
use ceremony_r1cs::{simple_circuit, Qap};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_challenge() -> Phase2Challenge<Bls12_381> {
    let mut cs = simple_circuit::<Fr>();
    cs.swap_ab_if_beneficial();
    let qap = Qap::from_constraint_system(&cs).unwrap();
    let pot = PowersOfTau::<Bls12_381>::from_secrets(
        Fr::from(3u64),
        Fr::from(5u64),
        Fr::from(7u64),
        qap.degree(),
    );
    let lagrange = lagrange_evaluations(&pot, qap.degree()).unwrap();
    let layer1 = compute_linear_combination(&pot, &lagrange, &qap).unwrap();
    initial_challenge(Phase2Accumulator::initial(
        cs.digest(),
        &layer1,
        cs.num_inputs,
    ))
}

fn contribution_benchmarks(c: &mut Criterion) {
    let challenge = bench_challenge();
    let secret = Fr::from(42u64);

    c.bench_function("phase2_compute_response", |b| {
        b.iter(|| compute_response(&challenge, secret).unwrap())
    });

    let response = compute_response(&challenge, secret).unwrap();
    c.bench_function("phase2_verify_response", |b| {
        b.iter(|| verify_response(&challenge, &response).unwrap())
    });
}

criterion_group!(benches, contribution_benchmarks);
criterion_main!(benches);
