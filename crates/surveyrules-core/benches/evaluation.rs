use criterion::{black_box, criterion_group, criterion_main, Criterion};

use surveyrules_core::contingency::enable;
use surveyrules_core::formula::{evaluate, Values};
use surveyrules_core::model::{
    AnswerDependencies, AnswerValueId, Expr, Op, QuestionId, Response, ResponseSet,
};

/// Balanced tree of `Add` over 2^depth leaves.
fn balanced(depth: u32, next: &mut usize) -> Expr {
    if depth == 0 {
        *next += 1;
        return Expr::question(format!("q{next}"));
    }
    Expr::binary(Op::Add, balanced(depth - 1, next), balanced(depth - 1, next))
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for depth in [4, 8, 12] {
        let expr = balanced(depth, &mut 0);
        let values: Values = (1..=(1usize << depth))
            .map(|i| (QuestionId::from(format!("q{i}")), i as f64))
            .collect();
        group.bench_function(format!("depth={depth}"), |b| {
            b.iter(|| evaluate(black_box(&expr), black_box(&values)))
        });
    }

    group.finish();
}

fn bench_enable(c: &mut Criterion) {
    let mut group = c.benchmark_group("enable");

    let responses: ResponseSet = (0..500)
        .map(|i| {
            (
                QuestionId::from(format!("q{i}")),
                Response {
                    value_percentage: 100,
                    answers: [AnswerValueId::from(format!("a{i}"))].into(),
                },
            )
        })
        .collect();
    let rules: AnswerDependencies = (0..200)
        .map(|i| {
            (
                QuestionId::from(format!("q{i}")),
                AnswerValueId::from("never"),
            )
        })
        .collect();
    let gates: Vec<QuestionId> = (0..200).map(|i| QuestionId::from(format!("q{i}"))).collect();

    group.bench_function("200_rules_each_kind", |b| {
        b.iter(|| {
            enable(
                black_box(&responses),
                black_box(&rules),
                black_box(&AnswerDependencies::new()),
                black_box(&gates),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_enable);
criterion_main!(benches);
