use criterion::{black_box, criterion_group, criterion_main, Criterion};

use surveyrules_core::contingency::{expand_dependencies, Declarations};
use surveyrules_core::formula::{expand_formulas, FormulaDeclarations};
use surveyrules_core::model::{AnswerDependencies, Op, OpDef, QuestionDependencies, QuestionId};

/// q1 is disabled by q0, q2 by q1, and so on.
fn disabling_chain(len: usize) -> Declarations {
    (1..=len)
        .map(|i| {
            let deps = QuestionDependencies {
                disabling_answer_values: AnswerDependencies::from([(
                    QuestionId::from(format!("q{}", i - 1)),
                    format!("a{}", i - 1).into(),
                )]),
                ..Default::default()
            };
            (QuestionId::from(format!("q{i}")), deps)
        })
        .collect()
}

/// f1 = f0 + x1, f2 = f1 + x2, ...
fn formula_chain(len: usize) -> FormulaDeclarations {
    (1..=len)
        .map(|i| {
            (
                QuestionId::from(format!("f{i}")),
                OpDef::new(Op::Add, format!("f{}", i - 1), format!("x{i}")),
            )
        })
        .collect()
}

fn bench_contingency_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_dependencies");

    for len in [10, 50, 200] {
        let decls = disabling_chain(len);
        group.bench_function(format!("chain={len}"), |b| {
            b.iter(|| expand_dependencies(black_box(&decls)))
        });
    }

    group.finish();
}

fn bench_formula_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_formulas");

    for len in [10, 50, 200] {
        let decls = formula_chain(len);
        group.bench_function(format!("chain={len}"), |b| {
            b.iter(|| expand_formulas(black_box(&decls)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_contingency_expansion, bench_formula_expansion);
criterion_main!(benches);
