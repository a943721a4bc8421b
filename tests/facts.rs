use resolute::construct::{Compound, Goal, Term};
use resolute::resolve::{Program, Results};

fn collect(program: &Program, results: &mut Results, variable: &Term) -> Vec<Term> {
    let mut seen = Vec::new();
    while results.next() {
        seen.push(
            program
                .value(variable)
                .expect("variable should be bound in a solution"),
        );
    }
    seen
}

#[test]
fn single_fact_matches_once() {
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("pizza")],
        ))
        .unwrap();

    let mut results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), Term::atom("pizza")],
    )));
    let mut matches = 0;
    while results.next() {
        matches += 1;
    }
    assert_eq!(matches, 1, "expected exactly one match");
    assert!(results.err().is_none(), "no error during search");
}

#[test]
fn variable_binds_to_fact_argument() {
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("pizza")],
        ))
        .unwrap();

    let x = program.variable("X");
    let mut results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), x.clone()],
    )));
    assert!(results.next(), "expected a solution");
    assert_eq!(program.value(&x), Some(Term::atom("pizza")));
    assert!(!results.next(), "expected a single solution");
    assert!(results.err().is_none());
}

#[test]
fn multiple_matches_come_in_insertion_order() {
    let program = Program::new();
    for (person, thing) in [
        ("eric", "shoes"),
        ("bob", "pizza"),
        ("eric", "bubblegum"),
        ("bob", "beer"),
    ] {
        program
            .add_fact(Compound::new(
                "likes",
                vec![Term::atom(person), Term::atom(thing)],
            ))
            .unwrap();
    }

    let x = program.variable("X");
    let mut results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), x.clone()],
    )));
    let seen = collect(&program, &mut results, &x);
    assert_eq!(seen, vec![Term::atom("pizza"), Term::atom("beer")]);
    assert!(results.err().is_none());
}

#[test]
fn bindings_reset_between_candidate_trials() {
    // p(a, 1) binds X := a before failing on its second argument; the
    // driver must restore X before trying p(b, 2).
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "p",
            vec![Term::atom("a"), Term::integer(1)],
        ))
        .unwrap();
    program
        .add_fact(Compound::new(
            "p",
            vec![Term::atom("b"), Term::integer(2)],
        ))
        .unwrap();

    let x = program.variable("X");
    let mut results = program.query(Goal::new(Term::compound(
        "p",
        vec![x.clone(), Term::integer(2)],
    )));
    let seen = collect(&program, &mut results, &x);
    assert_eq!(seen, vec![Term::atom("b")]);
}

#[test]
fn exhaustion_restores_pre_query_state() {
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("pizza")],
        ))
        .unwrap();

    let x = program.variable("X");
    let mut results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), x.clone()],
    )));
    while results.next() {
        assert!(program.value(&x).is_some());
    }
    assert_eq!(
        program.value(&x),
        None,
        "exhausted query should leave X unbound again"
    );
}
