use resolute::construct::{Compound, Goal, Term};
use resolute::error::EngineError;
use resolute::resolve::Program;

#[test]
fn unbound_goal_head_is_a_type_error() {
    let program = Program::new();
    let x = program.variable("X");
    let mut results = program.query(Goal::new(x));
    assert!(!results.next());
    match results.err() {
        Some(EngineError::Type { expected, .. }) => assert_eq!(*expected, "callable"),
        other => panic!("expected a type error, got {:?}", other),
    }
    // sticky: iteration never resumes
    assert!(!results.next());
    assert!(matches!(results.err(), Some(EngineError::Type { .. })));
}

#[test]
fn number_goal_head_is_a_type_error() {
    let program = Program::new();
    let mut results = program.query(Goal::new(Term::integer(3)));
    assert!(!results.next());
    assert!(matches!(results.err(), Some(EngineError::Type { .. })));
}

#[test]
fn bound_non_callable_head_fails_mid_query() {
    // nums(1).  ?- nums(X), X.   X derefs to 1, which is not callable.
    let program = Program::new();
    program
        .add_fact(Compound::new("nums", vec![Term::integer(1)]))
        .unwrap();

    let x = program.variable("X");
    let goal = Goal::conjunction([Term::compound("nums", vec![x.clone()]), x.clone()]).unwrap();
    let mut results = program.query(goal);
    assert!(!results.next());
    match results.err() {
        Some(err @ EngineError::Type { .. }) => {
            assert!(err.to_string().contains("callable"), "got: {}", err)
        }
        other => panic!("expected a type error, got {:?}", other),
    }
}

#[test]
fn close_poisons_further_iteration() {
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
    results.close();
    assert!(!results.next());
    assert!(matches!(results.err(), Some(EngineError::Closed)));
    assert_eq!(results.err().unwrap().to_string(), "results closed");

    // idempotent
    results.close();
    assert!(matches!(results.err(), Some(EngineError::Closed)));
}

#[test]
fn close_keeps_an_earlier_error() {
    let program = Program::new();
    let x = program.variable("X");
    let mut results = program.query(Goal::new(x));
    assert!(!results.next());
    results.close();
    assert!(
        matches!(results.err(), Some(EngineError::Type { .. })),
        "close must not replace the recorded error"
    );
}

#[test]
fn adding_clauses_during_an_active_query_is_rejected() {
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("pizza")],
        ))
        .unwrap();

    let results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), Term::atom("pizza")],
    )));
    let rejected = program.add_fact(Compound::new(
        "likes",
        vec![Term::atom("bob"), Term::atom("beer")],
    ));
    assert!(matches!(rejected, Err(EngineError::Invariant(_))));

    drop(results);
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("beer")],
        ))
        .expect("adding is allowed again once the query is dropped");
}

#[test]
fn closing_releases_the_active_query_slot() {
    let program = Program::new();
    program
        .add_fact(Compound::new("p", vec![Term::integer(1)]))
        .unwrap();

    let mut results = program.query(Goal::new(Term::compound("p", vec![Term::integer(1)])));
    results.close();
    program
        .add_fact(Compound::new("p", vec![Term::integer(2)]))
        .expect("adding is allowed again once the query is closed");
}

#[test]
fn pre_query_bindings_survive_enumeration() {
    let program = Program::new();
    program
        .add_fact(Compound::new(
            "likes",
            vec![Term::atom("bob"), Term::atom("pizza")],
        ))
        .unwrap();

    let y = program.variable("Y");
    assert!(program.unify(&y, &Term::atom("pizza")));

    let mut results = program.query(Goal::new(Term::compound(
        "likes",
        vec![Term::atom("bob"), y.clone()],
    )));
    assert!(results.next());
    assert!(!results.next());
    assert_eq!(
        program.value(&y),
        Some(Term::atom("pizza")),
        "bindings made before the query must survive exhaustion"
    );
}
