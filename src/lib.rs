//! Resolute – a small SLD-resolution engine over first-order terms.
//!
//! Resolute answers conjunctive queries against a database of facts and
//! rules by depth-first resolution with chronological backtracking and
//! cut. The moving parts:
//! * A [`construct::Term`] is an atom, an integer, a float, a variable, a
//!   compound, or one of two singletons (the anonymous variable and the
//!   cut marker).
//! * Variables are identified by allocation identity; their bindings live
//!   in a [`construct::VariableKeeper`], mutated by unification and
//!   restored through a trail on backtrack.
//! * A [`clause::Clause`] is anything callable: a fact (a bare compound),
//!   a [`clause::Rule`] (head plus body goal, freshly renamed on every
//!   call), or a built-in.
//! * A [`resolve::Program`] buckets clauses by functor/arity and evaluates
//!   goals through a stack of choice points, one solution per
//!   [`resolve::Results::next`] call.
//!
//! ## Modules
//! * [`construct`] – Term algebra, variable identity, binding environment,
//!   unification.
//! * [`clause`] – The clause contract, facts, rules, and the signature
//!   buckets.
//! * [`builtin`] – `true/0` and the type-test predicates.
//! * [`resolve`] – The program database and the resolution driver.
//! * [`error`] – The engine error taxonomy.
//!
//! ## Quick Start
//! ```
//! use resolute::construct::{Compound, Goal, Term};
//! use resolute::resolve::Program;
//!
//! let program = Program::new();
//! program
//!     .add_fact(Compound::new("likes", vec![Term::atom("bob"), Term::atom("pizza")]))
//!     .unwrap();
//!
//! let x = program.variable("X");
//! let mut results = program.query(Goal::new(Term::compound(
//!     "likes",
//!     vec![Term::atom("bob"), x.clone()],
//! )));
//! while results.next() {
//!     assert_eq!(program.value(&x), Some(Term::atom("pizza")));
//! }
//! assert!(results.err().is_none());
//! ```
//!
//! ## Guarantees
//! Solutions enumerate in depth-first, left-to-right, clause-insertion
//! order. Unification failure is a value driving backtracking, never an
//! error; only non-callable goal heads and precondition violations surface
//! through [`resolve::Results::err`]. Once enumeration is exhausted, every
//! variable that existed before the query is back in its pre-query state.
//!
//! Evaluation is single-threaded and pull-based: nothing advances between
//! [`resolve::Results::next`] calls, which is when callers inspect
//! bindings. Adding clauses while a query is in flight is rejected.
//!
//! ## License
//! Dual licensed under Apache-2.0 and MIT.

pub mod builtin;
pub mod clause;
pub mod construct;
pub mod error;
pub mod resolve;
