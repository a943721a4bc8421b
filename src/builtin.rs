//! Built-in predicates.
//!
//! Built-ins obey the same [`Clause`] contract as facts and rules and are
//! registered in the ordinary clause map; the engine gives them no
//! privilege beyond registration. The standard set covers `true/0` and
//! the type-test predicates, which examine the dereferenced form of their
//! argument and never bind anything.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::clause::Clause;
use crate::construct::{Atom, Goal, Signature, Term, VariableKeeper};

type Call = fn(&[Term], &mut VariableKeeper) -> (Option<Goal>, bool);

// ------------- Builtin -------------
/// A named callable backed by a plain function.
#[derive(Debug)]
pub struct Builtin {
    name: Atom,
    arity: usize,
    call: Call,
}

impl Builtin {
    pub fn new(name: impl Into<Atom>, arity: usize, call: Call) -> Self {
        Self {
            name: name.into(),
            arity,
            call,
        }
    }
}

impl Clause for Builtin {
    fn signature(&self) -> Signature {
        Signature::new(self.name.clone(), self.arity)
    }

    fn call(&self, args: &[Term], variables: &mut VariableKeeper) -> (Option<Goal>, bool) {
        if args.len() != self.arity {
            return (None, false);
        }
        (self.call)(args, variables)
    }
}

fn unbound(term: &Term, variables: &VariableKeeper) -> bool {
    matches!(
        variables.walk(term),
        Term::Variable(_) | Term::Anonymous
    )
}

lazy_static! {
    static ref STANDARD: Vec<Arc<dyn Clause>> = vec![
        Arc::new(Builtin::new("true", 0, |_, _| (None, true))),
        Arc::new(Builtin::new("var", 1, |args, vars| {
            (None, unbound(&args[0], vars))
        })),
        Arc::new(Builtin::new("nonvar", 1, |args, vars| {
            (None, !unbound(&args[0], vars))
        })),
        Arc::new(Builtin::new("atom", 1, |args, vars| {
            (None, matches!(vars.walk(&args[0]), Term::Atom(_)))
        })),
        Arc::new(Builtin::new("integer", 1, |args, vars| {
            (None, matches!(vars.walk(&args[0]), Term::Integer(_)))
        })),
        Arc::new(Builtin::new("float", 1, |args, vars| {
            (None, matches!(vars.walk(&args[0]), Term::Float(_)))
        })),
        Arc::new(Builtin::new("number", 1, |args, vars| {
            (None, matches!(vars.walk(&args[0]), Term::Integer(_) | Term::Float(_)))
        })),
        Arc::new(Builtin::new("compound", 1, |args, vars| {
            (None, matches!(vars.walk(&args[0]), Term::Compound(_)))
        })),
        Arc::new(Builtin::new("callable", 1, |args, vars| {
            (None, vars.callable(&args[0]).is_some())
        })),
    ];
}

/// The standard built-ins, registered by `Program::new`.
pub fn standard() -> Vec<Arc<dyn Clause>> {
    STANDARD.clone()
}
