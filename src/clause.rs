//! The clause model: facts, rules, and the keeper that buckets them by
//! signature.
//!
//! Everything callable during resolution lives behind the [`Clause`]
//! trait. A [`Compound`] is its own fact-clause; a [`Rule`] pairs a head
//! with a body goal and is freshly renamed on every call so that repeated
//! invocations never alias variables across recursion frames. Built-in
//! predicates implement the same contract (see the `builtin` module).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::construct::{
    Atom, Compound, Goal, OtherHasher, Signature, Term, Variable, VariableHasher, VariableKeeper,
};

// ------------- Clause -------------
/// The contract every callable obeys: a signature for bucketing, and a
/// call that matches the given arguments against the clause.
///
/// `call` attempts to unify `args` with the clause head left-to-right,
/// mutating `variables` as it goes. It returns `(body, matches)`: on a
/// fact or built-in match the body is `None` and nothing further needs
/// proving; on a rule match the body is a fresh copy owned by the caller.
/// Bindings made before a failed argument are left in place; the driver
/// restores them through the trail.
pub trait Clause: fmt::Debug + Send + Sync {
    fn signature(&self) -> Signature;
    fn call(&self, args: &[Term], variables: &mut VariableKeeper) -> (Option<Goal>, bool);
}

/// A fact is a compound term callable against its own arguments.
impl Clause for Compound {
    fn signature(&self) -> Signature {
        Compound::signature(self)
    }

    fn call(&self, args: &[Term], variables: &mut VariableKeeper) -> (Option<Goal>, bool) {
        if args.len() != self.arity() {
            return (None, false);
        }
        for (given, held) in args.iter().zip(self.args()) {
            if !variables.unify(given, held) {
                return (None, false);
            }
        }
        (None, true)
    }
}

// ------------- Rule -------------
/// A rule: head parameters plus a body goal to prove once the head
/// matches, e.g. `friends(P1, P2) :- likes(P1, T), likes(P2, T).`
#[derive(Clone, Debug)]
pub struct Rule {
    functor: Atom,
    parameters: Vec<Term>,
    body: Goal,
}

impl Rule {
    pub fn new(functor: impl Into<Atom>, parameters: Vec<Term>, body: Goal) -> Self {
        Self {
            functor: functor.into(),
            parameters,
            body,
        }
    }
    pub fn functor(&self) -> &Atom {
        &self.functor
    }
    pub fn parameters(&self) -> &[Term] {
        &self.parameters
    }
    pub fn body(&self) -> &Goal {
        &self.body
    }
}

type RenameTable = HashMap<u64, Variable, VariableHasher>;

/// Copies `term`, replacing every variable with a fresh unbound one while
/// preserving co-reference: the same original maps to the same fresh
/// variable across one table. Atoms, numbers, and the singletons are
/// shared; compounds are reconstructed around the renamed arguments.
fn rename(term: &Term, table: &mut RenameTable, variables: &mut VariableKeeper) -> Term {
    match term {
        Term::Variable(v) => {
            let fresh = match table.entry(v.id()) {
                Entry::Occupied(e) => e.get().clone(),
                Entry::Vacant(e) => e.insert(variables.duplicate(v)).clone(),
            };
            Term::Variable(fresh)
        }
        Term::Compound(c) => {
            let args = c
                .args()
                .iter()
                .map(|arg| rename(arg, table, variables))
                .collect();
            Term::compound(c.functor().clone(), args)
        }
        other => other.clone(),
    }
}

fn rename_goal(goal: &Goal, table: &mut RenameTable, variables: &mut VariableKeeper) -> Goal {
    let mut heads = vec![rename(goal.head(), table, variables)];
    let mut next = goal.tail().cloned();
    while let Some(node) = next {
        heads.push(rename(node.head(), table, variables));
        next = node.tail().cloned();
    }
    let mut tail = None;
    while heads.len() > 1 {
        let head = heads.pop().unwrap();
        tail = Some(Arc::new(Goal::cons(head, None, tail)));
    }
    Goal::cons(heads.pop().unwrap(), None, tail)
}

impl Clause for Rule {
    fn signature(&self) -> Signature {
        Signature::new(self.functor.clone(), self.parameters.len())
    }

    fn call(&self, args: &[Term], variables: &mut VariableKeeper) -> (Option<Goal>, bool) {
        if args.len() != self.parameters.len() {
            return (None, false);
        }
        // One table across parameters and body keeps co-reference intact.
        let mut table = RenameTable::default();
        let parameters = self
            .parameters
            .iter()
            .map(|p| rename(p, &mut table, variables))
            .collect::<Vec<_>>();
        for (given, fresh) in args.iter().zip(&parameters) {
            if !variables.unify(given, fresh) {
                return (None, false);
            }
        }
        let body = rename_goal(&self.body, &mut table, variables);
        (Some(body), true)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.functor)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", parameter)?;
        }
        write!(f, ") :- {}", self.body)
    }
}

// ------------- ClauseKeeper -------------
/// Buckets clauses by signature, preserving insertion order within each
/// bucket. Insertion order is the clause-trial order during resolution.
#[derive(Debug, Default)]
pub struct ClauseKeeper {
    kept: HashMap<Signature, Vec<Arc<dyn Clause>>, OtherHasher>,
    length: usize,
}

impl ClauseKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
            length: 0,
        }
    }

    pub fn keep(&mut self, clause: Arc<dyn Clause>) {
        let signature = clause.signature();
        self.kept.entry(signature).or_default().push(clause);
        self.length += 1;
    }

    /// The current candidates for `signature`, in insertion order. The
    /// returned snapshot is detached: later `keep` calls do not affect it.
    pub fn matching(&self, signature: &Signature) -> Vec<Arc<dyn Clause>> {
        match self.kept.get(signature) {
            Some(clauses) => clauses.clone(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
