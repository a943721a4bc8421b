//! The resolution driver: the program database, the choice-point stack,
//! and pull-based solution enumeration.
//!
//! A [`Program`] wires a [`VariableKeeper`] and a [`ClauseKeeper`]
//! together and registers the standard built-ins on construction.
//! Submitting a goal yields a [`Results`], which enumerates solutions one
//! `next()` at a time in depth-first, left-to-right, clause-insertion
//! order. Each solution is observed through the bindings of the caller's
//! own variables; when enumeration is exhausted every variable is back in
//! its pre-query state.
//!
//! The driver is iterative over an explicit stack of choice points, so
//! host-language recursion never grows with goal depth. Each choice point
//! records the trail position at entry; rewinding to it restores bindings
//! before every candidate trial and on backtrack. Cut markers carry the
//! stack index of the choice point that selected their clause and clear
//! the clause queues from there upward, committing the engine to the
//! choices made so far without ever unwinding bindings.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, trace};

use crate::builtin;
use crate::clause::{Clause, ClauseKeeper, Rule};
use crate::construct::{Compound, Goal, Term, VariableKeeper};
use crate::error::{EngineError, Result};

// ------------- Program -------------
/// A database of clauses plus the binding environment shared with its
/// queries.
pub struct Program {
    variables: Arc<Mutex<VariableKeeper>>,
    clauses: Arc<Mutex<ClauseKeeper>>,
    active: Arc<AtomicUsize>,
}

impl Program {
    pub fn new() -> Self {
        let program = Self {
            variables: Arc::new(Mutex::new(VariableKeeper::new())),
            clauses: Arc::new(Mutex::new(ClauseKeeper::new())),
            active: Arc::new(AtomicUsize::new(0)),
        };
        {
            let mut clauses = program.clauses.lock().unwrap();
            for clause in builtin::standard() {
                clauses.keep(clause);
            }
        }
        program
    }

    pub fn with_clauses(initial: impl IntoIterator<Item = Arc<dyn Clause>>) -> Self {
        let program = Self::new();
        {
            let mut clauses = program.clauses.lock().unwrap();
            for clause in initial {
                clauses.keep(clause);
            }
        }
        program
    }

    /// Appends a clause to its signature bucket. Clauses cannot be added
    /// while a query is in flight; in-flight iterations never observe
    /// later additions either way, since candidates are snapshot at
    /// choice-point creation.
    pub fn add(&self, clause: Arc<dyn Clause>) -> Result<()> {
        if self.active.load(Ordering::SeqCst) != 0 {
            return Err(EngineError::Invariant(
                "clauses cannot be added while a query is in flight".into(),
            ));
        }
        let mut clauses = self
            .clauses
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))?;
        clauses.keep(clause);
        Ok(())
    }

    pub fn add_fact(&self, fact: Compound) -> Result<()> {
        self.add(Arc::new(fact))
    }

    pub fn add_rule(&self, rule: Rule) -> Result<()> {
        self.add(Arc::new(rule))
    }

    /// Allocates a fresh unbound variable owned by this program.
    pub fn variable(&self, name: &str) -> Term {
        Term::Variable(self.variables.lock().unwrap().generate(name))
    }

    /// The fully dereferenced form of `term`, or `None` while it ends in
    /// an unbound variable.
    pub fn value(&self, term: &Term) -> Option<Term> {
        match self.variables.lock().unwrap().walk(term) {
            Term::Variable(_) => None,
            resolved => Some(resolved),
        }
    }

    /// The callable compound form `term` denotes, if any.
    pub fn callable(&self, term: &Term) -> Option<Arc<Compound>> {
        self.variables.lock().unwrap().callable(term)
    }

    /// Unifies two terms against the program's binding environment.
    pub fn unify(&self, a: &Term, b: &Term) -> bool {
        self.variables.lock().unwrap().unify(a, b)
    }

    pub fn variable_keeper(&self) -> Arc<Mutex<VariableKeeper>> {
        Arc::clone(&self.variables)
    }
    pub fn clause_keeper(&self) -> Arc<Mutex<ClauseKeeper>> {
        Arc::clone(&self.clauses)
    }

    /// Submits a conjunctive goal, returning its pull-based results. A
    /// head that does not denote a callable target surfaces as a sticky
    /// [`EngineError::Type`] on the returned results.
    pub fn query(&self, goal: Goal) -> Results {
        debug!(goal = %goal, "query submitted");
        self.active.fetch_add(1, Ordering::SeqCst);
        let mut results = Results {
            variables: Arc::clone(&self.variables),
            clauses: Arc::clone(&self.clauses),
            active: Arc::clone(&self.active),
            released: false,
            stack: Vec::new(),
            error: None,
        };
        let variables = self.variables.lock().unwrap();
        match variables.callable(goal.head()) {
            Some(fact) => {
                let candidates = self.clauses.lock().unwrap().matching(&fact.signature());
                results.stack.push(ChoicePoint {
                    fact,
                    remaining: goal.tail().cloned(),
                    clauses: VecDeque::from(candidates),
                    trail_mark: variables.mark(),
                });
            }
            None => {
                debug!(term = %goal.head(), "goal head is not callable");
                results.error = Some(EngineError::not_callable(goal.head().clone()));
            }
        }
        results
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- ChoicePoint -------------
/// A saved search state: the callable under trial, the work remaining
/// after it, the candidate clauses not yet tried, and the trail position
/// to rewind to when a candidate fails.
#[derive(Debug)]
struct ChoicePoint {
    fact: Arc<Compound>,
    remaining: Option<Arc<Goal>>,
    clauses: VecDeque<Arc<dyn Clause>>,
    trail_mark: usize,
}

/// Splices a fresh rule body in front of the remaining work. Cut markers
/// inside the body are tagged with `owner`, the stack index of the choice
/// point that selected the clause; the `remaining` suffix is shared
/// untouched.
fn splice(body: Option<Goal>, remaining: Option<Arc<Goal>>, owner: usize) -> Option<Arc<Goal>> {
    let body = match body {
        Some(body) => body,
        None => return remaining,
    };
    let mut heads = vec![body.head().clone()];
    let mut next = body.tail().cloned();
    while let Some(node) = next {
        heads.push(node.head().clone());
        next = node.tail().cloned();
    }
    let mut spliced = remaining;
    for head in heads.into_iter().rev() {
        let barrier = matches!(head, Term::Cut).then_some(owner);
        spliced = Some(Arc::new(Goal::cons(head, barrier, spliced)));
    }
    spliced
}

// ------------- Results -------------
/// Pull-based solution enumeration for one submitted goal.
pub struct Results {
    variables: Arc<Mutex<VariableKeeper>>,
    clauses: Arc<Mutex<ClauseKeeper>>,
    active: Arc<AtomicUsize>,
    released: bool,
    stack: Vec<ChoicePoint>,
    error: Option<EngineError>,
}

impl Results {
    /// Advances the search until the next solution, leaving its bindings
    /// observable through the caller's variables. Returns `false` when the
    /// search space is exhausted or an error was recorded; errors are
    /// sticky and visible through [`Results::err`].
    pub fn next(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        let mut variables = match self.variables.lock() {
            Ok(guard) => guard,
            Err(e) => {
                self.error = Some(EngineError::Lock(e.to_string()));
                return false;
            }
        };
        loop {
            let cp = match self.stack.last_mut() {
                Some(cp) => cp,
                None => {
                    debug!("query exhausted");
                    return false;
                }
            };
            let mark = cp.trail_mark;
            let clause = match cp.clauses.pop_front() {
                Some(clause) => clause,
                None => {
                    // no alternatives left here, backtrack
                    variables.undo_to(mark);
                    self.stack.pop();
                    trace!(depth = self.stack.len(), "backtrack");
                    continue;
                }
            };
            let fact = Arc::clone(&cp.fact);
            let remaining = cp.remaining.clone();

            // every candidate trial starts from the bindings the choice
            // point was entered with
            variables.undo_to(mark);
            let (body, matches) = clause.call(fact.args(), &mut variables);
            if !matches {
                continue;
            }

            let owner = self.stack.len() - 1;
            let mut goal = splice(body, remaining, owner);

            // a cut surfacing at the head commits the owning clause and
            // every choice point above it
            loop {
                let node = match &goal {
                    Some(node) if matches!(node.head(), Term::Cut) => Arc::clone(node),
                    _ => break,
                };
                let barrier = node.barrier().unwrap_or(0);
                for pruned in self.stack[barrier..].iter_mut() {
                    pruned.clauses.clear();
                }
                trace!(barrier, "cut prunes alternatives");
                goal = node.tail().cloned();
            }

            let next_goal = match goal {
                Some(goal) => goal,
                None => {
                    // nothing left to prove
                    debug!(depth = self.stack.len(), "solution found");
                    return true;
                }
            };

            let fact = match variables.callable(next_goal.head()) {
                Some(fact) => fact,
                None => {
                    debug!(term = %next_goal.head(), "goal head is not callable");
                    self.error = Some(EngineError::not_callable(next_goal.head().clone()));
                    return false;
                }
            };
            let candidates = match self.clauses.lock() {
                Ok(keeper) => keeper.matching(&fact.signature()),
                Err(e) => {
                    self.error = Some(EngineError::Lock(e.to_string()));
                    return false;
                }
            };
            self.stack.push(ChoicePoint {
                fact,
                remaining: next_goal.tail().cloned(),
                clauses: VecDeque::from(candidates),
                trail_mark: variables.mark(),
            });
        }
    }

    /// The sticky error, if one has been recorded. Once set, [`next`]
    /// returns `false` forever.
    ///
    /// [`next`]: Results::next
    pub fn err(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// Releases the retained choice points and poisons further iteration
    /// with [`EngineError::Closed`]. Idempotent; an earlier error is kept.
    pub fn close(&mut self) {
        self.stack.clear();
        self.release();
        if self.error.is_none() {
            self.error = Some(EngineError::Closed);
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for Results {
    fn drop(&mut self) {
        self.release();
    }
}
