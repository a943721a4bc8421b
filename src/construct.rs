//! Fundamental building blocks of the engine: the term algebra, variable
//! identity, the binding environment, and unification.
//!
//! A [`Term`] is an atom, a number, a variable, a compound, or one of the
//! two singletons (the anonymous variable and the cut marker). Variables
//! are identified by allocation identity, never by name: two variables
//! named `X` created separately are distinct. Their current values live in
//! a [`VariableKeeper`], a slab indexed by variable id, together with the
//! trail that lets the resolution driver restore bindings on backtrack.

use core::hash::{BuildHasherDefault, Hasher};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use lazy_static::lazy_static;
use seahash::SeaHasher;

pub type VariableHasher = BuildHasherDefault<SeaHasher>;
pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Atom -------------
/// A general-purpose name with no inherent meaning. Two atoms are equal
/// exactly when their names are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(Arc<str>);

impl Atom {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }
    pub fn name(&self) -> &str {
        &self.0
    }
}
impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::new(name)
    }
}
impl From<String> for Atom {
    fn from(name: String) -> Self {
        Atom::new(name)
    }
}
impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

lazy_static! {
    static ref EMPTY_LIST: Atom = Atom::new("[]");
}

// ------------- Variable -------------
/// A named cell identified by allocation identity. The name is carried for
/// display only; equality and hashing go through the id, which indexes the
/// value slab of the [`VariableKeeper`] that allocated it.
#[derive(Clone, Debug)]
pub struct Variable {
    id: u64,
    name: Arc<str>,
}

impl Variable {
    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Variable {}
impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------- Compound -------------
/// A functor together with an ordered sequence of argument terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Compound {
    functor: Atom,
    args: Vec<Term>,
}

impl Compound {
    pub fn new(functor: impl Into<Atom>, args: Vec<Term>) -> Self {
        Self {
            functor: functor.into(),
            args,
        }
    }
    pub fn functor(&self) -> &Atom {
        &self.functor
    }
    pub fn args(&self) -> &[Term] {
        &self.args
    }
    pub fn arity(&self) -> usize {
        self.args.len()
    }
    pub fn signature(&self) -> Signature {
        Signature::new(self.functor.clone(), self.args.len())
    }
}
impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.functor)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

// ------------- Signature -------------
/// The (functor, arity) pair identifying a clause family, e.g. `likes/2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    functor: Atom,
    arity: usize,
}

impl Signature {
    pub fn new(functor: impl Into<Atom>, arity: usize) -> Self {
        Self {
            functor: functor.into(),
            arity,
        }
    }
    pub fn functor(&self) -> &Atom {
        &self.functor
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
}
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.functor, self.arity)
    }
}

// ------------- Term -------------
/// A first-order term.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Atom(Atom),
    Integer(i64),
    Float(f64),
    Variable(Variable),
    Compound(Arc<Compound>),
    /// The anonymous variable `_`: unifies with anything, never bound.
    Anonymous,
    /// The cut marker `!`, a sentinel inside goal lists.
    Cut,
}

impl Term {
    pub fn atom(name: impl Into<Atom>) -> Term {
        Term::Atom(name.into())
    }
    pub fn integer(value: i64) -> Term {
        Term::Integer(value)
    }
    pub fn float(value: f64) -> Term {
        Term::Float(value)
    }
    pub fn compound(functor: impl Into<Atom>, args: Vec<Term>) -> Term {
        Term::Compound(Arc::new(Compound::new(functor, args)))
    }
    /// The empty list constant, the atom `[]`.
    pub fn empty_list() -> Term {
        Term::Atom(EMPTY_LIST.clone())
    }
}
impl From<Compound> for Term {
    fn from(compound: Compound) -> Term {
        Term::Compound(Arc::new(compound))
    }
}
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Atom(atom) => write!(f, "{}", atom),
            Term::Integer(i) => write!(f, "{}", i),
            Term::Float(x) => write!(f, "{}", x),
            Term::Variable(v) => write!(f, "{}", v),
            Term::Compound(c) => write!(f, "{}", c),
            Term::Anonymous => write!(f, "_"),
            Term::Cut => write!(f, "!"),
        }
    }
}

// ------------- Goal -------------
/// A non-empty comma-separated conjunction of terms, as a cons list. The
/// empty conjunction is represented by the absence of a `Goal`.
///
/// Tails are shared: when the driver splices a rule body in front of the
/// remaining work, the suffix is reused as-is and never mutated. A node
/// whose head is the cut marker carries a `barrier`, the stack index of
/// the choice point that selected the enclosing clause; the driver tags it
/// while splicing.
#[derive(Clone, Debug, PartialEq)]
pub struct Goal {
    head: Term,
    barrier: Option<usize>,
    tail: Option<Arc<Goal>>,
}

impl Goal {
    pub fn new(head: Term) -> Self {
        Self {
            head,
            barrier: None,
            tail: None,
        }
    }

    /// Builds the conjunction of `terms` in order, or `None` when empty.
    pub fn conjunction(terms: impl IntoIterator<Item = Term>) -> Option<Goal> {
        let mut terms = terms.into_iter();
        let first = terms.next()?;
        let rest = terms.collect::<Vec<_>>();
        let mut tail = None;
        for term in rest.into_iter().rev() {
            tail = Some(Arc::new(Goal {
                head: term,
                barrier: None,
                tail,
            }));
        }
        Some(Goal {
            head: first,
            barrier: None,
            tail,
        })
    }

    pub(crate) fn cons(head: Term, barrier: Option<usize>, tail: Option<Arc<Goal>>) -> Self {
        Self {
            head,
            barrier,
            tail,
        }
    }

    pub fn head(&self) -> &Term {
        &self.head
    }
    pub fn tail(&self) -> Option<&Arc<Goal>> {
        self.tail.as_ref()
    }
    pub(crate) fn barrier(&self) -> Option<usize> {
        self.barrier
    }
}
impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.head)?;
        let mut next = self.tail.as_deref();
        while let Some(goal) = next {
            write!(f, ", {}", goal.head)?;
            next = goal.tail.as_deref();
        }
        write!(f, ".")
    }
}

// ------------- VariableKeeper -------------
/// The binding environment: allocates variable identities and keeps their
/// current values, together with the trail of bindings that the resolution
/// driver unwinds on backtrack.
#[derive(Debug, Default)]
pub struct VariableKeeper {
    values: Vec<Option<Term>>,
    trail: Vec<u64>,
}

impl VariableKeeper {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            trail: Vec::new(),
        }
    }

    /// Allocates a fresh unbound variable. The name is for display only.
    pub fn generate(&mut self, name: &str) -> Variable {
        let id = self.values.len() as u64;
        self.values.push(None);
        Variable {
            id,
            name: Arc::from(name),
        }
    }

    /// Allocates a fresh unbound variable sharing `variable`'s name, used
    /// when renaming a rule on entry.
    pub(crate) fn duplicate(&mut self, variable: &Variable) -> Variable {
        let id = self.values.len() as u64;
        self.values.push(None);
        Variable {
            id,
            name: Arc::clone(&variable.name),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dereferences `term` through variable-to-variable chains until an
    /// unbound variable or a non-variable term is reached.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term.clone();
        loop {
            let next = match &current {
                Term::Variable(v) => match &self.values[v.id as usize] {
                    Some(value) => value.clone(),
                    None => break,
                },
                _ => break,
            };
            current = next;
        }
        current
    }

    /// The fully dereferenced value of `variable`, or `None` while the end
    /// of its chain is unbound.
    pub fn value(&self, variable: &Variable) -> Option<Term> {
        match self.walk(&Term::Variable(variable.clone())) {
            Term::Variable(_) => None,
            term => Some(term),
        }
    }

    /// The callable form of `term`, dereferenced: a compound is its own
    /// callable, an atom `a` denotes the nullary compound `a()`, and a
    /// bound variable resolves through its value. Anything else is not
    /// callable.
    pub fn callable(&self, term: &Term) -> Option<Arc<Compound>> {
        match self.walk(term) {
            Term::Compound(compound) => Some(compound),
            Term::Atom(atom) => Some(Arc::new(Compound::new(atom, Vec::new()))),
            _ => None,
        }
    }

    fn bind(&mut self, variable: Variable, term: Term) {
        self.values[variable.id as usize] = Some(term);
        self.trail.push(variable.id);
    }

    /// Decides whether two terms can be made equal, binding variables as a
    /// side effect. Failure leaves any bindings already made in place; the
    /// resolution driver owns restoring them through the trail.
    pub fn unify(&mut self, a: &Term, b: &Term) -> bool {
        let a = self.walk(a);
        let b = self.walk(b);
        match (a, b) {
            (Term::Anonymous, _) | (_, Term::Anonymous) => true,
            (Term::Cut, _) | (_, Term::Cut) => true,
            (Term::Variable(v1), Term::Variable(v2)) => {
                if v1 == v2 {
                    true
                } else {
                    self.bind(v1, Term::Variable(v2));
                    true
                }
            }
            (Term::Variable(v), t) | (t, Term::Variable(v)) => {
                self.bind(v, t);
                true
            }
            (Term::Atom(x), Term::Atom(y)) => x == y,
            (Term::Integer(x), Term::Integer(y)) => x == y,
            (Term::Float(x), Term::Float(y)) => x == y,
            (Term::Integer(i), Term::Float(x)) | (Term::Float(x), Term::Integer(i)) => {
                i as f64 == x
            }
            (Term::Compound(x), Term::Compound(y)) => {
                x.functor() == y.functor()
                    && x.arity() == y.arity()
                    && x.args().iter().zip(y.args()).all(|(p, q)| self.unify(p, q))
            }
            (_, _) => false,
        }
    }

    /// The current trail position. A choice point records this at entry
    /// and rewinds to it before every candidate trial and on backtrack.
    pub(crate) fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Unbinds every variable trailed after `mark`.
    pub(crate) fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(id) = self.trail.pop() {
                self.values[id as usize] = None;
            }
        }
    }
}
