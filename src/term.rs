use std::sync::Arc;

use Term::*;

/// The four builtin sorts. These are plain values; two sorts are equal iff they
/// are the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Set,
    Prop,
    SProp,
    Type,
}

impl Sort {
    pub fn name(self) -> &'static str {
        match self {
            Sort::Set => "Set",
            Sort::Prop => "Prop",
            Sort::SProp => "SProp",
            Sort::Type => "Type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    VmCast,
    DefaultCast,
    RevertCast,
    NativeCast,
}

impl CastKind {
    pub fn name(self) -> &'static str {
        match self {
            CastKind::VmCast => "VMcast",
            CastKind::DefaultCast => "DEFAULTcast",
            CastKind::RevertCast => "REVERTcast",
            CastKind::NativeCast => "NATIVEcast",
        }
    }
}

/// A bound parameter of a `Product`, `Lambda` or fixpoint function.
/// The name is for display only; equality looks at the type alone.
#[derive(Clone)]
pub struct FormalArg {
    pub name : Option<String>,
    pub type_ : TermPtr,
}

impl FormalArg {
    pub fn new(name : Option<&str>, type_ : TermPtr) -> Self { Self { name : name.map(str::to_owned), type_ } }

    pub fn named(name : &str, type_ : TermPtr) -> Self { Self::new(Some(name), type_) }

    pub fn anon(type_ : TermPtr) -> Self { Self::new(None, type_) }

    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
}

impl PartialEq for FormalArg {
    fn eq(&self, other : &Self) -> bool { self.type_ == other.type_ }
}

/// One arm of a `Match`. `expr` sits under `nargs` binders, one per constructor field.
#[derive(Clone, PartialEq)]
pub struct Branch {
    pub constructor : String,
    pub nargs : usize,
    pub expr : TermPtr,
}

impl Branch {
    pub fn new(constructor : &str, nargs : usize, expr : TermPtr) -> Self {
        Self { constructor : constructor.to_owned(), nargs, expr }
    }
}

#[derive(Clone)]
pub struct FixFunction {
    pub name : String,
    pub args : Vec<FormalArg>,
    pub restype : TermPtr,
    pub body : TermPtr,
}

impl FixFunction {
    pub fn new(name : &str, args : Vec<FormalArg>, restype : TermPtr, body : TermPtr) -> Self {
        Self { name : name.to_owned(), args, restype, body }
    }

    pub fn arity(&self) -> usize { self.args.len() }
}

impl PartialEq for FixFunction {
    fn eq(&self, other : &Self) -> bool {
        self.args == other.args && self.restype == other.restype && self.body == other.body
    }
}

/// A bundle of mutually recursive functions. Inside every function, the bundle's own
/// functions are bound first (the last-listed function is index 0), with the
/// function's own arguments bound below them.
#[derive(Clone, PartialEq)]
pub struct FixGroup {
    pub functions : Vec<FixFunction>,
}

impl FixGroup {
    pub fn new(functions : Vec<FixFunction>) -> Arc<Self> { Arc::new(Self { functions }) }

    pub fn len(&self) -> usize { self.functions.len() }

    pub fn is_empty(&self) -> bool { self.functions.is_empty() }

    pub fn function(&self, index : usize) -> Option<&FixFunction> { self.functions.get(index) }
}

pub enum Term {
    Local { name : String, index : usize },
    Global { name : String },
    Builtin { sort : Sort },
    Product { args : Vec<FormalArg>, restype : TermPtr },
    Lambda { args : Vec<FormalArg>, body : TermPtr },
    Let { varname : Option<String>, value : TermPtr, type_ : TermPtr, body : TermPtr },
    Apply { fun : TermPtr, args : Vec<TermPtr> },
    Cast { term : TermPtr, kind : CastKind, typeterm : TermPtr },
    Match { casetype : TermPtr, arg : TermPtr, branches : Vec<Branch> },
    Fix { index : usize, group : Arc<FixGroup> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Local,
    Global,
    Builtin,
    Product,
    Lambda,
    Let,
    Apply,
    Cast,
    Match,
    Fix,
}

/// Equality up to display names: binder names, local names, let variable names and
/// fixpoint function names are ignored.
impl PartialEq for Term {
    fn eq(&self, other : &Self) -> bool {
        match (self, other) {
            (Local { index : i1, .. }, Local { index : i2, .. }) => i1 == i2,
            (Global { name : n1 }, Global { name : n2 }) => n1 == n2,
            (Builtin { sort : s1 }, Builtin { sort : s2 }) => s1 == s2,
            (Product { args : a1, restype : r1 }, Product { args : a2, restype : r2 }) => a1 == a2 && r1 == r2,
            (Lambda { args : a1, body : b1 }, Lambda { args : a2, body : b2 }) => a1 == a2 && b1 == b2,
            (
                Let { value : v1, type_ : t1, body : b1, .. },
                Let { value : v2, type_ : t2, body : b2, .. },
            ) => v1 == v2 && t1 == t2 && b1 == b2,
            (Apply { fun : f1, args : a1 }, Apply { fun : f2, args : a2 }) => f1 == f2 && a1 == a2,
            (
                Cast { term : x1, kind : k1, typeterm : t1 },
                Cast { term : x2, kind : k2, typeterm : t2 },
            ) => k1 == k2 && x1 == x2 && t1 == t2,
            (
                Match { casetype : c1, arg : a1, branches : b1 },
                Match { casetype : c2, arg : a2, branches : b2 },
            ) => a1 == a2 && c1 == c2 && b1 == b2,
            (Fix { index : i1, group : g1 }, Fix { index : i2, group : g2 }) =>
                i1 == i2 && (Arc::ptr_eq(g1, g2) || g1 == g2),
            _ => false,
        }
    }
}

impl Eq for Term {}

/// A shared handle to an immutable term node.
#[derive(Clone)]
pub struct TermPtr(Arc<Term>);

impl PartialEq for TermPtr {
    fn eq(&self, other : &Self) -> bool { self.ptr_eq(other) || *self.0 == *other.0 }
}

impl Eq for TermPtr {}

impl std::ops::Deref for TermPtr {
    type Target = Term;
    fn deref(&self) -> &Term { &self.0 }
}

impl From<Term> for TermPtr {
    fn from(t : Term) -> Self { TermPtr(Arc::new(t)) }
}

impl TermPtr {
    pub fn read(&self) -> &Term { &self.0 }

    /// Identity, as opposed to the structural `==`.
    pub fn ptr_eq(&self, other : &TermPtr) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    pub fn kind(&self) -> TermKind {
        match self.read() {
            Local { .. } => TermKind::Local,
            Global { .. } => TermKind::Global,
            Builtin { .. } => TermKind::Builtin,
            Product { .. } => TermKind::Product,
            Lambda { .. } => TermKind::Lambda,
            Let { .. } => TermKind::Let,
            Apply { .. } => TermKind::Apply,
            Cast { .. } => TermKind::Cast,
            Match { .. } => TermKind::Match,
            Fix { .. } => TermKind::Fix,
        }
    }

    pub fn as_local(&self) -> Option<(&str, usize)> {
        match self.read() {
            Local { name, index } => Some((name, *index)),
            _ => None,
        }
    }

    pub fn as_global(&self) -> Option<&str> {
        match self.read() {
            Global { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_builtin(&self) -> Option<Sort> {
        match self.read() {
            Builtin { sort } => Some(*sort),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<(&[FormalArg], &TermPtr)> {
        match self.read() {
            Product { args, restype } => Some((args, restype)),
            _ => None,
        }
    }

    pub fn as_lambda(&self) -> Option<(&[FormalArg], &TermPtr)> {
        match self.read() {
            Lambda { args, body } => Some((args, body)),
            _ => None,
        }
    }

    /// `(varname, value, type, body)`
    pub fn as_let(&self) -> Option<(Option<&str>, &TermPtr, &TermPtr, &TermPtr)> {
        match self.read() {
            Let { varname, value, type_, body } => Some((varname.as_deref(), value, type_, body)),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<(&TermPtr, &[TermPtr])> {
        match self.read() {
            Apply { fun, args } => Some((fun, args)),
            _ => None,
        }
    }

    pub fn as_cast(&self) -> Option<(&TermPtr, CastKind, &TermPtr)> {
        match self.read() {
            Cast { term, kind, typeterm } => Some((term, *kind, typeterm)),
            _ => None,
        }
    }

    /// `(casetype, arg, branches)`
    pub fn as_match(&self) -> Option<(&TermPtr, &TermPtr, &[Branch])> {
        match self.read() {
            Match { casetype, arg, branches } => Some((casetype, arg, branches)),
            _ => None,
        }
    }

    pub fn as_fix(&self) -> Option<(usize, &Arc<FixGroup>)> {
        match self.read() {
            Fix { index, group } => Some((*index, group)),
            _ => None,
        }
    }

    /// The function selected by a `Fix` node, if the index is in range.
    pub fn fix_function(&self) -> Option<&FixFunction> {
        self.as_fix().and_then(|(index, group)| group.function(index))
    }

    /// Decompose nested applications `((f a) b) c` into `f` and `[a, b, c]`.
    pub fn unfold_apps(&self) -> (&TermPtr, Vec<&TermPtr>) {
        let mut head = self;
        let mut chunks = Vec::new();
        while let Apply { fun, args } = head.read() {
            chunks.push(args);
            head = fun;
        }
        (head, chunks.into_iter().rev().flatten().collect())
    }
}

pub fn mk_local(name : &str, index : usize) -> TermPtr { Local { name : name.to_owned(), index }.into() }

pub fn mk_global(name : &str) -> TermPtr { Global { name : name.to_owned() }.into() }

pub fn mk_sort(sort : Sort) -> TermPtr { Builtin { sort }.into() }

pub fn mk_set() -> TermPtr { mk_sort(Sort::Set) }

pub fn mk_prop() -> TermPtr { mk_sort(Sort::Prop) }

pub fn mk_sprop() -> TermPtr { mk_sort(Sort::SProp) }

pub fn mk_type() -> TermPtr { mk_sort(Sort::Type) }

pub fn mk_product(args : Vec<FormalArg>, restype : TermPtr) -> TermPtr { Product { args, restype }.into() }

pub fn mk_lambda(args : Vec<FormalArg>, body : TermPtr) -> TermPtr { Lambda { args, body }.into() }

pub fn mk_let(varname : Option<&str>, value : TermPtr, type_ : TermPtr, body : TermPtr) -> TermPtr {
    Let { varname : varname.map(str::to_owned), value, type_, body }.into()
}

/// An application with no arguments is just its function.
pub fn mk_apply(fun : TermPtr, args : Vec<TermPtr>) -> TermPtr {
    if args.is_empty() {
        fun
    } else {
        Apply { fun, args }.into()
    }
}

pub fn mk_cast(term : TermPtr, kind : CastKind, typeterm : TermPtr) -> TermPtr { Cast { term, kind, typeterm }.into() }

pub fn mk_match(casetype : TermPtr, arg : TermPtr, branches : Vec<Branch>) -> TermPtr {
    Match { casetype, arg, branches }.into()
}

pub fn mk_fix(index : usize, group : Arc<FixGroup>) -> TermPtr { Fix { index, group }.into() }
