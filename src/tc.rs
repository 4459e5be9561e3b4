//! The typing context and the global-name seam of the type checker. The per-kind
//! typing rules live in [`infer`].
use crate::env::GlobalEnv;
use crate::errors::IndexError;
use crate::scope::Scope;
use crate::stack::PStack;
use crate::term::{ mk_local, mk_product, FixGroup, FormalArg, TermPtr };
use std::sync::{ Arc, OnceLock };

pub mod infer;

/// Resolves global names to their types.
///
/// Any `Fn(&str) -> Option<TermPtr>` closure is a resolver; the global environment
/// built from declarations is another, and it can additionally tell inductive types
/// apart from other globals.
pub trait GlobalResolver : Send + Sync {
    fn global_type(&self, name : &str) -> Option<TermPtr>;

    /// `None` when the resolver does not know.
    fn is_inductive(&self, _name : &str) -> Option<bool> { None }
}

impl<F> GlobalResolver for F
where
    F : Fn(&str) -> Option<TermPtr> + Send + Sync,
{
    fn global_type(&self, name : &str) -> Option<TermPtr> { self(name) }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntry {
    pub name : Option<String>,
    /// Relative to the context the entry was pushed onto.
    pub type_ : TermPtr,
}

/// Local variable types plus a global resolver. Extending a context never changes
/// the context it was extended from.
#[derive(Clone)]
pub struct Context {
    locals : PStack<LocalEntry>,
    /// Built from `locals` on the first name lookup. Extending the context starts
    /// a fresh one, so pushes made while checking never touch it.
    names : OnceLock<Scope<Option<String>>>,
    globals : Arc<dyn GlobalResolver>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Context").field("locals", &self.locals).finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(globals : impl GlobalResolver + 'static) -> Self { Self::from_resolver(Arc::new(globals)) }

    pub fn from_resolver(globals : Arc<dyn GlobalResolver>) -> Self {
        Self { locals : PStack::new(), names : OnceLock::new(), globals }
    }

    pub fn from_env(env : Arc<GlobalEnv>) -> Self { Self::from_resolver(env) }

    /// A context with no locals that resolves no globals.
    pub fn empty() -> Self { Self::new(|_ : &str| -> Option<TermPtr> { None }) }

    pub fn push_local(&self, name : Option<&str>, type_ : TermPtr) -> Self {
        let entry = LocalEntry { name : name.map(str::to_owned), type_ };
        Self { locals : self.locals.push(entry), names : OnceLock::new(), globals : self.globals.clone() }
    }

    /// Push every argument in order, so the last one ends up at index 0.
    pub fn push_args(&self, args : &[FormalArg]) -> Self {
        args.iter().fold(self.clone(), |ctx, arg| ctx.push_local(arg.name(), arg.type_.clone()))
    }

    pub fn locals(&self) -> &PStack<LocalEntry> { &self.locals }

    /// The index of the innermost local called `name`, for resolving named
    /// references against this context.
    pub fn index_of(&self, name : &str) -> Option<usize> { self.scope().index_of(&Some(name.to_owned())) }

    fn scope(&self) -> &Scope<Option<String>> {
        self.names.get_or_init(|| {
            let mut names = self.locals.iter().map(|entry| entry.name.clone()).collect::<Vec<_>>();
            names.reverse();
            names.into_iter().fold(Scope::new(), |scope, name| scope.push(name))
        })
    }

    /// A local reference to the innermost binder called `name`.
    pub fn local_named(&self, name : &str) -> Option<TermPtr> {
        self.index_of(name).map(|index| mk_local(name, index))
    }

    pub fn global_type(&self, name : &str) -> Option<TermPtr> { self.globals.global_type(name) }

    pub fn is_inductive(&self, name : &str) -> Option<bool> { self.globals.is_inductive(name) }

    /// The type of local `index`, re-expressed relative to this context.
    pub fn local_type(&self, index : usize) -> Result<TermPtr, IndexError> {
        let entry = self.locals.at(index)?;
        Ok(entry.type_.shift(0, index as isize + 1))
    }
}

impl FixGroup {
    /// The type of function `index` with the bundle's own binders removed, i.e. as
    /// it would be stated outside the fixpoint.
    pub fn function_signature(&self, index : usize) -> Option<TermPtr> {
        let function = self.function(index)?;
        let signature = if function.args.is_empty() {
            function.restype.clone()
        } else {
            mk_product(function.args.clone(), function.restype.clone())
        };
        Some(signature.shift(0, -(self.len() as isize)))
    }
}
