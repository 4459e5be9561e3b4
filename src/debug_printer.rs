//! The deterministic text rendering used in diagnostics and asserted on in tests,
//! e.g. `(x : nat -> nat)` for a product and `x,0` for a local.
use crate::term::Term::*;
use crate::term::{Branch, FixFunction, FixGroup, FormalArg, Term, TermPtr};
use std::fmt;

fn fmt_binder_args(f: &mut fmt::Formatter<'_>, args: &[FormalArg], sep: &str) -> fmt::Result {
    for arg in args {
        if let Some(name) = arg.name() {
            write!(f, "{} : ", name)?;
        }
        write!(f, "{}{}", arg.type_, sep)?;
    }
    Ok(())
}

fn fmt_fix_function(f: &mut fmt::Formatter<'_>, function: &FixFunction) -> fmt::Result {
    write!(f, "{}", function.name)?;
    for arg in function.args.iter() {
        write!(f, " ({} : {})", arg.name().unwrap_or("_"), arg.type_)?;
    }
    write!(f, " : {} := {}", function.restype, function.body)
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Local { name, index } => write!(f, "{},{}", name, index),
            Global { name } => write!(f, "{}", name),
            Builtin { sort } => write!(f, "{}", sort.name()),
            Product { args, restype } => {
                write!(f, "(")?;
                fmt_binder_args(f, args, " -> ")?;
                write!(f, "{})", restype)
            }
            Lambda { args, body } => {
                write!(f, "(")?;
                fmt_binder_args(f, args, " => ")?;
                write!(f, "{})", body)
            }
            Let { varname, value, type_, body } =>
                write!(f, "let {} : {} := {} in ({})", varname.as_deref().unwrap_or("_"), type_, value, body),
            Apply { fun, args } => {
                write!(f, "({}", fun)?;
                for arg in args.iter() {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Cast { term, kind, typeterm } => write!(f, "Cast({},{},{})", term, kind.name(), typeterm),
            Match { casetype, arg, branches } => {
                write!(f, "match {} casetype {}", arg, casetype)?;
                for b in branches.iter() {
                    write!(f, "| {} {} => {}", b.constructor, b.nargs, b.expr)?;
                }
                write!(f, " end")
            }
            Fix { index, group } => {
                write!(f, "(fix ")?;
                for (i, function) in group.functions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " with ")?;
                    }
                    fmt_fix_function(f, function)?;
                }
                match group.function(*index) {
                    Some(selected) => write!(f, " for {})", selected.name),
                    None => write!(f, " for #{})", index),
                }
            }
        }
    }
}

impl fmt::Display for TermPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self.read(), f) }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self, f) }
}

impl fmt::Debug for TermPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(self.read(), f) }
}

impl fmt::Debug for FormalArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} : {})", self.name().unwrap_or("_"), self.type_)
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} => {}", self.constructor, self.nargs, self.expr)
    }
}

impl fmt::Debug for FixFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt_fix_function(f, self) }
}

impl fmt::Debug for FixGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(self.functions.iter()).finish() }
}

impl TermPtr {
    pub fn debug_string(&self) -> String { self.to_string() }
}
