//! Module-level declarations and the global environment built from them.
use crate::errors::TypeError;
use crate::tc::{ Context, GlobalResolver };
use crate::term::TermPtr;
use crate::util::{ new_fx_index_map, FxIndexMap };
use log::debug;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub id : String,
    pub type_ : TermPtr,
}

/// One type of a (possibly mutual) inductive block.
#[derive(Debug, Clone, PartialEq)]
pub struct OneInductive {
    pub id : String,
    pub type_ : TermPtr,
    pub constructors : Vec<Constructor>,
}

/// A module path applied to arguments, e.g. `Make Nat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModExpr {
    pub name : String,
    pub args : Vec<String>,
}

impl ModExpr {
    pub fn new(name : &str, args : &[&str]) -> Self {
        Self { name : name.to_owned(), args : args.iter().map(|s| s.to_string()).collect() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleRepr {
    Algebraic(ModExpr),
    Struct { type_ : Option<ModExpr>, body : Vec<Declar> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleBody {
    /// Functor parameters with their module types.
    pub parameters : Vec<(String, ModExpr)>,
    pub repr : ModuleRepr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declar {
    Definition { id : String, type_ : TermPtr, value : TermPtr },
    Axiom { id : String, type_ : TermPtr },
    Inductive(Vec<OneInductive>),
    Module { id : String, body : ModuleBody },
    ModuleType { id : String, body : ModuleBody },
}

impl fmt::Display for ModExpr {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Display for ModuleBody {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, type_) in self.parameters.iter() {
            write!(f, " ({} : {})", name, type_)?;
        }
        match &self.repr {
            ModuleRepr::Algebraic(expr) => write!(f, " := {}", expr),
            ModuleRepr::Struct { type_, body } => {
                if let Some(type_) = type_ {
                    write!(f, " <: {}", type_)?;
                }
                writeln!(f, ".")?;
                for d in body.iter() {
                    writeln!(f, "{}", d)?;
                }
                write!(f, "End")
            }
        }
    }
}

impl fmt::Display for Declar {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declar::Definition { id, type_, value } => write!(f, "Definition {} : {} := {}.", id, type_, value),
            Declar::Axiom { id, type_ } => write!(f, "Axiom {} : {}.", id, type_),
            Declar::Inductive(inds) => {
                for (i, ind) in inds.iter().enumerate() {
                    write!(f, "{} {} : {} :=", if i == 0 { "Inductive" } else { "with" }, ind.id, ind.type_)?;
                    for c in ind.constructors.iter() {
                        write!(f, "\n | {} : {}", c.id, c.type_)?;
                    }
                    writeln!(f)?;
                }
                write!(f, ".")
            }
            Declar::Module { id, body } => write!(f, "Module {}{}.", id, body),
            Declar::ModuleType { id, body } => write!(f, "Module Type {}{}.", id, body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKind {
    Definition,
    Axiom,
    Inductive,
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEntry {
    pub kind : GlobalKind,
    pub type_ : TermPtr,
    pub value : Option<TermPtr>,
    /// Qualified constructor names, for inductive types.
    pub constructors : Vec<String>,
}

/// Every global introduced by a list of declarations, in declaration order.
/// Members of structural modules are qualified with the module path (`M.x`);
/// module types and algebraic modules introduce no globals.
#[derive(Debug, Clone, Default)]
pub struct GlobalEnv {
    entries : FxIndexMap<String, GlobalEntry>,
}

impl GlobalEnv {
    pub fn from_declars(declars : &[Declar]) -> Self {
        let mut env = GlobalEnv { entries : new_fx_index_map() };
        env.add_declars("", declars);
        env
    }

    fn add_declars(&mut self, prefix : &str, declars : &[Declar]) {
        for d in declars {
            match d {
                Declar::Definition { id, type_, value } =>
                    self.insert(prefix, id, GlobalKind::Definition, type_, Some(value.clone()), Vec::new()),
                Declar::Axiom { id, type_ } => self.insert(prefix, id, GlobalKind::Axiom, type_, None, Vec::new()),
                Declar::Inductive(inds) => {
                    for ind in inds {
                        let constructors = ind.constructors.iter().map(|c| format!("{}{}", prefix, c.id)).collect();
                        self.insert(prefix, &ind.id, GlobalKind::Inductive, &ind.type_, None, constructors);
                    }
                    for c in inds.iter().flat_map(|ind| ind.constructors.iter()) {
                        self.insert(prefix, &c.id, GlobalKind::Constructor, &c.type_, None, Vec::new());
                    }
                }
                Declar::Module { id, body : ModuleBody { repr : ModuleRepr::Struct { body, .. }, .. } } =>
                    self.add_declars(&format!("{}{}.", prefix, id), body),
                Declar::Module { .. } | Declar::ModuleType { .. } => {}
            }
        }
    }

    fn insert(
        &mut self,
        prefix : &str,
        id : &str,
        kind : GlobalKind,
        type_ : &TermPtr,
        value : Option<TermPtr>,
        constructors : Vec<String>,
    ) {
        let entry = GlobalEntry { kind, type_ : type_.clone(), value, constructors };
        self.entries.insert(format!("{}{}", prefix, id), entry);
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, name : &str) -> Option<&GlobalEntry> { self.entries.get(name) }

    pub fn constructors(&self, name : &str) -> Option<&[String]> {
        self.get(name).filter(|e| e.kind == GlobalKind::Inductive).map(|e| e.constructors.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.entries.keys().map(String::as_str) }

    /// Check every declared type and every definition body against `env` itself.
    /// Returns the failures, in declaration order.
    pub fn check_declars(env : &Arc<GlobalEnv>) -> Vec<(String, TypeError)> {
        let ctx = Context::from_env(env.clone());
        let mut failures = Vec::new();
        for (name, entry) in env.entries.iter() {
            let result = entry.type_.check(&ctx).and_then(|_| match &entry.value {
                Some(value) => value.check(&ctx).map(|_| ()),
                None => Ok(()),
            });
            if let Err(e) = result {
                debug!("declaration `{}` failed to check: {}", name, e);
                failures.push((name.clone(), e));
            }
        }
        failures
    }
}

impl GlobalResolver for GlobalEnv {
    fn global_type(&self, name : &str) -> Option<TermPtr> { self.get(name).map(|e| e.type_.clone()) }

    fn is_inductive(&self, name : &str) -> Option<bool> { self.get(name).map(|e| e.kind == GlobalKind::Inductive) }
}
