//! Specialization of a fixpoint bundle on constant arguments.
//!
//! Specialization happens in two steps. [`compute_closure`] starts from one function
//! and a choice of which of its parameters become constants, then follows every
//! recursive call through the bundle to find out what that choice forces on the
//! other functions. It fails when two call sites disagree. [`apply_specialization`]
//! then rewrites the bundle, dropping the specialized parameters and putting the
//! constants in their place.
use crate::stack::PStack;
use crate::term::Term::*;
use crate::term::{ mk_apply, mk_lambda, mk_local, FixFunction, FixGroup, FormalArg, TermPtr };
use crate::transform::{ transform, Transform };
use log::debug;
use std::sync::Arc;

/// For each formal argument of one function: `Some(slot)` if it is replaced by the
/// constant in `slot`, `None` if it stays a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub spec_args : Vec<Option<usize>>,
}

impl FunctionSpec {
    pub fn new(spec_args : Vec<Option<usize>>) -> Self { Self { spec_args } }

    pub fn kept_count(&self) -> usize { self.spec_args.iter().filter(|s| s.is_none()).count() }
}

/// One consistent [`FunctionSpec`] per function of the bundle, in bundle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecInfo {
    pub functions : Vec<FunctionSpec>,
}

/// What the closure walk knows about a local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sym {
    FixFunction(usize),
    SpecArg(usize),
    Unknown,
}

struct ClosureState<'g> {
    group : &'g FixGroup,
    call_state : Vec<Option<FunctionSpec>>,
    newly_added : Vec<usize>,
    inconsistent : bool,
}

impl<'g> ClosureState<'g> {
    fn add_call_state(&mut self, index : usize, spec : FunctionSpec) {
        match &self.call_state[index] {
            Some(existing) if *existing != spec => {
                debug!(
                    "conflicting specializations of `{}`: {:?} vs {:?}",
                    self.group.functions[index].name, existing.spec_args, spec.spec_args
                );
                self.inconsistent = true;
            }
            Some(_) => {}
            None => {
                debug!("queueing `{}` with {:?}", self.group.functions[index].name, spec.spec_args);
                self.call_state[index] = Some(spec);
                self.newly_added.push(index);
            }
        }
    }

    fn walk(&mut self, term : &TermPtr, locals : &PStack<Sym>, apply_args : &PStack<Sym>) -> Sym {
        match term.read() {
            Local { name, index } => match locals.get(*index) {
                Some(Sym::FixFunction(f)) => {
                    let arity = self.group.functions[*f].arity();
                    if apply_args.len() >= arity {
                        let spec_args = apply_args
                            .iter()
                            .take(arity)
                            .map(|s| match s {
                                Sym::SpecArg(slot) => Some(*slot),
                                _ => None,
                            })
                            .collect();
                        self.add_call_state(*f, FunctionSpec::new(spec_args));
                    } else {
                        debug!("`{}` is used with {} of its {} arguments", name, apply_args.len(), arity);
                        self.inconsistent = true;
                    }
                    Sym::FixFunction(*f)
                }
                Some(sym) => *sym,
                None => Sym::Unknown,
            },
            Global { .. } | Builtin { .. } | Product { .. } => Sym::Unknown,
            Lambda { args, body } => {
                let inner = args.iter().fold(locals.clone(), |acc, _| acc.push(Sym::Unknown));
                self.walk(body, &inner, &PStack::new());
                Sym::Unknown
            }
            Let { value, body, .. } => {
                let value_sym = self.walk(value, locals, &PStack::new());
                self.walk(body, &locals.push(value_sym), apply_args)
            }
            Apply { fun, args } => {
                let mut fun_args = apply_args.clone();
                for arg in args.iter().rev() {
                    fun_args = fun_args.push(self.walk(arg, locals, &PStack::new()));
                }
                self.walk(fun, locals, &fun_args);
                Sym::Unknown
            }
            Cast { term, .. } => self.walk(term, locals, apply_args),
            Match { arg, branches, .. } => {
                self.walk(arg, locals, &PStack::new());
                for b in branches.iter() {
                    let inner = (0..b.nargs).fold(locals.clone(), |acc, _| acc.push(Sym::Unknown));
                    self.walk(&b.expr, &inner, apply_args);
                }
                Sym::Unknown
            }
            Fix { .. } => {
                for extref in term.collect_external_references() {
                    if let Some(Sym::FixFunction(f)) = locals.get(extref) {
                        debug!("`{}` is referenced from a nested fixpoint", self.group.functions[*f].name);
                        self.inconsistent = true;
                    }
                }
                Sym::Unknown
            }
        }
    }
}

/// Find the specialization of every function in `group` implied by specializing
/// function `seed_index` according to `seed_pattern`.
///
/// Returns `None` when recursive calls demand conflicting specializations of one
/// function, when some function is never reached from the seed, or when a bundle
/// function is used other than in a saturated call (including from inside a
/// nested fixpoint).
pub fn compute_closure(group : &FixGroup, seed_index : usize, seed_pattern : Vec<Option<usize>>) -> Option<SpecInfo> {
    let Some(seed) = group.function(seed_index) else {
        debug!("seed index {} out of range for a bundle of {}", seed_index, group.len());
        return None
    };
    if seed.arity() != seed_pattern.len() {
        debug!("seed pattern {:?} does not fit `{}` with {} arguments", seed_pattern, seed.name, seed.arity());
        return None
    }

    let mut state =
        ClosureState { group, call_state : vec![None; group.len()], newly_added : Vec::new(), inconsistent : false };
    state.add_call_state(seed_index, FunctionSpec::new(seed_pattern));

    let fix_locals = (0..group.len()).map(Sym::FixFunction).collect::<PStack<_>>();
    let mut needs_processing = std::mem::take(&mut state.newly_added);
    while let Some(index) = needs_processing.pop() {
        let Some(spec) = state.call_state[index].clone() else { continue };
        let locals = spec.spec_args.iter().fold(fix_locals.clone(), |acc, arg| {
            acc.push(match arg {
                Some(slot) => Sym::SpecArg(*slot),
                None => Sym::Unknown,
            })
        });
        state.walk(&group.functions[index].body, &locals, &PStack::new());
        if state.inconsistent {
            return None
        }
        needs_processing.append(&mut state.newly_added);
    }

    let functions = state.call_state.into_iter().collect::<Option<Vec<_>>>();
    match functions {
        Some(functions) => {
            debug!("specialization closure: {:?}", functions);
            Some(SpecInfo { functions })
        }
        None => {
            debug!("not every function of the bundle is reached from the seed");
            None
        }
    }
}

/// Rewrites the functions of a bundle with specialized parameters removed.
///
/// Works on the term under the binders `[enclosing context, bundle, the first
/// pattern.len() arguments of one function]`; the result lives under `[enclosing
/// context, new bundle, the kept ones among those arguments]`.
struct Specializer<'a> {
    pattern : &'a [Option<usize>],
    kept : usize,
    bundle : usize,
    constants : &'a [TermPtr],
    /// Per function, in the new bundle's context: a lambda over all of the old
    /// parameters that calls the new function on the kept ones.
    replacements : &'a [TermPtr],
}

impl<'a> Specializer<'a> {
    fn new(pattern : &'a [Option<usize>], bundle : usize, constants : &'a [TermPtr], replacements : &'a [TermPtr]) -> Self {
        let kept = pattern.iter().filter(|s| s.is_none()).count();
        Self { pattern, kept, bundle, constants, replacements }
    }
}

impl<'a> Transform for Specializer<'a> {
    fn handle_local(&mut self, name : &str, index : usize, depth : usize) -> Option<TermPtr> {
        let j = index.checked_sub(depth)?;
        let k = self.pattern.len();
        let new_index = if j < k {
            let pos = k - 1 - j;
            match self.pattern[pos] {
                Some(slot) => return Some(self.constants[slot].shift(0, (depth + self.kept + self.bundle) as isize)),
                None => depth + self.pattern[pos + 1..].iter().filter(|s| s.is_none()).count(),
            }
        } else if j < k + self.bundle {
            let g = self.bundle - 1 - (j - k);
            return Some(self.replacements[g].shift(0, (depth + self.kept) as isize))
        } else {
            index - (k - self.kept)
        };
        (new_index != index).then(|| mk_local(name, new_index))
    }

    fn handle_apply(&mut self, fun : &TermPtr, args : &[TermPtr], _depth : usize) -> Option<TermPtr> {
        fun.as_lambda()?;
        Some(mk_apply(fun.clone(), args.to_vec()).simpl())
    }
}

fn replacement(g : usize, bundle : usize, function : &FixFunction, spec : &FunctionSpec, name : &str) -> TermPtr {
    let k = function.arity();
    let kept = function
        .args
        .iter()
        .zip(spec.spec_args.iter())
        .enumerate()
        .filter(|(_, (_, s))| s.is_none())
        .map(|(p, (arg, _))| mk_local(arg.name().unwrap_or("_"), k - 1 - p))
        .collect::<Vec<_>>();
    let call = mk_apply(mk_local(name, k + bundle - 1 - g), kept);
    if k == 0 {
        call
    } else {
        mk_lambda(function.args.clone(), call)
    }
}

/// Rewrite `group` according to `info`, a successful result of [`compute_closure`]
/// on the same group. Constant slot `i` is filled with `constants[i]`, a term in the
/// context enclosing the fixpoint. The `i`-th function of the result is named
/// `namer(i)`.
///
/// # Panics
///
/// If `info` does not describe `group`, or refers to a constant slot that
/// `constants` does not have.
pub fn apply_specialization(
    group : &FixGroup,
    info : &SpecInfo,
    constants : &[TermPtr],
    namer : impl Fn(usize) -> String,
) -> Arc<FixGroup> {
    assert_eq!(group.len(), info.functions.len(), "apply_specialization; info does not match the bundle");
    let bundle = group.len();
    let names = (0..bundle).map(namer).collect::<Vec<_>>();
    let replacements = group
        .functions
        .iter()
        .zip(info.functions.iter())
        .enumerate()
        .map(|(g, (function, spec))| replacement(g, bundle, function, spec, &names[g]))
        .collect::<Vec<_>>();

    let functions = group
        .functions
        .iter()
        .zip(info.functions.iter())
        .zip(names)
        .map(|((function, spec), name)| {
            assert_eq!(function.arity(), spec.spec_args.len(), "apply_specialization; pattern does not fit `{}`", function.name);
            let args = function
                .args
                .iter()
                .enumerate()
                .filter(|(p, _)| spec.spec_args[*p].is_none())
                .map(|(p, arg)| {
                    let mut v = Specializer::new(&spec.spec_args[..p], bundle, constants, &replacements);
                    FormalArg { name : arg.name.clone(), type_ : transform(&arg.type_, &mut v) }
                })
                .collect::<Vec<_>>();
            let mut v = Specializer::new(&spec.spec_args, bundle, constants, &replacements);
            let restype = transform(&function.restype, &mut v);
            let body = transform(&function.body, &mut v);
            FixFunction { name, args, restype, body }
        })
        .collect::<Vec<_>>();
    FixGroup::new(functions)
}
