//! Index arithmetic on terms: shifting, substitution, beta reduction at the head,
//! and queries about unbound references. All of it is expressed as handlers over
//! [`crate::transform`], so every operation agrees on where binders are.
use crate::stack::PStack;
use crate::term::Term::*;
use crate::term::{ mk_apply, mk_lambda, mk_local, FormalArg, TermPtr };
use crate::transform::{ transform, visit_transform, Binder, Transform };

struct Shift {
    limit : usize,
    delta : isize,
}

impl Transform for Shift {
    fn handle_local(&mut self, name : &str, index : usize, depth : usize) -> Option<TermPtr> {
        (index >= self.limit.saturating_add(depth)).then(|| mk_local(name, index.saturating_add_signed(self.delta)))
    }
}

struct LocalSubst<'s> {
    index : usize,
    subs : &'s [TermPtr],
}

impl<'s> Transform for LocalSubst<'s> {
    fn handle_local(&mut self, name : &str, index : usize, depth : usize) -> Option<TermPtr> {
        let lo = self.index.saturating_add(depth);
        if index < lo {
            None
        } else if index - lo < self.subs.len() {
            Some(self.subs[index - lo].shift(0, depth as isize))
        } else {
            Some(mk_local(name, index - self.subs.len()))
        }
    }
}

#[derive(Default)]
struct ExternalRefs {
    refs : Vec<usize>,
}

impl Transform for ExternalRefs {
    fn handle_local(&mut self, _name : &str, index : usize, depth : usize) -> Option<TermPtr> {
        if index >= depth {
            self.refs.push(index - depth);
        }
        None
    }
}

#[derive(Default)]
struct RefreshNames {
    names : PStack<Option<String>>,
}

impl Transform for RefreshNames {
    fn push_local(&mut self, binder : Binder<'_>) { self.names = self.names.push(binder.name.map(str::to_owned)); }

    fn pop_local(&mut self) { self.names = self.names.pop(); }

    fn depth_only(&self) -> bool { false }

    fn handle_local(&mut self, name : &str, index : usize, _depth : usize) -> Option<TermPtr> {
        match self.names.get(index) {
            Some(Some(binder_name)) if binder_name != name => Some(mk_local(binder_name, index)),
            _ => None,
        }
    }
}

impl TermPtr {
    /// Add `delta` to every local index `>= limit` (the limit grows as binders are
    /// crossed). Indices pushed below zero saturate.
    pub fn shift(&self, limit : usize, delta : isize) -> TermPtr {
        if delta == 0 {
            return self.clone()
        }
        transform(self, &mut Shift { limit, delta })
    }

    /// Replace the locals `index..index + subs.len()` by `subs`, slot `index + k`
    /// taking `subs[k]`, and close the gap left behind. For an application-order
    /// argument list, pass the arguments reversed.
    pub fn local_subst(&self, index : usize, subs : &[TermPtr]) -> TermPtr {
        if subs.is_empty() {
            return self.clone()
        }
        transform(self, &mut LocalSubst { index, subs })
    }

    /// The indices, relative to this term, of every local that is not bound inside
    /// it. Sorted, without duplicates.
    pub fn collect_external_references(&self) -> Vec<usize> {
        let mut v = ExternalRefs::default();
        let _ = visit_transform(self, &mut v);
        let mut refs = v.refs;
        refs.sort_unstable();
        refs.dedup();
        refs
    }

    /// Contract beta redexes at the head: `(fun xs => b) as` becomes `b` with the
    /// arguments substituted, keeping a residual lambda or application when the
    /// parameter and argument counts differ. Repeats until the head is no longer a
    /// redex; subterms are left alone.
    pub fn simpl(&self) -> TermPtr {
        let mut cur = self.clone();
        loop {
            let next = match cur.read() {
                Apply { fun, args } => match fun.read() {
                    Lambda { args : params, body } => beta(params, body, args),
                    _ => break,
                },
                _ => break,
            };
            cur = next;
        }
        cur
    }

    /// Rename every bound local to the display name of its binder.
    pub fn refresh_names(&self) -> TermPtr { transform(self, &mut RefreshNames::default()) }
}

fn beta(params : &[FormalArg], body : &TermPtr, args : &[TermPtr]) -> TermPtr {
    let n = params.len().min(args.len());
    let inner = if n < params.len() { mk_lambda(params[n..].to_vec(), body.clone()) } else { body.clone() };
    let subs = args[..n].iter().rev().cloned().collect::<Vec<_>>();
    mk_apply(inner.local_subst(0, &subs), args[n..].to_vec())
}
