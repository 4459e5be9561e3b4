//! The bottom-up rewriting traversal shared by every index-manipulating operation.
//!
//! A [`Transform`] supplies one handler per term kind. [`visit_transform`] walks the
//! term, transforms all children first, then offers the node (with its transformed
//! children) to the handler. A handler returns `Some` to replace the node or `None`
//! to decline; on decline the node is rebuilt only if some child changed.
//!
//! Binders are entered in one fixed order, and every handler is told the binder
//! depth of the node it is looking at:
//! + `Product`/`Lambda`: each argument type is visited, then its binder is pushed;
//!   the result/body sees all arguments.
//! + `Let`: value and type under no new binder, body under one.
//! + `Match`: `arg` under no new binder, `casetype` under one (the scrutinee),
//!   each branch under `nargs` (the constructor fields).
//! + `Fix`: every function of the bundle is pushed in listing order, then each
//!   function's own arguments as for a `Lambda`; restype and body see them all.
use crate::term::Term::*;
use crate::term::{ mk_apply, mk_cast, mk_fix, mk_lambda, mk_let, mk_match, mk_product,
                   Branch, CastKind, FixFunction, FixGroup, FormalArg, Sort, TermPtr };
use crate::util::{ new_fx_hash_map, FxHashMap };
use std::sync::Arc;

/// A variable being brought into scope.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    pub name : Option<&'a str>,
    /// The declared type, for binders that have one. The type is the one found in the
    /// input term, before transformation.
    pub type_ : Option<&'a TermPtr>,
}

#[allow(unused_variables)]
pub trait Transform {
    fn push_local(&mut self, binder : Binder<'_>) {}
    fn pop_local(&mut self) {}

    fn handle_local(&mut self, name : &str, index : usize, depth : usize) -> Option<TermPtr> { None }
    fn handle_global(&mut self, name : &str, depth : usize) -> Option<TermPtr> { None }
    fn handle_builtin(&mut self, sort : Sort, depth : usize) -> Option<TermPtr> { None }
    fn handle_product(&mut self, args : &[FormalArg], restype : &TermPtr, depth : usize) -> Option<TermPtr> { None }
    fn handle_lambda(&mut self, args : &[FormalArg], body : &TermPtr, depth : usize) -> Option<TermPtr> { None }
    fn handle_let(
        &mut self,
        varname : Option<&str>,
        value : &TermPtr,
        type_ : &TermPtr,
        body : &TermPtr,
        depth : usize,
    ) -> Option<TermPtr> {
        None
    }
    fn handle_apply(&mut self, fun : &TermPtr, args : &[TermPtr], depth : usize) -> Option<TermPtr> { None }
    fn handle_cast(&mut self, term : &TermPtr, kind : CastKind, typeterm : &TermPtr, depth : usize) -> Option<TermPtr> {
        None
    }
    fn handle_match(
        &mut self,
        casetype : &TermPtr,
        arg : &TermPtr,
        branches : &[Branch],
        depth : usize,
    ) -> Option<TermPtr> {
        None
    }
    fn handle_fix(&mut self, index : usize, group : &Arc<FixGroup>, depth : usize) -> Option<TermPtr> { None }

    /// Whether the rewrite of a subterm depends only on the subterm and its depth.
    /// When it does, a fixpoint bundle reached twice at one depth is rewritten once
    /// and both selections share the result. Visitors whose handlers read state
    /// gathered in `push_local` must return `false`.
    fn depth_only(&self) -> bool { true }
}

/// Run `visitor` over `term`. Returns `None` if nothing changed.
pub fn visit_transform<V : Transform + ?Sized>(term : &TermPtr, visitor : &mut V) -> Option<TermPtr> {
    Traversal { visitor, depth : 0, fix_memo : new_fx_hash_map() }.visit(term)
}

/// Like [`visit_transform`], but hands back the (identical) input when nothing changed.
pub fn transform<V : Transform + ?Sized>(term : &TermPtr, visitor : &mut V) -> TermPtr {
    visit_transform(term, visitor).unwrap_or_else(|| term.clone())
}

struct Traversal<'v, V : ?Sized> {
    visitor : &'v mut V,
    depth : usize,
    /// Rewritten fixpoint bundles, keyed by the address of the original bundle and the
    /// depth it was reached at, so that every `Fix` selecting into one bundle keeps
    /// selecting into one bundle. Only used when the visitor is `depth_only`.
    fix_memo : FxHashMap<(usize, usize), Arc<FixGroup>>,
}

impl<'v, V : Transform + ?Sized> Traversal<'v, V> {
    fn push(&mut self, binder : Binder<'_>) {
        self.visitor.push_local(binder);
        self.depth += 1;
    }

    fn pop(&mut self, n : usize) {
        for _ in 0..n {
            self.visitor.pop_local();
        }
        self.depth -= n;
    }

    fn visit_all(&mut self, terms : &[TermPtr]) -> Option<Vec<TermPtr>> {
        let mut out : Option<Vec<TermPtr>> = None;
        for (i, t) in terms.iter().enumerate() {
            if let Some(t) = self.visit(t) {
                out.get_or_insert_with(|| terms.to_vec())[i] = t;
            }
        }
        out
    }

    /// Visits the argument types left to right, pushing each binder after its type.
    /// The caller pops them.
    fn visit_args(&mut self, args : &[FormalArg]) -> Option<Vec<FormalArg>> {
        let mut out : Option<Vec<FormalArg>> = None;
        for (i, arg) in args.iter().enumerate() {
            if let Some(type_) = self.visit(&arg.type_) {
                out.get_or_insert_with(|| args.to_vec())[i] = FormalArg { name : arg.name.clone(), type_ };
            }
            self.push(Binder { name : arg.name(), type_ : Some(&arg.type_) });
        }
        out
    }

    fn visit_group(&mut self, group : &Arc<FixGroup>) -> Arc<FixGroup> {
        let key = (Arc::as_ptr(group) as usize, self.depth);
        let memoize = self.visitor.depth_only();
        if let Some(cached) = self.fix_memo.get(&key).filter(|_| memoize) {
            return cached.clone()
        }
        for function in group.functions.iter() {
            self.push(Binder { name : Some(&function.name), type_ : None });
        }
        let mut functions : Option<Vec<FixFunction>> = None;
        for (i, function) in group.functions.iter().enumerate() {
            let args = self.visit_args(&function.args);
            let restype = self.visit(&function.restype);
            let body = self.visit(&function.body);
            self.pop(function.args.len());
            if args.is_some() || restype.is_some() || body.is_some() {
                functions.get_or_insert_with(|| group.functions.clone())[i] = FixFunction {
                    name : function.name.clone(),
                    args : args.unwrap_or_else(|| function.args.clone()),
                    restype : restype.unwrap_or_else(|| function.restype.clone()),
                    body : body.unwrap_or_else(|| function.body.clone()),
                };
            }
        }
        self.pop(group.functions.len());
        let out = functions.map(FixGroup::new).unwrap_or_else(|| group.clone());
        if memoize {
            self.fix_memo.insert(key, out.clone());
        }
        out
    }

    fn visit(&mut self, term : &TermPtr) -> Option<TermPtr> {
        let depth = self.depth;
        match term.read() {
            Local { name, index } => self.visitor.handle_local(name, *index, depth),
            Global { name } => self.visitor.handle_global(name, depth),
            Builtin { sort } => self.visitor.handle_builtin(*sort, depth),
            Product { args, restype } => {
                let new_args = self.visit_args(args);
                let new_restype = self.visit(restype);
                self.pop(args.len());
                let changed = new_args.is_some() || new_restype.is_some();
                let args = new_args.as_deref().unwrap_or(args);
                let restype = new_restype.as_ref().unwrap_or(restype);
                self.visitor
                    .handle_product(args, restype, depth)
                    .or_else(|| changed.then(|| mk_product(args.to_vec(), restype.clone())))
            }
            Lambda { args, body } => {
                let new_args = self.visit_args(args);
                let new_body = self.visit(body);
                self.pop(args.len());
                let changed = new_args.is_some() || new_body.is_some();
                let args = new_args.as_deref().unwrap_or(args);
                let body = new_body.as_ref().unwrap_or(body);
                self.visitor
                    .handle_lambda(args, body, depth)
                    .or_else(|| changed.then(|| mk_lambda(args.to_vec(), body.clone())))
            }
            Let { varname, value, type_, body } => {
                let new_value = self.visit(value);
                let new_type = self.visit(type_);
                self.push(Binder { name : varname.as_deref(), type_ : Some(type_) });
                let new_body = self.visit(body);
                self.pop(1);
                let changed = new_value.is_some() || new_type.is_some() || new_body.is_some();
                let value = new_value.as_ref().unwrap_or(value);
                let type_ = new_type.as_ref().unwrap_or(type_);
                let body = new_body.as_ref().unwrap_or(body);
                self.visitor.handle_let(varname.as_deref(), value, type_, body, depth).or_else(|| {
                    changed.then(|| mk_let(varname.as_deref(), value.clone(), type_.clone(), body.clone()))
                })
            }
            Apply { fun, args } => {
                let new_fun = self.visit(fun);
                let new_args = self.visit_all(args);
                let changed = new_fun.is_some() || new_args.is_some();
                let fun = new_fun.as_ref().unwrap_or(fun);
                let args = new_args.as_deref().unwrap_or(args);
                self.visitor
                    .handle_apply(fun, args, depth)
                    .or_else(|| changed.then(|| mk_apply(fun.clone(), args.to_vec())))
            }
            Cast { term, kind, typeterm } => {
                let new_term = self.visit(term);
                let new_typeterm = self.visit(typeterm);
                let changed = new_term.is_some() || new_typeterm.is_some();
                let term = new_term.as_ref().unwrap_or(term);
                let typeterm = new_typeterm.as_ref().unwrap_or(typeterm);
                self.visitor
                    .handle_cast(term, *kind, typeterm, depth)
                    .or_else(|| changed.then(|| mk_cast(term.clone(), *kind, typeterm.clone())))
            }
            Match { casetype, arg, branches } => {
                let new_arg = self.visit(arg);
                self.push(Binder { name : None, type_ : None });
                let new_casetype = self.visit(casetype);
                self.pop(1);
                let mut new_branches : Option<Vec<Branch>> = None;
                for (i, b) in branches.iter().enumerate() {
                    for _ in 0..b.nargs {
                        self.push(Binder { name : None, type_ : None });
                    }
                    let expr = self.visit(&b.expr);
                    self.pop(b.nargs);
                    if let Some(expr) = expr {
                        new_branches.get_or_insert_with(|| branches.clone())[i] =
                            Branch { constructor : b.constructor.clone(), nargs : b.nargs, expr };
                    }
                }
                let changed = new_arg.is_some() || new_casetype.is_some() || new_branches.is_some();
                let arg = new_arg.as_ref().unwrap_or(arg);
                let casetype = new_casetype.as_ref().unwrap_or(casetype);
                let branches = new_branches.as_deref().unwrap_or(branches);
                self.visitor
                    .handle_match(casetype, arg, branches, depth)
                    .or_else(|| changed.then(|| mk_match(casetype.clone(), arg.clone(), branches.to_vec())))
            }
            Fix { index, group } => {
                let new_group = self.visit_group(group);
                let changed = !Arc::ptr_eq(&new_group, group);
                self.visitor
                    .handle_fix(*index, &new_group, depth)
                    .or_else(|| changed.then(|| mk_fix(*index, new_group.clone())))
            }
        }
    }
}
