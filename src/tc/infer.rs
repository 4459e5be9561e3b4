use crate::errors::TypeError;
use crate::tc::Context;
use crate::term::Term::*;
use crate::term::{ mk_product, mk_type, FixGroup, FormalArg, TermPtr };
use log::trace;
use std::sync::Arc;

fn product_or_restype(args : Vec<FormalArg>, restype : TermPtr) -> TermPtr {
    if args.is_empty() {
        restype
    } else {
        mk_product(args, restype)
    }
}

/// Errors are logged once, where they are raised; enclosing frames only forward them.
fn raise(at : &TermPtr, e : TypeError) -> TypeError {
    trace!("check failed for {}: {}", at, e);
    e
}

impl TermPtr {
    /// Compute the type of this term under `ctx`.
    ///
    /// Sorts are flattened: every sort has type `Type`, and there is no conversion
    /// checking between an argument's type and the parameter it is passed to.
    pub fn check(&self, ctx : &Context) -> Result<TermPtr, TypeError> {
        match self.read() {
            Local { name, index } => ctx.local_type(*index).map_err(|e| {
                raise(self, TypeError::UnresolvedLocal { name : name.clone(), index : *index, depth : e.size })
            }),
            Global { name } =>
                ctx.global_type(name).ok_or_else(|| raise(self, TypeError::UnresolvedGlobal(name.clone()))),
            Builtin { .. } => Ok(mk_type()),
            Product { args, restype } => Self::check_product(args, restype, ctx),
            Lambda { args, body } => Self::check_lambda(args, body, ctx),
            Let { varname, value, type_, body } => {
                let value_type = value.check(ctx)?;
                type_.check(ctx)?;
                let body_type = body.check(&ctx.push_local(varname.as_deref(), value_type))?;
                Ok(body_type.local_subst(0, std::slice::from_ref(value)))
            }
            Apply { fun, args } => Self::check_apply(self, fun, args, ctx),
            Cast { term, .. } => term.check(ctx),
            Match { casetype, arg, .. } => Self::check_match(self, casetype, arg, ctx),
            Fix { index, group } => Self::check_fix(self, *index, group),
        }
    }

    /// Checks the argument types left to right, each in the context extended by the
    /// ones before it. Returns the types of the argument types and the extended context.
    fn check_args(args : &[FormalArg], ctx : &Context) -> Result<(Vec<TermPtr>, Context), TypeError> {
        let mut sorts = Vec::with_capacity(args.len());
        let mut ctx = ctx.clone();
        for arg in args {
            sorts.push(arg.type_.check(&ctx)?);
            ctx = ctx.push_local(arg.name(), arg.type_.clone());
        }
        Ok((sorts, ctx))
    }

    fn check_product(args : &[FormalArg], restype : &TermPtr, ctx : &Context) -> Result<TermPtr, TypeError> {
        let (mut sorts, inner) = Self::check_args(args, ctx)?;
        sorts.push(restype.check(&inner)?);
        let first = &sorts[0];
        if sorts.iter().all(|s| s == first) {
            Ok(first.clone())
        } else {
            Ok(mk_type())
        }
    }

    fn check_lambda(args : &[FormalArg], body : &TermPtr, ctx : &Context) -> Result<TermPtr, TypeError> {
        let (_, inner) = Self::check_args(args, ctx)?;
        let body_type = body.check(&inner)?;
        Ok(product_or_restype(args.to_vec(), body_type))
    }

    fn check_apply(at : &TermPtr, fun : &TermPtr, args : &[TermPtr], ctx : &Context) -> Result<TermPtr, TypeError> {
        let fun_type = fun.check(ctx)?;
        for arg in args {
            arg.check(ctx)?;
        }

        let mut params = Vec::new();
        let mut restype = fun_type.clone();
        while let Some((ps, r)) = restype.as_product() {
            params.extend_from_slice(ps);
            let r = r.clone();
            restype = r;
        }

        if params.len() < args.len() {
            return Err(raise(at, TypeError::NotAFunction {
                fun : fun.debug_string(),
                fun_type : fun_type.debug_string(),
                supplied : args.len(),
                accepted : params.len(),
            }))
        }

        let residual = product_or_restype(params.split_off(args.len()), restype);
        let subs = args.iter().rev().cloned().collect::<Vec<_>>();
        Ok(residual.local_subst(0, &subs))
    }

    fn check_match(at : &TermPtr, casetype : &TermPtr, arg : &TermPtr, ctx : &Context) -> Result<TermPtr, TypeError> {
        let scrutinee_type = arg.check(ctx)?;
        let inductive = match scrutinee_type.unfold_apps().0.read() {
            Builtin { .. } | Product { .. } | Lambda { .. } => false,
            Global { name } => ctx.is_inductive(name).unwrap_or(true),
            _ => true,
        };
        if !inductive {
            return Err(raise(at, TypeError::NotInductive {
                scrutinee : arg.debug_string(),
                scrutinee_type : scrutinee_type.debug_string(),
            }))
        }
        Ok(casetype.local_subst(0, &[scrutinee_type]))
    }

    fn check_fix(at : &TermPtr, index : usize, group : &Arc<FixGroup>) -> Result<TermPtr, TypeError> {
        let function = group
            .function(index)
            .ok_or_else(|| raise(at, TypeError::FixIndexOutOfRange { index, size : group.len() }))?;
        Ok(product_or_restype(function.args.clone(), function.restype.clone()))
    }
}
