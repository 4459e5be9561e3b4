use crate::term::{ mk_apply, mk_lambda, mk_product, FormalArg, TermPtr };
use crate::transform::{ transform, Transform };

/// Flattens directly nested binders and applications. Because children are
/// normalized before their parent, merging one level is enough.
struct Normalizer;

impl Transform for Normalizer {
    fn handle_product(&mut self, args : &[FormalArg], restype : &TermPtr, _depth : usize) -> Option<TermPtr> {
        let (inner_args, inner_restype) = restype.as_product()?;
        Some(mk_product([args, inner_args].concat(), inner_restype.clone()))
    }

    fn handle_lambda(&mut self, args : &[FormalArg], body : &TermPtr, _depth : usize) -> Option<TermPtr> {
        let (inner_args, inner_body) = body.as_lambda()?;
        Some(mk_lambda([args, inner_args].concat(), inner_body.clone()))
    }

    fn handle_apply(&mut self, fun : &TermPtr, args : &[TermPtr], _depth : usize) -> Option<TermPtr> {
        let (inner_fun, inner_args) = fun.as_apply()?;
        Some(mk_apply(inner_fun.clone(), [inner_args, args].concat()))
    }
}

impl TermPtr {
    /// Merge `Product`-of-`Product`, `Lambda`-of-`Lambda` and `Apply`-of-`Apply` chains
    /// into single nodes everywhere in the term, keeping argument order.
    pub fn normalize(&self) -> TermPtr { transform(self, &mut Normalizer) }
}
