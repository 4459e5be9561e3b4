//! Terms of the Calculus of Inductive Constructions with de Bruijn indices, and the
//! operations on them: shifting and substitution, type computation, normalization
//! of binder chains, and specialization of fixpoint bundles on constant arguments.
//!
//! ```
//! use coqcic::term::{mk_apply, mk_global, mk_product, mk_set, FormalArg};
//! use coqcic::tc::Context;
//!
//! let ctx = Context::new(|name: &str| match name {
//!     "nat" => Some(mk_set()),
//!     "O" => Some(mk_global("nat")),
//!     "S" => Some(mk_product(vec![FormalArg::anon(mk_global("nat"))], mk_global("nat"))),
//!     _ => None,
//! });
//! let one = mk_apply(mk_global("S"), vec![mk_global("O")]);
//! assert_eq!(one.check(&ctx).unwrap(), mk_global("nat"));
//! assert_eq!(one.debug_string(), "(S O)");
//! ```

pub mod debruijn;
pub mod debug_printer;
pub mod env;
pub mod errors;
pub mod fix_specialize;
pub mod normalize;
pub mod scope;
pub mod stack;
pub mod tc;
pub mod term;
#[cfg(test)]
mod tests;
pub mod transform;
pub mod util;

pub(crate) const STACK_SIZE: usize = 16_777_216;
