use crate::tc::Context;
use crate::term::{
    mk_apply, mk_cast, mk_fix, mk_global, mk_lambda, mk_let, mk_local, mk_match, mk_product, mk_set, mk_sort,
    mk_type, Branch, CastKind, FixFunction, FixGroup, FormalArg, Sort, TermPtr,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub(crate) fn arrow(dom: TermPtr, cod: TermPtr) -> TermPtr { mk_product(vec![FormalArg::anon(dom)], cod) }

pub(crate) fn app(fun: TermPtr, args: &[TermPtr]) -> TermPtr { mk_apply(fun, args.to_vec()) }

pub(crate) fn g(name: &str) -> TermPtr { mk_global(name) }

/// The globals of a small prelude: naturals, lists and pairs.
pub(crate) fn prelude_type(name: &str) -> Option<TermPtr> {
    let nat = g("nat");
    let out = match name {
        "nat" => mk_set(),
        "O" => nat,
        "S" => arrow(nat.clone(), nat),
        "plus" => arrow(nat.clone(), arrow(nat.clone(), nat)),
        "list" => arrow(mk_set(), mk_set()),
        "nil" => mk_product(vec![FormalArg::named("A", mk_set())], app(g("list"), &[mk_local("A", 0)])),
        "prod" => arrow(mk_set(), arrow(mk_set(), mk_set())),
        "pair" => mk_product(
            vec![
                FormalArg::named("A", mk_set()),
                FormalArg::named("B", mk_set()),
                FormalArg::anon(mk_local("A", 1)),
                FormalArg::anon(mk_local("B", 1)),
            ],
            app(g("prod"), &[mk_local("A", 3), mk_local("B", 2)]),
        ),
        _ => return None,
    };
    Some(out)
}

pub(crate) fn prelude_ctx() -> Context { Context::new(prelude_type) }

/// The list reversal function, as a one-function bundle:
/// `rev (T : Type) (l : list T) : list T`, recursing with `T` unchanged.
pub(crate) fn rev_group() -> Arc<FixGroup> {
    let list = |t: TermPtr| app(g("list"), &[t]);
    FixGroup::new(vec![FixFunction::new(
        "rev",
        vec![FormalArg::named("T", mk_type()), FormalArg::named("l", list(mk_local("T", 0)))],
        list(mk_local("T", 1)),
        mk_match(
            list(mk_local("T", 2)),
            mk_local("l", 0),
            vec![
                Branch::new("nil", 0, app(g("nil"), &[mk_local("T", 1)])),
                Branch::new(
                    "cons",
                    2,
                    app(
                        g("app"),
                        &[
                            mk_local("T", 3),
                            app(mk_local("rev", 4), &[mk_local("T", 3), mk_local("l", 1)]),
                            app(g("cons"), &[mk_local("T", 3), mk_local("x", 0), app(g("nil"), &[mk_local("T", 3)])]),
                        ],
                    ),
                ),
            ],
        ),
    )])
}

pub(crate) fn test_rng(seed: u64) -> StdRng { StdRng::seed_from_u64(seed) }

/// A random term of at most `depth` levels under `bound` enclosing binders. Some
/// locals deliberately point past `bound`.
pub(crate) fn random_term(rng: &mut StdRng, depth: u32, bound: usize) -> TermPtr {
    if depth == 0 || rng.gen_ratio(1, 4) {
        return match rng.gen_range(0..3) {
            0 => mk_local("v", rng.gen_range(0..bound + 3)),
            1 => g(["nat", "O", "S", "list"][rng.gen_range(0..4)]),
            _ => mk_sort([Sort::Set, Sort::Prop, Sort::SProp, Sort::Type][rng.gen_range(0..4)]),
        }
    }
    let d = depth - 1;
    match rng.gen_range(0..9) {
        0 | 1 => {
            let args = random_args(rng, d, bound);
            let inner = random_term(rng, d, bound + args.len());
            if rng.gen_bool(0.5) {
                mk_product(args, inner)
            } else {
                mk_lambda(args, inner)
            }
        }
        2 => {
            let value = random_term(rng, d, bound);
            let type_ = random_term(rng, d, bound);
            mk_let(Some("y"), value, type_, random_term(rng, d, bound + 1))
        }
        3 | 4 => {
            let fun = random_term(rng, d, bound);
            let n = rng.gen_range(1..4);
            mk_apply(fun, (0..n).map(|_| random_term(rng, d, bound)).collect())
        }
        5 => mk_cast(random_term(rng, d, bound), CastKind::DefaultCast, random_term(rng, d, bound)),
        6 => {
            let casetype = random_term(rng, d, bound + 1);
            let arg = random_term(rng, d, bound);
            let branches = (0..rng.gen_range(0..3))
                .map(|i| {
                    let nargs = rng.gen_range(0..3);
                    Branch::new(["c0", "c1", "c2"][i], nargs, random_term(rng, d, bound + nargs))
                })
                .collect();
            mk_match(casetype, arg, branches)
        }
        7 => {
            let n = rng.gen_range(1..3);
            let functions = (0..n)
                .map(|i| {
                    let args = random_args(rng, d, bound + n);
                    let k = args.len();
                    let restype = random_term(rng, d, bound + n + k);
                    let body = random_term(rng, d, bound + n + k);
                    FixFunction::new(["f", "h"][i], args, restype, body)
                })
                .collect();
            mk_fix(rng.gen_range(0..n), FixGroup::new(functions))
        }
        _ => {
            // Directly nested chains, which the normalizer flattens.
            let inner = mk_apply(random_term(rng, d, bound), vec![random_term(rng, d, bound)]);
            mk_apply(inner, vec![random_term(rng, d, bound)])
        }
    }
}

fn random_args(rng: &mut StdRng, depth: u32, bound: usize) -> Vec<FormalArg> {
    (0..rng.gen_range(1..3))
        .map(|i| FormalArg::new(if rng.gen_bool(0.5) { Some("a") } else { None }, random_term(rng, depth, bound + i)))
        .collect()
}
