use crate::errors::TypeError;
use crate::tc::Context;
use crate::tests::util::{app, arrow, g, prelude_ctx, rev_group};
use crate::term::{
    mk_cast, mk_fix, mk_lambda, mk_let, mk_local, mk_match, mk_product, mk_set, mk_type, Branch, CastKind, FormalArg,
    TermPtr,
};

fn dup_pair() -> TermPtr {
    mk_lambda(
        vec![FormalArg::named("T", mk_set()), FormalArg::named("t", mk_local("T", 0))],
        app(g("pair"), &[mk_local("T", 1), mk_local("T", 1), mk_local("t", 0), mk_local("t", 0)]),
    )
}

#[test]
fn check_successor() {
    let ctx = prelude_ctx();
    assert_eq!(app(g("S"), &[g("O")]).check(&ctx), Ok(g("nat")));
    assert_eq!(app(g("plus"), &[g("O")]).check(&ctx), Ok(arrow(g("nat"), g("nat"))));
    assert_eq!(app(g("nil"), &[g("nat")]).check(&ctx), Ok(app(g("list"), &[g("nat")])));
}

#[test]
fn check_sorts() {
    let ctx = prelude_ctx();
    assert_eq!(mk_set().check(&ctx), Ok(mk_type()));
    assert_eq!(mk_type().check(&ctx), Ok(mk_type()));
    assert_eq!(arrow(g("nat"), g("nat")).check(&ctx), Ok(mk_set()));
    // Arguments in `Type`, result in `Set`: the sorts disagree.
    let nil_type = mk_product(vec![FormalArg::named("A", mk_set())], app(g("list"), &[mk_local("A", 0)]));
    assert_eq!(nil_type.check(&ctx), Ok(mk_type()));
}

#[test]
fn check_dup_pair() {
    let ctx = prelude_ctx();
    let expected = mk_product(
        vec![FormalArg::named("T", mk_set()), FormalArg::named("t", mk_local("T", 0))],
        app(g("prod"), &[mk_local("T", 1), mk_local("T", 1)]),
    );
    assert_eq!(dup_pair().check(&ctx), Ok(expected));

    let dup_nat = app(dup_pair(), &[g("nat")]).simpl();
    let expected_nat = mk_lambda(
        vec![FormalArg::named("t", g("nat"))],
        app(g("pair"), &[g("nat"), g("nat"), mk_local("t", 0), mk_local("t", 0)]),
    );
    assert_eq!(dup_nat, expected_nat);
    let prod_nat = app(g("prod"), &[g("nat"), g("nat")]);
    assert_eq!(dup_nat.check(&ctx), Ok(mk_product(vec![FormalArg::named("t", g("nat"))], prod_nat.clone())));
    assert_eq!(app(dup_nat, &[g("O")]).check(&ctx), Ok(prod_nat.clone()));
    assert_eq!(app(dup_pair(), &[g("nat"), g("O")]).check(&ctx), Ok(prod_nat));
}

#[test]
fn check_locals_relative_to_context() {
    let ctx = prelude_ctx().push_local(Some("A"), mk_set()).push_local(Some("x"), mk_local("A", 0));
    assert_eq!(mk_local("x", 0).check(&ctx), Ok(mk_local("A", 1)));
    let deeper = ctx.push_local(Some("y"), g("nat"));
    assert_eq!(mk_local("x", 1).check(&deeper), Ok(mk_local("A", 2)));
    assert_eq!(ctx.locals().len(), 2);
}

#[test]
fn check_let_cast_match() {
    let ctx = prelude_ctx();
    let l = mk_let(Some("x"), g("O"), g("nat"), app(g("S"), &[mk_local("x", 0)]));
    assert_eq!(l.check(&ctx), Ok(g("nat")));

    // The type of the body mentions the let variable; the value takes its place.
    let l = mk_let(Some("T"), g("nat"), mk_set(), mk_lambda(vec![FormalArg::named("t", mk_local("T", 0))], mk_local("t", 0)));
    assert_eq!(l.check(&ctx), Ok(mk_product(vec![FormalArg::named("t", g("nat"))], g("nat"))));

    assert_eq!(mk_cast(g("O"), CastKind::VmCast, g("nat")).check(&ctx), Ok(g("nat")));

    let inner = ctx.push_local(Some("n"), g("nat"));
    let m = mk_match(
        app(g("list"), &[mk_local("s", 0)]),
        mk_local("n", 0),
        vec![Branch::new("O", 0, g("O")), Branch::new("S", 1, mk_local("m", 0))],
    );
    assert_eq!(m.check(&inner), Ok(app(g("list"), &[g("nat")])));
}

#[test]
fn check_fix() {
    let ctx = prelude_ctx();
    let grp = rev_group();
    let list = |t| app(g("list"), &[t]);
    let expected = mk_product(
        vec![FormalArg::named("T", mk_type()), FormalArg::named("l", list(mk_local("T", 0)))],
        list(mk_local("T", 1)),
    );
    assert_eq!(mk_fix(0, grp.clone()).check(&ctx), Ok(expected.clone()));
    assert_eq!(grp.function_signature(0), Some(expected));
    assert_eq!(grp.function_signature(1), None);
}

#[test]
fn check_errors() {
    let ctx = prelude_ctx();
    assert_eq!(g("foo").check(&ctx), Err(TypeError::UnresolvedGlobal(String::from("foo"))));
    assert_eq!(
        mk_local("x", 0).check(&ctx),
        Err(TypeError::UnresolvedLocal { name: String::from("x"), index: 0, depth: 0 })
    );
    assert_eq!(
        app(g("O"), &[g("O")]).check(&ctx),
        Err(TypeError::NotAFunction {
            fun: String::from("O"),
            fun_type: String::from("nat"),
            supplied: 1,
            accepted: 0
        })
    );
    assert_eq!(
        app(g("S"), &[g("O"), g("O")]).check(&ctx).map_err(|e| e.to_string()),
        Err(String::from("`S` is applied to 2 arguments, but its type `(nat -> nat)` only accepts 1"))
    );
    let m = mk_match(g("nat"), g("nat"), vec![]);
    assert_eq!(
        m.check(&ctx),
        Err(TypeError::NotInductive { scrutinee: String::from("nat"), scrutinee_type: String::from("Set") })
    );
    assert_eq!(mk_fix(3, rev_group()).check(&ctx), Err(TypeError::FixIndexOutOfRange { index: 3, size: 1 }));
    // Errors inside arguments surface too.
    assert_eq!(
        app(g("S"), &[g("bogus")]).check(&ctx),
        Err(TypeError::UnresolvedGlobal(String::from("bogus")))
    );
    assert!(g("nat").check(&Context::empty()).is_err());
}

#[test]
fn context_resolves_names() {
    let ctx = prelude_ctx()
        .push_local(Some("A"), mk_set())
        .push_local(None, g("nat"))
        .push_local(Some("x"), mk_local("A", 1))
        .push_local(Some("A"), mk_set());
    assert_eq!(ctx.index_of("A"), Some(0));
    assert_eq!(ctx.index_of("x"), Some(1));
    assert_eq!(ctx.index_of("y"), None);
    let x = ctx.local_named("x").unwrap();
    assert_eq!(x.as_local(), Some(("x", 1)));
    assert_eq!(x.check(&ctx), Ok(mk_local("A", 3)));
}

#[test]
fn context_names_after_branching() {
    // A base whose scope blocks would all merge on the next push.
    let base = (0..1023).fold(prelude_ctx(), |ctx, i| ctx.push_local(Some(format!("v{}", i).as_str()), g("nat")));
    assert_eq!(base.index_of("v0"), Some(1022));
    for i in 0..200 {
        let branch = base.push_local(Some("w"), g("nat")).push_local(None, g("nat"));
        assert_eq!(branch.index_of("w"), Some(1));
        assert_eq!(branch.index_of(&format!("v{}", 1022 - i)), Some(2 + i));
        assert_eq!(mk_local("w", 1).check(&branch), Ok(g("nat")));
    }
    assert_eq!(base.index_of("w"), None);
    assert_eq!(base.index_of("v1022"), Some(0));
}

/// Collects the messages of every log record.
struct Recorder(std::sync::Mutex<Vec<String>>);

impl log::Log for Recorder {
    fn enabled(&self, _: &log::Metadata) -> bool { true }

    fn log(&self, record: &log::Record) {
        if let Ok(mut messages) = self.0.lock() {
            messages.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder(std::sync::Mutex::new(Vec::new()));

#[test]
fn check_failure_logged_once() {
    if log::set_logger(&RECORDER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
    let ctx = prelude_ctx();
    let nested = app(g("S"), &[app(g("S"), &[mk_lambda(vec![FormalArg::anon(g("nat"))], g("missing_in_logging_test"))])]);
    assert_eq!(nested.check(&ctx), Err(TypeError::UnresolvedGlobal(String::from("missing_in_logging_test"))));
    let messages = RECORDER.0.lock().unwrap();
    let hits = messages.iter().filter(|m| m.contains("missing_in_logging_test")).count();
    assert_eq!(hits, 1);
}
