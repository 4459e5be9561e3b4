use crate::env::{Constructor, Declar, GlobalEnv, GlobalKind, ModExpr, ModuleBody, ModuleRepr, OneInductive};
use crate::errors::TypeError;
use crate::tc::Context;
use crate::tests::util::{app, arrow, g};
use crate::term::{mk_local, mk_match, mk_set, Branch};
use std::sync::Arc;

fn nat_inductive() -> Declar {
    Declar::Inductive(vec![OneInductive {
        id: String::from("nat"),
        type_: mk_set(),
        constructors: vec![
            Constructor { id: String::from("O"), type_: g("nat") },
            Constructor { id: String::from("S"), type_: arrow(g("nat"), g("nat")) },
        ],
    }])
}

fn one_module() -> Declar {
    Declar::Module {
        id: String::from("M"),
        body: ModuleBody {
            parameters: vec![],
            repr: ModuleRepr::Struct {
                type_: Some(ModExpr::new("SIG", &[])),
                body: vec![Declar::Definition { id: String::from("one"), type_: g("nat"), value: app(g("S"), &[g("O")]) }],
            },
        },
    }
}

fn functor_module() -> Declar {
    Declar::Module {
        id: String::from("N"),
        body: ModuleBody {
            parameters: vec![(String::from("X"), ModExpr::new("SIG", &[]))],
            repr: ModuleRepr::Algebraic(ModExpr::new("Make", &["X"])),
        },
    }
}

fn sample() -> Vec<Declar> {
    vec![
        nat_inductive(),
        Declar::Definition { id: String::from("mynat"), type_: mk_set(), value: g("nat") },
        Declar::Axiom { id: String::from("x"), type_: g("mynat") },
        one_module(),
        functor_module(),
        Declar::ModuleType {
            id: String::from("SIG"),
            body: ModuleBody { parameters: vec![], repr: ModuleRepr::Struct { type_: None, body: vec![] } },
        },
    ]
}

#[test]
fn env_from_declars() {
    let env = GlobalEnv::from_declars(&sample());
    assert_eq!(env.names().collect::<Vec<_>>(), vec!["nat", "O", "S", "mynat", "x", "M.one"]);
    assert_eq!(env.len(), 6);
    assert!(!env.is_empty());
    assert_eq!(env.get("nat").map(|e| e.kind), Some(GlobalKind::Inductive));
    assert_eq!(env.get("S").map(|e| e.kind), Some(GlobalKind::Constructor));
    assert_eq!(env.get("M.one").and_then(|e| e.value.clone()), Some(app(g("S"), &[g("O")])));
    assert!(env.get("one").is_none());
    assert_eq!(env.constructors("nat"), Some(&[String::from("O"), String::from("S")][..]));
    assert_eq!(env.constructors("mynat"), None);
    assert!(GlobalEnv::from_declars(&[]).is_empty());
}

#[test]
fn env_check_declars() {
    let env = Arc::new(GlobalEnv::from_declars(&sample()));
    assert!(GlobalEnv::check_declars(&env).is_empty());

    let mut declars = sample();
    declars.push(Declar::Axiom { id: String::from("bad"), type_: g("foo") });
    declars.push(Declar::Definition { id: String::from("two"), type_: g("nat"), value: app(g("O"), &[g("O")]) });
    let env = Arc::new(GlobalEnv::from_declars(&declars));
    let failures = GlobalEnv::check_declars(&env);
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0], (String::from("bad"), TypeError::UnresolvedGlobal(String::from("foo"))));
    assert_eq!(failures[1].0, "two");
    assert!(matches!(failures[1].1, TypeError::NotAFunction { supplied: 1, accepted: 0, .. }));
}

#[test]
fn env_drives_match_checks() {
    let ctx = Context::from_env(Arc::new(GlobalEnv::from_declars(&sample())));
    let on_nat = mk_match(g("nat"), g("O"), vec![Branch::new("O", 0, g("O")), Branch::new("S", 1, mk_local("m", 0))]);
    assert_eq!(on_nat.check(&ctx), Ok(g("nat")));

    // `mynat` is a definition, not an inductive type.
    let on_x = mk_match(g("nat"), g("x"), vec![]);
    assert_eq!(
        on_x.check(&ctx),
        Err(TypeError::NotInductive { scrutinee: String::from("x"), scrutinee_type: String::from("mynat") })
    );
}

#[test]
fn declar_display() {
    assert_eq!(nat_inductive().to_string(), "Inductive nat : Set :=\n | O : nat\n | S : (nat -> nat)\n.");
    assert_eq!(
        Declar::Definition { id: String::from("one"), type_: g("nat"), value: app(g("S"), &[g("O")]) }.to_string(),
        "Definition one : nat := (S O)."
    );
    assert_eq!(Declar::Axiom { id: String::from("x"), type_: g("mynat") }.to_string(), "Axiom x : mynat.");
    assert_eq!(functor_module().to_string(), "Module N (X : SIG) := Make X.");
    assert_eq!(one_module().to_string(), "Module M <: SIG.\nDefinition one : nat := (S O).\nEnd.");

    let mutual = Declar::Inductive(vec![
        OneInductive { id: String::from("even"), type_: arrow(g("nat"), mk_set()), constructors: vec![] },
        OneInductive { id: String::from("odd"), type_: arrow(g("nat"), mk_set()), constructors: vec![] },
    ]);
    assert_eq!(mutual.to_string(), "Inductive even : (nat -> Set) :=\nwith odd : (nat -> Set) :=\n.");
}
