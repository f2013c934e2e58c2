use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use cbdd::bdd::Bdd;
use cbdd::reference::Ref;

fn random_function(bdd: &Bdd, rng: &mut ChaCha8Rng, vars: &[Ref], ops: usize) -> Ref {
    let mut pool: Vec<Ref> = vars.to_vec();
    for _ in 0..ops {
        let a = pool[rng.random_range(0..pool.len())];
        let b = pool[rng.random_range(0..pool.len())];
        let c = pool[rng.random_range(0..pool.len())];
        let r = match rng.random_range(0..5) {
            0 => bdd.apply_and(a, b).unwrap(),
            1 => bdd.apply_or(a, -b).unwrap(),
            2 => bdd.apply_xor(a, b).unwrap(),
            3 => bdd.apply_imply(b, a).unwrap(),
            _ => bdd.apply_ite(a, b, c).unwrap(),
        };
        pool.push(r);
    }
    *pool.last().unwrap()
}

#[test]
fn test_distributivity_gives_identical_edges() {
    let bdd = Bdd::default();
    let a = bdd.mk_var(0).unwrap();
    let b = bdd.mk_var(1).unwrap();
    let c = bdd.mk_var(2).unwrap();

    // (a ∧ b) ∨ (a ∧ c) == a ∧ (b ∨ c)
    let lhs = bdd.apply_or(bdd.apply_and(a, b).unwrap(), bdd.apply_and(a, c).unwrap()).unwrap();
    let rhs = bdd.apply_and(a, bdd.apply_or(b, c).unwrap()).unwrap();
    assert_eq!(lhs, rhs);

    // De Morgan, built from the other side.
    let lhs = -bdd.apply_and(a, b).unwrap();
    let rhs = bdd.apply_or(-a, -b).unwrap();
    assert_eq!(lhs, rhs);

    // a ⊕ b ⊕ c in every association.
    let x1 = bdd.apply_xor(bdd.apply_xor(a, b).unwrap(), c).unwrap();
    let x2 = bdd.apply_xor(a, bdd.apply_xor(c, b).unwrap()).unwrap();
    let x3 = bdd.apply_eq(-a, bdd.apply_eq(b, -c).unwrap()).unwrap();
    let x4 = bdd.apply_xor(bdd.apply_xor(-a, b).unwrap(), c).unwrap();
    assert_eq!(x1, x2);
    assert_eq!(x1, x3);
    assert_eq!(x1, -x4);
    bdd.check_invariants().unwrap();
}

#[test]
fn test_random_equivalent_constructions() {
    let bdd = Bdd::default();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let vars: Vec<Ref> = (0..8).map(|i| bdd.mk_var(i).unwrap()).collect();

    for round in 0..50 {
        let f = random_function(&bdd, &mut rng, &vars, 20);
        let g = random_function(&bdd, &mut rng, &vars, 20);

        // f ∧ g built via ite, via and, and via De Morgan.
        let direct = bdd.apply_and(f, g).unwrap();
        let via_ite = bdd.apply_ite(f, g, bdd.zero()).unwrap();
        let via_or = -bdd.apply_or(-f, -g).unwrap();
        assert_eq!(direct, via_ite, "round {}", round);
        assert_eq!(direct, via_or, "round {}", round);

        // f ⊕ g == (f ∧ ¬g) ∨ (¬f ∧ g)
        let xor = bdd.apply_xor(f, g).unwrap();
        let expanded = bdd
            .apply_or(bdd.apply_and(f, -g).unwrap(), bdd.apply_and(-f, g).unwrap())
            .unwrap();
        assert_eq!(xor, expanded, "round {}", round);

        // Shannon expansion on the top variable rebuilds the same edge.
        if let Some((var, low, high)) = bdd.root_decomp(f).unwrap() {
            assert_eq!(bdd.make_bdd(var, low, high).unwrap(), f, "round {}", round);
        }
    }
}

#[test]
fn test_reduction_after_random_operations() {
    let bdd = Bdd::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let vars: Vec<Ref> = (0..10).map(|i| bdd.mk_var(i).unwrap()).collect();
    for _ in 0..20 {
        random_function(&bdd, &mut rng, &vars, 50);
    }
    println!("{:?}", bdd);
    // No redundant node, no duplicate signature, no complemented then-edge.
    bdd.check_invariants().unwrap();
}

#[test]
fn test_negation_is_free_and_involutive() {
    let bdd = Bdd::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let vars: Vec<Ref> = (0..6).map(|i| bdd.mk_var(i).unwrap()).collect();
    let f = random_function(&bdd, &mut rng, &vars, 30);

    let nodes = bdd.node_count();
    let table = bdd.table_size();
    assert_eq!(-(-f), f);
    assert_eq!(bdd.apply_not(bdd.apply_not(f).unwrap()).unwrap(), f);
    assert_ne!(-f, f);
    assert_eq!(bdd.node_count(), nodes);
    assert_eq!(bdd.table_size(), table);

    assert_eq!(-bdd.one(), bdd.zero());
    assert_eq!(-bdd.zero(), bdd.one());
}

#[test]
fn test_concrete_scenario() {
    let bdd = Bdd::default();
    for i in 0..3 {
        bdd.declare_var(i).unwrap();
    }
    let v0 = bdd.mk_var(0).unwrap();
    let v1 = bdd.mk_var(1).unwrap();
    let v2 = bdd.mk_var(2).unwrap();

    let e1 = bdd.apply_and(v0, v1).unwrap();
    let e2 = bdd.apply_and(v1, v0).unwrap();
    assert_eq!(e1, e2);

    let e3 = bdd.apply_ite(v0, e1, bdd.zero()).unwrap();
    assert_eq!(e3, e1);

    bdd.activate(e1).unwrap();
    bdd.activate(e2).unwrap();
    // x2 has another referrer and must survive.
    bdd.activate(v2).unwrap();

    bdd.deactivate(e1).unwrap();
    bdd.deactivate(e2).unwrap();

    let before = bdd.node_count();
    let unreferenced = bdd.garbage_count();
    println!("before collect: {:?}", bdd);
    // The node of e1, its child x1 and the literal node of x0.
    assert_eq!(unreferenced, 3);

    bdd.collect_garbage(false);
    println!("after collect: {:?}", bdd);
    assert_eq!(bdd.node_count(), before - unreferenced);
    assert_eq!(bdd.node_count(), 1);
    assert_eq!(bdd.low_node(v2).unwrap(), bdd.zero());
    bdd.check_invariants().unwrap();
}
