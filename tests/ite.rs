use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use test_log::test;

use cbdd::bdd::Bdd;
use cbdd::isop::Cover;
use cbdd::reference::Ref;
use cbdd::types::VarId;

/// Truth table of `f` over variables `0..n`; bit `r` is the value at row `r`,
/// where variable `i` takes bit `i` of `r`.
fn truth_table(bdd: &Bdd, f: Ref, n: u32) -> u64 {
    let mut bits = 0;
    for row in 0..(1u64 << n) {
        if bdd.eval(f, |v| (row >> v.id()) & 1 == 1).unwrap() {
            bits |= 1 << row;
        }
    }
    bits
}

/// Builds the function with the given truth table over variables `0..n`.
fn from_bits(bdd: &Bdd, bits: u64, n: u32) -> Ref {
    // `from_truth_table` takes the first variable as the most significant bit.
    let vars: Vec<VarId> = (0..n).rev().map(VarId::new).collect();
    let values: Vec<bool> = (0..(1u64 << n)).map(|row| (bits >> row) & 1 == 1).collect();
    bdd.from_truth_table(&values, &vars).unwrap()
}

#[test]
fn test_truth_table_roundtrip() {
    let bdd = Bdd::default();
    for i in 0..4 {
        bdd.declare_var(i).unwrap();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..100 {
        let bits = rng.random_range(0..(1u64 << 16));
        let f = from_bits(&bdd, bits, 4);
        assert_eq!(truth_table(&bdd, f, 4), bits);
    }
}

#[test]
fn test_ite_exhaustive_two_variables() {
    let bdd = Bdd::default();
    for i in 0..2 {
        bdd.declare_var(i).unwrap();
    }
    let functions: Vec<Ref> = (0..16).map(|bits| from_bits(&bdd, bits, 2)).collect();
    for (fb, &f) in functions.iter().enumerate() {
        for (gb, &g) in functions.iter().enumerate() {
            for (hb, &h) in functions.iter().enumerate() {
                let r = bdd.apply_ite(f, g, h).unwrap();
                let expected = ((fb & gb) | (!fb & hb)) & 0xF;
                assert_eq!(truth_table(&bdd, r, 2), expected as u64, "ite({:04b}, {:04b}, {:04b})", fb, gb, hb);
            }
        }
    }
    bdd.check_invariants().unwrap();
}

#[test]
fn test_ite_random_four_variables() {
    let bdd = Bdd::default();
    for i in 0..4 {
        bdd.declare_var(i).unwrap();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for _ in 0..2000 {
        let fb = rng.random_range(0..(1u64 << 16));
        let gb = rng.random_range(0..(1u64 << 16));
        let hb = rng.random_range(0..(1u64 << 16));
        let f = from_bits(&bdd, fb, 4);
        let g = from_bits(&bdd, gb, 4);
        let h = from_bits(&bdd, hb, 4);

        let mask = 0xFFFF;
        assert_eq!(truth_table(&bdd, bdd.apply_ite(f, g, h).unwrap(), 4), ((fb & gb) | (!fb & hb)) & mask);
        assert_eq!(truth_table(&bdd, bdd.apply_and(f, g).unwrap(), 4), fb & gb);
        assert_eq!(truth_table(&bdd, bdd.apply_or(f, g).unwrap(), 4), fb | gb);
        assert_eq!(truth_table(&bdd, bdd.apply_xor(f, g).unwrap(), 4), fb ^ gb);
        assert_eq!(truth_table(&bdd, bdd.apply_eq(f, g).unwrap(), 4), !(fb ^ gb) & mask);
        assert_eq!(truth_table(&bdd, bdd.apply_imply(f, g).unwrap(), 4), (!fb | gb) & mask);
        assert_eq!(bdd.check_intersect(f, g).unwrap(), fb & gb != 0);
    }
}

#[test]
fn test_cache_transparency() {
    let bdd = Bdd::default();
    for i in 0..4 {
        bdd.declare_var(i).unwrap();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let triples: Vec<(u64, u64, u64)> = (0..300)
        .map(|_| {
            (
                rng.random_range(0..(1u64 << 16)),
                rng.random_range(0..(1u64 << 16)),
                rng.random_range(0..(1u64 << 16)),
            )
        })
        .collect();

    // Every operator with a table that survives between calls.
    let run = |bdd: &Bdd| -> Vec<(Vec<Ref>, Cover)> {
        triples
            .iter()
            .map(|&(fb, gb, hb)| {
                let f = from_bits(bdd, fb, 4);
                let g = from_bits(bdd, gb, 4);
                let h = from_bits(bdd, hb, 4);
                let l = bdd.apply_and(f, g).unwrap();
                let u = bdd.apply_or(f, h).unwrap();
                let (sop, cover) = bdd.isop(l, u).unwrap();
                let mut results = vec![
                    bdd.apply_ite(f, g, h).unwrap(),
                    bdd.apply_and(f, g).unwrap(),
                    sop,
                    bdd.minimal_support(l, u).unwrap(),
                ];
                if gb != 0 {
                    results.push(bdd.constrain(f, g).unwrap());
                }
                (results, cover)
            })
            .collect()
    };

    let warm = run(&bdd);
    let hits: usize = bdd.cache_stats().iter().map(|s| s.hits).sum();
    println!("hits after the first run: {}", hits);

    bdd.clear_caches();
    assert!(bdd.cache_stats().iter().all(|s| s.used == 0));
    let cold = run(&bdd);
    assert_eq!(warm, cold);

    // A fresh manager agrees on the truth tables and the covers.
    let other = Bdd::default();
    for i in 0..4 {
        other.declare_var(i).unwrap();
    }
    let fresh = run(&other);
    for ((rs, cover), (os, other_cover)) in warm.iter().zip(&fresh) {
        assert_eq!(cover, other_cover);
        assert_eq!(rs.len(), os.len());
        for (&r, &o) in rs.iter().zip(os) {
            assert_eq!(truth_table(&bdd, r, 4), truth_table(&other, o, 4));
        }
    }
}

#[test]
fn test_many_operand_folds() {
    let bdd = Bdd::default();
    let vars: Vec<Ref> = (0..5).map(|i| bdd.mk_var(i).unwrap()).collect();
    let and = bdd.apply_and_many(vars.iter().copied()).unwrap();
    let or = bdd.apply_or_many(vars.iter().copied()).unwrap();
    let xor = bdd.apply_xor_many(vars.iter().copied()).unwrap();
    assert_eq!(truth_table(&bdd, and, 5), 1 << 31);
    assert_eq!(truth_table(&bdd, or, 5), 0xFFFF_FFFE);
    let parity = (0..32u64).filter(|r| r.count_ones() % 2 == 1).fold(0, |acc, r| acc | (1 << r));
    assert_eq!(truth_table(&bdd, xor, 5), parity);

    assert_eq!(bdd.apply_and_many([]).unwrap(), bdd.one());
    assert_eq!(bdd.apply_or_many([]).unwrap(), bdd.zero());
    assert_eq!(bdd.apply_xor_many([]).unwrap(), bdd.zero());
}
