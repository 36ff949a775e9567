//! Property tests over arbitrary operation sequences.

use proptest::collection::vec;
use proptest::prelude::*;
use rndpool::pool::{POOL_BITS, POOL_WORDS};
use rndpool::{EntropyPool, HashAlgorithm, PoolConfig, Quality};

#[derive(Debug, Clone)]
enum Op {
    AddWord(u32),
    AddBytes(Vec<u8>, u32),
    Set(u32),
    Increment(u32),
    Extract(usize, Quality),
}

fn quality() -> impl Strategy<Value = Quality> {
    prop_oneof![Just(Quality::Any), Just(Quality::Good)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::AddWord),
        (vec(any::<u8>(), 0..40), 0u32..6000).prop_map(|(buf, bits)| Op::AddBytes(buf, bits)),
        any::<u32>().prop_map(Op::Set),
        any::<u32>().prop_map(Op::Increment),
        (0usize..80, quality()).prop_map(|(n, q)| Op::Extract(n, q)),
    ]
}

fn config() -> impl Strategy<Value = PoolConfig> {
    (
        prop_oneof![Just(HashAlgorithm::Blake3), Just(HashAlgorithm::Sha256)],
        any::<bool>(),
        0u32..64,
    )
        .prop_map(|(algorithm, fold_digest, good_threshold_bytes)| PoolConfig {
            algorithm,
            fold_digest,
            good_threshold_bytes,
        })
}

proptest! {
    #[test]
    fn invariants_hold_for_any_sequence(config in config(), ops in vec(op(), 1..60)) {
        let mut pool = EntropyPool::new(config);

        for op in ops {
            match op {
                Op::AddWord(w) => pool.add_word(w),
                Op::AddBytes(buf, bits) => pool.add_bytes(&buf, bits),
                Op::Set(bits) => pool.set_entropy_estimate(bits),
                Op::Increment(bits) => pool.increment_entropy(bits),
                Op::Extract(n, q) => {
                    let mut out = vec![0u8; n];
                    let produced = pool.extract(&mut out, q);
                    prop_assert!(produced <= n);
                    if q == Quality::Any {
                        prop_assert_eq!(produced, n);
                    }
                }
            }

            prop_assert!(pool.entropy_estimate() <= POOL_BITS);
            prop_assert!(pool.cursor() < POOL_WORDS);
            prop_assert!(pool.rotation() <= 31);
        }
    }

    #[test]
    fn any_extraction_debits_exactly(start in 0u32..=POOL_BITS, n in 1usize..200) {
        let mut pool = EntropyPool::default();
        pool.add_bytes(b"seed material", 0);
        pool.set_entropy_estimate(start);

        let mut out = vec![0u8; n];
        prop_assert_eq!(pool.extract(&mut out, Quality::Any), n);

        let expected = u64::from(start).saturating_sub(8 * n as u64);
        prop_assert_eq!(u64::from(pool.entropy_estimate()), expected);
    }

    #[test]
    fn good_extraction_never_outruns_estimate(start in 0u32..=POOL_BITS, n in 1usize..600) {
        let mut pool = EntropyPool::default();
        pool.add_bytes(b"seed material", 0);
        pool.set_entropy_estimate(start);

        let mut out = vec![0u8; n];
        let produced = pool.extract(&mut out, Quality::Good);

        if u64::from(start) < 8 * n as u64 {
            prop_assert!(produced < n);
        }
        prop_assert!(8 * produced as u64 <= u64::from(start));
        prop_assert_eq!(
            u64::from(pool.entropy_estimate()),
            u64::from(start) - 8 * produced as u64
        );
        prop_assert_eq!(pool.stats().generated, 0);
    }
}

#[test]
fn consecutive_extractions_differ() {
    let mut pool = EntropyPool::default();
    let mut first = [0u8; 32];
    let mut second = [0u8; 32];

    pool.extract(&mut first, Quality::Any);
    pool.extract(&mut second, Quality::Any);
    assert_ne!(first, second);
}

#[test]
fn single_bit_spreads_to_output() {
    const BLOCK: usize = 16;

    let mut base = [0u8; 64];
    for (i, b) in base.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(29).wrapping_add(3);
    }
    let mut flipped = base;
    flipped[17] ^= 0x08;

    let mut a = EntropyPool::default();
    let mut b = EntropyPool::default();
    a.add_bytes(&base, 0);
    b.add_bytes(&flipped, 0);

    let mut per_bit = [0u32; BLOCK * 8];
    let mut total = 0u32;
    for round in 0..POOL_WORDS as u32 {
        let noise = round.wrapping_mul(0x9E37_79B9).to_le_bytes();
        a.add_bytes(&noise, 0);
        b.add_bytes(&noise, 0);

        let mut out_a = [0u8; BLOCK];
        let mut out_b = [0u8; BLOCK];
        a.extract(&mut out_a, Quality::Any);
        b.extract(&mut out_b, Quality::Any);

        for (byte, (x, y)) in out_a.iter().zip(out_b.iter()).enumerate() {
            let diff = x ^ y;
            total += diff.count_ones();
            for bit in 0..8 {
                per_bit[byte * 8 + bit] += u32::from((diff >> bit) & 1);
            }
        }
    }

    let rounds = POOL_WORDS as f64;
    let rate = f64::from(total) / (rounds * (BLOCK * 8) as f64);
    assert!((0.45..0.55).contains(&rate), "overall flip rate {rate}");

    for (position, &count) in per_bit.iter().enumerate() {
        let rate = f64::from(count) / rounds;
        assert!(
            (0.2..0.8).contains(&rate),
            "bit {position} flipped at rate {rate}"
        );
    }
}
