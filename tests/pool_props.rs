//! Property tests for the enemy pool bookkeeping

use dodge_spike::sim::{EnemyId, EnemyKind, EnemyPool, PoolError, SpawnSide};
use glam::Vec2;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Acquire,
    /// Release the n-th live id (mod len), if any
    Release(usize),
    /// Release an id that was already released
    ReleaseStale(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Acquire),
        3 => any::<usize>().prop_map(Op::Release),
        1 => any::<usize>().prop_map(Op::ReleaseStale),
        1 => Just(Op::Clear),
    ]
}

fn acquire(pool: &mut EnemyPool) -> Result<EnemyId, PoolError> {
    pool.acquire(EnemyKind::Basic, SpawnSide::Top, Vec2::new(100.0, -50.0))
}

proptest! {
    #[test]
    fn pool_bookkeeping_holds(floor in 0usize..8, extra in 0usize..8, ops in prop::collection::vec(op(), 1..200)) {
        let ceiling = floor + extra;
        let mut pool = EnemyPool::new(floor, ceiling);
        let mut live: Vec<EnemyId> = Vec::new();
        let mut dead: Vec<EnemyId> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire => match acquire(&mut pool) {
                    Ok(id) => {
                        prop_assert!(!live.contains(&id));
                        live.push(id);
                    }
                    Err(PoolError::Exhausted { ceiling: c }) => {
                        prop_assert_eq!(c, ceiling);
                        prop_assert_eq!(live.len(), ceiling);
                    }
                },
                Op::Release(n) => {
                    if !live.is_empty() {
                        let id = live.remove(n % live.len());
                        prop_assert!(pool.release(id));
                        dead.push(id);
                    }
                }
                Op::ReleaseStale(n) => {
                    if !dead.is_empty() {
                        let before = pool.stats();
                        prop_assert!(!pool.release(dead[n % dead.len()]));
                        prop_assert_eq!(pool.stats(), before);
                    }
                }
                Op::Clear => {
                    pool.clear();
                    dead.append(&mut live);
                }
            }

            let stats = pool.stats();
            prop_assert_eq!(stats.active, live.len());
            prop_assert!(stats.active <= ceiling);
            prop_assert!(stats.pooled <= floor);
            prop_assert_eq!(stats.total, stats.active + stats.pooled);
            prop_assert!(stats.total >= floor);
            prop_assert_eq!(pool.active_members().count(), live.len());
            for id in &live {
                prop_assert!(pool.contains(*id));
            }
        }
    }

    #[test]
    fn released_slots_come_back_first(n in 1usize..10) {
        let mut pool = EnemyPool::new(10, 20);
        let ids: Vec<_> = (0..n).map(|_| acquire(&mut pool).unwrap()).collect();
        let last = ids[n - 1];
        pool.release(last);
        let again = acquire(&mut pool).unwrap();
        prop_assert_eq!(again.index(), last.index());
        prop_assert!(again.generation() > last.generation());
    }
}

#[test]
fn test_exhausted_pool_recovers_after_release() {
    let mut pool = EnemyPool::new(2, 3);
    let ids: Vec<_> = (0..3).map(|_| acquire(&mut pool).unwrap()).collect();
    assert!(matches!(acquire(&mut pool), Err(PoolError::Exhausted { .. })));
    pool.release(ids[1]);
    assert!(acquire(&mut pool).is_ok());
}
