//! Property-based tests for the request cache.
//!
//! Runs arbitrary insert / invalidate / clock sequences against a simple
//! model and checks that the cache never serves an entry the contract says is
//! gone.

use std::{collections::HashMap, ops::Sub, time::Duration};

use neuroviz_client::{CacheKey, CacheScope, QueryCache};
use proptest::prelude::*;
use serde_json::json;

const TTL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Secs(u64);

impl Sub for Secs {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_secs(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert { scope: CacheScope, id: u8 },
    Invalidate(CacheScope),
    Clear,
    Advance(u64),
    Get { scope: CacheScope, id: u8 },
}

fn scope() -> impl Strategy<Value = CacheScope> {
    prop_oneof![Just(CacheScope::User), Just(CacheScope::Sessions)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (scope(), 0u8..4).prop_map(|(scope, id)| Op::Insert { scope, id }),
        1 => scope().prop_map(Op::Invalidate),
        1 => Just(Op::Clear),
        3 => (0u64..8).prop_map(Op::Advance),
        4 => (scope(), 0u8..4).prop_map(|(scope, id)| Op::Get { scope, id }),
    ]
}

fn key(scope: CacheScope, id: u8) -> CacheKey {
    CacheKey::new(scope, format!("GET /item/{id}"))
}

proptest! {
    #[test]
    fn cache_matches_model(ops in prop::collection::vec(op(), 0..80)) {
        let mut cache = QueryCache::new(Duration::from_secs(TTL_SECS));
        // Oracle: key -> (value, stored_at)
        let mut model: HashMap<CacheKey, (u64, u64)> = HashMap::new();
        let mut now = 0u64;
        let mut version = 0u64;

        for op in ops {
            match op {
                Op::Insert { scope, id } => {
                    version += 1;
                    cache.insert(key(scope, id), json!(version), Secs(now));
                    model.insert(key(scope, id), (version, now));
                },
                Op::Invalidate(scope) => {
                    cache.invalidate(scope);
                    model.retain(|k, _| k.scope != scope);
                },
                Op::Clear => {
                    cache.clear();
                    model.clear();
                },
                Op::Advance(secs) => now += secs,
                Op::Get { scope, id } => {
                    let expected = model
                        .get(&key(scope, id))
                        .filter(|(_, stored_at)| now - stored_at < TTL_SECS)
                        .map(|(value, _)| json!(*value));
                    prop_assert_eq!(cache.get(&key(scope, id), Secs(now)).cloned(), expected);
                },
            }
        }
    }
}
