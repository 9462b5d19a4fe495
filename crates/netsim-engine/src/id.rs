//! Identifier generation
//!
//! Ids are UUID v4 strings drawn from a caller-supplied RNG and checked
//! against every id in the tree before being returned.

use std::collections::HashSet;

use rand::Rng;
use uuid::Builder;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::tree::ScenarioTree;

/// Fresh id unused in `tree`
///
/// # Errors
/// `IdExhausted` if every attempt collided
pub fn new_id(tree: &ScenarioTree) -> Result<String> {
    new_id_with(
        tree,
        &mut rand::rng(),
        EngineConfig::default().max_id_attempts,
        &HashSet::new(),
    )
}

/// Fresh id unused in `tree` and not in `reserved`
///
/// `reserved` covers ids handed out in the same operation but not yet
/// attached.
///
/// # Errors
/// `IdExhausted` after `max_attempts` collisions
pub fn new_id_with<R: Rng + ?Sized>(
    tree: &ScenarioTree,
    rng: &mut R,
    max_attempts: usize,
    reserved: &HashSet<String>,
) -> Result<String> {
    for attempt in 0..max_attempts.max(1) {
        let id = Builder::from_random_bytes(rng.random::<[u8; 16]>())
            .into_uuid()
            .to_string();
        if !tree.contains_id(&id) && !reserved.contains(&id) {
            return Ok(id);
        }
        tracing::debug!(attempt, %id, "id collision, retrying");
    }
    Err(EngineError::IdExhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::create_new_scenario;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ids_are_uuid_v4() {
        let tree = ScenarioTree::new("demo");
        let id = new_id(&tree).unwrap();
        let parsed = uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn retries_past_reserved_ids() {
        let tree = ScenarioTree::new("demo");
        let first = new_id_with(&tree, &mut StdRng::seed_from_u64(7), 4, &HashSet::new()).unwrap();

        // Same seed yields the same first draw, which is now reserved.
        let reserved = HashSet::from([first.clone()]);
        let second = new_id_with(&tree, &mut StdRng::seed_from_u64(7), 4, &reserved).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let tree = ScenarioTree::new("demo");
        let first = new_id_with(&tree, &mut StdRng::seed_from_u64(1), 1, &HashSet::new()).unwrap();
        let reserved = HashSet::from([first]);
        let err = new_id_with(&tree, &mut StdRng::seed_from_u64(1), 1, &reserved).unwrap_err();
        assert!(matches!(err, EngineError::IdExhausted(1)));
    }

    proptest! {
        #[test]
        fn sequential_ids_are_distinct(seed in any::<u64>(), n in 1usize..64) {
            let tree = create_new_scenario("demo").unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut seen = HashSet::new();
            for _ in 0..n {
                let id = new_id_with(&tree, &mut rng, 16, &seen).unwrap();
                prop_assert!(!tree.contains_id(&id));
                prop_assert!(seen.insert(id));
            }
        }
    }
}
