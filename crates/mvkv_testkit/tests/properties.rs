//! Property tests over generated command scripts.

use mvkv_core::{Connection, CoreError};
use mvkv_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::HashMap;

/// Runs `op` on `conn`, beginning a transaction first if the op needs
/// one. A `begin` on an active connection is skipped.
fn apply(
    conn: &mut Connection<'_>,
    op: &ScriptOp,
    began: &mut Vec<u64>,
) -> Option<Result<String, CoreError>> {
    if op.needs_transaction() && !conn.is_active() {
        began.push(conn.must_execute("begin", &[]).parse().unwrap());
    }
    if !op.needs_transaction() && conn.is_active() {
        return None;
    }

    let result = conn.execute(op.name(), &op.args());
    if let (ScriptOp::Begin, Ok(id)) = (op, &result) {
        began.push(id.parse().unwrap());
    }
    Some(result)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ids_strictly_increase(script in script_strategy(3, 60)) {
        let db = TestDatabase::read_uncommitted();
        let mut connections: Vec<_> = (0..3).map(|_| db.new_connection()).collect();
        let mut began = Vec::new();

        for (idx, op) in &script {
            apply(&mut connections[*idx], op, &mut began);
        }

        prop_assert!(began.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(db.stats().transactions(), began.len());
    }

    #[test]
    fn at_most_one_live_version_per_key(script in script_strategy(3, 60)) {
        let db = TestDatabase::read_uncommitted();
        let mut connections: Vec<_> = (0..3).map(|_| db.new_connection()).collect();
        let mut began = Vec::new();

        for (idx, op) in &script {
            apply(&mut connections[*idx], op, &mut began);
            for key in db.keys() {
                prop_assert!(db.live_versions(&key) <= 1, "key {} has several live versions", key);
            }
        }
    }

    #[test]
    fn reads_match_last_write(script in script_strategy(3, 60)) {
        // Read uncommitted never rolls back, so a plain map of the last
        // write per key is an exact model across all connections.
        let db = TestDatabase::read_uncommitted();
        let mut connections: Vec<_> = (0..3).map(|_| db.new_connection()).collect();
        let mut began = Vec::new();
        let mut model: HashMap<String, String> = HashMap::new();

        for (idx, op) in &script {
            let Some(result) = apply(&mut connections[*idx], op, &mut began) else {
                continue;
            };
            match op {
                ScriptOp::Get(key) => match model.get(key) {
                    Some(expected) => prop_assert_eq!(result.unwrap(), expected.clone()),
                    None => prop_assert!(matches!(result, Err(CoreError::NotFound { .. })), "expected NotFound, got {:?}", result),
                },
                ScriptOp::Set(key, value) => {
                    prop_assert_eq!(result.unwrap(), value.clone());
                    model.insert(key.clone(), value.clone());
                }
                ScriptOp::Delete(key) => {
                    if model.remove(key).is_some() {
                        prop_assert_eq!(result.unwrap(), "");
                    } else {
                        prop_assert!(matches!(result, Err(CoreError::NotFound { .. })), "expected NotFound, got {:?}", result);
                    }
                }
                ScriptOp::Begin | ScriptOp::Abort | ScriptOp::Commit => {
                    prop_assert!(result.is_ok());
                }
            }
        }
    }
}
