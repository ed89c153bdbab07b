use proptest::prelude::*;

use crate::engine::errors::MergeError;
use crate::engine::merge::merged_result::{CursorState, MergedResult, MergedResultKind};
use crate::engine::merge::ordered::OrderedMergedResult;
use crate::engine::merge::ordering::{OrderByItem, OrderingKey};
use crate::engine::merge::statement::Dialect;
use crate::engine::types::ScalarValue;
use crate::test_helpers::factories::{CursorProbe, ShardCursorFactory};

fn ordered(shards: &[Vec<Vec<i64>>], items: &[OrderByItem]) -> MergedResultKind {
    let key = OrderingKey::resolve(items, Dialect::MySql);
    MergedResultKind::Ordered(OrderedMergedResult::new(
        ShardCursorFactory::from_int_shards(shards),
        key,
    ))
}

fn int_rows(merged: &mut MergedResultKind) -> Vec<Vec<i64>> {
    merged
        .collect_rows()
        .unwrap()
        .into_iter()
        .map(|row| row.iter().map(|v| v.as_i64().unwrap()).collect())
        .collect()
}

#[test]
fn merges_sorted_shards_ascending() {
    let mut merged = ordered(
        &[
            vec![vec![1], vec![4], vec![7]],
            vec![vec![2], vec![5]],
            vec![vec![3], vec![6], vec![8], vec![9]],
        ],
        &[OrderByItem::asc(0)],
    );

    let values: Vec<i64> = int_rows(&mut merged).into_iter().map(|r| r[0]).collect();
    assert_eq!(values, (1..=9).collect::<Vec<_>>());
}

#[test]
fn merges_sorted_shards_descending() {
    let mut merged = ordered(
        &[vec![vec![9], vec![3]], vec![vec![8], vec![2]], vec![vec![5]]],
        &[OrderByItem::desc(0)],
    );

    let values: Vec<i64> = int_rows(&mut merged).into_iter().map(|r| r[0]).collect();
    assert_eq!(values, vec![9, 8, 5, 3, 2]);
}

#[test]
fn ties_follow_shard_registration_order() {
    // second column records the shard
    let mut merged = ordered(
        &[
            vec![vec![1, 0], vec![2, 0]],
            vec![vec![1, 1], vec![2, 1]],
            vec![vec![1, 2]],
        ],
        &[OrderByItem::asc(0)],
    );

    assert_eq!(
        int_rows(&mut merged),
        vec![vec![1, 0], vec![1, 1], vec![1, 2], vec![2, 0], vec![2, 1]]
    );
}

#[test]
fn multi_key_ordering_uses_secondary_column() {
    let mut merged = ordered(
        &[
            vec![vec![1, 9], vec![2, 5]],
            vec![vec![1, 7], vec![2, 8]],
        ],
        &[OrderByItem::asc(0), OrderByItem::desc(1)],
    );

    assert_eq!(
        int_rows(&mut merged),
        vec![vec![1, 9], vec![1, 7], vec![2, 8], vec![2, 5]]
    );
}

#[test]
fn nulls_are_placed_by_resolved_null_ordering() {
    let shards = vec![
        ShardCursorFactory::new()
            .with_rows(vec![vec![ScalarValue::Null], vec![ScalarValue::Int64(4)]])
            .boxed(),
        ShardCursorFactory::new()
            .with_rows(vec![vec![ScalarValue::Int64(2)]])
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = MergedResultKind::Ordered(OrderedMergedResult::new(shards, key));

    let rows = merged.collect_rows().unwrap();
    assert_eq!(
        rows,
        vec![
            vec![ScalarValue::Null],
            vec![ScalarValue::Int64(2)],
            vec![ScalarValue::Int64(4)],
        ]
    );
}

#[test]
fn buffers_at_most_one_row_per_shard() {
    let probes = [CursorProbe::default(), CursorProbe::default()];
    let shards = vec![
        ShardCursorFactory::new()
            .with_int_rows(&[&[1], &[2], &[3]])
            .with_probe(probes[0].clone())
            .boxed(),
        ShardCursorFactory::new()
            .with_int_rows(&[&[10], &[11]])
            .with_probe(probes[1].clone())
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = OrderedMergedResult::new(shards, key);

    assert!(merged.advance().unwrap());
    assert_eq!(probes[0].advances(), 1);
    assert_eq!(probes[1].advances(), 1);
    assert!(merged.advance().unwrap());
    assert_eq!(merged.value(0).unwrap(), ScalarValue::Int64(2));
    assert_eq!(probes[0].advances(), 2);
    assert_eq!(probes[1].advances(), 1);
}

#[test]
fn empty_shards_produce_empty_result() {
    let mut merged = ordered(&[vec![], vec![]], &[OrderByItem::asc(0)]);
    assert!(!merged.advance().unwrap());
    assert_eq!(merged.state(), CursorState::Exhausted);
    assert!(matches!(merged.value(0), Err(MergeError::NotPositioned)));
}

#[test]
fn fault_while_priming_is_reported_for_that_shard() {
    let shards = vec![
        ShardCursorFactory::new().with_int_rows(&[&[1]]).boxed(),
        ShardCursorFactory::new()
            .with_int_rows(&[&[2]])
            .failing_on_advance(1)
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = OrderedMergedResult::new(shards, key);

    assert!(matches!(
        merged.advance(),
        Err(MergeError::Shard { shard: 1, .. })
    ));
    assert!(!merged.advance().unwrap());
}

#[test]
fn close_reaches_live_and_drained_cursors() {
    let probes = [CursorProbe::default(), CursorProbe::default()];
    let shards = vec![
        ShardCursorFactory::new()
            .with_int_rows(&[&[1], &[5]])
            .with_probe(probes[0].clone())
            .boxed(),
        ShardCursorFactory::new()
            .with_rows(Vec::new())
            .with_probe(probes[1].clone())
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = OrderedMergedResult::new(shards, key);

    assert!(merged.advance().unwrap());
    merged.close();
    assert!(probes.iter().all(|p| p.is_closed()));
    assert!(!merged.advance().unwrap());
}

fn arb_sorted_shards() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-50i64..50, 0..12), 1..6).prop_map(|shards| {
        shards
            .into_iter()
            .map(|mut rows| {
                rows.sort();
                rows
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn kway_output_is_globally_sorted(shards in arb_sorted_shards(), descending in any::<bool>()) {
        let shards: Vec<Vec<i64>> = shards
            .into_iter()
            .map(|mut rows| {
                if descending {
                    rows.reverse();
                }
                rows
            })
            .collect();
        let as_rows: Vec<Vec<Vec<i64>>> = shards
            .iter()
            .map(|rows| rows.iter().map(|v| vec![*v]).collect())
            .collect();
        let item = if descending { OrderByItem::desc(0) } else { OrderByItem::asc(0) };
        let mut merged = ordered(&as_rows, &[item]);

        let values: Vec<i64> = int_rows(&mut merged).into_iter().map(|r| r[0]).collect();

        let mut expected: Vec<i64> = shards.into_iter().flatten().collect();
        expected.sort();
        if descending {
            expected.reverse();
        }
        prop_assert_eq!(values, expected);
    }
}

#[test]
fn close_after_priming_fault_reaches_every_cursor() {
    let probes = [
        CursorProbe::default(),
        CursorProbe::default(),
        CursorProbe::default(),
    ];
    let shards = vec![
        ShardCursorFactory::new()
            .with_int_rows(&[&[1]])
            .with_probe(probes[0].clone())
            .boxed(),
        ShardCursorFactory::new()
            .with_int_rows(&[&[2]])
            .failing_on_advance(1)
            .with_probe(probes[1].clone())
            .boxed(),
        ShardCursorFactory::new()
            .with_int_rows(&[&[3]])
            .with_probe(probes[2].clone())
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = OrderedMergedResult::new(shards, key);

    assert!(matches!(
        merged.advance(),
        Err(MergeError::Shard { shard: 1, .. })
    ));
    merged.close();

    assert!(probes.iter().all(|p| p.is_closed()));
    // the shard after the faulting one was never drawn from
    assert_eq!(probes[2].advances(), 0);
}

#[test]
fn close_after_fault_mid_stream_reaches_every_cursor() {
    let probes = [CursorProbe::default(), CursorProbe::default()];
    let shards = vec![
        ShardCursorFactory::new()
            .with_int_rows(&[&[1], &[3]])
            .failing_on_advance(2)
            .with_probe(probes[0].clone())
            .boxed(),
        ShardCursorFactory::new()
            .with_int_rows(&[&[2]])
            .with_probe(probes[1].clone())
            .boxed(),
    ];
    let key = OrderingKey::resolve(&[OrderByItem::asc(0)], Dialect::MySql);
    let mut merged = OrderedMergedResult::new(shards, key);

    assert!(merged.advance().unwrap());
    assert!(matches!(
        merged.advance(),
        Err(MergeError::Shard { shard: 0, .. })
    ));
    merged.close();

    assert!(probes.iter().all(|p| p.is_closed()));
}
