use pretty_assertions::assert_eq;
use {
  super::*,
  ringscan::{
    index::store::{InputRow, RefRow, Store},
    subcommand::extract::Output,
  },
};

fn three_blocks() -> mocknode::Handle {
  let node = mocknode::spawn();
  node.push_block(&[TransactionTemplate::coinbase(&[10])]);
  node.push_block(&[TransactionTemplate::coinbase(&[10])]);
  node.push_block(&[TransactionTemplate::spend(&[(10, &[1])], &[])]);
  node
}

fn database(tempdir: &Path) -> Store {
  Store::open(&tempdir.join("ringscan.sqlite3")).unwrap()
}

#[test]
fn three_block_chain() {
  let node = three_blocks();

  let (tempdir, output) = CommandBuilder::new("extract")
    .node(&node)
    .run_and_deserialize_output_with_tempdir::<Output>();

  assert_eq!(
    output.summary,
    Summary {
      start_height: 1,
      stop_height: 3,
      resumed_from: None,
      blocks: 3,
      inputs: 1,
      outputs: 2,
      refs: 1,
      skipped_rows: 0,
      denominations: 1,
    }
  );

  assert_eq!(output.database, tempdir.path().join("ringscan.sqlite3"));

  let store = database(tempdir.path());

  assert_eq!(
    store
      .outputs()
      .unwrap()
      .iter()
      .map(|row| (row.oid.to_string(), row.amount, row.gidx))
      .collect::<Vec<(String, u64, u32)>>(),
    [("10-0".into(), 10, 0), ("10-1".into(), 10, 1)]
  );

  assert_eq!(
    store.inputs().unwrap(),
    [InputRow {
      iid: 0,
      mixin: 0,
      value: 10,
      anonset: 1,
    }]
  );

  assert_eq!(
    store.refs().unwrap(),
    [RefRow {
      iid: 0,
      oid: "10-1".parse().unwrap(),
    }]
  );
}

#[test]
fn stop_height_above_tip_fails() {
  let node = three_blocks();

  let tempdir = CommandBuilder::new("extract --to 4")
    .node(&node)
    .expected_exit_code(1)
    .stderr_contains("error: block 4 not found")
    .run_and_return_tempdir();

  assert!(database(tempdir.path()).is_empty().unwrap());
}

#[test]
fn invalid_range_fails() {
  let node = three_blocks();

  CommandBuilder::new("extract --from 3 --to 2")
    .node(&node)
    .expected_exit_code(1)
    .stderr_contains("error: invalid height range 3..=2")
    .run_and_extract_stdout();
}

#[test]
fn missing_transaction_fails() {
  let node = three_blocks();

  let hash = node.state().block(2).unwrap().transaction_hashes[0];
  node.state().remove_transaction(hash);

  let tempdir = CommandBuilder::new("extract")
    .node(&node)
    .expected_exit_code(1)
    .stderr_contains(&format!("error: transaction {hash} in block 2 not found"))
    .run_and_return_tempdir();

  assert!(database(tempdir.path()).is_empty().unwrap());
}

#[test]
fn unreachable_node_fails() {
  CommandBuilder::new("--node-rpc-url http://127.0.0.1:1/json_rpc extract")
    .expected_exit_code(1)
    .stderr_contains("error: failed to call `getblockcount`")
    .run_and_extract_stdout();
}

#[test]
fn resume_after_partial_extraction() {
  let node = three_blocks();

  let tempdir = CommandBuilder::new("extract --to 2")
    .node(&node)
    .run_and_return_tempdir();

  let (tempdir, output) = CommandBuilder::new("extract")
    .node(&node)
    .tempdir(tempdir)
    .run_and_deserialize_output_with_tempdir::<Output>();

  assert_eq!(output.summary.resumed_from, Some(2));
  assert_eq!(output.summary.blocks, 1);
  assert_eq!(output.summary.inputs, 1);

  let store = database(tempdir.path());
  assert_eq!(store.outputs().unwrap().len(), 2);
  assert_eq!(store.inputs().unwrap()[0].anonset, 1);
}

#[test]
fn different_start_height_requires_fresh() {
  let node = three_blocks();

  let tempdir = CommandBuilder::new("extract")
    .node(&node)
    .run_and_return_tempdir();

  let tempdir = CommandBuilder::new("extract --from 2")
    .node(&node)
    .tempdir(tempdir)
    .expected_exit_code(1)
    .stderr_contains("use `--fresh` to replace them")
    .run_and_return_tempdir();

  let (tempdir, output) = CommandBuilder::new("extract --from 2 --fresh")
    .node(&node)
    .tempdir(tempdir)
    .run_and_deserialize_output_with_tempdir::<Output>();

  assert_eq!(output.summary.blocks, 2);
  assert_eq!(
    database(tempdir.path())
      .outputs()
      .unwrap()
      .len(),
    1
  );
}

#[test]
fn commit_interval_from_environment() {
  let node = three_blocks();

  let output = CommandBuilder::new("extract --write-errors skip")
    .node(&node)
    .env("RINGSCAN_COMMIT_INTERVAL", "1")
    .run_and_deserialize_output::<Output>();

  assert_eq!(output.summary.blocks, 3);
  assert_eq!(output.summary.skipped_rows, 0);
}

#[test]
fn zero_commit_interval_is_rejected() {
  CommandBuilder::new("--commit-interval 0 extract")
    .expected_exit_code(1)
    .stderr_contains("commit interval must be at least one block")
    .run_and_extract_stdout();
}
