use {
  super::*,
  rusqlite::{Connection, Row, Transaction, params, types::Type},
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS inputs (
  iid INTEGER NOT NULL,
  mixin INTEGER NOT NULL,
  value INTEGER NOT NULL,
  anonset INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS outputs (
  oid TEXT NOT NULL,
  amount INTEGER NOT NULL,
  gidx INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS refs (
  iid INTEGER NOT NULL,
  oid TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS progress (
  key TEXT PRIMARY KEY,
  value INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS denominations (
  amount INTEGER PRIMARY KEY,
  gidx INTEGER NOT NULL
);
";

const TABLES: [&str; 5] = ["inputs", "outputs", "refs", "progress", "denominations"];

const START_HEIGHT: &str = "start_height";
const HEIGHT: &str = "height";
const NEXT_IID: &str = "next_iid";

/// What to do when a single row cannot be written.
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteErrorPolicy {
  /// Fail the run, rolling back its open transaction.
  #[default]
  Abort,
  /// Log the failure, drop the row, and keep going.
  Skip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
  pub iid: u64,
  pub mixin: u64,
  pub value: Amount,
  pub anonset: GlobalIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
  pub oid: OutputId,
  pub amount: Amount,
  pub gidx: GlobalIndex,
}

impl From<&cryptonote::OutputDetails> for OutputRow {
  fn from(output: &cryptonote::OutputDetails) -> Self {
    Self {
      oid: output.id(),
      amount: output.amount,
      gidx: output.global_index,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefRow {
  pub iid: u64,
  pub oid: OutputId,
}

/// The last committed point of an extraction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
  pub start_height: u32,
  pub height: u32,
  pub next_iid: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
  pub inputs: u64,
  pub outputs: u64,
  pub refs: u64,
  pub denominations: u64,
  pub checkpoint: Option<Checkpoint>,
}

fn output_id(row: &Row, index: usize) -> rusqlite::Result<OutputId> {
  row
    .get::<_, String>(index)?
    .parse()
    .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

pub struct Store {
  connection: Connection,
  path: PathBuf,
}

impl Store {
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory `{}`", parent.display()))?;
    }

    let connection = Connection::open(path)
      .with_context(|| format!("failed to open database `{}`", path.display()))?;

    connection
      .execute_batch(SCHEMA)
      .with_context(|| format!("failed to create schema in `{}`", path.display()))?;

    Ok(Self {
      connection,
      path: path.into(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns the last committed checkpoint, if any.
  pub fn progress(&self) -> Result<Option<Checkpoint>> {
    let values = self
      .connection
      .prepare_cached("SELECT key, value FROM progress")?
      .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?)))?
      .collect::<rusqlite::Result<HashMap<String, u64>>>()?;

    if values.is_empty() {
      return Ok(None);
    }

    let value = |key: &str| {
      values
        .get(key)
        .copied()
        .ok_or_else(|| anyhow!("checkpoint in `{}` is missing `{key}`", self.path.display()))
    };

    Ok(Some(Checkpoint {
      start_height: value(START_HEIGHT)?.try_into()?,
      height: value(HEIGHT)?.try_into()?,
      next_iid: value(NEXT_IID)?,
    }))
  }

  /// Restores the denomination index saved with the last checkpoint.
  pub fn denominations(&self) -> Result<Denominations> {
    Ok(
      self
        .connection
        .prepare_cached("SELECT amount, gidx FROM denominations ORDER BY amount")?
        .query_map([], |row| {
          Ok((row.get::<_, Amount>(0)?, row.get::<_, GlobalIndex>(1)?))
        })?
        .collect::<rusqlite::Result<Denominations>>()?,
    )
  }

  fn count(&self, table: &str) -> Result<u64> {
    Ok(
      self
        .connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
          row.get(0)
        })?,
    )
  }

  pub fn is_empty(&self) -> Result<bool> {
    for table in TABLES {
      if self.count(table)? > 0 {
        return Ok(false);
      }
    }

    Ok(true)
  }

  pub fn statistics(&self) -> Result<Statistics> {
    Ok(Statistics {
      inputs: self.count("inputs")?,
      outputs: self.count("outputs")?,
      refs: self.count("refs")?,
      denominations: self.count("denominations")?,
      checkpoint: self.progress()?,
    })
  }

  pub fn inputs(&self) -> Result<Vec<InputRow>> {
    Ok(
      self
        .connection
        .prepare_cached("SELECT iid, mixin, value, anonset FROM inputs ORDER BY rowid")?
        .query_map([], |row| {
          Ok(InputRow {
            iid: row.get(0)?,
            mixin: row.get(1)?,
            value: row.get(2)?,
            anonset: row.get(3)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<InputRow>>>()?,
    )
  }

  pub fn outputs(&self) -> Result<Vec<OutputRow>> {
    Ok(
      self
        .connection
        .prepare_cached("SELECT oid, amount, gidx FROM outputs ORDER BY rowid")?
        .query_map([], |row| {
          Ok(OutputRow {
            oid: output_id(row, 0)?,
            amount: row.get(1)?,
            gidx: row.get(2)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<OutputRow>>>()?,
    )
  }

  pub fn refs(&self) -> Result<Vec<RefRow>> {
    Ok(
      self
        .connection
        .prepare_cached("SELECT iid, oid FROM refs ORDER BY rowid")?
        .query_map([], |row| {
          Ok(RefRow {
            iid: row.get(0)?,
            oid: output_id(row, 1)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<RefRow>>>()?,
    )
  }

  /// Opens the transaction that all writes of a run go through.
  pub fn begin_run(&mut self, policy: WriteErrorPolicy) -> Result<Run<'_>> {
    Ok(Run {
      transaction: self.connection.transaction()?,
      policy,
      skipped: 0,
    })
  }
}

/// An open write transaction. Dropping it without calling [`Run::commit`]
/// rolls back every row appended to it.
pub struct Run<'store> {
  transaction: Transaction<'store>,
  policy: WriteErrorPolicy,
  skipped: u64,
}

impl Run<'_> {
  /// Applies the write-error policy, returning whether the row was written.
  fn handle(&mut self, table: &str, result: rusqlite::Result<usize>) -> Result<bool> {
    match (result, self.policy) {
      (Ok(_), _) => Ok(true),
      (Err(err), WriteErrorPolicy::Abort) => {
        Err(err).with_context(|| format!("failed to write row to `{table}`"))
      }
      (Err(err), WriteErrorPolicy::Skip) => {
        log::warn!("Skipping row in `{table}`: {err}");
        self.skipped += 1;
        Ok(false)
      }
    }
  }

  pub fn append_input(&mut self, row: &InputRow) -> Result<bool> {
    let result = self
      .transaction
      .prepare_cached("INSERT INTO inputs (iid, mixin, value, anonset) VALUES (?1, ?2, ?3, ?4)")
      .and_then(|mut statement| statement.execute(params![row.iid, row.mixin, row.value, row.anonset]));

    self.handle("inputs", result)
  }

  pub fn append_output(&mut self, row: &OutputRow) -> Result<bool> {
    let result = self
      .transaction
      .prepare_cached("INSERT INTO outputs (oid, amount, gidx) VALUES (?1, ?2, ?3)")
      .and_then(|mut statement| {
        statement.execute(params![row.oid.to_string(), row.amount, row.gidx])
      });

    self.handle("outputs", result)
  }

  pub fn append_ref(&mut self, row: &RefRow) -> Result<bool> {
    let result = self
      .transaction
      .prepare_cached("INSERT INTO refs (iid, oid) VALUES (?1, ?2)")
      .and_then(|mut statement| statement.execute(params![row.iid, row.oid.to_string()]));

    self.handle("refs", result)
  }

  /// Deletes every row of every table, including the checkpoint.
  pub fn clear(&mut self) -> Result {
    for table in TABLES {
      self
        .transaction
        .execute(&format!("DELETE FROM {table}"), [])
        .with_context(|| format!("failed to clear `{table}`"))?;
    }

    Ok(())
  }

  /// Records the checkpoint and the denomination index in the open
  /// transaction. Checkpoint writes ignore the write-error policy.
  pub fn checkpoint(&mut self, checkpoint: &Checkpoint, denominations: &Denominations) -> Result {
    {
      let mut statement = self
        .transaction
        .prepare_cached("INSERT OR REPLACE INTO progress (key, value) VALUES (?1, ?2)")?;

      statement.execute(params![START_HEIGHT, checkpoint.start_height])?;
      statement.execute(params![HEIGHT, checkpoint.height])?;
      statement.execute(params![NEXT_IID, checkpoint.next_iid])?;
    }

    let mut statement = self
      .transaction
      .prepare_cached("INSERT OR REPLACE INTO denominations (amount, gidx) VALUES (?1, ?2)")?;

    for (amount, global_index) in denominations.iter() {
      statement.execute(params![amount, global_index])?;
    }

    Ok(())
  }

  /// Counts rows dropped without a write attempt, such as the references
  /// of an input that could not be written.
  pub fn skip(&mut self, rows: u64) {
    self.skipped += rows;
  }

  pub fn skipped(&self) -> u64 {
    self.skipped
  }

  /// Commits the transaction, returning how many rows were skipped.
  pub fn commit(self) -> Result<u64> {
    let skipped = self.skipped;
    self.transaction.commit()?;
    Ok(skipped)
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq, tempfile::TempDir};

  fn store() -> (TempDir, Store) {
    let tempdir = TempDir::new().unwrap();
    let store = Store::open(&tempdir.path().join("db").join("ringscan.sqlite3")).unwrap();
    (tempdir, store)
  }

  fn output(amount: Amount, gidx: GlobalIndex) -> OutputRow {
    OutputRow {
      oid: OutputId::new(amount, gidx),
      amount,
      gidx,
    }
  }

  #[test]
  fn open_creates_parent_directory_and_empty_schema() {
    let (_tempdir, store) = store();
    assert!(store.path().exists());
    assert!(store.is_empty().unwrap());
    assert_eq!(store.progress().unwrap(), None);
    assert!(store.denominations().unwrap().is_empty());
  }

  #[test]
  fn commit_persists_rows() {
    let (_tempdir, mut store) = store();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run
      .append_input(&InputRow {
        iid: 0,
        mixin: 1,
        value: 10,
        anonset: 4,
      })
      .unwrap();
    run.append_output(&output(10, 5)).unwrap();
    run
      .append_ref(&RefRow {
        iid: 0,
        oid: OutputId::new(10, 2),
      })
      .unwrap();
    run
      .append_ref(&RefRow {
        iid: 0,
        oid: OutputId::new(10, 3),
      })
      .unwrap();
    assert_eq!(run.commit().unwrap(), 0);

    assert_eq!(
      store.inputs().unwrap(),
      [InputRow {
        iid: 0,
        mixin: 1,
        value: 10,
        anonset: 4,
      }]
    );
    assert_eq!(store.outputs().unwrap(), [output(10, 5)]);
    assert_eq!(
      store
        .refs()
        .unwrap()
        .into_iter()
        .map(|row| row.oid.to_string())
        .collect::<Vec<String>>(),
      ["10-2", "10-3"]
    );
  }

  #[test]
  fn dropped_run_rolls_back() {
    let (_tempdir, mut store) = store();

    {
      let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
      run.append_output(&output(1, 0)).unwrap();
    }

    assert!(store.is_empty().unwrap());
  }

  #[test]
  fn identifiers_are_stored_as_text() {
    let (_tempdir, mut store) = store();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run.append_output(&output(1_000_000, 7)).unwrap();
    run.commit().unwrap();

    let oid: String = store
      .connection
      .query_row("SELECT oid FROM outputs", [], |row| row.get(0))
      .unwrap();

    assert_eq!(oid, "1000000-7");
  }

  #[test]
  fn write_error_policy() {
    let (_tempdir, mut store) = store();

    store
      .connection
      .execute_batch(
        "CREATE TRIGGER reject_refs BEFORE INSERT ON refs BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
      )
      .unwrap();

    let row = RefRow {
      iid: 0,
      oid: OutputId::new(1, 1),
    };

    {
      let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
      assert!(run.append_ref(&row).is_err());
    }

    let mut run = store.begin_run(WriteErrorPolicy::Skip).unwrap();
    assert!(run.append_output(&output(1, 1)).unwrap());
    assert!(!run.append_ref(&row).unwrap());
    assert!(!run.append_ref(&row).unwrap());
    assert_eq!(run.skipped(), 2);
    run.skip(3);
    assert_eq!(run.commit().unwrap(), 5);

    assert_eq!(store.outputs().unwrap(), [output(1, 1)]);
    assert!(store.refs().unwrap().is_empty());
  }

  #[test]
  fn checkpoint_round_trip() {
    let (_tempdir, mut store) = store();

    let checkpoint = Checkpoint {
      start_height: 1,
      height: 10,
      next_iid: 42,
    };

    let denominations = [(10, 3), (100, 9)].into_iter().collect::<Denominations>();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run.checkpoint(&checkpoint, &denominations).unwrap();
    run.commit().unwrap();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run
      .checkpoint(
        &Checkpoint {
          height: 11,
          ..checkpoint
        },
        &denominations,
      )
      .unwrap();
    run.commit().unwrap();

    assert_eq!(
      store.progress().unwrap(),
      Some(Checkpoint {
        height: 11,
        ..checkpoint
      })
    );
    assert_eq!(store.denominations().unwrap(), denominations);
    assert!(!store.is_empty().unwrap());

    let statistics = store.statistics().unwrap();
    assert_eq!(statistics.denominations, 2);
    assert_eq!(statistics.inputs, 0);
  }

  #[test]
  fn clear_removes_everything() {
    let (_tempdir, mut store) = store();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run.append_output(&output(1, 0)).unwrap();
    run
      .checkpoint(
        &Checkpoint {
          start_height: 1,
          height: 1,
          next_iid: 0,
        },
        &[(1, 0)].into_iter().collect(),
      )
      .unwrap();
    run.commit().unwrap();

    let mut run = store.begin_run(WriteErrorPolicy::Abort).unwrap();
    run.clear().unwrap();
    run.commit().unwrap();

    assert!(store.is_empty().unwrap());
  }
}
