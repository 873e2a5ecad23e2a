use {
  self::updater::{Totals, Updater},
  super::*,
};

pub mod denominations;
pub mod store;
mod updater;

/// Heights to extract. `stop_height` defaults to the node's top block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extraction {
  pub start_height: u32,
  pub stop_height: Option<u32>,
  pub fresh: bool,
}

impl Default for Extraction {
  fn default() -> Self {
    Self {
      start_height: 1,
      stop_height: None,
      fresh: false,
    }
  }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub start_height: u32,
  pub stop_height: u32,
  pub resumed_from: Option<u32>,
  pub blocks: u64,
  pub inputs: u64,
  pub outputs: u64,
  pub refs: u64,
  pub skipped_rows: u64,
  pub denominations: usize,
}

pub struct Index {
  chain: Box<dyn ChainSource>,
  settings: Settings,
  store: Store,
}

impl Index {
  pub fn open(settings: &Settings) -> Result<Self> {
    let client = RpcClient::new(settings.node_rpc_url(), settings.node_rpc_credentials())?;
    Self::open_with_chain(settings, Box::new(client))
  }

  pub fn open_with_chain(settings: &Settings, chain: Box<dyn ChainSource>) -> Result<Self> {
    let database = settings.database();

    log::info!("Opening database `{}`", database.display());

    Ok(Self {
      chain,
      settings: settings.clone(),
      store: Store::open(&database)?,
    })
  }

  pub fn store(&self) -> &Store {
    &self.store
  }

  /// Extracts the requested heights, resuming from the store's checkpoint
  /// when it belongs to an extraction with the same start height.
  pub fn update(&mut self, extraction: &Extraction, shutdown: &AtomicBool) -> Result<Summary> {
    let top_height = self.chain.top_height()?;

    log::info!("Node reports top height {top_height}");

    let start_height = extraction.start_height;

    let stop_height = match extraction.stop_height {
      Some(height) if height > top_height => {
        return Err(SnafuError::BlockNotFound { height }.into());
      }
      Some(height) => height,
      None => top_height,
    };

    if start_height > stop_height {
      return Err(
        SnafuError::InvalidRange {
          start: start_height,
          stop: stop_height,
        }
        .into(),
      );
    }

    let mut updater = Updater {
      chain: self.chain.as_ref(),
      commit_interval: self.settings.commit_interval(),
      denominations: Denominations::new(),
      first_height: start_height,
      fresh: extraction.fresh,
      next_iid: 0,
      policy: self.settings.write_errors(),
      shutdown,
      start_height,
      stop_height,
      totals: Totals::default(),
    };

    let mut resumed_from = None;

    if !extraction.fresh {
      match self.store.progress()? {
        Some(checkpoint) if checkpoint.start_height == start_height => {
          if checkpoint.height > stop_height {
            return Err(
              SnafuError::StoreAhead {
                path: self.store.path().to_owned(),
                height: checkpoint.height,
                stop: stop_height,
              }
              .into(),
            );
          }

          let denominations = self.store.denominations()?;

          if checkpoint.height == stop_height {
            log::info!(
              "Blocks {start_height}..={stop_height} already extracted to `{}`",
              self.store.path().display()
            );

            return Ok(Summary {
              start_height,
              stop_height,
              resumed_from: Some(checkpoint.height),
              blocks: 0,
              inputs: 0,
              outputs: 0,
              refs: 0,
              skipped_rows: 0,
              denominations: denominations.len(),
            });
          }

          log::info!("Resuming after block {}", checkpoint.height);

          updater.denominations = denominations;
          updater.first_height = checkpoint.height + 1;
          updater.next_iid = checkpoint.next_iid;
          resumed_from = Some(checkpoint.height);
        }
        _ => {
          if !self.store.is_empty()? {
            return Err(
              SnafuError::StoreNotEmpty {
                path: self.store.path().to_owned(),
              }
              .into(),
            );
          }
        }
      }
    }

    updater.update_store(&mut self.store)?;

    let Totals {
      blocks,
      inputs,
      outputs,
      refs,
      skipped_rows,
    } = updater.totals;

    Ok(Summary {
      start_height,
      stop_height,
      resumed_from,
      blocks,
      inputs,
      outputs,
      refs,
      skipped_rows,
      denominations: updater.denominations.len(),
    })
  }
}
