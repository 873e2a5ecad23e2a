use super::*;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct Totals {
  pub(crate) blocks: u64,
  pub(crate) inputs: u64,
  pub(crate) outputs: u64,
  pub(crate) refs: u64,
  pub(crate) skipped_rows: u64,
}

/// Walks `first_height..=stop_height` and appends the rows of each block to
/// the store.
pub(crate) struct Updater<'index> {
  pub(super) chain: &'index dyn ChainSource,
  pub(super) commit_interval: Option<u32>,
  pub(super) denominations: Denominations,
  pub(super) first_height: u32,
  pub(super) fresh: bool,
  pub(super) next_iid: u64,
  pub(super) policy: WriteErrorPolicy,
  pub(super) shutdown: &'index AtomicBool,
  pub(super) start_height: u32,
  pub(super) stop_height: u32,
  pub(super) totals: Totals,
}

impl Updater<'_> {
  pub(crate) fn update_store(&mut self, store: &mut Store) -> Result {
    let start = Instant::now();

    let progress_bar = if cfg!(test)
      || log_enabled!(log::Level::Info)
      || !io::stderr().is_terminal()
      || self.first_height > self.stop_height
    {
      None
    } else {
      let progress_bar = ProgressBar::new((self.stop_height - self.first_height + 1).into());
      progress_bar.set_style(
        ProgressStyle::with_template("[extracting blocks] {wide_bar} {pos}/{len}")
          .context("invalid progress bar template")?,
      );
      Some(progress_bar)
    };

    if self.fresh {
      log::info!("Clearing `{}`", store.path().display());
    }

    let mut run = store.begin_run(self.policy)?;

    if self.fresh {
      run.clear()?;
    }

    let mut uncommitted = 0;

    for height in self.first_height..=self.stop_height {
      if self.shutdown.load(atomic::Ordering::Relaxed) {
        log::info!("Rolling back {uncommitted} uncommitted blocks");
        return Err(SnafuError::Interrupted { height }.into());
      }

      let (block, transactions) = self.fetch_block(height)?;

      self.index_block(&mut run, &block, &transactions)?;

      if let Some(progress_bar) = &progress_bar {
        progress_bar.inc(1);
      }

      uncommitted += 1;

      if self.commit_interval == Some(uncommitted) {
        self.commit(run, height)?;
        uncommitted = 0;
        run = store.begin_run(self.policy)?;
      }
    }

    if uncommitted > 0 || self.fresh {
      self.commit(run, self.stop_height)?;
    }

    if let Some(progress_bar) = &progress_bar {
      progress_bar.finish_and_clear();
    }

    log::info!(
      "Extracted blocks {}..={} in {}ms",
      self.first_height,
      self.stop_height,
      (Instant::now() - start).as_millis(),
    );

    Ok(())
  }

  /// Fetches a block and the details of all its transactions. Nothing of the
  /// block is written unless every lookup succeeds.
  fn fetch_block(&self, height: u32) -> Result<(Block, Vec<TransactionDetails>)> {
    let block = self
      .chain
      .block_at_height(height)?
      .ok_or(SnafuError::BlockNotFound { height })?;

    let transactions = block
      .transaction_hashes
      .iter()
      .map(|&hash| -> Result<TransactionDetails> {
        self
          .chain
          .transaction_details(hash)?
          .ok_or_else(|| SnafuError::TransactionNotFound { hash, height }.into())
      })
      .collect::<Result<Vec<TransactionDetails>>>()?;

    Ok((block, transactions))
  }

  fn index_block(
    &mut self,
    run: &mut Run,
    block: &Block,
    transactions: &[TransactionDetails],
  ) -> Result {
    log::info!(
      "Block {} with {} transactions…",
      block.height,
      transactions.len()
    );

    for transaction in transactions {
      log::trace!(
        "Transaction {} with {} inputs and {} outputs",
        transaction.hash,
        transaction.inputs.len(),
        transaction.outputs.len()
      );

      if !transaction.is_coinbase() {
        for (index, input) in transaction.inputs.iter().enumerate() {
          let Some(key_input) = input.key_input() else {
            log::debug!(
              "Skipping input {index} of transaction {} without ring",
              transaction.hash
            );
            continue;
          };

          let ring = key_input.ring().snafu_context(error::RingDecode {
            transaction: transaction.hash,
            input: index,
          })?;

          let iid = self.next_iid;

          let written = run.append_input(&InputRow {
            iid,
            mixin: ring.mixin().try_into()?,
            value: key_input.amount,
            anonset: self.denominations.lookup(key_input.amount),
          })?;

          if !written {
            log::warn!(
              "Dropping {} references of input {index} of transaction {}",
              ring.absolute_indices().len(),
              transaction.hash
            );
            run.skip(ring.absolute_indices().len().try_into()?);
            continue;
          }

          self.next_iid += 1;
          self.totals.inputs += 1;

          for oid in ring.output_ids(key_input.amount) {
            if run.append_ref(&RefRow { iid, oid })? {
              self.totals.refs += 1;
            }
          }
        }
      }

      for output in &transaction.outputs {
        self
          .denominations
          .observe(output.amount, output.global_index);
        if run.append_output(&output.into())? {
          self.totals.outputs += 1;
        }
      }
    }

    self.totals.blocks += 1;

    Ok(())
  }

  fn commit(&mut self, mut run: Run, height: u32) -> Result {
    run.checkpoint(
      &Checkpoint {
        start_height: self.start_height,
        height,
        next_iid: self.next_iid,
      },
      &self.denominations,
    )?;

    log::info!(
      "Committing at block {height}, {} inputs and {} outputs extracted",
      self.totals.inputs,
      self.totals.outputs,
    );

    self.totals.skipped_rows += run.commit()?;

    Ok(())
  }
}
