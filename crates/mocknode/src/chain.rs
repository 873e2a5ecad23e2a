use {
  super::*,
  cryptonote::{
    Amount, BaseInput, GlobalIndex, InputDetails, KeyInput, KeyInputDetails, OutputDetails,
    TransactionDetails,
  },
  std::collections::{BTreeMap, HashMap},
};

/// Inputs and outputs of a transaction to add to a [`MemoryChain`]. A
/// template without inputs becomes a coinbase transaction.
#[derive(Debug, Default, Clone)]
pub struct TransactionTemplate {
  /// Key inputs as `(amount, relative offsets)`.
  pub inputs: Vec<(Amount, Vec<GlobalIndex>)>,
  /// Output amounts. Global indices are assigned when the block is added.
  pub outputs: Vec<Amount>,
}

impl TransactionTemplate {
  pub fn coinbase(outputs: &[Amount]) -> Self {
    Self {
      inputs: Vec::new(),
      outputs: outputs.into(),
    }
  }

  pub fn spend(inputs: &[(Amount, &[GlobalIndex])], outputs: &[Amount]) -> Self {
    Self {
      inputs: inputs
        .iter()
        .map(|(amount, offsets)| (*amount, offsets.to_vec()))
        .collect(),
      outputs: outputs.into(),
    }
  }
}

/// A chain held in memory, starting with an empty genesis block at height 0.
#[derive(Debug, Clone)]
pub struct MemoryChain {
  blocks: Vec<Block>,
  next_global_index: BTreeMap<Amount, GlobalIndex>,
  transactions: HashMap<Hash, TransactionDetails>,
  transactions_created: u32,
}

impl Default for MemoryChain {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryChain {
  pub fn new() -> Self {
    Self {
      blocks: vec![Block {
        height: 0,
        hash: Self::block_hash(0),
        timestamp: 0,
        transaction_hashes: Vec::new(),
      }],
      next_global_index: BTreeMap::new(),
      transactions: HashMap::new(),
      transactions_created: 0,
    }
  }

  fn block_hash(height: u32) -> Hash {
    let mut bytes = [0; 32];
    bytes[..4].copy_from_slice(&height.to_le_bytes());
    bytes[31] = 0xb1;
    Hash(bytes)
  }

  fn next_transaction_hash(&mut self) -> Hash {
    let mut bytes = [0; 32];
    bytes[..4].copy_from_slice(&self.transactions_created.to_le_bytes());
    bytes[31] = 0x7e;
    self.transactions_created += 1;
    Hash(bytes)
  }

  pub fn height(&self) -> u32 {
    u32::try_from(self.blocks.len() - 1).unwrap()
  }

  pub fn block(&self, height: u32) -> Option<&Block> {
    self.blocks.get(usize::try_from(height).ok()?)
  }

  pub fn block_by_hash(&self, hash: Hash) -> Option<&Block> {
    self.blocks.iter().find(|block| block.hash == hash)
  }

  pub fn transaction(&self, hash: Hash) -> Option<&TransactionDetails> {
    self.transactions.get(&hash)
  }

  /// Adds a block built from templates, assigning each output the next
  /// global index of its denomination.
  pub fn push_block(&mut self, templates: &[TransactionTemplate]) -> Block {
    let height = self.height() + 1;

    let transactions = templates
      .iter()
      .map(|template| {
        let inputs = if template.inputs.is_empty() {
          vec![InputDetails::Base(BaseInput { height })]
        } else {
          template
            .inputs
            .iter()
            .map(|(amount, offsets)| {
              InputDetails::Key(KeyInputDetails {
                input: KeyInput {
                  amount: *amount,
                  output_indexes: offsets.clone(),
                  key_image: None,
                },
                mixin: offsets.len().saturating_sub(1).try_into().unwrap(),
              })
            })
            .collect()
        };

        let outputs = template
          .outputs
          .iter()
          .map(|&amount| {
            let next = self.next_global_index.entry(amount).or_default();
            let global_index = *next;
            *next += 1;
            OutputDetails {
              amount,
              global_index,
            }
          })
          .collect();

        TransactionDetails {
          hash: self.next_transaction_hash(),
          timestamp: height.into(),
          total_inputs_amount: template.inputs.iter().map(|(amount, _)| amount).sum(),
          total_outputs_amount: template.outputs.iter().sum(),
          mixin: template
            .inputs
            .iter()
            .map(|(_, offsets)| offsets.len().saturating_sub(1))
            .max()
            .unwrap_or_default()
            .try_into()
            .unwrap(),
          inputs,
          outputs,
        }
      })
      .collect();

    self.push_block_with_transactions(transactions)
  }

  /// Adds a block holding exactly the given transactions.
  pub fn push_block_with_transactions(&mut self, transactions: Vec<TransactionDetails>) -> Block {
    let height = self.height() + 1;

    let block = Block {
      height,
      hash: Self::block_hash(height),
      timestamp: height.into(),
      transaction_hashes: transactions
        .iter()
        .map(|transaction| transaction.hash)
        .collect(),
    };

    for transaction in transactions {
      self.transactions.insert(transaction.hash, transaction);
    }

    self.blocks.push(block.clone());

    block
  }

  /// Forgets a transaction, leaving blocks that reference it dangling.
  pub fn remove_transaction(&mut self, hash: Hash) -> Option<TransactionDetails> {
    self.transactions.remove(&hash)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn genesis() {
    let chain = MemoryChain::new();
    assert_eq!(chain.height(), 0);
    assert!(chain.block(0).unwrap().transaction_hashes.is_empty());
    assert_eq!(chain.block(1), None);
  }

  #[test]
  fn global_indices_are_assigned_per_denomination() {
    let mut chain = MemoryChain::new();

    let block = chain.push_block(&[
      TransactionTemplate::coinbase(&[10, 20]),
      TransactionTemplate::spend(&[(20, &[0])], &[10, 10]),
    ]);

    let coinbase = chain.transaction(block.transaction_hashes[0]).unwrap();
    assert!(coinbase.is_coinbase());
    assert_eq!(
      coinbase.outputs,
      [
        OutputDetails {
          amount: 10,
          global_index: 0,
        },
        OutputDetails {
          amount: 20,
          global_index: 0,
        },
      ]
    );

    let spend = chain.transaction(block.transaction_hashes[1]).unwrap();
    assert!(!spend.is_coinbase());
    assert_eq!(
      spend
        .outputs
        .iter()
        .map(|output| output.global_index)
        .collect::<Vec<GlobalIndex>>(),
      [1, 2]
    );
  }

  #[test]
  fn lookups() {
    let mut chain = MemoryChain::new();
    let block = chain.push_block(&[TransactionTemplate::coinbase(&[1])]);

    assert_eq!(chain.height(), 1);
    assert_eq!(chain.block(1), Some(&block));
    assert_eq!(chain.block_by_hash(block.hash), Some(&block));
    assert_eq!(chain.block(2), None);

    let hash = block.transaction_hashes[0];
    assert!(chain.transaction(hash).is_some());
    chain.remove_transaction(hash);
    assert_eq!(chain.transaction(hash), None);
  }
}
