use super::*;

/// A block as seen by the extractor: its position and the hashes of the
/// transactions it contains, coinbase first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
  pub height: u32,
  pub hash: Hash,
  pub timestamp: u64,
  pub transaction_hashes: Vec<Hash>,
}
