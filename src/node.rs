use super::*;

pub use self::rpc::RpcClient;

mod rpc;

/// Read access to the chain data of a node.
///
/// Lookups that miss return `Ok(None)` so callers can tell an absent block
/// or transaction apart from a failing node.
pub trait ChainSource {
  fn top_height(&self) -> Result<u32>;

  fn block_at_height(&self, height: u32) -> Result<Option<Block>>;

  fn transaction_details(&self, hash: Hash) -> Result<Option<TransactionDetails>>;
}

impl<T: ChainSource + ?Sized> ChainSource for &T {
  fn top_height(&self) -> Result<u32> {
    (**self).top_height()
  }

  fn block_at_height(&self, height: u32) -> Result<Option<Block>> {
    (**self).block_at_height(height)
  }

  fn transaction_details(&self, hash: Hash) -> Result<Option<TransactionDetails>> {
    (**self).transaction_details(hash)
  }
}

#[cfg(test)]
impl ChainSource for mocknode::MemoryChain {
  fn top_height(&self) -> Result<u32> {
    Ok(self.height())
  }

  fn block_at_height(&self, height: u32) -> Result<Option<Block>> {
    Ok(self.block(height).cloned())
  }

  fn transaction_details(&self, hash: Hash) -> Result<Option<TransactionDetails>> {
    Ok(self.transaction(hash).cloned())
  }
}
