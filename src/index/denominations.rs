use super::*;

/// Last global index observed for each denomination.
///
/// An input's anonymity-set size is read from here before the outputs of its
/// own transaction are observed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Denominations {
  last_seen: BTreeMap<Amount, GlobalIndex>,
}

impl Denominations {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records an output. The latest observation wins, without any check that
  /// indices grow.
  pub fn observe(&mut self, amount: Amount, global_index: GlobalIndex) {
    self.last_seen.insert(amount, global_index);
  }

  /// Returns the last observed global index for `amount`, or 0 if no output
  /// of that amount has been seen.
  pub fn lookup(&self, amount: Amount) -> GlobalIndex {
    self.last_seen.get(&amount).copied().unwrap_or_default()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Amount, GlobalIndex)> + '_ {
    self
      .last_seen
      .iter()
      .map(|(amount, global_index)| (*amount, *global_index))
  }

  pub fn len(&self) -> usize {
    self.last_seen.len()
  }

  pub fn is_empty(&self) -> bool {
    self.last_seen.is_empty()
  }
}

impl FromIterator<(Amount, GlobalIndex)> for Denominations {
  fn from_iter<I: IntoIterator<Item = (Amount, GlobalIndex)>>(iter: I) -> Self {
    Self {
      last_seen: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn unseen_amount_is_zero() {
    assert_eq!(Denominations::new().lookup(10), 0);
  }

  #[test]
  fn last_write_wins() {
    let mut denominations = Denominations::new();
    denominations.observe(10, 5);
    denominations.observe(10, 3);
    assert_eq!(denominations.lookup(10), 3);
    assert_eq!(denominations.lookup(20), 0);
    assert_eq!(denominations.len(), 1);
  }

  #[test]
  fn iterates_in_amount_order() {
    let denominations = [(100, 1), (1, 7), (10, 2)]
      .into_iter()
      .collect::<Denominations>();

    assert_eq!(
      denominations.iter().collect::<Vec<_>>(),
      [(1, 7), (10, 2), (100, 1)]
    );
  }
}
