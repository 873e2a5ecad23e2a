use super::*;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
  #[error("ring has no output offsets")]
  Empty,
  #[error("global index overflows at offset {position}")]
  Overflow { position: usize },
}

/// Candidate outputs of a key input, as absolute global indices.
///
/// Key inputs reference their ring members by relative offsets: the first
/// offset is a global index and every following offset is the distance from
/// the previous member. Decoding is an inclusive prefix sum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ring {
  absolute_indices: Vec<GlobalIndex>,
}

impl Ring {
  pub fn decode(offsets: &[GlobalIndex]) -> Result<Self, DecodeError> {
    if offsets.is_empty() {
      return Err(DecodeError::Empty);
    }

    let mut absolute_indices = Vec::with_capacity(offsets.len());
    let mut global_index: GlobalIndex = 0;

    for (position, offset) in offsets.iter().enumerate() {
      global_index = global_index
        .checked_add(*offset)
        .ok_or(DecodeError::Overflow { position })?;
      absolute_indices.push(global_index);
    }

    Ok(Self { absolute_indices })
  }

  /// Number of decoys, one less than the number of ring members.
  pub fn mixin(&self) -> usize {
    self.absolute_indices.len() - 1
  }

  pub fn absolute_indices(&self) -> &[GlobalIndex] {
    &self.absolute_indices
  }

  pub fn relative_offsets(&self) -> Vec<GlobalIndex> {
    let mut previous = 0;
    self
      .absolute_indices
      .iter()
      .map(|&global_index| {
        let offset = global_index - previous;
        previous = global_index;
        offset
      })
      .collect()
  }

  pub fn output_ids(&self, amount: Amount) -> impl Iterator<Item = OutputId> + '_ {
    self
      .absolute_indices
      .iter()
      .map(move |&global_index| OutputId::new(amount, global_index))
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn prefix_sum() {
    let ring = Ring::decode(&[5, 3, 0, 12]).unwrap();
    assert_eq!(ring.absolute_indices(), [5, 8, 8, 20]);
    assert_eq!(ring.mixin(), 3);
  }

  #[test]
  fn single_zero_offset() {
    let ring = Ring::decode(&[0]).unwrap();
    assert_eq!(ring.absolute_indices(), [0]);
    assert_eq!(ring.mixin(), 0);
  }

  #[test]
  fn single_offset_is_degenerate_ring() {
    let ring = Ring::decode(&[1]).unwrap();
    assert_eq!(ring.absolute_indices(), [1]);
    assert_eq!(ring.mixin(), 0);
  }

  #[test]
  fn empty() {
    assert_eq!(Ring::decode(&[]), Err(DecodeError::Empty));
  }

  #[test]
  fn overflow() {
    assert_eq!(
      Ring::decode(&[u32::MAX - 1, 1, 1]),
      Err(DecodeError::Overflow { position: 2 })
    );
    assert_eq!(
      Ring::decode(&[u32::MAX, 0]).unwrap().absolute_indices(),
      [u32::MAX, u32::MAX]
    );
  }

  #[test]
  fn relative_offsets_round_trip() {
    for offsets in [
      vec![0],
      vec![7],
      vec![1, 1, 1],
      vec![100, 0, 25, 3, 4_000],
      vec![u32::MAX - 10, 4, 6],
    ] {
      assert_eq!(Ring::decode(&offsets).unwrap().relative_offsets(), offsets);
    }
  }

  #[test]
  fn output_ids() {
    let ring = Ring::decode(&[2, 3]).unwrap();
    assert_eq!(
      ring.output_ids(10).collect::<Vec<OutputId>>(),
      [OutputId::new(10, 2), OutputId::new(10, 5)]
    );
  }
}
