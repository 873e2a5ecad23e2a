#![no_main]

use {
  cryptonote::{DecodeError, Ring},
  libfuzzer_sys::fuzz_target,
};

fuzz_target!(|offsets: Vec<u32>| {
  match Ring::decode(&offsets) {
    Ok(ring) => {
      assert_eq!(ring.mixin() + 1, offsets.len());
      assert_eq!(ring.relative_offsets(), offsets);
      assert!(
        ring
          .absolute_indices()
          .windows(2)
          .all(|pair| pair[0] <= pair[1])
      );
    }
    Err(DecodeError::Empty) => assert!(offsets.is_empty()),
    Err(DecodeError::Overflow { position }) => {
      assert!(
        offsets[..=position]
          .iter()
          .map(|&offset| u64::from(offset))
          .sum::<u64>()
          > u64::from(u32::MAX)
      );
    }
  }
});
