#![no_main]

use {cryptonote::OutputId, libfuzzer_sys::fuzz_target};

fuzz_target!(|input: &str| {
  if let Ok(id) = input.parse::<OutputId>() {
    assert_eq!(id.to_string(), input);
  }
});
