//! Types for reading CryptoNote ledgers: blocks, transaction details, output
//! identifiers, and ring decoding.

use {
  serde::{Deserialize, Serialize},
  serde_with::{DeserializeFromStr, SerializeDisplay},
  std::{
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
  },
  thiserror::Error,
};

pub use {
  block::Block,
  hash::{Hash, HashError},
  output_id::{OutputId, OutputIdError},
  ring::{DecodeError, Ring},
  transaction::{
    BaseInput, InputDetails, KeyInput, KeyInputDetails, MultisignatureInput, OutputDetails,
    TransactionDetails,
  },
};

/// Output denomination.
pub type Amount = u64;

/// Position of an output among all outputs of its denomination.
pub type GlobalIndex = u32;

mod block;
mod hash;
mod output_id;
mod ring;
mod transaction;
