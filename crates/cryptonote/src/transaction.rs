use super::*;

/// Transaction as reported by the node's explorer API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
  pub hash: Hash,
  #[serde(default)]
  pub timestamp: u64,
  pub total_inputs_amount: Amount,
  #[serde(default)]
  pub total_outputs_amount: Amount,
  #[serde(default)]
  pub mixin: u64,
  pub inputs: Vec<InputDetails>,
  pub outputs: Vec<OutputDetails>,
}

impl TransactionDetails {
  /// Coinbase transactions spend nothing.
  pub fn is_coinbase(&self) -> bool {
    self.total_inputs_amount == 0
  }
}

/// Input variants, tagged with the ledger's binary variant tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputDetails {
  #[serde(rename = "ff")]
  Base(BaseInput),
  #[serde(rename = "02")]
  Key(KeyInputDetails),
  #[serde(rename = "03")]
  Multisignature(MultisignatureInput),
}

impl InputDetails {
  pub fn key_input(&self) -> Option<&KeyInput> {
    match self {
      Self::Key(details) => Some(&details.input),
      Self::Base(_) | Self::Multisignature(_) => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseInput {
  pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyInputDetails {
  pub input: KeyInput,
  #[serde(default)]
  pub mixin: u64,
}

/// Ring-signature input. `output_indexes` holds relative offsets, see
/// [`Ring`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyInput {
  pub amount: Amount,
  #[serde(rename = "key_offsets")]
  pub output_indexes: Vec<GlobalIndex>,
  #[serde(rename = "k_image", default, skip_serializing_if = "Option::is_none")]
  pub key_image: Option<Hash>,
}

impl KeyInput {
  pub fn ring(&self) -> Result<Ring, DecodeError> {
    Ring::decode(&self.output_indexes)
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisignatureInput {
  pub amount: Amount,
  pub signatures: u8,
  pub output_index: GlobalIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDetails {
  pub amount: Amount,
  pub global_index: GlobalIndex,
}

impl OutputDetails {
  pub fn id(&self) -> OutputId {
    OutputId::new(self.amount, self.global_index)
  }
}
