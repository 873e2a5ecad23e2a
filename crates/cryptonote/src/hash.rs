use super::*;

#[derive(Debug, Error, PartialEq)]
#[error("invalid hash `{input}`: {source}")]
pub struct HashError {
  input: String,
  source: hex::FromHexError,
}

#[derive(
  Copy,
  Clone,
  Debug,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  std::hash::Hash,
  DeserializeFromStr,
  SerializeDisplay,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
  pub const LEN: usize = 32;

  pub fn as_bytes(&self) -> &[u8; Self::LEN] {
    &self.0
  }
}

impl From<[u8; 32]> for Hash {
  fn from(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }
}

impl Display for Hash {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl FromStr for Hash {
  type Err = HashError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0; Self::LEN];
    hex::decode_to_slice(s, &mut bytes).map_err(|source| HashError {
      input: s.into(),
      source,
    })?;
    Ok(Self(bytes))
  }
}
