use super::*;

#[derive(Debug, Error, PartialEq)]
pub enum OutputIdError {
  #[error("missing `-` separator")]
  Separator,
  #[error("invalid character `{0}`")]
  Character(char),
  #[error("empty component")]
  Empty,
  #[error("leading zero in component `{0}`")]
  LeadingZero(String),
  #[error("invalid amount: {0}")]
  Amount(ParseIntError),
  #[error("invalid global index: {0}")]
  GlobalIndex(ParseIntError),
}

/// Identifies an output by denomination and global index, written
/// `<amount>-<global index>`.
#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  std::hash::Hash,
  DeserializeFromStr,
  SerializeDisplay,
)]
pub struct OutputId {
  pub amount: Amount,
  pub global_index: GlobalIndex,
}

impl OutputId {
  pub fn new(amount: Amount, global_index: GlobalIndex) -> Self {
    Self {
      amount,
      global_index,
    }
  }

  fn component(s: &str) -> Result<&str, OutputIdError> {
    if s.is_empty() {
      return Err(OutputIdError::Empty);
    }

    if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
      return Err(OutputIdError::Character(c));
    }

    if s.len() > 1 && s.starts_with('0') {
      return Err(OutputIdError::LeadingZero(s.into()));
    }

    Ok(s)
  }
}

impl Display for OutputId {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}-{}", self.amount, self.global_index)
  }
}

impl FromStr for OutputId {
  type Err = OutputIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (amount, global_index) = s.split_once('-').ok_or(OutputIdError::Separator)?;

    Ok(Self {
      amount: Self::component(amount)?
        .parse()
        .map_err(OutputIdError::Amount)?,
      global_index: Self::component(global_index)?
        .parse()
        .map_err(OutputIdError::GlobalIndex)?,
    })
  }
}
