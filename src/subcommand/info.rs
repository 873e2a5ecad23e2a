use {super::*, crate::index::store::Statistics};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub database: PathBuf,
  #[serde(flatten)]
  pub statistics: Statistics,
}

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let database = settings.database();

  let statistics = Store::open(&database)?.statistics()?;

  Ok(Some(Box::new(Output {
    database,
    statistics,
  })))
}
