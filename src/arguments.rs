use super::*;

#[derive(Debug, Parser)]
#[command(
  version,
  styles = clap::builder::styling::Styles::styled()
    .header(clap::builder::styling::AnsiColor::Green.on_default().bold())
    .usage(clap::builder::styling::AnsiColor::Green.on_default().bold())
    .literal(clap::builder::styling::AnsiColor::Blue.on_default().bold())
    .placeholder(clap::builder::styling::AnsiColor::Cyan.on_default()))
]
pub struct Arguments {
  #[command(flatten)]
  pub(crate) options: Options,
  #[command(subcommand)]
  pub(crate) subcommand: Subcommand,
}

impl Arguments {
  pub fn run(self) -> SnafuResult<Option<Box<dyn subcommand::Output>>> {
    let settings = Settings::load(self.options)?;

    self
      .subcommand
      .run(settings)
      .map_err(|err| err.downcast::<SnafuError>().unwrap_or_else(SnafuError::from))
  }
}
