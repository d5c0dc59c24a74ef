pub mod appearance;
pub mod calendar;
pub mod classify;
pub mod cli;
pub mod config;
pub mod draw;
pub mod grid;
pub mod layout;
pub mod progress;
pub mod render;
pub mod server;
pub mod style;

use std::ffi::OsString;
use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use calendar::ReferenceDate;
pub use draw::{
  DrawNode,
  DrawTree,
  RenderRequest
};
pub use progress::YearProgress;
pub use render::{
  OutputFormat,
  Renderer
};
pub use style::{
  StyleConfig,
  StylePreset
};

/// Builds the draw tree for one year
/// image. Same inputs, same tree.
pub fn render_year(
  request: &RenderRequest,
  style: &StyleConfig
) -> DrawTree {
  draw::assemble(request, style)
}

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    preset = %cli.preset,
    "starting lifecal"
  );
  debug!(?pre.style_overrides, "preprocessed style overrides");

  let style = config::load_style(
    cli.style.as_deref(),
    cli.preset,
    pre.style_overrides.into_iter().chain(
      cli
        .overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  )
  .context("failed to load style")?;

  match cli.command {
    | cli::Command::Render(args) => {
      let request = RenderRequest {
        width: args.width,
        height: args.height,
        date: args
          .date
          .unwrap_or_else(
            ReferenceDate::today_utc
          )
      };
      let tree =
        render_year(&request, &style);

      let color = args.output.is_none()
        && std::io::stdout().is_terminal();
      let text = render::render_to_string(
        &tree,
        args.format,
        color
      )?;

      render::write_output(
        &text,
        args.output.as_deref()
      )
      .with_context(|| match &args.output {
        | Some(path) => format!(
          "failed to write {}",
          path.display()
        ),
        | None => {
          "failed to write to stdout"
            .to_string()
        }
      })?;
    }
    | cli::Command::Serve(args) => {
      server::serve(&args.addr, &style)?;
    }
    | cli::Command::Progress(args) => {
      let date = args
        .date
        .unwrap_or_else(
          ReferenceDate::today_utc
        );
      println!(
        "{}",
        YearProgress::for_date(date)
          .summary()
      );
    }
    | cli::Command::Style => {
      print!(
        "{}",
        style.to_toml_string()?
      );
    }
  }

  info!("done");
  Ok(())
}
