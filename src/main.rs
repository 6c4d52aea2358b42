use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio::ast::build_file;
use folio::cli::{parse_target, Cli, Command};
use folio::diagnostics::{ConsoleSink, Run, TrackingSink};
use folio::export::{dispatch, DispatchOptions};
use folio::filename::StdFilenames;
use folio::link::link;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let Command::Build { root, output, modes, target, line_ending, page_width, single_file_name } = cli.command;

    let target = parse_target(&target).with_context(|| format!("unknown character target `{target}`"))?;

    let mut console = ConsoleSink::default();
    let mut run = Run::new();
    let mut sink = TrackingSink { inner: &mut console, run: &mut run };

    tracing::info!(root = %root.display(), "building document tree");
    let (mut tree, root_node) = build_file(&root, &mut sink);
    let Some(root_node) = root_node else {
        bail!("could not build a document tree from `{}`", root.display());
    };

    tracing::info!("resolving references");
    link(&mut tree, root_node, &mut sink);

    let modes: Vec<_> = modes.into_iter().map(|m| m.to_output_mode()).collect();
    let options = DispatchOptions {
        page_width,
        target,
        line_ending: line_ending.to_line_ending(),
        output_root: output.clone(),
        single_file_name,
    };

    tracing::info!(output = %output.display(), modes = ?modes.iter().map(|m| m.label()).collect::<Vec<_>>(), "dispatching renderings");
    dispatch(&tree, root_node, &modes, &options, &StdFilenames, &mut sink).context("writing output")?;

    for mode in &modes {
        println!("{} rendering written to {}", mode.label(), output.display());
    }

    if run.saw_error {
        eprintln!("{} problem(s) found while compiling", console.diagnostics.len());
    }
    std::process::exit(run.exit_code());
}
