use clap::Parser;
use cxf_collage::imaging::RustBackend;
use cxf_collage::viewer::{DirectorySink, DisplaySink, SystemViewer};
use cxf_collage::{bundle, config, output, render};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "cxf-collage")]
#[command(about = "Render photo-library collage (.cxf) files")]
#[command(long_about = "\
Render photo-library collage (.cxf) files

Pass a single .cxf file to render it and open the result in an image viewer.
Pass a photo-library bundle to render every collage it contains:

  Holidays.picasalibrary/
  └── Collages/
      ├── Beach.cxf
      ├── Beach.jpg        # prerendered, shown if Beach.cxf fails
      └── Rome.cxf

Settings are read from ./cxf-collage.toml when present.
Run 'cxf-collage --gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// A .cxf file or a collage bundle directory
    #[arg(required_unless_present = "gen_config")]
    file: Option<PathBuf>,

    /// Pixels per format unit [default: render.scale from config, 10]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    scale: Option<u32>,

    /// Config file to use instead of ./cxf-collage.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write rendered images to this directory instead of opening a viewer
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,

    /// Show debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print a stock cxf-collage.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    let Some(file) = cli.file else {
        return Ok(());
    };

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&std::env::current_dir()?)?,
    };
    let options = config.render_options(cli.scale);
    let sink: Box<dyn DisplaySink> = match cli.save {
        Some(dir) => Box::new(DirectorySink::from_config(dir, &config)),
        None => Box::new(SystemViewer::from_config(&config)),
    };
    let backend = RustBackend::new();

    if file.is_file() {
        let collage = render::render_file(&file, &options, &backend)?;
        let written = sink.show(&collage)?;
        output::print_render_report(&collage.report, Some(&written));
    } else if bundle::is_bundle(&file) {
        println!("Collage bundle found!");
        init_thread_pool(&config.processing);
        let report = bundle::render_bundle(&file, &options, &backend, sink.as_ref())?;
        output::print_bundle_report(&report);
    } else {
        println!(
            "{} is neither a .cxf file nor a collage bundle",
            file.display()
        );
    }

    Ok(())
}

/// Install the stderr log subscriber: INFO by default, DEBUG with `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
