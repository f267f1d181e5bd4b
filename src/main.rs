use clap::{Parser, Subcommand, ValueEnum};
use gal_editor::arrange::{self, Step};
use gal_editor::session::EditorSession;
use gal_editor::{config, output, page, render};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gal-editor")]
#[command(about = "Arrange a static image gallery and export the result")]
#[command(long_about = "\
Arrange a static image gallery and export the result

The gallery starts from the naming convention (images/01.jpg .. images/12.jpg
by default) or from the .image-item blocks of an existing page (--markup).
Edit mode is off unless the activation URL carries ?edit=true.

Gallery directory:

  gallery/
  ├── config.toml      # Optional, overrides stock defaults
  ├── index.html       # Rendered page (render)
  └── images/
      ├── 01.jpg
      └── 02.jpg

Arrange steps, replayed in order:

  move=FROM:ONTO   drag item FROM onto item ONTO (1-based)
  import=PATH      add a file or every file under a directory
  toggle           flip edit mode
  clear            empty the gallery (asks unless --yes)

Run 'gal-editor gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Gallery directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Page whose .image-item blocks seed the gallery
    #[arg(long, global = true)]
    markup: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that load a session.
#[derive(clap::Args, Clone)]
struct LoadArgs {
    /// Page location to read the activation flag from
    #[arg(long)]
    url: Option<String>,

    /// Start in edit mode (same as an activation flag in --url)
    #[arg(long)]
    edit: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Html,
    Json,
    Both,
}

#[derive(Subcommand)]
enum Command {
    /// Write index.html for the gallery
    Render {
        #[command(flatten)]
        load: LoadArgs,
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Print the gallery in display order
    List,
    /// Replay editing steps, then export the arrangement
    Arrange {
        /// Steps to replay, in order
        #[arg(required = true, value_parser = parse_step)]
        steps: Vec<Step>,
        #[command(flatten)]
        load: LoadArgs,
        #[arg(long, value_enum, default_value = "both")]
        format: ExportFormat,
        /// Output directory for exports
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Clear without asking
        #[arg(long)]
        yes: bool,
    },
    /// Verify a host page exposes every element the editor needs
    Check {
        page: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            load,
            output: out_dir,
        } => {
            let session = load_session(&cli.source, cli.markup.as_deref(), &load)?;
            let editing = session.is_editing();
            let html = page::render_page(session.gallery(), session.config(), editing);
            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join("index.html");
            std::fs::write(&path, html.into_string())?;
            for line in output::format_render(session.gallery(), &path, editing) {
                println!("{}", line);
            }
        }
        Command::List => {
            let config = config::load_config(&cli.source)?;
            let markup = read_markup(cli.markup.as_deref())?;
            let gallery = render::initial_gallery(markup.as_deref(), &config.gallery);
            output::print_gallery(&gallery);
        }
        Command::Arrange {
            steps,
            load,
            format,
            output: out_dir,
            yes,
        } => {
            let mut session = load_session(&cli.source, cli.markup.as_deref(), &load)?;
            for step in &steps {
                let report = arrange::apply(&mut session, step, |n| yes || confirm_clear(n))?;
                println!("{}", output::format_step(session.gallery(), &report));
            }
            let mut downloads = Vec::new();
            if matches!(format, ExportFormat::Html | ExportFormat::Both) {
                downloads.push(session.export_html());
            }
            if matches!(format, ExportFormat::Json | ExportFormat::Both) {
                downloads.push(session.export_json()?);
            }
            for download in downloads {
                let path = download.write_to(&out_dir)?;
                println!("{}", output::format_export(&download.filename, &path));
            }
        }
        Command::Check { page: path } => {
            let markup = std::fs::read_to_string(&path)?;
            let host = page::check_host_markup(&markup)?;
            for line in output::format_host_check(&path, &host) {
                println!("{}", line);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn read_markup(path: Option<&Path>) -> std::io::Result<Option<String>> {
    path.map(std::fs::read_to_string).transpose()
}

/// Load config and seed gallery, then start a session at the requested
/// location. `--edit` appends the activation flag to whatever `--url` says.
fn load_session(
    source: &Path,
    markup: Option<&Path>,
    load: &LoadArgs,
) -> Result<EditorSession, Box<dyn std::error::Error>> {
    let config = config::load_config(source)?;
    let markup = read_markup(markup)?;
    let gallery = render::initial_gallery(markup.as_deref(), &config.gallery);
    let location = match (&load.url, load.edit) {
        (Some(location), true) => Some(with_flag(location, &config.editor.query_flag)),
        (None, true) => Some(format!("?{}=true", config.editor.query_flag)),
        (url, false) => url.clone(),
    };
    let (session, _) = EditorSession::load(config, gallery, location.as_deref())?;
    log::debug!(
        "session loaded with {} images, editing={}",
        session.gallery().len(),
        session.is_editing()
    );
    Ok(session)
}

/// Append `flag=true` to a location's query. Relative locations
/// (`/gallery?x=1#top`) do not parse as a `Url` and are spliced by hand.
fn with_flag(location: &str, flag: &str) -> String {
    if let Ok(mut url) = url::Url::parse(location) {
        url.query_pairs_mut().append_pair(flag, "true");
        return url.into();
    }
    let (base, fragment) = match location.split_once('#') {
        Some((base, fragment)) => (base, format!("#{fragment}")),
        None => (location, String::new()),
    };
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{flag}=true{fragment}")
}

fn parse_step(s: &str) -> Result<Step, String> {
    s.parse().map_err(|e: arrange::StepError| e.to_string())
}

/// Ask on stdin; anything but y/yes declines.
fn confirm_clear(count: usize) -> bool {
    print!("Clear all {count} images? [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
