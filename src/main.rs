use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use templfmt::{Document, MarkupNode, Node, format_source, parse_string};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

const TEMPL_EXTENSION: &str = "templ";

/// What `fmt` does with each formatted file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Mode {
    /// Print formatted templates to stdout
    #[default]
    Stdout,
    /// Write formatted templates back to their files
    Write,
    /// Only report whether formatting would change anything
    Check,
}

/// Outcome of one `fmt` run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Summary {
    files: usize,
    changed: usize,
    failed: usize,
}

impl Summary {
    /// Count per-file results, logging each failure.
    fn collect<'p>(
        mode: Mode,
        results: impl IntoIterator<Item = (&'p PathBuf, Result<bool>)>,
    ) -> Self {
        let mut summary = Summary::default();
        for (path, r) in results {
            summary.files += 1;
            match r {
                Ok(true) => {
                    summary.changed += 1;
                    if mode == Mode::Check {
                        warn!(path = %path.display(), "not formatted");
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    summary.failed += 1;
                    error!("{e:#}");
                }
            }
        }
        summary
    }

    /// Any failure is an error; in check mode so is any unformatted file.
    fn status(&self, mode: Mode) -> Result<()> {
        if self.failed > 0 {
            bail!("{} file(s) could not be formatted", self.failed);
        }
        if mode == Mode::Check && self.changed > 0 {
            bail!("{} file(s) are not formatted", self.changed);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(name = "templfmt", version, about = "Canonical formatter for templ templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Fmt {
        /// Paths (files or directories) to format (defaults to current dir)
        paths: Vec<PathBuf>,
        /// Write the formatted content back to the files
        #[arg(long)]
        write: bool,
        /// Check if files are formatted; non-zero exit if changes needed
        #[arg(long)]
        check: bool,
    },
    Debug {
        /// File to debug
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "templfmt=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fmt {
            paths,
            write,
            check,
        } => {
            if write && check {
                bail!("--write and --check are mutually exclusive");
            }
            let mode = if write {
                Mode::Write
            } else if check {
                Mode::Check
            } else {
                Mode::Stdout
            };
            let targets = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths
            };
            let mut templ_files = Vec::new();
            for p in targets {
                collect_templ_files(&p, &mut templ_files);
            }
            debug!(files = templ_files.len(), "collected templates");

            let results: Vec<_> = templ_files
                .par_iter()
                .map(|path| (path, process_file(path, mode)))
                .collect();
            let summary = Summary::collect(mode, results);
            info!(
                files = summary.files,
                changed = summary.changed,
                failed = summary.failed,
                "formatting finished"
            );
            summary.status(mode)?;
        }
        Commands::Debug { file } => {
            debug_file(&file)?;
        }
    }
    Ok(())
}

fn debug_file(path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let document = parse_string(&content).with_context(|| format!("parsing {}", path.display()))?;
    println!("===== {} =====", path.display());
    print_document(&document);
    Ok(())
}

fn print_document(document: &Document) {
    for node in document.nodes() {
        let pos = node.position();
        let trivia = node.trivia();
        if let Some(comment) = &trivia.comment {
            println!("comment {:?}", comment);
        }
        match node {
            Node::Package(package) => {
                println!("package@{} '{}'", pos, package.name);
            }
            Node::Import(import) => {
                println!(
                    "import@{} {} (blank lines before: {})",
                    pos, import.path, trivia.blank_lines
                );
            }
            Node::Templ(templ) => {
                println!("templ@{} {}({})", pos, templ.name, templ.params);
                print_markup(&templ.body, 1);
            }
        }
    }
    if let Some(trailing) = document.trailing() {
        println!("trailing {:?}", trailing);
    }
    for warning in document.warnings() {
        println!("warning: {}", warning);
    }
}

fn print_markup(nodes: &[MarkupNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            MarkupNode::Text(text) => println!("{}text {:?}", indent, text),
            MarkupNode::Element(element) => {
                let kind = if element.self_closed {
                    "self-closed"
                } else if element.is_void() {
                    "void"
                } else {
                    "element"
                };
                println!(
                    "{}{}@{} <{}> {}",
                    indent, kind, element.position, element.name, element.attrs
                );
                print_markup(&element.children, depth + 1);
            }
        }
    }
}

fn is_templ_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(TEMPL_EXTENSION)
}

fn collect_templ_files(path: &Path, out: &mut Vec<PathBuf>) {
    if path.is_file() {
        if is_templ_file(path) {
            out.push(path.to_path_buf());
        }
        return;
    }
    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && is_templ_file(p) {
            out.push(p.to_path_buf());
        }
    }
}

fn process_file(path: &Path, mode: Mode) -> Result<bool> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let formatted =
        format_source(&content).with_context(|| format!("formatting {}", path.display()))?;
    let changed = formatted != content;
    match mode {
        Mode::Stdout => {
            println!("===== {} =====", path.display());
            print!("{}", formatted);
        }
        Mode::Write => {
            if changed {
                fs::write(path, formatted)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "formatted");
            }
        }
        Mode::Check => {}
    }
    Ok(changed)
}
