//! `lazyc`: compile `.lazy` components into custom-element modules.
//!
//! ```bash
//! lazyc build src/components --out-dir dist
//! lazyc build card.lazy --emit ast
//! lazyc split card.lazy
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lazy_compiler::{compile_source, emit_program, split_regions, CompileOptions, EmitOptions};
use rayon::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const COMPONENT_EXTENSION: &str = "lazy";

#[derive(Parser)]
#[command(name = "lazyc")]
#[command(about = "Lazy component compiler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile components to JavaScript modules
    Build {
        /// Component files or directories to search for `.lazy` files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the output files (defaults to next to each input)
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Output form
        #[arg(long, value_enum, default_value_t = Emit::Js)]
        emit: Emit,

        /// Superclass of the generated element classes
        #[arg(long, value_name = "CLASS", default_value = "HTMLElement")]
        base_class: String,

        /// Object whose `define` registers each element
        #[arg(long, value_name = "OBJECT", default_value = "customElements")]
        registry: String,

        /// Declare the element class without `export`
        #[arg(long)]
        no_export: bool,

        /// Terminate statements with semicolons
        #[arg(long)]
        semicolons: bool,

        /// Quote strings with `"` instead of `'`
        #[arg(long)]
        double_quote: bool,
    },

    /// Print where the template region of a component begins
    Split {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// JavaScript source
    Js,
    /// ESTree JSON of the compiled module
    Ast,
}

impl Emit {
    fn extension(self) -> &'static str {
        match self {
            Emit::Js => "js",
            Emit::Ast => "json",
        }
    }
}

struct BuildSettings {
    out_dir: Option<PathBuf>,
    emit: Emit,
    compile: CompileOptions,
    print: EmitOptions,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LAZY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Build {
            inputs,
            out_dir,
            emit,
            base_class,
            registry,
            no_export,
            semicolons,
            double_quote,
        } => {
            let settings = BuildSettings {
                out_dir,
                emit,
                compile: CompileOptions {
                    base_class,
                    registry,
                    export_class: !no_export,
                    file_path: String::new(),
                },
                print: EmitOptions {
                    single_quote: !double_quote,
                    semicolons,
                    ..EmitOptions::default()
                },
            };
            build(&inputs, &settings)
        }
        Commands::Split { input } => split(&input),
    };

    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD
// ═══════════════════════════════════════════════════════════════════════════════

/// Expand inputs into component files. Directories are walked recursively.
fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(COMPONENT_EXTENSION)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn component_name(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))
}

fn output_path(path: &Path, name: &str, settings: &BuildSettings) -> PathBuf {
    let file_name = format!("{}.{}", name, settings.emit.extension());
    match &settings.out_dir {
        Some(dir) => dir.join(file_name),
        None => path.with_file_name(file_name),
    }
}

/// Pair every input with its output path. Two inputs writing one file is an
/// error, since parallel writes to it would race.
fn plan_outputs(files: &[PathBuf], settings: &BuildSettings) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut plan = Vec::with_capacity(files.len());
    for path in files {
        let target = output_path(path, component_name(path)?, settings);
        if let Some(previous) = claimed.insert(target.clone(), path) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                path.display(),
                target.display()
            );
        }
        plan.push((path.clone(), target));
    }
    Ok(plan)
}

fn build_file(path: &Path, target: &Path, settings: &BuildSettings) -> Result<()> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = component_name(path)?;
    let options = CompileOptions {
        file_path: path.display().to_string(),
        ..settings.compile.clone()
    };

    let output = compile_source(name, &source, &options)
        .with_context(|| format!("failed to compile {}", path.display()))?;
    let text = match settings.emit {
        Emit::Js => emit_program(&output, &settings.print)
            .with_context(|| format!("failed to emit {}", path.display()))?,
        Emit::Ast => serde_json::to_string_pretty(&output)?,
    };

    fs::write(target, text).with_context(|| format!("failed to write {}", target.display()))?;
    Ok(())
}

fn build(inputs: &[PathBuf], settings: &BuildSettings) -> Result<()> {
    let files = discover(inputs)?;
    if files.is_empty() {
        bail!("no .{} files found", COMPONENT_EXTENSION);
    }
    let plan = plan_outputs(&files, settings)?;
    if let Some(dir) = &settings.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    debug!(files = files.len(), "compiling components");

    let failures = plan
        .par_iter()
        .map(|(path, target)| match build_file(path, target, settings) {
            Ok(()) => {
                info!(input = %path.display(), output = %target.display(), "compiled");
                0
            }
            Err(e) => {
                error!("{:#}", e);
                1
            }
        })
        .sum::<usize>();

    if failures > 0 {
        bail!("{} of {} components failed to compile", failures, files.len());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

fn split(path: &Path) -> Result<()> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let regions = split_regions(&source);
    let line = source[..regions.script.len()].matches('\n').count() + 1;

    println!(
        "template starts at byte {} (line {})",
        regions.script.len(),
        line
    );
    println!("--- script ---\n{}", regions.script);
    println!("--- template ---\n{}", regions.template);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(out_dir: Option<&str>) -> BuildSettings {
        BuildSettings {
            out_dir: out_dir.map(PathBuf::from),
            emit: Emit::Js,
            compile: CompileOptions::default(),
            print: EmitOptions::default(),
        }
    }

    #[test]
    fn test_outputs_sit_next_to_inputs_by_default() {
        let files = vec![PathBuf::from("a/card.lazy"), PathBuf::from("b/card.lazy")];
        let plan = plan_outputs(&files, &settings(None)).unwrap();
        assert_eq!(plan[0].1, PathBuf::from("a/card.js"));
        assert_eq!(plan[1].1, PathBuf::from("b/card.js"));
    }

    #[test]
    fn test_shared_output_path_is_rejected() {
        let files = vec![PathBuf::from("a/card.lazy"), PathBuf::from("b/card.lazy")];
        let err = plan_outputs(&files, &settings(Some("dist"))).unwrap_err();
        assert!(err.to_string().contains("dist/card.js"));
    }
}
