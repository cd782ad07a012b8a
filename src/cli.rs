//! Minimal CLI: class model → (registry | schema | sample)
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;

use class_schema::loader::{ModelSource, load_settings};
use class_schema::{AnalysisRun, Type, analyze_roots, emit};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// resolve class models into a schema registry and print it as raw registry, JSON Schema, or sample JSON
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// more logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the raw identifier → representation registry
    Registry(Target),
    /// print a JSON Schema with one `$defs` entry per registered type
    Schema(Target),
    /// print an example JSON document per root type
    Sample(Target),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /build/model)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one class model
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more class model files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct Target {
    #[command(flatten)]
    input_settings: InputSettings,

    /// root types to analyze, e.g. `com.example.Order` or `java.util.List<com.example.Item>`
    #[arg(long, short, num_args = 1.., required = true)]
    root: Vec<Type>,

    /// analyzer settings (.json); defaults apply to absent keys
    #[arg(long)]
    settings: Option<PathBuf>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn model_source(&self) -> ModelSource {
        ModelSource {
            inputs: self.input.clone(),
            json_pointer: self.json_pointer.clone(),
            jq_expr: self.jq_expr.clone(),
        }
    }
}

impl Target {
    fn analyze(&self) -> Result<AnalysisRun> {
        let settings = load_settings(self.settings.as_deref())?;
        let classes = self.input_settings.model_source().load_class_path()?;
        let run = analyze_roots(&classes, &settings, &self.root).context("analysis failed")?;

        let dangling = run.registry.dangling_references(|ty| settings.is_opaque(ty));
        for identifier in &dangling {
            tracing::warn!(%identifier, "referenced type has no registry entry");
        }
        eprintln!(
            "{} {} types registered for {} root(s)",
            "✓".green().bold(),
            run.registry.len(),
            run.roots.len()
        );
        Ok(run)
    }

    fn write(&self, output: &serde_json::Value) -> Result<()> {
        let output_src = serde_json::to_string_pretty(output)?;
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &output_src).with_context(|| format!("failed to write {}", out.display()))?;
        } else {
            println!("{output_src}");
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        let target = match &self.cmd {
            Command::Registry(target) | Command::Schema(target) | Command::Sample(target) => target,
        };
        // debug path
        if target.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }

        let run = target.analyze()?;
        let output = match &self.cmd {
            Command::Registry(_) => serde_json::to_value(&run.registry)?,
            Command::Schema(_) => emit::json_schema(&run.registry, &run.roots),
            Command::Sample(_) => emit::sample_documents(&run.registry, &run.roots),
        };
        target.write(&output)
    }
}
