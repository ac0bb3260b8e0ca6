//! Command-line interface for nodegql.
//!
//! # Usage
//!
//! ```bash
//! # Print the augmented schema
//! nodegql build schema.graphql
//!
//! # Write it to a file, with subscription types
//! nodegql build schema.graphql --subscriptions -o augmented.graphql
//!
//! # Validate type definitions
//! nodegql check schema.graphql other.graphql
//!
//! # Print the root operation manifest as JSON
//! nodegql operations schema.graphql --config nodegql.json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, Severity};
use nodegql::{
    build_schema, BuildError, BuiltSchema, Diagnostic, DiagnosticSeverity, SchemaConfig,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nodegql")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Generate subscription event types
    #[arg(long, global = true)]
    pub subscriptions: bool,

    /// Omit deprecated legacy filter and update fields
    #[arg(long, global = true)]
    pub no_legacy_filters: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the augmented schema and print its SDL
    Build {
        /// Type definitions file
        schema: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check type definitions for errors
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Print the root operation manifest as JSON
    Operations {
        /// Type definitions file
        schema: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print version information
    Version,
}

pub fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Build { schema, output } => {
            let Some(built) = build_file(schema, &config)? else {
                return Ok(1);
            };
            write_output(output.as_deref(), &built.sdl)?;
            if !cli.quiet {
                if let Some(output) = output {
                    eprintln!(
                        "{} {} types written to {}",
                        "Built".green().bold(),
                        built.graph.len(),
                        output.display()
                    );
                }
            }
            Ok(0)
        }
        Commands::Check { files, strict } => check_files(files, &config, *strict, &cli),
        Commands::Operations {
            schema,
            output,
            compact,
        } => {
            let Some(built) = build_file(schema, &config)? else {
                return Ok(1);
            };
            let mut json = if *compact {
                serde_json::to_string(&built.operations)?
            } else {
                serde_json::to_string_pretty(&built.operations)?
            };
            json.push('\n');
            write_output(output.as_deref(), &json)?;
            Ok(0)
        }
        Commands::Version => {
            println!("nodegql {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

/// Reads the configuration file, if any, and applies the command-line
/// overrides on top.
pub fn load_config(cli: &Cli) -> Result<SchemaConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SchemaConfig::from_json(&std::fs::read_to_string(path)?)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?,
        None => SchemaConfig::default(),
    };
    if cli.subscriptions {
        config.subscriptions = true;
    }
    if cli.no_legacy_filters {
        config.legacy_filters = false;
    }
    Ok(config)
}

fn check_files(
    files: &[PathBuf],
    config: &SchemaConfig,
    strict: bool,
    cli: &Cli,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut failed = 0;

    for file in files {
        if cli.verbose {
            eprintln!("{} {}", "Checking".blue(), file.display());
        }
        match build_file(file, config)? {
            Some(built) if strict && !built.warnings.is_empty() => {
                failed += 1;
                eprintln!(
                    "{} {} (warnings are errors in strict mode)",
                    "Error".red().bold(),
                    file.display()
                );
            }
            Some(_) => {
                if cli.verbose {
                    eprintln!("{} {}", "OK".green(), file.display());
                }
            }
            None => failed += 1,
        }
    }

    if failed > 0 {
        eprintln!(
            "{} {failed} of {} file(s) failed",
            "Failed:".red().bold(),
            files.len()
        );
        return Ok(1);
    }
    if !cli.quiet {
        eprintln!(
            "{} {} file(s) checked",
            "Success:".green().bold(),
            files.len()
        );
    }
    Ok(0)
}

/// Builds one file, printing its diagnostics. Returns `None` if the build
/// failed.
fn build_file(
    path: &Path,
    config: &SchemaConfig,
) -> Result<Option<BuiltSchema>, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let name = path.display().to_string();
    tracing::debug!(file = %name, "building schema");

    match build_schema(&source, config) {
        Ok(built) => {
            for warning in built.warnings.iter() {
                eprintln!("{}", render_diagnostic(&name, &source, warning));
            }
            Ok(Some(built))
        }
        Err(err) => {
            eprintln!("{} {name}: {err}", "Error".red().bold());
            if let Some(diagnostics) = err.diagnostics() {
                for diagnostic in diagnostics.iter() {
                    eprintln!("{}", render_diagnostic(&name, &source, diagnostic));
                }
            }
            if matches!(err, BuildError::Schema(_)) {
                tracing::warn!(file = %name, "augmentation produced an inconsistent schema");
            }
            Ok(None)
        }
    }
}

/// Renders a diagnostic as a miette report over its source file.
pub fn render_diagnostic(name: &str, source: &str, diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => Severity::Error,
        DiagnosticSeverity::Warning => Severity::Warning,
    };
    let labels = diagnostic
        .labels
        .iter()
        .map(|label| LabeledSpan::new_with_span(Some(label.message.clone()), label.span));

    let mut report = MietteDiagnostic::new(diagnostic.title.clone())
        .with_code(diagnostic.code)
        .with_severity(severity)
        .with_labels(labels);
    if let Some(message) = &diagnostic.message {
        report = report.with_help(message.clone());
    }

    let report = Report::new(report).with_source_code(NamedSource::new(name, source.to_string()));
    format!("{report:?}")
}

fn write_output(output: Option<&Path>, contents: &str) -> std::io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents),
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegql::codes;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("nodegql_cli_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "nodegql",
            "operations",
            "schema.graphql",
            "--subscriptions",
            "--no-legacy-filters",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.subscriptions);
        assert!(!config.legacy_filters);
        assert!(matches!(cli.command, Commands::Operations { compact: false, .. }));
    }

    #[test]
    fn test_config_file_with_overrides() {
        let path = temp_file("config.json", r#"{ "legacyFilters": false }"#);
        let cli = Cli::try_parse_from([
            "nodegql",
            "build",
            "schema.graphql",
            "--config",
            path.to_str().unwrap(),
            "--subscriptions",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.subscriptions);
        assert!(!config.legacy_filters);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_config_file() {
        let path = temp_file("bad.json", r#"{ "subscriptions": 1 }"#);
        let cli = Cli::try_parse_from([
            "nodegql",
            "check",
            "schema.graphql",
            "-c",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_build_writes_sdl() {
        let schema = temp_file("movie.graphql", "type Movie { title: String }");
        let output = std::env::temp_dir()
            .join(format!("nodegql_cli_{}_out.graphql", std::process::id()));
        let cli = Cli::try_parse_from([
            "nodegql",
            "build",
            schema.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--quiet",
        ])
        .unwrap();
        assert_eq!(run(cli).unwrap(), 0);
        let sdl = std::fs::read_to_string(&output).unwrap();
        assert!(sdl.contains("type Query {"));
        assert!(sdl.contains("input MovieWhere {"));
        std::fs::remove_file(schema).unwrap();
        std::fs::remove_file(output).unwrap();
    }

    #[test]
    fn test_check_reports_failure() {
        let schema = temp_file(
            "invalid.graphql",
            "type Movie { actor: Actor }\ntype Actor { name: String }",
        );
        let cli =
            Cli::try_parse_from(["nodegql", "check", schema.to_str().unwrap(), "-q"]).unwrap();
        assert_eq!(run(cli).unwrap(), 1);
        std::fs::remove_file(schema).unwrap();
    }

    #[test]
    fn test_render_diagnostic() {
        let source = "type Movie { actor: Actor }\ntype Actor { name: String }";
        let err = build_schema(source, &SchemaConfig::default()).unwrap_err();
        let diagnostic = err
            .diagnostics()
            .unwrap()
            .iter()
            .find(|d| d.code == codes::MISSING_RELATIONSHIP_DIRECTIVE)
            .unwrap();
        let rendered = render_diagnostic("movie.graphql", source, diagnostic);
        assert!(rendered.contains(codes::MISSING_RELATIONSHIP_DIRECTIVE));
    }
}
