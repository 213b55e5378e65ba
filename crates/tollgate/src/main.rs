//! Tollgate CLI.
//!
//! Converts an exported APIGEE proxy bundle into a Swagger 2.0 document
//! (`convert`) or reports what each flow of the bundle turns into
//! (`inspect`).

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tollgate_compiler::{
    convert, ConvertConfig, ConvertError, FlowOutcome, FlowReport, OutputFormat, SkipReason,
};
use tollgate_telemetry::{LogFormat, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(
    name = "tollgate",
    about = "APIGEE proxy bundle to OpenAPI converter",
    version
)]
struct Cli {
    /// Log level (or any RUST_LOG style filter).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (pretty or json). Logs always go to stderr.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a proxy bundle into an OpenAPI (Swagger 2.0) document.
    Convert {
        /// Bundle directory (`apiproxy/` or the directory containing it).
        #[arg(short, long, env = "TOLLGATE_BUNDLE")]
        bundle: Option<PathBuf>,

        /// Proxy descriptor name, required when the bundle holds several.
        #[arg(short, long, env = "TOLLGATE_PROXY")]
        proxy: Option<String>,

        /// YAML settings file. Flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (json or yaml).
        #[arg(long)]
        format: Option<String>,

        /// Emit single-line JSON.
        #[arg(long)]
        compact: bool,

        /// Write the document to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how each flow of a bundle is routed.
    ///
    /// Exits with 1 when any flow has an invalid condition (E2001) or an
    /// untemplatable path (E2002).
    Inspect {
        /// Bundle directory (`apiproxy/` or the directory containing it).
        #[arg(short, long, env = "TOLLGATE_BUNDLE")]
        bundle: PathBuf,

        /// Proxy descriptor name, required when the bundle holds several.
        #[arg(short, long, env = "TOLLGATE_PROXY")]
        proxy: Option<String>,

        /// Output format (text or json).
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_format) = LogFormat::parse(&cli.log_format) else {
        eprintln!("error: unknown log format '{}'", cli.log_format);
        return ExitCode::from(1);
    };
    let telemetry = TelemetryConfig::new()
        .with_log_level(&cli.log_level)
        .with_log_format(log_format)
        .with_ansi(std::io::stderr().is_terminal());
    if let Err(e) = tollgate_telemetry::init(&telemetry) {
        eprintln!("error: {}", e);
        return ExitCode::from(1);
    }

    match cli.command {
        Commands::Convert {
            bundle,
            proxy,
            config,
            format,
            compact,
            output,
        } => run_convert(ConvertArgs {
            bundle,
            proxy,
            config,
            format,
            compact,
            output,
        }),
        Commands::Inspect {
            bundle,
            proxy,
            format,
        } => run_inspect(&bundle, proxy, &format),
    }
}

struct ConvertArgs {
    bundle: Option<PathBuf>,
    proxy: Option<String>,
    config: Option<PathBuf>,
    format: Option<String>,
    compact: bool,
    output: Option<PathBuf>,
}

/// Merge the settings file (if any) with command-line flags.
fn resolve_config(args: &ConvertArgs) -> Result<ConvertConfig, ConvertError> {
    let mut config = match &args.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };

    if let Some(bundle) = &args.bundle {
        config.bundle_dir = bundle.clone();
    }
    if let Some(proxy) = &args.proxy {
        config.proxy_name = Some(proxy.clone());
    }
    if let Some(format) = &args.format {
        config.output_format = OutputFormat::parse(format).ok_or_else(|| {
            ConvertError::Config(format!("unknown output format '{}'", format))
        })?;
    }
    if args.compact {
        config.pretty = false;
    }

    Ok(config)
}

/// Run the convert command.
fn run_convert(args: ConvertArgs) -> ExitCode {
    let result = resolve_config(&args).and_then(|config| {
        let conversion = convert(&config)?;
        let rendered = conversion
            .document
            .render(config.output_format, config.pretty)?;
        Ok((conversion, rendered))
    });

    let (conversion, rendered) = match result {
        Ok(converted) => converted,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                eprintln!("error: cannot write {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
            let summary = conversion.report.summary();
            eprintln!(
                "Document written to: {} ({} path(s), {} operation(s), {} flow(s) skipped)",
                path.display(),
                conversion.table.len(),
                conversion.table.operation_count(),
                summary.skipped
            );
        }
        None => {
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }

    ExitCode::SUCCESS
}

/// One flow of the inspect report.
#[derive(serde::Serialize)]
struct FlowResult {
    endpoint: String,
    flow: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaces: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl FlowResult {
    fn from_report(report: &FlowReport) -> Self {
        let mut result = FlowResult {
            endpoint: report.endpoint.clone(),
            flow: report.flow.clone(),
            condition: report.condition.clone(),
            status: report.outcome.status(),
            method: None,
            path: None,
            replaces: None,
            reason: None,
            message: None,
        };

        match &report.outcome {
            FlowOutcome::Routed { method, path } | FlowOutcome::Dropped { method, path } => {
                result.method = Some(method.clone());
                result.path = Some(path.clone());
            }
            FlowOutcome::Replaced {
                method,
                path,
                previous,
            } => {
                result.method = Some(method.clone());
                result.path = Some(path.clone());
                result.replaces = Some(previous.clone());
            }
            FlowOutcome::Skipped(reason) => {
                if let SkipReason::MissingVerb { path } = reason {
                    result.path = Some(path.to_string());
                }
                result.reason = Some(reason.code());
                result.message = Some(reason.to_string());
            }
        }

        result
    }
}

/// Run the inspect command.
fn run_inspect(bundle: &Path, proxy: Option<String>, output_format: &str) -> ExitCode {
    let mut config = ConvertConfig::new(bundle);
    config.proxy_name = proxy;

    let conversion = match convert(&config) {
        Ok(conversion) => conversion,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let report = &conversion.report;
    let summary = report.summary();

    if output_format == "json" {
        let results: Vec<FlowResult> = report.flows.iter().map(FlowResult::from_report).collect();
        let output = serde_json::json!({
            "proxy": conversion.document.info.title,
            "results": results,
            "summary": summary,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        for flow in &report.flows {
            let marker = match &flow.outcome {
                FlowOutcome::Routed { .. } | FlowOutcome::Replaced { .. } => "✓",
                outcome if outcome.is_error() => "✗",
                _ => "-",
            };
            println!(
                "{} {}/{}: {}",
                marker,
                flow.endpoint,
                flow.flow,
                flow.outcome.detail()
            );
            if flow.outcome.is_error() {
                if let Some(condition) = &flow.condition {
                    println!("    condition: {}", condition);
                }
            }
        }

        println!();
        println!(
            "inspected {} flow(s): {} routed, {} dropped, {} skipped, {} error(s)",
            summary.total, summary.routed, summary.dropped, summary.skipped, summary.errors
        );
    }

    if report.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
