#![forbid(unsafe_code)]

//! agentmarkup CLI - parse, inspect and render chat-agent message markup.
//!
//! # Commands
//!
//! - `parse`: Output the parse result as JSON for tooling/debugging
//! - `detect`: Show the detected content type and confidence
//! - `render`: Render a message as terminal text with its actions
//! - `check`: Report diagnostics, optionally failing on warnings

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;

use am_core::{
    ConfigError, Diagnostic, DiagnosticCategory, DiagnosticSeverity, ParseResult, ParserConfig,
    RenderContext, parse_config_value,
};
use am_parser::{MessageParser, detect_content_type, parse_summary_json};
use am_render_text::{TextRenderConfig, render_text_with_config};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

/// agentmarkup CLI - parse, inspect and render chat-agent message markup.
#[derive(Debug, Parser)]
#[command(
    name = "am-cli",
    version,
    about = "agentmarkup CLI - parse, inspect and render chat-agent message markup",
    long_about = "Parses the hybrid tag/markdown markup used in chat-agent messages.\n\n\
        Messages may mix block tags, CDATA metadata, inline markdown and\n\
        bracketed image tokens."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a message and print the result as JSON.
    Parse {
        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Print a compact summary instead of the full result
        #[arg(long)]
        summary: bool,

        /// Parser configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Detect whether a message is markup, markdown or plain text.
    Detect {
        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a message as terminal text.
    Render {
        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,

        /// ASCII-only output (no Unicode decorations)
        #[arg(long)]
        ascii: bool,

        /// Base URL for image tokens, ending in "/"
        #[arg(long)]
        image_base_url: Option<String>,

        /// Placeholder substitution, repeatable
        #[arg(long = "placeholder", value_name = "KEY=VALUE", value_parser = parse_placeholder)]
        placeholders: Vec<(String, String)>,

        /// Parser configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Omit the trailing list of buttons and links
        #[arg(long)]
        no_actions: bool,

        /// Print rendered text and actions as JSON
        #[arg(long)]
        json: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check a message and report diagnostics.
    Check {
        /// Input file path, "-" for stdin, or inline message text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,

        /// Parser configuration file (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Result of detecting the content type.
#[derive(Debug, Serialize)]
struct DetectResult {
    content_type: String,
    confidence: f32,
    detection_method: String,
    first_line: String,
}

/// Result of checking a message.
#[derive(Debug, Serialize)]
struct CheckResult {
    valid: bool,
    content_type: String,
    node_count: usize,
    section_count: usize,
    issues: Vec<CheckIssue>,
}

#[derive(Debug, Serialize)]
struct CheckIssue {
    code: String,
    severity: DiagnosticSeverity,
    category: DiagnosticCategory,
    message: String,
    span: Option<(usize, usize)>,
    suggestion: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            pretty,
            summary,
            config,
            output,
        } => cmd_parse(&input, pretty, summary, config.as_deref(), output.as_deref()),

        Command::Detect { input, json } => cmd_detect(&input, json),

        Command::Render {
            input,
            ascii,
            image_base_url,
            placeholders,
            config,
            no_actions,
            json,
            output,
        } => {
            let mut context = RenderContext::default();
            if let Some(base_url) = image_base_url {
                context = context.with_image_base_url(base_url);
            }
            for (key, value) in placeholders {
                context = context.with_placeholder(key, value);
            }
            let mut render_config = if ascii {
                TextRenderConfig::ascii()
            } else {
                TextRenderConfig::default()
            };
            render_config.show_actions = !no_actions;
            cmd_render(
                &input,
                &context,
                &render_config,
                config.as_deref(),
                json,
                output.as_deref(),
            )
        }

        Command::Check {
            input,
            json,
            strict,
            config,
        } => cmd_check(&input, json, strict, config.as_deref()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline message text
        Ok(input.to_string())
    }
}

fn load_config(path: Option<&str>) -> Result<ParserConfig> {
    let Some(path) = path else {
        return Ok(ParserConfig::default());
    };
    let raw = std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).context(format!("Config is not valid JSON: {path}"))?;

    let parsed = parse_config_value(&value);
    for error in &parsed.errors {
        if let ConfigError::NotAnObject { .. } = error {
            bail!("{error}");
        }
        warn!("Config: {error}");
    }
    debug!(?parsed.config, "loaded parser config");
    Ok(parsed.config)
}

fn parse_placeholder(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn log_diagnostics(parsed: &ParseResult) {
    for diagnostic in &parsed.diagnostics {
        match diagnostic.severity {
            DiagnosticSeverity::Error | DiagnosticSeverity::Warning => {
                warn!("Parse {}: {}", diagnostic.severity.as_str(), diagnostic.message);
            }
            DiagnosticSeverity::Info | DiagnosticSeverity::Hint => {
                debug!("Parse {}: {}", diagnostic.severity.as_str(), diagnostic.message);
            }
        }
    }
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(
    input: &str,
    pretty: bool,
    summary: bool,
    config: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let source = load_input(input)?;
    let mut parser = MessageParser::with_config(load_config(config)?);

    let start = Instant::now();
    let parsed = parser.parse(&source);
    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "parsed message");

    let mut json = if summary {
        let value: serde_json::Value = serde_json::from_str(&parse_summary_json(&parsed))?;
        to_json(&value, pretty)?
    } else {
        to_json(&parsed, pretty)?
    };
    json.push('\n');
    write_output(output, &json)?;

    log_diagnostics(&parsed);
    Ok(())
}

// =============================================================================
// Command: detect
// =============================================================================

fn cmd_detect(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let detected = detect_content_type(&source);
    let first_line = source
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim();

    if json_output {
        let result = DetectResult {
            content_type: detected.content_type.as_str().to_string(),
            confidence: detected.confidence,
            detection_method: detected.method.as_str().to_string(),
            first_line: first_line.chars().take(100).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Content type: {}", detected.content_type.as_str());
        println!("Confidence:   {:.2}", detected.confidence);
        println!("Method:       {}", detected.method.as_str());
        if !first_line.is_empty() {
            println!(
                "First line:   {}",
                first_line.chars().take(60).collect::<String>()
            );
        }
    }

    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &str,
    context: &RenderContext,
    render_config: &TextRenderConfig,
    config: Option<&str>,
    json_output: bool,
    output: Option<&str>,
) -> Result<()> {
    let source = load_input(input)?;
    let mut parser = MessageParser::with_config(load_config(config)?);

    let parse_start = Instant::now();
    let parsed = parser.parse_with_placeholders(&source, &context.placeholders);
    let parse_ms = parse_start.elapsed().as_secs_f64() * 1000.0;

    let render_start = Instant::now();
    let rendered = render_text_with_config(&parsed, context, render_config);
    let render_ms = render_start.elapsed().as_secs_f64() * 1000.0;
    info!(
        content_type = parsed.content_type().as_str(),
        actions = rendered.actions.len(),
        parse_ms,
        render_ms,
        "rendered message"
    );

    log_diagnostics(&parsed);

    if json_output {
        let mut json = to_json(&rendered, true)?;
        json.push('\n');
        write_output(output, &json)
    } else {
        write_output(output, &rendered.output)
    }
}

// =============================================================================
// Command: check
// =============================================================================

fn cmd_check(input: &str, json_output: bool, strict: bool, config: Option<&str>) -> Result<()> {
    let source = load_input(input)?;
    let mut parser = MessageParser::with_config(load_config(config)?);
    let parsed = parser.parse(&source);

    let issues: Vec<CheckIssue> = parsed.diagnostics.iter().map(check_issue).collect();
    let counts = parsed.diagnostic_counts();
    let valid = counts.errors == 0 && (!strict || counts.warnings == 0);

    let result = CheckResult {
        valid,
        content_type: parsed.content_type().as_str().to_string(),
        node_count: parsed.nodes().len(),
        section_count: parsed.sections().len(),
        issues,
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if result.valid {
            println!("✓ Valid {} message", result.content_type);
        } else {
            println!("✗ Invalid message");
        }
        println!("  Nodes:    {}", result.node_count);
        println!("  Sections: {}", result.section_count);

        if !result.issues.is_empty() {
            println!("\nIssues:");
            for issue in &result.issues {
                let location = issue
                    .span
                    .map(|(start, end)| format!(" (bytes {start}..{end})"))
                    .unwrap_or_default();
                println!("  [{}] {}{}", issue.code, issue.message, location);
                if let Some(suggestion) = &issue.suggestion {
                    println!("       → {suggestion}");
                }
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn check_issue(diagnostic: &Diagnostic) -> CheckIssue {
    CheckIssue {
        code: diagnostic_code(diagnostic),
        severity: diagnostic.severity,
        category: diagnostic.category,
        message: diagnostic.message.clone(),
        span: diagnostic.span.map(|span| (span.start, span.end)),
        suggestion: diagnostic.suggestion.clone(),
    }
}

/// `W003`-style code: severity letter plus category number.
fn diagnostic_code(diagnostic: &Diagnostic) -> String {
    let letter = match diagnostic.severity {
        DiagnosticSeverity::Error => 'E',
        DiagnosticSeverity::Warning => 'W',
        DiagnosticSeverity::Info => 'I',
        DiagnosticSeverity::Hint => 'H',
    };
    let number = match diagnostic.category {
        DiagnosticCategory::Detection => 1,
        DiagnosticCategory::Attribute => 2,
        DiagnosticCategory::Metadata => 3,
        DiagnosticCategory::Image => 4,
        DiagnosticCategory::Tag => 5,
        DiagnosticCategory::Markdown => 6,
        DiagnosticCategory::Inline => 7,
        DiagnosticCategory::Recovery => 8,
    };
    format!("{letter}{number:03}")
}

#[cfg(test)]
mod tests {
    use am_core::{Diagnostic, DiagnosticCategory};

    use super::{diagnostic_code, parse_placeholder};

    #[test]
    fn placeholder_argument_splits_on_first_equals() {
        assert_eq!(
            parse_placeholder("name=Kim=Lee"),
            Ok(("name".to_string(), "Kim=Lee".to_string()))
        );
        assert_eq!(parse_placeholder("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_placeholder("novalue").is_err());
        assert!(parse_placeholder("=x").is_err());
    }

    #[test]
    fn diagnostic_codes_combine_severity_and_category() {
        let metadata = Diagnostic::warning("bad").with_category(DiagnosticCategory::Metadata);
        assert_eq!(diagnostic_code(&metadata), "W003");
        let detection = Diagnostic::info("empty").with_category(DiagnosticCategory::Detection);
        assert_eq!(diagnostic_code(&detection), "I001");
    }
}
