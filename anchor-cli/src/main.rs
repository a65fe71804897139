//! Anchor positioning polyfill CLI
//!
//! Runs the polyfill over a JSON fixture and prints what it resolved.

mod fixture;

use std::path::PathBuf;

use anchor_position::{
    Document, ElementRef, IdGenerator, PolyfillOutput, RandomIds, ResolvedDeclaration,
    SequentialIds, StyleRecord, StyleSource, collect_style_records, inline_style_text, polyfill,
};
use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;

use fixture::Fixture;

/// Resolve `anchor()`, `anchor-size()` and `position-area` in a fixture
#[derive(Parser, Debug)]
#[command(name = "anchor-polyfill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Summarize what resolved
    anchor-polyfill fixture.json

    # Full output as JSON, with reproducible ids
    anchor-polyfill --json --deterministic fixture.json

    # Seeded random ids and debug logging
    anchor-polyfill --seed 7 -vv fixture.json
"#)]
struct Cli {
    /// Fixture file
    #[arg(value_name = "FIXTURE")]
    fixture: PathBuf,

    /// Seed for generated ids
    #[arg(long, conflicts_with = "deterministic")]
    seed: Option<u64>,

    /// Number generated ids sequentially
    #[arg(long)]
    deterministic: bool,

    /// Print only the JSON output
    #[arg(long)]
    json: bool,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let fixture = Fixture::load(&cli.fixture)?;
    let mut document = fixture.build_document()?;
    let layout = fixture.layout(&document);
    let mut ids: Box<dyn IdGenerator> = match (cli.seed, cli.deterministic) {
        (_, true) => Box::new(SequentialIds::new()),
        (Some(seed), false) => Box::new(RandomIds::with_seed(seed)),
        (None, false) => Box::new(RandomIds::new()),
    };

    let mut records = collect_style_records(
        &mut document,
        &fixture.linked,
        !fixture.options.exclude_inline_styles,
        ids.as_mut(),
    );
    records.extend(fixture.stylesheets.iter().enumerate().map(|(index, css)| {
        StyleRecord::new(
            StyleSource::Link {
                href: format!("stylesheet-{index}"),
            },
            css.clone(),
        )
    }));
    log::info!("{} style records", records.len());

    let output = polyfill(&mut document, records, &fixture.options, &layout, ids.as_mut());

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("failed to serialize output")?;
        println!("{json}");
    } else {
        print_summary(&document, &output);
    }
    Ok(())
}

fn print_summary(document: &Document, output: &PolyfillOutput) {
    println!("{}", "=== Records ===".bold());
    for record in &output.records {
        let state = match (record.created, record.changed) {
            (true, _) => "created".cyan().to_string(),
            (false, true) => "rewritten".green().to_string(),
            (false, false) => "unchanged".dimmed().to_string(),
        };
        println!("  {state:>10}  {}", record.origin());
    }

    println!("\n{}", "=== Positions ===".bold());
    for (selector, target) in &output.resolution.positions {
        println!("  {}", selector.bold());
        for (property, uses) in &target.declarations {
            for resolved in uses {
                let anchor = resolved.anchor_el().map_or_else(
                    || "no anchor".yellow().to_string(),
                    |anchor| document.describe(anchor).green().to_string(),
                );
                let detail = match resolved {
                    ResolvedDeclaration::Anchor { descriptor, .. } => {
                        format!("{}(), fallback {}", descriptor.kind, descriptor.fallback_value)
                    }
                    ResolvedDeclaration::PositionArea { descriptor, .. } => format!(
                        "{} {}",
                        descriptor.block_value, descriptor.inline_value
                    ),
                };
                println!(
                    "    {property}: {} -> {anchor}  ({detail})",
                    document.describe(resolved.target_el())
                );
            }
        }
        for fallback in &target.fallbacks {
            println!("    try {}: {} declarations", fallback.id, fallback.declarations.len());
        }
        if let Some(order) = target.order {
            println!("    order: {order}");
        }
    }

    if !output.resolution.inline_styles.is_empty() {
        println!("\n{}", "=== Inline styles ===".bold());
        for (element, patch) in &output.resolution.inline_styles {
            println!(
                "  {}: {}",
                document.describe(ElementRef::element(*element)),
                inline_style_text(patch)
            );
        }
    }

    for error in &output.resolution.errors {
        eprintln!("{} {error}", "error:".red().bold());
    }
    if output.round_anchor_positions {
        println!("\n(anchor positions will be rounded)");
    }
}
