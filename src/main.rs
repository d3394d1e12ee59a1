mod cli;
mod generators;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use generators::{EmitContext, OutputFile};
use xsd_catalog::Catalog;

fn read_input(input: &str) -> Result<String> {
    if input.starts_with("http://") || input.starts_with("https://") {
        tracing::debug!(url = input, "fetching schema");
        reqwest::blocking::get(input)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("failed to fetch {input}"))
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

fn print_summary(catalog: &Catalog, output_dir: &Path, files: &[OutputFile]) {
    println!("Enumerations: {}", catalog.enums.len());
    for enum_def in &catalog.enums {
        println!("  {} ({} values)", enum_def.display_name, enum_def.values.len());
    }
    println!("Records: {}", catalog.records.len());
    for record in &catalog.records {
        println!("  {} ({} fields)", record.display_name, record.fields.len());
    }
    println!("Elements: {}", catalog.elements.len());
    for element in &catalog.elements {
        let type_ = element.root_record.as_deref().unwrap_or(&element.type_);
        println!("  {}: {type_}", element.ident);
    }
    println!("Generated files in {}:", output_dir.display());
    for file in files {
        println!("  {}", file.name);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    let xsd = read_input(&cli.input)?;
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = cli.allow_dtd;
    let xsd = roxmltree::Document::parse_with_options(&xsd, options)
        .with_context(|| format!("{} is not well-formed XML", cli.input))?;
    let lowered = xsd_catalog::read_schema(&xsd)
        .with_context(|| format!("failed to read schema {}", cli.input))?;

    let ctx = EmitContext::new(&lowered.catalog, &cli.namespace);
    let files = cli
        .generator
        .generate(&ctx)
        .context("failed to generate code")?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    for file in &files {
        let path = cli.output_dir.join(&file.name);
        fs::write(&path, &file.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::debug!(files = files.len(), "generation finished");

    if !cli.quiet {
        print_summary(&lowered.catalog, &cli.output_dir, &files);
    }
    Ok(())
}
