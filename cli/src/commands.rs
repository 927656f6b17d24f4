use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use streetdb::{
    ensure_dir_exists, find_default_csv, load_countries, read_rows, write_atomic, write_payload,
    ShardSet, DEFAULT_SCALE,
};

use crate::cli::Cli;

/// Resolve the countries CSV path: an explicit flag wins, the literal
/// "none" disables injection, and the default sits beside the builder
/// executable.
fn resolve_countries_path(cli: &Cli) -> Result<Option<PathBuf>> {
    match &cli.countries {
        Some(path) if path.as_os_str() == "none" => Ok(None),
        Some(path) => Ok(Some(path.clone())),
        None => {
            let exe = env::current_exe().context("failed to locate the builder executable")?;
            Ok(Some(exe.with_file_name("countries.csv")))
        }
    }
}

pub fn build(cli: &Cli) -> Result<()> {
    let input = match &cli.input {
        Some(path) => path.clone(),
        None => find_default_csv(&env::current_dir()?)?,
    };
    println!("Building trie from {}", input.display());

    let countries_path = resolve_countries_path(cli)?;
    let countries = load_countries(countries_path.as_deref())?;
    if cli.verbose > 0 {
        eprintln!("[countries] {} entries", countries.len());
    }

    let rows = read_rows(&input)?;
    if cli.verbose > 0 {
        eprintln!("[input] {} rows kept from {}", rows.len(), input.display());
    }

    let mut shards = ShardSet::new(cli.shard_prefix_len);
    for row in &rows {
        shards.insert_row(row);
    }
    for country in &countries {
        shards.insert_country(country);
    }

    if cli.shard_prefix_len > 0 {
        println!("Sharding trie by first {} characters", cli.shard_prefix_len);
        println!("Built {} shards", shards.len());

        let mut output_base = cli.output.clone();
        if output_base.extension().is_some() {
            output_base.set_extension("");
        }
        let stem = output_base
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context("output path has no file name")?;
        let shards_dir = output_base
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("shards");
        ensure_dir_exists(&shards_dir)?;

        for (key, builder) in shards.into_builders() {
            println!(
                "Loaded shard {key}: {} locations, {} nodes, {} cities",
                builder.location_count(),
                builder.node_name_count(),
                builder.city_name_count()
            );
            println!("Compressing shard {key}");
            let payload = builder.finish();
            println!("Packing shard {key}");
            let bytes = write_payload(&payload, cli.format.as_output(), DEFAULT_SCALE)?;
            let path = shards_dir.join(format!("{stem}.shard_{key}.packed"));
            println!(
                "Writing shard {key} to {} ({})",
                path.display(),
                cli.format.as_output().as_str()
            );
            write_atomic(&path, &bytes)?;
        }
    } else {
        // Sharding disabled: exactly one builder, one output file.
        for (_, builder) in shards.into_builders() {
            println!(
                "Loaded {} locations, {} nodes, {} cities",
                builder.location_count(),
                builder.node_name_count(),
                builder.city_name_count()
            );
            println!("Compressing trie edges");
            let payload = builder.finish();
            println!("Packing trie payload");
            let bytes = write_payload(&payload, cli.format.as_output(), DEFAULT_SCALE)?;
            println!(
                "Writing output to {} ({})",
                cli.output.display(),
                cli.format.as_output().as_str()
            );
            write_atomic(&cli.output, &bytes)?;
        }
    }

    println!("Done");
    Ok(())
}
