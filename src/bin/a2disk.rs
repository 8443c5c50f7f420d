//! # Command Line Interface
//!
//! Thin driver: finds `.dsk`/`.do` images under a directory, reads each one
//! through [`a2disk::disk::Disk`] and [`a2disk::taste::taste`], and prints a
//! catalog and anomaly report. Everything here is plumbing (argument
//! parsing, glob matching, output formatting, boot-sector-hash grouping)
//! that spec.md marks as external to the decomposition engine itself; the
//! engine is the library crate, this binary only calls it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{arg, crate_version, Command};
use globset::GlobBuilder;

use a2disk::disk::Disk;
use a2disk::taste::{self, Tasted};

fn build_cli() -> Command {
    Command::new("a2disk")
        .version(crate_version!())
        .about("Decompose Apple II DOS 3.3 floppy disk images and report anomalies")
        .long_about("Set RUST_LOG environment variable to control logging level.\n  levels: trace,debug,info,warn,error")
        .arg(arg!(-d --dir <DIR> "directory to search for disk images").default_value("."))
        .arg(arg!(-p --pattern <GLOB> "glob pattern for image file names, case-insensitively, supports {a,b} alternation").default_value("*.{dsk,do}"))
        .arg(arg!(-a --anomalies "print every anomaly found, not just a summary count"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = build_cli().get_matches();
    let dir = matches.get_one::<String>("dir").expect("has default");
    let pattern = matches.get_one::<String>("pattern").expect("has default");
    let show_anomalies = matches.get_flag("anomalies");

    let images = find_images(Path::new(dir), pattern)?;
    if images.is_empty() {
        log::warn!("no images matched `{}` under `{}`", pattern, dir);
    }

    let mut by_boot_hash: HashMap<String, Vec<String>> = HashMap::new();

    for path in images {
        match process_one(&path, show_anomalies) {
            Ok(boot_hash) => {
                by_boot_hash.entry(boot_hash).or_default().push(path.display().to_string());
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
            }
        }
    }

    println!("\n== disks grouped by boot sector hash ==");
    for (hash, paths) in &by_boot_hash {
        if paths.len() < 2 {
            continue;
        }
        println!("{} ({} disks share this Boot1 sector):", hash, paths.len());
        for p in paths {
            println!("  {}", p);
        }
    }

    Ok(())
}

/// Recursively collect every file under `dir` whose name matches `pattern`.
/// Uses `globset` rather than the plain `glob` crate because the pattern may
/// use brace alternation (`*.{dsk,do}`), which `glob` doesn't understand.
fn find_images(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let matcher = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()?
        .compile_matcher();

    let mut out = Vec::new();
    walk(dir, &matcher, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, matcher: &globset::GlobMatcher, out: &mut Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, matcher, out)?;
        } else if let Some(name) = path.file_name() {
            if matcher.is_match(name) {
                out.push(path);
            }
        }
    }
    Ok(())
}

/// Read, taste, and print one image; returns its boot sector (0,0) hash for
/// the batch-grouping pass.
fn process_one(path: &Path, show_anomalies: bool) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let name = path.display().to_string();
    let mut disk = Disk::new(name.clone(), bytes)?;
    let boot_hash = disk.boot1_hash().to_string();

    println!("\n== {} ==", name);
    match taste::taste(&mut disk) {
        Ok(Tasted::Dos33(dos)) => {
            print!("{}", dos.catalog_listing());
            for filename in &dos.filenames {
                let Some(file) = dos.files.get(filename) else { continue };
                if let Some(a2disk::dos33::file_types::ParsedContents::Applesoft(program)) = &file.parsed {
                    println!("--- {} ---\n{}", filename, program.list());
                }
            }
        }
        Err(reason) => {
            println!("not identified as a known filesystem:");
            for (taster, why) in &reason.attempts {
                println!("  {}: {}", taster, why);
            }
        }
    }

    let anomalies = disk.tree().all_anomalies();
    println!("{} anomalies", anomalies.len());
    if show_anomalies {
        for (container, anomaly) in anomalies {
            println!("  [{}] {}", container, anomaly);
        }
    }

    Ok(boot_hash)
}
