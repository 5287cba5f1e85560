//! # mpimport
//!
//! Merges a text file produced by `mpexport` (or edited by hand) back into
//! a MathPad database backup. Conflicting records — same title, different
//! content — are resolved interactively on stdin.
//!
//! ## Usage
//!
//! ```bash
//! # Update the database in place
//! mpimport MathPadDB.pdb edits.txt
//!
//! # Write a new database, keeping the old one as a backup
//! mpimport MathPadDB.pdb edits.txt NewDB.pdb
//! ```

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use eyre::{bail, eyre, Result, WrapErr};
use mpdb::{ConflictResolver, Database, MergeChoice};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut paths = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("mpimport {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {}", arg);
            }
            _ => paths.push(arg.as_str()),
        }
    }

    let (db_path, text_path, out_path) = match paths.as_slice() {
        [db, text] => (*db, *text, *db),
        [db, text, out] => (*db, *text, *out),
        _ => {
            print_usage();
            bail!("expected a database file and a text file");
        }
    };

    let file = File::open(db_path).wrap_err_with(|| format!("can't open \"{}\"", db_path))?;
    let mut reader = BufReader::new(file);
    let mut db = Database::load(&mut reader)
        .wrap_err_with(|| format!("loading database \"{}\"", db_path))?;
    drop(reader);

    let text = File::open(text_path).wrap_err_with(|| format!("can't open \"{}\"", text_path))?;
    let stats = db
        .import_text(BufReader::new(text), &mut PromptResolver)
        .wrap_err_with(|| format!("importing \"{}\"", text_path))?;

    let out = File::create(out_path).wrap_err_with(|| format!("can't open \"{}\"", out_path))?;
    let mut out = BufWriter::new(out);
    db.save(&mut out)
        .wrap_err_with(|| format!("writing \"{}\"", out_path))?;
    out.flush().wrap_err_with(|| format!("writing \"{}\"", out_path))?;

    println!(
        "Imported: {} added, {} overwritten, {} unchanged, {} kept as duplicates",
        stats.added, stats.replaced, stats.unchanged, stats.kept_duplicates
    );
    Ok(())
}

/// Asks Yes/No/All on stdin until one of the three is given.
struct PromptResolver;

impl ConflictResolver for PromptResolver {
    fn resolve(&mut self, existing_title: &[u8]) -> Result<MergeChoice> {
        let title = String::from_utf8_lossy(existing_title);
        loop {
            print!("Overwrite \"{}\" (Yes/No/All)? ", title);
            std::io::stdout().flush().wrap_err("writing prompt")?;

            let mut reply = String::new();
            let n = std::io::stdin()
                .read_line(&mut reply)
                .wrap_err("reading reply")?;
            if n == 0 {
                return Err(eyre!("no reply to overwrite prompt (end of input)"));
            }

            match reply.trim_start().chars().next().map(|c| c.to_ascii_uppercase()) {
                Some('Y') => return Ok(MergeChoice::Overwrite),
                Some('N') => return Ok(MergeChoice::Keep),
                Some('A') => return Ok(MergeChoice::OverwriteAll),
                _ => continue,
            }
        }
    }
}

fn print_usage() {
    println!("mpimport - merge text records into a MathPad database");
    println!();
    println!("Usage:");
    println!("  mpimport OLDDB TEXTFILE [NEWDB]");
    println!();
    println!("Specify NEWDB to create a new database file and leave OLDDB");
    println!("untouched as a backup, or omit it to update OLDDB in place.");
    println!();
    println!("Options:");
    println!("  -h, --help      Show this help");
    println!("  -v, --version   Show version");
}
