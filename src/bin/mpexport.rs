//! # mpexport
//!
//! Exports the records of a MathPad database backup to a flat text file so
//! they can be edited, printed, or mailed, then merged back with
//! `mpimport`.
//!
//! ## Usage
//!
//! ```bash
//! mpexport MathPadDB.pdb records.txt
//! ```

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use eyre::{bail, Result, WrapErr};
use mpdb::Database;

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
                println!("mpexport {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {}", arg);
            }
            _ => paths.push(arg.as_str()),
        }
    }

    let (db_path, text_path) = match paths.as_slice() {
        [db, text] => (*db, *text),
        _ => {
            print_usage();
            bail!("expected a database file and a text file");
        }
    };

    let file = File::open(db_path).wrap_err_with(|| format!("can't open \"{}\"", db_path))?;
    let mut reader = BufReader::new(file);
    let db = Database::load(&mut reader)
        .wrap_err_with(|| format!("loading database \"{}\"", db_path))?;

    let out = File::create(text_path).wrap_err_with(|| format!("can't open \"{}\"", text_path))?;
    let mut out = BufWriter::new(out);
    db.export_text(&mut out)
        .wrap_err_with(|| format!("writing \"{}\"", text_path))?;
    out.flush().wrap_err_with(|| format!("writing \"{}\"", text_path))?;

    println!("Exported {} record(s) to {}", db.store.len(), text_path);
    Ok(())
}

fn print_usage() {
    println!("mpexport - export MathPad database records to text");
    println!();
    println!("Usage:");
    println!("  mpexport DBFILE TEXTFILE   Export DBFILE's records to TEXTFILE");
    println!();
    println!("Options:");
    println!("  -h, --help      Show this help");
    println!("  -v, --version   Show version");
}
