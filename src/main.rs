//! docpress – command-line markup → PDF converter.
//!
//! Usage:
//!   docpress <input.html> [output.pdf] [--title "My Report"] [--site NAME]
//!            [--company NAME] [--config cfg.json] [--layout out.json]
//!            [--invoice] [--landscape]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `report.html` → `report.pdf`).

use std::{env, fs, path::PathBuf, process};

use docpress::invoice::Invoice;
use docpress::pipeline::{generate_invoice_pdf, generate_pdf, PageOrientation, PipelineConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut invoice = false;
    let mut title: Option<String> = None;
    let mut site: Option<String> = None;
    let mut company: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--invoice" | "-i" => invoice = true,
            "--title" | "-t" => title = Some(flag_value(&mut iter, arg, &args[0])),
            "--site" | "-s" => site = Some(flag_value(&mut iter, arg, &args[0])),
            "--company" | "-c" => company = Some(flag_value(&mut iter, arg, &args[0])),
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--layout" => layout_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0]))),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Default output: same directory + same stem as input, but with .pdf
    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    let mut config = match &config_path {
        Some(path) => match PipelineConfig::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };
    if landscape {
        config.orientation = PageOrientation::Landscape;
    }
    if let Some(s) = site {
        config.site_name = s;
    }
    if let Some(c) = company {
        config.company_name = c;
    }

    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let result = if invoice {
        match serde_json::from_str::<Invoice>(&source) {
            Ok(inv) => generate_invoice_pdf(&inv, &config),
            Err(e) => {
                eprintln!("Error parsing invoice '{}': {e}", input.display());
                process::exit(1);
            }
        }
    } else {
        // Default title: stem of the input filename.
        let title = title.unwrap_or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        });
        generate_pdf(&title, &source, &config)
    };

    match result {
        Ok((bytes, layout)) => {
            write_or_exit(&output, &bytes);
            if let Some(path) = &layout_path {
                write_or_exit(path, layout.to_json().as_bytes());
            }
            let pages = layout.pages.len();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn write_or_exit(path: &PathBuf, bytes: &[u8]) {
    // Create output directory if necessary.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Error writing '{}': {e}", path.display());
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("docpress – markup document to PDF converter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input>        Markup body (h1-h6, p, li, strong), or invoice JSON with --invoice");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t    Document title (default: input filename stem)");
    eprintln!("  --site, -s     Site name for the header banner and copyright line");
    eprintln!("  --company, -c  Company name for the \"Generated by\" line");
    eprintln!("  --config       JSON pipeline config (page size, margin, names, year, banner_color)");
    eprintln!("  --layout       Also write the computed page layout as JSON to this path");
    eprintln!("  --invoice, -i  Treat the input as an invoice JSON file");
    eprintln!("  --landscape    Use landscape page orientation (A4 841×595 pt)");
    eprintln!("  --help         Print this message");
}
