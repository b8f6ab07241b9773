//! csv2pdf: print semicolon-separated CSV as PDF tables
//!
//! Usage:
//!   csv2pdf [--charset NAME] [--fontdir DIR] [--output FILE] [INPUT] > out.pdf
//!
//! INPUT absent or `-` reads standard input.

use clap::Parser;
use csv2pdf::charset::{default_charset, CharsetMap, CharsetSelection};
use csv2pdf::config::{StageConfig, DEFAULT_PDF_CHARSET};
use csv2pdf::convert::{convert, ConvertOptions};
use csv2pdf::error::IoContext;
use csv2pdf::{stage_font_dir, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "csv2pdf", version, about = "Print semicolon-separated CSV as PDF tables", long_about = None)]
struct Args {
    /// Input charset (default: from LC_ALL, LC_CTYPE or LANG, else utf-8)
    #[arg(long)]
    charset: Option<String>,

    /// Single-byte charset used inside the PDF for UTF-8/UTF-16 input
    #[arg(long, default_value = DEFAULT_PDF_CHARSET)]
    pdf_charset: String,

    /// Directory with <charset>.map files (default: bundled files)
    #[arg(long)]
    fontdir: Option<PathBuf>,

    /// Write the PDF here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not compress page content
    #[arg(long, default_value_t = false)]
    no_compress: bool,

    /// CSV file, `-` or nothing for standard input
    input: Option<PathBuf>,
}

fn read_input(input: Option<&Path>) -> Result<(Vec<u8>, Option<String>)> {
    match input {
        Some(path) if path != Path::new("-") => {
            let data = fs::read(path).context(|| format!("error opening {:?}", path))?;
            let title = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            Ok((data, title))
        },
        _ => {
            let mut data = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .context(|| "error reading standard input")?;
            Ok((data, None))
        },
    }
}

fn write_output(pdf: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, pdf).context(|| format!("error writing {:?}", path)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(pdf)
                .and_then(|_| stdout.flush())
                .context(|| "error writing PDF to standard output")
        },
    }
}

fn run(args: Args) -> Result<()> {
    let charset_name = args.charset.clone().unwrap_or_else(default_charset);
    let charset = CharsetSelection::resolve(&charset_name, &args.pdf_charset)?;

    let font_dir = stage_font_dir(args.fontdir.as_deref(), &StageConfig::default())?;
    let result = convert_with(&args, &charset, font_dir.path());
    let closed = font_dir.close();
    result?;
    closed
}

fn convert_with(args: &Args, charset: &CharsetSelection, font_dir: &Path) -> Result<()> {
    let map = CharsetMap::load(font_dir, &charset.pdf_charset)?;
    let (input, title) = read_input(args.input.as_deref())?;

    let mut options = ConvertOptions::default().with_compress(!args.no_compress);
    if let Some(title) = title {
        options = options.with_title(title);
    }

    let out = convert(&input, charset, &map, &options)?;
    log::info!("{} parts, {} pages", out.part_count, out.page_count);
    write_output(&out.pdf, args.output.as_deref())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("csv2pdf: {}", err);
        std::process::exit(1);
    }
}
