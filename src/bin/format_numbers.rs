//! Normalize a numbers file and print the result to stdout

use std::path::PathBuf;

use clap::Parser;

use whatsapp_mailer::contacts;
use whatsapp_mailer::Config;

#[derive(Parser)]
#[command(name = "format_numbers")]
#[command(about = "Print normalized phone numbers from a file")]
struct Args {
    /// Path to the numbers file (.txt)
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::new();

    let numbers = contacts::load_numbers(&args.file, &config)?;
    for number in &numbers {
        println!("{}", number);
    }

    eprintln!("{}", contacts::count_numbers_str(numbers.len()));
    eprintln!("{}", contacts::sending_time_str(numbers.len()));
    Ok(())
}
