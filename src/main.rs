use colored::Colorize;
use std::process;

fn main() {
    if let Err(e) = mkrun::cli::run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(e.exit_code());
    }
}
