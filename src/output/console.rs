//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     cool-routes                                       ║
║     Earth Engine exports and Drive sync               ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print a summary of what an export run is about to do.
pub fn print_config_summary(entries: &[(&str, String)]) {
    let width = entries.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    println!();
    println!("{}", style("Configuration:").bold());
    for (label, value) in entries {
        println!("  {:<width$}  {}", format!("{}:", label), value, width = width + 1);
    }
    println!();
}
