use owo_colors::OwoColorize;

use crate::batch::BatchReport;

/// Consistent, colored user-facing lines. Colors are enabled only when the
/// stream is a TTY.
fn is_tty(stream: atty::Stream) -> bool {
    atty::is(stream)
}

pub fn print_info(msg: &str) {
    if is_tty(atty::Stream::Stdout) {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {msg}");
    }
}

pub fn print_warn(msg: &str) {
    if is_tty(atty::Stream::Stderr) {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {msg}");
    }
}

pub fn print_error(msg: &str) {
    if is_tty(atty::Stream::Stderr) {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {msg}");
    }
}

pub fn print_success(msg: &str) {
    if is_tty(atty::Stream::Stdout) {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {msg}");
    }
}

/// One-line summary of a batch, followed by the entries left in the table.
pub fn print_report(report: &BatchReport) {
    print_info(&format!(
        "{} moved, {} issue(s) logged, {} ticket(s) created, {} left in the table",
        report.moved.len(),
        report.issues.len(),
        report.tickets_created,
        report.retained.len()
    ));
    for failure in &report.ticket_failures {
        print_warn(&failure.to_string());
    }
    if report.interrupted {
        print_warn("Interrupted; the remaining entries will be picked up next run.");
    }
    if report.is_cleared() {
        print_success("All entries have been processed");
    }
}
