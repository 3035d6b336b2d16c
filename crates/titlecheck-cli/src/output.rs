use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use titlecheck_core::{FileRecord, NoticeLevel, RowViolation, SessionEvent, ViewState};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Renders session events as they arrive: notices, the validation detail
/// list, upload lifecycle lines and the export progress bar.
pub struct EventPrinter {
    color: ColorMode,
    bar: Option<ProgressBar>,
    session_expired: bool,
}

impl EventPrinter {
    pub fn new(color: ColorMode) -> Self {
        Self {
            color,
            bar: None,
            session_expired: false,
        }
    }

    /// Whether a forced logout was seen; the caller must discard the
    /// stored token.
    pub fn session_expired(&self) -> bool {
        self.session_expired
    }

    pub fn handle(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Notice { level, message } => self.print_notice(*level, message),
            SessionEvent::ValidationFailed { violations } => self.print_violations(violations),
            SessionEvent::UploadStarted { file_name } => {
                eprintln!("Uploading {}...", file_name);
            }
            SessionEvent::UploadFinished {
                file_name,
                total_pages,
            } => {
                eprintln!("Uploaded {} ({} page(s) of response data)", file_name, total_pages);
            }
            SessionEvent::ExportProgress(progress) => {
                if progress.total == 0 {
                    if let Some(bar) = self.bar.take() {
                        bar.finish_and_clear();
                    }
                } else {
                    let bar = self.bar.get_or_insert_with(|| {
                        let bar = ProgressBar::new(progress.total as u64);
                        bar.set_style(
                            ProgressStyle::with_template(
                                "{msg} [{bar:30}] {pos}/{len} pages",
                            )
                            .unwrap_or_else(|_| ProgressStyle::default_bar()),
                        );
                        bar.set_message("Fetching data");
                        bar
                    });
                    bar.set_length(progress.total as u64);
                    bar.set_position(progress.current as u64);
                }
            }
            SessionEvent::ExportFinished { path, rows } => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
                eprintln!("Wrote {} row(s) to {}", rows, path.display());
            }
            SessionEvent::ExportCancelled | SessionEvent::UploadCancelled => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
            SessionEvent::SessionExpired => {
                self.session_expired = true;
            }
            SessionEvent::TableReplaced { .. } => {}
        }
    }

    fn print_notice(&self, level: NoticeLevel, message: &str) {
        if self.color.enabled() {
            match level {
                NoticeLevel::Info => eprintln!("{}", message.dimmed()),
                NoticeLevel::Success => eprintln!("{}", message.green()),
                NoticeLevel::Warning => eprintln!("{}", message.yellow()),
                NoticeLevel::Error => eprintln!("{}", message.red()),
            }
        } else {
            eprintln!("{}", message);
        }
    }

    /// The persistent detail list for a rejected sheet: every offending
    /// row, not just the first.
    fn print_violations(&self, violations: &[RowViolation]) {
        eprintln!("The sheet has missing required fields:");
        for violation in violations {
            let line = format!(
                "  row {}: missing {}",
                violation.row_number,
                violation.missing_fields.join(", ")
            );
            if self.color.enabled() {
                eprintln!("{}", line.red());
            } else {
                eprintln!("{}", line);
            }
        }
    }
}

/// Print the visible table for the current page.
pub fn print_table(records: &[FileRecord], view: &ViewState, color: ColorMode) {
    if records.is_empty() {
        println!("(no records)");
    }
    for record in records {
        if color.enabled() {
            println!("{}", record.title.bold());
        } else {
            println!("{}", record.title);
        }
        for entry in &record.conferences {
            let decision = if entry.decision_with_comments.is_empty() {
                "-"
            } else {
                entry.decision_with_comments.as_str()
            };
            println!("    {:<12} {}", entry.conference_name, decision);
            if !entry.precheck_comments.is_empty() {
                println!("        precheck: {}", entry.precheck_comments);
            }
            if !entry.firstset_comments.is_empty() {
                println!("        firstset: {}", entry.firstset_comments);
            }
        }
    }
    println!("Page {} of {}", view.page(), view.total_pages());
}
