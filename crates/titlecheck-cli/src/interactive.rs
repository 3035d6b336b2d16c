//! Line-oriented interactive session driving the orchestration core:
//! queries and page flips go through the debounced scheduler, uploads and
//! exports run in the background and can be cancelled mid-flight.

use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use titlecheck_core::{Session, SessionEvent};

use crate::config_file;
use crate::output::{self, ColorMode, EventPrinter};

const HELP: &str = "\
Commands:
  q <text>        set the search query (just `q` clears it)
  p <n>           go to page n
  next / prev     flip pages
  show            print the current table
  upload <path>   upload a spreadsheet
  cancel-upload   cancel the in-flight upload
  export [dir]    export the active source (default: current directory)
  cancel-export   cancel the in-flight export
  refresh         re-fetch the current view
  reset           clear the upload and return to browsing
  help            show this help
  quit            exit";

pub async fn run(
    session: Arc<Session>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    color: ColorMode,
) -> anyhow::Result<()> {
    println!("{HELP}");
    let mut printer = EventPrinter::new(color);

    // Initial load.
    session.refresh().await;

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    printer.handle(&event);
                    if printer.session_expired() {
                        config_file::delete_token();
                        println!("Session expired; signed out.");
                        break;
                    }
                    if matches!(event, SessionEvent::TableReplaced { .. }) {
                        output::print_table(&session.visible_table(), &session.view(), color);
                    }
                }
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !dispatch(&session, line.trim(), color) {
                        break;
                    }
                }
                None => break, // EOF
            },
        }
    }
    Ok(())
}

/// Handle one input line. Returns false to exit the loop.
fn dispatch(session: &Arc<Session>, line: &str, color: ColorMode) -> bool {
    let (command, rest) = line
        .split_once(' ')
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match command {
        "" => {}
        "q" => session.set_query(rest),
        "p" => match rest.parse::<u32>() {
            Ok(page) => session.set_page(page),
            Err(_) => println!("usage: p <page>"),
        },
        "next" => {
            let view = session.view();
            session.set_page(view.page().saturating_add(1));
        }
        "prev" => {
            let view = session.view();
            session.set_page(view.page().saturating_sub(1).max(1));
        }
        "show" => output::print_table(&session.visible_table(), &session.view(), color),
        "upload" => match crate::read_spreadsheet(Path::new(rest)) {
            Ok(file) => {
                let session = session.clone();
                tokio::spawn(async move {
                    // Failures surface through the event channel.
                    let _ = session.upload(file).await;
                });
            }
            Err(err) => println!("cannot read {}: {}", rest, err),
        },
        "cancel-upload" => session.cancel_upload(),
        "export" => {
            let out_dir = if rest.is_empty() {
                Path::new(".").to_path_buf()
            } else {
                Path::new(rest).to_path_buf()
            };
            let session = session.clone();
            tokio::spawn(async move {
                let _ = session.export(&out_dir).await;
            });
        }
        "cancel-export" => session.cancel_export(),
        "refresh" => {
            let session = session.clone();
            tokio::spawn(async move {
                session.refresh().await;
            });
        }
        "reset" => session.reset(),
        "help" => println!("{HELP}"),
        "quit" | "exit" => return false,
        other => println!("unknown command: {} (try `help`)", other),
    }
    true
}
