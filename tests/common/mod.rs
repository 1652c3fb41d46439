#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use reorg_move::{IssueNotifier, TrackerError};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

/// Appends written bytes into a shared in-memory buffer.
#[derive(Clone)]
pub struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a scoped subscriber at `level` and return its result plus the captured output.
pub fn capture_logs<T>(level: &str, f: impl FnOnce() -> T) -> (T, String) {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_target(false)
        .with_ansi(false)
        .compact();
    let dispatch = tracing::Dispatch::new(registry().with(EnvFilter::new(level)).with(layer));
    let out = tracing::dispatcher::with_default(&dispatch, f);
    let contents = String::from_utf8_lossy(&buf.lock().unwrap()).to_string();
    (out, contents)
}

/// Create a file (and parents) with the given content.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    let mut f = fs::File::create(path).expect("create file");
    write!(f, "{contents}").expect("write content");
    f.sync_all().expect("sync file");
}

/// Number of lines in `path`, 0 if it does not exist.
pub fn line_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCall {
    pub list_id: String,
    pub title: String,
    pub description: String,
    pub member_ids: Vec<String>,
}

/// In-memory tracker that records every call.
#[derive(Default)]
pub struct RecordingNotifier {
    pub boards: Vec<(String, String)>,
    pub lists: Vec<(String, String)>,
    pub members: Vec<(String, String)>,
    pub fail_tickets: bool,
    pub tickets: RefCell<Vec<TicketCall>>,
    pub lookups: RefCell<usize>,
}

impl RecordingNotifier {
    pub fn with_ids() -> Self {
        Self {
            boards: vec![("Reorg".into(), "B1".into())],
            lists: vec![("Issues".into(), "L1".into())],
            members: vec![("alice".into(), "M-alice".into()), ("bob".into(), "M-bob".into())],
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_tickets: true,
            ..Default::default()
        }
    }

    pub fn ticket_calls(&self) -> Vec<TicketCall> {
        self.tickets.borrow().clone()
    }
}

fn lookup(table: &[(String, String)], kind: &'static str, name: &str) -> Result<String, TrackerError> {
    table
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, id)| id.clone())
        .ok_or_else(|| TrackerError::not_found(kind, name))
}

impl IssueNotifier for RecordingNotifier {
    fn find_board_id(&self, name: &str) -> Result<String, TrackerError> {
        *self.lookups.borrow_mut() += 1;
        lookup(&self.boards, "board", name)
    }

    fn find_list_id(&self, _board_id: &str, name: &str) -> Result<String, TrackerError> {
        *self.lookups.borrow_mut() += 1;
        lookup(&self.lists, "list", name)
    }

    fn find_member_ids(&self, names: &[String]) -> Result<Vec<String>, TrackerError> {
        *self.lookups.borrow_mut() += 1;
        names.iter().map(|n| lookup(&self.members, "member", n)).collect()
    }

    fn create_ticket(
        &self,
        list_id: &str,
        title: &str,
        description: &str,
        member_ids: &[String],
    ) -> Result<String, TrackerError> {
        self.tickets.borrow_mut().push(TicketCall {
            list_id: list_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            member_ids: member_ids.to_vec(),
        });
        if self.fail_tickets {
            return Err(TrackerError::Api {
                status: 400,
                endpoint: "/cards".into(),
                message: "invalid value for idList".into(),
            });
        }
        Ok(format!("card-{}", self.tickets.borrow().len()))
    }
}
