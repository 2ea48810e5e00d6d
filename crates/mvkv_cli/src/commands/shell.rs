//! Shell command implementation.

use crate::commands::inspect;
use crate::error::CliError;
use mvkv_core::{visibility, Connection, Database};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::Path;
use tracing::{debug, info, warn};

const HELP: &str = "\
<connection> <command> [args...]   run a command on a named connection
  commands: begin | abort | commit | get <key> | set <key> <value> | delete <key>
.inspect [key] [--json]            show version chains
.stats [--json]                    show database statistics
.help                              show this help
.quit                              leave the shell";

/// How protocol violations are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prompt for input and report violations without stopping.
    Interactive,
    /// Stop at the first violation.
    Script,
}

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the shell on stdin or on a script file.
pub fn run(db: &Database, script: Option<&Path>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match script {
        Some(path) => {
            info!(path = %path.display(), "running script");
            let file = File::open(path)?;
            execute(db, BufReader::new(file), &mut out, Mode::Script)
        }
        None => {
            let stdin = io::stdin();
            let mode = if stdin.is_terminal() {
                Mode::Interactive
            } else {
                Mode::Script
            };
            execute(db, stdin.lock(), &mut out, mode)
        }
    }
}

/// Reads lines from `input` until end of input or `.quit`.
pub fn execute<R: BufRead, W: Write>(
    db: &Database,
    input: R,
    out: &mut W,
    mode: Mode,
) -> Result<(), CliError> {
    let isolation = db.config().default_isolation;
    if !visibility::is_supported(isolation) {
        warn!(%isolation, "isolation level has no visibility rule");
        if mode == Mode::Interactive {
            writeln!(out, "note: {isolation} has no visibility rule, get/set/delete will fail")?;
        }
    }

    let mut session = Session::new(db, mode);
    let mut lines = input.lines();
    let mut line_no = 0;

    loop {
        if mode == Mode::Interactive {
            write!(out, "mvkv> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        line_no += 1;

        if session.handle_line(line_no, &line?, out)? == Flow::Quit {
            break;
        }
    }

    out.flush()?;
    Ok(())
}

/// Named connections on one database.
struct Session<'db> {
    db: &'db Database,
    mode: Mode,
    connections: BTreeMap<String, Connection<'db>>,
}

impl<'db> Session<'db> {
    fn new(db: &'db Database, mode: Mode) -> Self {
        Self {
            db,
            mode,
            connections: BTreeMap::new(),
        }
    }

    fn handle_line<W: Write>(
        &mut self,
        line_no: usize,
        line: &str,
        out: &mut W,
    ) -> Result<Flow, CliError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            return Ok(Flow::Continue);
        };
        let rest: Vec<&str> = tokens.collect();

        if let Some(meta) = first.strip_prefix('.') {
            return self.handle_meta(meta, &rest, out);
        }

        let Some((&command, args)) = rest.split_first() else {
            writeln!(out, "error: expected <connection> <command> [args...]")?;
            return Ok(Flow::Continue);
        };

        let db = self.db;
        let conn = self
            .connections
            .entry(first.to_string())
            .or_insert_with(|| {
                debug!(connection = first, "opening connection");
                db.new_connection()
            });

        match conn.execute(command, args) {
            Ok(result) => writeln!(out, "{first}: {result}")?,
            Err(e) if e.is_fatal() => match self.mode {
                Mode::Script => {
                    return Err(CliError::Fatal {
                        line: line_no,
                        connection: first.to_string(),
                        source: e,
                    })
                }
                Mode::Interactive => writeln!(out, "{first}: fatal: {e}")?,
            },
            Err(e) => writeln!(out, "{first}: error: {e}")?,
        }
        Ok(Flow::Continue)
    }

    fn handle_meta<W: Write>(
        &self,
        meta: &str,
        args: &[&str],
        out: &mut W,
    ) -> Result<Flow, CliError> {
        let json = args.contains(&"--json");
        let positional: Vec<&str> = args
            .iter()
            .copied()
            .filter(|a| !a.starts_with("--"))
            .collect();

        match meta {
            "inspect" => inspect::write_chains(self.db, positional.first().copied(), json, out)?,
            "stats" => inspect::write_stats(self.db, json, out)?,
            "help" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => writeln!(out, "error: unknown meta command .{other}")?,
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvkv_core::{Config, CoreError, IsolationLevel};

    fn run_script(db: &Database, script: &str, mode: Mode) -> (Result<(), CliError>, String) {
        let mut out = Vec::new();
        let result = execute(db, script.as_bytes(), &mut out, mode);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn read_uncommitted_session() {
        let db = Database::default();
        let script = "\
# two connections see each other's dirty writes
c1 begin
c2 begin
c1 set x hey
c1 get x
c2 get x
c1 delete x
c1 get x
c2 get x
";
        let (result, output) = run_script(&db, script, Mode::Script);
        result.unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "c1: 1",
                "c2: 2",
                "c1: hey",
                "c1: hey",
                "c2: hey",
                "c1: ",
                "c1: error: cannot get key that does not exist",
                "c2: error: cannot get key that does not exist",
            ]
        );
    }

    #[test]
    fn script_mode_stops_on_protocol_violation() {
        let db = Database::default();
        let (result, output) = run_script(&db, "c1 begin\nc1 begin\nc1 set x 1\n", Mode::Script);

        match result {
            Err(CliError::Fatal {
                line, connection, ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(connection, "c1");
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
        assert_eq!(output.lines().count(), 1);
        assert!(db.keys().is_empty());
    }

    #[test]
    fn interactive_mode_reports_and_continues() {
        let db = Database::default();
        let (result, output) = run_script(&db, "c1 commit\nc1 begin\n", Mode::Interactive);
        result.unwrap();

        assert!(output.contains("c1: fatal: protocol violation: no running transaction"));
        assert!(output.contains("c1: 1"));
        assert!(output.starts_with("mvkv> "));
    }

    #[test]
    fn recoverable_errors_do_not_stop_scripts() {
        let db = Database::default();
        let (result, output) = run_script(&db, "c1 begin\nc1 frob\nc1 set x\nc1 set x 1\n", Mode::Script);
        result.unwrap();

        assert!(output.contains("c1: error: unimplemented"));
        assert!(output.contains("c1: error: set expects 2 argument(s), got 1"));
        assert!(output.contains("c1: 1"));
    }

    #[test]
    fn unsupported_isolation_is_fatal_in_scripts() {
        let db = Database::new(Config::new().default_isolation(IsolationLevel::Snapshot));
        let (result, _) = run_script(&db, "c1 begin\nc1 get x\n", Mode::Script);

        assert!(matches!(
            result,
            Err(CliError::Fatal {
                source: CoreError::UnsupportedIsolation { .. },
                ..
            })
        ));
    }

    #[test]
    fn interactive_mode_notes_unsupported_isolation() {
        let db = Database::new(Config::new().default_isolation(IsolationLevel::Serializable));
        let (result, output) = run_script(&db, "c1 begin\n", Mode::Interactive);
        result.unwrap();

        assert!(output.starts_with("note: serializable has no visibility rule"));
        assert!(output.contains("c1: 1"));

        let db = Database::default();
        let (_, output) = run_script(&db, "", Mode::Interactive);
        assert!(!output.contains("note:"));
    }

    #[test]
    fn meta_commands() {
        let db = Database::default();
        let script = "c1 begin\nc1 set a 1\n.inspect a\n.stats --json\n.quit\nc1 set a 2\n";
        let (result, output) = run_script(&db, script, Mode::Script);
        result.unwrap();

        assert!(output.contains("a (1 versions)"));
        assert!(output.contains("\"live_versions\": 1"));
        // Nothing after .quit runs.
        assert_eq!(db.version_chain("a").len(), 1);
    }

    #[test]
    fn malformed_lines_are_reported() {
        let db = Database::default();
        let (result, output) = run_script(&db, "c1\n.bogus\n\n", Mode::Script);
        result.unwrap();

        assert!(output.contains("error: expected <connection> <command> [args...]"));
        assert!(output.contains("error: unknown meta command .bogus"));
    }
}
