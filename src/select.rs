//! Interactive pid selection when none is given on the command line.

use std::io::{BufRead, Write};

use color_eyre::eyre::{Result, WrapErr, bail};
use log::*;

use crate::proc::Inspector;

/// Number of processes listed before the prompt.
pub const LIST_LIMIT: usize = 20;

const PROMPT: &str = "Enter PID to monitor (or 'q' to quit): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Pid(u32),
    Quit,
    Invalid,
}

fn parse_answer(input: &str) -> Answer {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Answer::Quit;
    }
    match input.parse::<u32>() {
        Ok(pid) if pid > 0 => Answer::Pid(pid),
        _ => Answer::Invalid,
    }
}

/// List running processes on `output` and ask for a pid on `input`.
///
/// Returns `Ok(None)` when the user quits. Invalid answers re-prompt; end of
/// input is an error.
pub fn choose_process<R: BufRead, W: Write>(
    inspector: &mut dyn Inspector,
    mut input: R,
    mut output: W,
) -> Result<Option<u32>> {
    let mut entries = inspector
        .list_processes(LIST_LIMIT + 1)
        .wrap_err("Cannot list running processes")?;
    let more = entries.len() > LIST_LIMIT;
    entries.truncate(LIST_LIMIT);
    debug!(target: "Select", "Listing {} processes", entries.len());

    writeln!(output, "Running processes:")?;
    writeln!(output, "{:>8}  COMMAND", "PID")?;
    for entry in &entries {
        writeln!(output, "{:>8}  {}", entry.pid, entry.command)?;
    }
    if more {
        writeln!(output, "... (more processes not shown)")?;
    }
    writeln!(output)?;

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("No PID entered");
        }
        match parse_answer(&line) {
            Answer::Pid(pid) => return Ok(Some(pid)),
            Answer::Quit => return Ok(None),
            Answer::Invalid => {
                writeln!(output, "Invalid input. Please enter a numeric PID or 'q'.")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::proc::{InspectError, ProcessEntry, SystemContext};

    struct Listing(Result<Vec<ProcessEntry>, InspectError>);

    impl Listing {
        fn of(count: u32) -> Self {
            Self(Ok((1..=count)
                .map(|pid| ProcessEntry {
                    pid,
                    command: format!("cmd{pid}"),
                })
                .collect()))
        }
    }

    impl Inspector for Listing {
        fn cpu_time_seconds(&mut self, pid: u32) -> Result<f64, InspectError> {
            Err(InspectError::Vanished(pid))
        }
        fn memory_mb(&mut self, pid: u32) -> Result<f64, InspectError> {
            Err(InspectError::Vanished(pid))
        }
        fn thread_count(&mut self, pid: u32) -> Result<u32, InspectError> {
            Err(InspectError::Vanished(pid))
        }
        fn process_name(&mut self, pid: u32) -> Result<String, InspectError> {
            Err(InspectError::Vanished(pid))
        }
        fn system_context(&mut self) -> Result<SystemContext, InspectError> {
            SystemContext::new(1, 1.0)
        }
        fn list_processes(&mut self, limit: usize) -> Result<Vec<ProcessEntry>, InspectError> {
            match &self.0 {
                Ok(entries) => Ok(entries.iter().take(limit).cloned().collect()),
                Err(_) => Err(InspectError::unavailable("process list", "denied")),
            }
        }
    }

    fn run(listing: &mut Listing, input: &str) -> (Result<Option<u32>>, String) {
        let mut output = Vec::new();
        let result = choose_process(listing, Cursor::new(input.as_bytes()), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    macro_rules! answer_tests {
        ($($name:ident: $input:expr => $expected:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(parse_answer($input), $expected);
                }
            )*
        }
    }

    answer_tests! {
        answer_pid: "1234\n" => Answer::Pid(1234),
        answer_pid_with_spaces: "  77  \n" => Answer::Pid(77),
        answer_quit: "q\n" => Answer::Quit,
        answer_quit_upper: "Q" => Answer::Quit,
        answer_zero: "0\n" => Answer::Invalid,
        answer_negative: "-5\n" => Answer::Invalid,
        answer_word: "nginx\n" => Answer::Invalid,
        answer_empty: "\n" => Answer::Invalid,
    }

    #[test]
    fn lists_then_returns_pid() {
        let (result, output) = run(&mut Listing::of(3), "2\n");
        assert_eq!(result.unwrap(), Some(2));
        assert!(output.contains("       1  cmd1"), "{output}");
        assert!(output.contains("       3  cmd3"));
        assert!(!output.contains("more processes"));
        assert!(output.ends_with(PROMPT));
    }

    #[test]
    fn long_listing_is_capped() {
        let (result, output) = run(&mut Listing::of(50), "q\n");
        assert_eq!(result.unwrap(), None);
        assert!(output.contains("cmd20\n"));
        assert!(!output.contains("cmd21"));
        assert!(output.contains("... (more processes not shown)"));
    }

    #[test]
    fn invalid_input_prompts_again() {
        let (result, output) = run(&mut Listing::of(1), "abc\n\n99\n");
        assert_eq!(result.unwrap(), Some(99));
        assert_eq!(output.matches(PROMPT).count(), 3);
        assert_eq!(output.matches("Invalid input").count(), 2);
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (result, _) = run(&mut Listing::of(1), "abc\n");
        assert!(result.unwrap_err().to_string().contains("No PID"));
    }

    #[test]
    fn listing_failure_is_an_error() {
        let mut listing = Listing(Err(InspectError::unavailable("process list", "denied")));
        let (result, output) = run(&mut listing, "1\n");
        assert!(result.unwrap_err().to_string().contains("Cannot list"));
        assert!(output.is_empty());
    }
}
