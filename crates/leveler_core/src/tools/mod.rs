//! External tool invocation with a bounded-time call contract.
//!
//! The pipeline never spawns processes directly; it goes through the
//! [`ToolRunner`] trait so the probe and correction logic can be exercised
//! against a scripted fake in tests. The real implementation,
//! [`SystemRunner`], runs ffmpeg/ffprobe with an enforced timeout and kills
//! a stuck process rather than hanging the pipeline.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from invoking an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be started at all.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran past its deadline and was killed.
    #[error("{tool} timed out after {timeout_secs}s and was killed")]
    TimedOut { tool: String, timeout_secs: u64 },

    /// I/O error while supervising the child process.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// A fully specified tool invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program name (e.g. "ffmpeg", "ffprobe").
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
    /// Hard deadline for the invocation.
    pub timeout: Duration,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Render the command line for log output.
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Captured output of a completed tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code (-1 if the process was terminated by a signal).
    pub exit_code: i32,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability to run an external tool to completion within a deadline.
pub trait ToolRunner {
    /// Run the command, capturing output. Blocks until the process exits
    /// or the timeout expires; a timed-out process is killed.
    fn run(&self, spec: &CommandSpec) -> ToolResult<ToolOutput>;
}

/// [`ToolRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> ToolResult<ToolOutput> {
        tracing::debug!("Running: {}", spec.display());

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::Spawn {
                tool: spec.program.clone(),
                source: e,
            })?;

        // Drain both pipes on background threads so a chatty child never
        // blocks on a full pipe buffer while we poll for completion.
        let stdout_handle = child.stdout.take().map(drain_pipe);
        let stderr_handle = child.stderr.take().map(drain_pipe);

        let deadline = Instant::now() + spec.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        tracing::warn!(
                            "{} exceeded {}s timeout, killing",
                            spec.program,
                            spec.timeout.as_secs()
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ToolError::TimedOut {
                            tool: spec.program.clone(),
                            timeout_secs: spec.timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::Io {
                        tool: spec.program.clone(),
                        source: e,
                    });
                }
            }
        };

        let stdout = join_pipe(stdout_handle);
        let stderr = join_pipe(stderr_handle);

        Ok(ToolOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_pipe(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

/// Scripted [`ToolRunner`] for exercising pipeline logic without ffmpeg.
#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::{CommandSpec, ToolError, ToolOutput, ToolResult, ToolRunner};

    type Effect = Box<dyn Fn(&CommandSpec)>;

    struct Step {
        result: ToolResult<ToolOutput>,
        effect: Option<Effect>,
    }

    /// Returns scripted results in order; once the script is exhausted it
    /// falls back to the default output, if one was set. Records every
    /// invocation for assertions.
    #[derive(Default)]
    pub struct FakeRunner {
        steps: RefCell<VecDeque<Step>>,
        default_output: Option<ToolOutput>,
        calls: RefCell<Vec<CommandSpec>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// A runner that answers every invocation with the same output.
        pub fn ok(output: ToolOutput) -> Self {
            Self {
                default_output: Some(output),
                ..Self::default()
            }
        }

        /// Queue an output for the next invocation.
        pub fn push_output(&self, output: ToolOutput) {
            self.steps.borrow_mut().push_back(Step {
                result: Ok(output),
                effect: None,
            });
        }

        /// Queue a successful invocation with the given stdout/stderr.
        pub fn push_ok(&self, stdout: &str, stderr: &str) {
            self.push_output(ToolOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            });
        }

        /// Queue a tool-level error for the next invocation.
        pub fn push_error(&self, error: ToolError) {
            self.steps.borrow_mut().push_back(Step {
                result: Err(error),
                effect: None,
            });
        }

        /// Queue an output along with a side effect to run at invocation
        /// time (e.g. creating the file a real tool would have written).
        pub fn push_output_with_effect(
            &self,
            output: ToolOutput,
            effect: impl Fn(&CommandSpec) + 'static,
        ) {
            self.steps.borrow_mut().push_back(Step {
                result: Ok(output),
                effect: Some(Box::new(effect)),
            });
        }

        /// All command specs seen so far.
        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.borrow().clone()
        }
    }

    impl ToolRunner for FakeRunner {
        fn run(&self, spec: &CommandSpec) -> ToolResult<ToolOutput> {
            self.calls.borrow_mut().push(spec.clone());

            if let Some(step) = self.steps.borrow_mut().pop_front() {
                if let Some(effect) = &step.effect {
                    effect(spec);
                }
                return step.result;
            }

            match &self.default_output {
                Some(output) => Ok(output.clone()),
                None => panic!("unexpected tool invocation: {}", spec.display()),
            }
        }
    }
}
