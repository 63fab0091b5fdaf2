use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use color_eyre::eyre::{Result, WrapErr, eyre};
use log::*;
use tokio::{task::JoinHandle, time::Instant};

use crate::{
    metrics::Sampler,
    proc::{InspectError, Inspector, UNKNOWN_PROCESS},
    ui::{Renderer, dashboard::DashboardView, theme::Theme},
};

/// Nominal time between samples. Sleep time is not reduced by the time spent
/// sampling and drawing.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Interrupted by the user.
    UserStop,
    /// The monitored process exited or became unreadable.
    ProcessEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopping(StopReason),
}

/// Cross-task "please stop" flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Set the flag on the first Ctrl+C.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let signal = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(target: "App", "Interrupt received");
                    signal.request();
                }
                Err(err) => error!(target: "App", "Cannot listen for Ctrl+C: {}", err),
            }
        })
    }
}

pub struct App {
    pub pid: u32,
    pub name: String,
    pub state: RunState,
    inspector: Box<dyn Inspector>,
    sampler: Sampler,
    ticks: u64,
    started: Instant,
    theme: Theme,
}

impl App {
    /// Resolve everything the loop needs before it starts.
    ///
    /// Fails if the system information cannot be read or the process cannot
    /// be found.
    pub fn new(pid: u32, mut inspector: Box<dyn Inspector>) -> Result<Self> {
        let system = inspector
            .system_context()
            .wrap_err("Cannot read system information")?;
        info!(target: "App", "{} cores, {:.0} MB RAM", system.cores, system.total_ram_mb);

        let first_read = inspector
            .refresh(pid)
            .and_then(|_| inspector.cpu_time_seconds(pid));
        match first_read {
            Err(InspectError::AccessDenied(_)) => {
                return Err(eyre!("Access to process with PID {} denied. Try again with more privileges.", pid));
            }
            Err(err) if err.is_terminal() => {
                return Err(eyre!("Process with PID {} not found. It may have terminated. ({})", pid, err));
            }
            Err(err) => warn!(target: "App", "Initial read of {} failed: {}", pid, err),
            Ok(_) => {}
        }

        let name = match inspector.process_name(pid) {
            Ok(name) if !name.trim().is_empty() => name,
            Ok(_) => UNKNOWN_PROCESS.to_string(),
            Err(err) => {
                debug!(target: "App", "No name for {}: {}", pid, err);
                UNKNOWN_PROCESS.to_string()
            }
        };
        info!(target: "App", "Monitoring process: {} (PID: {})", name, pid);

        let now = Instant::now();
        let mut sampler = Sampler::new(pid, system, now);
        if let Err(err @ InspectError::Unsupported(_)) = inspector.thread_count(pid) {
            sampler.disable_threads(&err);
        }
        Ok(Self {
            pid,
            name,
            state: RunState::Running,
            inspector,
            sampler,
            ticks: 0,
            started: now,
            theme: Theme::dark(),
        })
    }

    /// Run the sampling loop until stopped.
    ///
    /// The stop flag is checked once per iteration, so shutdown happens
    /// within one tick and never in the middle of a frame. The cursor is
    /// hidden while running and shown again on the way out.
    pub async fn run<R: Renderer>(&mut self, renderer: &mut R, stop: &StopSignal) -> StopReason {
        renderer.clear_screen();
        renderer.set_cursor_visible(false);
        let reason = loop {
            if stop.is_requested() {
                self.state = RunState::Stopping(StopReason::UserStop);
            }
            if let RunState::Stopping(reason) = self.state {
                break reason;
            }
            self.tick(renderer);
            if self.state == RunState::Running {
                tokio::time::sleep(TICK_PERIOD).await;
            }
        };
        info!(target: "App", "Stopping after {} ticks: {:?}", self.ticks, reason);
        renderer.set_cursor_visible(true);
        reason
    }

    /// Sample once and draw the result.
    fn tick<R: Renderer>(&mut self, renderer: &mut R) {
        let now = Instant::now();
        match self.sampler.sample(self.inspector.as_mut(), now) {
            Ok(_) => {
                self.ticks += 1;
                self.render(renderer, now);
            }
            Err(err) => {
                info!(target: "App", "{}", err);
                self.state = RunState::Stopping(StopReason::ProcessEnded);
            }
        }
    }

    fn render<R: Renderer>(&self, renderer: &mut R, now: Instant) {
        let view = DashboardView {
            name: &self.name,
            pid: self.pid,
            ticks: self.ticks,
            elapsed: now.duration_since(self.started),
            sampler: &self.sampler,
            theme: &self.theme,
        };
        renderer.clear_screen();
        for line in view.lines() {
            renderer.write_line(line);
        }
        renderer.present();
    }

    /// Final status line printed after the terminal is restored.
    pub fn farewell(&self, reason: StopReason) -> String {
        match reason {
            StopReason::UserStop => "Monitoring stopped by user.".to_string(),
            StopReason::ProcessEnded => format!(
                "Process {} (PID: {}) ended; monitoring stopped.",
                self.name, self.pid
            ),
        }
    }
}
