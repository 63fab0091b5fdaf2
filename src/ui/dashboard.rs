use std::time::Duration;

use ratatui::{prelude::*, style::Stylize};

use crate::{
    metrics::Sampler,
    scale::{MEMORY_MB_CEILING, PERCENT_MAX, THREADS_CEILING},
    ui::{metric::MetricPanel, theme::Theme},
};

const RULE_WIDTH: usize = 50;
const NAME_WIDTH: usize = 48;

const THROBBER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Everything needed to draw one frame of the dashboard.
pub struct DashboardView<'a> {
    pub name: &'a str,
    pub pid: u32,
    pub ticks: u64,
    pub elapsed: Duration,
    pub sampler: &'a Sampler,
    pub theme: &'a Theme,
}

impl DashboardView<'_> {
    pub fn panels(&self) -> [MetricPanel; 4] {
        let sampler = self.sampler;
        let threads: Vec<f64> = sampler.threads.iter().map(|t| f64::from(*t)).collect();
        [
            MetricPanel {
                title: "CPU Usage",
                unit: "%",
                values: sampler.cpu_percent.to_vec(),
                max: PERCENT_MAX,
                precision: 2,
                color: self.theme.cpu,
                available: true,
            },
            MetricPanel {
                title: "Memory Usage",
                unit: "%",
                values: sampler.memory_percent.to_vec(),
                max: PERCENT_MAX,
                precision: 2,
                color: self.theme.memory_percent,
                available: true,
            },
            MetricPanel {
                title: "Memory Usage",
                unit: "MB",
                values: sampler.memory_mb.to_vec(),
                max: MEMORY_MB_CEILING.reference_max(sampler.memory_mb.max()),
                precision: 2,
                color: self.theme.memory_mb,
                available: true,
            },
            MetricPanel {
                title: "Thread Count",
                unit: "",
                values: threads,
                max: THREADS_CEILING.reference_max(f64::from(sampler.threads.max())),
                precision: 0,
                color: self.theme.threads,
                available: sampler.threads_available(),
            },
        ]
    }

    /// The whole frame, top to bottom.
    ///
    /// ```"not rust"
    /// ==================================================
    ///  Process Resource Monitor: nginx (PID: 812)  ◐ 00:02:41
    /// ==================================================
    ///
    /// CPU Usage: ...
    /// ```
    pub fn lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let rule = Line::from("=".repeat(RULE_WIDTH)).fg(theme.primary);
        let throbber = THROBBER[(self.ticks % THROBBER.len() as u64) as usize];
        let mut lines = vec![
            rule.clone(),
            Line::from(vec![
                Span::from(" Process Resource Monitor: "),
                Span::from(truncate(self.name, NAME_WIDTH))
                    .fg(Theme::lighten(theme.primary, 0.5))
                    .bold(),
                Span::from(format!(" (PID: {})  ", self.pid)),
                Span::from(throbber).fg(theme.success),
                Span::from(format!(" {}", format_elapsed(self.elapsed))).fg(theme.accent),
            ]),
            rule,
            Line::default(),
        ];
        for panel in self.panels() {
            lines.extend(panel.lines(theme));
            lines.push(Line::default());
        }
        lines.push(Line::from("Press Ctrl+C to stop monitoring").fg(Theme::darken(theme.foreground, 0.3)));
        lines
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('…');
        short
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
