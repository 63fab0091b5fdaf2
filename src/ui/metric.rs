use ratatui::{prelude::*, style::Stylize};

use crate::{
    scale::{BAR_WIDTH, Summary, bar_fill, glyph_line},
    ui::theme::Theme,
};

/// One metric's window, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPanel {
    pub title: &'static str,
    pub unit: &'static str,
    /// Oldest first.
    pub values: Vec<f64>,
    /// Reference maximum for both the bar and the glyph row.
    pub max: f64,
    pub precision: usize,
    pub color: Color,
    /// False when the backend cannot read this metric at all.
    pub available: bool,
}

impl MetricPanel {
    pub fn current(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    fn format(&self, value: f64, precision: usize) -> String {
        let number = format!("{value:.precision$}");
        if self.unit.is_empty() {
            number
        } else {
            format!("{number} {}", self.unit)
        }
    }

    /// Render the panel as four lines.
    ///
    /// ```"not rust"
    /// CPU Usage: 12.50 %
    /// [======                                            ]
    /// History: ______________________________..--**##@@
    /// Min: 0.00 %  Avg: 3.10 %  Max: 12.50 %
    /// ```
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        if !self.available {
            return self.unavailable_lines(theme);
        }
        let current = self.current();
        let fill = bar_fill(current, self.max, BAR_WIDTH);
        let summary = Summary::of(&self.values);
        let muted = Theme::darken(theme.foreground, 0.4);
        vec![
            Line::from(vec![
                Span::from(format!("{}: ", self.title)).bold(),
                Span::from(self.format(current, self.precision)).fg(self.color),
            ]),
            Line::from(vec![
                Span::from("["),
                Span::from("=".repeat(fill)).fg(self.color),
                Span::from(" ".repeat(BAR_WIDTH - fill)).bg(Theme::darken(self.color, 0.8)),
                Span::from("]"),
            ]),
            Line::from(vec![
                Span::from("History: "),
                Span::from(glyph_line(&self.values, self.max)).fg(self.color),
            ]),
            Line::from(format!(
                "Min: {}  Avg: {}  Max: {}",
                self.format(summary.min, self.precision),
                self.format(summary.avg, self.precision.max(1)),
                self.format(summary.max, self.precision),
            ))
            .fg(muted),
        ]
    }

    fn unavailable_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let muted = Theme::darken(theme.foreground, 0.4);
        vec![
            Line::from(vec![
                Span::from(format!("{}: ", self.title)).bold(),
                Span::from("unavailable").fg(muted),
            ]),
            Line::from(format!("[{}]", " ".repeat(BAR_WIDTH))).fg(muted),
            Line::from("History: n/a").fg(muted),
            Line::from("Not reported on this platform").fg(muted),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn panel(values: Vec<f64>, max: f64, unit: &'static str, precision: usize) -> MetricPanel {
        MetricPanel {
            title: "CPU Usage",
            unit,
            values,
            max,
            precision,
            color: Theme::dark().cpu,
            available: true,
        }
    }

    #[test]
    fn renders_value_bar_history_and_summary() {
        let lines = panel(vec![0.0, 0.0, 50.0, 100.0], 100.0, "%", 2).lines(&Theme::dark());
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(text[0], "CPU Usage: 100.00 %");
        assert_eq!(text[1], format!("[{}]", "=".repeat(BAR_WIDTH)));
        assert_eq!(text[2], "History: __-@");
        assert_eq!(text[3], "Min: 0.00 %  Avg: 37.50 %  Max: 100.00 %");
    }

    #[test]
    fn negative_reading_draws_empty_bar() {
        let lines = panel(vec![0.0, -0.4], 100.0, "%", 2).lines(&Theme::dark());
        assert_eq!(plain(&lines[1]), format!("[{}]", " ".repeat(BAR_WIDTH)));
        assert_eq!(plain(&lines[0]), "CPU Usage: -0.40 %");
    }

    #[test]
    fn unavailable_metric_keeps_its_height() {
        let mut panel = panel(vec![0.0, 0.0], 10.0, "", 0);
        panel.title = "Thread Count";
        panel.available = false;
        let text: Vec<String> = panel.lines(&Theme::dark()).iter().map(plain).collect();
        assert_eq!(text[0], "Thread Count: unavailable");
        assert_eq!(text[1], format!("[{}]", " ".repeat(BAR_WIDTH)));
        assert_eq!(text[2], "History: n/a");
        assert_eq!(text.len(), 4);
    }

    #[test]
    fn unitless_integer_metric() {
        let lines = panel(vec![4.0, 6.0], 10.0, "", 0).lines(&Theme::dark());
        assert_eq!(plain(&lines[0]), "CPU Usage: 6");
        assert_eq!(plain(&lines[1]).matches('=').count(), 30);
        assert_eq!(plain(&lines[3]), "Min: 4  Avg: 5.0  Max: 6");
    }
}
