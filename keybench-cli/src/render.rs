//! Live terminal rendering — a bar chart redrawn on every progress
//! snapshot, plus the final summary cards.
//!
//! Bars are scaled to the largest running average currently on screen,
//! so relative heights stay comparable while absolute values settle.

use crossterm::tty::IsTty;
use crossterm::{ExecutableCommand, cursor, terminal};
use keybench_core::{AlgorithmDescriptor, BenchmarkResult, EfficiencyReport, RunningAverages};
use std::io::{Write, stdout};
use std::sync::Mutex;

const BAR_WIDTH: usize = 40;

// Floor for the bar scale, matching the chart's behavior before the
// first sample lands.
const MIN_SCALE: f64 = 0.0001;

fn bar(value: f64, max: f64) -> String {
    let scale = max.max(MIN_SCALE);
    let filled = ((value / scale) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.min(BAR_WIDTH))
}

struct ChartState {
    label_a: &'static str,
    label_b: Option<&'static str>,
    averages_a: RunningAverages,
    averages_b: RunningAverages,
    lines_drawn: u16,
}

/// A chart that live-updates in place as snapshots arrive.
///
/// In compare mode both sides share one scale, so the slower algorithm's
/// bars visibly dominate. Redrawing is skipped when stdout is not a
/// terminal; the final summary is printed either way.
pub struct LiveChart {
    state: Mutex<ChartState>,
}

impl LiveChart {
    pub fn single(descriptor: AlgorithmDescriptor) -> Self {
        Self {
            state: Mutex::new(ChartState {
                label_a: descriptor.label,
                label_b: None,
                averages_a: RunningAverages::default(),
                averages_b: RunningAverages::default(),
                lines_drawn: 0,
            }),
        }
    }

    pub fn compare(a: AlgorithmDescriptor, b: AlgorithmDescriptor) -> Self {
        Self {
            state: Mutex::new(ChartState {
                label_a: a.label,
                label_b: Some(b.label),
                averages_a: RunningAverages::default(),
                averages_b: RunningAverages::default(),
                lines_drawn: 0,
            }),
        }
    }

    pub fn update_a(&self, averages: RunningAverages) {
        let mut state = self.state.lock().unwrap();
        state.averages_a = averages;
        redraw(&mut state);
    }

    pub fn update_b(&self, averages: RunningAverages) {
        let mut state = self.state.lock().unwrap();
        state.averages_b = averages;
        redraw(&mut state);
    }

    /// Leave the chart on screen and add a separating blank line.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap();
        if state.lines_drawn > 0 {
            println!();
        }
    }
}

fn redraw(state: &mut ChartState) {
    let mut out = stdout();
    if !out.is_tty() {
        return;
    }

    if state.lines_drawn > 0 {
        let _ = out.execute(cursor::MoveUp(state.lines_drawn));
    }

    let a = state.averages_a;
    let b = state.averages_b;
    let mut max = a.keygen.max(a.sign).max(a.verify);
    if state.label_b.is_some() {
        max = max.max(b.keygen).max(b.sign).max(b.verify);
    }

    let width = BAR_WIDTH;
    let mut lines: Vec<String> = Vec::new();
    match state.label_b {
        None => lines.push(state.label_a.to_string()),
        Some(label_b) => lines.push(format!("A: {}   B: {}", state.label_a, label_b)),
    }
    for (name, value_a, value_b) in [
        ("keygen", a.keygen, b.keygen),
        ("sign", a.sign, b.sign),
        ("verify", a.verify, b.verify),
    ] {
        match state.label_b {
            None => {
                lines.push(format!(
                    "{name:>6}  {:<width$}  {value_a:>9.2} ms",
                    bar(value_a, max)
                ));
            }
            Some(_) => {
                lines.push(format!(
                    "{name:>6} A {:<width$}  {value_a:>9.2} ms",
                    bar(value_a, max)
                ));
                lines.push(format!(
                    "{:>6} B {:<width$}  {value_b:>9.2} ms",
                    "",
                    bar(value_b, max)
                ));
            }
        }
    }

    for line in &lines {
        let _ = out.execute(terminal::Clear(terminal::ClearType::CurrentLine));
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
    state.lines_drawn = lines.len() as u16;
}

fn print_averages(averages: &RunningAverages) {
    println!("  keygen  {:>9.2} ms", averages.keygen);
    println!("  sign    {:>9.2} ms", averages.sign);
    println!("  verify  {:>9.2} ms", averages.verify);
}

pub fn print_single_summary(result: &BenchmarkResult) {
    println!("{}", result.descriptor.label);
    print_averages(&result.averages);
}

pub fn print_compare_summary(result_a: &BenchmarkResult, result_b: &BenchmarkResult) {
    println!(
        "{} vs {}",
        result_a.descriptor.label, result_b.descriptor.label
    );
    println!("[A] {}", result_a.descriptor.label);
    print_averages(&result_a.averages);
    println!("[B] {}", result_b.descriptor.label);
    print_averages(&result_b.averages);
}

pub fn print_efficiency_summary(report: &EfficiencyReport) {
    println!("{}", report.descriptor.label);
    println!("  security strength  {} bits", report.security_bits);
    println!("  execution time     {:.2} ms", report.elapsed_ms);
    println!("  efficiency         {:.2} bits/ms", report.bits_per_ms);
    println!();
    println!("Higher efficiency means more security delivered per millisecond of computation.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(5.0, 10.0).chars().count(), 20);
        assert_eq!(bar(10.0, 10.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(0.0, 10.0), "");
    }

    #[test]
    fn test_bar_never_exceeds_width() {
        // A value above the scale (stale max) still clamps.
        assert_eq!(bar(25.0, 10.0).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn test_bar_with_zero_max_uses_floor() {
        // Before the first sample everything is zero; the scale floor
        // keeps the division finite and the bars empty.
        assert_eq!(bar(0.0, 0.0), "");
    }
}
