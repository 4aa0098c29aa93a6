//! 评估报告渲染
//!
//! 把 `AssessmentResult` 渲染成终端可读的纯文本报告

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Local};

use crate::models::{humanize_signal, AssessmentResult};

/// 渲染纯文本报告
pub fn render_text(result: &AssessmentResult) -> String {
    render_text_at(result, None)
}

/// 渲染纯文本报告，可附带生成时间
pub fn render_text_at(result: &AssessmentResult, generated_at: Option<DateTime<Local>>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "AI Automation Readiness Assessment");
    if let Some(at) = generated_at {
        let _ = writeln!(out, "Generated: {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    let _ = writeln!(out, "{}", rule);

    let _ = writeln!(
        out,
        "Readiness score:  {}/100 ({})",
        result.readiness_score, result.readiness_category
    );
    let _ = writeln!(out, "Risk score:       {}/100", result.risk_score);
    let _ = writeln!(out, "Time horizon:     {}", result.time_horizon);
    let _ = writeln!(out, "Reassess:         {}", result.reassessment_time);

    section(&mut out, "Recommendation");
    let _ = writeln!(out, "{}", result.recommendation);

    signals(&mut out, "Automatable signals", &result.automatable_signals);
    signals(&mut out, "Risk signals", &result.risk_signals);

    section(&mut out, "Duty sample");
    bullets(&mut out, &result.duty_sample);

    section(&mut out, "Role excerpt");
    let _ = writeln!(out, "{}", result.role_excerpt);

    if !result.research_insights.is_empty() {
        section(&mut out, "Research insights");
        bullets(&mut out, &result.research_insights);
    }

    section(&mut out, "Research guidance");
    let _ = writeln!(out, "{}", result.research_guidance);

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "-".repeat(title.chars().count()));
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

fn signals(out: &mut String, title: &str, signals: &BTreeMap<String, i64>) {
    section(out, title);
    if signals.is_empty() {
        let _ = writeln!(out, "  (none reported)");
        return;
    }
    for (label, weight) in signals {
        let _ = writeln!(out, "  {:<32} {:>4}", humanize_signal(label), weight);
    }
}
