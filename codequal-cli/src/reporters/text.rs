//! Text reporter: one block per scored entity

use crate::models::{FileReport, ScoreResult, SmellLabel};
use crate::scoring::reported_maintainability;
use anyhow::Result;
use console::Style;
use std::fmt::Write;

const RULE: &str = "-----------------------";

struct Palette {
    bold: Style,
    dim: Style,
    good: Style,
    bad: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        Self {
            bold: Style::new().bold().force_styling(color),
            dim: Style::new().dim().force_styling(color),
            good: Style::new().green().force_styling(color),
            bad: Style::new().red().force_styling(color),
        }
    }
}

fn render_result(out: &mut String, result: &ScoreResult, palette: &Palette) -> std::fmt::Result {
    let name = result.entity_name.as_deref().unwrap_or("<unknown>");
    let smell = match result.smell {
        SmellLabel::No => palette.good.apply_to(result.smell.as_str()),
        _ => palette.bad.apply_to(result.smell.as_str()),
    };

    writeln!(out, "Name: {}", palette.bold.apply_to(name))?;
    writeln!(out, "{}", palette.dim.apply_to(RULE))?;
    writeln!(out, "Entity type:            {}", result.kind)?;
    writeln!(
        out,
        "Maintainability:        {:.1}/10",
        reported_maintainability(result.maintainability)
    )?;
    writeln!(out, "Smell Found:            {}", smell)?;
    writeln!(out, "Naming score:           {}/10", result.name_score)?;
    writeln!(
        out,
        "General Quality score:  {}/10",
        palette.bold.apply_to(format!("{:.1}", result.general_score))
    )?;
    if let Some(model_score) = result.model_score {
        writeln!(out, "Model Quality score:    {:.1}/10", model_score)?;
    }
    writeln!(out)?;
    writeln!(out)
}

/// Render reports as plain blocks; `color` enables ANSI styling
pub fn render(reports: &[FileReport], color: bool) -> Result<String> {
    let palette = Palette::new(color);
    let mut out = String::new();

    for report in reports {
        writeln!(out, "{}", palette.dim.apply_to(format!("# {}", report.path.display())))?;
        writeln!(out)?;
        if report.results.is_empty() {
            writeln!(out, "No classes or functions found.")?;
            writeln!(out)?;
        }
        for result in &report.results {
            render_result(&mut out, result, &palette)?;
        }
    }

    Ok(out)
}
