// Output rendering for the CLI

use anyhow::{Context, Result};
use serde_json::json;

use crate::strategies::{Approach, ApproachOutput};

/// Human-readable result: responses separated by rules when there are several
pub fn render_text(output: &ApproachOutput) -> String {
    let responses = output.responses();
    if responses.len() == 1 {
        return responses[0].to_string();
    }

    let mut out = String::new();
    for (i, response) in responses.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("--- response {} ---\n", i + 1));
        out.push_str(response);
        out.push('\n');
    }
    out
}

pub fn render_json(output: &ApproachOutput) -> Result<String> {
    serde_json::to_string_pretty(output).context("Failed to serialize output")
}

pub fn render_approaches(json: bool) -> Result<String> {
    if json {
        let list: Vec<_> = Approach::ALL
            .iter()
            .map(|a| json!({ "slug": a.slug(), "description": a.description() }))
            .collect();
        return serde_json::to_string_pretty(&list).context("Failed to serialize approaches");
    }

    Ok(Approach::ALL
        .iter()
        .map(|a| format!("{:<12} {}", a.slug(), a.description()))
        .collect::<Vec<_>>()
        .join("\n"))
}
