//! Markdown and JSON rendering of rules and evaluation results

use relim_core::{Density, Quantity, Unit};
use relim_rules::{Evaluation, Rule, SkippedRecord};
use serde_json::{json, Value as JsonValue};

const USAGE_NOTE: &str = "Give the declared content, its unit and the density of the product, \
then run `relim calc` to compute the release limits. \
If the density is not specified, 1.00 g/ml is used.\n\n\
All calculations are performed in double precision; output values are rounded \
to the configured number of decimal places.\n";

/// Renders results with a fixed number of decimal places
pub struct Renderer {
    precision: usize,
}

impl Renderer {
    pub fn new(precision: u32) -> Self {
        Self { precision: precision as usize }
    }

    /// One section per rule with every output in both units
    pub fn render(&self, declared: Quantity, density: Density, homogeneous: bool, results: &[Evaluation<'_>]) -> String {
        let mut output = String::new();

        output.push_str("## Input\n\n");
        output.push_str("| declared | density | batch |\n");
        output.push_str("|----------|---------|-------|\n");
        output.push_str(&format!(
            "| {:.*} | {:.*} | {} |\n\n",
            self.precision,
            declared,
            self.precision,
            density,
            if homogeneous { "homogenous" } else { "heterogenous" }
        ));

        for result in results {
            output.push_str(&format!("## {}\n\n", result.rule.name));
            output.push_str(&format!(
                "| output | {} | {} |\n",
                Unit::MassConcentration.label(),
                Unit::MassFraction.label()
            ));
            output.push_str("|--------|-----|-------|\n");
            for named in &result.outputs {
                output.push_str(&format!(
                    "| {} | {} | {} |\n",
                    named.title,
                    self.render_number(named.quantity.g_per_l(density)),
                    self.render_number(named.quantity.percent_ww(density)),
                ));
            }
            output.push('\n');
        }

        output
    }

    pub fn render_number(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    /// Results as JSON, every output carried in both units
    pub fn render_json(&self, declared: Quantity, density: Density, homogeneous: bool, results: &[Evaluation<'_>]) -> JsonValue {
        let rules: Vec<JsonValue> = results
            .iter()
            .map(|result| {
                let outputs: Vec<JsonValue> = result
                    .outputs
                    .iter()
                    .map(|named| {
                        json!({
                            "title": named.title,
                            "g/l": named.quantity.g_per_l(density),
                            "%w/w": named.quantity.percent_ww(density),
                        })
                    })
                    .collect();
                json!({ "rule": result.rule.name, "unit": result.rule.unit, "outputs": outputs })
            })
            .collect();

        json!({
            "declared": declared,
            "density": density,
            "homogenous": homogeneous,
            "rules": rules,
        })
    }
}

/// Usage note followed by the info text of each rule
pub fn render_info<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> String {
    let infos: Vec<String> = rules
        .into_iter()
        .map(Rule::expanded_info)
        .filter(|info| !info.is_empty())
        .collect();
    format!("{}\n{}", USAGE_NOTE, infos.join("\n"))
}

/// Loaded rules with their visibility, then the records that were skipped
pub fn render_rules<'a>(
    rules: impl IntoIterator<Item = &'a Rule>,
    is_hidden: impl Fn(&Rule) -> bool,
    skipped: &[SkippedRecord],
) -> String {
    let mut output = String::new();
    output.push_str("| rule | unit | outputs | limits | shown |\n");
    output.push_str("|------|------|---------|--------|-------|\n");
    for rule in rules {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            rule.name,
            rule.unit,
            rule.outputs.len(),
            rule.clauses.len(),
            if is_hidden(rule) { "no" } else { "yes" }
        ));
    }

    if !skipped.is_empty() {
        output.push_str("\n## Skipped\n\n");
        for record in skipped {
            output.push_str(&format!("- [{}] {}\n", record.error.code(), record));
        }
    }
    output
}

pub fn render_rules_json<'a>(
    rules: impl IntoIterator<Item = &'a Rule>,
    is_hidden: impl Fn(&Rule) -> bool,
    skipped: &[SkippedRecord],
) -> JsonValue {
    let rules: Vec<JsonValue> = rules
        .into_iter()
        .map(|rule| json!({ "rule": rule, "shown": !is_hidden(rule) }))
        .collect();
    let skipped: Vec<JsonValue> = skipped
        .iter()
        .map(|record| {
            json!({
                "index": record.index,
                "name": record.name,
                "code": record.error.code(),
                "location": record.error.location(),
                "message": record.error.to_string(),
            })
        })
        .collect();
    json!({ "rules": rules, "skipped": skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use relim_rules::RuleRegistry;
    use std::collections::HashSet;

    const SAMPLE_RULES: &str = include_str!("../../config/rules.json");

    fn sample() -> RuleRegistry {
        let report = RuleRegistry::load_document(SAMPLE_RULES).unwrap();
        assert!(report.skipped.is_empty());
        report.registry
    }

    fn density(v: f64) -> Density {
        Density::new(v).unwrap()
    }

    #[test]
    fn test_render_both_units() {
        let registry = sample();
        let declared = Quantity::new(20.0, Unit::MassFraction);
        let results = registry.evaluate_all(declared, density(1.25), true);
        let markdown = Renderer::new(2).render(declared, density(1.25), true, &results);

        assert!(markdown.contains("| 20.00 % w/w | 1.25 g/ml | homogenous |"));
        assert!(markdown.contains("## Active ingredient content"));
        // 20 %w/w +/- 6 % -> 18.8 .. 21.2 %w/w, i.e. 235 .. 265 g/l at 1.25 g/ml
        assert!(markdown.contains("| lower limit | 235.00 | 18.80 |"));
        assert!(markdown.contains("| declared | 250.00 | 20.00 |"));
        assert!(markdown.contains("| upper limit | 265.00 | 21.20 |"));
    }

    #[test]
    fn test_render_precision() {
        let renderer = Renderer::new(4);
        assert_eq!(renderer.render_number(1.0 / 3.0), "0.3333");
        assert_eq!(Renderer::new(0).render_number(2.6), "3");
    }

    #[test]
    fn test_render_json() {
        let registry = sample();
        let declared = Quantity::new(50.0, Unit::MassConcentration);
        let results = registry.evaluate_all(declared, density(1.0), false);
        let json = Renderer::new(2).render_json(declared, density(1.0), false, &results);

        assert_eq!(json["homogenous"], false);
        assert_eq!(json["rules"].as_array().unwrap().len(), 3);
        let liquid = &json["rules"][1];
        assert_eq!(liquid["rule"], "Liquid release");
        assert_eq!(liquid["unit"], "g/l");
        assert_eq!(liquid["outputs"][0]["title"], "minimum");
        let minimum = liquid["outputs"][0]["g/l"].as_f64().unwrap();
        assert!((minimum - 48.5).abs() < 1e-9);
    }

    #[test]
    fn test_render_info_expands_placeholders() {
        let registry = sample();
        let info = render_info(registry.iter());
        assert!(info.starts_with("Give the declared content"));
        assert!(info.contains("\u{b1} 15 %"));
        assert!(info.contains("20 \u{b0}C"));
        assert!(!info.contains("%1"));
    }

    #[test]
    fn test_render_rules_marks_hidden() {
        let registry = sample();
        let hidden: HashSet<String> = ["Impurity ceiling".to_string()].into_iter().collect();
        let skipped = RuleRegistry::load_all(&[json!({ "name": 1 })]).skipped;
        let table = render_rules(registry.iter(), |r| hidden.contains(&r.name), &skipped);

        assert!(table.contains("| Impurity ceiling | g/l | 2 | 1 | no |"));
        assert!(table.contains("| Liquid release | g/l | 4 | 2 | yes |"));
        assert!(table.contains("- [WRONG_TYPE] skipping rule #0:"));
    }

    #[test]
    fn test_render_rules_json() {
        let registry = sample();
        let json = render_rules_json(registry.iter(), |_| false, &[]);
        assert_eq!(json["rules"][0]["shown"], true);
        assert_eq!(json["rules"][0]["rule"]["unit"], "%w/w");
        assert!(json["skipped"].as_array().unwrap().is_empty());
    }
}
