use crate::analysis::association::AssociationRule;
use crate::error::Error;
use csv::Writer;
use std::path::Path;

pub const RULE_COLUMNS: [&str; 9] = [
    "antecedents",
    "consequents",
    "antecedent support",
    "consequent support",
    "support",
    "confidence",
    "lift",
    "leverage",
    "conviction",
];

/// Item names of one side of a rule, comma separated.
pub fn format_items(items: &[String]) -> String {
    items.join(", ")
}

/// Write every rule in the order given. Infinite conviction is written as `inf`.
pub fn write_rules(rules: &[AssociationRule], path: &Path) -> Result<(), Error> {
    let mut writer = Writer::from_path(path)?;

    writer.write_record(RULE_COLUMNS)?;

    for rule in rules {
        writer.write_record(&[
            format_items(&rule.antecedents),
            format_items(&rule.consequents),
            rule.antecedent_support.to_string(),
            rule.consequent_support.to_string(),
            rule.support.to_string(),
            rule.confidence.to_string(),
            rule.lift.to_string(),
            rule.leverage.to_string(),
            rule.conviction.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
