// SPDX-License-Identifier: GPL-3.0-only

//! Validation rules for keyboard layout definitions.
//!
//! This module implements permissive validation that collects warnings
//! and provides sensible defaults for missing or invalid values. Only
//! duplicate keys are fatal, since every other component addresses keys
//! by identifier.

use crate::layout::types::{
    Key, Layout, LayoutDefinition, ParseError, ParseResult, Row, Severity, ValidationIssue,
};

/// Validates a layout definition and builds the immutable layout.
///
/// Missing labels are defaulted, empty rows are dropped, and each of those
/// produces a warning. Duplicate key identifiers produce an error.
pub fn validate_layout(definition: LayoutDefinition) -> Result<ParseResult<Layout>, ParseError> {
    let mut warnings = Vec::new();

    validate_required_fields(&definition, &mut warnings);

    let rows = build_rows(definition.rows, &mut warnings);

    let layout = Layout::new(definition.name, rows)?;

    Ok(collect_warnings(layout, warnings))
}

/// Validates layout-level fields.
pub fn validate_required_fields(
    definition: &LayoutDefinition,
    warnings: &mut Vec<ValidationIssue>,
) {
    if definition.name.is_empty() {
        warnings.push(
            ValidationIssue::new(Severity::Warning, "Layout name is empty", "name")
                .with_suggestion("Provide a descriptive name for the layout"),
        );
    }

    if definition.rows.is_empty() {
        warnings.push(
            ValidationIssue::new(Severity::Warning, "Layout has no rows", "rows")
                .with_suggestion("Add at least one row of keys"),
        );
    }
}

/// Converts row definitions into rows, defaulting labels and dropping empty rows.
fn build_rows(
    definitions: Vec<crate::layout::types::RowDefinition>,
    warnings: &mut Vec<ValidationIssue>,
) -> Vec<Row> {
    let mut rows = Vec::with_capacity(definitions.len());

    for (row_idx, row_def) in definitions.into_iter().enumerate() {
        if row_def.keys.is_empty() {
            warnings.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "Row has no keys and was skipped",
                    format!("rows[{}]", row_idx),
                )
                .with_suggestion("Remove the empty row"),
            );
            continue;
        }

        let mut row = Row::default();
        for (key_idx, key_def) in row_def.keys.into_iter().enumerate() {
            let label = match key_def.label {
                Some(label) if !label.trim().is_empty() => label,
                _ => {
                    warnings.push(
                        ValidationIssue::new(
                            Severity::Warning,
                            format!("Key '{}' has no label; using its default", key_def.id),
                            format!("rows[{}].keys[{}].label", row_idx, key_idx),
                        )
                        .with_suggestion("Provide a display label for the key"),
                    );
                    key_def.id.natural_label()
                }
            };

            row.keys.push(
                Key::new(key_def.id)
                    .with_label(label)
                    .with_width(key_def.width),
            );
        }
        rows.push(row);
    }

    rows
}

/// Collects validation warnings and returns a ParseResult.
pub fn collect_warnings(layout: Layout, mut warnings: Vec<ValidationIssue>) -> ParseResult<Layout> {
    // Errors first, then by field path
    warnings.sort_by(|a, b| match (a.severity, b.severity) {
        (Severity::Error, Severity::Warning) => std::cmp::Ordering::Less,
        (Severity::Warning, Severity::Error) => std::cmp::Ordering::Greater,
        _ => a.field_path.cmp(&b.field_path),
    });

    ParseResult::with_warnings(layout, warnings)
}

// ============================================================================
// Tests
// ============================================================================
