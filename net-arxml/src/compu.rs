//! Compute-method extraction: piecewise internal-to-physical scale tables.

use net_ir::{CompuNumerator, CompuScale, ComputeMethod};

use crate::dom::{find_package, float_text, last_segment, XmlNode};
use crate::parser::Warning;

/// UNIT-REF paths share this prefix; the unit name is whatever follows.
const UNIT_REF_PREFIX: &str = "/DataTypes/Units/";

/// Extract every compute method except the pass-through IDENTICAL ones.
/// A scale with a numerator count other than two is malformed input: it
/// is dropped and reported through `warnings` instead of truncated.
pub fn extract_compute_methods(root: &XmlNode, warnings: &mut Vec<Warning>) -> Vec<ComputeMethod> {
    let Some(methods) = find_package(find_package(Some(root), "DataTypes"), "CompuMethods") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for compu in methods.descendants("COMPU-METHOD") {
        let Some(category) = compu.child_text("CATEGORY") else {
            continue;
        };
        if category == "IDENTICAL" {
            continue;
        }

        let name = compu.short_name().to_string();
        let unit = compu
            .child_text("UNIT-REF")
            .map(|r| r.strip_prefix(UNIT_REF_PREFIX).unwrap_or(last_segment(r)))
            .unwrap_or("")
            .to_string();

        let mut scales = Vec::new();
        for section in compu.children("COMPU-INTERNAL-TO-PHYS") {
            for scale in section.descendants("COMPU-SCALE") {
                match extract_scale(scale) {
                    Ok(Some(s)) => scales.push(s),
                    // Unlabeled scales are an expected gap, skipped.
                    Ok(None) => {}
                    Err(count) => warnings.push(Warning::SchemaViolation {
                        method: name.clone(),
                        label: scale.child_text("SHORT-LABEL").unwrap_or("").to_string(),
                        numerator_count: count,
                    }),
                }
            }
        }

        out.push(ComputeMethod {
            name,
            category: category.to_string(),
            unit,
            scales,
        });
    }
    out
}

/// `Ok(None)` means no label (skip silently); `Err(n)` means the scale
/// carried `n != 2` numerator values.
fn extract_scale(scale: &XmlNode) -> Result<Option<CompuScale>, usize> {
    let Some(label) = scale.child_text("SHORT-LABEL") else {
        return Ok(None);
    };

    let numerators: Vec<f64> = scale
        .descendants("COMPU-NUMERATOR")
        .into_iter()
        .flat_map(|num| num.children("V"))
        .map(|v| float_text(v.text()))
        .collect();
    if numerators.len() != 2 {
        return Err(numerators.len());
    }

    let denominator = float_text(
        scale
            .descendants("COMPU-DENOMINATOR")
            .first()
            .and_then(|d| d.child_text("V")),
    );

    Ok(Some(CompuScale {
        label: label.to_string(),
        min: float_text(scale.child_text("LOWER-LIMIT")),
        max: float_text(scale.child_text("UPPER-LIMIT")),
        numerator: CompuNumerator {
            v1: numerators[0],
            v2: numerators[1],
        },
        denominator,
        constant: scale.descendant_text("VT").unwrap_or("").to_string(),
    }))
}
