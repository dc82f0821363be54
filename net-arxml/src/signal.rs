//! Raw I-Signal extraction from the Communication/Signals package.

use net_ir::{DataKind, ISignal};

use crate::dom::{find_package, float_text, int_text, last_segment, XmlNode};

/// Extract every I-SIGNAL definition. Order is document order; downstream
/// consumption is by name only.
pub fn extract_signals(root: &XmlNode) -> Vec<ISignal> {
    let Some(signals) = find_package(find_package(Some(root), "Communication"), "Signals") else {
        return Vec::new();
    };

    signals
        .descendants("I-SIGNAL")
        .into_iter()
        .map(extract_signal)
        .collect()
}

fn extract_signal(sig: &XmlNode) -> ISignal {
    let name = sig.short_name().to_string();
    let description = sig
        .first_child("DESC")
        .and_then(|d| d.child_text("L-2"))
        .unwrap_or("")
        .to_string();
    let bit_length = int_text(sig.child_text("LENGTH"));
    let init_value = float_text(sig.descendant_text("VALUE"));
    let compu_method = sig
        .descendant_text("COMPU-METHOD-REF")
        .map(last_segment)
        .unwrap_or("")
        .to_string();

    let (signed, data_kind) = classify_base_type(sig.descendant_text("BASE-TYPE-REF"));

    ISignal {
        name,
        bit_length,
        description,
        compu_method,
        init_value,
        signed,
        data_kind,
    }
}

/// Signedness and value kind are encoded in the base-type name: a SINT
/// marker means signed, an `_ASCII` second token means textual payload.
fn classify_base_type(type_ref: Option<&str>) -> (bool, DataKind) {
    let Some(type_ref) = type_ref else {
        return (false, DataKind::Numeric);
    };
    let base_type = last_segment(type_ref);
    let signed = base_type.contains("SINT");
    let data_kind = match base_type.split('_').nth(1) {
        Some("ASCII") => DataKind::Ascii,
        _ => DataKind::Numeric,
    };
    (signed, data_kind)
}
