//! Message assembly: places resolved signals into signal PDUs and links
//! secured PDUs onto already-assembled messages.

use net_ir::{Endian, Message, MessageKind, Signal};

use crate::dom::{find_package, int_text, last_segment, XmlNode};
use crate::parser::{ArxmlError, ExtractOptions};
use crate::resolver::ResolutionContext;

/// PACKING-BYTE-ORDER token mapping; anything but the
/// least-significant-first token reads as big endian.
pub fn endian_from_byte_order(text: &str) -> Endian {
    if text == "MOST-SIGNIFICANT-BYTE-LAST" {
        Endian::Little
    } else {
        Endian::Big
    }
}

/// Big-endian start positions count bits MSB-first within each byte; the
/// wire start bit is the raw position mirrored inside its byte. Little
/// endian keeps the raw position.
pub fn wire_start_bit(start: i32, endian: Endian) -> i32 {
    match endian {
        Endian::Big => start - (start % 8) + 7 - (start % 8),
        Endian::Little => start,
    }
}

/// CRC convention: the field at the lowest start bit carries a CRC or
/// checksum suffix.
fn has_crc(signals: &[Signal]) -> bool {
    let Some(first) = signals.first() else {
        return false;
    };
    first.name.ends_with("_CRC")
        || first.name.ends_with("Crc")
        || first.name.to_ascii_lowercase().ends_with("checksum")
}

fn pdus_package<'a>(root: &'a XmlNode) -> Option<&'a XmlNode> {
    find_package(find_package(Some(root), "Communication"), "PDUs")
}

/// Assemble one `Message` per I-SIGNAL-I-PDU definition.
pub fn assemble_messages(
    root: &XmlNode,
    ctx: &ResolutionContext<'_>,
    opts: &ExtractOptions,
) -> Result<Vec<Message>, ArxmlError> {
    let Some(pdus) = pdus_package(root) else {
        return Ok(Vec::new());
    };

    let mut messages = Vec::new();
    for pdu in pdus.descendants("I-SIGNAL-I-PDU") {
        let name = pdu.short_name().to_string();
        let byte_length = int_text(pdu.child_text("LENGTH"));

        let mut signals = Vec::new();
        for mapping in pdu.descendants("I-SIGNAL-TO-I-PDU-MAPPING") {
            if let Some(sig) = place_signal(mapping, ctx, opts)? {
                signals.push(sig);
            }
        }
        signals.sort_by_key(|s| s.start_bit);

        let has_crc = has_crc(&signals);
        messages.push(Message {
            id: ctx.message_id(&name),
            vlan: ctx.vlan_name(&name).to_string(),
            name,
            byte_length,
            has_crc,
            kind: MessageKind::Normal,
            signals,
        });
    }
    Ok(messages)
}

/// Resolve one signal-to-PDU mapping into a placed signal. `Ok(None)`
/// means the mapping is skipped: missing byte order, or (in lenient mode)
/// an unresolved signal name.
fn place_signal(
    mapping: &XmlNode,
    ctx: &ResolutionContext<'_>,
    opts: &ExtractOptions,
) -> Result<Option<Signal>, ArxmlError> {
    let name = match mapping.child_text("I-SIGNAL-REF") {
        Some(sig_ref) => last_segment(sig_ref),
        None => mapping.short_name(),
    };

    let Some(byte_order) = mapping.child_text("PACKING-BYTE-ORDER") else {
        return Ok(None);
    };
    let endian = endian_from_byte_order(byte_order);
    let start = int_text(mapping.child_text("START-POSITION"));
    let start_bit = wire_start_bit(start, endian);

    let Some(isignal) = ctx.signals.get(name) else {
        if opts.strict {
            return Err(ArxmlError::UnresolvedReference(format!(
                "signal '{name}' mapped in '{}' has no I-SIGNAL definition",
                mapping.short_name()
            )));
        }
        return Ok(None);
    };

    // Identity scaling unless the referenced compute method resolves and
    // carries at least one scale; only the first scale is consulted.
    let mut signal = Signal {
        name: name.to_string(),
        endian,
        start_bit,
        bit_length: isignal.bit_length,
        slope: 1.0,
        intercept: 0.0,
        max: 0.0,
        min: 0.0,
        unit: String::new(),
        signed: isignal.signed,
        data_kind: isignal.data_kind,
        description: isignal.description.clone(),
    };
    if !isignal.compu_method.is_empty() {
        if let Some(compu) = ctx.compu_methods.get(isignal.compu_method.as_str()) {
            if let Some(scale) = compu.scales.first() {
                signal.intercept = scale.numerator.v1 / scale.denominator;
                signal.slope = scale.numerator.v2 / scale.denominator;
                signal.max = scale.max;
                signal.min = scale.min;
                signal.unit = compu.unit.clone();
            }
        }
    }
    Ok(Some(signal))
}

/// Append one secured `Message` per SECURED-I-PDU whose payload reference
/// resolves to an assembled message. The secured entry keeps its own name
/// and id but aliases the target's layout.
pub fn link_secured_messages(
    root: &XmlNode,
    ctx: &ResolutionContext<'_>,
    opts: &ExtractOptions,
    messages: &mut Vec<Message>,
) -> Result<(), ArxmlError> {
    let Some(pdus) = pdus_package(root) else {
        return Ok(());
    };

    let mut secured = Vec::new();
    for sec in pdus.descendants("SECURED-I-PDU") {
        let name = sec.short_name().to_string();
        let Some(payload_ref) = sec.child_text("PAYLOAD-REF") else {
            continue;
        };
        let target_name = last_segment(payload_ref);

        let Some(target) = messages.iter().find(|m| m.name == target_name) else {
            if opts.strict {
                return Err(ArxmlError::UnresolvedReference(format!(
                    "secured PDU '{name}' payload '{target_name}' matches no assembled message"
                )));
            }
            continue;
        };
        secured.push(Message {
            id: ctx.message_id(&name),
            name,
            vlan: target.vlan.clone(),
            byte_length: target.byte_length,
            has_crc: target.has_crc,
            kind: MessageKind::Secured,
            signals: target.signals.clone(),
        });
    }
    messages.extend(secured);
    Ok(())
}
