//! Multiplexed-PDU resolution: selector field plus a code -> message map
//! over already-assembled messages.

use std::collections::{BTreeMap, HashMap};

use net_ir::{Message, MultiplexMessage};

use crate::dom::{find_package, int_text, last_segment, XmlNode};
use crate::message::endian_from_byte_order;
use crate::parser::{ArxmlError, ExtractOptions, Warning};
use crate::resolver::ResolutionContext;

/// Resolve every MULTIPLEXED-I-PDU against the assembled message set.
/// Alternatives whose target is missing are absent from the map, not an
/// error; duplicate selector codes are last-writer-wins and reported.
pub fn resolve_multiplex(
    root: &XmlNode,
    ctx: &ResolutionContext<'_>,
    messages: &[Message],
    opts: &ExtractOptions,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<MultiplexMessage>, ArxmlError> {
    let Some(pdus) = find_package(find_package(Some(root), "Communication"), "PDUs") else {
        return Ok(Vec::new());
    };

    let by_name: HashMap<&str, &Message> =
        messages.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut out = Vec::new();
    for mux in pdus.descendants("MULTIPLEXED-I-PDU") {
        let name = mux.short_name().to_string();
        let Some(selector_order) = mux.child_text("SELECTOR-FIELD-BYTE-ORDER") else {
            continue;
        };

        let mut alternatives = BTreeMap::new();
        for alt in mux.descendants("DYNAMIC-PART-ALTERNATIVE") {
            let Some(pdu_ref) = alt.child_text("I-PDU-REF") else {
                continue;
            };
            let target_name = last_segment(pdu_ref);
            let code = int_text(alt.child_text("SELECTOR-FIELD-CODE"));

            let Some(target) = by_name.get(target_name) else {
                if opts.strict {
                    return Err(ArxmlError::UnresolvedReference(format!(
                        "multiplex PDU '{name}' alternative {code} targets unknown message '{target_name}'"
                    )));
                }
                continue;
            };
            if alternatives.insert(code, (*target).clone()).is_some() {
                warnings.push(Warning::DuplicateSelector {
                    pdu: name.clone(),
                    code,
                });
            }
        }

        out.push(MultiplexMessage {
            id: ctx.message_id(&name),
            name,
            byte_length: int_text(mux.child_text("LENGTH")),
            selector_start: int_text(mux.child_text("SELECTOR-FIELD-START-POSITION")),
            selector_length: int_text(mux.child_text("SELECTOR-FIELD-LENGTH")),
            selector_endian: endian_from_byte_order(selector_order),
            alternatives,
        });
    }
    Ok(out)
}
