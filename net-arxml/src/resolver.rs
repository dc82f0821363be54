//! Cross-namespace reference resolution.
//!
//! Builds the four name-indexed lookup tables the assembler stages consume.
//! All items are borrowed from the extractor outputs; the context is passed
//! explicitly so the pipeline stays a pure function of its inputs.

use std::collections::HashMap;

use net_ir::{ComputeMethod, ISignal, Network};

use crate::dom::last_segment;

/// Pre-indexed lookup state for message assembly. Duplicate names are
/// last-writer-wins, matching the assumption that names are unique per
/// document.
pub struct ResolutionContext<'a> {
    /// PDU reference last-segment -> header id.
    header_ids: HashMap<&'a str, i32>,
    /// PDU name or triggering name -> owning channel name.
    vlans: HashMap<&'a str, &'a str>,
    pub signals: HashMap<&'a str, &'a ISignal>,
    pub compu_methods: HashMap<&'a str, &'a ComputeMethod>,
}

impl<'a> ResolutionContext<'a> {
    pub fn build(
        networks: &'a [Network],
        signals: &'a [ISignal],
        methods: &'a [ComputeMethod],
    ) -> Self {
        let mut header_ids = HashMap::new();
        let mut vlans = HashMap::new();
        for net in networks {
            for pdu in &net.pdus {
                let ref_name = last_segment(&pdu.reference);
                if !pdu.reference.is_empty() {
                    header_ids.insert(ref_name, pdu.header_id);
                }
                // Both the triggering name and the referenced PDU name
                // must resolve to the channel.
                vlans.insert(ref_name, net.name.as_str());
                vlans.insert(pdu.name.as_str(), net.name.as_str());
            }
        }

        let signals = signals.iter().map(|s| (s.name.as_str(), s)).collect();
        let compu_methods = methods.iter().map(|m| (m.name.as_str(), m)).collect();

        ResolutionContext {
            header_ids,
            vlans,
            signals,
            compu_methods,
        }
    }

    /// Header id for a message name, -1 when no channel declares one.
    pub fn message_id(&self, name: &str) -> i32 {
        self.header_ids.get(name).copied().unwrap_or(-1)
    }

    /// Owning channel name, empty when unresolved.
    pub fn vlan_name(&self, name: &str) -> &'a str {
        self.vlans.get(name).copied().unwrap_or("")
    }
}
