//! Topology extraction: physical channels, VLAN ids, and the per-channel
//! header-id table.

use std::collections::HashMap;

use net_ir::{Network, PduRef};

use crate::dom::{find_package, int_text, int_value, last_segment, XmlNode};

const ETHERNET_CLUSTER_NAME: &str = "Ethernet_Cluster";

/// Extract one `Network` per physical channel under the Ethernet cluster.
/// A document without a Topology package yields an empty list.
pub fn extract_networks(root: &XmlNode) -> Vec<Network> {
    let clusters = find_package(find_package(Some(root), "Topology"), "Clusters");
    let Some(elements) = clusters.and_then(|pkg| pkg.first_child("ELEMENTS")) else {
        return Vec::new();
    };
    let Some(ethernet) = elements
        .children("ETHERNET-CLUSTER")
        .find(|c| c.short_name() == ETHERNET_CLUSTER_NAME)
    else {
        return Vec::new();
    };

    ethernet
        .descendants("ETHERNET-PHYSICAL-CHANNEL")
        .into_iter()
        .map(extract_channel)
        .collect()
}

fn extract_channel(channel: &XmlNode) -> Network {
    let name = channel.short_name().to_string();
    // First identifier across all direct VLAN children; a channel may
    // declare several VLAN elements and not all carry an identifier.
    let vlan_id = int_text(
        channel
            .children("VLAN")
            .flat_map(|v| v.children("VLAN-IDENTIFIER"))
            .next()
            .and_then(XmlNode::text),
    );

    // Header ids are declared separately from the triggerings, keyed by
    // the last segment of each identifier's triggering reference.
    let mut header_ids: HashMap<&str, i32> = HashMap::new();
    for ident in channel.descendants("SOCKET-CONNECTION-IPDU-IDENTIFIER") {
        let id_text = ident.child_text("HEADER-ID");
        let trigger_ref = ident.child_text("PDU-TRIGGERING-REF");
        if let (Some(id_text), Some(trigger_ref)) = (id_text, trigger_ref) {
            if let Some(id) = int_value(id_text) {
                header_ids.insert(last_segment(trigger_ref), id);
            }
        }
    }

    let mut pdus = Vec::new();
    for trigger in channel.descendants("PDU-TRIGGERING") {
        let pdu_name = trigger.short_name();
        let Some(reference) = trigger.child_text("I-PDU-REF") else {
            continue;
        };
        if pdu_name.is_empty() {
            continue;
        }
        pdus.push(PduRef {
            name: pdu_name.to_string(),
            reference: reference.to_string(),
            header_id: header_ids.get(pdu_name).copied().unwrap_or(-1),
        });
    }

    Network {
        name,
        vlan_id,
        pdus,
    }
}
