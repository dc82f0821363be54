use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Wire-layout primitives ---

/// Byte order of a placed signal, derived from PACKING-BYTE-ORDER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    Big,
    Little,
}

/// Declared value kind of a signal, derived from its base-type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    #[serde(rename = "number")]
    Numeric,
    #[serde(rename = "string")]
    Ascii,
}

/// Message classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Normal,
    Secured,
    Multiplexed,
}

// --- Topology ---

/// One PDU triggering inside a physical channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PduRef {
    pub name: String,
    /// Full I-PDU-REF path as written in the document.
    pub reference: String,
    /// Header id from the channel's socket-connection identifier table,
    /// -1 when the channel carries no id for this PDU.
    pub header_id: i32,
}

/// One physical channel: a VLAN and the PDUs triggered on it,
/// in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub vlan_id: i32,
    pub pdus: Vec<PduRef>,
}

// --- Communication ---

/// Raw signal definition, independent of any PDU placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ISignal {
    pub name: String,
    pub bit_length: i32,
    pub description: String,
    /// Compute-method name (last ref segment); empty means 1:1 identity.
    pub compu_method: String,
    pub init_value: f64,
    pub signed: bool,
    pub data_kind: DataKind,
}

// --- Scaling ---

/// The two numerator coefficients of a compu scale, in document order:
/// `v1` over the denominator gives the intercept, `v2` the slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompuNumerator {
    pub v1: f64,
    pub v2: f64,
}

/// One piecewise segment of an internal-to-physical mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompuScale {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub numerator: CompuNumerator,
    pub denominator: f64,
    /// Optional VT constant/enumeration text.
    pub constant: String,
}

/// A named internal-to-physical mapping. Methods of category IDENTICAL
/// are never materialized; a signal referencing one falls back to the
/// identity scaling defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeMethod {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub scales: Vec<CompuScale>,
}

// --- Assembled messages ---

/// A signal placed into a message: wire position plus resolved
/// physical scaling (`physical = raw * slope + intercept`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub endian: Endian,
    pub start_bit: i32,
    pub bit_length: i32,
    pub slope: f64,
    pub intercept: f64,
    pub max: f64,
    pub min: f64,
    pub unit: String,
    pub signed: bool,
    pub data_kind: DataKind,
    pub description: String,
}

/// A fixed-layout bus message assembled from one signal PDU, or the
/// secured alias of one. Signals are ordered by ascending start bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    /// Header id, -1 when no channel resolves one for this name.
    pub id: i32,
    /// Owning channel name, empty when unresolved.
    pub vlan: String,
    pub byte_length: i32,
    pub has_crc: bool,
    pub kind: MessageKind,
    pub signals: Vec<Signal>,
}

/// A message whose payload layout is selected at runtime by a selector
/// field; each selector code maps to an already-assembled message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplexMessage {
    pub name: String,
    pub id: i32,
    pub byte_length: i32,
    pub selector_start: i32,
    pub selector_length: i32,
    pub selector_endian: Endian,
    pub alternatives: BTreeMap<i32, Message>,
}

/// Closed union over the two message shapes the pipeline produces.
/// Consumers match on the variant, never probe structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusMessage {
    Message(Message),
    Multiplex(MultiplexMessage),
}

impl BusMessage {
    pub fn name(&self) -> &str {
        match self {
            BusMessage::Message(m) => &m.name,
            BusMessage::Multiplex(m) => &m.name,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            BusMessage::Message(m) => m.id,
            BusMessage::Multiplex(m) => m.id,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            BusMessage::Message(m) => m.kind,
            BusMessage::Multiplex(_) => MessageKind::Multiplexed,
        }
    }
}
