//! Pipeline orchestrator: ARXML text -> `Extraction`.
//!
//! Stage order is fixed: networks -> signals -> compute methods ->
//! resolution context -> signal PDUs -> secured PDUs -> multiplexed PDUs.
//! Each stage reads the document and prior outputs only; nothing mutates
//! the document.

use std::path::Path;

use net_ir::{BusMessage, Network};
use thiserror::Error;

use crate::compu::extract_compute_methods;
use crate::dom::XmlDocument;
use crate::message::{assemble_messages, link_secured_messages};
use crate::multiplex::resolve_multiplex;
use crate::network::extract_networks;
use crate::resolver::ResolutionContext;
use crate::signal::extract_signals;

#[derive(Debug, Error)]
pub enum ArxmlError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse failed: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Strict mode only; lenient extraction skips the unresolved item.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
}

/// Non-fatal findings collected during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error(
        "compu method '{method}' scale '{label}' has {numerator_count} numerator values, expected 2"
    )]
    SchemaViolation {
        method: String,
        label: String,
        numerator_count: usize,
    },
    #[error("multiplex PDU '{pdu}' declares selector code {code} more than once")]
    DuplicateSelector { pdu: String, code: i32 },
}

/// Extraction behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Turn silently-skipped unresolved references (signal mappings,
    /// secured payload targets, multiplex alternatives) into errors.
    pub strict: bool,
}

/// Complete extraction result for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub networks: Vec<Network>,
    /// Assembled messages: normal and secured first, multiplexed appended,
    /// each group in document order.
    pub messages: Vec<BusMessage>,
    pub warnings: Vec<Warning>,
}

/// Run the full pipeline over an already-parsed document.
pub fn parse_document(
    doc: &XmlDocument,
    opts: &ExtractOptions,
) -> Result<Extraction, ArxmlError> {
    let Some(root) = doc.root() else {
        return Ok(Extraction {
            networks: Vec::new(),
            messages: Vec::new(),
            warnings: Vec::new(),
        });
    };

    let mut warnings = Vec::new();
    let networks = extract_networks(root);
    let isignals = extract_signals(root);
    let methods = extract_compute_methods(root, &mut warnings);
    log::debug!(
        "extracted {} channels, {} signals, {} compute methods",
        networks.len(),
        isignals.len(),
        methods.len()
    );

    let ctx = ResolutionContext::build(&networks, &isignals, &methods);
    let mut plain = assemble_messages(root, &ctx, opts)?;
    link_secured_messages(root, &ctx, opts, &mut plain)?;
    let multiplexed = resolve_multiplex(root, &ctx, &plain, opts, &mut warnings)?;

    let mut messages: Vec<BusMessage> = plain.into_iter().map(BusMessage::Message).collect();
    messages.extend(multiplexed.into_iter().map(BusMessage::Multiplex));

    Ok(Extraction {
        networks,
        messages,
        warnings,
    })
}

/// Parse an ARXML string and extract its network model.
pub fn parse_str(xml: &str, opts: &ExtractOptions) -> Result<Extraction, ArxmlError> {
    let doc = XmlDocument::parse(xml)?;
    parse_document(&doc, opts)
}

/// Read and parse an ARXML file. Read or XML failures abort the whole
/// parse; they never degrade into an empty model.
pub fn parse_file<P: AsRef<Path>>(path: P, opts: &ExtractOptions) -> Result<Extraction, ArxmlError> {
    let xml = std::fs::read_to_string(path)?;
    parse_str(&xml, opts)
}
