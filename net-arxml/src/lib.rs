//! ARXML network extractor: XML string -> flat message model.
//!
//! Pipeline phases:
//! 1. DOM construction (dom)
//! 2. Sub-tree extraction (network, signal, compu)
//! 3. Reference resolution (resolver)
//! 4. Message assembly (message, multiplex)

pub mod compu;
pub mod dom;
pub mod message;
pub mod multiplex;
pub mod network;
pub mod parser;
pub mod resolver;
pub mod signal;

pub use parser::{
    parse_document, parse_file, parse_str, ArxmlError, ExtractOptions, Extraction, Warning,
};
