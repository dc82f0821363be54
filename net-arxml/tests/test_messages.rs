use net_arxml::compu::extract_compute_methods;
use net_arxml::dom::XmlDocument;
use net_arxml::message::{
    assemble_messages, endian_from_byte_order, link_secured_messages, wire_start_bit,
};
use net_arxml::multiplex::resolve_multiplex;
use net_arxml::network::extract_networks;
use net_arxml::resolver::ResolutionContext;
use net_arxml::signal::extract_signals;
use net_arxml::{ArxmlError, ExtractOptions, Warning};
use net_ir::{Endian, Message, MessageKind};
use pretty_assertions::assert_eq;

const MINIMAL: &str = include_str!("../../test-fixtures/arxml/minimal.arxml");

fn assemble(xml: &str, opts: &ExtractOptions) -> Result<Vec<Message>, ArxmlError> {
    let doc = XmlDocument::parse(xml).expect("fixture must parse");
    let root = doc.root().unwrap();
    let mut warnings = Vec::new();

    let networks = extract_networks(root);
    let signals = extract_signals(root);
    let methods = extract_compute_methods(root, &mut warnings);
    let ctx = ResolutionContext::build(&networks, &signals, &methods);

    let mut messages = assemble_messages(root, &ctx, opts)?;
    link_secured_messages(root, &ctx, opts, &mut messages)?;
    Ok(messages)
}

#[test]
fn start_bit_is_mirrored_within_the_byte_for_big_endian() {
    assert_eq!(wire_start_bit(0, Endian::Big), 7);
    assert_eq!(wire_start_bit(3, Endian::Big), 4);
    assert_eq!(wire_start_bit(8, Endian::Big), 15);
    assert_eq!(wire_start_bit(18, Endian::Big), 21);
    assert_eq!(wire_start_bit(0, Endian::Little), 0);
    assert_eq!(wire_start_bit(18, Endian::Little), 18);
}

#[test]
fn byte_order_token_maps_to_endianness() {
    assert_eq!(
        endian_from_byte_order("MOST-SIGNIFICANT-BYTE-LAST"),
        Endian::Little
    );
    assert_eq!(
        endian_from_byte_order("MOST-SIGNIFICANT-BYTE-FIRST"),
        Endian::Big
    );
    assert_eq!(endian_from_byte_order("OPAQUE"), Endian::Big);
}

#[test]
fn signals_are_placed_scaled_and_sorted() {
    let out = assemble(MINIMAL, &ExtractOptions::default()).unwrap();
    let msg_b = &out[1];
    assert_eq!(msg_b.name, "Msg_B");
    assert_eq!(msg_b.id, 7);
    assert_eq!(msg_b.vlan, "VLAN");
    assert_eq!(msg_b.byte_length, 8);
    assert!(!msg_b.has_crc);

    // Ghost mapping dropped; the rest sorted by start bit.
    let placed: Vec<(&str, i32)> = msg_b
        .signals
        .iter()
        .map(|s| (s.name.as_str(), s.start_bit))
        .collect();
    assert_eq!(placed, [("Sig_Ident", 15), ("Sig_Speed", 16)]);

    // First scale of SpeedScale: intercept = 3/2, slope = 10/2.
    let speed = &msg_b.signals[1];
    assert_eq!(speed.endian, Endian::Little);
    assert_eq!(speed.slope, 5.0);
    assert_eq!(speed.intercept, 1.5);
    assert_eq!(speed.min, 0.0);
    assert_eq!(speed.max, 250.0);
    assert_eq!(speed.unit, "km_h");
    assert!(speed.signed);
    assert_eq!(speed.description, "Vehicle speed");
}

#[test]
fn identical_reference_falls_back_to_identity_scaling() {
    let out = assemble(MINIMAL, &ExtractOptions::default()).unwrap();
    let ident = &out[1].signals[0];
    assert_eq!(ident.name, "Sig_Ident");
    assert_eq!(ident.slope, 1.0);
    assert_eq!(ident.intercept, 0.0);
    assert_eq!(ident.min, 0.0);
    assert_eq!(ident.max, 0.0);
    assert_eq!(ident.unit, "");
}

#[test]
fn crc_flag_follows_the_lowest_start_bit_signal_name() {
    let out = assemble(MINIMAL, &ExtractOptions::default()).unwrap();
    assert!(out[0].has_crc, "Msg_A leads with Sig_CRC");
    assert!(!out[1].has_crc);
}

#[test]
fn secured_pdu_aliases_the_target_layout_under_its_own_name() {
    let out = assemble(MINIMAL, &ExtractOptions::default()).unwrap();

    let names: Vec<&str> = out.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Msg_A", "Msg_B", "Msg_A_Secured"]);

    let target = &out[0];
    let secured = &out[2];
    assert_eq!(secured.kind, MessageKind::Secured);
    assert_eq!(secured.id, -1, "no channel declares the secured name");
    assert_eq!(secured.vlan, target.vlan);
    assert_eq!(secured.byte_length, target.byte_length);
    assert_eq!(secured.has_crc, target.has_crc);
    assert_eq!(secured.signals, target.signals);
}

#[test]
fn unresolvable_secured_payload_produces_no_record() {
    let out = assemble(MINIMAL, &ExtractOptions::default()).unwrap();
    assert!(!out.iter().any(|m| m.name == "Msg_Dangling"));
}

#[test]
fn multiplex_alternatives_skip_missing_targets() {
    let doc = XmlDocument::parse(MINIMAL).unwrap();
    let root = doc.root().unwrap();
    let mut warnings = Vec::new();
    let opts = ExtractOptions::default();

    let networks = extract_networks(root);
    let signals = extract_signals(root);
    let methods = extract_compute_methods(root, &mut warnings);
    let ctx = ResolutionContext::build(&networks, &signals, &methods);
    let mut messages = assemble_messages(root, &ctx, &opts).unwrap();
    link_secured_messages(root, &ctx, &opts, &mut messages).unwrap();

    let muxes = resolve_multiplex(root, &ctx, &messages, &opts, &mut warnings).unwrap();
    assert_eq!(muxes.len(), 1);
    let mux = &muxes[0];
    assert_eq!(mux.name, "Msg_Mux");
    assert_eq!(mux.id, 9);
    assert_eq!(mux.byte_length, 8);
    assert_eq!(mux.selector_start, 0);
    assert_eq!(mux.selector_length, 4);
    assert_eq!(mux.selector_endian, Endian::Little);

    // Code 2 points at a nonexistent message: absent, not an error.
    let codes: Vec<i32> = mux.alternatives.keys().copied().collect();
    assert_eq!(codes, [1]);
    assert_eq!(mux.alternatives[&1].name, "Msg_A");
}

#[test]
fn duplicate_selector_codes_keep_the_last_entry_and_warn() {
    let xml = "<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>Communication</SHORT-NAME><AR-PACKAGES>\
        <AR-PACKAGE><SHORT-NAME>PDUs</SHORT-NAME><ELEMENTS>\
          <I-SIGNAL-I-PDU><SHORT-NAME>Alt_A</SHORT-NAME><LENGTH>2</LENGTH></I-SIGNAL-I-PDU>\
          <I-SIGNAL-I-PDU><SHORT-NAME>Alt_B</SHORT-NAME><LENGTH>4</LENGTH></I-SIGNAL-I-PDU>\
          <MULTIPLEXED-I-PDU><SHORT-NAME>Mux</SHORT-NAME><LENGTH>4</LENGTH>\
            <SELECTOR-FIELD-BYTE-ORDER>MOST-SIGNIFICANT-BYTE-FIRST</SELECTOR-FIELD-BYTE-ORDER>\
            <SELECTOR-FIELD-LENGTH>4</SELECTOR-FIELD-LENGTH>\
            <SELECTOR-FIELD-START-POSITION>0</SELECTOR-FIELD-START-POSITION>\
            <DYNAMIC-PARTS><DYNAMIC-PART><DYNAMIC-PART-ALTERNATIVES>\
              <DYNAMIC-PART-ALTERNATIVE>\
                <I-PDU-REF>/Communication/PDUs/Alt_A</I-PDU-REF>\
                <SELECTOR-FIELD-CODE>1</SELECTOR-FIELD-CODE>\
              </DYNAMIC-PART-ALTERNATIVE>\
              <DYNAMIC-PART-ALTERNATIVE>\
                <I-PDU-REF>/Communication/PDUs/Alt_B</I-PDU-REF>\
                <SELECTOR-FIELD-CODE>1</SELECTOR-FIELD-CODE>\
              </DYNAMIC-PART-ALTERNATIVE>\
            </DYNAMIC-PART-ALTERNATIVES></DYNAMIC-PART></DYNAMIC-PARTS>\
          </MULTIPLEXED-I-PDU>\
        </ELEMENTS></AR-PACKAGE>\
      </AR-PACKAGES></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";

    let doc = XmlDocument::parse(xml).unwrap();
    let root = doc.root().unwrap();
    let opts = ExtractOptions::default();
    let mut warnings = Vec::new();
    let ctx = ResolutionContext::build(&[], &[], &[]);
    let messages = assemble_messages(root, &ctx, &opts).unwrap();

    let muxes = resolve_multiplex(root, &ctx, &messages, &opts, &mut warnings).unwrap();
    assert_eq!(muxes[0].alternatives[&1].name, "Alt_B");
    assert_eq!(
        warnings,
        [Warning::DuplicateSelector {
            pdu: "Mux".to_string(),
            code: 1,
        }]
    );
}

#[test]
fn missing_selector_byte_order_skips_the_whole_entry() {
    let xml = "<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>Communication</SHORT-NAME><AR-PACKAGES>\
        <AR-PACKAGE><SHORT-NAME>PDUs</SHORT-NAME><ELEMENTS>\
          <MULTIPLEXED-I-PDU><SHORT-NAME>Mux</SHORT-NAME><LENGTH>4</LENGTH>\
            <SELECTOR-FIELD-LENGTH>4</SELECTOR-FIELD-LENGTH>\
            <SELECTOR-FIELD-START-POSITION>0</SELECTOR-FIELD-START-POSITION>\
          </MULTIPLEXED-I-PDU>\
        </ELEMENTS></AR-PACKAGE>\
      </AR-PACKAGES></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";

    let doc = XmlDocument::parse(xml).unwrap();
    let root = doc.root().unwrap();
    let ctx = ResolutionContext::build(&[], &[], &[]);
    let mut warnings = Vec::new();
    let muxes =
        resolve_multiplex(root, &ctx, &[], &ExtractOptions::default(), &mut warnings).unwrap();
    assert!(muxes.is_empty());
}

#[test]
fn strict_mode_reports_unresolved_signal_mappings() {
    let err = assemble(MINIMAL, &ExtractOptions { strict: true }).unwrap_err();
    match err {
        ArxmlError::UnresolvedReference(msg) => assert!(msg.contains("Sig_Ghost")),
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn strict_mode_reports_unresolved_secured_payloads() {
    let xml = "<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>Communication</SHORT-NAME><AR-PACKAGES>\
        <AR-PACKAGE><SHORT-NAME>PDUs</SHORT-NAME><ELEMENTS>\
          <I-SIGNAL-I-PDU><SHORT-NAME>Msg_A</SHORT-NAME><LENGTH>1</LENGTH></I-SIGNAL-I-PDU>\
          <SECURED-I-PDU><SHORT-NAME>Msg_Sec</SHORT-NAME>\
            <PAYLOAD-REF>/Communication/PDUs/Payloads/NoSuchMsg</PAYLOAD-REF>\
          </SECURED-I-PDU>\
        </ELEMENTS></AR-PACKAGE>\
      </AR-PACKAGES></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";

    // Lenient extraction drops the record; strict surfaces the failure.
    let lenient = assemble(xml, &ExtractOptions::default()).unwrap();
    assert_eq!(lenient.len(), 1);

    let err = assemble(xml, &ExtractOptions { strict: true }).unwrap_err();
    match err {
        ArxmlError::UnresolvedReference(msg) => {
            assert!(msg.contains("Msg_Sec"));
            assert!(msg.contains("NoSuchMsg"));
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn strict_mode_reports_unresolved_multiplex_alternatives() {
    let xml = "<AUTOSAR><AR-PACKAGES><AR-PACKAGE><SHORT-NAME>Communication</SHORT-NAME><AR-PACKAGES>\
        <AR-PACKAGE><SHORT-NAME>PDUs</SHORT-NAME><ELEMENTS>\
          <MULTIPLEXED-I-PDU><SHORT-NAME>Mux</SHORT-NAME><LENGTH>4</LENGTH>\
            <SELECTOR-FIELD-BYTE-ORDER>MOST-SIGNIFICANT-BYTE-FIRST</SELECTOR-FIELD-BYTE-ORDER>\
            <SELECTOR-FIELD-LENGTH>4</SELECTOR-FIELD-LENGTH>\
            <SELECTOR-FIELD-START-POSITION>0</SELECTOR-FIELD-START-POSITION>\
            <DYNAMIC-PARTS><DYNAMIC-PART><DYNAMIC-PART-ALTERNATIVES>\
              <DYNAMIC-PART-ALTERNATIVE>\
                <I-PDU-REF>/Communication/PDUs/NoSuchMsg</I-PDU-REF>\
                <SELECTOR-FIELD-CODE>3</SELECTOR-FIELD-CODE>\
              </DYNAMIC-PART-ALTERNATIVE>\
            </DYNAMIC-PART-ALTERNATIVES></DYNAMIC-PART></DYNAMIC-PARTS>\
          </MULTIPLEXED-I-PDU>\
        </ELEMENTS></AR-PACKAGE>\
      </AR-PACKAGES></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";

    let doc = XmlDocument::parse(xml).unwrap();
    let root = doc.root().unwrap();
    let ctx = ResolutionContext::build(&[], &[], &[]);
    let mut warnings = Vec::new();

    let muxes = resolve_multiplex(
        root,
        &ctx,
        &[],
        &ExtractOptions::default(),
        &mut warnings,
    )
    .unwrap();
    assert!(muxes[0].alternatives.is_empty());

    let err = resolve_multiplex(
        root,
        &ctx,
        &[],
        &ExtractOptions { strict: true },
        &mut warnings,
    )
    .unwrap_err();
    match err {
        ArxmlError::UnresolvedReference(msg) => {
            assert!(msg.contains("Mux"));
            assert!(msg.contains("NoSuchMsg"));
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}
