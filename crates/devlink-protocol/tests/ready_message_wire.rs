//! Wire-level tests for ReadyMessage encoding and decoding

use devlink_protocol::{
    root_as_ready_message, Builder, CodecError, OwnedReadyMessage, OwnedWifiNetwork,
    ReadyMessage, ReadyMessageBuilder, WifiAuthMode, WifiNetwork,
};
use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, Table, Vector, WIPOffset};

fn full_message() -> OwnedReadyMessage {
    OwnedReadyMessage {
        poggies: true,
        rftx_pin: 27,
        account_linked: true,
        networks_saved: vec![
            "AA:BB".to_string(),
            "CC:DD".to_string(),
            "EE:FF".to_string(),
        ],
        network_connected: Some(OwnedWifiNetwork {
            ssid: Some("Garage".to_string()),
            bssid: Some("CC:DD".to_string()),
            channel: 1,
            rssi: -71,
            auth_mode: WifiAuthMode::Wpa2Psk,
            saved: true,
        }),
    }
}

fn decode(buf: &[u8]) -> OwnedReadyMessage {
    ReadyMessage::read_from(buf, 0).unwrap().unpack()
}

#[test]
fn test_roundtrip_all_fields() {
    let msg = full_message();
    let buf = msg.encode().unwrap();
    assert_eq!(decode(&buf), msg);
}

#[test]
fn test_roundtrip_partial_combinations() {
    let base = full_message();
    let variants = [
        OwnedReadyMessage {
            network_connected: None,
            ..base.clone()
        },
        OwnedReadyMessage {
            networks_saved: Vec::new(),
            ..base.clone()
        },
        OwnedReadyMessage {
            poggies: true,
            rftx_pin: 255,
            ..Default::default()
        },
        OwnedReadyMessage {
            account_linked: true,
            network_connected: Some(OwnedWifiNetwork::default()),
            ..Default::default()
        },
    ];
    for msg in variants {
        let buf = msg.encode().unwrap();
        assert_eq!(decode(&buf), msg);
    }
}

#[test]
fn test_roundtrip_all_defaults() {
    let buf = OwnedReadyMessage::default().encode().unwrap();
    let ready = ReadyMessage::read_from(&buf, 0).unwrap();

    assert!(!ready.poggies());
    assert_eq!(ready.rftx_pin(), 0);
    assert!(!ready.account_linked());
    assert!(ready.networks_saved().is_none());
    assert_eq!(ready.networks_saved_len(), 0);
    assert_eq!(ready.network_saved(0), None);
    assert!(ready.network_connected().is_none());
    assert_eq!(ready.unpack(), OwnedReadyMessage::default());
}

#[test]
fn test_defaults_are_not_written() {
    let mut b = Builder::new();
    let mut msg = ReadyMessageBuilder::new(&mut b).unwrap();
    msg.add_poggies(false).unwrap();
    msg.add_rftx_pin(0).unwrap();
    msg.add_account_linked(false).unwrap();
    let root = msg.finish().unwrap();
    b.finish(root).unwrap();
    let buf = b.finished_data().unwrap();

    let vtable = ReadyMessage::read_from(buf, 0).unwrap().table().vtable();
    for voffset in [
        ReadyMessage::VT_POGGIES,
        ReadyMessage::VT_RFTX_PIN,
        ReadyMessage::VT_ACCOUNT_LINKED,
        ReadyMessage::VT_NETWORKS_SAVED,
        ReadyMessage::VT_NETWORK_CONNECTED,
    ] {
        assert_eq!(vtable.get(voffset), 0);
    }
    // Only the soffset header is inline
    assert_eq!(vtable.object_inline_num_bytes(), 4);
    // Root offset, vtable [4, 4] and the table header
    assert_eq!(buf.len(), 12);
}

#[test]
fn test_vector_order_preserved() {
    let buf = full_message().encode().unwrap();
    let ready = ReadyMessage::read_from(&buf, 0).unwrap();
    let saved = ready.networks_saved().unwrap();

    assert_eq!(saved.len(), 3);
    assert_eq!(saved.get(0), "AA:BB");
    assert_eq!(saved.get(2), "EE:FF");
    let collected: Vec<&str> = saved.iter().collect();
    assert_eq!(collected, ["AA:BB", "CC:DD", "EE:FF"]);

    assert_eq!(ready.network_saved(2), Some("EE:FF"));
    assert_eq!(ready.network_saved(3), None);
}

#[test]
fn test_vector_built_element_by_element() {
    let mut b = Builder::new();
    let strings = ["AA:BB", "CC:DD", "EE:FF"]
        .iter()
        .map(|s| b.create_string(s))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    b.start_vector(strings.len()).unwrap();
    for s in strings.iter().rev() {
        b.push_offset(*s).unwrap();
    }
    let networks = b.end_vector(strings.len()).unwrap();
    let mut msg = ReadyMessageBuilder::new(&mut b).unwrap();
    msg.add_networks_saved(networks).unwrap();
    let root = msg.finish().unwrap();
    b.finish(root).unwrap();

    let buf = b.finished_data().unwrap();
    assert_eq!(
        decode(buf).networks_saved,
        ["AA:BB", "CC:DD", "EE:FF"]
    );
}

#[test]
fn test_nested_network_independent_of_outer_table() {
    let msg = full_message();
    let buf = msg.encode().unwrap();
    let ready = ReadyMessage::read_from(&buf, 0).unwrap();
    let network = ready.network_connected().unwrap();

    // The nested table has its own position and vtable
    assert_ne!(network.table().loc(), ready.table().loc());
    assert!(network.table().vtable() != ready.table().vtable());
    assert_eq!(network.ssid(), Some("Garage"));
    assert_eq!(network.rssi(), -71);

    // Same content encoded under a different outer layout decodes identically
    let other = OwnedReadyMessage {
        networks_saved: vec!["padding".repeat(20)],
        ..msg.clone()
    };
    let other_buf = other.encode().unwrap();
    let other_network = ReadyMessage::read_from(&other_buf, 0)
        .unwrap()
        .network_connected()
        .unwrap();
    assert_eq!(other_network.unpack(), network.unpack());
}

#[test]
fn test_truncated_buffers_fail_cleanly() {
    for len in 0..4 {
        let buf = vec![0u8; len];
        assert!(matches!(
            ReadyMessage::read_from(&buf, 0),
            Err(CodecError::TruncatedBuffer { .. })
        ));
    }
    assert!(matches!(
        ReadyMessage::read_size_prefixed(&[8, 0, 0, 0, 4, 0]),
        Err(CodecError::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_cut_short_buffer_never_panics() {
    let buf = full_message().encode().unwrap();
    for len in 0..buf.len() {
        let cut = &buf[..len];
        // A cut buffer is rejected up front or reads back completely
        if let Ok(ready) = ReadyMessage::read_from(cut, 0) {
            let _ = ready.unpack();
        }
    }
    // The first-written string sits at the end of the buffer
    assert!(matches!(
        root_as_ready_message(&buf[..buf.len() / 2]),
        Err(CodecError::TruncatedBuffer { .. })
    ));
}

#[test]
fn test_size_prefixed_matches_unprefixed() {
    let msg = full_message();
    let plain = msg.encode().unwrap();
    let prefixed = msg.encode_size_prefixed().unwrap();

    let from_plain = ReadyMessage::read_from(&plain, 0).unwrap();
    let from_prefixed = ReadyMessage::read_size_prefixed(&prefixed).unwrap();
    assert_eq!(from_plain.unpack(), from_prefixed.unpack());

    // Prepending a length to an unprefixed buffer is an equivalent frame
    let mut framed = (plain.len() as u32).to_le_bytes().to_vec();
    framed.extend_from_slice(&plain);
    assert_eq!(
        ReadyMessage::read_size_prefixed(&framed).unwrap().unpack(),
        msg
    );
}

#[test]
fn test_read_from_nonzero_start() {
    let msg = full_message();
    let plain = msg.encode().unwrap();
    let mut shifted = vec![0xEE; 8];
    shifted.extend_from_slice(&plain);

    // Offsets are relative, so the root can be read from its own position
    assert_eq!(
        ReadyMessage::read_from(&shifted, 8).unwrap().unpack(),
        msg
    );
}

#[test]
fn test_encoded_message_reads_through_plain_tables() {
    let buf = full_message().encode().unwrap();
    let root = unsafe { flatbuffers::root_unchecked::<Table>(&buf) };

    unsafe {
        assert_eq!(root.get::<bool>(ReadyMessage::VT_POGGIES, None), Some(true));
        assert_eq!(root.get::<u8>(ReadyMessage::VT_RFTX_PIN, None), Some(27));
        let saved = root
            .get::<ForwardsUOffset<Vector<ForwardsUOffset<&str>>>>(
                ReadyMessage::VT_NETWORKS_SAVED,
                None,
            )
            .unwrap();
        assert_eq!(saved.iter().collect::<Vec<_>>(), ["AA:BB", "CC:DD", "EE:FF"]);
        let network = root
            .get::<ForwardsUOffset<Table>>(ReadyMessage::VT_NETWORK_CONNECTED, None)
            .unwrap();
        assert_eq!(
            network.get::<ForwardsUOffset<&str>>(WifiNetwork::VT_SSID, None),
            Some("Garage")
        );
        assert_eq!(network.get::<i8>(WifiNetwork::VT_RSSI, None), Some(-71));
    }
}

#[test]
fn test_reads_buffer_from_bare_flatbuffer_builder() {
    let mut fbb = FlatBufferBuilder::new();
    let ssid = fbb.create_string("Home");
    let start = fbb.start_table();
    fbb.push_slot_always::<WIPOffset<_>>(WifiNetwork::VT_SSID, ssid);
    fbb.push_slot::<i8>(WifiNetwork::VT_RSSI, -40, 0);
    let network = fbb.end_table(start);

    let saved = ["AA:BB", "CC:DD"].map(|s| fbb.create_string(s));
    let saved = fbb.create_vector(&saved);
    let start = fbb.start_table();
    fbb.push_slot_always::<WIPOffset<_>>(ReadyMessage::VT_NETWORK_CONNECTED, network);
    fbb.push_slot_always::<WIPOffset<_>>(ReadyMessage::VT_NETWORKS_SAVED, saved);
    fbb.push_slot::<bool>(ReadyMessage::VT_ACCOUNT_LINKED, true, false);
    fbb.push_slot::<u8>(ReadyMessage::VT_RFTX_PIN, 15, 0);
    let root = fbb.end_table(start);
    fbb.finish_minimal(root);

    let ready = root_as_ready_message(fbb.finished_data()).unwrap();
    assert!(!ready.poggies());
    assert_eq!(ready.rftx_pin(), 15);
    assert!(ready.account_linked());
    assert_eq!(ready.network_saved(1), Some("CC:DD"));
    let network = ready.network_connected().unwrap();
    assert_eq!(network.ssid(), Some("Home"));
    assert_eq!(network.rssi(), -40);
    assert_eq!(network.bssid(), None);
}

#[test]
fn test_corrupt_buffers_are_rejected() {
    let buf = full_message().encode().unwrap();

    // Root offset pointing at an odd position
    let mut misaligned = buf.clone();
    misaligned[0] = 5;
    assert!(matches!(
        root_as_ready_message(&misaligned),
        Err(CodecError::Misaligned { offset: 5, .. })
    ));

    let at = buf
        .windows(5)
        .position(|w| w == b"EE:FF")
        .unwrap();

    let mut bad_utf8 = buf.clone();
    bad_utf8[at] = 0xFF;
    assert!(matches!(
        root_as_ready_message(&bad_utf8),
        Err(CodecError::InvalidEncoding { .. })
    ));

    // Overwrite the NUL terminator of the same string
    let mut unterminated = buf.clone();
    unterminated[at + 5] = b'!';
    assert!(matches!(
        root_as_ready_message(&unterminated),
        Err(CodecError::MalformedMessage(_))
    ));
}

#[test]
fn test_verifier_limits() {
    let buf = full_message().encode().unwrap();

    let shallow = flatbuffers::VerifierOptions {
        max_depth: 1,
        ..Default::default()
    };
    assert_eq!(
        ReadyMessage::read_from_with_opts(&shallow, &buf, 0).unwrap_err(),
        CodecError::DepthLimitExceeded
    );

    let few_tables = flatbuffers::VerifierOptions {
        max_tables: 1,
        ..Default::default()
    };
    assert_eq!(
        ReadyMessage::read_from_with_opts(&few_tables, &buf, 0).unwrap_err(),
        CodecError::TableLimitExceeded
    );

    let tiny = flatbuffers::VerifierOptions {
        max_apparent_size: 16,
        ..Default::default()
    };
    assert_eq!(
        ReadyMessage::read_from_with_opts(&tiny, &buf, 0).unwrap_err(),
        CodecError::SizeLimitExceeded
    );
}
