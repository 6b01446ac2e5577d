/*******************************************************************************
*   (c) 2020 ZondaX GmbH
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! Integration tests

#![deny(warnings, trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]

extern crate picc_reader;

use once_cell::sync::Lazy;

use picc_reader::{
    AnswerToReset, ApduResponse, AtrCatalog, CardReader, CardTransport, Error, FileReadSession,
    MatchStrategy, SessionState, TlvMap, TransportError,
};

static CATALOG: Lazy<AtrCatalog> = Lazy::new(|| {
    AtrCatalog::parse(
        "\
# excerpt from atr.txt
3B 8F 80 01 80 4F 0C A0 00 00 03 06 PC/SC compliant contactless reader
3B 88 80 01 00 00 00 00 33 81 81 00 3A
National identity card
3B 8F 80 01 80 4F Shorter wildcard entry
",
    )
});

/// Replays scripted responses and records every command sent
struct ScriptedTransport {
    responses: Vec<ApduResponse>,
    sent: Vec<Vec<u8>>,
}

impl ScriptedTransport {
    fn new(mut responses: Vec<ApduResponse>) -> Self {
        responses.reverse();
        ScriptedTransport {
            responses,
            sent: Vec::new(),
        }
    }
}

impl CardTransport for ScriptedTransport {
    fn transmit(&mut self, command: &[u8]) -> Result<ApduResponse, TransportError> {
        self.sent.push(command.to_vec());
        self.responses
            .pop()
            .ok_or(TransportError::ConnectionLost)
    }
}

fn ok(data: Vec<u8>) -> ApduResponse {
    ApduResponse::new(data, 0x90, 0x00)
}

#[test]
fn catalog_fixture_loads() {
    assert_eq!(CATALOG.len(), 3);
}

#[test]
fn atr_identification_end_to_end() {
    // ACR122U-style ATR carrying the MIFARE DESFire tag-type byte
    let raw = hex::decode("3b8f8001804f0ca000000306032800000000006a").unwrap();
    let atr = AnswerToReset::decode(&raw, &CATALOG);

    assert!(!atr.too_short);
    assert_eq!(atr.tag_type, "MIFARE DESFire");
    assert_eq!(
        atr.hex_string(),
        "3B 8F 80 01 80 4F 0C A0 00 00 03 06 03 28 00 00 00 00 00 6A"
    );

    // Two catalog entries match; the one earlier in the file wins
    let hit = atr.catalog_match.as_ref().unwrap();
    assert_eq!(hit.description, "PC/SC compliant contactless reader");

    // The longest-prefix strategy picks the more specific key instead
    let longest = CATALOG
        .lookup_with(&atr.hex_string(), MatchStrategy::LongestPrefix)
        .unwrap();
    assert_eq!(
        longest.prefix,
        "3B 8F 80 01 80 4F 0C A0 00 00 03 06"
    );
}

#[test]
fn application_select_with_continuation() {
    let aid = hex::decode("a000000167455349474e").unwrap();
    let mut reader = CardReader::new(ScriptedTransport::new(vec![
        ApduResponse::new(hex::decode("6f10").unwrap(), 0x61, 0x04),
        ok(hex::decode("84024f10").unwrap()),
    ]));

    let fci = reader.select_application(&aid).unwrap();
    assert_eq!(hex::encode(&fci), "6f1084024f10");
}

#[test]
fn application_select_sends_expected_apdus() {
    let aid = hex::decode("d27600012401").unwrap();
    let mut transport = ScriptedTransport::new(vec![ok(vec![])]);
    {
        let mut reader = CardReader::new(&mut transport);
        reader.select_application(&aid).unwrap();
    }
    assert_eq!(hex::encode(&transport.sent[0]), "00a4040006d27600012401");
}

#[test]
fn application_select_rejection() {
    let mut reader = CardReader::new(ScriptedTransport::new(vec![ApduResponse::new(
        vec![],
        0x6A,
        0x82,
    )]));
    let err = reader.select_application(&[0x01, 0x02, 0x03]).unwrap_err();
    match err {
        Error::SelectFailed(sw) => {
            assert_eq!(sw.describe(), "Error - File or application not found")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn file_read_and_tlv_parse_end_to_end() {
    // File content: a small TLV record split across two read chunks
    let mut content = vec![0x5B, 0x82, 0x01, 0x09];
    content.extend(vec![0x41; 265]);
    content.extend(&[0x4F, 0x02, 0xA0, 0x01]);
    assert_eq!(content.len(), 273);

    let mut reader = CardReader::new(ScriptedTransport::new(vec![
        ok(vec![]),
        ok(content[..256].to_vec()),
        ok(content[256..].to_vec()),
    ]));

    let data = reader.read_file(0x0010, 273).unwrap();
    assert_eq!(data, content);

    let tlv = TlvMap::parse(&data);
    assert_eq!(tlv.len(), 2);
    assert_eq!(tlv.get(0x5B).map(|v| v.len()), Some(265));
    assert_eq!(tlv.get(0x4F), Some(&[0xA0, 0x01][..]));
}

#[test]
fn file_read_stops_at_end_of_file() {
    let mut transport = ScriptedTransport::new(vec![ok(vec![]), ok(vec![0x37; 80])]);

    let mut session = FileReadSession::new(0x2F00, 1024);
    session.run(&mut transport).unwrap();

    assert_eq!(session.state(), SessionState::Done);
    assert_eq!(session.data().len(), 80);
    // SELECT FILE for 2F00, then a single READ BINARY
    assert_eq!(hex::encode(&transport.sent[0]), "00a4020c022f00");
    assert_eq!(transport.sent.len(), 2);
}

#[test]
fn failed_read_reports_status_and_partial_data() {
    let mut transport = ScriptedTransport::new(vec![
        ok(vec![]),
        ok(vec![0x11; 256]),
        ApduResponse::new(vec![], 0x69, 0x82),
    ]);

    let mut session = FileReadSession::new(0x0001, 400);
    let err = session.run(&mut transport).unwrap_err();

    match err {
        Error::ReadFailed(sw) => {
            assert_eq!(sw.describe(), "Error - Security condition not satisfied")
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.data().len(), 256);
    assert_eq!(session.last_status().unwrap().code(), 0x6982);
}

#[test]
fn transport_error_passes_through_the_reader() {
    let mut reader = CardReader::new(ScriptedTransport::new(vec![]));
    let err = reader.read_file(0x0001, 16).unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::ConnectionLost)
    ));
}
