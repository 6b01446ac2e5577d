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
//! ACR122U reader pseudo-APDUs
//!
//! The ACR122U exposes reader-side operations through class FF pseudo-APDUs,
//! some of which wrap PN532 frames. These never reach the card's ISO 7816
//! layer; they are answered by the reader itself.

use crate::params::{InstructionCode, CLA_PSEUDO};

/// GET DATA pseudo-APDU for the contactless card UID: `FF CA 00 00 00`
pub fn get_uid() -> Vec<u8> {
    vec![CLA_PSEUDO, InstructionCode::GetData as u8, 0x00, 0x00, 0x00]
}

/// Reader firmware version request: `FF 00 48 00 00`
pub fn firmware_version() -> Vec<u8> {
    vec![CLA_PSEUDO, 0x00, 0x48, 0x00, 0x00]
}

/// Read the PICC operating parameter byte: `FF 00 50 00 00`
pub fn get_picc_operating_parameter() -> Vec<u8> {
    vec![CLA_PSEUDO, 0x00, 0x50, 0x00, 0x00]
}

/// Write the PICC operating parameter byte: `FF 00 51 p 00`
pub fn set_picc_operating_parameter(parameter: u8) -> Vec<u8> {
    vec![CLA_PSEUDO, 0x00, 0x51, parameter, 0x00]
}

/// PN532 GetGeneralStatus wrapped in a pseudo-APDU: `FF 00 00 00 02 D4 04`
pub fn get_general_status() -> Vec<u8> {
    vec![CLA_PSEUDO, 0x00, 0x00, 0x00, 0x02, 0xD4, 0x04]
}

/// One target currently seen by the PN532 field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    /// Logical target number
    pub logical_number: u8,
    /// Receive bit rate
    pub rx_rate: &'static str,
    /// Transmit bit rate
    pub tx_rate: &'static str,
    /// Modulation type
    pub modulation: &'static str,
}

/// Decoded PN532 GetGeneralStatus response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderStatus {
    /// Last error reported by the controller
    pub error: &'static str,
    /// External RF field indication
    pub field: &'static str,
    /// Targets currently tracked
    pub targets: Vec<TargetStatus>,
}

impl ReaderStatus {
    /// Decode a `D5 05 [Err] [Field] [NbTg] (target…)` status response.
    ///
    /// Returns `None` when the buffer does not carry a status response.
    /// Targets truncated by a short buffer are dropped rather than faulted.
    pub fn parse(data: &[u8]) -> Option<ReaderStatus> {
        if data.len() < 5 || data[0] != 0xD5 || data[1] != 0x05 {
            return None;
        }

        let count = data[4] as usize;
        let mut targets = Vec::with_capacity(count);
        for i in 0..count {
            let base = 5 + i * 5;
            if base + 4 > data.len() {
                break;
            }
            targets.push(TargetStatus {
                logical_number: data[base],
                rx_rate: baud_name(data[base + 1]),
                tx_rate: baud_name(data[base + 2]),
                modulation: modulation_name(data[base + 3]),
            });
        }

        Some(ReaderStatus {
            error: error_name(data[2]),
            field: field_name(data[3]),
            targets,
        })
    }
}

fn error_name(code: u8) -> &'static str {
    match code {
        0x00 => "No error",
        0x01 => "RF buffer overflow",
        0x02 => "RF field not present",
        0x03 => "Protocol error",
        0x04 => "Parity error",
        0x05 => "CRC error",
        0x06 => "Framing error",
        0x07 => "Bit collision",
        0x08 => "Buffer overflow",
        0x09 => "Access error",
        0x0A => "Unknown command",
        0x0B => "Hardware error",
        0x0C => "Aborted",
        0x0D => "Invalid parameter",
        0x0E => "Invalid checksum",
        0x0F => "Invalid start byte",
        0x10 => "Unknown error",
        _ => "Unknown error",
    }
}

fn field_name(code: u8) -> &'static str {
    match code {
        0x00 => "RF field not present",
        0x01 => "RF field present",
        _ => "Unknown",
    }
}

fn baud_name(code: u8) -> &'static str {
    match code {
        0x00 => "106 kbps",
        0x01 => "212 kbps",
        0x02 => "424 kbps",
        _ => "Unknown",
    }
}

fn modulation_name(code: u8) -> &'static str {
    match code {
        0x00 => "ISO14443 or MIFARE",
        0x01 => "Active mode",
        0x02 => "Innovision Jewel",
        0x10 => "Felica",
        _ => "Unknown",
    }
}
