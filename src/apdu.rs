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
//! APDU command construction and response pairing

use byteorder::{BigEndian, WriteBytesExt};

use crate::params::{InstructionCode, CLA_ISO};
use crate::status::StatusWord;
use crate::Error;

/// A structured APDU command, serialized as `CLA INS P1 P2 [Lc data] [Le]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    /// Class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data field (empty means no Lc/data is emitted)
    pub data: Vec<u8>,
    /// Expected response length byte, when requested
    pub le: Option<u8>,
}

impl ApduCommand {
    /// Serialize to wire bytes.
    ///
    /// The short Lc form carries at most 255 data bytes; longer data is
    /// rejected rather than silently truncated.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        if self.data.len() > 255 {
            return Err(Error::DataTooLong(self.data.len()));
        }

        let mut apdu = Vec::with_capacity(6 + self.data.len());
        apdu.push(self.cla);
        apdu.push(self.ins);
        apdu.push(self.p1);
        apdu.push(self.p2);
        if !self.data.is_empty() {
            apdu.push(self.data.len() as u8);
            apdu.extend_from_slice(&self.data);
        }
        if let Some(le) = self.le {
            apdu.push(le);
        }
        Ok(apdu)
    }
}

/// Response data paired with its status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    /// Response data field (may be empty)
    pub data: Vec<u8>,
    /// Trailing status word
    pub sw: StatusWord,
}

impl ApduResponse {
    /// Pair response data with its two status bytes
    pub fn new(data: Vec<u8>, sw1: u8, sw2: u8) -> Self {
        ApduResponse {
            data,
            sw: StatusWord::new(sw1, sw2),
        }
    }
}

/// SELECT by application identifier: `00 A4 04 00 Lc aid`
pub fn select_by_aid(aid: &[u8]) -> Result<Vec<u8>, Error> {
    ApduCommand {
        cla: CLA_ISO,
        ins: InstructionCode::Select as u8,
        p1: 0x04,
        p2: 0x00,
        data: aid.to_vec(),
        le: None,
    }
    .serialize()
}

/// SELECT by file identifier: `00 A4 02 0C 02 hi lo`
pub fn select_file(file_id: u16) -> Vec<u8> {
    let mut apdu = vec![CLA_ISO, InstructionCode::Select as u8, 0x02, 0x0C, 0x02];
    apdu.write_u16::<BigEndian>(file_id).unwrap();
    apdu
}

/// READ BINARY at a file offset: `00 B0 hi lo Le`.
///
/// An `le` of zero requests a full 256-byte chunk (ISO 7816-4 short Le).
pub fn read_binary(offset: u16, le: u8) -> Vec<u8> {
    let mut apdu = vec![CLA_ISO, InstructionCode::ReadBinary as u8];
    apdu.write_u16::<BigEndian>(offset).unwrap();
    apdu.push(le);
    apdu
}

/// GET RESPONSE continuation: `00 C0 00 00 Le`
pub fn get_response(le: u8) -> Vec<u8> {
    vec![
        CLA_ISO,
        InstructionCode::GetResponse as u8,
        0x00,
        0x00,
        le,
    ]
}
