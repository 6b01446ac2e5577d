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
#![deny(warnings, trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]

//! Protocol constants and parameter enums (class/instruction bytes, timing bases)

/// APDU Class byte for ISO 7816-4 interindustry commands
pub const CLA_ISO: u8 = 0x00;

/// APDU Class byte for PC/SC reader pseudo commands
pub const CLA_PSEUDO: u8 = 0xFF;

/// Carrier base clock used to derive TA1 timing figures (5 MHz typical)
pub const BASE_CLOCK_HZ: u32 = 5_000_000;

/// Largest chunk a short READ BINARY response can carry
pub const READ_CHUNK: usize = 256;

/// Offset of the contactless tag-type byte within a PC/SC-style ATR
pub const ATR_TAG_TYPE_OFFSET: usize = 13;

/// APDU instruction codes
#[repr(u8)]
pub enum InstructionCode {
    /// Select a file or application
    Select = 0xA4,
    /// Read from the selected transparent file
    ReadBinary = 0xB0,
    /// Fetch response data announced by SW1=61
    GetResponse = 0xC0,
    /// Retrieve a data object
    GetData = 0xCA,
}
