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
//! ISO 7816-4 status word (SW1/SW2) decoding
//!
//! Every APDU response ends with a two-byte status word. [`StatusWord::describe`]
//! turns it into a human-readable classification: well-known codes resolve
//! through an exact-match table, everything else falls back to SW1-keyed family
//! messages that embed SW2.

use std::fmt;

/// The two status bytes ending every APDU response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWord {
    /// First status byte (SW1)
    pub sw1: u8,
    /// Second status byte (SW2)
    pub sw2: u8,
}

impl StatusWord {
    /// Pair the two status bytes of a response
    pub fn new(sw1: u8, sw2: u8) -> Self {
        StatusWord { sw1, sw2 }
    }

    /// Composite 16-bit code, `SW1 << 8 | SW2`
    #[inline]
    pub fn code(&self) -> u16 {
        (u16::from(self.sw1) << 8) | u16::from(self.sw2)
    }

    /// Normal processing (SW1 = 90)
    #[inline]
    pub fn is_success(&self) -> bool {
        self.sw1 == 0x90
    }

    /// More response data can be fetched with GET RESPONSE (SW1 = 61)
    #[inline]
    pub fn is_more_data(&self) -> bool {
        self.sw1 == 0x61
    }

    /// Remaining verification tries encoded in a 63Cx warning
    #[inline]
    pub fn retries_left(&self) -> Option<u8> {
        if self.sw1 == 0x63 && (self.sw2 & 0xF0) == 0xC0 {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Human-readable classification of this status word.
    ///
    /// Total over all 65536 codes: exact matches win, SW1 families fall back to
    /// a parameterized message, anything else reports the raw code.
    pub fn describe(&self) -> String {
        if let Some(msg) = exact_description(self.code()) {
            return msg.to_string();
        }

        match self.sw1 {
            0x61 => format!("{} bytes of response data available", self.sw2),
            0x6C => format!(
                "Wrong length - Expected Le={:02X} ({}) bytes",
                self.sw2, self.sw2
            ),
            0x62 => format!("Warning - State unchanged (SW2={:02X})", self.sw2),
            0x63 if (self.sw2 & 0xF0) == 0xC0 => format!(
                "Warning - Verification failed, {} tries left",
                self.sw2 & 0x0F
            ),
            0x63 => format!("Warning - State changed (SW2={:02X})", self.sw2),
            0x64 => format!("Error - State unchanged (SW2={:02X})", self.sw2),
            0x65 => format!("Error - State changed (SW2={:02X})", self.sw2),
            0x66 => format!("Error - Security related issue (SW2={:02X})", self.sw2),
            0x67 => format!("Error - Wrong length (SW2={:02X})", self.sw2),
            0x68 => format!(
                "Error - Functions in CLA not supported (SW2={:02X})",
                self.sw2
            ),
            0x69 => format!("Error - Command not allowed (SW2={:02X})", self.sw2),
            0x6A => format!("Error - Wrong parameters P1-P2 (SW2={:02X})", self.sw2),
            0x6B => format!("Error - Wrong parameters P1-P2 (SW2={:02X})", self.sw2),
            0x6D => format!("Error - Instruction not supported (SW2={:02X})", self.sw2),
            0x6E => format!("Error - Class not supported (SW2={:02X})", self.sw2),
            0x6F => format!("Error - No precise diagnosis (SW2={:02X})", self.sw2),
            0x90 => format!("Success (SW2={:02X})", self.sw2),
            0x92 => format!("MIFARE specific error (SW2={:02X})", self.sw2),
            0x93 => format!(
                "MIFARE permission/application error (SW2={:02X})",
                self.sw2
            ),
            0x94 => format!(
                "MIFARE/Java Card algorithm error (SW2={:02X})",
                self.sw2
            ),
            _ => format!("Unknown status code {:02X}{:02X}", self.sw1, self.sw2),
        }
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// Exact-match descriptions for well-known status codes.
///
/// Consulted before the SW1 family fallbacks; composite codes such as 6A82
/// must resolve here rather than through the less specific family message.
fn exact_description(code: u16) -> Option<&'static str> {
    let msg = match code {
        // Success codes
        0x9000 => "Success - Normal processing",
        0x9001 => "Success - Normal processing with extra information",

        // Warning codes (61xx)
        0x6181 => "Warning - Part of returned data may be corrupted",
        0x6182 => "Warning - End of file reached before reading expected number of bytes",
        0x6183 => "Warning - Selected file invalidated",
        0x6184 => "Warning - File control information not formatted",
        0x6185 => "Warning - Selected file in termination state",
        0x6186 => "Warning - No input data available from sensor",
        0x6187 => "Warning - At least one try left",
        0x6188 => "Warning - Last try left",

        // Execution errors (62xx-63xx)
        0x6200 => "Warning - Information added by the card (card gives information)",
        0x6281 => "Warning - Part of returned data may be corrupted",
        0x6282 => "Warning - End of file reached before reading Le bytes",
        0x6283 => "Warning - Selected file invalidated",
        0x6284 => "Warning - File control information not formatted according to 5.3.3",
        0x6285 => "Warning - Selected file in termination state",
        0x6286 => "Warning - No input data available from a sensor on the card",
        0x6300 => "Warning - Authentication failed",
        0x6381 => "Warning - File filled up by the last write",
        0x6382 => "Warning - Card key not supported",
        0x6383 => "Warning - Reader key not supported",
        0x6384 => "Warning - Plaintext transmission not supported",
        0x6385 => "Warning - Secured transmission not supported",
        0x6386 => "Warning - Volatile memory is not available",
        0x6387 => "Warning - Non-volatile memory is not available",
        0x6388 => "Warning - Key number not valid",
        0x6389 => "Warning - Key length is not correct",

        // Checking errors (64xx-65xx)
        0x6400 => "Error - Execution error",
        0x6401 => "Error - Immediate response required by the card",
        0x6481 => "Error - Memory failure",
        0x6500 => "Error - No information given",
        0x6501 => "Error - Write problem / Memory failure / Unknown mode",
        0x6581 => "Error - Memory failure",

        // Wrong length (6Cxx)
        0x6C00 => "Error - Wrong length Le",

        // Functions in CLA not supported (68xx)
        0x6800 => "Error - Functions in CLA not supported",
        0x6881 => "Error - Logical channel not supported",
        0x6882 => "Error - Secure messaging not supported",
        0x6883 => "Error - Last command of the chain expected",
        0x6884 => "Error - Command chaining not supported",

        // Command not allowed (69xx)
        0x6900 => "Error - Command not allowed",
        0x6981 => "Error - Command incompatible with file structure",
        0x6982 => "Error - Security condition not satisfied",
        0x6983 => "Error - Authentication method blocked",
        0x6984 => "Error - Referenced data reversibly blocked (invalidated)",
        0x6985 => "Error - Conditions of use not satisfied",
        0x6986 => "Error - Command not allowed (no current EF)",
        0x6987 => "Error - Expected secure messaging data objects missing",
        0x6988 => "Error - Incorrect secure messaging data objects",

        // Wrong parameters (6Axx)
        0x6A00 => "Error - Wrong parameter(s) P1-P2",
        0x6A80 => "Error - Incorrect parameters in the data field",
        0x6A81 => "Java Card - Card locked or function not supported",
        0x6A82 => "Error - File or application not found",
        0x6A83 => "Error - Record not found",
        0x6A84 => "Error - Not enough memory space in the file",
        0x6A85 => "Error - Nc inconsistent with TLV structure",
        0x6A86 => "Error - Incorrect parameters P1-P2",
        0x6A87 => "Error - Nc inconsistent with parameters P1-P2",
        0x6A88 => "Error - Referenced data not found",
        0x6A89 => "Error - File already exists",
        0x6A8A => "Error - DF name already exists",

        // Wrong parameters (6Bxx)
        0x6B00 => "Error - Wrong parameter(s) P1-P2",

        // Instruction code not supported (6Dxx)
        0x6D00 => "Error - Instruction code not supported or invalid",

        // Class not supported (6Exx)
        0x6E00 => "Error - Class not supported",

        // Application errors (6Fxx)
        0x6F00 => "Error - No precise diagnosis",
        0x6FFF => "Error - Card dead (no answer to reset)",

        // Proprietary/vendor specific codes
        0x9240 => "MIFARE - Authentication error",
        0x9302 => "MIFARE - Permission denied",
        0x9303 => "MIFARE - Application not found",
        0x9310 => "MIFARE - Application already exists",
        0x9320 => "MIFARE - File not found",
        0x9321 => "MIFARE - File already exists",
        0x9322 => "MIFARE - File is read only",
        0x9381 => "MIFARE - Current authentication status does not allow the requested command",
        0x9400 => "MIFARE - Length error",
        0x9401 => "MIFARE - Invalid key number specified",
        0x9402 => "MIFARE - Application keys are locked",

        // Java Card specific
        0x6999 => "Java Card - Applet selection failed",
        0x9484 => "Java Card - Algorithm not supported",
        0x9485 => "Java Card - Invalid key for use in the specified context",

        _ => return None,
    };
    Some(msg)
}
