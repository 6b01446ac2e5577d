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
//! Answer-To-Reset decoding
//!
//! Structural decoding of the ATR byte sequence a card sends on activation:
//! interface byte presence, TA1 timing derivation, historical bytes, the
//! PC/SC contactless tag-type byte, and catalog identification. Decoding is
//! total; missing or malformed pieces degrade to `Unknown`/`None`, never to
//! an error.

use crate::catalog::{AtrCatalog, AtrCatalogEntry};
use crate::params::{ATR_TAG_TYPE_OFFSET, BASE_CLOCK_HZ};
use crate::tables::{di_factor, fi_factor, tag_type_name, ClockFactor};

/// Space-separated uppercase two-digit hex rendering, e.g. `"3B 8F 80"`.
///
/// This is the canonical form the ATR catalog is keyed by.
pub fn to_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Presence flags for the first set of interface bytes, from T0's high nibble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceBytes {
    /// TA1 present (bit 5 of T0)
    pub ta1: bool,
    /// TB1 present (bit 6 of T0)
    pub tb1: bool,
    /// TC1 present (bit 7 of T0)
    pub tc1: bool,
    /// TD1 present (bit 8 of T0)
    pub td1: bool,
}

impl InterfaceBytes {
    fn from_t0(t0: u8) -> Self {
        InterfaceBytes {
            ta1: t0 & 0x10 != 0,
            tb1: t0 & 0x20 != 0,
            tc1: t0 & 0x40 != 0,
            td1: t0 & 0x80 != 0,
        }
    }
}

/// Clock and baud rate parameters derived from the TA1 interface byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTiming {
    /// High nibble of TA1
    pub fi_index: u8,
    /// Low nibble of TA1
    pub di_index: u8,
    /// Resolved clock rate conversion factor
    pub fi: ClockFactor,
    /// Resolved baud rate adjustment factor
    pub di: ClockFactor,
}

impl ClockTiming {
    /// Split TA1 into its Fi/Di nibbles and resolve both tables
    pub fn from_ta1(ta1: u8) -> Self {
        let fi_index = (ta1 >> 4) & 0x0F;
        let di_index = ta1 & 0x0F;
        ClockTiming {
            fi_index,
            di_index,
            fi: fi_factor(fi_index),
            di: di_factor(di_index),
        }
    }

    /// True when both factors resolve to usable values
    pub fn is_calculable(&self) -> bool {
        self.fi.value().is_some() && self.di.value().is_some()
    }

    /// Card clock frequency in Hz against the 5 MHz base.
    ///
    /// `None` when either factor is RFU: neither figure can be calculated.
    pub fn clock_frequency(&self) -> Option<f64> {
        match (self.fi.value(), self.di.value()) {
            (Some(fi), Some(_)) => Some(f64::from(BASE_CLOCK_HZ) / f64::from(fi)),
            _ => None,
        }
    }

    /// Maximum baud rate in bits per second, `None` when not calculable
    pub fn max_baud_rate(&self) -> Option<f64> {
        match (self.fi.value(), self.di.value()) {
            (Some(fi), Some(di)) => {
                Some(f64::from(BASE_CLOCK_HZ) / f64::from(fi) / f64::from(di))
            }
            _ => None,
        }
    }
}

/// Structured view of a raw ATR
#[derive(Debug, Clone)]
pub struct AnswerToReset {
    /// Raw ATR bytes as received from the card
    pub raw: Vec<u8>,
    /// Set when the ATR is too short to carry the tag-type byte
    pub too_short: bool,
    /// Interface byte presence flags from T0
    pub interface_bytes: InterfaceBytes,
    /// TA1 interface byte, when T0 announces it
    pub ta1: Option<u8>,
    /// Historical bytes (clamped to what the raw sequence actually carries)
    pub historical: Vec<u8>,
    /// Raw tag-type byte at offset 13, when present
    pub tag_type_code: Option<u8>,
    /// Contactless chip name, `"Unknown"` for unmapped or missing codes
    pub tag_type: &'static str,
    /// Timing parameters, when TA1 is present
    pub timing: Option<ClockTiming>,
    /// First catalog entry matching this ATR
    pub catalog_match: Option<AtrCatalogEntry>,
}

impl AnswerToReset {
    /// Decode a raw ATR and identify it against a catalog.
    ///
    /// Never fails: an empty or truncated sequence yields a descriptor with
    /// the affected fields at their `Unknown`/`None` defaults.
    pub fn decode(raw: &[u8], catalog: &AtrCatalog) -> AnswerToReset {
        let interface_bytes = raw.get(1).copied().map(InterfaceBytes::from_t0).unwrap_or_default();
        let historical_count = raw.get(1).map(|t0| (t0 & 0x0F) as usize).unwrap_or(0);

        // Walk the interface byte chain to find TA1 and the historical bytes
        let mut cursor = 2usize;
        let mut ta1 = None;
        if interface_bytes.ta1 {
            ta1 = raw.get(cursor).copied();
            cursor += 1;
        }
        if interface_bytes.tb1 {
            cursor += 1;
        }
        if interface_bytes.tc1 {
            cursor += 1;
        }
        let mut td = if interface_bytes.td1 {
            let value = raw.get(cursor).copied();
            cursor += 1;
            value
        } else {
            None
        };
        while let Some(byte) = td {
            let mask = byte >> 4;
            cursor += usize::from(mask & 0x1 != 0)
                + usize::from(mask & 0x2 != 0)
                + usize::from(mask & 0x4 != 0);
            td = if mask & 0x8 != 0 {
                let value = raw.get(cursor).copied();
                cursor += 1;
                value
            } else {
                None
            };
        }

        let start = cursor.min(raw.len());
        let end = (cursor + historical_count).min(raw.len());
        let historical = raw[start..end].to_vec();

        let tag_type_code = raw.get(ATR_TAG_TYPE_OFFSET).copied();
        let tag_type = tag_type_code.map(tag_type_name).unwrap_or("Unknown");

        AnswerToReset {
            too_short: raw.len() <= ATR_TAG_TYPE_OFFSET,
            interface_bytes,
            ta1,
            historical,
            tag_type_code,
            tag_type,
            timing: ta1.map(ClockTiming::from_ta1),
            catalog_match: catalog.lookup(&to_hex_string(raw)).cloned(),
            raw: raw.to_vec(),
        }
    }

    /// The catalog-form rendering of the raw bytes
    pub fn hex_string(&self) -> String {
        to_hex_string(&self.raw)
    }
}
