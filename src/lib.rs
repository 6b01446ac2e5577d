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
//! Protocol layer for reading contactless smart cards (ISO 7816-4 / ISO 14443)
//!
//! Decodes what the card says — Answer-To-Reset structure and timing, status
//! words, TLV file contents — and speaks the select / chunked-read protocol
//! used to retrieve logical files that exceed a single APDU response. The
//! physical reader is consumed through the [`CardTransport`] seam; an optional
//! PC/SC backend is available behind the `pcsc` feature.

#![deny(warnings, trivial_casts, trivial_numeric_casts)]
#![deny(unused_import_braces, unused_qualifications)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/picc-reader/0.1.0")]

pub mod acr122;
pub mod apdu;
pub mod atr;
pub mod catalog;
pub mod params;
#[cfg(feature = "pcsc")]
pub mod reader;
pub mod session;
pub mod status;
pub mod tables;
pub mod tlv;
pub mod transport;

pub use apdu::{ApduCommand, ApduResponse};
pub use atr::{to_hex_string, AnswerToReset, ClockTiming, InterfaceBytes};
pub use catalog::{AtrCatalog, AtrCatalogEntry, MatchStrategy};
#[cfg(feature = "pcsc")]
pub use reader::PcscReader;
pub use session::{CardReader, FileReadSession, SessionState};
pub use status::StatusWord;
pub use tables::ClockFactor;
pub use tlv::{TlvEntry, TlvMap};
pub use transport::{CardTransport, TransportError};

/// Protocol layer error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The short Lc form carries at most 255 data bytes
    #[error("APDU data field is too long ({0} bytes, maximum is 255)")]
    DataTooLong(usize),

    /// The card rejected the SELECT or its GET RESPONSE continuation
    #[error("select rejected by the card: {}", .0.describe())]
    SelectFailed(StatusWord),

    /// The card rejected a READ BINARY command
    #[error("read rejected by the card: {}", .0.describe())]
    ReadFailed(StatusWord),

    /// The card rejected a one-shot command
    #[error("command rejected by the card: {}", .0.describe())]
    CommandFailed(StatusWord),

    /// A file read session can only be driven once
    #[error("file read session already finished")]
    SessionFinished,

    /// Failure raised by the transport backend, passed through untranslated
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
