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
//! Transport seam between the protocol layer and a concrete reader backend
//!
//! The link is half-duplex with one in-flight command per connection, so the
//! trait is synchronous and takes `&mut self`. Connection lifecycle (reader
//! enumeration, connect, disconnect) belongs to the backend, not to this
//! crate's protocol layer.

use crate::apdu::ApduResponse;

/// Capability to exchange one APDU with the card
pub trait CardTransport {
    /// Send a command APDU and block until the card's response arrives
    fn transmit(&mut self, command: &[u8]) -> Result<ApduResponse, TransportError>;
}

impl<'a, T: CardTransport + ?Sized> CardTransport for &'a mut T {
    fn transmit(&mut self, command: &[u8]) -> Result<ApduResponse, TransportError> {
        (**self).transmit(command)
    }
}

/// Failure raised by a transport backend.
///
/// These are fatal to the current card session and propagate to the caller
/// untranslated; retrying is a connection-lifecycle decision made above the
/// protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No card is present in the reader
    #[error("no card present in the reader")]
    NoCard,

    /// The card was removed or the connection dropped mid-session
    #[error("card connection lost")]
    ConnectionLost,

    /// Any other backend failure
    #[error("transport failure: {0}")]
    Backend(String),
}
