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
//! File retrieval over the select / chunked-read protocol
//!
//! [`FileReadSession`] is the pagination state machine: SELECT the file,
//! follow an optional GET RESPONSE continuation, then loop READ BINARY in
//! chunks of at most 256 bytes until the requested cap is reached or the card
//! signals end-of-file with a short read. [`CardReader`] wraps a transport
//! and drives the session, alongside the other card-level operations.

use log::trace;

use crate::acr122;
use crate::apdu::{self, ApduResponse};
use crate::atr::to_hex_string;
use crate::params::READ_CHUNK;
use crate::status::StatusWord;
use crate::transport::{CardTransport, TransportError};
use crate::Error;

/// Where a file read session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing sent yet
    Idle,
    /// SELECT FILE sent, awaiting its status
    Selecting,
    /// SELECT answered 61xx, GET RESPONSE continuation in flight
    SelectMoreData,
    /// File selected, no READ BINARY issued yet
    Selected,
    /// Chunked READ BINARY loop in progress
    Reading,
    /// File content retrieved
    Done,
    /// The card rejected a command; the session stopped
    Failed,
}

/// One file retrieval: select, then read in chunks.
///
/// A session is single-use and exclusively owned by its caller. After a
/// protocol failure the partial buffer and the triggering status word remain
/// observable; whether partial data is usable is the caller's decision.
#[derive(Debug)]
pub struct FileReadSession {
    file_id: u16,
    max_length: u16,
    buffer: Vec<u8>,
    select_response: Vec<u8>,
    state: SessionState,
    last_status: Option<StatusWord>,
}

impl FileReadSession {
    /// Prepare a session for one file, reading at most `max_length` bytes
    pub fn new(file_id: u16, max_length: u16) -> Self {
        FileReadSession {
            file_id,
            max_length,
            buffer: Vec::new(),
            select_response: Vec::new(),
            state: SessionState::Idle,
            last_status: None,
        }
    }

    /// File identifier this session reads
    pub fn file_id(&self) -> u16 {
        self.file_id
    }

    /// Requested byte cap
    pub fn max_length(&self) -> u16 {
        self.max_length
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// File content accumulated so far (partial after a failure)
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the session, returning the accumulated file content
    pub fn into_data(self) -> Vec<u8> {
        self.buffer
    }

    /// FCI/continuation bytes returned by the SELECT phase
    pub fn select_response(&self) -> &[u8] {
        &self.select_response
    }

    /// Status word of the last response seen, if any was received
    pub fn last_status(&self) -> Option<StatusWord> {
        self.last_status
    }

    /// Drive the session to completion against a transport.
    ///
    /// A non-success status word moves the session to [`SessionState::Failed`]
    /// and is returned as the error; no retry is attempted here. Transport
    /// failures propagate untranslated.
    pub fn run<T: CardTransport>(&mut self, transport: &mut T) -> Result<(), Error> {
        if self.state != SessionState::Idle {
            return Err(Error::SessionFinished);
        }

        self.state = SessionState::Selecting;
        let response = self.exchange(transport, &apdu::select_file(self.file_id))?;
        match response.sw.sw1 {
            0x90 => {
                self.select_response.extend_from_slice(&response.data);
                self.state = SessionState::Selected;
            }
            0x61 => {
                self.select_response.extend_from_slice(&response.data);
                self.state = SessionState::SelectMoreData;
                let continuation =
                    self.exchange(transport, &apdu::get_response(response.sw.sw2))?;
                if continuation.sw.is_success() {
                    self.select_response.extend_from_slice(&continuation.data);
                    self.state = SessionState::Selected;
                } else {
                    self.state = SessionState::Failed;
                    return Err(Error::SelectFailed(continuation.sw));
                }
            }
            _ => {
                self.state = SessionState::Failed;
                return Err(Error::SelectFailed(response.sw));
            }
        }

        self.state = SessionState::Reading;
        while self.buffer.len() < usize::from(self.max_length) {
            // The buffer length is the next read offset at every iteration
            let remaining = usize::from(self.max_length) - self.buffer.len();
            let chunk = remaining.min(READ_CHUNK);
            let le = if chunk == READ_CHUNK { 0 } else { chunk as u8 };
            let response =
                self.exchange(transport, &apdu::read_binary(self.buffer.len() as u16, le))?;
            if !response.sw.is_success() {
                self.state = SessionState::Failed;
                return Err(Error::ReadFailed(response.sw));
            }
            let received = response.data.len();
            self.buffer.extend_from_slice(&response.data);
            if received < chunk {
                // Short read: end of file before the requested cap
                break;
            }
        }
        self.state = SessionState::Done;
        Ok(())
    }

    fn exchange<T: CardTransport>(
        &mut self,
        transport: &mut T,
        command: &[u8],
    ) -> Result<ApduResponse, TransportError> {
        let response = exchange(transport, command)?;
        self.last_status = Some(response.sw);
        Ok(response)
    }
}

/// High-level card operations over a transport.
///
/// Owns the transport for the lifetime of the card conversation, mirroring
/// the one-command-in-flight contract of the link.
pub struct CardReader<T: CardTransport> {
    transport: T,
}

impl<T: CardTransport> CardReader<T> {
    /// Wrap a connected transport
    pub fn new(transport: T) -> Self {
        CardReader { transport }
    }

    /// Give the transport back, e.g. to disconnect
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// SELECT an application by AID, following a 61xx GET RESPONSE
    /// continuation, and return the card's select response data
    pub fn select_application(&mut self, aid: &[u8]) -> Result<Vec<u8>, Error> {
        let command = apdu::select_by_aid(aid)?;
        let response = exchange(&mut self.transport, &command)?;
        match response.sw.sw1 {
            0x90 => Ok(response.data),
            0x61 => {
                let continuation =
                    exchange(&mut self.transport, &apdu::get_response(response.sw.sw2))?;
                if continuation.sw.is_success() {
                    let mut data = response.data;
                    data.extend_from_slice(&continuation.data);
                    Ok(data)
                } else {
                    Err(Error::SelectFailed(continuation.sw))
                }
            }
            _ => Err(Error::SelectFailed(response.sw)),
        }
    }

    /// Retrieve up to `max_length` bytes of a file through a
    /// [`FileReadSession`]
    pub fn read_file(&mut self, file_id: u16, max_length: u16) -> Result<Vec<u8>, Error> {
        let mut session = FileReadSession::new(file_id, max_length);
        session.run(&mut self.transport)?;
        Ok(session.into_data())
    }

    /// Contactless card UID via the PC/SC GET DATA pseudo-APDU
    pub fn uid(&mut self) -> Result<Vec<u8>, Error> {
        let response = exchange(&mut self.transport, &acr122::get_uid())?;
        if response.sw == StatusWord::new(0x90, 0x00) {
            Ok(response.data)
        } else {
            Err(Error::CommandFailed(response.sw))
        }
    }
}

/// Send one APDU, tracing the exchange
fn exchange<T: CardTransport>(
    transport: &mut T,
    command: &[u8],
) -> Result<ApduResponse, TransportError> {
    trace!(">> {}", to_hex_string(command));
    let response = transport.transmit(command)?;
    trace!("<< {} ({})", to_hex_string(&response.data), response.sw);
    Ok(response)
}
