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
//! PC/SC transport backend (feature `pcsc`)
//!
//! Concrete [`CardTransport`] over the system PC/SC stack. Owns the whole
//! connection lifecycle the protocol layer stays out of: context, reader
//! enumeration, connect, ATR retrieval.

use pcsc::{Card, Context, Protocols, Scope, ShareMode};

use crate::apdu::ApduResponse;
use crate::transport::{CardTransport, TransportError};

/// A connected PC/SC reader exchanging APDUs with the present card
pub struct PcscReader {
    card: Card,
}

impl PcscReader {
    /// Connect to the present card, preferring an ACR122U reader by name and
    /// falling back to the first reader on the system
    pub fn connect() -> Result<Self, TransportError> {
        let context = Context::establish(Scope::User).map_err(map_err)?;

        let mut buffer = [0u8; 2048];
        let names: Vec<_> = context.list_readers(&mut buffer).map_err(map_err)?.collect();
        if names.is_empty() {
            return Err(TransportError::Backend("no card readers found".to_string()));
        }
        let chosen = names
            .iter()
            .copied()
            .find(|name| name.to_string_lossy().contains("ACR122"))
            .unwrap_or(names[0]);

        let card = context
            .connect(chosen, ShareMode::Shared, Protocols::ANY)
            .map_err(map_err)?;
        Ok(PcscReader { card })
    }

    /// Names of the readers currently attached to the system
    pub fn list() -> Result<Vec<String>, TransportError> {
        let context = Context::establish(Scope::User).map_err(map_err)?;
        let mut buffer = [0u8; 2048];
        let names = context.list_readers(&mut buffer).map_err(map_err)?;
        Ok(names.map(|name| name.to_string_lossy().into_owned()).collect())
    }

    /// ATR the reader captured for the present card
    pub fn atr(&self) -> Result<Vec<u8>, TransportError> {
        let status = self.card.status2_owned().map_err(map_err)?;
        Ok(status.atr().to_vec())
    }

    /// Disconnect, leaving the card powered
    pub fn disconnect(self) -> Result<(), TransportError> {
        self.card
            .disconnect(pcsc::Disposition::LeaveCard)
            .map_err(|(_, err)| map_err(err))
    }
}

impl CardTransport for PcscReader {
    fn transmit(&mut self, command: &[u8]) -> Result<ApduResponse, TransportError> {
        let mut buffer = [0u8; pcsc::MAX_BUFFER_SIZE];
        let response = self.card.transmit(command, &mut buffer).map_err(map_err)?;
        if response.len() < 2 {
            return Err(TransportError::Backend(
                "response shorter than a status word".to_string(),
            ));
        }
        let (data, sw) = response.split_at(response.len() - 2);
        Ok(ApduResponse::new(data.to_vec(), sw[0], sw[1]))
    }
}

fn map_err(err: pcsc::Error) -> TransportError {
    match err {
        pcsc::Error::NoSmartcard => TransportError::NoCard,
        pcsc::Error::RemovedCard | pcsc::Error::ResetCard => TransportError::ConnectionLost,
        other => TransportError::Backend(other.to_string()),
    }
}
