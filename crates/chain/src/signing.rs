//! Typed-data (EIP-712) signing requests.
//!
//! Requests travel from the swap/permit flows to whatever component holds
//! the user's consent (a popup, a CLI prompt) over an explicit channel. Each
//! request carries its own reply slot, so the requester awaits exactly the
//! answer to its request.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// EIP-712 domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
}

/// One member of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// EIP-712 payload as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub domain: Eip712Domain,
    pub types: BTreeMap<String, Vec<TypedDataField>>,
    pub message: serde_json::Map<String, serde_json::Value>,
    pub primary_type: String,
}

/// Request for `account` to sign `typed_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignTypedDataRequest {
    pub account: Address,
    pub typed_data: TypedData,
}

/// Errors returned to a signing requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Signing inbox is closed")]
    Closed,

    #[error("Signing request was dropped without an answer")]
    Abandoned,

    #[error("Signing request rejected: {0}")]
    Rejected(String),
}

/// A request waiting for the user's decision.
#[derive(Debug)]
pub struct PendingSignature {
    request: SignTypedDataRequest,
    reply: oneshot::Sender<Result<Bytes, SigningError>>,
}

impl PendingSignature {
    pub fn request(&self) -> &SignTypedDataRequest {
        &self.request
    }

    /// Answer with a signature.
    pub fn approve(self, signature: Bytes) {
        // Requester may have given up; nothing to report then.
        let _ = self.reply.send(Ok(signature));
    }

    /// Refuse the request.
    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.reply.send(Err(SigningError::Rejected(reason.into())));
    }
}

/// Sending half, cloned into every flow that needs signatures.
#[derive(Debug, Clone)]
pub struct SigningClient {
    sender: mpsc::Sender<PendingSignature>,
}

impl SigningClient {
    /// Ask for a typed-data signature and wait for the answer.
    pub async fn sign_typed_data(&self, request: SignTypedDataRequest) -> Result<Bytes, SigningError> {
        let (reply, answer) = oneshot::channel();

        debug!(
            account = %request.account,
            primary_type = %request.typed_data.primary_type,
            "Requesting typed data signature"
        );

        self.sender
            .send(PendingSignature { request, reply })
            .await
            .map_err(|_| SigningError::Closed)?;

        answer.await.map_err(|_| SigningError::Abandoned)?
    }
}

/// Receiving half, owned by the component that prompts the user.
#[derive(Debug)]
pub struct SigningInbox {
    receiver: mpsc::Receiver<PendingSignature>,
    last_request: Option<SignTypedDataRequest>,
}

impl SigningInbox {
    /// Next pending request; `None` once every client is dropped.
    pub async fn recv(&mut self) -> Option<PendingSignature> {
        let pending = self.receiver.recv().await?;
        self.last_request = Some(pending.request.clone());
        Some(pending)
    }

    /// Most recently received request.
    pub fn last_request(&self) -> Option<&SignTypedDataRequest> {
        self.last_request.as_ref()
    }
}

/// Create a bounded signing channel.
pub fn signing_channel(capacity: usize) -> (SigningClient, SigningInbox) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        SigningClient { sender },
        SigningInbox {
            receiver,
            last_request: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn permit_request() -> SignTypedDataRequest {
        let typed_data: TypedData = serde_json::from_value(json!({
            "domain": {
                "name": "Uniswap V2",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xb4e16d0168e52d35cacd2c6185b44281ec28c9dc"
            },
            "types": {
                "Permit": [
                    { "name": "owner", "type": "address" },
                    { "name": "spender", "type": "address" },
                    { "name": "value", "type": "uint256" },
                    { "name": "nonce", "type": "uint256" },
                    { "name": "deadline", "type": "uint256" }
                ]
            },
            "message": {
                "owner": "0x1111111111111111111111111111111111111111",
                "spender": "0x2222222222222222222222222222222222222222",
                "value": "1000",
                "nonce": "0",
                "deadline": "1700000000"
            },
            "primaryType": "Permit"
        }))
        .unwrap();

        SignTypedDataRequest {
            account: Address::repeat_byte(0x11),
            typed_data,
        }
    }

    #[test]
    fn test_typed_data_parses() {
        let request = permit_request();
        assert_eq!(request.typed_data.domain.chain_id, Some(1));
        assert_eq!(request.typed_data.types["Permit"].len(), 5);
        assert_eq!(request.typed_data.types["Permit"][2].kind, "uint256");
    }

    #[tokio::test]
    async fn test_sign_round_trip() {
        let (client, mut inbox) = signing_channel(4);

        let prompt = tokio::spawn(async move {
            let pending = inbox.recv().await.unwrap();
            assert_eq!(pending.request().typed_data.primary_type, "Permit");
            pending.approve(Bytes::from(vec![0xab; 65]));
            inbox
        });

        let signature = client.sign_typed_data(permit_request()).await.unwrap();
        assert_eq!(signature.len(), 65);

        let inbox = prompt.await.unwrap();
        assert_eq!(inbox.last_request(), Some(&permit_request()));
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let (client, mut inbox) = signing_channel(1);

        tokio::spawn(async move {
            let pending = inbox.recv().await.unwrap();
            pending.reject("user declined");
        });

        let err = client.sign_typed_data(permit_request()).await.unwrap_err();
        assert_eq!(err, SigningError::Rejected("user declined".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_request_is_abandoned() {
        let (client, mut inbox) = signing_channel(1);

        tokio::spawn(async move {
            let pending = inbox.recv().await.unwrap();
            drop(pending);
        });

        let err = client.sign_typed_data(permit_request()).await.unwrap_err();
        assert_eq!(err, SigningError::Abandoned);
    }

    #[tokio::test]
    async fn test_closed_inbox() {
        let (client, inbox) = signing_channel(1);
        drop(inbox);

        let err = client.sign_typed_data(permit_request()).await.unwrap_err();
        assert_eq!(err, SigningError::Closed);
    }
}
