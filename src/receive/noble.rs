//! Attested mints on Noble.

use cosmrs::{tx::Fee, Coin};
use tracing::{info, warn};

use crate::clients::{Clients, MsgReceiveMessage};
use crate::error::{PathwayError, Result};
use crate::message::ReceiveMessage;
use crate::spans;

use super::ReceiveOutcome;

/// Flat uusdc fee attached to a Noble mint transaction.
const RECEIVE_TX_FEE: u128 = 15_000;
/// Headroom over the simulated gas.
const GAS_MULTIPLIER: f64 = 1.2;

/// Sign and broadcast `MsgReceiveMessage` from the relayer's Noble account.
pub async fn receive(clients: &Clients, record: &ReceiveMessage) -> Result<ReceiveOutcome> {
    let attestation = record
        .circle_attestation
        .clone()
        .ok_or(PathwayError::AttestationNotReady)?;

    let span = spans::receive_message(
        &record.message_hash,
        &record.original_path.to_chain,
        attestation.len(),
    );
    let _guard = span.enter();

    let signer = clients.noble.address()?.clone();
    let msg = MsgReceiveMessage {
        from: signer.to_string(),
        message: record.message_bytes.to_vec(),
        attestation: attestation.to_vec(),
    };
    let msgs = vec![msg.to_any()];

    let simulated = match clients.noble.simulate(&signer, msgs.clone()).await {
        Ok(gas) => gas,
        // The module rejects a spent nonce at simulation time; that means
        // the mint already happened.
        Err(PathwayError::Cosmos(log)) if log.contains("nonce already used") => {
            warn!(nonce = record.nonce, "nonce already spent on Noble, skipping mint");
            return Ok(ReceiveOutcome::AlreadyReceived);
        }
        Err(e) => return Err(e),
    };
    let gas = (simulated as f64 * GAS_MULTIPLIER).ceil() as u64;
    let fee = Fee::from_amount_and_gas(
        Coin {
            denom: clients.noble.usdc_denom(),
            amount: RECEIVE_TX_FEE,
        },
        gas,
    );

    let hash = clients.noble.sign_and_broadcast(msgs, fee, "").await?;
    info!(tx_hash = %hash, gas, "Noble mint broadcast");
    Ok(ReceiveOutcome::Submitted(hash))
}
