//! Extracting relay sessions from block transactions.

use crate::codec::{MsgRelayPayment, Tx, RELAY_PAYMENT_TYPE_URL};
use crate::config::DecodeFailureScope;
use crate::error::DecodeError;
use lava_leaderboard_chain::{Block, Height};
use lava_leaderboard_core::RelaySession;
use prost::Message;
use tracing::{debug, warn};

/// Everything extracted from one batch of blocks.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    /// Relay sessions in block, transaction and message order.
    pub relays: Vec<RelaySession>,
    /// Decode failures, keyed by block height.
    pub errors: Vec<(Height, DecodeError)>,
    pub blocks: usize,
    /// Envelopes decoded successfully.
    pub transactions: u64,
    pub relay_payments: u64,
}

/// Decodes transaction envelopes and picks out relay payments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxDecoder {
    scope: DecodeFailureScope,
}

impl TxDecoder {
    pub fn new(scope: DecodeFailureScope) -> Self {
        Self { scope }
    }

    /// Decode every block in order.
    ///
    /// A failure in one block never affects the others.
    pub fn decode_blocks<'a, I>(&self, blocks: I) -> DecodedBatch
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut batch = DecodedBatch::default();
        for block in blocks {
            self.decode_block(block, &mut batch);
        }
        debug!(
            "Decoded {} blocks: {} txs, {} relay payments, {} relay sessions",
            batch.blocks,
            batch.transactions,
            batch.relay_payments,
            batch.relays.len()
        );
        batch
    }

    fn decode_block(&self, block: &Block, batch: &mut DecodedBatch) {
        batch.blocks += 1;

        for (index, raw) in block.txs.iter().enumerate() {
            let mark = batch.relays.len();
            match decode_transaction(raw, index, &mut batch.relays) {
                Ok(Some(payments)) => {
                    batch.transactions += 1;
                    batch.relay_payments += payments;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to decode tx {} in block {}: {}", index, block.height, e);
                    batch.errors.push((block.height, e));
                    match self.scope {
                        DecodeFailureScope::Block => break,
                        DecodeFailureScope::Transaction => batch.relays.truncate(mark),
                    }
                }
            }
        }
    }
}

/// Decode one raw transaction, appending its relay sessions to `relays`.
///
/// Returns the number of relay payment messages found, or `None` when the
/// transaction is empty or has no body. On error, sessions from messages
/// before the failing one have already been appended.
pub fn decode_transaction(
    raw: &[u8],
    index: usize,
    relays: &mut Vec<RelaySession>,
) -> Result<Option<u64>, DecodeError> {
    if raw.is_empty() {
        return Ok(None);
    }

    let tx = Tx::decode(raw).map_err(|source| DecodeError::Envelope { index, source })?;
    let Some(body) = tx.body else {
        return Ok(None);
    };

    let mut payments = 0;
    for msg in body.messages {
        if msg.type_url != RELAY_PAYMENT_TYPE_URL {
            continue;
        }
        let payment = MsgRelayPayment::decode(msg.value.as_slice())
            .map_err(|source| DecodeError::Payload { index, source })?;
        payments += 1;
        relays.extend(payment.relays.into_iter().map(RelaySession::from));
    }

    Ok(Some(payments))
}
