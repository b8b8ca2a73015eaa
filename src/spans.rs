//! OpenTelemetry span helpers for transfer and relay operations
//!
//! This module provides orthogonal span instrumentation: static span names,
//! structured attributes, and separation from business logic.
//!
//! The span helpers are used internally by the deposit/receive executors and
//! the relay stages, but are exposed publicly for callers who integrate with
//! an existing OpenTelemetry setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use pathway_rs::spans;
//! use pathway_rs::Chain;
//!
//! let span = spans::poll_attestation("abc123", &Chain::Ethereum, 1);
//! let _guard = span.enter();
//! // attestation lookup happens here
//! ```

use alloy_primitives::{hex, FixedBytes, TxHash, U256};
use tracing::Span;

use crate::chain::Chain;

/// Create span for validating and quoting a transfer path.
///
/// Parent: Top-level operation span (auto-attached by tracing)
/// Children: RPC calls from gas simulation
#[inline]
pub fn quote(source: &Chain, destination: &Chain, amount: &U256) -> Span {
    tracing::info_span!(
        "pathway.quote",
        source_chain = %source,
        destination_chain = %destination,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for USDC deposit-and-burn submission on the source chain.
///
/// Parent: Top-level operation span
/// Children: Contract call preparation spans, RPC calls
#[inline]
pub fn deposit_for_burn(source: &Chain, destination: &Chain, amount: &U256) -> Span {
    tracing::info_span!(
        "pathway.deposit_for_burn",
        source_chain = %source,
        destination_chain = %destination,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for extracting the burn message from a deposit receipt.
///
/// Parent: deposit_for_burn or relay stage span
/// Children: Provider RPC calls
#[inline]
pub fn parse_deposit_receipt(key: &str, source_chain: &Chain) -> Span {
    tracing::debug_span!(
        "pathway.parse_deposit_receipt",
        key = key,
        source_chain = %source_chain,
    )
}

/// Create span for a single attestation service lookup.
///
/// Parent: relay attestation stage span
/// Children: HTTP client request spans (from reqwest instrumentation)
#[inline]
pub fn poll_attestation(key: &str, source_chain: &Chain, attempt: u32) -> Span {
    tracing::debug_span!(
        "pathway.poll_attestation",
        key = key,
        source_chain = %source_chain,
        attempt = attempt,
    )
}

/// Create span for an attestation service HTTP request.
///
/// Parent: poll_attestation
/// Children: None (HTTP client handles internal spans)
#[inline]
pub fn attestation_request(url: &str) -> Span {
    tracing::trace_span!(
        "pathway.attestation_request",
        http.method = "GET",
        http.url = url,
    )
}

/// Create span for submitting the attested mint on the destination chain.
///
/// Parent: Top-level operation or relay stage span
/// Children: Contract interaction spans, RPC calls
#[inline]
pub fn receive_message(
    message_hash: &FixedBytes<32>,
    destination_chain: &Chain,
    attestation_length: usize,
) -> Span {
    tracing::info_span!(
        "pathway.receive_message",
        message_hash = %hex::encode(message_hash),
        destination_chain = %destination_chain,
        attestation_length_bytes = attestation_length,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on a source-chain transaction receipt.
///
/// Parent: deposit_for_burn or receive_message
/// Children: Provider RPC calls (polling)
#[inline]
pub fn wait_for_confirmation(tx_hash: TxHash, chain: &Chain) -> Span {
    tracing::debug_span!(
        "pathway.wait_for_confirmation",
        tx_hash = %tx_hash,
        chain = %chain,
    )
}

/// Create span for the speculative receive-gas simulation.
///
/// Parent: pathway.quote
/// Children: RPC calls (eth_estimateGas with state overrides)
#[inline]
pub fn simulate_receive(destination_chain: &Chain) -> Span {
    tracing::debug_span!(
        "pathway.simulate_receive",
        destination_chain = %destination_chain,
    )
}

/// Create span for one relay pipeline stage invocation.
///
/// Parent: None (stages are top-level units of work)
/// Children: Per-record operation spans
#[inline]
pub fn relay_stage(stage: &'static str, batch_size: usize) -> Span {
    tracing::info_span!(
        "pathway.relay_stage",
        stage = stage,
        batch_size = batch_size,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.source: Optional source in the error chain
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = Span::current();
    current_span.record(
        "error.type",
        error.to_string().split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
