/*!
   Bounded block-by-block polling.

   [`do_poll`] scans a height window on a chain, invoking a predicate
   at each height until it produces a value. It is the primitive behind
   waiting for packet acknowledgements, proposal status changes, and
   message inclusion.
*/

use core::future::Future;
use core::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::Error;
use crate::ibc::packet::{Packet, PacketAcknowledgement, PacketTimeout};

/// Delay between height probes while waiting for the chain to catch up
/// to the poll cursor.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Anything that can report its latest finalized block height.
#[async_trait]
pub trait ChainHeighter: Sync {
    async fn height(&self) -> Result<u64, Error>;
}

/// A chain that can enumerate the IBC acknowledgements in a block.
#[async_trait]
pub trait ChainAcker: ChainHeighter {
    async fn acknowledgements(&self, height: u64) -> Result<Vec<PacketAcknowledgement>, Error>;
}

/// A chain that can enumerate the IBC timeouts in a block.
#[async_trait]
pub trait ChainTimeouter: ChainHeighter {
    async fn timeouts(&self, height: u64) -> Result<Vec<PacketTimeout>, Error>;
}

/// Poll heights in `[start_height, max_height]`, calling `poll` at each
/// height and returning the first success. The cursor never runs ahead
/// of the chain: when the chain has not yet reached the cursor, the
/// poller sleeps and retries the same height.
///
/// Fails with `DeadlineExceeded` when `max_height` is exhausted, and
/// with `Canceled` when the token fires.
pub async fn do_poll<T, H, P, HFut, PFut>(
    token: &CancellationToken,
    current_height: H,
    mut poll: P,
    start_height: u64,
    max_height: u64,
) -> Result<T, Error>
where
    H: Fn() -> HFut,
    P: FnMut(u64) -> PFut,
    HFut: Future<Output = Result<u64, Error>>,
    PFut: Future<Output = Result<T, Error>>,
{
    assert!(
        max_height >= start_height,
        "max_height must be greater than or equal to start_height"
    );

    let mut poll_err = None;
    let mut cursor = start_height;

    while cursor <= max_height {
        if token.is_cancelled() {
            return Err(Error::canceled(format!("poll at height {cursor}")));
        }

        let chain_height = current_height().await?;
        if cursor > chain_height {
            tokio::time::sleep(POLL_INTERVAL).await;
            continue;
        }

        match poll(cursor).await {
            Ok(found) => return Ok(found),
            Err(e) => {
                trace!("poll at height {} did not match: {}", cursor, e);
                poll_err = Some(e);
                cursor += 1;
            }
        }
    }

    Err(match poll_err {
        Some(e) => e,
        None => Error::deadline_exceeded(format!(
            "no matching block in heights {start_height}..={max_height}"
        )),
    })
}

/// Wait until every chain's height has advanced by at least `delta`
/// blocks from where it was when this function was called.
pub async fn wait_for_blocks(delta: u64, chains: &[&dyn ChainHeighter]) -> Result<(), Error> {
    assert!(!chains.is_empty(), "missing chains");

    futures::future::try_join_all(chains.iter().map(|chain| wait_for_delta(*chain, delta)))
        .await?;

    Ok(())
}

async fn wait_for_delta(chain: &dyn ChainHeighter, delta: u64) -> Result<(), Error> {
    let mut starting = 0u64;
    loop {
        let cur = chain.height().await?;
        // The chain reports zero until the first block is committed.
        if cur == 0 {
            tokio::time::sleep(POLL_INTERVAL).await;
            continue;
        }
        if starting == 0 {
            starting = cur;
        }
        if cur >= starting + delta {
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll for an acknowledgement whose packet matches `packet`.
pub async fn poll_for_ack<C: ChainAcker>(
    token: &CancellationToken,
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
) -> Result<PacketAcknowledgement, Error> {
    do_poll(
        token,
        || chain.height(),
        |height| async move {
            let acks = chain.acknowledgements(height).await?;
            acks.into_iter()
                .find(|ack| ack.packet.matches(packet))
                .ok_or_else(|| {
                    Error::deadline_exceeded(format!(
                        "no ack for sequence {} at height {}",
                        packet.sequence, height
                    ))
                })
        },
        start_height,
        max_height,
    )
    .await
}

/// Poll for a timeout whose packet matches `packet`.
pub async fn poll_for_timeout<C: ChainTimeouter>(
    token: &CancellationToken,
    chain: &C,
    start_height: u64,
    max_height: u64,
    packet: &Packet,
) -> Result<PacketTimeout, Error> {
    do_poll(
        token,
        || chain.height(),
        |height| async move {
            let timeouts = chain.timeouts(height).await?;
            timeouts
                .into_iter()
                .find(|t| t.packet.matches(packet))
                .ok_or_else(|| {
                    Error::deadline_exceeded(format!(
                        "no timeout for sequence {} at height {}",
                        packet.sequence, height
                    ))
                })
        },
        start_height,
        max_height,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test]
    async fn returns_first_matching_height() {
        let token = CancellationToken::new();
        let found = do_poll(
            &token,
            || async { Ok(100u64) },
            |height| async move {
                if height == 12 {
                    Ok(height)
                } else {
                    Err(Error::deadline_exceeded("not found".to_string()))
                }
            },
            10,
            20,
        )
        .await
        .unwrap();

        assert_eq!(found, 12);
    }

    #[tokio::test]
    async fn waits_for_chain_to_reach_cursor() {
        let token = CancellationToken::new();
        let height = AtomicU64::new(3);

        let found = do_poll(
            &token,
            || {
                let h = height.fetch_add(1, Ordering::SeqCst);
                async move { Ok(h) }
            },
            |height| async move {
                if height == 5 {
                    Ok(())
                } else {
                    Err(Error::deadline_exceeded("not found".to_string()))
                }
            },
            5,
            6,
        )
        .await;

        assert!(found.is_ok());
    }

    #[tokio::test]
    async fn fails_with_last_error_after_max_height() {
        let token = CancellationToken::new();
        let res: Result<(), _> = do_poll(
            &token,
            || async { Ok(100u64) },
            |_| async { Err(Error::deadline_exceeded("never".to_string())) },
            1,
            3,
        )
        .await;

        assert!(res.is_err());
    }

    #[tokio::test]
    async fn cancellation_interrupts_polling() {
        let token = CancellationToken::new();
        token.cancel();

        let res: Result<(), _> = do_poll(
            &token,
            || async { Ok(0u64) },
            |_| async { Ok(()) },
            1,
            10,
        )
        .await;

        assert!(res.is_err());
    }
}
