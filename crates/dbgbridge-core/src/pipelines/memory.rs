//! Virtual memory reads.
//!
//! A read returns the longest readable prefix of the requested range. When
//! the engine fails a whole read with a read-fault or partial-copy code, the
//! range is re-read page by page up to the first unreadable page, so a buffer
//! that straddles the end of a mapping still yields its mapped head.

use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::platform::hresult::HResult;
use crate::proxy::ProxySet;
use crate::types::Address;

/// How much of a read was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus
{
    /// Every requested byte was read.
    Complete,
    /// Only the first `n` bytes were readable.
    PartialRead(usize),
}

/// Bytes returned by a read, with how the read ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome
{
    /// Start of the range
    pub address: Address,
    /// Requested length
    pub requested: usize,
    /// Readable prefix of the range
    pub data: Vec<u8>,
    pub status: ReadStatus,
}

impl ReadOutcome
{
    #[must_use]
    pub fn is_complete(&self) -> bool
    {
        self.status == ReadStatus::Complete
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8]
    {
        &self.data
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8>
    {
        self.data
    }

    fn from_prefix(address: Address, requested: usize, mut data: Vec<u8>, read: usize) -> Self
    {
        data.truncate(read);
        let status = if read == requested {
            ReadStatus::Complete
        } else {
            warn!("Partial read at {address}: {read} of {requested} bytes");
            ReadStatus::PartialRead(read)
        };
        Self {
            address,
            requested,
            data,
            status,
        }
    }
}

/// Read up to `length` bytes at `address`.
pub(crate) fn read(proxies: &ProxySet, address: Address, length: usize, page_size: u32) -> BridgeResult<ReadOutcome>
{
    if length == 0 {
        return Ok(ReadOutcome {
            address,
            requested: 0,
            data: Vec::new(),
            status: ReadStatus::Complete,
        });
    }
    if u32::try_from(length).is_err() {
        return Err(BridgeError::InvalidArgument(format!("read of {length} bytes exceeds u32::MAX")));
    }
    if address.checked_add(length as u64 - 1).is_none() {
        return Err(BridgeError::InvalidArgument(format!("read of {length} bytes at {address} wraps the address space")));
    }

    let mut buffer = vec![0u8; length];
    let read = match proxies.data_spaces.read_virtual(address.value(), &mut buffer) {
        Ok(read) if read > 0 => read,
        Ok(_) => read_by_pages(proxies, address, &mut buffer, page_size)?,
        Err(err) if err.code().is_some_and(HResult::is_read_failure) => {
            debug!("Read at {address} failed ({err}); retrying page by page");
            read_by_pages(proxies, address, &mut buffer, page_size)?
        }
        Err(err) => return Err(err),
    };

    if read == 0 {
        return Err(BridgeError::Unreadable {
            address: address.value(),
            length,
        });
    }
    Ok(ReadOutcome::from_prefix(address, length, buffer, read))
}

/// Fill `buffer` one page-bounded chunk at a time, stopping at the first
/// chunk the engine cannot read in full. Returns the contiguous prefix length.
fn read_by_pages(proxies: &ProxySet, address: Address, buffer: &mut [u8], page_size: u32) -> BridgeResult<usize>
{
    let page = u64::from(page_size.max(1));
    let mut filled = 0usize;
    while filled < buffer.len() {
        let cursor = address.value() + filled as u64;
        let to_boundary = page - cursor % page;
        let chunk = usize::try_from(to_boundary).unwrap_or(usize::MAX).min(buffer.len() - filled);
        match proxies.data_spaces.read_virtual(cursor, &mut buffer[filled..filled + chunk]) {
            Ok(read) => {
                filled += read;
                if read < chunk {
                    break;
                }
            }
            Err(err) if err.code().is_some_and(HResult::is_read_failure) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Read `count` target pointers at `address`, each widened to 64 bits.
pub(crate) fn read_pointers(proxies: &ProxySet, address: Address, count: usize) -> BridgeResult<Vec<Address>>
{
    if count == 0 {
        return Ok(Vec::new());
    }
    let pointers = proxies.data_spaces.read_pointers_virtual(count, address.value())?;
    Ok(pointers.into_iter().map(Address::new).collect())
}
