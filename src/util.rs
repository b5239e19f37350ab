use std::collections::TryReserveError;

pub const fn _assert_send<T: Send>() {}

/// Buffer containing partially processed data.
///
/// For input buffers the written part is what the codec has consumed, for output buffers it is
/// what the codec has produced. The index only ever moves by the amounts a codec reports.
#[derive(Debug, Default)]
pub struct PartialBuffer<B> {
    buffer: B,
    index: usize,
}

impl<B: AsRef<[u8]>> PartialBuffer<B> {
    /// Create a new [`PartialBuffer`] from the given underlying buffer.
    pub fn new(buffer: B) -> Self {
        Self { buffer, index: 0 }
    }

    /// Written part of the buffer.
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.index]
    }

    /// Unwritten part of the buffer.
    pub fn unwritten(&self) -> &[u8] {
        &self.buffer.as_ref()[self.index..]
    }

    /// Advance the written part.
    pub fn advance(&mut self, amount: usize) {
        debug_assert!(self.index + amount <= self.buffer.as_ref().len());
        self.index += amount;
    }

    /// Mark the whole buffer as unwritten again.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PartialBuffer<B> {
    /// Mutable reference to the unwritten part of the buffer.
    pub fn unwritten_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[self.index..]
    }
}

impl PartialBuffer<Vec<u8>> {
    /// A zeroed output buffer of `capacity` bytes, failing instead of aborting when the
    /// allocation is refused.
    pub fn scratch(capacity: usize) -> Result<Self, TryReserveError> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity)?;
        buffer.resize(capacity, 0);
        Ok(Self::new(buffer))
    }

    /// Append the written part to `output` and make the whole buffer writable again.
    ///
    /// Returns the number of bytes moved.
    pub fn move_written_into(&mut self, output: &mut Vec<u8>) -> Result<usize, TryReserveError> {
        let len = self.index;
        if len > 0 {
            output.try_reserve(len)?;
            output.extend_from_slice(self.written());
            self.reset();
        }
        Ok(len)
    }
}
