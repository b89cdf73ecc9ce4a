//! Intrusive free-list heap manager.
//!
//! The reference allocator threads its `Alloc` header directly into the
//! byte buffer it manages. We keep the on-disk contract — a user address
//! is always `header_offset + HEADER_LEN` into the heap's logical byte
//! space — but hold headers in a side arena of [`Node`] values rather
//! than writing packed, unaligned header bytes into the buffer itself.
//! This is the split the design notes call for: same addressing
//! contract, no unaligned in-band writes.
#![warn(missing_docs)]
#![deny(unsafe_code)]

use tinyvm_isa::Fault;

/// Logical size, in bytes, of an `Alloc` header. Allocation sizes are
/// rounded up to a multiple of this value.
pub const HEADER_LEN: u32 = 24;

/// Sentinel written into a live header; a mismatch at free time signals
/// heap corruption.
const SAFEBYTES: u32 = 0xDEAD_C0DE;

#[derive(Debug, Clone, Copy)]
struct Node {
    offset: u32,
    size: u32,
    occupied: bool,
    safebytes: u32,
    next: Option<usize>,
    prev: Option<usize>,
}

/// A single contiguous heap region with an intrusive free-list allocator.
pub struct Heap {
    bytes: Vec<u8>,
    max_len: u32,
    nodes: Vec<Node>,
    head: usize,
}

impl Heap {
    /// Create a heap with `initial` bytes available up front, able to grow
    /// up to `max` bytes (growth beyond `initial` is an explicit, currently
    /// unexercised hook — see [`Heap::alloc`]).
    pub fn new(initial: u32, max: u32) -> Self {
        let payload = initial.saturating_sub(HEADER_LEN);
        let nodes = vec![Node {
            offset: 0,
            size: payload,
            occupied: false,
            safebytes: SAFEBYTES,
            next: None,
            prev: None,
        }];
        Self {
            bytes: vec![0u8; initial as usize],
            max_len: max,
            nodes,
            head: 0,
        }
    }

    fn find(&self, user_addr: u32) -> Result<usize, Fault> {
        if user_addr < HEADER_LEN {
            return Err(Fault::InvalidHeapAddress);
        }
        let header_offset = user_addr - HEADER_LEN;
        let mut cursor = Some(self.head);
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            if node.offset == header_offset {
                if node.safebytes != SAFEBYTES {
                    tracing::warn!(addr = user_addr, "heap corruption: safebytes mismatch");
                    return Err(Fault::InvalidHeapAddress);
                }
                if !node.occupied {
                    return Err(Fault::InvalidHeapAddress);
                }
                return Ok(idx);
            }
            cursor = node.next;
        }
        Err(Fault::InvalidHeapAddress)
    }

    fn round_up(size: u32) -> u32 {
        let rem = size % HEADER_LEN;
        if rem == 0 {
            size
        } else {
            size + (HEADER_LEN - rem)
        }
    }

    /// Allocate `size` bytes, returning the user-visible address.
    /// `alloc(0)` always returns the reserved null address `0`.
    pub fn alloc(&mut self, size: u32) -> Result<u32, Fault> {
        if size == 0 {
            return Ok(0);
        }
        let needed = Self::round_up(size);
        let mut cursor = Some(self.head);
        while let Some(idx) = cursor {
            let node = self.nodes[idx];
            if !node.occupied && node.size >= needed {
                return Ok(self.take(idx, needed));
            }
            cursor = node.next;
        }
        tracing::error!(size, "heap allocation failed: no block large enough");
        Err(Fault::HeapExhausted)
    }

    /// Split `idx` (a free block of at least `needed` bytes) and mark the
    /// head of the split occupied, returning its user address.
    fn take(&mut self, idx: usize, needed: u32) -> u32 {
        let node = self.nodes[idx];
        let remainder = node.size - needed;
        if remainder >= HEADER_LEN {
            let split = Node {
                offset: node.offset + HEADER_LEN + needed,
                size: remainder - HEADER_LEN,
                occupied: false,
                safebytes: SAFEBYTES,
                next: node.next,
                prev: Some(idx),
            };
            let split_idx = self.nodes.len();
            self.nodes.push(split);
            if let Some(next_idx) = node.next {
                self.nodes[next_idx].prev = Some(split_idx);
            }
            self.nodes[idx].next = Some(split_idx);
            self.nodes[idx].size = needed;
        }
        self.nodes[idx].occupied = true;
        self.grow_buffer_for(idx);
        self.nodes[idx].offset + HEADER_LEN
    }

    fn grow_buffer_for(&mut self, idx: usize) {
        let node = self.nodes[idx];
        let end = (node.offset + HEADER_LEN + node.size) as usize;
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
    }

    /// Free a previously allocated address, coalescing with adjacent free
    /// neighbors. Freeing the null address is a no-op.
    pub fn free(&mut self, addr: u32) -> Result<(), Fault> {
        if addr == 0 {
            return Ok(());
        }
        let idx = self.find(addr)?;
        self.nodes[idx].occupied = false;
        if let Some(next_idx) = self.nodes[idx].next {
            if !self.nodes[next_idx].occupied {
                self.coalesce(idx, next_idx);
            }
        }
        if let Some(prev_idx) = self.nodes[idx].prev {
            if !self.nodes[prev_idx].occupied {
                self.coalesce(prev_idx, idx);
            }
        }
        Ok(())
    }

    /// Merge `right` into `left` (`left.next == Some(right)`); `left` must
    /// already be free.
    fn coalesce(&mut self, left: usize, right: usize) {
        let right_node = self.nodes[right];
        self.nodes[left].size += HEADER_LEN + right_node.size;
        self.nodes[left].next = right_node.next;
        if let Some(after) = right_node.next {
            self.nodes[after].prev = Some(left);
        }
    }

    /// Usable payload size of a live allocation.
    pub fn size_of(&self, addr: u32) -> Result<u32, Fault> {
        if addr == 0 {
            return Ok(0);
        }
        let idx = self.find(addr)?;
        Ok(self.nodes[idx].size)
    }

    /// Resize a live allocation, preserving the first `min(old, new)` bytes.
    /// Grows in place into a free right neighbor when possible.
    pub fn realloc(&mut self, addr: u32, new_size: u32) -> Result<u32, Fault> {
        if addr == 0 {
            return self.alloc(new_size);
        }
        if new_size == 0 {
            self.free(addr)?;
            return Ok(0);
        }
        let idx = self.find(addr)?;
        let needed = Self::round_up(new_size);
        let old_size = self.nodes[idx].size;
        if needed <= old_size {
            return Ok(addr);
        }
        if let Some(next_idx) = self.nodes[idx].next {
            let next = self.nodes[next_idx];
            if !next.occupied && old_size + HEADER_LEN + next.size >= needed {
                self.coalesce(idx, next_idx);
                let remainder = self.nodes[idx].size - needed;
                if remainder >= HEADER_LEN {
                    let node = self.nodes[idx];
                    let split = Node {
                        offset: node.offset + HEADER_LEN + needed,
                        size: remainder - HEADER_LEN,
                        occupied: false,
                        safebytes: SAFEBYTES,
                        next: node.next,
                        prev: Some(idx),
                    };
                    let split_idx = self.nodes.len();
                    self.nodes.push(split);
                    if let Some(after) = node.next {
                        self.nodes[after].prev = Some(split_idx);
                    }
                    self.nodes[idx].next = Some(split_idx);
                    self.nodes[idx].size = needed;
                }
                self.grow_buffer_for(idx);
                return Ok(addr);
            }
        }
        let new_addr = self.alloc(new_size)?;
        let copy_len = old_size.min(new_size) as usize;
        let old_start = addr as usize;
        let new_start = new_addr as usize;
        let mut buf = vec![0u8; copy_len];
        buf.copy_from_slice(&self.bytes[old_start..old_start + copy_len]);
        self.bytes[new_start..new_start + copy_len].copy_from_slice(&buf);
        self.free(addr)?;
        Ok(new_addr)
    }

    /// Read `len` bytes starting at `addr`.
    pub fn read(&self, addr: u32, len: u32) -> Result<&[u8], Fault> {
        let size = self.size_of(addr)?;
        if len > size {
            return Err(Fault::MemoryOverflow);
        }
        let start = addr as usize;
        Ok(&self.bytes[start..start + len as usize])
    }

    /// Overwrite bytes starting at `addr` with `data`; `data.len()` must not
    /// exceed the allocation's size.
    pub fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Fault> {
        let size = self.size_of(addr)?;
        if data.len() as u32 > size {
            return Err(Fault::MemoryOverflow);
        }
        let start = addr as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Allocate a new heap string initialized from `bytes`, NUL-terminated.
    pub fn alloc_string(&mut self, bytes: &[u8]) -> Result<u32, Fault> {
        let addr = self.alloc(bytes.len() as u32 + 1)?;
        self.write(addr, bytes)?;
        self.write_byte(addr + bytes.len() as u32, 0)?;
        Ok(addr)
    }

    fn write_byte(&mut self, addr: u32, byte: u8) -> Result<(), Fault> {
        self.bytes[addr as usize] = byte;
        Ok(())
    }

    /// Allocate a new heap string holding the first `n` bytes of the string
    /// at `src`, truncated to the source's real length if `n` exceeds it.
    pub fn alloc_substring(&mut self, src: u32, n: u32) -> Result<u32, Fault> {
        let src_len = self.cstr_len(src)?;
        let take = n.min(src_len);
        let start = src as usize;
        let slice = self.bytes[start..start + take as usize].to_vec();
        self.alloc_string(&slice)
    }

    /// Allocate a new heap string holding the concatenation of the strings
    /// at `a` and `b`.
    pub fn alloc_combined(&mut self, a: u32, b: u32) -> Result<u32, Fault> {
        let a_len = self.cstr_len(a)?;
        let b_len = self.cstr_len(b)?;
        let mut combined = Vec::with_capacity((a_len + b_len) as usize);
        combined.extend_from_slice(&self.bytes[a as usize..(a + a_len) as usize]);
        combined.extend_from_slice(&self.bytes[b as usize..(b + b_len) as usize]);
        self.alloc_string(&combined)
    }

    /// Length of a NUL-terminated string stored at `addr`, not counting the
    /// terminator.
    pub fn cstr_len(&self, addr: u32) -> Result<u32, Fault> {
        let size = self.size_of(addr)?;
        let start = addr as usize;
        let slice = &self.bytes[start..start + size as usize];
        Ok(slice.iter().position(|&b| b == 0).unwrap_or(size as usize) as u32)
    }

    /// Heap growth ceiling in bytes.
    pub fn max_len(&self) -> u32 {
        self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_zero_is_the_null_address() {
        let mut heap = Heap::new(1024, 1024);
        assert_eq!(heap.alloc(0).unwrap(), 0);
    }

    #[test]
    fn alloc_sizes_round_up_to_header_multiples() {
        let mut heap = Heap::new(1024, 1024);
        let addr = heap.alloc(10).unwrap();
        assert_eq!(heap.size_of(addr).unwrap() % HEADER_LEN, 0);
        assert!(heap.size_of(addr).unwrap() >= 10);
    }

    #[test]
    fn free_then_alloc_can_reuse_the_block() {
        let mut heap = Heap::new(1024, 1024);
        let addr = heap.alloc(24).unwrap();
        heap.free(addr).unwrap();
        let addr2 = heap.alloc(24).unwrap();
        assert_eq!(addr, addr2);
    }

    #[test]
    fn adjacent_free_blocks_coalesce() {
        let mut heap = Heap::new(1024, 1024);
        let a = heap.alloc(24).unwrap();
        let b = heap.alloc(24).unwrap();
        let before = heap.alloc(24).unwrap();
        heap.free(a).unwrap();
        heap.free(b).unwrap();
        // a's block plus b's block plus b's header should now be one
        // free span at least 2*24 + 24 bytes, satisfied by one alloc call.
        let reused = heap.alloc(48).unwrap();
        assert_eq!(reused, a);
        heap.free(before).unwrap();
    }

    #[test]
    fn realloc_preserves_prefix_bytes() {
        let mut heap = Heap::new(1024, 1024);
        let addr = heap.alloc(4).unwrap();
        heap.write(addr, b"abcd").unwrap();
        let grown = heap.realloc(addr, 64).unwrap();
        assert_eq!(&heap.read(grown, 4).unwrap(), b"abcd");
    }

    #[test]
    fn freeing_a_corrupted_header_is_rejected() {
        let mut heap = Heap::new(1024, 1024);
        let addr = heap.alloc(24).unwrap();
        // Poke at an address that was never handed out.
        assert!(heap.free(addr + 1).is_err());
    }

    #[test]
    fn alloc_substring_truncates_to_the_real_source_length() {
        let mut heap = Heap::new(1024, 1024);
        let src = heap.alloc_string(b"hi").unwrap();
        let sub = heap.alloc_substring(src, 10).unwrap();
        assert_eq!(heap.cstr_len(sub).unwrap(), 2);
    }

    #[test]
    fn alloc_combined_concatenates_two_strings() {
        let mut heap = Heap::new(1024, 1024);
        let a = heap.alloc_string(b"foo").unwrap();
        let b = heap.alloc_string(b"bar").unwrap();
        let combined = heap.alloc_combined(a, b).unwrap();
        let len = heap.cstr_len(combined).unwrap();
        assert_eq!(heap.read(combined, len).unwrap(), b"foobar");
    }

    #[test]
    fn exhausting_the_heap_returns_a_fault() {
        let mut heap = Heap::new(48, 48);
        heap.alloc(24).unwrap();
        assert_eq!(heap.alloc(24), Err(Fault::HeapExhausted));
    }
}
