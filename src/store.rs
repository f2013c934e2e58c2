//! Chunked node arena.
//!
//! Nodes live in fixed-size chunks of [`CHUNK_SIZE`] slots, addressed by a
//! [`NodeId`] whose high bits select the chunk. Slots are handed out from a
//! free-index stack first, then carved from the current (partially filled)
//! chunk, then from a freshly allocated chunk.
//!
//! During a collection the free stack is rebuilt from scratch in allocation
//! order. A chunk in which no slot holds a referenced node is dropped as a
//! whole and its index is recycled for the next chunk allocation.

use crate::error::{BddError, BddResult};
use crate::node::Node;
use crate::types::NodeId;

pub const CHUNK_BITS: u32 = 10;
pub const CHUNK_SIZE: usize = 1 << CHUNK_BITS;

type Chunk = Box<[Option<Node>]>;

/// Outcome of [`NodeStore::reclaim`].
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Reclaimed {
    /// Garbage nodes removed from the arena.
    pub freed: usize,
    /// Chunks dropped because they held no referenced node.
    pub released_chunks: usize,
}

pub struct NodeStore {
    chunks: Vec<Option<Chunk>>,
    /// Indices of dropped chunks, reused before growing `chunks`.
    released: Vec<usize>,
    /// Chunk being carved, and the next uncarved offset in it.
    current: Option<usize>,
    cursor: usize,
    free: Vec<NodeId>,
    node_count: usize,
    garbage_count: usize,
    node_limit: usize,
}

/// The very first slot of chunk 0 stands for the terminal and is never used.
fn first_slot(chunk: usize) -> usize {
    if chunk == 0 {
        1
    } else {
        0
    }
}

fn split(id: NodeId) -> (usize, usize) {
    (id.index() >> CHUNK_BITS, id.index() & (CHUNK_SIZE - 1))
}

fn join(chunk: usize, offset: usize) -> NodeId {
    NodeId::new(((chunk << CHUNK_BITS) | offset) as u32)
}

impl NodeStore {
    pub fn new(node_limit: usize) -> Self {
        Self {
            chunks: Vec::new(),
            released: Vec::new(),
            current: None,
            cursor: 0,
            free: Vec::new(),
            node_count: 0,
            garbage_count: 0,
            node_limit,
        }
    }

    /// Number of resident nodes (live and garbage).
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of resident nodes without activations.
    pub fn garbage_count(&self) -> usize {
        self.garbage_count
    }

    /// Number of slots on the free stack.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of chunks currently allocated.
    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    pub fn used_mem(&self) -> usize {
        self.chunk_count() * CHUNK_SIZE * std::mem::size_of::<Option<Node>>()
    }

    pub fn node_limit(&self) -> usize {
        self.node_limit
    }

    pub fn set_node_limit(&mut self, limit: usize) {
        self.node_limit = limit;
    }

    pub(crate) fn inc_garbage(&mut self) {
        self.garbage_count += 1;
    }

    pub(crate) fn dec_garbage(&mut self) {
        debug_assert!(self.garbage_count > 0, "garbage counter underflow");
        self.garbage_count -= 1;
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        let (ci, off) = split(id);
        self.chunks.get(ci)?.as_ref()?[off].as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Option<Node>> {
        let (ci, off) = split(id);
        Some(&mut self.chunks.get_mut(ci)?.as_mut()?[off])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        !id.is_terminal() && self.slot(id).is_some()
    }

    /// Returns the node in slot `id`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant or its chunk was released.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.slot(id) {
            Some(node) if !id.is_terminal() => node,
            _ => panic!("Node {} is not resident", id),
        }
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.slot_mut(id) {
            Some(Some(node)) if !id.is_terminal() => node,
            _ => panic!("Node {} is not resident", id),
        }
    }

    /// Places `node` into a slot and returns its index.
    ///
    /// The new node has no activations, so it is counted as garbage.
    pub fn alloc(&mut self, node: Node) -> BddResult<NodeId> {
        if self.node_count >= self.node_limit {
            return Err(BddError::Overflow);
        }

        let id = match self.free.pop() {
            Some(id) => id,
            None => self.carve()?,
        };

        match self.slot_mut(id) {
            Some(slot) if slot.is_none() => *slot = Some(node),
            _ => panic!("Slot {} handed out twice", id),
        }
        self.node_count += 1;
        self.garbage_count += 1;
        Ok(id)
    }

    fn carve(&mut self) -> BddResult<NodeId> {
        let ci = match self.current {
            Some(ci) => ci,
            None => {
                let ci = self.new_chunk()?;
                self.current = Some(ci);
                self.cursor = first_slot(ci);
                ci
            }
        };

        let id = join(ci, self.cursor);
        self.cursor += 1;
        if self.cursor == CHUNK_SIZE {
            // The chunk is now fully carved.
            self.current = None;
        }
        Ok(id)
    }

    fn new_chunk(&mut self) -> BddResult<usize> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(CHUNK_SIZE).map_err(|_| BddError::Overflow)?;
        slots.resize(CHUNK_SIZE, None);
        let chunk = slots.into_boxed_slice();

        if let Some(ci) = self.released.pop() {
            self.chunks[ci] = Some(chunk);
            return Ok(ci);
        }

        let ci = self.chunks.len();
        if ((ci + 1) << CHUNK_BITS) > NodeId::MAX as usize {
            return Err(BddError::Overflow);
        }
        self.chunks.try_reserve(1).map_err(|_| BddError::Overflow)?;
        self.chunks.push(Some(chunk));
        Ok(ci)
    }

    /// Removes every node without activations from the arena.
    ///
    /// The caller must have unlinked those nodes from the unique table and
    /// purged them from every compute table beforehand.
    pub(crate) fn reclaim(&mut self) -> Reclaimed {
        let mut stats = Reclaimed::default();
        self.free.clear();

        for ci in 0..self.chunks.len() {
            let first = first_slot(ci);
            let limit = if self.current == Some(ci) { self.cursor } else { CHUNK_SIZE };

            let Some(chunk) = self.chunks[ci].as_mut() else {
                continue;
            };

            let live = chunk[first..limit].iter().flatten().filter(|n| !n.is_garbage()).count();
            if live == 0 {
                stats.freed += chunk[first..limit].iter().flatten().count();
                stats.released_chunks += 1;
                self.chunks[ci] = None;
                self.released.push(ci);
                if self.current == Some(ci) {
                    self.current = None;
                }
                continue;
            }

            for (off, slot) in chunk.iter_mut().enumerate().take(limit).skip(first) {
                match slot {
                    Some(node) if !node.is_garbage() => {}
                    Some(_) => {
                        *slot = None;
                        stats.freed += 1;
                        self.free.push(join(ci, off));
                    }
                    None => self.free.push(join(ci, off)),
                }
            }
        }

        // Pop in ascending index order.
        self.free.reverse();

        self.node_count -= stats.freed;
        self.garbage_count -= stats.freed;
        stats
    }

    /// Iterates over all resident nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.chunks.iter().enumerate().flat_map(|(ci, chunk)| {
            chunk
                .iter()
                .flat_map(|c| c.iter().enumerate())
                .filter_map(move |(off, slot)| slot.as_ref().map(|n| (join(ci, off), n)))
        })
    }
}
