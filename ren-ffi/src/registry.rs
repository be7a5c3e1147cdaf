//! Process-wide registry of live clients.
//!
//! A handle is not a pointer to the client. Its address encodes a slot index and the
//! generation of that slot, so a handle that was freed (or never issued) fails lookup
//! with [`RenErrorCode::InvalidHandle`] instead of touching freed memory. The registry
//! stores `Arc<Client>`; lookups clone the `Arc` and release the lock before any I/O.

use std::ptr;
use std::sync::Arc;

use parking_lot::Mutex;
use ren::Client;

use crate::ffi::FfiError;
use crate::result::RenErrorCode;

/// Opaque client handle. Never dereferenced; only its address is meaningful.
#[derive(Debug)]
pub struct RenClientHandle {
    _private: (),
}

const SLOT_BITS: u32 = usize::BITS / 2;
const SLOT_MASK: usize = (1 << SLOT_BITS) - 1;
const GENERATION_MASK: usize = usize::MAX >> SLOT_BITS;

#[derive(Debug)]
struct Slot {
    generation: usize,
    client: Option<Arc<Client>>,
}

#[derive(Debug)]
struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Registry {
    const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, client: Arc<Client>) -> Option<usize> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.slots.len();
                // Slot numbers are stored off by one so that no id is zero.
                if index >= SLOT_MASK {
                    return None;
                }
                self.slots.push(Slot {
                    generation: 0,
                    client: None,
                });
                index
            }
        };
        let slot = &mut self.slots[index];
        slot.client = Some(client);
        Some((slot.generation << SLOT_BITS) | (index + 1))
    }

    fn slot_mut(&mut self, id: usize) -> Option<&mut Slot> {
        let index = (id & SLOT_MASK).checked_sub(1)?;
        let generation = id >> SLOT_BITS;
        self.slots
            .get_mut(index)
            .filter(|slot| slot.generation == generation && slot.client.is_some())
    }

    fn get(&mut self, id: usize) -> Option<Arc<Client>> {
        self.slot_mut(id).and_then(|slot| slot.client.clone())
    }

    fn remove(&mut self, id: usize) -> Option<Arc<Client>> {
        let slot = self.slot_mut(id)?;
        let client = slot.client.take();
        slot.generation = (slot.generation + 1) & GENERATION_MASK;
        self.free.push((id & SLOT_MASK) - 1);
        client
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

static REGISTRY: Mutex<Registry> = parking_lot::const_mutex(Registry::new());

/// Register `client` and return its handle, or `None` when every slot is taken.
pub(crate) fn register(client: Client) -> Option<*mut RenClientHandle> {
    let id = REGISTRY.lock().insert(Arc::new(client))?;
    Some(ptr::without_provenance_mut(id))
}

/// Resolve `handle` to its client.
pub(crate) fn resolve(handle: *const RenClientHandle) -> Result<Arc<Client>, FfiError> {
    if handle.is_null() {
        return Err(FfiError::invalid_argument("client handle is null"));
    }
    REGISTRY.lock().get(handle.addr()).ok_or_else(|| {
        FfiError::new(
            RenErrorCode::InvalidHandle,
            "client handle is stale or was never issued",
        )
    })
}

/// Unregister `handle`. The client is dropped once in-flight calls release it.
pub(crate) fn unregister(handle: *mut RenClientHandle) -> Result<(), FfiError> {
    if handle.is_null() {
        return Ok(());
    }
    let removed = REGISTRY.lock().remove(handle.addr());
    match removed {
        Some(client) => {
            drop(client);
            Ok(())
        }
        None => Err(FfiError::new(
            RenErrorCode::InvalidHandle,
            "client handle is stale or was already freed",
        )),
    }
}
