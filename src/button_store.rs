//! Learned transmitter buttons, with flash-backed persistence.
//!
//! The in-memory set is a tiny fixed-capacity list: remembering a fifth
//! button evicts the oldest. Persistence writes the list into the last
//! internal-flash erase block behind a magic word and a CRC32, so a
//! half-finished write at power loss reads back as "nothing learned"
//! rather than as garbage transmitters.

use heapless::Vec;

use crate::packet::{ButtonPair, Packet};

/// How many button pairs the receiver can be paired with.
pub const STORED_BUTTONS: usize = 4;

/// In-memory set of learned button pairs, oldest first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ButtonStore {
    buttons: Vec<ButtonPair, STORED_BUTTONS>,
}

impl ButtonStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buttons: Vec::new(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.buttons.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ButtonPair> + '_ {
        self.buttons.iter().copied()
    }

    /// Whether any learned pair is addressed by `packet` (directly or via
    /// its multicast flag).
    #[must_use]
    pub fn recognizes(&self, packet: Packet) -> bool {
        self.buttons.iter().any(|&pair| packet.matches(pair))
    }

    /// Learn a pair. Returns false when it was already known; evicts the
    /// oldest pair when the store is full.
    pub fn remember(&mut self, pair: ButtonPair) -> bool {
        if self.buttons.contains(&pair) {
            return false;
        }
        if self.buttons.is_full() {
            self.buttons.remove(0);
        }
        // Capacity was just ensured.
        let _ = self.buttons.push(pair);
        true
    }

    /// Unlearn a pair. Returns whether it was known.
    pub fn forget(&mut self, pair: ButtonPair) -> bool {
        let before = self.buttons.len();
        self.buttons.retain(|&known| known != pair);
        before != self.buttons.len()
    }

    /// Unlearn everything. Returns whether anything was known.
    pub fn forget_all(&mut self) -> bool {
        let had_any = !self.buttons.is_empty();
        self.buttons.clear();
        had_any
    }
}

#[cfg(not(feature = "host"))]
pub use persistent::PersistentButtonStore;

#[cfg(not(feature = "host"))]
mod persistent {
    use crc32fast::Hasher;
    use defmt::info;
    use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
    use embassy_rp::peripherals::FLASH;
    use embassy_rp::Peri;

    use super::{ButtonStore, STORED_BUTTONS};
    use crate::packet::ButtonPair;
    use crate::{Error, Result};

    #[cfg(feature = "pico2")]
    const FLASH_SIZE: usize = 4 * 1024 * 1024;
    #[cfg(not(feature = "pico2"))]
    const FLASH_SIZE: usize = 2 * 1024 * 1024;

    /// The learned buttons live in the very last erase block, far from
    /// the firmware image at the start of flash.
    const BLOCK_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

    const MAGIC: u32 = 0x4449_4F31; // "DIO1"
    const HEADER_SIZE: usize = 4 + 2; // magic + payload length
    const CRC_SIZE: usize = 4;
    /// Vacant slots are stored as all-ones, which no real transmitter
    /// uses (it would need all-ones identity bits).
    const VACANT: u32 = u32::MAX;
    /// One flash page; plenty for the postcard-encoded slot array.
    const RECORD_SIZE: usize = 256;
    const MAX_PAYLOAD_SIZE: usize = RECORD_SIZE - HEADER_SIZE - CRC_SIZE;

    /// [`ButtonStore`] bound to its flash block. Mutations go through
    /// [`with`](Self::with), which writes back only when something
    /// actually changed, keeping erase cycles off the common path.
    pub struct PersistentButtonStore {
        flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
        store: ButtonStore,
    }

    impl PersistentButtonStore {
        /// Claim the flash peripheral and load whatever was learned
        /// before the last power cycle.
        pub fn new(peripheral: Peri<'static, FLASH>) -> Result<Self> {
            let mut flash = Flash::new_blocking(peripheral);
            let store = load(&mut flash)?;
            info!("button store: {} learned", store.count());
            Ok(Self { flash, store })
        }

        #[must_use]
        pub fn store(&self) -> &ButtonStore {
            &self.store
        }

        /// Mutate the in-memory store and persist the result when the
        /// mutation reports a change.
        pub fn with(&mut self, mutate: impl FnOnce(&mut ButtonStore) -> bool) -> Result<bool> {
            let changed = mutate(&mut self.store);
            if changed {
                save(&mut self.flash, &self.store)?;
                info!("button store: saved {} learned", self.store.count());
            }
            Ok(changed)
        }
    }

    fn load(flash: &mut Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Result<ButtonStore> {
        let mut record = [0u8; RECORD_SIZE];
        flash
            .blocking_read(BLOCK_OFFSET, &mut record)
            .map_err(Error::Flash)?;

        let mut store = ButtonStore::new();
        if u32::from_le_bytes(read_word(&record, 0)) != MAGIC {
            // Fresh chip or never saved: nothing learned.
            return Ok(store);
        }
        let payload_len = usize::from(u16::from_le_bytes([record[4], record[5]]));
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(Error::StorageCorrupted);
        }
        let crc_offset = HEADER_SIZE + payload_len;
        let stored_crc = u32::from_le_bytes(read_word(&record, crc_offset));
        if stored_crc != crc(&record[..crc_offset]) {
            return Err(Error::StorageCorrupted);
        }
        let slots: [u32; STORED_BUTTONS] =
            postcard::from_bytes(&record[HEADER_SIZE..crc_offset])
                .map_err(|_| Error::StorageCorrupted)?;
        for bits in slots {
            if bits == VACANT {
                break;
            }
            store.remember(ButtonPair::from_bits(bits));
        }
        Ok(store)
    }

    fn save(
        flash: &mut Flash<'static, FLASH, Blocking, FLASH_SIZE>,
        store: &ButtonStore,
    ) -> Result<()> {
        let mut slots = [VACANT; STORED_BUTTONS];
        for (slot, pair) in slots.iter_mut().zip(store.iter()) {
            *slot = pair.bits();
        }

        let mut record = [0xFFu8; RECORD_SIZE];
        record[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        let payload_len = postcard::to_slice(&slots, &mut record[HEADER_SIZE..])
            .map_err(|_| Error::StorageOverflow)?
            .len();
        #[allow(clippy::cast_possible_truncation)]
        record[4..6].copy_from_slice(&(payload_len as u16).to_le_bytes());
        let crc_offset = HEADER_SIZE + payload_len;
        let crc = crc(&record[..crc_offset]);
        record[crc_offset..crc_offset + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        flash
            .blocking_erase(BLOCK_OFFSET, BLOCK_OFFSET + ERASE_SIZE as u32)
            .map_err(Error::Flash)?;
        flash
            .blocking_write(BLOCK_OFFSET, &record)
            .map_err(Error::Flash)?;
        Ok(())
    }

    fn read_word(record: &[u8], offset: usize) -> [u8; 4] {
        let mut word = [0u8; 4];
        word.copy_from_slice(&record[offset..offset + 4]);
        word
    }

    fn crc(data: &[u8]) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
