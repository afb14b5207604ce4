//! Backing store used by memory components.
//!
//! The simulator never owns memory contents, memory components only forward reads and
//! writes to an [AddressSpace] shared with whoever set it up.
use crate::error::AddressError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use strum_macros::{Display, EnumString};

/// Largest access an [AddressSpace] has to support, in bytes.
pub const MAX_ACCESS_BYTES: u32 = 8;

/// Address space shared by reference between sibling memory components.
pub type SharedAddressSpace = Rc<RefCell<dyn AddressSpace>>;

/// Classification of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RegionType {
    Ram,
    Rom,
    Io,
    Unmapped,
}

/// Byte addressed little endian memory.
pub trait AddressSpace {
    /// Reads `bytes` bytes starting at `address`.
    fn read_mem(&self, address: u64, bytes: u32) -> u64;

    /// Writes the low `bytes` bytes of `value` starting at `address`.
    fn write_mem(&mut self, address: u64, value: u64, bytes: u32) -> Result<(), AddressError>;

    /// Writes like [AddressSpace::write_mem] but on behalf of tooling,
    /// implementations may skip protections that only apply to simulated writes.
    fn force_mem(&mut self, address: u64, value: u64, bytes: u32) -> Result<(), AddressError> {
        self.write_mem(address, value, bytes)
    }

    /// Returns the kind of region `address` belongs to.
    fn region_type(&self, address: u64) -> RegionType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    start: u64,
    len: u64,
    ty: RegionType,
}

/// [AddressSpace] that only stores the bytes that were written.
///
/// Without any region every address is [RAM](RegionType::Ram).
/// Once a region is added, addresses outside of all regions are unmapped.
/// Unwritten and unmapped addresses read as 0.
///
/// # Example
/// ```
/// # use rtlsim::address_space::{AddressSpace, RegionType, SparseMemory};
/// let mut mem = SparseMemory::new()
///     .with_region(0x0, 0x100, RegionType::Rom)
///     .with_region(0x100, 0x100, RegionType::Ram);
///
/// mem.load(0x0, &[0x13, 0x00]);
/// assert_eq!(mem.read_mem(0x0, 2), 0x13);
///
/// assert!(mem.write_mem(0x0, 1, 1).is_err());
/// assert!(mem.write_mem(0x104, 0xbeef, 2).is_ok());
/// assert_eq!(mem.read_mem(0x104, 4), 0xbeef);
/// assert_eq!(mem.region_type(0x400), RegionType::Unmapped);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SparseMemory {
    bytes: HashMap<u64, u8>,
    regions: Vec<Region>,
}

impl SparseMemory {
    /// Returns an empty [SparseMemory] where every address is RAM.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns `self` with `[start, start + len)` classified as `ty`.
    ///
    /// Earlier regions win when regions overlap.
    pub fn with_region(mut self, start: u64, len: u64, ty: RegionType) -> Self {
        self.regions.push(Region { start, len, ty });
        self
    }

    /// Returns `self` wrapped to be shared between memory components.
    pub fn shared(self) -> Rc<RefCell<SparseMemory>> {
        Rc::new(RefCell::new(self))
    }

    /// Copies `data` starting at `start`, ignoring region protections.
    pub fn load(&mut self, start: u64, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            self.store(start.wrapping_add(offset as u64), *byte);
        }
    }

    /// Returns the number of bytes that hold a non zero value.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if every byte reads as 0.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn store(&mut self, address: u64, byte: u8) {
        if byte == 0 {
            self.bytes.remove(&address);
        } else {
            self.bytes.insert(address, byte);
        }
    }

    fn check_width(bytes: u32) -> Result<(), AddressError> {
        if bytes > MAX_ACCESS_BYTES {
            return Err(AddressError::InvalidWidth {
                bytes,
                max: MAX_ACCESS_BYTES,
            });
        }
        Ok(())
    }

    fn write_unchecked(&mut self, address: u64, value: u64, bytes: u32) {
        for i in 0..bytes {
            self.store(address.wrapping_add(u64::from(i)), (value >> (8 * i)) as u8);
        }
    }
}

impl AddressSpace for SparseMemory {
    fn read_mem(&self, address: u64, bytes: u32) -> u64 {
        (0..bytes.min(MAX_ACCESS_BYTES)).fold(0, |acc, i| {
            let byte = self
                .bytes
                .get(&address.wrapping_add(u64::from(i)))
                .copied()
                .unwrap_or(0);
            acc | u64::from(byte) << (8 * i)
        })
    }

    fn write_mem(&mut self, address: u64, value: u64, bytes: u32) -> Result<(), AddressError> {
        Self::check_width(bytes)?;
        for i in 0..bytes {
            let byte_address = address.wrapping_add(u64::from(i));
            match self.region_type(byte_address) {
                RegionType::Unmapped => return Err(AddressError::Unmapped(byte_address)),
                RegionType::Rom => return Err(AddressError::ReadOnly(byte_address)),
                RegionType::Ram | RegionType::Io => {}
            }
        }
        self.write_unchecked(address, value, bytes);
        Ok(())
    }

    fn force_mem(&mut self, address: u64, value: u64, bytes: u32) -> Result<(), AddressError> {
        Self::check_width(bytes)?;
        self.write_unchecked(address, value, bytes);
        Ok(())
    }

    fn region_type(&self, address: u64) -> RegionType {
        if self.regions.is_empty() {
            return RegionType::Ram;
        }
        self.regions
            .iter()
            .find(|r| address >= r.start && address - r.start < r.len)
            .map(|r| r.ty)
            .unwrap_or(RegionType::Unmapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian() {
        let mut mem = SparseMemory::new();
        mem.write_mem(0x10, 0x1122_3344, 4).unwrap();

        assert_eq!(mem.read_mem(0x10, 1), 0x44);
        assert_eq!(mem.read_mem(0x11, 1), 0x33);
        assert_eq!(mem.read_mem(0x10, 2), 0x3344);
        assert_eq!(mem.read_mem(0x10, 8), 0x1122_3344);
    }

    #[test]
    fn test_partial_write() {
        let mut mem = SparseMemory::new();
        mem.write_mem(0, 0xaabb_ccdd, 4).unwrap();
        mem.write_mem(0, 0x1122_3344, 1).unwrap();

        assert_eq!(mem.read_mem(0, 4), 0xaabb_cc44);
    }

    #[test]
    fn test_zero_bytes_are_not_stored() {
        let mut mem = SparseMemory::new();
        mem.write_mem(0, 0xff, 1).unwrap();
        assert_eq!(mem.len(), 1);
        mem.write_mem(0, 0, 1).unwrap();
        assert!(mem.is_empty());
    }

    #[test]
    fn test_regions() {
        let mut mem = SparseMemory::new()
            .with_region(0, 4, RegionType::Rom)
            .with_region(4, 4, RegionType::Ram);

        assert_eq!(mem.region_type(3), RegionType::Rom);
        assert_eq!(mem.region_type(4), RegionType::Ram);
        assert_eq!(mem.region_type(8), RegionType::Unmapped);

        assert_eq!(mem.write_mem(2, 0, 1), Err(AddressError::ReadOnly(2)));
        // Straddling into the unmapped space fails without writing anything.
        assert_eq!(mem.write_mem(6, 0xffff_ffff, 4), Err(AddressError::Unmapped(8)));
        assert_eq!(mem.read_mem(6, 2), 0);

        mem.force_mem(2, 0x7, 1).unwrap();
        assert_eq!(mem.read_mem(2, 1), 0x7);
        assert_eq!(mem.read_mem(0x1000, 4), 0);
    }

    #[test]
    fn test_invalid_width() {
        let mut mem = SparseMemory::new();
        assert_eq!(
            mem.write_mem(0, 0, 9),
            Err(AddressError::InvalidWidth { bytes: 9, max: 8 })
        );
    }
}
