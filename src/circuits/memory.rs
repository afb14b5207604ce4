//! Memory components, they forward every access to a [SharedAddressSpace]
//! and keep an undo record for each clock edge.
//!
//! Sibling components can share the same address space, e.g. a [write_memory]
//! and a [read_memory] wired in parallel make up an [async_read_memory].
use crate::address_space::{RegionType, SharedAddressSpace};
use crate::data_structures::History;
use crate::error::{AddressError, SimError};
use crate::graph::*;
use std::cell::Cell;
use std::rc::Rc;
use strum_macros::{Display, EnumString};

/// Width of the `wr_width` input, enough to count the bytes of a 64 bit word.
pub const WR_WIDTH_BITS: u32 = 4;

/// How the `addr` input of a memory selects bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Indexing {
    /// `addr` is a byte address.
    Byte,
    /// `addr` counts data words, the byte address is `addr * data_bytes`.
    Word,
}

/// Undo record of a single clock edge of a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryEviction {
    /// Whether a write happened on this edge, records without a write undo nothing.
    pub write_enable: bool,
    /// Byte address of the access.
    pub address: u64,
    /// Bytes at `address` before the write.
    pub previous: u64,
    /// Number of bytes written.
    pub bytes: u32,
}

#[derive(Debug, Clone, Copy)]
struct MemoryRecord {
    eviction: MemoryEviction,
    // Registered read value before the edge, only used by sync read memories.
    data_out: u64,
}

#[derive(Clone)]
struct MemoryAccess {
    memory: SharedAddressSpace,
    indexing: Indexing,
    data_bytes: u32,
}

impl MemoryAccess {
    fn new<const D: u32>(memory: SharedAddressSpace, indexing: Indexing) -> Self {
        Self {
            memory,
            indexing,
            data_bytes: num_integer::div_ceil(D, 8),
        }
    }

    fn byte_address(&self, address: u64) -> u64 {
        match self.indexing {
            Indexing::Byte => address,
            Indexing::Word => address.wrapping_mul(u64::from(self.data_bytes)),
        }
    }

    /// Reads a data word at the byte address `address`.
    fn read_word(&self, address: u64) -> u64 {
        self.memory.borrow().read_mem(address, self.data_bytes)
    }

    fn region(&self, address: u64) -> RegionType {
        self.memory.borrow().region_type(self.byte_address(address))
    }
}

#[derive(Debug, Clone, Copy)]
struct WritePorts<const A: u32, const D: u32> {
    addr: Input<A>,
    data_in: Input<D>,
    wr_width: Input<WR_WIDTH_BITS>,
    wr_en: Input<1>,
}

impl<const A: u32, const D: u32> WritePorts<A, D> {
    fn new(d: &mut DesignBuilder, component: ComponentId) -> Result<Self, SimError> {
        Ok(Self {
            addr: d.add_input(component, "addr")?,
            data_in: d.add_input(component, "data_in")?,
            wr_width: d.add_input(component, "wr_width")?,
            wr_en: d.add_input(component, "wr_en")?,
        })
    }
}

struct WriteMemoryState<const A: u32, const D: u32> {
    path: String,
    ports: WritePorts<A, D>,
    access: MemoryAccess,
    // Registered read value of sync read memories.
    data_out: Option<Rc<Cell<u64>>>,
    history: History<MemoryRecord>,
}

impl<const A: u32, const D: u32> WriteMemoryState<A, D> {
    fn error(&self, source: AddressError) -> SimError {
        SimError::Memory {
            component: self.path.clone(),
            source,
        }
    }
}

impl<const A: u32, const D: u32> ClockedComponent for WriteMemoryState<A, D> {
    fn reset(&mut self) {
        self.history.clear();
        if let Some(data_out) = &self.data_out {
            data_out.set(0);
        }
    }

    fn check(&self, signals: &Signals<'_>) -> Result<(), SimError> {
        if !signals.read(self.ports.wr_en).as_bool() {
            return Ok(());
        }
        let address = self
            .access
            .byte_address(signals.read(self.ports.addr).unsigned());
        let bytes = signals.read(self.ports.wr_width).unsigned() as u32;
        if bytes > self.access.data_bytes {
            return Err(self.error(AddressError::InvalidWidth {
                bytes,
                max: self.access.data_bytes,
            }));
        }
        let memory = self.access.memory.borrow();
        for i in 0..u64::from(bytes) {
            let byte_address = address.wrapping_add(i);
            match memory.region_type(byte_address) {
                RegionType::Unmapped => return Err(self.error(AddressError::Unmapped(byte_address))),
                RegionType::Rom => return Err(self.error(AddressError::ReadOnly(byte_address))),
                RegionType::Ram | RegionType::Io => {}
            }
        }
        Ok(())
    }

    fn save(&mut self, signals: &Signals<'_>) -> Result<(), SimError> {
        self.check(signals)?;
        let write_enable = signals.read(self.ports.wr_en).as_bool();
        let address = self
            .access
            .byte_address(signals.read(self.ports.addr).unsigned());
        let bytes = signals.read(self.ports.wr_width).unsigned() as u32;

        let previous = self
            .access
            .memory
            .borrow()
            .read_mem(address, bytes.min(self.access.data_bytes));
        if write_enable {
            let value = signals.read(self.ports.data_in).unsigned();
            let written = self.access.memory.borrow_mut().write_mem(address, value, bytes);
            written.map_err(|e| self.error(e))?;
        }

        let record = MemoryRecord {
            eviction: MemoryEviction {
                write_enable,
                address,
                previous,
                bytes,
            },
            data_out: self.data_out.as_ref().map_or(0, |d| d.get()),
        };
        if let Some(evicted) = self.history.push(record) {
            log::trace!("{}: history full, dropped {:?}", self.path, evicted.eviction);
        }

        if let Some(data_out) = &self.data_out {
            data_out.set(self.access.read_word(address));
        }
        Ok(())
    }

    fn reverse(&mut self) -> Result<(), SimError> {
        let record = match self.history.pop() {
            Some(record) => record,
            None => return Ok(()),
        };
        let MemoryEviction {
            write_enable,
            address,
            previous,
            bytes,
        } = record.eviction;
        if write_enable {
            let restored = self.access.memory.borrow_mut().write_mem(address, previous, bytes);
            restored.map_err(|e| self.error(e))?;
        }
        if let Some(data_out) = &self.data_out {
            data_out.set(record.data_out);
        }
        Ok(())
    }

    fn force_value(&mut self, address: u64, value: u64) -> Result<(), SimError> {
        let address = self.access.byte_address(address);
        let forced = self
            .access
            .memory
            .borrow_mut()
            .force_mem(address, value, self.access.data_bytes);
        forced.map_err(|e| self.error(e))
    }

    fn history_depth(&self) -> usize {
        self.history.capacity()
    }

    fn set_history_depth(&mut self, depth: usize) {
        self.history.set_capacity(depth);
    }

    fn reversible_steps(&self) -> usize {
        self.history.len()
    }
}

/// Ports of a memory created by [write_memory].
#[derive(Clone)]
pub struct WriteMemory<const A: u32, const D: u32> {
    pub component: ComponentId,
    pub addr: Input<A>,
    pub data_in: Input<D>,
    /// Number of bytes of `data_in` to write.
    pub wr_width: Input<WR_WIDTH_BITS>,
    pub wr_en: Input<1>,
    access: MemoryAccess,
}

/// Ports of a memory created by [read_memory] or [rom].
#[derive(Clone)]
pub struct ReadMemory<const A: u32, const D: u32> {
    pub component: ComponentId,
    pub addr: Input<A>,
    pub data_out: Output<D>,
    access: MemoryAccess,
}

/// Ports of a memory created by [async_read_memory].
#[derive(Clone)]
pub struct AsyncReadMemory<const A: u32, const D: u32> {
    pub component: ComponentId,
    pub addr: Input<A>,
    pub data_in: Input<D>,
    pub wr_width: Input<WR_WIDTH_BITS>,
    pub wr_en: Input<1>,
    pub data_out: Output<D>,
    /// Clocked sub component handling writes.
    pub write: WriteMemory<A, D>,
    /// Combinational sub component handling reads.
    pub read: ReadMemory<A, D>,
    access: MemoryAccess,
}

/// Ports of a memory created by [sync_read_memory].
#[derive(Clone)]
pub struct SyncReadMemory<const A: u32, const D: u32> {
    pub component: ComponentId,
    pub addr: Input<A>,
    pub data_in: Input<D>,
    pub wr_width: Input<WR_WIDTH_BITS>,
    pub wr_en: Input<1>,
    /// Word at `addr` sampled on the last clock edge.
    pub data_out: Output<D>,
    access: MemoryAccess,
}

macro_rules! memory_views {
    ($($ty:ident),*) => {
        $(
            impl<const A: u32, const D: u32> $ty<A, D> {
                /// Returns the address space backing the memory.
                pub fn memory(&self) -> &SharedAddressSpace {
                    &self.access.memory
                }

                /// Returns how `addr` selects bytes.
                pub fn indexing(&self) -> Indexing {
                    self.access.indexing
                }

                /// Returns the kind of region the current `addr` points into.
                pub fn access_region(&self, sim: &Simulator) -> RegionType {
                    self.access.region(sim.input_value(self.addr).unsigned())
                }
            }
        )*
    };
}

memory_views!(WriteMemory, ReadMemory, AsyncReadMemory, SyncReadMemory);

fn add_write_memory<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    component: ComponentId,
    access: &MemoryAccess,
    data_out: Option<Rc<Cell<u64>>>,
) -> Result<WritePorts<A, D>, SimError> {
    let ports = WritePorts::<A, D>::new(d, component)?;
    let path = d.component_path(component).to_string();
    d.add_clocked(
        component,
        Box::new(WriteMemoryState {
            path,
            ports,
            access: access.clone(),
            data_out,
            history: Default::default(),
        }),
    );
    Ok(ports)
}

/// Returns the ports of a new clocked memory named `name` that writes the low `wr_width`
/// bytes of `data_in` at `addr` on clock edges where `wr_en` is 1.
///
/// Reversing a clock edge writes back the bytes that were overwritten.
/// Writes to read only or unmapped addresses, and a `wr_width` larger than the data word,
/// fail the clock with [SimError::Memory].
pub fn write_memory<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    memory: SharedAddressSpace,
    indexing: Indexing,
) -> Result<WriteMemory<A, D>, SimError> {
    let component = d.add_component(name, parent)?;
    let access = MemoryAccess::new::<D>(memory, indexing);
    let ports = add_write_memory::<A, D>(d, component, &access, None)?;
    Ok(WriteMemory {
        component,
        addr: ports.addr,
        data_in: ports.data_in,
        wr_width: ports.wr_width,
        wr_en: ports.wr_en,
        access,
    })
}

/// Returns the ports of a new combinational memory named `name`,
/// `data_out` always holds the word at `addr`.
pub fn read_memory<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    memory: SharedAddressSpace,
    indexing: Indexing,
) -> Result<ReadMemory<A, D>, SimError> {
    let component = d.add_component(name, parent)?;
    let addr = d.add_input::<A>(component, "addr")?;
    let data_out = d.add_output::<D>(component, "data_out")?;

    let access = MemoryAccess::new::<D>(memory, indexing);
    let reader = access.clone();
    d.set_function(data_out, move |s| {
        reader.read_word(reader.byte_address(s.read(addr).unsigned()))
    })?;
    Ok(ReadMemory {
        component,
        addr,
        data_out,
        access,
    })
}

/// Returns the ports of a new read only memory named `name`.
///
/// The contents are expected to be loaded out of band, through the address space
/// or [Simulator::force_value] on a clocked sibling.
///
/// # Example
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, rom, Indexing};
/// # use rtlsim::address_space::{RegionType, SparseMemory};
/// let mut memory = SparseMemory::new().with_region(0, 0x100, RegionType::Rom);
/// memory.load(0x10, &[0xef, 0xbe, 0xad, 0xde]);
/// let memory = memory.shared();
///
/// # let mut d = DesignBuilder::new();
/// # let top = d.add_component("top", None).unwrap();
/// let pc = d.lever::<32>(top, "pc", 4).unwrap();
/// let program = rom::<32, 32>(&mut d, Some(top), "program", memory, Indexing::Word).unwrap();
/// d.connect(pc.output(), program.addr).unwrap();
///
/// let sim = d.build(SimConfig::default()).unwrap();
/// assert_eq!(sim.value(program.data_out).unsigned(), 0xdead_beef);
/// assert_eq!(program.access_region(&sim), RegionType::Rom);
/// ```
pub fn rom<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    memory: SharedAddressSpace,
    indexing: Indexing,
) -> Result<ReadMemory<A, D>, SimError> {
    read_memory(d, parent, name, memory, indexing)
}

/// Returns the ports of a new memory named `name` made of a [write_memory] and a [read_memory]
/// sharing `memory`. `data_out` follows `addr` combinationally, writes are visible
/// after the clock edge that commits them.
///
/// The write sub component is the clocked one, [Simulator::force_value] goes through
/// [AsyncReadMemory::write].
///
/// # Example
/// ```
/// # use rtlsim::{DesignBuilder, SimConfig, async_read_memory, Indexing};
/// # use rtlsim::address_space::SparseMemory;
/// # let mut d = DesignBuilder::new();
/// # let top = d.add_component("top", None).unwrap();
/// let addr = d.lever::<16>(top, "addr", 8).unwrap();
/// let data = d.lever::<32>(top, "data", 0xcafe).unwrap();
/// let width = d.lever::<4>(top, "width", 4).unwrap();
/// let en = d.lever::<1>(top, "en", 1).unwrap();
///
/// let mem = async_read_memory::<16, 32>(&mut d, Some(top), "mem", SparseMemory::new().shared(), Indexing::Byte).unwrap();
/// d.connect(addr.output(), mem.addr).unwrap();
/// d.connect(data.output(), mem.data_in).unwrap();
/// d.connect(width.output(), mem.wr_width).unwrap();
/// d.connect(en.output(), mem.wr_en).unwrap();
///
/// let mut sim = d.build(SimConfig::default()).unwrap();
/// assert_eq!(sim.value(mem.data_out).unsigned(), 0);
///
/// sim.clock().unwrap();
/// assert_eq!(sim.value(mem.data_out).unsigned(), 0xcafe);
///
/// sim.reverse().unwrap();
/// assert_eq!(sim.value(mem.data_out).unsigned(), 0);
/// ```
pub fn async_read_memory<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    memory: SharedAddressSpace,
    indexing: Indexing,
) -> Result<AsyncReadMemory<A, D>, SimError> {
    let component = d.add_component(name, parent)?;
    let ports = WritePorts::<A, D>::new(d, component)?;
    let data_out = d.add_output::<D>(component, "data_out")?;

    let write = write_memory::<A, D>(d, Some(component), "wr_mem", memory.clone(), indexing)?;
    let read = read_memory::<A, D>(d, Some(component), "rd_mem", memory, indexing)?;

    d.connect_inputs(ports.addr, write.addr)?;
    d.connect_inputs(ports.data_in, write.data_in)?;
    d.connect_inputs(ports.wr_width, write.wr_width)?;
    d.connect_inputs(ports.wr_en, write.wr_en)?;
    d.connect_inputs(ports.addr, read.addr)?;
    d.forward(read.data_out, data_out)?;

    Ok(AsyncReadMemory {
        component,
        addr: ports.addr,
        data_in: ports.data_in,
        wr_width: ports.wr_width,
        wr_en: ports.wr_en,
        data_out,
        access: write.access.clone(),
        write,
        read,
    })
}

/// Returns the ports of a new clocked memory named `name` with a registered read port:
/// on every clock edge the write is committed first, then the word at `addr` is sampled
/// into `data_out`.
pub fn sync_read_memory<const A: u32, const D: u32>(
    d: &mut DesignBuilder,
    parent: Option<ComponentId>,
    name: &str,
    memory: SharedAddressSpace,
    indexing: Indexing,
) -> Result<SyncReadMemory<A, D>, SimError> {
    let component = d.add_component(name, parent)?;
    let access = MemoryAccess::new::<D>(memory, indexing);
    let registered = Rc::new(Cell::new(0));
    let ports = add_write_memory::<A, D>(d, component, &access, Some(registered.clone()))?;

    let data_out = d.add_output::<D>(component, "data_out")?;
    d.set_function(data_out, move |_| registered.get())?;

    Ok(SyncReadMemory {
        component,
        addr: ports.addr,
        data_in: ports.data_in,
        wr_width: ports.wr_width,
        wr_en: ports.wr_en,
        data_out,
        access,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::{AddressSpace, SparseMemory};
    use crate::{Lever, SimConfig};

    struct Harness {
        addr: Lever<16>,
        data: Lever<32>,
        width: Lever<4>,
        en: Lever<1>,
    }

    impl Harness {
        fn new(d: &mut DesignBuilder, top: ComponentId) -> Self {
            Self {
                addr: d.lever(top, "addr", 0).unwrap(),
                data: d.lever(top, "data", 0).unwrap(),
                width: d.lever(top, "width", 4).unwrap(),
                en: d.lever(top, "en", 0).unwrap(),
            }
        }

        fn connect(&self, d: &mut DesignBuilder, addr: Input<16>, data: Input<32>, width: Input<4>, en: Input<1>) {
            d.connect(self.addr.output(), addr).unwrap();
            d.connect(self.data.output(), data).unwrap();
            d.connect(self.width.output(), width).unwrap();
            d.connect(self.en.output(), en).unwrap();
        }

        fn write(&self, sim: &mut Simulator, addr: u64, data: u64, width: u64) -> Result<(), SimError> {
            sim.set_lever(self.addr, addr);
            sim.set_lever(self.data, data);
            sim.set_lever(self.width, width);
            sim.set_lever(self.en, 1);
            sim.clock()
        }

        fn read(&self, sim: &mut Simulator, addr: u64) {
            sim.set_lever(self.en, 0);
            sim.set_lever_stable(self.addr, addr).unwrap();
        }
    }

    #[test]
    fn test_async_read_sees_writes_after_the_edge() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let h = Harness::new(&mut d, top);
        let memory = SparseMemory::new().shared();
        let mem = async_read_memory::<16, 32>(&mut d, Some(top), "mem", memory.clone(), Indexing::Byte).unwrap();
        h.connect(&mut d, mem.addr, mem.data_in, mem.wr_width, mem.wr_en);

        let mut sim = d.build(SimConfig::default()).unwrap();
        sim.set_lever(h.addr, 0x20);
        sim.set_lever(h.data, 0x1234_5678);
        sim.set_lever_stable(h.en, 1).unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0);

        sim.clock().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0x1234_5678);
        assert_eq!(memory.borrow().read_mem(0x20, 4), 0x1234_5678);

        // Sub components read through the container ports.
        assert_eq!(sim.connected_component(mem.write.addr), top);
        assert_eq!(sim.component_path(mem.read.component), "top.mem.rd_mem");
        assert!(sim.force_value(mem.component, 0, 0).is_err());
    }

    #[test]
    fn test_partial_writes_reverse() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let h = Harness::new(&mut d, top);
        let mem = async_read_memory::<16, 32>(&mut d, Some(top), "mem", SparseMemory::new().shared(), Indexing::Byte).unwrap();
        h.connect(&mut d, mem.addr, mem.data_in, mem.wr_width, mem.wr_en);

        let mut sim = d.build(SimConfig::default()).unwrap();
        h.write(&mut sim, 0, 0xaabb_ccdd, 4).unwrap();
        h.write(&mut sim, 1, 0x11, 1).unwrap();
        h.read(&mut sim, 0);
        assert_eq!(sim.value(mem.data_out).unsigned(), 0xaabb_11dd);

        sim.reverse().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0xaabb_ccdd);
        sim.reverse().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0);
    }

    #[test]
    fn test_word_indexing() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let h = Harness::new(&mut d, top);
        let memory = SparseMemory::new().shared();
        let mem = async_read_memory::<16, 32>(&mut d, Some(top), "mem", memory.clone(), Indexing::Word).unwrap();
        h.connect(&mut d, mem.addr, mem.data_in, mem.wr_width, mem.wr_en);

        let mut sim = d.build(SimConfig::default()).unwrap();
        h.write(&mut sim, 3, 0xfeed, 4).unwrap();
        assert_eq!(memory.borrow().read_mem(12, 4), 0xfeed);

        sim.force_value(mem.write.component, 1, 0x77).unwrap();
        assert_eq!(memory.borrow().read_mem(4, 4), 0x77);
        assert_eq!(sim.reversible_steps(), 1);
    }

    #[test]
    fn test_rejected_writes() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let h = Harness::new(&mut d, top);
        let memory = SparseMemory::new()
            .with_region(0, 0x10, RegionType::Rom)
            .with_region(0x10, 0x10, RegionType::Ram)
            .shared();
        let mem = write_memory::<16, 32>(&mut d, Some(top), "mem", memory.clone(), Indexing::Byte).unwrap();
        h.connect(&mut d, mem.addr, mem.data_in, mem.wr_width, mem.wr_en);

        let mut sim = d.build(SimConfig::default()).unwrap();
        assert_eq!(
            h.write(&mut sim, 4, 1, 4),
            Err(SimError::Memory {
                component: "top.mem".into(),
                source: AddressError::ReadOnly(4)
            })
        );
        assert_eq!(mem.access_region(&sim), RegionType::Rom);
        assert_eq!(
            h.write(&mut sim, 0x10, 1, 5),
            Err(SimError::Memory {
                component: "top.mem".into(),
                source: AddressError::InvalidWidth { bytes: 5, max: 4 }
            })
        );
        assert!(h.write(&mut sim, 0x40, 1, 1).is_err());

        // Failed edges are not recorded.
        assert_eq!(sim.cycle(), 0);
        assert!(!sim.can_reverse());

        // A disabled write with a bogus width is fine.
        sim.set_lever(h.en, 0);
        sim.set_lever(h.width, 9);
        sim.clock().unwrap();
        assert_eq!(sim.cycle(), 1);

        // Forcing bypasses the protection.
        sim.force_value(mem.component, 0, 0xab).unwrap();
        assert_eq!(memory.borrow().read_mem(0, 1), 0xab);
    }

    #[test]
    fn test_sync_read() {
        let mut d = DesignBuilder::new();
        let top = d.add_component("top", None).unwrap();
        let h = Harness::new(&mut d, top);
        let mem = sync_read_memory::<16, 32>(&mut d, Some(top), "mem", SparseMemory::new().shared(), Indexing::Byte).unwrap();
        h.connect(&mut d, mem.addr, mem.data_in, mem.wr_width, mem.wr_en);

        let mut sim = d.build(SimConfig::default()).unwrap();
        h.write(&mut sim, 8, 42, 4).unwrap();
        // Write first, then sample.
        assert_eq!(sim.value(mem.data_out).unsigned(), 42);

        // Changing the address doesn't change the registered output until the next edge.
        h.read(&mut sim, 0);
        assert_eq!(sim.value(mem.data_out).unsigned(), 42);
        sim.clock().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0);

        sim.reverse().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 42);
        sim.reverse().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0);

        sim.clock().unwrap();
        sim.reset().unwrap();
        assert_eq!(sim.value(mem.data_out).unsigned(), 0);
        assert!(!sim.can_reverse());
    }
}
