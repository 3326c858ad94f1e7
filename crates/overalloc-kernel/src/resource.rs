//! Resource quantities and utilization readings.
//!
//! [`Resource`] is a nominal amount (what is reserved, or what may be lent);
//! [`ResourceUtilization`] is a measured amount (what is actually consumed).
//! They are kept separate because utilization carries fractional CPU and a
//! virtual-memory reading that reservations do not have.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of bytes in one mebibyte.
pub const BYTES_PER_MIB: u64 = 1 << 20;

/// Bit shift converting between mebibytes and bytes.
pub const MIB_SHIFT: u32 = 20;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// An immutable amount of node resources.
///
/// Memory is tracked in whole mebibytes and CPU in whole virtual cores.
/// Subtraction saturates at zero; a resource amount is never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Resource {
    /// Memory in mebibytes.
    pub memory_mib: u64,
    /// Virtual cores.
    pub vcores: u32,
}

impl Resource {
    /// Create a resource amount from raw magnitudes.
    pub const fn new(memory_mib: u64, vcores: u32) -> Self {
        Self { memory_mib, vcores }
    }

    /// The canonical zero amount: nothing of any resource type.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Memory expressed in bytes.
    pub fn memory_bytes(&self) -> u64 {
        self.memory_mib.saturating_mul(BYTES_PER_MIB)
    }

    /// True when every component is zero.
    pub fn is_none(&self) -> bool {
        *self == Self::none()
    }
}

impl Add for Resource {
    type Output = Resource;

    fn add(self, rhs: Resource) -> Resource {
        Resource::new(
            self.memory_mib.saturating_add(rhs.memory_mib),
            self.vcores.saturating_add(rhs.vcores),
        )
    }
}

impl Sub for Resource {
    type Output = Resource;

    fn sub(self, rhs: Resource) -> Resource {
        Resource::new(
            self.memory_mib.saturating_sub(rhs.memory_mib),
            self.vcores.saturating_sub(rhs.vcores),
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<memory:{} MiB, vcores:{}>", self.memory_mib, self.vcores)
    }
}

// ---------------------------------------------------------------------------
// ResourceUtilization
// ---------------------------------------------------------------------------

/// Measured consumption of one container, or the aggregate of many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    /// Resident physical memory in mebibytes.
    pub physical_memory_mib: u64,
    /// Virtual memory in mebibytes.
    pub virtual_memory_mib: u64,
    /// CPU in virtual cores; fractional (1.5 = one and a half cores busy).
    pub cpu: f32,
}

impl ResourceUtilization {
    pub fn new(physical_memory_mib: u64, virtual_memory_mib: u64, cpu: f32) -> Self {
        Self {
            physical_memory_mib,
            virtual_memory_mib,
            cpu,
        }
    }

    /// Physical memory in bytes.
    pub fn physical_memory_bytes(&self) -> u64 {
        self.physical_memory_mib.saturating_mul(BYTES_PER_MIB)
    }

    /// Accumulate another reading into this one.
    pub fn add_from(&mut self, other: &ResourceUtilization) {
        self.physical_memory_mib = self
            .physical_memory_mib
            .saturating_add(other.physical_memory_mib);
        self.virtual_memory_mib = self
            .virtual_memory_mib
            .saturating_add(other.virtual_memory_mib);
        self.cpu += other.cpu;
    }

    /// Remove another reading from this one, flooring every field at zero.
    pub fn subtract_from(&mut self, other: &ResourceUtilization) {
        self.physical_memory_mib = self
            .physical_memory_mib
            .saturating_sub(other.physical_memory_mib);
        self.virtual_memory_mib = self
            .virtual_memory_mib
            .saturating_sub(other.virtual_memory_mib);
        self.cpu = (self.cpu - other.cpu).max(0.0);
    }
}
