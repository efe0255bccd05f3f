//! `PropertySet` and related types for pass communication.
//!
//! Passes share data through a [`PropertySet`]: the optional target
//! [`CouplingMap`] plus arbitrary typed values. The reuse passes store their
//! analysis results ([`CausalCones`](crate::passes::CausalCones)) and
//! statistics ([`ReuseStats`](crate::passes::ReuseStats)) here.
//!
//! # Examples
//!
//! ```
//! use qreuse_compile::{CouplingMap, PropertySet};
//!
//! let props = PropertySet::new().with_coupling_map(CouplingMap::linear(5));
//! assert_eq!(props.coupling_map.as_ref().unwrap().num_qubits(), 5);
//! ```
//!
//! ## Custom properties for pass communication
//!
//! ```
//! use qreuse_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct ResetCount(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(ResetCount(3));
//! assert_eq!(props.get::<ResetCount>(), Some(&ResetCount(3)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

/// Connectivity shape of a target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Qubits in a line: 0-1-2-3-...
    Linear,
    /// Qubit 0 connected to all others.
    Star,
    /// Every pair connected.
    Full,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Linear => write!(f, "linear"),
            Topology::Star => write!(f, "star"),
            Topology::Full => write!(f, "full"),
        }
    }
}

/// Target device coupling map.
///
/// Only the device size takes part in qubit reuse: a rewritten circuit
/// fits the target when it needs no more qubits than the device has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouplingMap {
    topology: Topology,
    num_qubits: u32,
}

impl CouplingMap {
    /// Create a coupling map of the given shape and size.
    pub fn new(topology: Topology, num_qubits: u32) -> Self {
        Self {
            topology,
            num_qubits,
        }
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        Self::new(Topology::Linear, n)
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        Self::new(Topology::Full, n)
    }

    /// Create a star topology (center qubit connected to all others).
    pub fn star(n: u32) -> Self {
        Self::new(Topology::Star, n)
    }

    /// Get the device shape.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Get the number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Whether a circuit needing `required` qubits fits on this device.
    pub fn fits(&self, required: usize) -> bool {
        required <= self.num_qubits as usize
    }
}

/// Formats as `<topology>:<qubits>`, the same form [`FromStr`] accepts.
impl fmt::Display for CouplingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.topology, self.num_qubits)
    }
}

/// Parses `linear:N`, `star:N` or `full:N`.
impl FromStr for CouplingMap {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (topology, size) = s.split_once(':').ok_or_else(|| {
            CompileError::InvalidConfiguration(format!(
                "target '{s}' must look like <topology>:<qubits>"
            ))
        })?;
        let n: u32 = size.trim().parse().map_err(|_| {
            CompileError::InvalidConfiguration(format!("invalid qubit count in target '{s}'"))
        })?;
        match topology.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::linear(n)),
            "star" => Ok(Self::star(n)),
            "full" => Ok(Self::full(n)),
            other => Err(CompileError::InvalidConfiguration(format!(
                "unknown target topology '{other}' (expected linear, star or full)"
            ))),
        }
    }
}

/// Properties shared between compilation passes.
///
/// Standard properties have dedicated public fields; passes store anything
/// else through the type-safe [`insert`](Self::insert) and
/// [`get`](Self::get) methods. Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target coupling map, if compiling for a known device.
    pub coupling_map: Option<CouplingMap>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target coupling map.
    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.coupling_map = Some(coupling_map);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
