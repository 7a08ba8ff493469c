//! tf-distif: distributed fluid interface protocol for thermoflow.
//!
//! Lets two fluid networks running in separate processes (or separate
//! solver instances within one process) agree on the pressure, flow,
//! energy and chemical composition at a shared boundary node, without
//! either side needing to see the other's internal matrix or fluid
//! state. One side publishes ("Supply"), the other consumes
//! ("Demand"); which side holds which role is negotiated at start-up
//! and renegotiated as the two networks' relative capacitance shifts.
//!
//! # Architecture
//!
//! - [`payload`] — the versioned wire record exchanged once per tick.
//! - [`arbiter`] — the Mode Arbiter deciding which side holds Demand.
//! - [`demand`] — the Demand Controller's lag-aware admittance law.
//! - [`supply`] — the Supply Responder's publish/flow-stamp pair.
//! - [`mixture`] — the negotiated species ordering and mole-to-mass
//!   conversion the Demand side needs to push composition into its node.
//! - [`node`] — the minimal solver/node/link contract ([`node::NodeView`],
//!   [`node::VolumeHandle`], [`node::AdmittanceSink`], [`node::FlowSink`])
//!   this crate relies on without owning or depending on a concrete solver.
//! - [`link`] — [`link::DistributedFluidInterfaceLink`], wiring the above
//!   together behind the [`link::NetworkLinkOps`] capability set a
//!   surrounding solver calls once per tick.
//!
//! # Example
//!
//! ```no_run
//! use tf_distif::config::LinkConfig;
//! use tf_distif::link::{DistributedFluidInterfaceLink, NetworkLinkOps};
//! use tf_distif::mixture::InterfaceSpecies;
//! use tf_core::NodeId;
//! use tf_fluids::Species;
//!
//! let species = InterfaceSpecies::new(vec![Species::O2, Species::N2], vec![]);
//! let mut link = DistributedFluidInterfaceLink::new(
//!     LinkConfig::default(),
//!     species,
//!     NodeId::from_index(1),
//!     0.1,
//! )
//! .unwrap();
//! ```

pub mod arbiter;
pub mod config;
pub mod constants;
pub mod demand;
pub mod error;
pub mod link;
pub mod mixture;
pub mod node;
pub mod payload;
pub mod supply;

pub use arbiter::{FlipEvent, Mode, ModeArbiter};
pub use config::{FluidSizesOverride, LinkConfig};
pub use demand::{DemandController, DemandStep};
pub use error::{DistifError, DistifResult};
pub use link::{DistributedFluidInterfaceLink, NetworkLinkOps, PendingNodePush};
pub use mixture::InterfaceSpecies;
pub use node::{AdmittanceSink, FlowSink, NodeView, VolumeHandle};
pub use payload::InterfacePayload;
pub use supply::SupplyResponder;
