//! The minimal solver/node/link contract this crate relies on.
//!
//! spec.md §4.5 and §9 treat the surrounding network solver as an external
//! collaborator "shown for completeness": the link never sees the solver's
//! matrix, and the solver never sees the link's protocol state. The four
//! traits below are that seam, expressed as narrow capability handles
//! (Design Notes: "model as a capability handle") rather than as a
//! concrete solver type the link would otherwise have to own or depend on.

use tf_core::units::Pressure;
use tf_core::NodeId;

/// Read-only view of the interface node's solved state, as the
/// surrounding linear-system solver would report it each step.
pub trait NodeView {
    /// The node's solved potential (pressure).
    fn potential(&self) -> Pressure;

    /// The node's network capacitance, `∂(mole content)/∂(pressure)`, as
    /// measured by the solver's probe-flux injection (spec.md §4.4 step 5,
    /// `constants::PROBE_FLUX`).
    fn network_capacitance(&self) -> f64;

    /// The capacitance-sensitivity entry `∂p_i/∂Q_i` for injecting a unit
    /// flow at `other` and observing the resulting potential change at
    /// this node — the row spec.md §4.4 step 1 calls `dp_i`/`dp_j`.
    /// Returns 0.0 if `other` is not (yet) part of the solved network.
    fn capacitance_delta_potential(&self, other: NodeId) -> f64;

    /// The node's own resident bulk mole fractions, in interface wire
    /// order. Used only as the Demand controller's recovery fallback
    /// when the freshly computed inbound-derived mixture would
    /// otherwise be pushed non-physical (spec.md §7 item 3, "Transient
    /// data mismatch").
    fn bulk_mole_fractions(&self) -> &[f64];
}

/// Non-owning handle to the interface node's capacitor link, the
/// cyclic-dependency seam from Design Notes: the interface link mutates
/// the capacitor's volume on mode flips, while the capacitor's volume
/// feeds back into the network capacitance the link publishes. Ownership
/// of the capacitor stays with the network container; the interface link
/// only ever sees this capability handle.
pub trait VolumeHandle {
    /// Request the capacitor volume be set. `enable = false` drives the
    /// node to zero capacitive volume (pure pressure-sourced boundary,
    /// spec.md §3 invariant); `enable = true` restores `value_m3`.
    fn edit_volume(&mut self, enable: bool, value_m3: f64);

    /// Current commanded volume (m³).
    fn get_volume(&self) -> f64;
}

/// Per-tick admittance/source stamp a link contributes to the
/// surrounding linear system: a diagonal conductance and a source-vector
/// entry at this link's node.
pub trait AdmittanceSink {
    /// Stamp a diagonal admittance (conductance) contribution, `G`.
    fn stamp_admittance(&mut self, g: f64);

    /// Stamp a source-vector contribution (`G * p_peer` for the Demand
    /// controller).
    fn stamp_source(&mut self, value: f64);
}

/// Molar flow bookkeeping hook used by the Supply Responder (outflow to a
/// Demand peer) and symmetric inflow accounting.
pub trait FlowSink {
    /// Schedule a molar flow (mol/s, signed per spec.md §4.4 step 4's
    /// direction convention) for the solver's flow bookkeeping.
    fn stamp_molar_flow(&mut self, mol_per_s: f64);
}
