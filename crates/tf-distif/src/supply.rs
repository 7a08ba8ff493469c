//! Supply Responder: the side that advertises pressure, mixture and
//! energy, and accepts a molar flow demand back from its Demand peer
//! (spec.md §4.4).

use crate::constants::PROBE_FLUX;
use crate::node::{FlowSink, NodeView};
use crate::payload::InterfacePayload;
use tf_core::NodeId;
use uom::si::pressure::pascal;

/// Publishes this side's boundary state into `outbound` and, when the
/// peer is in Demand, stamps the flow it requested. Stateless: all
/// inputs are supplied per call; unlike the Demand controller, the
/// Supply side never converts mole fractions to mass fractions, so it
/// carries no species table of its own.
#[derive(Debug, Clone, Default)]
pub struct SupplyResponder;

impl SupplyResponder {
    pub fn new() -> Self {
        Self
    }

    /// Publish this tick's pressure, capacitance, mixture and energy into
    /// `outbound` (spec.md §4.4 steps 1-2).
    ///
    /// `capacitance` is this side's raw network capacitance as measured
    /// by the solver's probe-flux injection. `sibling_demand_nodes` lists
    /// `(node id, own capacitance C_k)` for *other* Demand-role interface
    /// links sharing this same solved node. Each sibling's effective
    /// draw on the published capacitance is `C_k * dp_j / max(dp_i, ε)`:
    /// `dp_j` is this node's cross-sensitivity to the sibling
    /// (`capacitance_delta_potential(sibling)`), and `dp_i` is this
    /// node's own self-sensitivity (`capacitance_delta_potential(
    /// local_node_id)`), floored so a near-zero self-sensitivity never
    /// divides by zero. The local node's own ID must not appear in
    /// `sibling_demand_nodes` (no self-term).
    ///
    /// `mole_fractions`/`trace_fractions` and `energy` are read directly
    /// from the local network's fluid state at the interface node, in
    /// the negotiated wire order.
    pub fn publish(
        &self,
        node: &dyn NodeView,
        local_node_id: NodeId,
        sibling_demand_nodes: &[(NodeId, f64)],
        mole_fractions: &[f64],
        trace_fractions: &[f64],
        energy: f64,
        outbound: &mut InterfacePayload,
    ) {
        let self_sensitivity = node
            .capacitance_delta_potential(local_node_id)
            .max(f64::MIN_POSITIVE);

        let mut published_capacitance = node.network_capacitance();
        for &(sibling, sibling_capacitance) in sibling_demand_nodes {
            if sibling == local_node_id {
                continue;
            }
            let cross_sensitivity = node.capacitance_delta_potential(sibling);
            published_capacitance -= sibling_capacitance * cross_sensitivity / self_sensitivity;
        }
        published_capacitance = published_capacitance.max(0.0);

        outbound.capacitance = published_capacitance;
        outbound.demand_mode = false;
        outbound.source = node.potential().get::<pascal>();
        outbound.energy = energy;
        outbound.set_bulk(mole_fractions);
        outbound.set_trace(trace_fractions);
    }

    /// Stamp the molar outflow a valid Demand peer requested (spec.md
    /// §4.4 step 4). `inbound.source` is the peer's flow demand,
    /// positive meaning into *their* node; this side stamps the opposite
    /// sign, since that same mole flux leaves the local node, scaled by
    /// `S_in`, the bulk-mixture fraction of the inbound frame
    /// (`inbound.bulk_sum()`) — bulk and trace fractions sum to 1.0 on
    /// the wire, so trace compounds present in the inbound mixture mean
    /// only part of the demanded flow is bulk molar flow.
    ///
    /// No-op when the inbound frame is not valid or the peer is not
    /// currently in Demand (nothing to honor yet).
    pub fn compute_flows(&self, inbound: &InterfacePayload, flow: &mut dyn FlowSink) {
        if inbound.valid() && inbound.demand_mode {
            flow.stamp_molar_flow(-inbound.source * inbound.bulk_sum());
        }
    }

    /// The capacitance probe-flux magnitude to inject at the interface
    /// node every step, so the surrounding solver can measure
    /// `network_capacitance()` for the next publish (spec.md §4.4 step
    /// 5). Constant regardless of state; exposed as a method so callers
    /// don't need to import `constants` directly.
    pub fn probe_flux(&self) -> f64 {
        PROBE_FLUX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct FakeNode {
        potential_pa: f64,
        capacitance: f64,
        sensitivities: Vec<(NodeId, f64)>,
    }

    impl NodeView for FakeNode {
        fn potential(&self) -> tf_core::units::Pressure {
            tf_core::units::pa(self.potential_pa)
        }
        fn network_capacitance(&self) -> f64 {
            self.capacitance
        }
        fn capacitance_delta_potential(&self, other: NodeId) -> f64 {
            self.sensitivities
                .iter()
                .find(|(id, _)| *id == other)
                .map(|(_, v)| *v)
                .unwrap_or(0.0)
        }
        fn bulk_mole_fractions(&self) -> &[f64] {
            &[]
        }
    }

    #[derive(Default)]
    struct RecordingFlow {
        mol_per_s: f64,
    }

    impl FlowSink for RecordingFlow {
        fn stamp_molar_flow(&mut self, mol_per_s: f64) {
            self.mol_per_s = mol_per_s;
        }
    }

    #[test]
    fn publishes_raw_capacitance_with_no_siblings() {
        let responder = SupplyResponder::new();
        let node = FakeNode {
            potential_pa: 101_325.0,
            capacitance: 2.5,
            sensitivities: vec![],
        };
        let mut outbound = InterfacePayload::new(2, 0);

        responder.publish(&node, NodeId::from_index(1), &[], &[0.21, 0.79], &[], 300.0, &mut outbound);

        assert_eq!(outbound.capacitance, 2.5);
        assert_eq!(outbound.source, 101_325.0);
        assert!(!outbound.demand_mode);
        assert_eq!(outbound.bulk(), &[0.21, 0.79]);
    }

    #[test]
    fn subtracts_sibling_demand_sensitivity() {
        let responder = SupplyResponder::new();
        let local = NodeId::from_index(1);
        let sibling = NodeId::from_index(2);
        let node = FakeNode {
            potential_pa: 101_325.0,
            capacitance: 2.5,
            // dp_i (self) = 2.0, dp_j (cross to sibling) = 1.0, C_k = 2.0
            // draw = 2.0 * 1.0 / 2.0 = 1.0
            sensitivities: vec![(local, 2.0), (sibling, 1.0)],
        };
        let mut outbound = InterfacePayload::new(2, 0);

        responder.publish(&node, local, &[(sibling, 2.0)], &[0.21, 0.79], &[], 300.0, &mut outbound);

        assert_eq!(outbound.capacitance, 1.5);
    }

    #[test]
    fn published_capacitance_is_floored_at_zero() {
        let responder = SupplyResponder::new();
        let local = NodeId::from_index(1);
        let sibling = NodeId::from_index(2);
        let node = FakeNode {
            potential_pa: 101_325.0,
            capacitance: 0.5,
            // draw = 5.0 * 10.0 / 1.0 = 50.0, far past capacitance
            sensitivities: vec![(local, 1.0), (sibling, 10.0)],
        };
        let mut outbound = InterfacePayload::new(2, 0);

        responder.publish(&node, local, &[(sibling, 5.0)], &[0.21, 0.79], &[], 300.0, &mut outbound);

        assert_eq!(outbound.capacitance, 0.0);
    }

    #[test]
    fn self_id_never_subtracted_even_if_listed() {
        let responder = SupplyResponder::new();
        let local = NodeId::from_index(1);
        let node = FakeNode {
            potential_pa: 101_325.0,
            capacitance: 2.5,
            sensitivities: vec![(local, 999.0)],
        };
        let mut outbound = InterfacePayload::new(2, 0);

        responder.publish(&node, local, &[(local, 999.0)], &[0.21, 0.79], &[], 300.0, &mut outbound);

        assert_eq!(outbound.capacitance, 2.5);
    }

    #[test]
    fn self_sensitivity_floor_prevents_division_by_zero() {
        let responder = SupplyResponder::new();
        let local = NodeId::from_index(1);
        let sibling = NodeId::from_index(2);
        let node = FakeNode {
            potential_pa: 101_325.0,
            capacitance: 2.5,
            // no entry for local => capacitance_delta_potential(local) is
            // 0.0, floored to f64::MIN_POSITIVE rather than dividing by 0.
            sensitivities: vec![(sibling, 1.0)],
        };
        let mut outbound = InterfacePayload::new(2, 0);

        responder.publish(&node, local, &[(sibling, 1.0)], &[0.21, 0.79], &[], 300.0, &mut outbound);

        assert_eq!(outbound.capacitance, 0.0);
        assert!(outbound.capacitance.is_finite());
    }

    #[test]
    fn stamps_opposite_sign_flow_for_valid_demand_peer() {
        let responder = SupplyResponder::new();
        let mut inbound = InterfacePayload::new(2, 0);
        inbound.frame_count = 1;
        inbound.energy = 300.0;
        inbound.capacitance = 1.0;
        inbound.demand_mode = true;
        inbound.source = 0.05;
        inbound.set_bulk(&[0.21, 0.79]);

        let mut flow = RecordingFlow::default();
        responder.compute_flows(&inbound, &mut flow);

        assert_eq!(flow.mol_per_s, -0.05);
    }

    #[test]
    fn no_flow_stamped_for_invalid_inbound() {
        let responder = SupplyResponder::new();
        let inbound = InterfacePayload::new(2, 0); // frame_count 0
        let mut flow = RecordingFlow::default();

        responder.compute_flows(&inbound, &mut flow);

        assert_eq!(flow.mol_per_s, 0.0);
    }

    #[test]
    fn flow_scaled_down_by_bulk_fraction_when_trace_compounds_present() {
        let responder = SupplyResponder::new();
        let mut inbound = InterfacePayload::new(2, 1);
        inbound.frame_count = 1;
        inbound.energy = 300.0;
        inbound.capacitance = 1.0;
        inbound.demand_mode = true;
        inbound.source = 0.05;
        // bulk + trace sum to 1.0 on the wire; S_in = 0.97 here.
        inbound.set_bulk(&[0.20, 0.77]);
        inbound.set_trace(&[0.03]);

        let mut flow = RecordingFlow::default();
        responder.compute_flows(&inbound, &mut flow);

        assert!((flow.mol_per_s - (-0.05 * 0.97)).abs() < 1e-12);
        assert!(flow.mol_per_s.abs() < 0.05);
    }

    #[test]
    fn no_flow_stamped_while_peer_still_supply() {
        let responder = SupplyResponder::new();
        let mut inbound = InterfacePayload::new(2, 0);
        inbound.frame_count = 1;
        inbound.energy = 300.0;
        inbound.capacitance = 1.0;
        inbound.demand_mode = false;
        inbound.source = 101_325.0;
        inbound.set_bulk(&[0.21, 0.79]);

        let mut flow = RecordingFlow::default();
        responder.compute_flows(&inbound, &mut flow);

        assert_eq!(flow.mol_per_s, 0.0);
    }

    #[test]
    fn probe_flux_matches_module_constant() {
        let responder = SupplyResponder::new();
        assert_eq!(responder.probe_flux(), PROBE_FLUX);
    }
}
