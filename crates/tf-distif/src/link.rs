//! The distributed fluid interface link: wires payload, arbiter, Demand
//! controller and Supply responder together behind the `NetworkLinkOps`
//! capability set (spec.md §9 Design Notes; SPEC_FULL.md §4.6).

use crate::arbiter::{Mode, ModeArbiter};
use crate::config::LinkConfig;
use crate::demand::DemandController;
use crate::error::DistifResult;
use crate::mixture::InterfaceSpecies;
use crate::node::{AdmittanceSink, FlowSink, NodeView, VolumeHandle};
use crate::payload::InterfacePayload;
use crate::supply::SupplyResponder;
use tf_core::NodeId;
use uom::si::pressure::pascal;

/// The capability set a surrounding solver uses to treat a distributed
/// fluid interface link alongside conductors, sources and capacitors,
/// without an inheritance hierarchy (Design Notes: "polymorphism over
/// link kinds ... capability set, not inheritance"). Call order per
/// tick matches spec.md §5's data flow:
///
/// ```text
/// receive(inbound) -> process_inputs() -> [solver: stamp_admittance, stamp_source]
///   -> solve -> compute_flows() -> transport_flows() -> process_outputs() -> outbound()
/// ```
pub trait NetworkLinkOps: Send + Sync {
    /// Pre-solve: stamp this tick's diagonal admittance into `sink`.
    /// No-op in Supply mode (Supply contributes no admittance, only a
    /// flow source once the solver has run).
    fn stamp_admittance(&mut self, dt: f64, sink: &mut dyn AdmittanceSink);

    /// Pre-solve: stamp this tick's source-vector entry into `sink`.
    fn stamp_source(&mut self, sink: &mut dyn AdmittanceSink);

    /// Post-solve: compute the flow this link moves this tick. In
    /// Supply mode, stamps the peer's requested molar outflow. No-op in
    /// Demand mode (the Demand side's flow is the admittance/source
    /// pair already stamped; there is nothing further to compute here).
    fn compute_flows(&mut self, dt: f64, flow: &mut dyn FlowSink);

    /// Post-solve: transport accounting hook. This link's composition
    /// and energy hand-off happens synchronously inside
    /// `process_inputs` (Demand) and `process_outputs` (Supply); this
    /// method exists to complete the six-operation capability set a
    /// solver expects from every link kind, and is a deliberate no-op
    /// here.
    fn transport_flows(&mut self, dt: f64);

    /// Pre-solve: read the inbound payload, run mode arbitration rules
    /// 1-3, and — while in Demand — run the Demand law, caching its
    /// admittance/source/composition results for `stamp_admittance`/
    /// `stamp_source` and for the caller to push into the node.
    fn process_inputs(
        &mut self,
        node: &dyn NodeView,
        volume: &mut dyn VolumeHandle,
    ) -> DistifResult<()>;

    /// Post-solve: run mode arbitration rule 4 (Supply-side capacitance
    /// flip), assemble and publish the outbound payload, advance frame
    /// counters. `sibling_demand_nodes` lists `(node id, own capacitance)`
    /// for other Demand-role links sharing this node, passed straight
    /// through to `SupplyResponder::publish`.
    fn process_outputs(
        &mut self,
        node: &dyn NodeView,
        sibling_demand_nodes: &[(NodeId, f64)],
        mole_fractions: &[f64],
        trace_fractions: &[f64],
        energy: f64,
        volume: &mut dyn VolumeHandle,
    ) -> DistifResult<()>;
}

/// The peer's renormalized mass fractions and energy, cached by
/// `process_inputs` while in Demand, for the caller to push into the
/// local node once the tick's arbitration and stamping have run.
#[derive(Debug, Clone, Default)]
pub struct PendingNodePush {
    pub mass_fractions: Vec<f64>,
    pub trace_fractions: Vec<f64>,
    pub energy: Option<f64>,
    pub pressure_pa: Option<f64>,
}

/// One side of a distributed fluid interface.
pub struct DistributedFluidInterfaceLink {
    cfg: LinkConfig,
    local_node_id: NodeId,
    arbiter: ModeArbiter,
    demand: DemandController,
    supply: SupplyResponder,
    dt: f64,
    inbound: InterfacePayload,
    outbound: InterfacePayload,
    pending_conductance: f64,
    pending_source: f64,
    /// `G * dt` from the last Demand step: the capacitance this side
    /// consumes from its own node while in Demand (spec.md §4.3's final
    /// paragraph). Exposed so a node hosting more than one interface can
    /// feed it into that node's own Supply Responder call as one of the
    /// "this link itself, rarely" subtractions in spec.md §4.4 step 1.
    supplied_capacitance: f64,
    pending_node_push: PendingNodePush,
}

impl DistributedFluidInterfaceLink {
    /// Construct a link. `species` fixes the negotiated interface
    /// widths (spec.md §3 "Interface Sizes"); both peers must agree on
    /// this out of band. `dt` is the solver step this link's network
    /// runs at.
    pub fn new(
        cfg: LinkConfig,
        species: InterfaceSpecies,
        local_node_id: NodeId,
        dt: f64,
    ) -> DistifResult<Self> {
        cfg.validate()?;
        let num_bulk = species.num_bulk();
        let num_tc = species.num_tc();
        Ok(Self {
            cfg,
            local_node_id,
            arbiter: ModeArbiter::new(),
            demand: DemandController::new(species),
            supply: SupplyResponder::new(),
            dt,
            inbound: InterfacePayload::new(num_bulk, num_tc),
            outbound: InterfacePayload::new(num_bulk, num_tc),
            pending_conductance: 0.0,
            pending_source: 0.0,
            supplied_capacitance: 0.0,
            pending_node_push: PendingNodePush::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    /// Capacitance this side is consuming from its own node this tick
    /// while in Demand (`0.0` while in Supply). See the field doc for
    /// why a caller would need this.
    pub fn supplied_capacitance(&self) -> f64 {
        self.supplied_capacitance
    }

    /// The payload to hand to the transport for publishing to the peer.
    pub fn outbound(&self) -> &InterfacePayload {
        &self.outbound
    }

    /// Copy a freshly received frame from the peer into this link's
    /// inbound buffer, tolerating a size mismatch the same way the
    /// payload type itself does.
    pub fn receive(&mut self, frame: &InterfacePayload) {
        self.inbound.assign_from(frame);
    }

    /// What to push into the local node's composition/thermal state
    /// this tick, if anything (populated by `process_inputs` while in
    /// Demand with a valid inbound frame).
    pub fn pending_node_push(&self) -> &PendingNodePush {
        &self.pending_node_push
    }

    fn loop_latency(&self) -> u64 {
        self.outbound
            .frame_count
            .saturating_sub(self.inbound.frame_loopback)
    }
}

impl NetworkLinkOps for DistributedFluidInterfaceLink {
    fn stamp_admittance(&mut self, _dt: f64, sink: &mut dyn AdmittanceSink) {
        if self.arbiter.mode() == Mode::Demand {
            sink.stamp_admittance(self.pending_conductance);
        }
    }

    fn stamp_source(&mut self, sink: &mut dyn AdmittanceSink) {
        if self.arbiter.mode() == Mode::Demand {
            sink.stamp_source(self.pending_source);
        }
    }

    fn compute_flows(&mut self, _dt: f64, flow: &mut dyn FlowSink) {
        if self.arbiter.mode() == Mode::Supply {
            self.supply.compute_flows(&self.inbound, flow);
        }
    }

    fn transport_flows(&mut self, _dt: f64) {}

    fn process_inputs(
        &mut self,
        node: &dyn NodeView,
        volume: &mut dyn VolumeHandle,
    ) -> DistifResult<()> {
        let local_capacitance = node.network_capacitance();
        self.arbiter
            .on_inbound(&self.cfg, &self.inbound, local_capacitance, volume, &mut self.outbound);

        self.pending_conductance = 0.0;
        self.pending_source = 0.0;
        self.supplied_capacitance = 0.0;
        self.pending_node_push = PendingNodePush::default();

        if self.arbiter.mode() == Mode::Demand {
            let loop_latency = self.loop_latency();
            let num_bulk = self.inbound.num_bulk();
            let num_tc = self.inbound.num_tc();
            let mut mass = vec![0.0; num_bulk];
            let mut trace = vec![0.0; num_tc];
            let step = self.demand.step(
                &self.cfg,
                &self.inbound,
                local_capacitance,
                self.dt,
                loop_latency,
                0.0,
                node,
                &mut mass,
                &mut trace,
            )?;
            self.pending_conductance = step.conductance;
            self.pending_source = step.source;
            self.supplied_capacitance = step.supplied_capacitance;
            self.outbound.capacitance = local_capacitance;
            if step.energy.is_some() {
                self.pending_node_push = PendingNodePush {
                    mass_fractions: mass,
                    trace_fractions: trace,
                    energy: step.energy,
                    pressure_pa: Some(self.inbound.source),
                };
            }
        }
        Ok(())
    }

    fn process_outputs(
        &mut self,
        node: &dyn NodeView,
        sibling_demand_nodes: &[(NodeId, f64)],
        mole_fractions: &[f64],
        trace_fractions: &[f64],
        energy: f64,
        volume: &mut dyn VolumeHandle,
    ) -> DistifResult<()> {
        let local_capacitance = node.network_capacitance();
        let loop_latency = self.loop_latency();
        self.arbiter.on_post_solve(
            &self.cfg,
            &self.inbound,
            local_capacitance,
            loop_latency,
            volume,
            &mut self.outbound,
        );

        if self.arbiter.mode() == Mode::Supply {
            self.supply.publish(
                node,
                self.local_node_id,
                sibling_demand_nodes,
                mole_fractions,
                trace_fractions,
                energy,
                &mut self.outbound,
            );
        } else if self.arbiter.mode() == Mode::Demand {
            // Publish the actual molar flow this step's admittance/source
            // stamp resolved to, once the solver has produced a potential:
            // G * (p_peer - p_local), positive meaning into this node
            // (spec.md §3's `source` sign convention in Demand mode).
            self.outbound.source =
                self.pending_conductance * (self.inbound.source - node.potential().get::<pascal>());
        }
        self.outbound.demand_mode = self.arbiter.mode() == Mode::Demand;
        self.outbound.frame_loopback = self.inbound.frame_count;
        self.outbound.frame_count += 1;
        self.arbiter.advance_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AdmittanceSink, FlowSink, NodeView, VolumeHandle};
    use tf_fluids::Species;

    struct FakeNode {
        potential_pa: f64,
        capacitance: f64,
    }

    impl NodeView for FakeNode {
        fn potential(&self) -> tf_core::units::Pressure {
            tf_core::units::pa(self.potential_pa)
        }
        fn network_capacitance(&self) -> f64 {
            self.capacitance
        }
        fn capacitance_delta_potential(&self, _other: NodeId) -> f64 {
            0.0
        }
        fn bulk_mole_fractions(&self) -> &[f64] {
            &[0.21, 0.79]
        }
    }

    #[derive(Default)]
    struct FakeVolume {
        volume_m3: f64,
    }

    impl VolumeHandle for FakeVolume {
        fn edit_volume(&mut self, enable: bool, value_m3: f64) {
            self.volume_m3 = if enable { value_m3 } else { 0.0 };
        }
        fn get_volume(&self) -> f64 {
            self.volume_m3
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        admittance: f64,
        source: f64,
    }

    impl AdmittanceSink for RecordingSink {
        fn stamp_admittance(&mut self, g: f64) {
            self.admittance = g;
        }
        fn stamp_source(&mut self, value: f64) {
            self.source = value;
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

    fn species() -> InterfaceSpecies {
        InterfaceSpecies::new(vec![Species::O2, Species::N2], vec![])
    }

    fn valid_supply_frame(capacitance: f64, pressure_pa: f64) -> InterfacePayload {
        let mut p = InterfacePayload::new(2, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = capacitance;
        p.source = pressure_pa;
        p.demand_mode = false;
        p.set_bulk(&[0.21, 0.79]);
        p
    }

    #[test]
    fn new_link_starts_in_supply() {
        let link =
            DistributedFluidInterfaceLink::new(LinkConfig::default(), species(), NodeId::from_index(0), 0.1)
                .unwrap();
        assert_eq!(link.mode(), Mode::Supply);
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            force_supply_mode: true,
            ..Default::default()
        };
        let result = DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1);
        assert!(result.is_err());
    }

    #[test]
    fn dual_supply_start_up_smaller_capacitance_side_becomes_demand() {
        let cfg = LinkConfig::default();
        let mut link =
            DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        link.receive(&valid_supply_frame(20.0, 101_325.0));

        let node = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };
        link.process_inputs(&node, &mut volume).unwrap();

        assert_eq!(link.mode(), Mode::Demand);
        assert_eq!(volume.get_volume(), 0.0);
    }

    #[test]
    fn demand_mode_stamps_admittance_and_source() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            ..Default::default()
        };
        let mut link =
            DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        link.receive(&valid_supply_frame(1.0, 150_000.0));

        let node = FakeNode { potential_pa: 101_325.0, capacitance: 1.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };
        link.process_inputs(&node, &mut volume).unwrap();

        let mut sink = RecordingSink::default();
        link.stamp_admittance(0.1, &mut sink);
        link.stamp_source(&mut sink);

        assert!(sink.admittance > 0.0);
        assert!((sink.source / sink.admittance - 150_000.0).abs() < 1e-6);

        let push = link.pending_node_push();
        assert_eq!(push.energy, Some(300.0));
        let sum: f64 = push.mass_fractions.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn demand_mode_publishes_resolved_flow_as_outbound_source() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            ..Default::default()
        };
        let mut link =
            DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        link.receive(&valid_supply_frame(1.0, 150_000.0));

        let node = FakeNode { potential_pa: 101_325.0, capacitance: 1.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };
        link.process_inputs(&node, &mut volume).unwrap();
        link.process_outputs(&node, &[], &[0.21, 0.79], &[], 300.0, &mut volume)
            .unwrap();

        // Flow should resolve to G * (p_peer - p_local), positive (into
        // this node) since the peer's pressure exceeds the local one.
        let expected = link.pending_conductance * (150_000.0 - 101_325.0);
        assert!((link.outbound().source - expected).abs() < 1e-6);
        assert!(link.outbound().source > 0.0);
    }

    #[test]
    fn supply_mode_computes_flow_for_valid_demand_peer() {
        let cfg = LinkConfig {
            force_supply_mode: true,
            ..Default::default()
        };
        let mut link =
            DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        let mut inbound = valid_supply_frame(1.0, 0.0);
        inbound.demand_mode = true;
        inbound.source = 0.02;
        link.receive(&inbound);

        let node = FakeNode { potential_pa: 101_325.0, capacitance: 1.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };
        link.process_inputs(&node, &mut volume).unwrap();

        let mut flow = RecordingFlow::default();
        link.compute_flows(0.1, &mut flow);

        assert_eq!(flow.mol_per_s, -0.02);
    }

    #[test]
    fn process_outputs_advances_frame_counters() {
        let link_cfg = LinkConfig::default();
        let mut link =
            DistributedFluidInterfaceLink::new(link_cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        let node = FakeNode { potential_pa: 101_325.0, capacitance: 1.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };

        link.process_inputs(&node, &mut volume).unwrap();
        link.process_outputs(&node, &[], &[0.21, 0.79], &[], 300.0, &mut volume)
            .unwrap();

        assert_eq!(link.outbound().frame_count, 1);
    }

    #[test]
    fn peer_silence_holds_demand_state_with_no_error() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            ..Default::default()
        };
        let mut link =
            DistributedFluidInterfaceLink::new(cfg, species(), NodeId::from_index(0), 0.1).unwrap();
        // Never call receive(): inbound stays at its fresh, invalid default.

        let node = FakeNode { potential_pa: 101_325.0, capacitance: 1.0 };
        let mut volume = FakeVolume { volume_m3: 1.0 };
        link.process_inputs(&node, &mut volume).unwrap();

        let mut sink = RecordingSink::default();
        link.stamp_admittance(0.1, &mut sink);
        link.stamp_source(&mut sink);

        assert_eq!(sink.admittance, 0.0);
        assert_eq!(sink.source, 0.0);
        assert!(link.pending_node_push().energy.is_none());
    }
}
