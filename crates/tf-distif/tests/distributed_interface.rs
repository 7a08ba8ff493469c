//! End-to-end pairing tests: two `DistributedFluidInterfaceLink`s driven
//! as if each were the boundary node of a separate network, exchanging
//! payloads directly (no transport) tick by tick.

use tf_core::units::{pa, Pressure};
use tf_core::NodeId;
use tf_distif::{
    AdmittanceSink, DistributedFluidInterfaceLink, FlowSink, InterfaceSpecies, LinkConfig, Mode,
    NetworkLinkOps, NodeView, VolumeHandle,
};
use tf_fluids::Species;

struct FakeNode {
    potential_pa: f64,
    capacitance: f64,
}

impl NodeView for FakeNode {
    fn potential(&self) -> Pressure {
        pa(self.potential_pa)
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

fn air_species() -> InterfaceSpecies {
    InterfaceSpecies::new(vec![Species::O2, Species::N2], vec![])
}

/// Run both sides for `ticks` steps, exchanging outbound payloads
/// directly after each tick (zero-latency transport).
fn run_ticks(
    link_a: &mut DistributedFluidInterfaceLink,
    node_a: &FakeNode,
    vol_a: &mut FakeVolume,
    link_b: &mut DistributedFluidInterfaceLink,
    node_b: &FakeNode,
    vol_b: &mut FakeVolume,
    dt: f64,
    ticks: usize,
) {
    for _ in 0..ticks {
        link_a.process_inputs(node_a, vol_a).unwrap();
        link_b.process_inputs(node_b, vol_b).unwrap();

        let mut sink_a = RecordingSink::default();
        link_a.stamp_admittance(dt, &mut sink_a);
        link_a.stamp_source(&mut sink_a);
        let mut sink_b = RecordingSink::default();
        link_b.stamp_admittance(dt, &mut sink_b);
        link_b.stamp_source(&mut sink_b);

        let mut flow_a = RecordingFlow::default();
        link_a.compute_flows(dt, &mut flow_a);
        let mut flow_b = RecordingFlow::default();
        link_b.compute_flows(dt, &mut flow_b);

        link_a.transport_flows(dt);
        link_b.transport_flows(dt);

        link_a
            .process_outputs(node_a, &[], &[0.21, 0.79], &[], 300.0, vol_a)
            .unwrap();
        link_b
            .process_outputs(node_b, &[], &[0.21, 0.79], &[], 300.0, vol_b)
            .unwrap();

        let outbound_a = link_a.outbound().clone();
        let outbound_b = link_b.outbound().clone();
        link_a.receive(&outbound_b);
        link_b.receive(&outbound_a);
    }
}

#[test]
fn smaller_capacitance_side_settles_into_demand() {
    // P1: after pairing settles, exactly one side holds Demand.
    let dt = 0.1;
    let mut link_a = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(1),
        dt,
    )
    .unwrap();
    let mut link_b = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(2),
        dt,
    )
    .unwrap();

    let node_a = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let node_b = FakeNode { potential_pa: 101_325.0, capacitance: 20.0 };
    let mut vol_a = FakeVolume::default();
    let mut vol_b = FakeVolume::default();

    run_ticks(&mut link_a, &node_a, &mut vol_a, &mut link_b, &node_b, &mut vol_b, dt, 3);

    assert_eq!(link_a.mode(), Mode::Demand);
    assert_eq!(link_b.mode(), Mode::Supply);
}

#[test]
fn dual_supply_tie_is_broken_by_pair_master() {
    // Scenario 1: equal capacitance at start-up, pair master wins the tie.
    let dt = 0.1;
    let cfg_a = LinkConfig {
        is_pair_master: true,
        ..Default::default()
    };
    let mut link_a =
        DistributedFluidInterfaceLink::new(cfg_a, air_species(), NodeId::from_index(1), dt).unwrap();
    let mut link_b = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(2),
        dt,
    )
    .unwrap();

    let node_a = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let node_b = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let mut vol_a = FakeVolume::default();
    let mut vol_b = FakeVolume::default();

    run_ticks(&mut link_a, &node_a, &mut vol_a, &mut link_b, &node_b, &mut vol_b, dt, 2);

    assert_eq!(link_a.mode(), Mode::Demand);
    assert_eq!(link_b.mode(), Mode::Supply);
}

#[test]
fn demand_side_mixture_push_sums_to_one_after_pairing() {
    let dt = 0.1;
    let mut link_a = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(1),
        dt,
    )
    .unwrap();
    let mut link_b = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(2),
        dt,
    )
    .unwrap();

    let node_a = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let node_b = FakeNode { potential_pa: 150_000.0, capacitance: 20.0 };
    let mut vol_a = FakeVolume::default();
    let mut vol_b = FakeVolume::default();

    run_ticks(&mut link_a, &node_a, &mut vol_a, &mut link_b, &node_b, &mut vol_b, dt, 4);

    assert_eq!(link_a.mode(), Mode::Demand);
    let push = link_a.pending_node_push();
    let sum: f64 = push.mass_fractions.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(push.energy, Some(300.0));
}

#[test]
fn peer_silence_holds_demand_state_across_ticks() {
    // Scenario 6: one side never publishes (simulated crash); the other,
    // forced into Demand, holds its last state without erroring.
    let dt = 0.1;
    let cfg = LinkConfig {
        force_demand_mode: true,
        ..Default::default()
    };
    let mut link_a =
        DistributedFluidInterfaceLink::new(cfg, air_species(), NodeId::from_index(1), dt).unwrap();
    let node_a = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let mut vol_a = FakeVolume::default();

    for _ in 0..3 {
        link_a.process_inputs(&node_a, &mut vol_a).unwrap();
        let mut sink = RecordingSink::default();
        link_a.stamp_admittance(dt, &mut sink);
        link_a.stamp_source(&mut sink);
        assert_eq!(sink.admittance, 0.0);
        assert_eq!(sink.source, 0.0);
        link_a
            .process_outputs(&node_a, &[], &[0.21, 0.79], &[], 300.0, &mut vol_a)
            .unwrap();
        assert!(link_a.pending_node_push().energy.is_none());
    }
}

#[test]
fn supply_side_stamps_opposite_sign_flow_once_peer_reaches_demand() {
    let dt = 0.1;
    let mut link_a = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(1),
        dt,
    )
    .unwrap();
    let mut link_b = DistributedFluidInterfaceLink::new(
        LinkConfig::default(),
        air_species(),
        NodeId::from_index(2),
        dt,
    )
    .unwrap();

    let node_a = FakeNode { potential_pa: 101_325.0, capacitance: 10.0 };
    let node_b = FakeNode { potential_pa: 150_000.0, capacitance: 20.0 };
    let mut vol_a = FakeVolume::default();
    let mut vol_b = FakeVolume::default();

    run_ticks(&mut link_a, &node_a, &mut vol_a, &mut link_b, &node_b, &mut vol_b, dt, 3);
    assert_eq!(link_a.mode(), Mode::Demand);
    assert_eq!(link_b.mode(), Mode::Supply);

    // One more tick: A (Demand) publishes its resolved flow request, B
    // (Supply) receives it and stamps the opposite-signed flow.
    link_a.process_inputs(&node_a, &mut vol_a).unwrap();
    link_a
        .process_outputs(&node_a, &[], &[0.21, 0.79], &[], 300.0, &mut vol_a)
        .unwrap();
    let demanded_flow = link_a.outbound().source;
    assert!(demanded_flow > 0.0);

    link_b.receive(link_a.outbound());
    link_b.process_inputs(&node_b, &mut vol_b).unwrap();

    let mut flow_b = RecordingFlow::default();
    link_b.compute_flows(dt, &mut flow_b);

    assert!((flow_b.mol_per_s + demanded_flow).abs() < 1e-9);
}
