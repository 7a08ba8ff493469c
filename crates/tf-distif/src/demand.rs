//! Demand Controller: the lag-aware admittance law a Demand-side link
//! stamps into the surrounding linear system, plus the composition and
//! energy hand-off from the peer's published state (spec.md §4.3).

use crate::config::LinkConfig;
use crate::error::{DistifError, DistifResult};
use crate::mixture::InterfaceSpecies;
use crate::node::NodeView;
use crate::payload::InterfacePayload;
use uom::si::pressure::pascal;

/// Bulk mole fractions summing to less than this are treated as "no real
/// mixture" and rejected rather than normalized (would blow up to
/// near-infinite mass fractions otherwise).
const MIN_BULK_SUM: f64 = 1e-12;

/// Result of running the Demand law for one step: the admittance/source
/// pair the link stamps into the solver at matrix-assembly time, plus
/// the node push the caller performs itself (these four traits carry no
/// composition-sink capability of their own — see node.rs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandStep {
    /// Admittance to stamp this step (mol/(Pa·s), wire units). Zero while
    /// holding state on an invalid inbound frame.
    pub conductance: f64,
    /// Source-vector value to stamp (`conductance * source_pressure_pa`).
    pub source: f64,
    /// `conductance * dt`, republished in the outbound payload's
    /// `capacitance` field so the Supply side can subtract it out
    /// (spec.md §4.4 step 1).
    pub supplied_capacitance: f64,
    /// The peer's `energy` field (temperature or enthalpy per
    /// `LinkConfig::use_enthalpy`), to push into the node's thermal
    /// state. `None` while holding state.
    pub energy: Option<f64>,
}

/// Stateful lag-aware gain/admittance law. Construction is cheap; one
/// instance lives for the life of a Demand-side link.
#[derive(Debug, Clone)]
pub struct DemandController {
    species: InterfaceSpecies,
}

impl DemandController {
    pub fn new(species: InterfaceSpecies) -> Self {
        Self { species }
    }

    /// Run one step of the Demand law.
    ///
    /// `local_capacitance` is this side's own network capacitance (`Cd`);
    /// `loop_latency` is `outbound.frame_count - inbound.frame_loopback`.
    /// `blockage_fraction` is an optional malfunction in `[0, 1)` scaling
    /// the computed conductance down; pass `0.0` for none.
    ///
    /// Does not touch the solver: returns the admittance/source pair for
    /// the caller to stamp at matrix-assembly time (`NetworkLinkOps::
    /// stamp_admittance`/`stamp_source`). When the inbound frame is
    /// valid, also writes the peer's renormalized mass fractions into
    /// `mass_fractions_out` (sized to `self.species.num_bulk()`) and
    /// trace fractions into `trace_fractions_out`.
    ///
    /// Returns `Err(InvalidInterfaceData)` when the inbound frame is
    /// valid but its bulk mole fractions sum to (near) zero — a
    /// malformed peer frame the caller must not act on.
    pub fn step(
        &self,
        cfg: &LinkConfig,
        inbound: &InterfacePayload,
        local_capacitance: f64,
        dt: f64,
        loop_latency: u64,
        blockage_fraction: f64,
        node: &dyn NodeView,
        mass_fractions_out: &mut [f64],
        trace_fractions_out: &mut [f64],
    ) -> DistifResult<DemandStep> {
        if !inbound.valid() {
            // Hold node state: no admittance, source the node's own
            // potential so the solver sees a no-op boundary this tick.
            let p = node.potential().get::<pascal>();
            tracing::debug!(held_pressure_pa = p, "demand side holding last state, inbound frame not valid");
            return Ok(DemandStep {
                conductance: 0.0,
                source: 0.0,
                supplied_capacitance: 0.0,
                energy: None,
            });
        }

        let cs = inbound.capacitance;
        let cd = local_capacitance.max(f64::MIN_POSITIVE);
        let r = (cs / cd).clamp(1.0, cfg.moding_capacitance_ratio);
        let n = (loop_latency as f64).clamp(1.0, 100.0);
        let g_limit = (cfg.demand_filter_const_a * cfg.demand_filter_const_b.powf(n)).min(1.0);
        let gain = g_limit + (1.0 - g_limit) * (r - 1.0) * 4.0;
        let base_g = gain * cs / dt.max(f64::MIN_POSITIVE);

        let mut g = if cfg.demand_option {
            base_g
        } else {
            // One-step damping resistor in series with the base
            // conductance: 1 / (1/baseG + dt/Cd).
            let denom = (1.0 / base_g.max(f64::MIN_POSITIVE)) + dt / cd;
            1.0 / denom.max(f64::MIN_POSITIVE)
        };
        g *= (1.0 - blockage_fraction).clamp(0.0, 1.0);
        let source = g * inbound.source;

        let bulk_sum = inbound.bulk_sum();
        if bulk_sum < MIN_BULK_SUM {
            return Err(DistifError::InvalidInterfaceData {
                what: "inbound bulk mole fractions sum to (near) zero",
            });
        }
        let renormalized: Vec<f64> = inbound.bulk().iter().map(|x| x / bulk_sum).collect();
        let mass = bulk_mass_fractions(&self.species, &renormalized, node);
        let n_out = mass_fractions_out.len().min(mass.len());
        mass_fractions_out[..n_out].copy_from_slice(&mass[..n_out]);
        for slot in &mut mass_fractions_out[n_out..] {
            *slot = 0.0;
        }

        let trace_sum = inbound.trace_sum();
        let n_tc = trace_fractions_out.len().min(inbound.trace().len());
        if trace_sum > 0.0 {
            for (slot, &x) in trace_fractions_out[..n_tc]
                .iter_mut()
                .zip(inbound.trace())
            {
                *slot = x / bulk_sum;
            }
        } else {
            for slot in &mut trace_fractions_out[..n_tc] {
                *slot = 0.0;
            }
        }
        for slot in &mut trace_fractions_out[n_tc..] {
            *slot = 0.0;
        }

        Ok(DemandStep {
            conductance: g,
            source,
            supplied_capacitance: g * dt,
            energy: Some(inbound.energy),
        })
    }
}

/// Convert a renormalized inbound mixture to mass fractions, recovering
/// from a non-physical result by falling back to the node's own
/// resident mixture instead (spec.md §7 item 3, "Transient data
/// mismatch"). An inbound frame can pass `InterfacePayload::valid()`
/// and still renormalize to a non-physical mass fraction in exotic
/// mixtures; this is the local recovery path for that case.
fn bulk_mass_fractions(species: &InterfaceSpecies, renormalized: &[f64], node: &dyn NodeView) -> Vec<f64> {
    let computed = species.mole_to_mass_bulk(renormalized);
    if computed.iter().any(|&x| !(x >= 0.0) || !x.is_finite()) {
        tracing::warn!("demand-mode mixture push was non-physical, falling back to node contents");
        species.mole_to_mass_bulk(node.bulk_mole_fractions())
    } else {
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeView;
    use tf_core::units::{pa as pa_fn, Pressure};
    use tf_core::NodeId;
    use tf_fluids::Species;

    struct FakeNode {
        potential_pa: f64,
        contents: Vec<f64>,
    }

    impl NodeView for FakeNode {
        fn potential(&self) -> Pressure {
            pa_fn(self.potential_pa)
        }
        fn network_capacitance(&self) -> f64 {
            0.0
        }
        fn capacitance_delta_potential(&self, _other: NodeId) -> f64 {
            0.0
        }
        fn bulk_mole_fractions(&self) -> &[f64] {
            &self.contents
        }
    }

    fn air_species() -> InterfaceSpecies {
        InterfaceSpecies::new(vec![Species::O2, Species::N2], vec![])
    }

    fn valid_inbound(capacitance: f64, pressure_pa: f64) -> InterfacePayload {
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
    fn invalid_inbound_holds_state_and_stamps_nothing() {
        let ctl = DemandController::new(air_species());
        let cfg = LinkConfig::default();
        let inbound = InterfacePayload::new(2, 0); // frame_count 0, not valid
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.21, 0.79],
        };
        let mut mass = [0.0; 2];
        let mut trace = [0.0; 0];

        let step = ctl
            .step(&cfg, &inbound, 1.0, 0.1, 1, 0.0, &node, &mut mass, &mut trace)
            .unwrap();

        assert_eq!(step.energy, None);
        assert_eq!(step.conductance, 0.0);
        assert_eq!(step.source, 0.0);
    }

    #[test]
    fn zero_bulk_sum_is_rejected() {
        let ctl = DemandController::new(air_species());
        let cfg = LinkConfig::default();
        let mut inbound = valid_inbound(1.0, 101_325.0);
        inbound.set_bulk(&[0.0, 0.0]);
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.21, 0.79],
        };
        let mut mass = [0.0; 2];
        let mut trace = [0.0; 0];

        let result = ctl.step(&cfg, &inbound, 1.0, 0.1, 1, 0.0, &node, &mut mass, &mut trace);

        assert!(matches!(result, Err(DistifError::InvalidInterfaceData { .. })));
    }

    #[test]
    fn pressure_passes_through_as_source_term() {
        // Scenario 3: with minimal latency (n = 1) and equal capacitances
        // (r = 1), gain = gLimit, and the stamped source tracks the
        // peer's advertised pressure directly.
        let ctl = DemandController::new(air_species());
        let cfg = LinkConfig::default();
        let inbound = valid_inbound(1.0, 150_000.0);
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.21, 0.79],
        };
        let mut mass = [0.0; 2];
        let mut trace = [0.0; 0];

        let step = ctl
            .step(&cfg, &inbound, 1.0, 0.1, 1, 0.0, &node, &mut mass, &mut trace)
            .unwrap();

        assert!((step.source / step.conductance - 150_000.0).abs() < 1e-6);
    }

    #[test]
    fn high_latency_damps_gain_toward_glimit() {
        // Worked numbers from spec.md §8 scenario 4: A = 1.5, B = 0.75,
        // loopLatency = 8 -> gLimit ~= 0.1501.
        let cfg = LinkConfig {
            demand_filter_const_a: 1.5,
            demand_filter_const_b: 0.75,
            ..Default::default()
        };
        let g_limit = (cfg.demand_filter_const_a * cfg.demand_filter_const_b.powf(8.0)).min(1.0);
        assert!((g_limit - 0.1501).abs() < 1e-3);
    }

    #[test]
    fn minimal_latency_yields_full_gain() {
        let cfg = LinkConfig {
            demand_filter_const_a: 1.5,
            demand_filter_const_b: 0.75,
            ..Default::default()
        };
        let n = (1_u64 as f64).clamp(1.0, 100.0);
        let g_limit = (cfg.demand_filter_const_a * cfg.demand_filter_const_b.powf(n)).min(1.0);
        // A * B^1 = 1.125 > 1, clamped to 1.0: full gain regardless of r.
        assert!((g_limit - 1.0).abs() < 1e-12);
    }

    #[test]
    fn renormalizes_mixture_to_mass_fractions() {
        let ctl = DemandController::new(air_species());
        let cfg = LinkConfig::default();
        let mut inbound = valid_inbound(1.0, 101_325.0);
        // Unnormalized mole fractions (sum = 0.5): renormalization should
        // still yield a mass-fraction vector summing to 1.
        inbound.set_bulk(&[0.105, 0.395]);
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.21, 0.79],
        };
        let mut mass = [0.0; 2];
        let mut trace = [0.0; 0];

        ctl.step(&cfg, &inbound, 1.0, 0.1, 1, 0.0, &node, &mut mass, &mut trace)
            .unwrap();

        let sum: f64 = mass.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn blockage_malfunction_scales_conductance_down() {
        let ctl = DemandController::new(air_species());
        let cfg = LinkConfig::default();
        let inbound = valid_inbound(1.0, 101_325.0);
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.21, 0.79],
        };

        let mut mass = [0.0; 2];
        let mut trace = [0.0; 0];
        let open = ctl
            .step(&cfg, &inbound, 1.0, 0.1, 1, 0.0, &node, &mut mass, &mut trace)
            .unwrap();

        let blocked = ctl
            .step(&cfg, &inbound, 1.0, 0.1, 1, 0.5, &node, &mut mass, &mut trace)
            .unwrap();

        assert!((blocked.conductance - open.conductance * 0.5).abs() < 1e-9);
    }

    #[test]
    fn non_physical_renormalization_falls_back_to_node_contents() {
        let species = air_species();
        let node = FakeNode {
            potential_pa: 101_325.0,
            contents: vec![0.5, 0.5],
        };
        // Sums to 1 but carries a negative entry: an exotic-mixture
        // numerical artifact `InterfacePayload::valid()` would not catch
        // on its own (validity is checked on the raw inbound mole
        // fractions, before renormalization).
        let renormalized = [-0.1, 1.1];

        let mass = bulk_mass_fractions(&species, &renormalized, &node);

        assert_eq!(mass, species.mole_to_mass_bulk(&node.contents));
    }
}
