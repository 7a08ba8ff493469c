//! Mode Arbiter: decides, each step, whether this side is Supply or Demand.

use crate::config::LinkConfig;
use crate::node::VolumeHandle;
use crate::payload::InterfacePayload;

/// The role a side of a distributed fluid interface currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Advertises a pressure to the peer, accepts a molar flow from it.
    Supply,
    /// Advertises a desired molar flow, accepts a pressure from it.
    Demand,
}

/// What happened during one arbitration call, for callers that need to
/// react to a flip (tests, diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    /// No transition this step.
    None,
    /// Transitioned Supply → Demand.
    ToDemand,
    /// Transitioned Demand → Supply.
    ToSupply,
}

/// Tracks mode and the bookkeeping the transition rules need:
/// frames-since-flip (oscillation guard) and the previous tick's inbound
/// `demand_mode` (for the handshake edge-detect).
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    mode: Mode,
    frames_since_flip: u64,
    prev_inbound_demand_mode: bool,
    /// Node volume cached while in Demand, so it can be restored on
    /// flipping back to Supply (spec.md §3 `supplyVolume`).
    supply_volume_for_restore: f64,
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeArbiter {
    /// Both peers start in Supply (spec.md §4.2).
    pub fn new() -> Self {
        Self {
            mode: Mode::Supply,
            frames_since_flip: 0,
            prev_inbound_demand_mode: false,
            supply_volume_for_restore: 0.0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn frames_since_flip(&self) -> u64 {
        self.frames_since_flip
    }

    /// Node volume currently cached for restoration on flip-back to
    /// Supply (0.0 while in Supply).
    pub fn supply_volume(&self) -> f64 {
        self.supply_volume_for_restore
    }

    /// Called once per step, after a frame has been ticked; increments
    /// the oscillation-guard counter that the two flip conditions consult.
    pub fn advance_frame(&mut self) {
        self.frames_since_flip += 1;
    }

    /// Pre-solve arbitration: rules 1–3 of spec.md §4.2, evaluated after
    /// reading the inbound payload and before the solver runs.
    ///
    /// `local_capacitance` is this side's current network capacitance
    /// (used only for the dual-Supply start-up race, rule 3).
    pub fn on_inbound(
        &mut self,
        cfg: &LinkConfig,
        inbound: &InterfacePayload,
        local_capacitance: f64,
        volume: &mut dyn VolumeHandle,
        outbound: &mut InterfacePayload,
    ) -> FlipEvent {
        let event = self.decide_inbound(cfg, inbound, local_capacitance);
        self.apply(event, volume, outbound);
        self.prev_inbound_demand_mode = inbound.demand_mode;
        event
    }

    fn decide_inbound(
        &self,
        cfg: &LinkConfig,
        inbound: &InterfacePayload,
        local_capacitance: f64,
    ) -> FlipEvent {
        // Rule 1: force Demand.
        if cfg.force_demand_mode && self.mode == Mode::Supply {
            return FlipEvent::ToDemand;
        }
        // Rule 2: force Supply.
        if cfg.force_supply_mode && self.mode == Mode::Demand {
            return FlipEvent::ToSupply;
        }
        // Rule 3: only meaningful while the inbound frame is trustworthy.
        if inbound.valid() {
            if self.mode == Mode::Demand
                && inbound.demand_mode
                && !self.prev_inbound_demand_mode
            {
                // Handshake: peer just signalled it is ready to take Demand.
                return FlipEvent::ToSupply;
            }
            if self.mode == Mode::Supply && !inbound.demand_mode {
                // Both sides Supply: start-up race. Smaller capacitance
                // flips; ties broken by the configured pair master.
                if local_capacitance < inbound.capacitance {
                    return FlipEvent::ToDemand;
                }
                if local_capacitance == inbound.capacitance && cfg.is_pair_master {
                    return FlipEvent::ToDemand;
                }
            }
        }
        FlipEvent::None
    }

    /// Post-solve arbitration: rule 4 of spec.md §4.2, evaluated after the
    /// solver has run, only while this side is in Supply.
    ///
    /// `loop_latency` is `outbound.frame_count - inbound.frame_loopback`,
    /// the live round-trip measurement.
    pub fn on_post_solve(
        &mut self,
        cfg: &LinkConfig,
        inbound: &InterfacePayload,
        local_capacitance: f64,
        loop_latency: u64,
        volume: &mut dyn VolumeHandle,
        outbound: &mut InterfacePayload,
    ) -> FlipEvent {
        if self.mode != Mode::Supply {
            return FlipEvent::None;
        }
        let event = if self.frames_since_flip > loop_latency
            && local_capacitance * cfg.moding_capacitance_ratio < inbound.capacitance
        {
            FlipEvent::ToDemand
        } else {
            FlipEvent::None
        };
        self.apply(event, volume, outbound);
        event
    }

    fn apply(
        &mut self,
        event: FlipEvent,
        volume: &mut dyn VolumeHandle,
        outbound: &mut InterfacePayload,
    ) {
        match event {
            FlipEvent::None => {}
            FlipEvent::ToDemand => {
                let current_volume = volume.get_volume();
                volume.edit_volume(false, 0.0);
                self.mode = Mode::Demand;
                self.frames_since_flip = 0;
                self.supply_volume_for_restore = current_volume;
                tracing::debug!(supply_volume = current_volume, "interface link flipped to Demand");
            }
            FlipEvent::ToSupply => {
                volume.edit_volume(true, self.supply_volume_for_restore);
                tracing::debug!(
                    restored_volume = self.supply_volume_for_restore,
                    "interface link flipped to Supply"
                );
                self.supply_volume_for_restore = 0.0;
                self.mode = Mode::Supply;
                self.frames_since_flip = 0;
                outbound.source = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn valid_supply_payload(capacitance: f64) -> InterfacePayload {
        let mut p = InterfacePayload::new(1, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = capacitance;
        p.source = 101_325.0;
        p.demand_mode = false;
        p.set_bulk(&[1.0]);
        p
    }

    #[test]
    fn starts_in_supply() {
        assert_eq!(ModeArbiter::new().mode(), Mode::Supply);
    }

    #[test]
    fn dual_supply_master_wins_tie() {
        let cfg = LinkConfig {
            is_pair_master: true,
            ..Default::default()
        };
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 2.0 };
        let inbound = valid_supply_payload(1.0); // equal capacitance -> tie
        let mut outbound = InterfacePayload::new(1, 0);

        let event = arb.on_inbound(&cfg, &inbound, 1.0, &mut vol, &mut outbound);

        assert_eq!(event, FlipEvent::ToDemand);
        assert_eq!(arb.mode(), Mode::Demand);
        assert_eq!(arb.supply_volume(), 2.0);
        assert_eq!(vol.get_volume(), 0.0);
    }

    #[test]
    fn dual_supply_non_master_holds_on_tie() {
        let cfg = LinkConfig::default(); // is_pair_master = false
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 2.0 };
        let inbound = valid_supply_payload(1.0);
        let mut outbound = InterfacePayload::new(1, 0);

        let event = arb.on_inbound(&cfg, &inbound, 1.0, &mut vol, &mut outbound);

        assert_eq!(event, FlipEvent::None);
        assert_eq!(arb.mode(), Mode::Supply);
    }

    #[test]
    fn smaller_capacitance_side_flips_to_demand() {
        let cfg = LinkConfig::default();
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 5.0 };
        let inbound = valid_supply_payload(20.0);
        let mut outbound = InterfacePayload::new(1, 0);

        // local capacitance (10) < inbound capacitance (20): flips.
        let event = arb.on_inbound(&cfg, &inbound, 10.0, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::ToDemand);
    }

    #[test]
    fn demand_flips_to_supply_only_on_rising_edge_handshake() {
        let cfg = LinkConfig::default();
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 0.0 };
        let mut outbound = InterfacePayload::new(1, 0);

        // Force into Demand directly via config for test setup.
        let force_cfg = LinkConfig {
            force_demand_mode: true,
            ..Default::default()
        };
        let inbound_supply = valid_supply_payload(5.0);
        arb.on_inbound(&force_cfg, &inbound_supply, 1.0, &mut vol, &mut outbound);
        assert_eq!(arb.mode(), Mode::Demand);

        // First inbound with demand_mode=true: previous inbound was not
        // demand, so this is the rising edge -> handshake fires.
        let mut inbound_demand = valid_supply_payload(5.0);
        inbound_demand.demand_mode = true;
        inbound_demand.source = -1.0; // flow demand, sign permitted in Demand

        let event = arb.on_inbound(&cfg, &inbound_demand, 1.0, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::ToSupply);
        assert_eq!(arb.mode(), Mode::Supply);
        assert_eq!(outbound.source, 0.0);
    }

    #[test]
    fn post_solve_capacitance_flip_respects_hysteresis_and_latency_gate() {
        let cfg = LinkConfig::default(); // ratio 1.25
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 3.0 };
        let mut outbound = InterfacePayload::new(1, 0);
        let inbound = valid_supply_payload(100.0);

        for _ in 0..3 {
            arb.advance_frame();
        }

        // local=10, ratio*local=12.5 < inbound=100 -> flips, once gate passes.
        let event = arb.on_post_solve(&cfg, &inbound, 10.0, 1, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::ToDemand);
    }

    #[test]
    fn post_solve_does_not_flip_before_latency_gate_opens() {
        let cfg = LinkConfig::default();
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 3.0 };
        let mut outbound = InterfacePayload::new(1, 0);
        let inbound = valid_supply_payload(100.0);

        // frames_since_flip (0) is not > loop_latency (0): gate closed.
        let event = arb.on_post_solve(&cfg, &inbound, 10.0, 0, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::None);
    }

    #[test]
    fn post_solve_respects_hysteresis_band() {
        let cfg = LinkConfig::default(); // ratio 1.25
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 3.0 };
        let mut outbound = InterfacePayload::new(1, 0);
        // local=10, ratio*local=12.5, inbound=12.5 -> not strictly less, no flip.
        let inbound = valid_supply_payload(12.5);
        arb.advance_frame();

        let event = arb.on_post_solve(&cfg, &inbound, 10.0, 0, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::None);
    }

    #[test]
    fn post_solve_never_fires_while_in_demand() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            ..Default::default()
        };
        let mut arb = ModeArbiter::new();
        let mut vol = FakeVolume { volume_m3: 3.0 };
        let mut outbound = InterfacePayload::new(1, 0);
        let inbound = valid_supply_payload(1000.0);
        arb.on_inbound(&cfg, &inbound, 1.0, &mut vol, &mut outbound);
        assert_eq!(arb.mode(), Mode::Demand);

        arb.advance_frame();
        let event = arb.on_post_solve(&cfg, &inbound, 1.0, 0, &mut vol, &mut outbound);
        assert_eq!(event, FlipEvent::None);
    }
}
