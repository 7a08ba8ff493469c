//! Recognized configuration options for a distributed fluid interface link.

use crate::error::{DistifError, DistifResult};
use serde::{Deserialize, Serialize};

/// Construction-time configuration for one side of a distributed fluid
/// interface. Both peers must agree on `use_enthalpy` and on the
/// interface species negotiation out of band; everything else may differ
/// between sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Tie-breaker during start-up dual-Supply race. Exactly one of the
    /// two peers should set this true.
    #[serde(default)]
    pub is_pair_master: bool,

    /// If true, the `energy` payload field transports specific enthalpy
    /// (J/kg); otherwise temperature (K). Both sides must agree.
    #[serde(default)]
    pub use_enthalpy: bool,

    /// If true, omits the one-step damping resistor in the Demand
    /// controller (higher throughput, reduced stability).
    #[serde(default)]
    pub demand_option: bool,

    /// Hysteresis band for the Supply→Demand flip on capacitance. Must be
    /// > 1.0; default 1.25.
    #[serde(default = "default_moding_capacitance_ratio")]
    pub moding_capacitance_ratio: f64,

    /// Coefficient `A` of the lag-aware damping law `A * B^latency`.
    #[serde(default = "default_demand_filter_const_a")]
    pub demand_filter_const_a: f64,

    /// Coefficient `B` of the lag-aware damping law `A * B^latency`.
    #[serde(default = "default_demand_filter_const_b")]
    pub demand_filter_const_b: f64,

    /// Force this side to negotiate an interface width independent of the
    /// local network's species count. When `None`, the local network's
    /// bulk/trace counts are used.
    #[serde(default)]
    pub fluid_sizes_override: Option<FluidSizesOverride>,

    /// Pin this side permanently into Demand, disabling arbitration.
    #[serde(default)]
    pub force_demand_mode: bool,

    /// Pin this side permanently into Supply, disabling arbitration.
    #[serde(default)]
    pub force_supply_mode: bool,
}

/// Negotiated interface widths, independent of the local network's own
/// species count (`numFluidOverride`/`numTcOverride` in spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidSizesOverride {
    pub num_fluid_override: usize,
    pub num_tc_override: usize,
}

fn default_moding_capacitance_ratio() -> f64 {
    1.25
}

fn default_demand_filter_const_a() -> f64 {
    1.5
}

fn default_demand_filter_const_b() -> f64 {
    0.75
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            is_pair_master: false,
            use_enthalpy: false,
            demand_option: false,
            moding_capacitance_ratio: default_moding_capacitance_ratio(),
            demand_filter_const_a: default_demand_filter_const_a(),
            demand_filter_const_b: default_demand_filter_const_b(),
            fluid_sizes_override: None,
            force_demand_mode: false,
            force_supply_mode: false,
        }
    }
}

impl LinkConfig {
    /// Validate the configuration, per spec.md §7 item 1. Called once at
    /// link construction; any failure here is fatal.
    pub fn validate(&self) -> DistifResult<()> {
        if self.force_demand_mode && self.force_supply_mode {
            return Err(DistifError::Configuration {
                what: "force_demand_mode and force_supply_mode cannot both be set",
            });
        }
        if self.moding_capacitance_ratio <= 1.0 {
            return Err(DistifError::Configuration {
                what: "moding_capacitance_ratio must be > 1.0",
            });
        }
        if !self.moding_capacitance_ratio.is_finite() {
            return Err(DistifError::Configuration {
                what: "moding_capacitance_ratio must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LinkConfig::default().validate().is_ok());
    }

    #[test]
    fn both_force_flags_rejected() {
        let cfg = LinkConfig {
            force_demand_mode: true,
            force_supply_mode: true,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(DistifError::Configuration { .. })
        ));
    }

    #[test]
    fn ratio_at_or_below_one_rejected() {
        let cfg = LinkConfig {
            moding_capacitance_ratio: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg2 = LinkConfig {
            moding_capacitance_ratio: 0.5,
            ..Default::default()
        };
        assert!(cfg2.validate().is_err());
    }

    #[test]
    fn ratio_above_one_accepted() {
        let cfg = LinkConfig {
            moding_capacitance_ratio: 1.01,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
