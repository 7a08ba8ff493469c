//! Process-wide constants for the distributed fluid interface.

/// Unit probe flux used to measure a node's network capacitance each step
/// (mol/s in consistent units, or kmol/s on the local side — see
/// `Supply Responder` step 5). Small enough not to perturb the solved
/// state, large enough to stay outside the solver's own numerical noise
/// floor. Kept as a single module constant rather than a configuration
/// option per Design Notes: every link measuring against the same probe
/// keeps cross-node capacitance comparisons meaningful.
pub const PROBE_FLUX: f64 = 1e-6;
