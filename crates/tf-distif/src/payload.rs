//! The interface payload: the versioned wire record exchanged each step.

/// One direction's worth of interface state, exchanged once per tick.
///
/// Mixture buffers are allocated once, at construction, sized to the
/// negotiated interface widths, and mutated in place thereafter — no
/// per-step heap churn. `set_bulk`/`get_bulk`/`set_trace`/`get_trace`
/// never resize: a caller passing a shorter slice gets the tail zero
/// filled (when reading) or only writes as much as fits (when writing),
/// matching the "common prefix of the two sets" negotiation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfacePayload {
    /// Monotonically increasing; starts at 0; incremented once per publish.
    pub frame_count: u64,
    /// The last `frame_count` received from the peer at publish time.
    pub frame_loopback: u64,
    /// True iff the publishing side currently owns the Demand role.
    pub demand_mode: bool,
    /// Non-negative: the publisher's effective network capacitance at its
    /// interface node (mol/Pa, wire units).
    pub capacitance: f64,
    /// Dual-meaning: molar flow demand (mol/s, positive = into local node)
    /// when `demand_mode`; absolute pressure (Pa) otherwise.
    pub source: f64,
    /// Absolute temperature (K) or specific enthalpy (J/kg), per
    /// `LinkConfig::use_enthalpy` — both sides must agree at construction.
    pub energy: f64,
    bulk: Vec<f64>,
    trace: Vec<f64>,
}

impl InterfacePayload {
    /// Construct a payload sized to the negotiated interface widths.
    /// All scalars start at a benign default (`frame_count = 0`,
    /// `capacitance = 0`, mixtures zeroed); the payload is not `valid()`
    /// until the first real publish (`frame_count >= 1`).
    pub fn new(num_bulk: usize, num_tc: usize) -> Self {
        Self {
            frame_count: 0,
            frame_loopback: 0,
            demand_mode: false,
            capacitance: 0.0,
            source: 0.0,
            energy: 0.0,
            bulk: vec![0.0; num_bulk],
            trace: vec![0.0; num_tc],
        }
    }

    /// Number of bulk species this payload carries.
    pub fn num_bulk(&self) -> usize {
        self.bulk.len()
    }

    /// Number of trace compounds this payload carries.
    pub fn num_tc(&self) -> usize {
        self.trace.len()
    }

    /// Bulk mole fractions, by interface-negotiated index.
    pub fn bulk(&self) -> &[f64] {
        &self.bulk
    }

    /// Trace-compound mole fractions, by interface-negotiated index.
    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    /// Overwrite the bulk mole fractions from `values`. Tolerates a size
    /// mismatch: copies `min(values.len(), num_bulk())` entries and zero
    /// fills any remaining local slots; never resizes the buffer.
    pub fn set_bulk(&mut self, values: &[f64]) {
        set_fixed(&mut self.bulk, values);
    }

    /// Copy the bulk mole fractions into `out`. Tolerates a size mismatch
    /// the same way as `set_bulk`.
    pub fn get_bulk(&self, out: &mut [f64]) {
        get_fixed(&self.bulk, out);
    }

    /// Overwrite the trace-compound mole fractions from `values`, with
    /// the same size-mismatch tolerance as `set_bulk`.
    pub fn set_trace(&mut self, values: &[f64]) {
        set_fixed(&mut self.trace, values);
    }

    /// Copy the trace-compound mole fractions into `out`, with the same
    /// size-mismatch tolerance as `get_bulk`.
    pub fn get_trace(&self, out: &mut [f64]) {
        get_fixed(&self.trace, out);
    }

    /// The validity predicate of spec.md §3: a payload is valid iff
    /// `frame_count >= 1`, `energy > 0`, `capacitance >= 0`, and — when
    /// advertising pressure, i.e. not in Demand — `source >= 0`, and all
    /// mixture entries are non-negative.
    pub fn valid(&self) -> bool {
        if self.frame_count < 1 {
            return false;
        }
        if !(self.energy > 0.0) || !self.energy.is_finite() {
            return false;
        }
        if !(self.capacitance >= 0.0) || !self.capacitance.is_finite() {
            return false;
        }
        if !self.demand_mode && (!(self.source >= 0.0) || !self.source.is_finite()) {
            return false;
        }
        if self.bulk.iter().any(|&f| !(f >= 0.0) || !f.is_finite()) {
            return false;
        }
        if self.trace.iter().any(|&f| !(f >= 0.0) || !f.is_finite()) {
            return false;
        }
        true
    }

    /// Sum of the bulk mole fractions currently stored (used by the
    /// Demand controller's renormalization, spec.md §4.3).
    pub fn bulk_sum(&self) -> f64 {
        self.bulk.iter().sum()
    }

    /// Sum of the trace-compound mole fractions currently stored.
    pub fn trace_sum(&self) -> f64 {
        self.trace.iter().sum()
    }

    /// Copy-assign scalars and mixture arrays from `other` element-wise,
    /// leaving this payload's own buffer sizes unchanged (they were sized
    /// at construction to match the peer-visible interface width).
    pub fn assign_from(&mut self, other: &InterfacePayload) {
        self.frame_count = other.frame_count;
        self.frame_loopback = other.frame_loopback;
        self.demand_mode = other.demand_mode;
        self.capacitance = other.capacitance;
        self.source = other.source;
        self.energy = other.energy;
        set_fixed(&mut self.bulk, &other.bulk);
        set_fixed(&mut self.trace, &other.trace);
    }
}

/// Shared zero-fill-tolerant copy used by both `set_bulk`/`set_trace` and
/// `assign_from`: copies the common prefix, zero fills anything left over
/// in `dst`, never resizes `dst`.
fn set_fixed(dst: &mut [f64], src: &[f64]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    for slot in &mut dst[n..] {
        *slot = 0.0;
    }
}

/// Shared zero-fill-tolerant read used by `get_bulk`/`get_trace`: copies
/// the common prefix into `dst`, zero fills any remaining entries in
/// `dst`, never resizes anything.
fn get_fixed(src: &[f64], dst: &mut [f64]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    for slot in &mut dst[n..] {
        *slot = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_payload_is_invalid() {
        let p = InterfacePayload::new(2, 0);
        assert!(!p.valid());
    }

    #[test]
    fn published_payload_is_valid() {
        let mut p = InterfacePayload::new(2, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = 1.0;
        p.source = 101_325.0;
        p.set_bulk(&[0.21, 0.79]);
        assert!(p.valid());
    }

    #[test]
    fn demand_mode_allows_negative_source_check_relaxed() {
        // source is a flow demand while demand_mode is true: the sign
        // convention permits negative source (flow the other direction),
        // so validity does not constrain it in that mode.
        let mut p = InterfacePayload::new(1, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = 1.0;
        p.demand_mode = true;
        p.source = -5.0;
        p.set_bulk(&[1.0]);
        assert!(p.valid());
    }

    #[test]
    fn negative_pressure_source_invalid_in_supply() {
        let mut p = InterfacePayload::new(1, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = 1.0;
        p.demand_mode = false;
        p.source = -1.0;
        p.set_bulk(&[1.0]);
        assert!(!p.valid());
    }

    #[test]
    fn negative_mixture_entry_invalid() {
        let mut p = InterfacePayload::new(2, 0);
        p.frame_count = 1;
        p.energy = 300.0;
        p.capacitance = 1.0;
        p.source = 0.0;
        p.set_bulk(&[-0.1, 1.1]);
        assert!(!p.valid());
    }

    #[test]
    fn set_bulk_zero_fills_when_input_shorter() {
        let mut p = InterfacePayload::new(3, 0);
        p.set_bulk(&[0.21, 0.79]);
        assert_eq!(p.bulk(), &[0.21, 0.79, 0.0]);
    }

    #[test]
    fn set_bulk_truncates_when_input_longer() {
        let mut p = InterfacePayload::new(2, 0);
        p.set_bulk(&[0.21, 0.79, 0.5]);
        assert_eq!(p.bulk(), &[0.21, 0.79]);
    }

    #[test]
    fn get_bulk_zero_fills_caller_buffer() {
        let mut p = InterfacePayload::new(2, 0);
        p.set_bulk(&[0.3, 0.7]);
        let mut out = [0.0; 4];
        p.get_bulk(&mut out);
        assert_eq!(out, [0.3, 0.7, 0.0, 0.0]);
    }

    #[test]
    fn assign_from_preserves_own_sizes() {
        let mut a = InterfacePayload::new(2, 1);
        let mut b = InterfacePayload::new(3, 1);
        b.frame_count = 7;
        b.energy = 310.0;
        b.capacitance = 2.0;
        b.set_bulk(&[0.1, 0.2, 0.7]);
        b.set_trace(&[0.005]);

        a.assign_from(&b);

        assert_eq!(a.frame_count, 7);
        assert_eq!(a.num_bulk(), 2); // unchanged, not resized to 3
        assert_eq!(a.bulk(), &[0.1, 0.2]);
        assert_eq!(a.trace(), &[0.005]);
    }

    #[test]
    fn bulk_sum_matches_manual_sum() {
        let mut p = InterfacePayload::new(3, 0);
        p.set_bulk(&[0.2, 0.3, 0.5]);
        assert!((p.bulk_sum() - 1.0).abs() < 1e-12);
    }
}
