//! Echo density curve with sparse exact nodes

/// Normalized echo density, one value per signal sample
///
/// Values are computed exactly at the sparse nodes and linearly interpolated
/// in between, so [`Self::values`] reproduces [`Self::node_values`] at every
/// index in [`Self::node_indices`].
#[derive(Debug, Clone, PartialEq)]
pub struct EchoDensityCurve {
    values: Vec<f64>,
    node_indices: Vec<usize>,
    node_values: Vec<f64>,
}

impl EchoDensityCurve {
    /// Interpolate the sparse node values over `len` samples
    pub fn from_nodes(len: usize, node_indices: Vec<usize>, node_values: Vec<f64>) -> Self {
        let values = interpolate_linear(len, &node_indices, &node_values);
        Self {
            values,
            node_indices,
            node_values,
        }
    }

    /// Dense curve values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Indices where the density was computed exactly
    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }

    /// Exactly computed density at each node
    pub fn node_values(&self) -> &[f64] {
        &self.node_values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value of the curve, 0.0 if empty
    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Piecewise-linear interpolation over `0..len`
///
/// `nodes` must be strictly increasing and the same length as `values`.
/// Indices before the first node or after the last node hold the nearest
/// node value. Node indices themselves get the node value exactly.
pub fn interpolate_linear(len: usize, nodes: &[usize], values: &[f64]) -> Vec<f64> {
    debug_assert_eq!(nodes.len(), values.len());

    let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
        return vec![0.0; len];
    };

    let mut out = Vec::with_capacity(len);

    // Clamp left of the first node
    out.extend(std::iter::repeat(values[0]).take(first.min(len)));

    for (pair, vals) in nodes.windows(2).zip(values.windows(2)) {
        let (x0, x1) = (pair[0], pair[1]);
        if x0 >= len {
            break;
        }
        let (y0, y1) = (vals[0], vals[1]);
        let slope = (y1 - y0) / (x1 - x0) as f64;
        for x in x0..x1.min(len) {
            out.push(y0 + slope * (x - x0) as f64);
        }
    }

    // Last node and clamp to its right
    if last < len {
        let tail = values[values.len() - 1];
        out.extend(std::iter::repeat(tail).take(len - last));
    }

    out
}
