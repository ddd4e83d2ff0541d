use bead_view_protocol::{Channel, IndexRange};
use serde::{Deserialize, Serialize};

/// A raw two-channel recording, stored column-wise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeries {
    /// Where the series came from (archive member or file path).
    pub name: Option<String>,
    /// CSV headers of the NIR and VIS columns.
    pub channel_names: [String; 2],
    nir: Vec<f64>,
    vis: Vec<f64>,
}

impl RawSeries {
    /// Build a series from per-sample `(nir, vis)` pairs.
    pub fn from_samples(
        name: Option<String>,
        channel_names: [String; 2],
        samples: impl IntoIterator<Item = (f64, f64)>,
    ) -> Self {
        let (nir, vis) = samples.into_iter().unzip();
        Self {
            name,
            channel_names,
            nir,
            vis,
        }
    }

    pub fn len(&self) -> usize {
        self.nir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nir.is_empty()
    }

    pub fn values(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Nir => &self.nir,
            Channel::Vis => &self.vis,
        }
    }

    pub fn channel_name(&self, channel: Channel) -> &str {
        &self.channel_names[channel.column()]
    }

    /// Values of `channel` within `range`, or `None` when the range runs past
    /// the end of the series.
    pub fn slice(&self, channel: Channel, range: IndexRange) -> Option<&[f64]> {
        self.values(channel).get(range.start..=range.end)
    }

    /// The full index range, `None` for an empty series.
    pub fn full_range(&self) -> Option<IndexRange> {
        self.len().checked_sub(1).map(|last| IndexRange::new(0, last))
    }

    /// Smallest and largest finite value of a channel.
    pub fn bounds(&self, channel: Channel) -> Option<(f64, f64)> {
        self.values(channel)
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
