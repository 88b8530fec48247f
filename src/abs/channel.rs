//! Vertex attribute channels and their interleaved layout.
//!
//! A [`ChannelSet`] decides which channels a vertex record carries. Offsets are
//! always assigned in the canonical order of [`AttributeChannel::ALL`], so the
//! same set produces the same memory layout no matter how it was built.

use std::fmt;

/// A per-vertex data component stored as 32-bit floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeChannel {
    Position,
    Normal,
    TexCoord0,
    TexCoord1,
}

impl AttributeChannel {
    /// Every channel, in canonical layout order.
    pub const ALL: [AttributeChannel; 4] = [
        AttributeChannel::Position,
        AttributeChannel::Normal,
        AttributeChannel::TexCoord0,
        AttributeChannel::TexCoord1,
    ];

    /// Number of floats this channel occupies in a vertex record.
    pub const fn components(self) -> usize {
        match self {
            AttributeChannel::Position | AttributeChannel::Normal => 3,
            AttributeChannel::TexCoord0 | AttributeChannel::TexCoord1 => 2,
        }
    }

    /// Size of this channel in bytes.
    pub const fn size(self) -> usize {
        self.components() * size_of::<f32>()
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for AttributeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeChannel::Position => "position",
            AttributeChannel::Normal => "normal",
            AttributeChannel::TexCoord0 => "tex_coord0",
            AttributeChannel::TexCoord1 => "tex_coord1",
        };
        f.write_str(name)
    }
}

/// A duplicate-free set of [`AttributeChannel`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const EMPTY: ChannelSet = ChannelSet(0);

    /// Builds a set from channels in any order. Repeats are ignored.
    pub fn new(channels: &[AttributeChannel]) -> Self {
        channels.iter().copied().collect()
    }

    /// Returns the set with `channel` added.
    pub const fn with(self, channel: AttributeChannel) -> Self {
        ChannelSet(self.0 | channel.bit())
    }

    pub const fn contains(self, channel: AttributeChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Present channels in canonical order.
    pub fn iter(self) -> impl Iterator<Item = AttributeChannel> {
        AttributeChannel::ALL
            .into_iter()
            .filter(move |&channel| self.contains(channel))
    }

    /// Number of floats in one vertex record.
    pub fn floats_per_vertex(self) -> usize {
        self.iter().map(AttributeChannel::components).sum()
    }

    /// Bytes between consecutive vertex records.
    pub fn stride(self) -> usize {
        self.iter().map(AttributeChannel::size).sum()
    }

    /// Byte offset of `channel` within a vertex record, if present.
    pub fn offset_of(self, channel: AttributeChannel) -> Option<usize> {
        self.offsets()
            .find(|&(present, _)| present == channel)
            .map(|(_, offset)| offset)
    }

    /// Present channels with their byte offsets, in canonical order.
    pub fn offsets(self) -> impl Iterator<Item = (AttributeChannel, usize)> {
        self.iter().scan(0, |offset, channel| {
            let current = *offset;
            *offset += channel.size();
            Some((channel, current))
        })
    }
}

impl FromIterator<AttributeChannel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = AttributeChannel>>(iter: I) -> Self {
        iter.into_iter().fold(ChannelSet::EMPTY, ChannelSet::with)
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
