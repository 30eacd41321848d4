use std::fmt;

/// One power-of-two aligned block of the 16-bit port space, expressed as a
/// `base/mask` pair the classifier can match directly.
///
/// A mask of `0xffff` selects exactly `base`; a mask of `0` selects every
/// port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortBlock {
    pub base: u16,
    pub mask: u16,
}

impl PortBlock {
    #[must_use]
    pub const fn exact(port: u16) -> Self {
        Self {
            base: port,
            mask: u16::MAX,
        }
    }

    #[must_use]
    pub const fn is_exact(&self) -> bool {
        self.mask == u16::MAX
    }

    /// True for the block covering the whole port space.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.mask == 0
    }

    /// Number of ports in the block.
    #[must_use]
    pub const fn size(&self) -> u32 {
        (!self.mask) as u32 + 1
    }

    #[must_use]
    pub const fn contains(&self, port: u16) -> bool {
        port & self.mask == self.base
    }
}

/// Renders the value half of a `tp_dst=` token: the decimal port for an exact
/// block, `0x<base>/0x<mask>` otherwise (a zero base is written `0`).
impl fmt::Display for PortBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            return write!(f, "{}", self.base);
        }
        if self.base == 0 {
            write!(f, "0/{:#x}", self.mask)
        } else {
            write!(f, "{:#x}/{:#x}", self.base, self.mask)
        }
    }
}

/// Decompose the inclusive interval `[start, end]` into the minimal ordered
/// list of aligned blocks whose union is exactly that interval.
///
/// Each step takes the largest power-of-two block that starts at the current
/// position, is aligned to its own size and does not run past `end`.
///
/// # Panics
///
/// Panics if `start > end`.
#[must_use]
pub fn decompose(start: u16, end: u16) -> Vec<PortBlock> {
    assert!(
        start <= end,
        "port range start {start} is greater than end {end}"
    );

    if start == end {
        return vec![PortBlock::exact(start)];
    }

    // u32 so that `end + 1` is representable for end = 65535.
    let stop = u32::from(end) + 1;
    let mut pos = u32::from(start);
    let mut blocks = Vec::new();

    while pos < stop {
        let mut size: u32 = 1;
        while pos + size <= stop && pos & (size - 1) == 0 {
            size <<= 1;
        }
        size >>= 1;

        blocks.push(PortBlock {
            base: (pos & 0xffff) as u16,
            mask: (!(size - 1) & 0xffff) as u16,
        });
        pos += size;
    }

    blocks
}
