use crate::block::BlockPos;

/// An ordered table of offsets scanned around an anchor.
///
/// Order is preserved exactly as given; the resolver walks it front to back
/// so that per-offset output (effect placement) is reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    offsets: Vec<BlockPos>,
}

impl Neighborhood {
    /// The ring around an enchanting table: two blocks out on every side,
    /// on the anchor's layer and the one above.
    ///
    /// Offsets with `|x| == 2` or `|z| == 2`, `y` in `{0, 1}`, iterated
    /// x-major, then y, then z. 32 offsets.
    pub fn enchanting_table() -> Self {
        let mut offsets = Vec::with_capacity(32);
        for x in -2..=2 {
            for y in 0..=1 {
                for z in -2..=2 {
                    if x == -2 || x == 2 || z == -2 || z == 2 {
                        offsets.push(BlockPos::new(x, y, z));
                    }
                }
            }
        }
        Self { offsets }
    }

    pub fn from_offsets(offsets: impl IntoIterator<Item = BlockPos>) -> Self {
        Self {
            offsets: offsets.into_iter().collect(),
        }
    }

    pub fn offsets(&self) -> &[BlockPos] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The cell between the anchor and `offset` that must be clear.
    ///
    /// Horizontal components are halved toward zero; the vertical component
    /// is kept, so the transmitter sits on the provider's own layer.
    pub fn transmitter(anchor: BlockPos, offset: BlockPos) -> BlockPos {
        anchor + BlockPos::new(offset.x / 2, offset.y, offset.z / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn enchanting_table_has_32_distinct_ring_offsets() {
        let ring = Neighborhood::enchanting_table();
        assert_eq!(ring.len(), 32);
        let distinct: HashSet<_> = ring.offsets().iter().collect();
        assert_eq!(distinct.len(), 32);
        for offset in ring.offsets() {
            assert!(offset.x.abs() == 2 || offset.z.abs() == 2, "{offset} not on ring");
            assert!((0..=1).contains(&offset.y));
        }
    }

    #[test]
    fn enchanting_table_order_is_x_then_y_then_z() {
        let ring = Neighborhood::enchanting_table();
        let first: Vec<_> = ring.offsets()[..6].to_vec();
        assert_eq!(
            first,
            vec![
                BlockPos::new(-2, 0, -2),
                BlockPos::new(-2, 0, -1),
                BlockPos::new(-2, 0, 0),
                BlockPos::new(-2, 0, 1),
                BlockPos::new(-2, 0, 2),
                BlockPos::new(-2, 1, -2),
            ]
        );
        // x = -1 contributes only the z = +-2 cells.
        assert_eq!(ring.offsets()[10], BlockPos::new(-1, 0, -2));
        assert_eq!(ring.offsets()[11], BlockPos::new(-1, 0, 2));
        assert_eq!(ring.offsets()[31], BlockPos::new(2, 1, 2));
    }

    #[test]
    fn transmitter_is_the_intervening_cell() {
        let anchor = BlockPos::new(100, 64, -50);
        assert_eq!(
            Neighborhood::transmitter(anchor, BlockPos::new(2, 0, 0)),
            BlockPos::new(101, 64, -50)
        );
        assert_eq!(
            Neighborhood::transmitter(anchor, BlockPos::new(-2, 1, -1)),
            BlockPos::new(99, 65, -50)
        );
        assert_eq!(
            Neighborhood::transmitter(anchor, BlockPos::new(-2, 0, 2)),
            BlockPos::new(99, 64, -49)
        );
    }

    #[test]
    fn custom_offsets_keep_their_order() {
        let offsets = [BlockPos::new(0, 0, 3), BlockPos::new(-3, 0, 0)];
        let custom = Neighborhood::from_offsets(offsets);
        assert_eq!(custom.offsets(), &offsets);
        assert!(Neighborhood::from_offsets([]).is_empty());
    }
}
