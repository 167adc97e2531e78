/// Index into the 384-entry tile cache for a tile number read from a tile map
///
/// - `tile_id`: Tile number from the map
/// - `signed`: If true, use signed addressing (tile 0 at 0x9000, range 0x8800-0x97FF)
#[inline]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub(crate) const fn tile_cache_index(tile_id: u8, signed: bool) -> usize {
    if signed {
        (256 + tile_id as i8 as i16) as usize
    } else {
        tile_id as usize
    }
}

/// Extract 2-bit colour index from two bytes and a bit index
///
/// - `low`: Low byte of tile/sprite data
/// - `high`: High byte of tile/sprite data
/// - `bit`: Bit index (0-7), bit 7 is the leftmost pixel
#[inline]
pub(crate) const fn extract_colour_index(low: u8, high: u8, bit: u8) -> u8 {
    (((high >> bit) & 1) << 1) | ((low >> bit) & 1)
}
