//! Bitmap 位操作
//!
//! 位 `i` 位于第 `i / 8` 字节的第 `i % 8` 位（最低位为 0）。

/// 测试位图中某一位是否被设置
///
/// # 参数
///
/// * `bitmap` - 位图数据
/// * `index` - 位索引（从 0 开始）
///
/// # 返回
///
/// 如果位被设置返回 true，超出位图范围或未设置返回 false
pub fn test_bit(bitmap: &[u8], index: u32) -> bool {
    let byte_index = (index / 8) as usize;
    let bit_offset = (index % 8) as u8;

    if byte_index >= bitmap.len() {
        return false;
    }

    (bitmap[byte_index] & (1 << bit_offset)) != 0
}

/// 统计位图中从 start 到 end 范围内被设置的位数
///
/// # 参数
///
/// * `bitmap` - 位图数据
/// * `start` - 开始位置（从 0 开始）
/// * `end` - 结束位置（不包含）
pub fn count_ones(bitmap: &[u8], start: u32, end: u32) -> u32 {
    let max_bits = (bitmap.len() * 8) as u32;
    let end = end.min(max_bits);

    (start..end).filter(|&i| test_bit(bitmap, i)).count() as u32
}

/// 统计位图中从 start 到 end 范围内空闲的位数
pub fn count_zeros(bitmap: &[u8], start: u32, end: u32) -> u32 {
    let max_bits = (bitmap.len() * 8) as u32;
    let end = end.min(max_bits);
    end.saturating_sub(start) - count_ones(bitmap, start, end)
}

/// 容纳 `bits` 个位所需的字节数
pub fn bitmap_bytes(bits: u32) -> usize {
    bits.div_ceil(8) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_first() {
        let bitmap = [0b0000_0101u8, 0b1000_0000];
        assert!(test_bit(&bitmap, 0));
        assert!(!test_bit(&bitmap, 1));
        assert!(test_bit(&bitmap, 2));
        assert!(test_bit(&bitmap, 15));
        assert!(!test_bit(&bitmap, 16));
    }

    #[test]
    fn test_counts() {
        let bitmap = [0xFFu8, 0x0F, 0x00];
        assert_eq!(count_ones(&bitmap, 0, 24), 12);
        assert_eq!(count_zeros(&bitmap, 0, 24), 12);
        assert_eq!(count_ones(&bitmap, 4, 10), 6);
        assert_eq!(count_zeros(&bitmap, 8, 13), 1);
        assert_eq!(count_ones(&bitmap, 0, 100), 12);
    }

    #[test]
    fn test_bitmap_bytes() {
        assert_eq!(bitmap_bytes(0), 0);
        assert_eq!(bitmap_bytes(1), 1);
        assert_eq!(bitmap_bytes(8), 1);
        assert_eq!(bitmap_bytes(9), 2);
        assert_eq!(bitmap_bytes(8192), 1024);
    }
}
