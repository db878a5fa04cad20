//! Upload strategy and part layout.

use cloudvault_core::config::TransferConfig;

/// How a file is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// One signed PUT of the whole body.
    SingleShot,
    /// The multipart protocol.
    Multipart,
}

/// Pick the strategy for a file of `size` bytes.
pub fn choose_strategy(size: u64, config: &TransferConfig) -> TransferStrategy {
    if size >= config.multipart_threshold_bytes {
        TransferStrategy::Multipart
    } else {
        TransferStrategy::SingleShot
    }
}

/// One byte range of a multipart upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based part number.
    pub part_number: i32,
    /// First byte.
    pub offset: u64,
    /// Byte count.
    pub len: u64,
}

impl PartRange {
    /// One past the last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Split `[0, size)` into `ceil(size / part_size)` consecutive ranges.
/// Every range but the last is exactly `part_size` long.
pub fn plan_parts(size: u64, part_size: u64) -> Vec<PartRange> {
    if size == 0 || part_size == 0 {
        return Vec::new();
    }
    let total = size.div_ceil(part_size);
    (0..total)
        .map(|i| {
            let offset = i * part_size;
            PartRange {
                part_number: (i + 1) as i32,
                offset,
                len: part_size.min(size - offset),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_150_mib_uses_eight_parts() {
        let config = TransferConfig::default();
        let size = 150 * MIB;
        assert_eq!(choose_strategy(size, &config), TransferStrategy::Multipart);

        let parts = plan_parts(size, config.part_size_bytes);
        assert_eq!(parts.len(), 8);
        assert_eq!(parts[7].len, 10 * MIB);
        assert!(parts[..7].iter().all(|p| p.len == 20 * MIB));
    }

    #[test]
    fn test_threshold_boundary() {
        let config = TransferConfig::default();
        assert_eq!(
            choose_strategy(100 * MIB - 1, &config),
            TransferStrategy::SingleShot
        );
        assert_eq!(choose_strategy(100 * MIB, &config), TransferStrategy::Multipart);
    }

    #[test]
    fn test_ranges_partition_the_file() {
        for (size, part) in [(1, 1), (7, 3), (9, 3), (10, 3), (1000, 999), (5, 100)] {
            let parts = plan_parts(size, part);
            assert_eq!(parts.len() as u64, size.div_ceil(part));
            let mut cursor = 0;
            for (i, p) in parts.iter().enumerate() {
                assert_eq!(p.part_number, i as i32 + 1);
                assert_eq!(p.offset, cursor);
                cursor = p.end();
            }
            assert_eq!(cursor, size);
            let last = parts.last().unwrap();
            assert_eq!(last.len, size - (parts.len() as u64 - 1) * part);
        }
    }

    #[test]
    fn test_empty_file_has_no_parts() {
        assert!(plan_parts(0, 10).is_empty());
    }
}
