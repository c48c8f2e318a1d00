//! Key-based partition selection.
//!
//! 32-bit FNV-1a over the key bytes, reinterpreted as a signed integer,
//! reduced modulo the partition count and folded to non-negative. This is
//! the scheme of the common Kafka client hash partitioner, so a key lands on
//! the same partition number under either transport.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Partition for `key` among `partitions` (treated as at least 1).
pub fn partition_for(key: &str, partitions: i32) -> i32 {
    let partitions = partitions.max(1);
    let partition = (fnv1a_32(key.as_bytes()) as i32) % partitions;
    if partition < 0 {
        -partition
    } else {
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn single_partition_always_zero() {
        assert_eq!(partition_for("anything", 1), 0);
        assert_eq!(partition_for("anything", 0), 0);
    }

    #[test]
    fn known_keys_land_on_fixed_partitions() {
        assert_eq!(partition_for("alice", 3), 2);
        assert_eq!(partition_for("alice", 10), 7);
        assert_eq!(partition_for("c-1", 3), 2);
        assert_eq!(partition_for("a", 5), 1);
        assert_eq!(partition_for("7f3c9a52-0d41-4b8e-9a7e-1f2b3c4d5e6f", 3), 1);
    }

    proptest! {
        #[test]
        fn partition_is_signed_hash_remainder(key in ".{0,64}", partitions in 1i32..64) {
            let signed = i64::from(fnv1a_32(key.as_bytes()) as i32);
            let expected = (signed % i64::from(partitions)).abs();
            prop_assert_eq!(i64::from(partition_for(&key, partitions)), expected);
        }

        #[test]
        fn partition_is_in_range(key in ".{0,64}", partitions in 1i32..64) {
            let partition = partition_for(&key, partitions);
            prop_assert!(partition >= 0 && partition < partitions);
        }
    }
}
