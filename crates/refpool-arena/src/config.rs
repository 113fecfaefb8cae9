//! Pool configuration parameters.

use refpool_core::PoolError;

/// How a pool lays out its record storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageMode {
    /// One contiguous byte block, reallocated at double size on growth.
    SingleArray,
    /// Fixed-size blocks appended on growth. Existing blocks never move,
    /// and a record index maps to a stable `(segment, offset)` pair.
    Segmented {
        /// Records per segment. Must be a power of two.
        records_per_segment: u32,
    },
}

/// Configuration for a record pool.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of records to allocate storage for up front.
    pub initial_capacity: u32,

    /// Storage strategy.
    ///
    /// Default: [`StorageMode::SingleArray`].
    pub storage: StorageMode,

    /// Hard cap on the number of record slots.
    ///
    /// Default: `i32::MAX`, so that index attributes can encode
    /// "no record" as `-1` in a signed 32-bit slot.
    pub max_records: u32,
}

impl PoolConfig {
    /// Default hard cap on record slots.
    pub const DEFAULT_MAX_RECORDS: u32 = i32::MAX as u32;

    /// Default segment size for [`StorageMode::Segmented`] pools.
    pub const DEFAULT_RECORDS_PER_SEGMENT: u32 = 4096;

    /// Create a config with the given initial capacity and defaults
    /// for everything else.
    pub fn new(initial_capacity: u32) -> Self {
        Self {
            initial_capacity,
            storage: StorageMode::SingleArray,
            max_records: Self::DEFAULT_MAX_RECORDS,
        }
    }

    /// Create a segmented-storage config.
    pub fn segmented(initial_capacity: u32, records_per_segment: u32) -> Self {
        Self {
            storage: StorageMode::Segmented {
                records_per_segment,
            },
            ..Self::new(initial_capacity)
        }
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_records == 0 || self.max_records > Self::DEFAULT_MAX_RECORDS {
            return Err(PoolError::InvalidConfig {
                reason: format!(
                    "max_records must be in 1..={}, got {}",
                    Self::DEFAULT_MAX_RECORDS,
                    self.max_records
                ),
            });
        }
        if self.initial_capacity > self.max_records {
            return Err(PoolError::CapacityExceeded {
                requested: self.initial_capacity as usize,
                max: self.max_records as usize,
            });
        }
        if let StorageMode::Segmented {
            records_per_segment,
        } = self.storage
        {
            if !records_per_segment.is_power_of_two() {
                return Err(PoolError::InvalidConfig {
                    reason: format!(
                        "records_per_segment must be a power of two, got {records_per_segment}"
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PoolConfig::default().validate().is_ok());
        assert_eq!(PoolConfig::default().storage, StorageMode::SingleArray);
    }

    #[test]
    fn segment_size_must_be_power_of_two() {
        let config = PoolConfig::segmented(10, 100);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { .. })
        ));
        assert!(PoolConfig::segmented(10, 128).validate().is_ok());
    }

    #[test]
    fn initial_capacity_above_max_is_rejected() {
        let config = PoolConfig {
            max_records: 8,
            ..PoolConfig::new(9)
        };
        assert!(matches!(
            config.validate(),
            Err(PoolError::CapacityExceeded {
                requested: 9,
                max: 8
            })
        ));
    }

    #[test]
    fn zero_max_records_is_rejected() {
        let config = PoolConfig {
            max_records: 0,
            ..PoolConfig::new(0)
        };
        assert!(config.validate().is_err());
    }
}
